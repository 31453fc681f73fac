use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::document::{element_text, selector, PageDocument};

static SPEC_CARD: Lazy<Selector> = Lazy::new(|| selector(".spec-card"));
static CARD_HEADER: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6, .spec-label"));
static CARD_VALUE: Lazy<Selector> = Lazy::new(|| selector("p, .spec-value"));
static TABLE_ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static ROW_CELL: Lazy<Selector> = Lazy::new(|| selector("th, td"));
static DEFINITION_LIST: Lazy<Selector> = Lazy::new(|| selector("dl"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

static WHITESPACE_OR_BRACKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s()\[\]{}]+").expect("Invalid bracket regex")
});

static UNDERSCORES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_+").expect("Invalid underscore regex")
});

/// Normalize a spec label into a map key ("Max Torque" -> "max_torque").
/// Table labels additionally turn brackets into separators, so
/// "Weight (lbs)" keys as "weight_lbs_".
pub fn spec_key(label: &str, strip_brackets: bool) -> String {
    let lower = label.trim().to_lowercase();
    let replaced = if strip_brackets {
        WHITESPACE_OR_BRACKET_RE.replace_all(&lower, "_")
    } else {
        WHITESPACE_RE.replace_all(&lower, "_")
    };
    UNDERSCORES_RE.replace_all(&replaced, "_").into_owned()
}

/// Collect specifications from spec cards, table rows, and definition lists.
///
/// All three sources are scanned in that order and later writes replace
/// earlier ones, so on a key collision definition lists win over tables,
/// which win over spec cards.
pub fn extract_specs(document: &PageDocument) -> IndexMap<String, String> {
    let mut specs = IndexMap::new();

    for (label, value) in spec_cards(document) {
        insert_spec(&mut specs, spec_key(&label, false), value);
    }
    for (label, value) in table_rows(document) {
        insert_spec(&mut specs, spec_key(&label, true), value);
    }
    for (label, value) in definition_pairs(document) {
        insert_spec(&mut specs, spec_key(&label, false), value);
    }

    specs
}

fn insert_spec(specs: &mut IndexMap<String, String>, key: String, value: String) {
    if !key.is_empty() && !value.is_empty() {
        specs.insert(key, value);
    }
}

fn spec_cards(document: &PageDocument) -> Vec<(String, String)> {
    document
        .select(&SPEC_CARD)
        .filter_map(|card| {
            let label = card.select(&CARD_HEADER).next().map(|el| element_text(&el))?;
            let value = card.select(&CARD_VALUE).next().map(|el| element_text(&el))?;
            Some((label, value))
        })
        .collect()
}

fn table_rows(document: &PageDocument) -> Vec<(String, String)> {
    document
        .select(&TABLE_ROW)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&ROW_CELL)
                .take(2)
                .map(|el| element_text(&el))
                .collect();
            match cells.as_slice() {
                [label, value] if label != value => Some((label.clone(), value.clone())),
                _ => None,
            }
        })
        .collect()
}

fn definition_pairs(document: &PageDocument) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for list in document.select(&DEFINITION_LIST) {
        let mut term: Option<String> = None;
        for child in list_items(&list) {
            match child.value().name() {
                "dt" => term = Some(element_text(&child)),
                "dd" => {
                    if let Some(label) = term.take() {
                        pairs.push((label, element_text(&child)));
                    }
                }
                _ => {}
            }
        }
    }

    pairs
}

/// `dt`/`dd` children, looking through a single wrapper `div` level
fn list_items<'a>(list: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut items = Vec::new();
    for child in list.children().filter_map(ElementRef::wrap) {
        if child.value().name() == "div" {
            items.extend(child.children().filter_map(ElementRef::wrap));
        } else {
            items.push(child);
        }
    }
    items
}
