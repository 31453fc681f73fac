use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::document::{element_text, selector, PageDocument};
use crate::product::AlternativeProduct;

static SECTION: Lazy<Selector> = Lazy::new(|| selector("section, .section"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

/// "Name: description"
static NAMED_PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([^:]{1,120}):\s*(.+)$").expect("Invalid alternative regex")
});

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d[\d,]*(?:\.\d+)?").expect("Invalid price regex")
});

/// Alternatives listed in the page's last top-level section. Other
/// sections are ignored; paragraphs without a leading "Name:" are skipped.
pub fn extract_alternatives(document: &PageDocument) -> Vec<AlternativeProduct> {
    let Some(section) = document.select(&SECTION).filter(is_top_level).last() else {
        return Vec::new();
    };

    section
        .select(&PARAGRAPH)
        .filter_map(|p| parse_alternative(&element_text(&p)))
        .collect()
}

fn is_top_level(element: &ElementRef<'_>) -> bool {
    !element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| SECTION.matches(&ancestor))
}

fn parse_alternative(text: &str) -> Option<AlternativeProduct> {
    let caps = NAMED_PARAGRAPH_RE.captures(text)?;
    let name = caps[1].trim().to_string();
    let description = caps[2].trim().to_string();
    if name.is_empty() {
        return None;
    }

    Some(AlternativeProduct {
        name,
        price: PRICE_RE.find(text).map(|m| m.as_str().to_string()),
        description,
    })
}
