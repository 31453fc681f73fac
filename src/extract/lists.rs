//! List-shaped fields: features, compatibility, use cases, pros and cons

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::document::{element_text, selector, PageDocument};

pub const MAX_FEATURES: usize = 10;

/// Feature/benefit list selectors, tried in order; the first one with any
/// matches is used exclusively
static FEATURE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".features li",
        ".feature-list li",
        ".product-features li",
        "#feature-bullets li",
        "[class*=\"feature\"] li",
        ".benefits li",
        "[class*=\"benefit\"] li",
        ".highlights li",
    ]
    .iter()
    .map(|css| selector(css))
    .collect()
});

static ADDITIONAL_DETAILS: Lazy<Selector> = Lazy::new(|| {
    selector("[class*=\"additional\"] li, [id*=\"additional\"] li, [class*=\"details\"] li")
});

static COMPATIBILITY: Lazy<Selector> = Lazy::new(|| {
    selector(".compatibility li, [class*=\"compatib\"] li")
});
static USE_CASES: Lazy<Selector> = Lazy::new(|| {
    selector(".use-cases li, [class*=\"use-case\"] li")
});
static PROS: Lazy<Selector> = Lazy::new(|| selector(".pros li, .product-pros li"));
static CONS: Lazy<Selector> = Lazy::new(|| selector(".cons li, .product-cons li"));

/// Feature bullets: deduplicated in first-seen order, at most ten
pub fn extract_features(document: &PageDocument) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();

    for sel in FEATURE_SELECTORS.iter() {
        let matches: Vec<String> = document.select(sel).map(|el| element_text(&el)).collect();
        if matches.is_empty() {
            continue;
        }
        features = matches
            .into_iter()
            .filter(|text| (11..500).contains(&text.chars().count()))
            .collect();
        break;
    }

    if features.is_empty() {
        features = document
            .select(&ADDITIONAL_DETAILS)
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty() && !text.contains('©'))
            .collect();
    }

    dedupe_capped(features, MAX_FEATURES)
}

fn dedupe_capped(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .take(cap)
        .collect()
}

fn list_texts(document: &PageDocument, sel: &Selector) -> Vec<String> {
    document
        .select(sel)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect()
}

pub fn extract_compatibility(document: &PageDocument) -> Vec<String> {
    list_texts(document, &COMPATIBILITY)
}

pub fn extract_use_cases(document: &PageDocument) -> Vec<String> {
    list_texts(document, &USE_CASES)
}

pub fn extract_pros(document: &PageDocument) -> Vec<String> {
    list_texts(document, &PROS)
}

pub fn extract_cons(document: &PageDocument) -> Vec<String> {
    list_texts(document, &CONS)
}
