use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

use crate::document::{element_text, selector, PageDocument};

static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));

static LEADING_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+").expect("Invalid leading word regex")
});

/// Brand is the leading word of the page's first `<h1>`, or "Unknown"
pub fn extract_brand(document: &PageDocument) -> String {
    document
        .select_first(&H1)
        .map(|el| element_text(&el))
        .and_then(|heading| LEADING_WORD_RE.find(&heading).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}
