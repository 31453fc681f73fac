use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use super::FallbackChain;
use crate::document::{element_text, selector, PageDocument};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Markers used for product names in listings, carousels and the hero block
static PRODUCT_NAME_MARKER: Lazy<Selector> = Lazy::new(|| {
    selector(".product-name, .product-item-name, .product-card__name, [data-product-name]")
});

/// Common title markers, highest priority first
static TITLE_MARKERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "[itemprop=\"name\"]",
        ".product-title",
        ".product_title",
        ".product__title",
        ".product-info h1",
        ".product-info-main h1",
        "h1[class*=\"product\"]",
        "[data-product-title]",
    ]
    .iter()
    .map(|css| selector(css))
    .collect()
});

static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static H2: Lazy<Selector> = Lazy::new(|| selector("h2"));

static HOME_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bhome\b").expect("Invalid home regex")
});

const PROMOTIONAL_PHRASES: &[&str] = &["all-new", "introducing", "shop now", "buy now"];

/// Title separators stripped from page and og titles ("Drill | Store")
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — "];

/// Reject empty, oversized, and promotional names
#[allow(clippy::ptr_arg)]
pub fn is_valid_product_name(name: &String) -> bool {
    let len = name.chars().count();
    if !(2..=200).contains(&len) {
        return false;
    }

    let lower = name.to_lowercase();
    !(PROMOTIONAL_PHRASES.iter().any(|p| lower.contains(p)) || lower.starts_with("the new"))
}

/// Extract the subject product's name
pub fn extract_name(document: &PageDocument) -> String {
    FallbackChain::new("name")
        .strategy("linked-marker", from_self_linked_marker)
        .strategy("title-marker", from_title_markers)
        .strategy("any-marker", from_any_marker)
        .strategy("og-title", from_og_title)
        .strategy("document-title", from_document_title)
        .strategy("first-h1", from_first_h1)
        .strategy("first-h2", from_first_h2)
        .validate(is_valid_product_name)
        .run_or(document, UNKNOWN_PRODUCT.to_string())
}

/// A name marker whose nearest enclosing link points at this very page.
/// Related and upsell products carry the same markup but link elsewhere.
fn from_self_linked_marker(document: &PageDocument) -> Option<String> {
    let own_path = document.path();
    if own_path.is_empty() {
        return None;
    }

    document
        .select(&PRODUCT_NAME_MARKER)
        .filter(|el| {
            nearest_link_href(el)
                .and_then(|href| document.resolve(href))
                .map(|target| paths_match(own_path, target.path()))
                .unwrap_or(false)
        })
        .map(|el| element_text(&el))
        .find(is_valid_product_name)
}

fn nearest_link_href<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
}

/// Exact equality, or containment in either direction to tolerate trailing
/// slashes and locale prefixes. The root path alone never matches.
fn paths_match(own_path: &str, link_path: &str) -> bool {
    if own_path == link_path {
        return true;
    }
    if own_path.trim_matches('/').is_empty() || link_path.trim_matches('/').is_empty() {
        return false;
    }
    own_path.contains(link_path) || link_path.contains(own_path)
}

fn from_title_markers(document: &PageDocument) -> Option<String> {
    TITLE_MARKERS.iter().find_map(|sel| {
        document
            .select(sel)
            .map(|el| element_text(&el))
            .find(is_valid_product_name)
    })
}

fn from_any_marker(document: &PageDocument) -> Option<String> {
    document
        .select_first(&PRODUCT_NAME_MARKER)
        .map(|el| element_text(&el))
}

fn from_og_title(document: &PageDocument) -> Option<String> {
    document.meta_content("og:title").and_then(|t| clean_page_title(&t))
}

fn from_document_title(document: &PageDocument) -> Option<String> {
    document.title().and_then(|t| clean_page_title(&t))
}

fn from_first_h1(document: &PageDocument) -> Option<String> {
    document.select_first(&H1).map(|el| element_text(&el))
}

fn from_first_h2(document: &PageDocument) -> Option<String> {
    document.select_first(&H2).map(|el| element_text(&el))
}

/// Strip a trailing "| Store" / "- Store" segment. Titles that still mention
/// "home" are site-wide titles, not product names.
fn clean_page_title(title: &str) -> Option<String> {
    let cut = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.rfind(sep))
        .max()
        .unwrap_or(title.len());
    let cleaned = title[..cut].trim().to_string();

    if cleaned.is_empty() || HOME_WORD_RE.is_match(&cleaned) {
        None
    } else {
        Some(cleaned)
    }
}
