use once_cell::sync::Lazy;
use scraper::Selector;

use crate::document::{element_text, selector, PageDocument};

static BREADCRUMB_LINKS: Lazy<Selector> = Lazy::new(|| {
    selector("[class*=\"breadcrumb\"] a, nav a")
});

const DEFAULT_CATEGORY: &str = "General Product";

/// Breadcrumb trail joined with " > " (home links dropped), else the
/// category meta tag, else "General Product"
pub fn extract_category(document: &PageDocument) -> String {
    from_breadcrumbs(document)
        .or_else(|| document.meta_content("category"))
        .or_else(|| document.meta_content("product:category"))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn from_breadcrumbs(document: &PageDocument) -> Option<String> {
    let crumbs: Vec<String> = document
        .select(&BREADCRUMB_LINKS)
        .map(|el| element_text(&el))
        .collect();

    if crumbs.len() < 2 {
        return None;
    }

    let trail = crumbs
        .into_iter()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("home"))
        .collect::<Vec<_>>()
        .join(" > ");

    (!trail.is_empty()).then_some(trail)
}
