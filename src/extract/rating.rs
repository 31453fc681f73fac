use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

use crate::document::{element_text, selector, PageDocument};
use crate::product::Rating;

static RATING_MARKER: Lazy<Selector> = Lazy::new(|| {
    selector(".rating, [class*=\"rating\"], [itemprop=\"ratingValue\"]")
});

/// "4.6 / 5"
static SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*/\s*(\d+)").expect("Invalid score regex")
});

/// "(1,204 reviews)" or "(1 review)"
static REVIEWS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\s*([\d,]+)\s+reviews?\s*\)").expect("Invalid review count regex")
});

/// Rating from the first rating marker, or `None` when the page has none
pub fn extract_rating(document: &PageDocument) -> Option<Rating> {
    let marker = document.select_first(&RATING_MARKER)?;
    Some(parse_rating_text(&element_text(&marker)))
}

/// Parse score/scale and review count independently from marker text
pub fn parse_rating_text(text: &str) -> Rating {
    let (score, max_score) = SCORE_RE
        .captures(text)
        .map(|caps| {
            let score = caps[1].parse::<f64>().ok();
            let max = caps[2].parse::<u32>().ok().filter(|m| *m > 0).unwrap_or(5);
            (score, max)
        })
        .unwrap_or((None, 5));

    let review_count = REVIEWS_RE
        .captures(text)
        .and_then(|caps| caps[1].replace(',', "").parse::<u64>().ok())
        .unwrap_or(0);

    Rating {
        score,
        max_score,
        review_count,
    }
}
