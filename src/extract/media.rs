//! Image, price and tagline extraction

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use super::FallbackChain;
use crate::document::{element_text, selector, PageDocument};
use crate::product::Money;

static PRODUCT_IMAGE: Lazy<Selector> = Lazy::new(|| selector(".product-image img"));
static PRODUCTISH_IMAGE: Lazy<Selector> = Lazy::new(|| selector("[class*=\"product\"] img"));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector("meta[property=\"og:image\"]"));
static ITEMPROP_IMAGE: Lazy<Selector> = Lazy::new(|| selector("[itemprop=\"image\"]"));

static ITEMPROP_PRICE: Lazy<Selector> = Lazy::new(|| selector("[itemprop=\"price\"]"));
static PRICE_CLASS: Lazy<Selector> = Lazy::new(|| selector(".price, [class*=\"price\"]"));
static ITEMPROP_CURRENCY: Lazy<Selector> = Lazy::new(|| selector("[itemprop=\"priceCurrency\"]"));

static TAGLINE_MARKERS: Lazy<Selector> = Lazy::new(|| {
    selector(".product-tagline, .tagline, [itemprop=\"description\"]")
});

static DOLLAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").expect("Invalid dollar regex")
});

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("Invalid number regex")
});

/// Primary product image URL
pub fn extract_image(document: &PageDocument) -> Option<String> {
    FallbackChain::new("image")
        .strategy("product-image", |d| first_image_value(d, &PRODUCT_IMAGE))
        .strategy("productish-image", |d| first_image_value(d, &PRODUCTISH_IMAGE))
        .strategy("og-image", |d| first_image_value(d, &OG_IMAGE))
        .strategy("itemprop-image", |d| first_image_value(d, &ITEMPROP_IMAGE))
        .validate(|v: &String| !v.is_empty())
        .run(document)
}

/// `src`, else `content`, else text of the first match
fn first_image_value(document: &PageDocument, sel: &Selector) -> Option<String> {
    let el = document.select_first(sel)?;
    el.value()
        .attr("src")
        .or_else(|| el.value().attr("content"))
        .map(|v| v.trim().to_string())
        .or_else(|| Some(element_text(&el)))
}

/// Offer price, absent-safe
pub fn extract_price(document: &PageDocument) -> Option<Money> {
    FallbackChain::new("price")
        .strategy("itemprop-price", from_itemprop_price)
        .strategy("product-meta", |d| {
            meta_price(d, "product:price:amount", "product:price:currency")
        })
        .strategy("og-meta", |d| meta_price(d, "og:price:amount", "og:price:currency"))
        .strategy("price-class", from_price_class)
        .validate(|m: &Money| m.amount > 0.0)
        .run(document)
}

fn from_itemprop_price(document: &PageDocument) -> Option<Money> {
    let el = document.select_first(&ITEMPROP_PRICE)?;
    let raw = el
        .value()
        .attr("content")
        .map(String::from)
        .unwrap_or_else(|| element_text(&el));
    let amount = parse_amount(&raw)?;
    let currency = document
        .select_first(&ITEMPROP_CURRENCY)
        .and_then(|c| currency_of(&c));
    Some(with_currency(amount, currency))
}

fn meta_price(document: &PageDocument, amount_key: &str, currency_key: &str) -> Option<Money> {
    let amount = parse_amount(&document.meta_content(amount_key)?)?;
    Some(with_currency(amount, document.meta_content(currency_key)))
}

fn from_price_class(document: &PageDocument) -> Option<Money> {
    document
        .select(&PRICE_CLASS)
        .map(|el| element_text(&el))
        .find_map(|text| {
            DOLLAR_RE
                .captures(&text)
                .and_then(|caps| caps[1].replace(',', "").parse::<f64>().ok())
        })
        .map(Money::usd)
}

fn currency_of(el: &ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("content")
        .map(String::from)
        .or_else(|| Some(element_text(el)))
        .filter(|c| !c.is_empty())
}

fn with_currency(amount: f64, currency: Option<String>) -> Money {
    match currency {
        Some(currency) => Money {
            amount,
            currency: currency.to_uppercase(),
        },
        None => Money::usd(amount),
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    NUMBER_RE
        .find(raw)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
}

/// Short marketing line describing the product
pub fn extract_tagline(document: &PageDocument) -> String {
    FallbackChain::new("tagline")
        .strategy("tagline-marker", |d| {
            d.select(&TAGLINE_MARKERS)
                .map(|el| element_text(&el))
                .find(|t| !t.is_empty())
        })
        .strategy("meta-description", |d| d.meta_content("description"))
        .strategy("og-description", |d| d.meta_content("og:description"))
        .run_or(document, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> PageDocument {
        PageDocument::parse(html, "https://example.com/p/drill")
    }

    #[test]
    fn test_product_image_container_wins() {
        let html = r#"<html><head><meta property="og:image" content="https://cdn/og.jpg"></head>
            <body><div class="product-image"><img src="https://cdn/main.jpg"></div></body></html>"#;
        assert_eq!(extract_image(&doc(html)).as_deref(), Some("https://cdn/main.jpg"));
    }

    #[test]
    fn test_og_image_content() {
        let html = r#"<html><head><meta property="og:image" content="https://cdn/og.jpg"></head></html>"#;
        assert_eq!(extract_image(&doc(html)).as_deref(), Some("https://cdn/og.jpg"));
    }

    #[test]
    fn test_no_image() {
        assert!(extract_image(&doc("<p>text</p>")).is_none());
    }

    #[test]
    fn test_itemprop_price_with_currency() {
        let html = r#"<span itemprop="price" content="1,299.00">$1,299</span>
            <meta itemprop="priceCurrency" content="usd">"#;
        let price = extract_price(&doc(html)).unwrap();
        assert_eq!(price.amount, 1299.0);
        assert_eq!(price.currency, "USD");
    }

    #[test]
    fn test_meta_price() {
        let html = r#"<html><head>
            <meta property="product:price:amount" content="89.50">
            <meta property="product:price:currency" content="EUR">
        </head></html>"#;
        let price = extract_price(&doc(html)).unwrap();
        assert_eq!(price.amount, 89.5);
        assert_eq!(price.currency, "EUR");
    }

    #[test]
    fn test_price_class_text() {
        let html = r#"<div class="product-price">Now only $179.99!</div>"#;
        assert_eq!(extract_price(&doc(html)), Some(Money::usd(179.99)));
    }

    #[test]
    fn test_missing_price() {
        assert!(extract_price(&doc("<div class=\"price\">Call for pricing</div>")).is_none());
    }

    #[test]
    fn test_tagline_sources() {
        let html = r#"<html><head><meta name="description" content="Meta copy"></head>
            <body><p class="tagline">Drive more, charge less.</p></body></html>"#;
        assert_eq!(extract_tagline(&doc(html)), "Drive more, charge less.");
        let meta_only = r#"<html><head><meta name="description" content="Meta copy"></head></html>"#;
        assert_eq!(extract_tagline(&doc(meta_only)), "Meta copy");
        assert_eq!(extract_tagline(&doc("<p></p>")), "");
    }
}
