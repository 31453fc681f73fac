//! Extraction pipeline tests against realistic product pages

use prodlens::document::PageDocument;
use prodlens::extract::{extract_product, MAX_FEATURES, UNKNOWN_PRODUCT};
use prodlens::product::Money;

// ============================================================================
// Fixtures
// ============================================================================

const PRODUCT_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head>
    <title>PowerMax ProDrill 2000X | PowerMax Tools</title>
    <meta property="og:image" content="https://cdn.powermax.example/og.jpg">
    <meta name="description" content="Meta description fallback">
</head>
<body>
    <nav class="breadcrumb">
        <a href="/">Home</a>
        <a href="/tools">Power Tools</a>
        <a href="/tools/drills">Drills</a>
    </nav>

    <div class="product-info">
        <div class="product-image"><img src="https://cdn.powermax.example/prodrill.jpg" alt=""></div>
        <h1 class="product-title">PowerMax ProDrill 2000X</h1>
        <p class="product-tagline">Drive further on a single charge</p>
        <div class="rating">4.6 / 5 (1,204 reviews)</div>
        <span itemprop="price" content="179.99">$179.99</span>
        <meta itemprop="priceCurrency" content="USD">
    </div>

    <ul class="features">
        <li>Brushless motor delivers 1,200 in-lbs of torque</li>
        <li>Two-speed metal gearbox for drilling and driving</li>
    </ul>

    <div class="spec-card"><h4>Battery Voltage</h4><p>20V</p></div>
    <div class="spec-card"><h4>Warranty</h4><p>1-year</p></div>

    <table class="specs">
        <tr><th>Chuck Size (in)</th><td>1/2</td></tr>
        <tr><th>Warranty</th><td>3-year limited</td></tr>
    </table>

    <dl>
        <dt>Weight</dt><dd>3.5 lbs</dd>
        <dt>Warranty</dt><dd>5-year limited</dd>
    </dl>

    <ul class="compatibility">
        <li>PowerMax 20V batteries</li>
        <li>PowerMax 20V chargers</li>
    </ul>
    <ul class="use-cases"><li>Framing</li><li>Decking</li></ul>
    <ul class="pros"><li>Long runtime</li></ul>
    <ul class="cons"><li>Heavier than compact models</li></ul>

    <section class="reviews">
        <p>Great drill: would buy again</p>
    </section>
    <section class="alternatives">
        <p>ProDrill 1000: Entry-level model for light work, $129.99.</p>
        <p>ImpactMax 300: Pairs well with the 2000X</p>
    </section>
</body>
</html>
"#;

// ============================================================================
// End-to-end record
// ============================================================================

#[test]
fn test_full_product_page() {
    let doc = PageDocument::parse(PRODUCT_PAGE, "https://powermax.example/tools/drills/prodrill-2000x");
    let product = extract_product(&doc);

    assert_eq!(product.name, "PowerMax ProDrill 2000X");
    assert_eq!(product.brand, "PowerMax");
    assert_eq!(product.category, "Power Tools > Drills");
    assert_eq!(product.tagline, "Drive further on a single charge");
    assert_eq!(product.image.as_deref(), Some("https://cdn.powermax.example/prodrill.jpg"));
    assert_eq!(product.price, Some(Money::usd(179.99)));

    let rating = product.rating.as_ref().expect("rating should be extracted");
    assert_eq!(rating.score, Some(4.6));
    assert_eq!(rating.max_score, 5);
    assert_eq!(rating.review_count, 1204);

    assert_eq!(product.features.len(), 2);
    assert_eq!(product.compatibility.len(), 2);
    assert_eq!(product.use_cases, vec!["Framing", "Decking"]);
    assert_eq!(product.pros, vec!["Long runtime"]);
    assert_eq!(product.cons, vec!["Heavier than compact models"]);
}

#[test]
fn test_spec_sources_and_collision_precedence() {
    let doc = PageDocument::parse(PRODUCT_PAGE, "");
    let product = extract_product(&doc);

    assert_eq!(product.spec("battery_voltage"), Some("20V"));
    assert_eq!(product.spec("chuck_size_in_"), Some("1/2"));
    assert_eq!(product.spec("weight"), Some("3.5 lbs"));
    // Definition list beats table beats spec card
    assert_eq!(product.spec("warranty"), Some("5-year limited"));

    let keys: Vec<&str> = product.specs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["battery_voltage", "warranty", "chuck_size_in_", "weight"]);
}

#[test]
fn test_alternatives_from_last_section_only() {
    let doc = PageDocument::parse(PRODUCT_PAGE, "");
    let product = extract_product(&doc);

    assert_eq!(product.alternatives.len(), 2);
    assert_eq!(product.alternatives[0].name, "ProDrill 1000");
    assert_eq!(product.alternatives[0].price.as_deref(), Some("$129.99"));
    assert!(product.alternatives.iter().all(|a| a.name != "Great drill"));
}

#[test]
fn test_minimal_rating_and_features_scenario() {
    let html = r#"<html><body>
        <h1 class="product-title">PowerMax ProDrill 2000X</h1>
        <div class="rating">4.6 / 5 (1,204 reviews)</div>
        <ul class="features">
            <li>Brushless motor for extended runtime</li>
            <li>Built-in LED light for dark spaces</li>
        </ul>
    </body></html>"#;
    let product = extract_product(&PageDocument::parse(html, ""));

    assert_eq!(product.name, "PowerMax ProDrill 2000X");
    let rating = product.rating.unwrap();
    assert_eq!((rating.score, rating.max_score, rating.review_count), (Some(4.6), 5, 1204));
    assert_eq!(product.features.len(), 2);
}

// ============================================================================
// Subject disambiguation
// ============================================================================

#[test]
fn test_subject_product_beats_related_products() {
    let html = r#"<html><body>
        <h1 class="product-title">Summer Savings Event</h1>
        <div class="related-products">
            <a href="/p/impact-driver"><div class="product-name">ImpactMax 300</div></a>
            <a href="/p/circular-saw"><div class="product-name">SawMax 7</div></a>
        </div>
        <div class="buy-box">
            <a href="/p/prodrill-2000x"><div class="product-name">PowerMax ProDrill 2000X</div></a>
        </div>
    </body></html>"#;
    let doc = PageDocument::parse(html, "https://powermax.example/p/prodrill-2000x/?utm_source=ad");
    assert_eq!(extract_product(&doc).name, "PowerMax ProDrill 2000X");
}

#[test]
fn test_page_without_name_markers() {
    let html = "<html><body><div>Just some text</div></body></html>";
    let product = extract_product(&PageDocument::parse(html, "https://example.com/x"));
    assert_eq!(product.name, UNKNOWN_PRODUCT);
    assert!(product.rating.is_none());
}

// ============================================================================
// Feature list bounds
// ============================================================================

#[test]
fn test_features_capped_and_deduplicated() {
    let items: String = (0..15)
        .map(|i| format!("<li>Feature item number {}</li><li>Feature item number {}</li>", i, i))
        .collect();
    let html = format!("<html><body><ul class=\"features\">{}</ul></body></html>", items);
    let product = extract_product(&PageDocument::parse(&html, ""));

    assert_eq!(product.features.len(), MAX_FEATURES);
    let mut unique = product.features.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), product.features.len());
    assert_eq!(product.features[0], "Feature item number 0");
    assert_eq!(product.features[1], "Feature item number 1");
}
