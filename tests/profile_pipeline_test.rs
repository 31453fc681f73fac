//! End-to-end profile generation with scripted generative collaborators

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Duration;

use prodlens::agent::{CompletionOptions, TextGenerator};
use prodlens::assistant::Assistant;
use prodlens::cache::{MemoryCache, SqliteCache};
use prodlens::compare::{compare_text, Gap, MetricPosition};
use prodlens::competitors::{EmptyCatalog, StaticCatalog};
use prodlens::document::PageDocument;
use prodlens::error::{ProdlensError, Result};
use prodlens::extract::extract_product;
use prodlens::product::{Competitor, Positioning};
use prodlens::profile::ProfileGenerator;

const PAGE: &str = r#"
<html>
<head><title>PowerMax ProDrill 2000X | PowerMax</title></head>
<body>
    <nav class="breadcrumb"><a href="/">Home</a><a href="/tools">Power Tools</a><a href="/drills">Drills</a></nav>
    <h1 class="product-title">PowerMax ProDrill 2000X</h1>
    <div class="rating">4.6 / 5 (1,204 reviews)</div>
    <span class="price">$179.99</span>
    <ul class="features">
        <li>Brushless motor with intelligent electronic clutch</li>
        <li>Compact, lightweight body for overhead work</li>
    </ul>
    <table>
        <tr><th>Torque</th><td>1,200 in-lbs</td></tr>
        <tr><th>Warranty</th><td>5-year limited</td></tr>
    </table>
</body>
</html>
"#;

const LOCATION: &str = "https://powermax.example/p/prodrill-2000x";

// ============================================================================
// Scripted generator
// ============================================================================

/// Replies by operation: the system prompt for competitors asks for JSON
#[derive(Clone)]
struct Scripted {
    competitors: Option<&'static str>,
    narrative: Option<&'static str>,
    calls: Rc<RefCell<Vec<bool>>>,
}

impl Scripted {
    fn new(competitors: Option<&'static str>, narrative: Option<&'static str>) -> Self {
        Self {
            competitors,
            narrative,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl TextGenerator for Scripted {
    fn complete(&self, _system: &str, _user: &str, options: &CompletionOptions) -> Result<String> {
        self.calls.borrow_mut().push(options.json_mode);
        let reply = if options.json_mode { self.competitors } else { self.narrative };
        reply
            .map(String::from)
            .ok_or_else(|| ProdlensError::Generative("timeout".into()))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

const COMPETITORS_JSON: &str = r#"```json
{"competitors": [
    {"brand": "Makita", "model": "XFD131", "keyFeature": "rugged, durable build", "positioning": "PREMIUM"},
    {"brand": "Craftsman", "model": "CMCD700", "positioning": "value"}
]}
```"#;

const NARRATIVE: &str = "You will love how the ProDrill handles every job you throw at it.";

fn generator(scripted: Scripted) -> ProfileGenerator {
    ProfileGenerator::new(
        Assistant::new(Box::new(scripted), None),
        Box::new(StaticCatalog::builtin()),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_generative_path_end_to_end() {
    let scripted = Scripted::new(Some(COMPETITORS_JSON), Some(NARRATIVE));
    let profile = generator(scripted).generate_from_markup(PAGE, LOCATION).unwrap();

    assert!(profile.metadata.ai_powered);
    assert_eq!(profile.narrative, NARRATIVE);

    let competitors = &profile.raw_record.competitors;
    assert_eq!(competitors.len(), 2);
    assert_eq!(competitors[0].positioning, Positioning::Premium);
    assert_eq!(competitors[1].positioning, Positioning::Comparable);
    assert_eq!(competitors[1].key_feature, "");
    assert!(competitors.iter().all(|c| c.price == 0.0 && c.torque == 0.0));

    let comparison = profile.structured_data["competitor_comparison"].as_object().unwrap();
    let keys: Vec<&String> = comparison.keys().collect();
    assert_eq!(keys, vec!["Makita XFD131", "Craftsman CMCD700"]);
    assert_eq!(profile.structured_data["aggregateRating"]["reviewCount"], 1204);
    assert_eq!(profile.structured_data["offers"]["price"], 179.99);
}

#[test]
fn test_generative_failures_fall_back_independently() {
    let scripted = Scripted::new(None, Some(NARRATIVE));
    let profile = generator(scripted).generate_from_markup(PAGE, LOCATION).unwrap();

    // Catalog competitors, generated narrative
    assert_eq!(profile.raw_record.competitors.len(), 4);
    assert_eq!(profile.raw_record.competitors[0].brand, "DeWalt");
    assert!(profile.metadata.ai_powered);
}

#[test]
fn test_narrative_failure_uses_template_with_first_competitor() {
    let scripted = Scripted::new(Some(COMPETITORS_JSON), None);
    let profile = generator(scripted).generate_from_markup(PAGE, LOCATION).unwrap();

    assert!(!profile.metadata.ai_powered);
    assert!(profile
        .narrative
        .starts_with("The PowerMax ProDrill 2000X is a power tools > drills from PowerMax."));
    assert!(profile.narrative.contains("Customer rating: 4.6/5 from 1204 reviews."));
    assert!(profile.narrative.contains("Against the Makita XFD131"));
    assert!(!profile.narrative.contains("Craftsman"));
}

#[test]
fn test_unavailable_collaborator_is_never_called() {
    struct Unavailable(Rc<RefCell<usize>>);
    impl TextGenerator for Unavailable {
        fn complete(&self, _s: &str, _u: &str, _o: &CompletionOptions) -> Result<String> {
            *self.0.borrow_mut() += 1;
            Ok("{}".into())
        }
        fn is_available(&self) -> bool {
            false
        }
        fn name(&self) -> &'static str {
            "unavailable"
        }
    }

    let calls = Rc::new(RefCell::new(0));
    let generator = ProfileGenerator::new(
        Assistant::new(Box::new(Unavailable(calls.clone())), None),
        Box::new(EmptyCatalog),
    );
    let profile = generator.generate_from_markup(PAGE, LOCATION).unwrap();

    assert_eq!(*calls.borrow(), 0);
    assert!(profile.raw_record.competitors.is_empty());
    assert!(profile.structured_data.get("competitor_comparison").is_none());
}

#[test]
fn test_cached_responses_skip_the_generator() {
    let scripted = Scripted::new(Some(COMPETITORS_JSON), Some(NARRATIVE));
    let calls = scripted.calls.clone();
    let generator = ProfileGenerator::new(
        Assistant::new(
            Box::new(scripted),
            Some(Box::new(MemoryCache::new(Duration::hours(24)))),
        ),
        Box::new(EmptyCatalog),
    );

    let first = generator.generate_from_markup(PAGE, LOCATION).unwrap();
    let second = generator.generate_from_markup(PAGE, LOCATION).unwrap();

    assert_eq!(calls.borrow().len(), 2);
    assert_eq!(first.narrative, second.narrative);
    assert_eq!(first.raw_record.competitors, second.raw_record.competitors);
}

#[test]
fn test_sqlite_cache_backs_the_assistant() {
    let scripted = Scripted::new(Some(COMPETITORS_JSON), Some(NARRATIVE));
    let calls = scripted.calls.clone();
    let cache = SqliteCache::open_in_memory(Duration::hours(24)).unwrap();
    let generator = ProfileGenerator::new(
        Assistant::new(Box::new(scripted), Some(Box::new(cache))),
        Box::new(EmptyCatalog),
    );

    generator.generate_from_markup(PAGE, LOCATION).unwrap();
    generator.generate_from_markup(PAGE, LOCATION).unwrap();
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
fn test_premium_ecosystem_clause_depends_on_compatibility() {
    let compat = |n: usize| -> String {
        let items: String = (0..n).map(|i| format!("<li>Accessory {}</li>", i)).collect();
        format!(
            r#"<html><body><h1 class="product-title">ProDrill</h1>
            <ul class="compatibility">{}</ul></body></html>"#,
            items
        )
    };
    let premium = Competitor {
        brand: "DeWalt".into(),
        model: "DCD996B".into(),
        key_feature: String::new(),
        positioning: Positioning::Premium,
        price: 0.0,
        torque: 0.0,
    };

    let wide = extract_product(&PageDocument::parse(&compat(8), "")).with_competitors(vec![]);
    assert_eq!(wide.product.compatibility.len(), 8);
    assert!(compare_text(&wide, &premium).contains("ecosystem"));

    let narrow = extract_product(&PageDocument::parse(&compat(3), "")).with_competitors(vec![]);
    assert!(!compare_text(&narrow, &premium).contains("ecosystem"));
}

#[test]
fn test_insights_from_catalog_competitors() {
    let generator = ProfileGenerator::new(Assistant::offline(), Box::new(StaticCatalog::builtin()));
    let profile = generator.generate_from_markup(PAGE, LOCATION).unwrap();
    let insights = generator.insights(&profile.raw_record);

    // Catalog prices 199, 229, 149, 99 average 169
    assert_eq!(insights.price.yours, Some(179.99));
    assert_eq!(insights.price.average, Some(169.0));
    assert_eq!(insights.price.position, Some(MetricPosition::Above));
    assert_eq!(insights.torque.yours, Some(1200.0));
    assert_eq!(insights.torque.position, Some(MetricPosition::Above));

    let technology = insights.gaps.iter().find(|g| g.category == "technology").unwrap();
    assert_eq!(technology.gap, Gap::OverEmphasized);
}
