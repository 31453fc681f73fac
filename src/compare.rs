//! Comparison engine
//!
//! Pure functions over a resolved record: positioning-driven comparison prose
//! and gap analysis of feature emphasis.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::product::{humanize_key, Competitor, Positioning, ProductRecord};

/// Features that mark a product as stepping up from a budget tier
const UPGRADE_KEYWORDS: &[&str] = &["advanced", "premium", "enhanced", "intelligent"];

/// Share of the average within which a metric counts as level
const AT_TOLERANCE: f64 = 0.05;

/// Ratio either side must exceed before a gap is reported
const GAP_RATIO: f64 = 1.5;

static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d[\d,]*(?:\.\d+)?)").expect("Invalid number regex")
});

/// Emphasis categories and the keywords that signal them
const EMPHASIS_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "durability",
        &["durable", "rugged", "tough", "long-lasting", "heavy-duty", "sturdy", "reinforced"],
    ),
    ("warranty", &["warranty", "guarantee", "guaranteed", "replacement"]),
    (
        "usability",
        &["ergonomic", "lightweight", "compact", "easy", "comfortable", "grip", "balanced"],
    ),
    (
        "technology",
        &["smart", "brushless", "digital", "intelligent", "electronic", "bluetooth", "led"],
    ),
    ("power", &["torque", "power", "powerful", "rpm", "voltage", "speed", "high-performance"]),
];

/// Comparison prose for one competitor, shaped by its positioning
pub fn compare_text(record: &ProductRecord, competitor: &Competitor) -> String {
    let sentences = match competitor.positioning {
        Positioning::Premium => premium_sentences(record, competitor),
        Positioning::Comparable => comparable_sentences(record, competitor),
        Positioning::Budget => budget_sentences(record, competitor),
    };
    sentences.join(" ")
}

fn premium_sentences(record: &ProductRecord, competitor: &Competitor) -> Vec<String> {
    let product = &record.product;
    let rival = competitor.label();
    let mut sentences = Vec::new();

    let top_specs: Vec<String> = product
        .specs
        .iter()
        .take(2)
        .map(|(key, value)| format!("{} of {}", humanize_key(key).to_lowercase(), value))
        .collect();

    if top_specs.is_empty() {
        sentences.push(format!(
            "The {} delivers professional-grade reliability without the premium price of the {}.",
            product.name, rival
        ));
    } else {
        sentences.push(format!(
            "Against the {}, the {} holds its own with a {}.",
            rival,
            product.name,
            top_specs.join(" and a ")
        ));
    }

    if product.compatibility.len() > 5 {
        sentences.push(format!(
            "It also plugs into a wide ecosystem of {} compatible tools and accessories.",
            product.compatibility.len()
        ));
    }

    if competitor.key_feature.is_empty() {
        sentences.push(format!("For most users, the {} is the ideal choice.", product.name));
    } else {
        sentences.push(format!(
            "The {} is known for its {}, while the {} focuses on the essentials at a lower cost.",
            rival, competitor.key_feature, product.name
        ));
    }
    sentences
}

fn comparable_sentences(record: &ProductRecord, competitor: &Competitor) -> Vec<String> {
    let product = &record.product;
    let mut sentences = vec![format!(
        "The {} is comparable in core functionality to the {}.",
        product.name,
        competitor.label()
    )];

    if product.compatibility.len() > 10 {
        sentences.push(format!(
            "It works within a broader ecosystem of {} compatible products.",
            product.compatibility.len()
        ));
    }

    if let Some(warranty) = product.spec("warranty").filter(|w| w.contains('5')) {
        sentences.push(format!(
            "Its {} warranty gives it an edge over most rivals in its class.",
            warranty
        ));
    }

    if product.features.len() > 5 {
        let highlights: Vec<&str> = product.features.iter().take(2).map(String::as_str).collect();
        sentences.push(format!("Standout features include {}.", highlights.join(" and ")));
    } else {
        sentences.push("Both are dependable choices built for everyday reliability.".to_string());
    }
    sentences
}

fn budget_sentences(record: &ProductRecord, competitor: &Competitor) -> Vec<String> {
    let product = &record.product;
    let mut sentences = vec![format!(
        "Where the {} is built for budget-conscious buyers, the {} is made for users who need more.",
        competitor.label(),
        product.name
    )];

    let upgrade = product.features.iter().find(|feature| {
        let lower = feature.to_lowercase();
        UPGRADE_KEYWORDS.iter().any(|k| lower.contains(k))
    });
    match upgrade {
        Some(feature) => sentences.push(format!("It offers {}, which sets it apart.", feature)),
        None => sentences.push("Its enhanced capabilities set it apart.".to_string()),
    }

    if let Some(warranty) = product.spec("warranty") {
        sentences.push(format!("It is also backed by a {} warranty.", warranty));
    }

    sentences.push("For anyone who relies on their tools, it is a worthwhile upgrade.".to_string());
    sentences
}

/// One comparison entry per competitor, keyed by label, in resolution order
pub fn comparison_map(record: &ProductRecord) -> IndexMap<String, String> {
    record
        .competitors
        .iter()
        .map(|c| (c.label(), compare_text(record, c)))
        .collect()
}

/// Where the product sits relative to the competitor average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricPosition {
    Above,
    Below,
    At,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricInsight {
    pub yours: Option<f64>,
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<MetricPosition>,
}

impl MetricInsight {
    fn new(yours: Option<f64>, average: Option<f64>) -> Self {
        let position = match (yours, average) {
            (Some(y), Some(a)) => Some(position_of(y, a)),
            _ => None,
        };
        Self {
            yours,
            average,
            position,
        }
    }
}

fn position_of(yours: f64, average: f64) -> MetricPosition {
    if (yours - average).abs() <= average.abs() * AT_TOLERANCE {
        MetricPosition::At
    } else if yours > average {
        MetricPosition::Above
    } else {
        MetricPosition::Below
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gap {
    UnderEmphasized,
    OverEmphasized,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapFinding {
    pub category: &'static str,
    pub gap: Gap,
    pub message: String,
}

/// Gap analysis output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub price: MetricInsight,
    pub torque: MetricInsight,
    pub rating: MetricInsight,
    pub gaps: Vec<GapFinding>,
}

/// Metric triples plus emphasis gaps for a resolved record
pub fn analyze(record: &ProductRecord) -> Insights {
    let product = &record.product;
    let competitors = &record.competitors;

    let price = MetricInsight::new(
        product.price.as_ref().map(|m| m.amount),
        average_nonzero(competitors.iter().map(|c| c.price)),
    );
    let torque = MetricInsight::new(
        product.spec("torque").and_then(leading_number),
        average_nonzero(competitors.iter().map(|c| c.torque)),
    );
    // Competitors carry no ratings, so the average stays absent
    let rating = MetricInsight::new(product.rating.as_ref().and_then(|r| r.score), None);

    Insights {
        price,
        torque,
        rating,
        gaps: emphasis_gaps(&product.features, competitors),
    }
}

fn average_nonzero(values: impl Iterator<Item = f64>) -> Option<f64> {
    let present: Vec<f64> = values.filter(|v| *v > 0.0).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// First number in a spec value: "1,200 in-lbs" → 1200
fn leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER_RE
        .captures(value)
        .and_then(|c| c[1].replace(',', "").parse().ok())
}

fn keyword_hits<'a>(features: impl IntoIterator<Item = &'a str>, keywords: &[&str]) -> usize {
    features
        .into_iter()
        .map(|feature| {
            let lower = feature.to_lowercase();
            keywords.iter().filter(|k| lower.contains(*k)).count()
        })
        .sum()
}

/// Compare keyword emphasis in the product's features against the
/// per-competitor average of their key features
pub fn emphasis_gaps(features: &[String], competitors: &[Competitor]) -> Vec<GapFinding> {
    let mut findings = Vec::new();

    for &(category, keywords) in EMPHASIS_CATEGORIES {
        let ours = keyword_hits(features.iter().map(String::as_str), keywords) as f64;
        let theirs = if competitors.is_empty() {
            0.0
        } else {
            let total = keyword_hits(competitors.iter().map(|c| c.key_feature.as_str()), keywords);
            total as f64 / competitors.len() as f64
        };

        if theirs > ours * GAP_RATIO {
            findings.push(GapFinding {
                category,
                gap: Gap::UnderEmphasized,
                message: format!(
                    "Competitors emphasize {} more than this listing does; consider highlighting it.",
                    category
                ),
            });
        } else if ours > theirs * GAP_RATIO {
            findings.push(GapFinding {
                category,
                gap: Gap::OverEmphasized,
                message: format!(
                    "This listing emphasizes {} more than competitors do, a clear differentiator.",
                    category
                ),
            });
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{ExtractedProduct, Money, Rating};

    fn product() -> ExtractedProduct {
        ExtractedProduct {
            name: "ProDrill 2000X".into(),
            brand: "PowerMax".into(),
            category: "Power Tools".into(),
            tagline: String::new(),
            rating: None,
            image: None,
            price: None,
            specs: IndexMap::new(),
            features: vec![],
            use_cases: vec![],
            pros: vec![],
            cons: vec![],
            compatibility: vec![],
            alternatives: vec![],
        }
    }

    fn competitor(positioning: Positioning, key_feature: &str) -> Competitor {
        Competitor {
            brand: "DeWalt".into(),
            model: "DCD996B".into(),
            key_feature: key_feature.into(),
            positioning,
            price: 0.0,
            torque: 0.0,
        }
    }

    fn compat(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Tool {i}")).collect()
    }

    #[test]
    fn test_premium_ecosystem_clause_needs_more_than_five() {
        let rival = competitor(Positioning::Premium, "");
        let mut p = product();
        p.compatibility = compat(8);
        let with = compare_text(&p.clone().with_competitors(vec![]), &rival);
        assert!(with.contains("ecosystem"));

        p.compatibility = compat(3);
        let without = compare_text(&p.with_competitors(vec![]), &rival);
        assert!(!without.contains("ecosystem"));
    }

    #[test]
    fn test_premium_uses_top_two_specs_and_key_feature() {
        let mut p = product();
        p.specs.insert("torque".into(), "1200 in-lbs".into());
        p.specs.insert("battery_voltage".into(), "20V".into());
        p.specs.insert("weight".into(), "3.5 lbs".into());
        let text = compare_text(
            &p.with_competitors(vec![]),
            &competitor(Positioning::Premium, "three-speed transmission"),
        );
        assert!(text.contains("torque of 1200 in-lbs"));
        assert!(text.contains("battery voltage of 20V"));
        assert!(!text.contains("3.5 lbs"));
        assert!(text.contains("three-speed transmission"));
    }

    #[test]
    fn test_premium_generic_sentences() {
        let record = product().with_competitors(vec![]);
        let text = compare_text(&record, &competitor(Positioning::Premium, ""));
        assert!(text.contains("professional-grade reliability"));
        assert!(text.ends_with("is the ideal choice."));
    }

    #[test]
    fn test_comparable_warranty_and_features() {
        let mut p = product();
        p.specs.insert("warranty".into(), "5-year limited".into());
        p.features = (0..6).map(|i| format!("Feature number {i}")).collect();
        let record = p.with_competitors(vec![]);
        let text = compare_text(&record, &competitor(Positioning::Comparable, ""));
        assert!(text.starts_with("The ProDrill 2000X is comparable in core functionality"));
        assert!(text.contains("5-year limited warranty"));
        assert!(text.contains("Feature number 0 and Feature number 1"));
        assert!(!text.contains("ecosystem"));
    }

    #[test]
    fn test_comparable_without_five_year_warranty() {
        let mut p = product();
        p.specs.insert("warranty".into(), "3-year limited".into());
        p.compatibility = compat(11);
        let record = p.with_competitors(vec![]);
        let text = compare_text(&record, &competitor(Positioning::Comparable, ""));
        assert!(!text.contains("warranty"));
        assert!(text.contains("broader ecosystem of 11"));
        assert!(text.contains("everyday reliability"));
    }

    #[test]
    fn test_budget_picks_first_upgrade_feature() {
        let mut p = product();
        p.features = vec![
            "Keyless chuck for fast bit changes".into(),
            "Intelligent clutch with 24 settings".into(),
            "Advanced LED work light".into(),
        ];
        p.specs.insert("warranty".into(), "3-year".into());
        let record = p.with_competitors(vec![]);
        let text = compare_text(&record, &competitor(Positioning::Budget, ""));
        assert!(text.contains("It offers Intelligent clutch with 24 settings"));
        assert!(text.contains("backed by a 3-year warranty"));
        assert!(text.ends_with("it is a worthwhile upgrade."));
    }

    #[test]
    fn test_budget_generic_capabilities() {
        let record = product().with_competitors(vec![]);
        let text = compare_text(&record, &competitor(Positioning::Budget, ""));
        assert!(text.contains("enhanced capabilities"));
        assert!(!text.contains("warranty"));
    }

    #[test]
    fn test_comparison_map_preserves_resolution_order() {
        let mut second = competitor(Positioning::Budget, "");
        second.brand = "Ryobi".into();
        second.model = "P252".into();
        let record = product().with_competitors(vec![competitor(Positioning::Premium, ""), second]);
        let keys: Vec<_> = comparison_map(&record).into_keys().collect();
        assert_eq!(keys, vec!["DeWalt DCD996B", "Ryobi P252"]);
    }

    #[test]
    fn test_metric_positions() {
        let mut p = product();
        p.price = Some(Money::usd(150.0));
        p.specs.insert("torque".into(), "1,200 in-lbs".into());
        p.rating = Some(Rating { score: Some(4.6), max_score: 5, review_count: 10 });

        let mut cheap = competitor(Positioning::Budget, "");
        cheap.price = 100.0;
        cheap.torque = 1190.0;
        let generated = competitor(Positioning::Premium, "");
        let insights = analyze(&p.with_competitors(vec![cheap, generated]));

        assert_eq!(insights.price.average, Some(100.0));
        assert_eq!(insights.price.position, Some(MetricPosition::Above));
        assert_eq!(insights.torque.yours, Some(1200.0));
        assert_eq!(insights.torque.position, Some(MetricPosition::At));
        assert_eq!(insights.rating.yours, Some(4.6));
        assert!(insights.rating.position.is_none());
    }

    #[test]
    fn test_metric_absent_without_price() {
        let insights = analyze(&product().with_competitors(vec![]));
        assert!(insights.price.yours.is_none());
        assert!(insights.price.average.is_none());
        assert!(insights.price.position.is_none());
    }

    #[test]
    fn test_emphasis_gaps() {
        let features = vec![
            "Brushless motor with smart electronic clutch".to_string(),
            "Compact body".to_string(),
        ];
        let competitors = vec![
            competitor(Positioning::Premium, "rugged, durable metal gearbox"),
            competitor(Positioning::Comparable, "heavy-duty build"),
        ];
        let gaps = emphasis_gaps(&features, &competitors);

        let durability = gaps.iter().find(|g| g.category == "durability").unwrap();
        assert_eq!(durability.gap, Gap::UnderEmphasized);
        let technology = gaps.iter().find(|g| g.category == "technology").unwrap();
        assert_eq!(technology.gap, Gap::OverEmphasized);
        assert!(gaps.iter().all(|g| g.category != "warranty"));
    }

    #[test]
    fn test_no_gaps_when_balanced() {
        let features = vec!["Powerful motor".to_string()];
        let competitors = vec![competitor(Positioning::Premium, "high torque, powerful output")];
        assert!(emphasis_gaps(&features, &competitors).is_empty());
    }
}
