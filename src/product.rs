//! Product data model
//!
//! A record is built in two stages: extraction produces an
//! [`ExtractedProduct`] from a parsed page, and competitor resolution turns it
//! into a [`ProductRecord`]. Neither stage is mutated after construction.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Customer rating recovered from a rating marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub score: Option<f64>,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    /// Ignored downstream whenever `score` is `None`
    #[serde(default)]
    pub review_count: u64,
}

fn default_max_score() -> u32 {
    5
}

impl Rating {
    /// Score paired with its scale, only when a score was actually parsed
    pub fn scored(&self) -> Option<(f64, u32, u64)> {
        self.score.map(|s| (s, self.max_score, self.review_count))
    }
}

/// Offer price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Money {
    pub fn usd(amount: f64) -> Self {
        Self {
            amount,
            currency: default_currency(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.currency.eq_ignore_ascii_case("USD") {
            write!(f, "${:.2}", self.amount)
        } else {
            write!(f, "{:.2} {}", self.amount, self.currency)
        }
    }
}

/// A related product listed on the page itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeProduct {
    pub name: String,
    /// Formatted as found, e.g. "$179.99"
    pub price: Option<String>,
    pub description: String,
}

/// Market tier of a competitor relative to the subject product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    Premium,
    #[default]
    Comparable,
    Budget,
}

impl Positioning {
    /// Normalize a loosely typed value. Anything unrecognized, including a
    /// missing value, becomes `Comparable`.
    pub fn normalize(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("premium") => Positioning::Premium,
            Some("budget") => Positioning::Budget,
            _ => Positioning::Comparable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Positioning::Premium => "premium",
            Positioning::Comparable => "comparable",
            Positioning::Budget => "budget",
        }
    }
}

/// Lenient like [`Positioning::normalize`]: any unrecognized value, including
/// a non-string, reads as `Comparable`
impl<'de> Deserialize<'de> for Positioning {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Positioning::normalize(value.as_str()))
    }
}

impl fmt::Display for Positioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competing product
///
/// `price` and `torque` are only meaningful for catalog entries; generated
/// competitors always carry zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub key_feature: String,
    #[serde(default)]
    pub positioning: Positioning,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub torque: f64,
}

impl Competitor {
    /// Display label, also the comparison map key
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

/// Facts recovered from a product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProduct {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub tagline: String,
    pub rating: Option<Rating>,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    /// Insertion order is discovery order
    pub specs: IndexMap<String, String>,
    pub features: Vec<String>,
    pub use_cases: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub compatibility: Vec<String>,
    pub alternatives: Vec<AlternativeProduct>,
}

impl ExtractedProduct {
    /// Attach resolved competitors, producing the enriched record
    pub fn with_competitors(self, competitors: Vec<Competitor>) -> ProductRecord {
        ProductRecord {
            product: self,
            competitors,
        }
    }

    /// Spec value by normalized key
    pub fn spec(&self, key: &str) -> Option<&str> {
        self.specs.get(key).map(String::as_str)
    }
}

/// Extracted facts plus resolved competitors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(flatten)]
    pub product: ExtractedProduct,
    pub competitors: Vec<Competitor>,
}

/// Turn a spec key like `battery_voltage` into `Battery Voltage`
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
