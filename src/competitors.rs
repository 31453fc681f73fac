//! Competitor resolution
//!
//! Generative lookup first, then the static catalog. A catalog miss is an
//! empty list, never an error.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::agent::CompletionOptions;
use crate::assistant::{Assistant, Prompt};
use crate::error::{ProdlensError, Result};
use crate::product::{Competitor, ExtractedProduct, Positioning};

const BUILTIN_CATALOG: &str = include_str!("../data/competitors.json");

const COMPETITOR_SYSTEM_PROMPT: &str = "You are a product market analyst. \
Given a product, list its 3 to 5 closest competitors currently on the market. \
Respond with a JSON object of the form \
{\"competitors\": [{\"brand\": \"...\", \"model\": \"...\", \"keyFeature\": \"...\", \
\"positioning\": \"premium|comparable|budget\"}]}. \
Positioning is relative to the given product.";

/// Static competitor lookup by exact product name
pub trait CompetitorCatalog {
    fn lookup(&self, product_name: &str) -> Vec<Competitor>;
}

/// Catalog backed by an in-memory name → competitors table
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, Vec<Competitor>>,
}

impl StaticCatalog {
    /// The dataset compiled into the binary
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, Vec<Competitor>> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| {
            ProdlensError::ConfigError(format!("Invalid catalog {}: {}", path.display(), e))
        })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<Competitor>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CompetitorCatalog for StaticCatalog {
    fn lookup(&self, product_name: &str) -> Vec<Competitor> {
        self.entries.get(product_name).cloned().unwrap_or_default()
    }
}

/// Catalog with no entries
pub struct EmptyCatalog;

impl CompetitorCatalog for EmptyCatalog {
    fn lookup(&self, _product_name: &str) -> Vec<Competitor> {
        Vec::new()
    }
}

/// Resolve competitors for an extracted product
///
/// Any generative failure falls back to the catalog without distinguishing
/// the cause.
pub fn resolve(
    product: &ExtractedProduct,
    assistant: &Assistant,
    catalog: &dyn CompetitorCatalog,
) -> Vec<Competitor> {
    match generate_competitors(product, assistant) {
        Ok(competitors) => {
            debug!(count = competitors.len(), "competitors from generative lookup");
            competitors
        }
        Err(e) => {
            if !matches!(e, ProdlensError::AiUnavailable) {
                warn!(error = %e, "generative competitor lookup failed, using catalog");
            }
            let competitors = catalog.lookup(&product.name);
            debug!(count = competitors.len(), "competitors from catalog");
            competitors
        }
    }
}

fn generate_competitors(
    product: &ExtractedProduct,
    assistant: &Assistant,
) -> Result<Vec<Competitor>> {
    let user = format!(
        "Product: {}\nBrand: {}\nCategory: {}",
        product.name, product.brand, product.category
    );
    let prompt = Prompt {
        operation: "competitors",
        product_name: &product.name,
        brand: &product.brand,
        system: COMPETITOR_SYSTEM_PROMPT,
        user: &user,
        options: CompletionOptions {
            max_tokens: 500,
            json_mode: true,
        },
    };

    assistant.ask_with(&prompt, parse_competitors)
}

/// Accepts `{"competitors": [...]}` or a bare array. An empty list counts as
/// a malformed reply so the catalog gets a chance.
pub fn parse_competitors(reply: &str) -> Result<Vec<Competitor>> {
    let value: Value = serde_json::from_str(reply)?;
    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("competitors")
            .and_then(Value::as_array)
            .ok_or_else(|| ProdlensError::Generative("Reply has no competitors array".into()))?,
        _ => return Err(ProdlensError::Generative("Unexpected competitors reply".into())),
    };

    let competitors: Vec<Competitor> = items
        .iter()
        .filter(|item| item.is_object())
        .map(normalize_competitor)
        .collect();

    if competitors.is_empty() {
        return Err(ProdlensError::Generative("No competitors in reply".into()));
    }
    Ok(competitors)
}

/// Coerce a loosely typed generated entry. Numeric fields stay zero.
pub fn normalize_competitor(item: &Value) -> Competitor {
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    Competitor {
        brand: text("brand").unwrap_or_else(|| "Unknown".to_string()),
        model: text("model").unwrap_or_default(),
        key_feature: text("keyFeature").unwrap_or_default(),
        positioning: Positioning::normalize(item.get("positioning").and_then(Value::as_str)),
        price: 0.0,
        torque: 0.0,
    }
}
