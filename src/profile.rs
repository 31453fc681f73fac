//! End-to-end profile generation
//!
//! Extraction, then competitor resolution, then narrative synthesis, in that
//! order. The narrative template depends on resolved competitors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::Assistant;
use crate::compare::{analyze, comparison_map, Insights};
use crate::competitors::{resolve, CompetitorCatalog, StaticCatalog};
use crate::config::Config;
use crate::document::PageDocument;
use crate::error::Result;
use crate::extract::extract_product;
use crate::narrative::synthesize;
use crate::product::ProductRecord;
use crate::structured::assemble;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    /// True when the narrative came from the generative collaborator
    pub ai_powered: bool,
}

/// Everything produced for one product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub metadata: ProfileMetadata,
    pub structured_data: serde_json::Value,
    pub narrative: String,
    pub raw_record: ProductRecord,
}

impl Profile {
    /// HTML fragment with a JSON-LD block followed by the narrative
    pub fn embed_html(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(&self.structured_data)?.replace("</", "<\\/");

        let mut html = String::new();
        html.push_str("<script type=\"application/ld+json\">\n");
        html.push_str(&json);
        html.push_str("\n</script>\n");
        html.push_str("<section class=\"product-narrative\">\n");
        for paragraph in self
            .narrative
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            html.push_str(&format!("  <p>{}</p>\n", escape_html(paragraph)));
        }
        html.push_str("</section>\n");
        Ok(html)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Runs the full pipeline against an injected assistant and catalog
pub struct ProfileGenerator {
    assistant: Assistant,
    catalog: Box<dyn CompetitorCatalog>,
}

impl ProfileGenerator {
    pub fn new(assistant: Assistant, catalog: Box<dyn CompetitorCatalog>) -> Self {
        Self { assistant, catalog }
    }

    /// Generator wired from configuration; `offline` skips the generative
    /// collaborator entirely
    pub fn from_config(config: &Config, offline: bool) -> Result<Self> {
        let catalog: Box<dyn CompetitorCatalog> = match config.catalog_path {
            Some(ref path) => Box::new(StaticCatalog::from_json_file(path)?),
            None => Box::new(StaticCatalog::builtin()),
        };
        let assistant = if offline {
            Assistant::offline()
        } else {
            Assistant::from_config(config)
        };
        Ok(Self::new(assistant, catalog))
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    /// Extract and enrich a record without writing a narrative
    pub fn resolve_record(&self, document: PageDocument) -> ProductRecord {
        let product = extract_product(&document);
        drop(document);
        let competitors = resolve(&product, &self.assistant, self.catalog.as_ref());
        product.with_competitors(competitors)
    }

    pub fn generate(&self, document: PageDocument) -> Result<Profile> {
        let record = self.resolve_record(document);
        let narrative = synthesize(&record, &self.assistant)?;
        let comparisons = comparison_map(&record);
        let structured_data = assemble(&record, &comparisons);

        info!(
            product = %record.product.name,
            competitors = record.competitors.len(),
            ai_powered = narrative.ai_generated,
            "profile generated"
        );

        Ok(Profile {
            metadata: ProfileMetadata {
                generated_at: Utc::now(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ai_powered: narrative.ai_generated,
            },
            structured_data,
            narrative: narrative.text,
            raw_record: record,
        })
    }

    pub fn generate_from_markup(&self, markup: &str, location: &str) -> Result<Profile> {
        self.generate(PageDocument::parse(markup, location))
    }

    /// Gap analysis for a resolved record
    pub fn insights(&self, record: &ProductRecord) -> Insights {
        analyze(record)
    }
}
