//! Narrative synthesis
//!
//! A generative narrative when the collaborator is available, otherwise a
//! deterministic template built from the record and the first competitor.

use tracing::{debug, warn};

use crate::agent::CompletionOptions;
use crate::assistant::{Assistant, Prompt};
use crate::compare::compare_text;
use crate::error::{ProdlensError, Result};
use crate::product::{humanize_key, ProductRecord};

pub const MIN_WORDS: usize = 100;
pub const MAX_WORDS: usize = 300;

const NARRATIVE_SYSTEM_PROMPT: &str = "You write product narratives for shoppers. \
Address the reader directly in the second person (\"you\") with a warm, conversational tone. \
Write 250 to 350 words of plain prose. Do not use headings, lists, or markdown.";

#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub text: String,
    /// True when the text came from the generative collaborator
    pub ai_generated: bool,
}

/// Produce a narrative, falling back to the template on any generative failure
pub fn synthesize(record: &ProductRecord, assistant: &Assistant) -> Result<Narrative> {
    match generate_narrative(record, assistant) {
        Ok(text) => {
            debug!(words = text.split_whitespace().count(), "narrative from generative path");
            Ok(Narrative {
                text,
                ai_generated: true,
            })
        }
        Err(e) => {
            if !matches!(e, ProdlensError::AiUnavailable) {
                warn!(error = %e, "generative narrative failed, using template");
            }
            Ok(Narrative {
                text: fallback_narrative(record)?,
                ai_generated: false,
            })
        }
    }
}

fn generate_narrative(record: &ProductRecord, assistant: &Assistant) -> Result<String> {
    let product = &record.product;
    let user = narrative_prompt(record);
    assistant.ask(&Prompt {
        operation: "narrative",
        product_name: &product.name,
        brand: &product.brand,
        system: NARRATIVE_SYSTEM_PROMPT,
        user: &user,
        options: CompletionOptions {
            max_tokens: assistant.max_tokens(),
            json_mode: false,
        },
    })
}

/// User prompt describing the product
pub fn narrative_prompt(record: &ProductRecord) -> String {
    let product = &record.product;
    let mut prompt = format!(
        "Product: {}\nBrand: {}\nCategory: {}\n",
        product.name, product.brand, product.category
    );

    if !product.specs.is_empty() {
        prompt.push_str("Key specs:\n");
        for (key, value) in product.specs.iter().take(5) {
            prompt.push_str(&format!("- {}: {}\n", humanize_key(key), value));
        }
    }

    if !product.features.is_empty() {
        prompt.push_str("Features:\n");
        for feature in product.features.iter().take(10) {
            prompt.push_str(&format!("- {}\n", feature));
        }
    }

    if let Some((score, max_score, reviews)) = product.rating.as_ref().and_then(|r| r.scored()) {
        prompt.push_str(&format!("Rating: {}/{} from {} reviews\n", score, max_score, reviews));
    }

    if !product.tagline.is_empty() {
        prompt.push_str(&format!("Tagline: {}\n", product.tagline));
    }
    prompt
}

/// Deterministic narrative. Fails only on a record without a name.
pub fn fallback_narrative(record: &ProductRecord) -> Result<String> {
    let product = &record.product;
    if product.name.trim().is_empty() {
        return Err(ProdlensError::InvalidRecord("product has no name".into()));
    }

    let mut text = format!(
        "The {} is a {} from {}. ",
        product.name,
        product.category.to_lowercase(),
        product.brand
    );

    if !product.specs.is_empty() {
        let specs: Vec<String> = product
            .specs
            .iter()
            .take(5)
            .map(|(key, value)| format!("{}: {}", humanize_key(key), value))
            .collect();
        text.push_str(&format!("Key specifications include {}. ", specs.join(", ")));
    }

    if !product.features.is_empty() {
        let features: Vec<&str> = product.features.iter().take(3).map(String::as_str).collect();
        text.push_str(&format!("Notable features: {}. ", features.join("; ")));
    }

    if let Some((score, max_score, reviews)) = product.rating.as_ref().and_then(|r| r.scored()) {
        text.push_str(&format!(
            "Customer rating: {}/{} from {} reviews. ",
            score, max_score, reviews
        ));
    }

    if let Some(first) = record.competitors.first() {
        text.push_str(&compare_text(record, first));
    }

    Ok(truncate_to_word_count(text.trim(), MIN_WORDS, MAX_WORDS))
}

/// Bound text to `max_words`, preferring to end on a sentence.
///
/// Text within the limit is returned unchanged. Longer text is cut to
/// `max_words` words, then trimmed back to its last period when that period
/// lies past the `min_words / max_words` share of the cut text.
pub fn truncate_to_word_count(text: &str, min_words: usize, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }

    let cut = words[..max_words].join(" ");
    let threshold = cut.len() * min_words / max_words.max(1);
    match cut.rfind('.') {
        Some(idx) if idx > threshold => cut[..=idx].to_string(),
        _ => cut,
    }
}
