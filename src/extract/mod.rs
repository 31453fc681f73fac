//! Field extraction from product pages
//!
//! Every extractor is a pure function of the parsed document and always
//! produces a value; missing data falls through to a safe default. Fields with
//! several candidate sources are expressed as a [`FallbackChain`], where the
//! first strategy yielding an accepted value wins and later strategies are
//! never consulted.

mod alternatives;
mod brand;
mod category;
mod lists;
mod media;
mod name;
mod rating;
mod specs;

pub use alternatives::extract_alternatives;
pub use brand::extract_brand;
pub use category::extract_category;
pub use lists::{
    extract_compatibility, extract_cons, extract_features, extract_pros, extract_use_cases,
    MAX_FEATURES,
};
pub use media::{extract_image, extract_price, extract_tagline};
pub use name::{extract_name, is_valid_product_name, UNKNOWN_PRODUCT};
pub use rating::extract_rating;
pub use specs::{extract_specs, spec_key};

use tracing::debug;

use crate::document::PageDocument;
use crate::product::ExtractedProduct;

/// A single way of recovering a field
pub type Strategy<T> = fn(&PageDocument) -> Option<T>;

/// Ordered strategies evaluated until one yields a value the validator accepts
pub struct FallbackChain<T> {
    field: &'static str,
    strategies: Vec<(&'static str, Strategy<T>)>,
    validator: fn(&T) -> bool,
}

fn accept_any<T>(_: &T) -> bool {
    true
}

impl<T> FallbackChain<T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
            validator: accept_any::<T>,
        }
    }

    /// Append a strategy; strategies run in the order they were added
    pub fn strategy(mut self, name: &'static str, strategy: Strategy<T>) -> Self {
        self.strategies.push((name, strategy));
        self
    }

    pub fn validate(mut self, validator: fn(&T) -> bool) -> Self {
        self.validator = validator;
        self
    }

    /// First accepted value, or `None` when every strategy comes up empty
    pub fn run(&self, document: &PageDocument) -> Option<T> {
        for (name, strategy) in &self.strategies {
            if let Some(value) = strategy(document) {
                if (self.validator)(&value) {
                    debug!(field = self.field, strategy = *name, "field extracted");
                    return Some(value);
                }
            }
        }
        debug!(field = self.field, "no strategy matched, using default");
        None
    }

    pub fn run_or(&self, document: &PageDocument, default: T) -> T {
        self.run(document).unwrap_or(default)
    }
}

/// Run every field extractor and assemble the extracted record
pub fn extract_product(document: &PageDocument) -> ExtractedProduct {
    let product = ExtractedProduct {
        name: extract_name(document),
        brand: extract_brand(document),
        category: extract_category(document),
        tagline: extract_tagline(document),
        rating: extract_rating(document),
        image: extract_image(document),
        price: extract_price(document),
        specs: extract_specs(document),
        features: extract_features(document),
        use_cases: extract_use_cases(document),
        pros: extract_pros(document),
        cons: extract_cons(document),
        compatibility: extract_compatibility(document),
        alternatives: extract_alternatives(document),
    };

    debug!(
        name = %product.name,
        brand = %product.brand,
        specs = product.specs.len(),
        features = product.features.len(),
        "product extracted"
    );
    product
}
