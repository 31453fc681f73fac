//! Schema.org-style structured data for embedding

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::product::{humanize_key, ProductRecord};

/// Map a resolved record and its comparisons into a Product object.
///
/// Optional sub-objects (`image`, `offers`, `aggregateRating`,
/// `competitor_comparison`) are omitted entirely when there is nothing to say.
pub fn assemble(record: &ProductRecord, comparisons: &IndexMap<String, String>) -> Value {
    let product = &record.product;
    let mut data = Map::new();

    data.insert("@context".into(), json!("https://schema.org"));
    data.insert("@type".into(), json!("Product"));
    data.insert("name".into(), json!(product.name));
    data.insert("description".into(), json!(product.tagline));
    data.insert("category".into(), json!(product.category));
    data.insert(
        "brand".into(),
        json!({
            "@type": "Brand",
            "name": product.brand,
        }),
    );

    if let Some(ref image) = product.image {
        data.insert("image".into(), json!(image));
    }

    if let Some(ref price) = product.price {
        data.insert(
            "offers".into(),
            json!({
                "@type": "Offer",
                "price": price.amount,
                "priceCurrency": price.currency,
            }),
        );
    }

    if let Some((score, max_score, reviews)) = product.rating.as_ref().and_then(|r| r.scored()) {
        data.insert(
            "aggregateRating".into(),
            json!({
                "@type": "AggregateRating",
                "ratingValue": score,
                "bestRating": max_score,
                "reviewCount": reviews,
            }),
        );
    }

    let properties: Vec<Value> = product
        .specs
        .iter()
        .map(|(key, value)| {
            json!({
                "@type": "PropertyValue",
                "name": humanize_key(key),
                "value": value,
            })
        })
        .collect();
    data.insert("additionalProperty".into(), Value::Array(properties));

    if !comparisons.is_empty() {
        data.insert("competitor_comparison".into(), json!(comparisons));
    }

    Value::Object(data)
}
