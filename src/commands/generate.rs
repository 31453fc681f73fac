//! Profile commands: generate, extract

use colored::Colorize;

use prodlens::compare::{Gap, Insights, MetricInsight, MetricPosition};
use prodlens::config::Config;
use prodlens::document::PageDocument;
use prodlens::error::Result;
use prodlens::extract::extract_product;
use prodlens::fetch::{is_url, FileMarkupSource, HttpMarkupSource, MarkupSource};
use prodlens::product::{humanize_key, ExtractedProduct};
use prodlens::profile::{Profile, ProfileGenerator};

/// Fetch or read the target and parse it. A saved file takes its location
/// from `--location` so the subject product can still be identified.
fn load_document(config: &Config, target: &str, location: Option<String>) -> Result<PageDocument> {
    let page = if is_url(target) {
        HttpMarkupSource::new(&config.fetch).fetch(target)?
    } else {
        FileMarkupSource.fetch(target)?
    };

    let location = match location {
        Some(loc) => loc,
        None if is_url(&page.location) => page.location.clone(),
        None => String::new(),
    };
    Ok(PageDocument::parse(&page.markup, &location))
}

/// Generate a full profile
pub fn cmd_generate(
    target: &str,
    location: Option<String>,
    offline: bool,
    json: bool,
    embed: bool,
    insights: bool,
) -> Result<()> {
    let config = Config::load()?;
    let generator = ProfileGenerator::from_config(&config, offline)?;

    if !json && !embed {
        println!("\n{} {}", "Profiling".cyan().bold(), target);
    }

    let document = load_document(&config, target, location)?;
    let profile = generator.generate(document)?;
    let gaps = insights.then(|| generator.insights(&profile.raw_record));

    if json {
        let mut output = serde_json::to_value(&profile)?;
        if let Some(ref gaps) = gaps {
            output["insights"] = serde_json::to_value(gaps)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if embed {
        print!("{}", profile.embed_html()?);
        return Ok(());
    }

    print_profile(&profile);
    if let Some(ref gaps) = gaps {
        print_insights(gaps);
    }
    Ok(())
}

/// Extraction only
pub fn cmd_extract(target: &str, location: Option<String>, json: bool) -> Result<()> {
    let config = Config::load()?;
    let document = load_document(&config, target, location)?;
    let product = extract_product(&document);

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        print_product(&product);
    }
    Ok(())
}

fn print_product(product: &ExtractedProduct) {
    println!("\n{}", product.name.bold());
    println!("  {} {}", "Brand:".dimmed(), product.brand);
    println!("  {} {}", "Category:".dimmed(), product.category);
    if !product.tagline.is_empty() {
        println!("  {} {}", "Tagline:".dimmed(), product.tagline);
    }
    if let Some(ref price) = product.price {
        println!("  {} {}", "Price:".dimmed(), price);
    }
    if let Some((score, max_score, reviews)) = product.rating.as_ref().and_then(|r| r.scored()) {
        println!("  {} {}/{} ({} reviews)", "Rating:".dimmed(), score, max_score, reviews);
    }
    if let Some(ref image) = product.image {
        println!("  {} {}", "Image:".dimmed(), image);
    }

    if !product.specs.is_empty() {
        println!("\n  {}", "Specs".bold());
        for (key, value) in &product.specs {
            println!("    {}: {}", humanize_key(key), value);
        }
    }

    print_list("Features", &product.features);
    print_list("Use cases", &product.use_cases);
    print_list("Pros", &product.pros);
    print_list("Cons", &product.cons);
    print_list("Compatibility", &product.compatibility);

    if !product.alternatives.is_empty() {
        println!("\n  {}", "Alternatives".bold());
        for alt in &product.alternatives {
            match alt.price {
                Some(ref price) => println!("    - {} ({})", alt.name, price),
                None => println!("    - {}", alt.name),
            }
        }
    }
    println!();
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n  {}", title.bold());
    for item in items {
        println!("    - {}", item);
    }
}

fn print_profile(profile: &Profile) {
    print_product(&profile.raw_record.product);

    let competitors = &profile.raw_record.competitors;
    if competitors.is_empty() {
        println!("  {}", "No competitors found".dimmed());
    } else {
        println!("  {}", "Competitors".bold());
        for competitor in competitors {
            println!("    - {} [{}]", competitor.label(), competitor.positioning);
        }
    }

    let source = if profile.metadata.ai_powered {
        "generated".green()
    } else {
        "template".yellow()
    };
    println!("\n  {} ({})", "Narrative".bold(), source);
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", profile.narrative);
    println!("{}\n", "─".repeat(60).dimmed());
}

fn print_insights(insights: &Insights) {
    println!("  {}", "Insights".bold());
    print_metric("Price", &insights.price);
    print_metric("Torque", &insights.torque);
    print_metric("Rating", &insights.rating);

    if insights.gaps.is_empty() {
        println!("    {}", "No emphasis gaps".dimmed());
    }
    for finding in &insights.gaps {
        let marker = match finding.gap {
            Gap::UnderEmphasized => "▼".red(),
            Gap::OverEmphasized => "▲".green(),
        };
        println!("    {} {}", marker, finding.message);
    }
    println!();
}

fn print_metric(label: &str, metric: &MetricInsight) {
    let fmt = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());
    let position = match metric.position {
        Some(MetricPosition::Above) => "above average".to_string(),
        Some(MetricPosition::Below) => "below average".to_string(),
        Some(MetricPosition::At) => "at average".to_string(),
        None => String::new(),
    };
    println!(
        "    {:<8} yours {:>8}  avg {:>8}  {}",
        label,
        fmt(metric.yours),
        fmt(metric.average),
        position.dimmed()
    );
}
