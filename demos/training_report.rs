//! Training Report Example
//!
//! Builds an organization from config, runs the training rounds, and prints
//! the per-user and per-archetype summaries.
//!
//! Run with: cargo run --example training_report [config.json]
//! Log level: RUST_LOG=phish_sim=debug

use std::path::PathBuf;

use anyhow::Context;
use phish_sim::config::SimulationConfig;
use phish_sim::summary::{outcomes_by_timestamp, outcomes_by_user};
use phish_sim::trial::TIMESTAMP_FORMAT;
use phish_sim::{Archetype, Organization};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = SimulationConfig::load(path.as_deref()).context("loading simulation config")?;

    let mut builder = Organization::builder(config.organization_config());
    if let Some(seed) = config.seed {
        builder = builder.seed(seed);
    }
    let mut org = builder.build().context("building organization")?;
    println!("{org}");

    org.run_training().context("running training")?;
    let results = org.collect_results();
    println!("\nCollected {} trial records\n", results.len());

    // -------------------------------------------------------------------------
    // 1. Worst performers
    // -------------------------------------------------------------------------
    println!("1. Users by fails (top 10)");
    println!(
        "   {:<34} {:<10} {:<12} {:>5} {:>6} {:>9}",
        "user_id", "name", "type", "fails", "misses", "successes"
    );
    for summary in outcomes_by_user(&results).iter().take(10) {
        println!(
            "   {:<34} {:<10} {:<12} {:>5} {:>6} {:>9}",
            summary.user_id,
            summary.name,
            summary.archetype,
            summary.counts.fails,
            summary.counts.misses,
            summary.counts.successes
        );
    }

    // -------------------------------------------------------------------------
    // 2. Learning curve per archetype
    // -------------------------------------------------------------------------
    for archetype in Archetype::ALL {
        println!("\n2. {archetype} learning curve");
        println!("   {:<19} {:>5} {:>9}", "timestamp", "fails", "successes");
        for point in outcomes_by_timestamp(&results, Some(archetype.as_str())) {
            println!(
                "   {:<19} {:>5} {:>9}",
                point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                point.counts.fails,
                point.counts.successes
            );
        }
    }

    Ok(())
}
