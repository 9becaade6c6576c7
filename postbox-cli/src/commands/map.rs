//! Map command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use postbox_core::MapMode;
use tracing::debug;

use crate::utils::{load_engine, load_records, OutputFormat, SourceArgs};

/// Execute the map command.
pub async fn execute(
    source: SourceArgs,
    mode: String,
    format: OutputFormat,
    geo_config: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let engine = load_engine(geo_config.as_deref())?;
    let mode = mode.parse::<MapMode>()?;
    let records = load_records(&source).await?;

    let map = engine.map_data(&records, mode);
    debug!(mode = %mode, buckets = map.buckets.len(), "Aggregated map");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&map)?),
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "{} {} {}",
                    "Map:".dimmed(),
                    map.map_name.bold(),
                    format!("(scale max {})", map.scale_max).dimmed()
                );
                println!();
                println!("   {:<20} {:>6} {:>6} {:>8}", "NAME", "TOTAL", "SENT", "RECEIVED");
            }
            for bucket in &map.buckets {
                println!(
                    "   {:<20} {:>6} {:>6} {:>8}",
                    bucket.name, bucket.total, bucket.sent, bucket.received
                );
            }
        }
    }

    Ok(())
}
