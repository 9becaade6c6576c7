//! Stats command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use crate::utils::{load_engine, load_records, OutputFormat, SourceArgs};

/// Execute the stats command.
pub async fn execute(
    source: SourceArgs,
    format: OutputFormat,
    geo_config: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let engine = load_engine(geo_config.as_deref())?;
    let records = load_records(&source).await?;

    let stats = engine.stats(&records);
    let facets = engine.facets(&records);

    match format {
        OutputFormat::Json => {
            let output = json!({ "stats": stats, "facets": facets });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if !quiet {
                println!("{}", "Collection summary".bold());
                println!();
            }
            println!("   {} {}", "Received:".dimmed(), stats.receive_count.to_string().green());
            println!("   {} {}", "Sent:".dimmed(), stats.send_count.to_string().cyan());
            println!("   {} {}", "Countries:".dimmed(), stats.country_count);

            if !quiet {
                println!();
                println!("   {} {}", "Countries:".dimmed(), facets.countries.join(", "));
                println!("   {} {}", "Provinces:".dimmed(), facets.provinces.join(", "));
                println!("   {} {}", "Platforms:".dimmed(), facets.platforms.join(", "));
            }
        }
    }

    Ok(())
}
