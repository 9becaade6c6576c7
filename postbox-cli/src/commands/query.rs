//! Query command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use postbox_core::{FilterState, MapMode, SortKey};
use serde_json::json;
use tracing::info;

use crate::utils::{describe, load_engine, load_records, FilterArgs, OutputFormat, SourceArgs};

/// Execute the query command.
pub async fn execute(
    source: SourceArgs,
    filters: FilterArgs,
    sort: String,
    limit: usize,
    format: OutputFormat,
    geo_config: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let engine = load_engine(geo_config.as_deref())?;
    let state = FilterState {
        criteria: filters.into_criteria()?,
        sort: sort.parse::<SortKey>()?,
        display_count: limit,
        map_mode: MapMode::default(),
    };

    let records = load_records(&source).await?;
    let view = engine.run(&records, &state);

    info!(
        total = records.len(),
        matched = view.total_filtered_count,
        shown = view.display_cards.len(),
        sort = %state.sort,
        "Query complete"
    );

    match format {
        OutputFormat::Json => {
            let output = json!({
                "cards": view.display_cards,
                "totalFilteredCount": view.total_filtered_count,
                "displayCount": view.display_count,
                "hasMore": view.has_more,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "{} {} of {} matching card(s) {}",
                    "Showing".dimmed(),
                    view.display_cards.len(),
                    view.total_filtered_count,
                    format!("(sorted by {})", state.sort).dimmed()
                );
                println!();
            }
            for card in &view.display_cards {
                println!("{}", describe(card, engine.geo()));
            }
            if view.has_more && !quiet {
                println!();
                println!(
                    "{}",
                    format!(
                        "{} more; raise --limit to see them",
                        view.total_filtered_count - view.display_cards.len()
                    )
                    .dimmed()
                );
            }
        }
    }

    Ok(())
}
