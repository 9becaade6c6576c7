//! Import command implementation.
//!
//! Prepends records to a local JSON list, mirroring what the server does on
//! ingestion. Items are copied as they are; nothing is re-encoded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use postbox_core::list_items;
use serde_json::Value;
use tracing::info;

use crate::utils::read_json;

/// Execute the import command.
pub async fn execute(file: PathBuf, into: PathBuf, quiet: bool) -> Result<()> {
    let incoming = list_items(read_json(&file)?);
    let existing = read_existing(&into)?;

    let added = incoming.len();
    let mut merged = incoming;
    merged.extend(existing);

    let json = serde_json::to_string_pretty(&merged)?;
    tokio::fs::write(&into, json)
        .await
        .with_context(|| format!("Failed to write {}", into.display()))?;

    info!(added, total = merged.len(), path = %into.display(), "Imported records");

    if !quiet {
        println!();
        println!("{}", "Records imported".green().bold());
        println!("   {} {}", "Added:".dimmed(), added);
        println!("   {} {}", "Total:".dimmed(), merged.len());
        println!("   {} {}", "List:".dimmed(), into.display());
    }

    Ok(())
}

/// A missing list counts as empty.
fn read_existing(path: &Path) -> Result<Vec<Value>> {
    if path.exists() {
        Ok(list_items(read_json(path)?))
    } else {
        Ok(Vec::new())
    }
}
