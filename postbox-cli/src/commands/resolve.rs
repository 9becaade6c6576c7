//! Resolve command implementation.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use crate::utils::load_engine;

/// Execute the resolve command.
pub fn execute(label: String, geo_config: Option<PathBuf>, quiet: bool) -> Result<()> {
    let engine = load_engine(geo_config.as_deref())?;
    let country = engine.resolve_country(label.trim());

    if quiet {
        println!("{}", country);
    } else {
        println!("{} {} {}", label.trim().dimmed(), "->".dimmed(), country.bold());
    }
    Ok(())
}
