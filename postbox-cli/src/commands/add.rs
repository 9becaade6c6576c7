//! Add command implementation.
//!
//! Pushes records to a running server through the password-protected
//! ingestion endpoint.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use postbox_core::list_items;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::utils::{endpoint, http_client, read_json};

/// Execute the add command.
pub async fn execute(file: PathBuf, url: String, password: String, quiet: bool) -> Result<()> {
    let items = list_items(read_json(&file)?);
    if items.is_empty() {
        bail!("Failed to parse records in {}: no records given", file.display());
    }

    let target = endpoint(&url, "/api/add-cards");
    info!(count = items.len(), url = %target, "Submitting records");

    let response = http_client()?
        .post(&target)
        .json(&json!({ "password": password, "cards": items }))
        .send()
        .await
        .with_context(|| format!("Request failed: POST {}", target))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    debug!(%status, "Server replied");

    let message = body["message"].as_str().unwrap_or("no message").to_string();
    if status == StatusCode::UNAUTHORIZED {
        bail!("Unauthorized: {}", message);
    }
    if !status.is_success() {
        bail!("Server error ({}): {}", status, message);
    }

    let total = body["total"].as_u64().unwrap_or_default();
    if !quiet {
        println!();
        println!("{}", "Records added".green().bold());
        println!("   {} {}", "Submitted:".dimmed(), items.len());
        println!("   {} {}", "Collection:".dimmed(), total);
        println!("   {} {}", "Server:".dimmed(), url);
    }

    Ok(())
}
