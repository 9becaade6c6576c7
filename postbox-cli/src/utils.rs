//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use postbox_core::{CardType, Engine, FilterCriteria, GeoConfig, NormalizedCard, Postcard};
use serde_json::Value;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Where records are read from.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// JSON file holding the record list
    #[arg(value_name = "FILE", required_unless_present = "url", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Base URL of a running postbox server
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

/// Filter criteria shared by the query command.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Exact country (records without one count as the home country)
    #[arg(long)]
    pub country: Option<String>,

    /// Region substring, home-country records only
    #[arg(long)]
    pub province: Option<String>,

    /// Region substring, home-country records only
    #[arg(long)]
    pub city: Option<String>,

    /// received, sent, 收到 or 寄出
    #[arg(long = "type", value_name = "TYPE")]
    pub card_type: Option<String>,

    /// Exact platform
    #[arg(long)]
    pub platform: Option<String>,

    /// Keyword over tags, note, region, country and person
    #[arg(long)]
    pub tag: Option<String>,

    /// Id substring (case-insensitive)
    #[arg(long)]
    pub id: Option<String>,
}

impl FilterArgs {
    pub fn into_criteria(self) -> Result<FilterCriteria> {
        let card_type = match self.card_type.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => Some(label.parse::<CardType>()?),
            _ => None,
        };

        Ok(FilterCriteria {
            country: self.country,
            province: self.province,
            city: self.city,
            card_type,
            platform: self.platform,
            tag: self.tag,
            id: self.id,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Build the engine, optionally with geo tables from a JSON file.
pub fn load_engine(geo_config: Option<&Path>) -> Result<Engine> {
    let geo = match geo_config {
        Some(path) => GeoConfig::load(path)
            .with_context(|| format!("Failed to load geo config: {}", path.display()))?,
        None => GeoConfig::default(),
    };
    Ok(Engine::new(geo))
}

/// Load the record list from a file or a server.
pub async fn load_records(source: &SourceArgs) -> Result<Vec<Postcard>> {
    match (&source.file, &source.url) {
        (Some(file), _) => read_records(file),
        (None, Some(url)) => fetch_records(url).await,
        (None, None) => bail!("Either FILE or --url must be given"),
    }
}

/// Read one record or a list of records from a JSON file.
pub fn read_records(path: &Path) -> Result<Vec<Postcard>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let records = Postcard::parse_many(&json)
        .with_context(|| format!("Failed to parse records in {}", path.display()))?;

    debug!(path = %path.display(), count = records.len(), "Loaded records");
    Ok(records)
}

/// Read a JSON document without interpreting it as records.
pub fn read_json(path: &Path) -> Result<Value> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Join a server base URL and an API path.
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

async fn fetch_records(base: &str) -> Result<Vec<Postcard>> {
    let url = endpoint(base, "/api/get-cards");
    let response = http_client()?
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Request failed: GET {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Server error: GET {} returned {}", url, status);
    }

    let value: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse response from {}", url))?;
    let records = Postcard::from_value_many(value);

    debug!(%url, count = records.len(), "Fetched records");
    Ok(records)
}

/// One-line summary of a record for text output.
pub fn describe(card: &Postcard, geo: &GeoConfig) -> String {
    let normalized = NormalizedCard::new(card, geo);
    let place = match normalized.region {
        Some(region) => format!("{} {}", normalized.country, region),
        None => normalized.country.to_string(),
    };
    let kind = card
        .card_type()
        .map(|t| t.as_str())
        .unwrap_or("?");
    let date = card
        .receive_date
        .as_deref()
        .or(card.send_date.as_deref())
        .unwrap_or("-");

    format!(
        "{:<12} {:<9} {:<24} {}",
        card.id.as_deref().unwrap_or("-"),
        kind,
        place,
        date
    )
}
