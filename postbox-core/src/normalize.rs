//! Per-record normalization.
//!
//! All default rules (home country when `country` is absent, epoch zero when
//! no date is known, zero transit days when a date is missing) live here so
//! that filtering, sorting and aggregation read one precomputed view.

use crate::geo::GeoConfig;
use crate::record::{non_empty, parse_instant, Postcard};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Read-only view of a record with every default applied.
#[derive(Debug, Clone)]
pub struct NormalizedCard<'a> {
    pub card: &'a Postcard,
    /// `country`, or the home country when absent.
    pub country: &'a str,
    pub region: Option<&'a str>,
    /// Whether the effective country is the home country.
    pub is_home: bool,
    pub id_lower: Option<String>,
    /// `receiveDate`, else `sendDate`, else 0 (ms since epoch).
    pub effective_date: i64,
    /// Whole days between send and receive, never negative.
    pub duration_days: i64,
    /// Lowercased `tags | note | region | country | person`.
    pub search_pool: String,
}

impl<'a> NormalizedCard<'a> {
    pub fn new(card: &'a Postcard, geo: &'a GeoConfig) -> Self {
        let country = non_empty(&card.country).unwrap_or(geo.home_country.as_str());
        let region = non_empty(&card.region);

        let sent_at = non_empty(&card.send_date).and_then(parse_instant);
        let received_at = non_empty(&card.receive_date).and_then(parse_instant);

        Self {
            card,
            country,
            region,
            is_home: country == geo.home_country,
            id_lower: card.id.as_ref().map(|id| id.to_lowercase()),
            effective_date: received_at.or(sent_at).unwrap_or(0),
            duration_days: transit_days(sent_at, received_at),
            search_pool: search_pool(card, country, region),
        }
    }
}

/// Normalize a whole list.
pub fn normalize_all<'a>(records: &'a [Postcard], geo: &'a GeoConfig) -> Vec<NormalizedCard<'a>> {
    records
        .iter()
        .map(|card| NormalizedCard::new(card, geo))
        .collect()
}

fn transit_days(sent_at: Option<i64>, received_at: Option<i64>) -> i64 {
    match (sent_at, received_at) {
        (Some(sent), Some(received)) => (received - sent).div_euclid(MILLIS_PER_DAY).max(0),
        _ => 0,
    }
}

fn search_pool(card: &Postcard, country: &str, region: Option<&str>) -> String {
    [
        card.tags.join(","),
        card.note.clone().unwrap_or_default(),
        region.unwrap_or_default().to_string(),
        country.to_string(),
        card.person.clone().unwrap_or_default(),
    ]
    .join("|")
    .to_lowercase()
}
