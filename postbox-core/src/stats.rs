//! Collection-wide summaries: counters and filter panel options.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::geo::GeoConfig;
use crate::normalize::NormalizedCard;
use crate::record::non_empty;

/// Headline counters over the whole, unfiltered collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub receive_count: usize,
    /// Everything that is not received.
    pub send_count: usize,
    /// Distinct effective countries.
    pub country_count: usize,
}

impl Stats {
    pub fn compute(cards: &[NormalizedCard<'_>]) -> Self {
        let receive_count = cards.iter().filter(|c| c.card.is_received()).count();
        let countries: HashSet<&str> = cards.iter().map(|c| c.country).collect();

        Self {
            receive_count,
            send_count: cards.len() - receive_count,
            country_count: countries.len(),
        }
    }
}

/// Option lists for the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Distinct effective countries, sorted.
    pub countries: Vec<String>,
    /// Distinct home-country province keys, sorted.
    pub provinces: Vec<String>,
    /// Distinct platforms in first-seen order.
    pub platforms: Vec<String>,
}

impl Facets {
    pub fn compute(cards: &[NormalizedCard<'_>], geo: &GeoConfig) -> Self {
        let countries: BTreeSet<&str> = cards.iter().map(|c| c.country).collect();

        let provinces: BTreeSet<String> = cards
            .iter()
            .filter(|c| c.is_home)
            .filter_map(|c| c.region.and_then(|region| geo.province_key(region)))
            .collect();

        let mut seen = HashSet::new();
        let platforms = cards
            .iter()
            .filter_map(|c| non_empty(&c.card.platform))
            .filter(|p| seen.insert(*p))
            .map(String::from)
            .collect();

        Self {
            countries: countries.into_iter().map(String::from).collect(),
            provinces: provinces.into_iter().collect(),
            platforms,
        }
    }
}
