//! The query pipeline: filter, sort, paginate, aggregate.
//!
//! [`Engine`] is stateless apart from its geo tables. Every call is a pure
//! function of its inputs and may be re-run wholesale whenever the record list
//! or the filter state changes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::FilterCriteria;
use crate::geo::{self, GeoConfig, MapData, MapMode};
use crate::normalize::{normalize_all, NormalizedCard};
use crate::record::Postcard;
use crate::sort::SortKey;
use crate::stats::{Facets, Stats};

/// Number of cards shown before "load more".
pub const DEFAULT_DISPLAY_COUNT: usize = 12;

/// Everything the dashboard passes in on each recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    pub sort: SortKey,
    pub display_count: usize,
    pub map_mode: MapMode,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: SortKey::default(),
            display_count: DEFAULT_DISPLAY_COUNT,
            map_mode: MapMode::default(),
        }
    }
}

/// Derived, read-only view of the collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedView<'a> {
    /// Every matching record, sorted.
    #[serde(skip)]
    pub all_results: Vec<&'a Postcard>,
    /// The first `display_count` entries of `all_results`.
    pub display_cards: Vec<&'a Postcard>,
    pub total_filtered_count: usize,
    pub display_count: usize,
    pub has_more: bool,
    pub stats: Stats,
    pub map: MapData,
    pub facets: Facets,
}

/// Query/aggregation engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    geo: GeoConfig,
}

impl Engine {
    pub fn new(geo: GeoConfig) -> Self {
        Self { geo }
    }

    pub fn geo(&self) -> &GeoConfig {
        &self.geo
    }

    /// Run the whole pipeline.
    pub fn run<'a>(&self, records: &'a [Postcard], state: &FilterState) -> DerivedView<'a> {
        let cards = normalize_all(records, &self.geo);
        let indices = select_indices(&cards, &state.criteria, state.sort);
        self.assemble(records, &cards, &indices, state.display_count, state.map_mode)
    }

    /// Indices into `records` of the matching entries, in sorted order.
    pub fn select(
        &self,
        records: &[Postcard],
        criteria: &FilterCriteria,
        sort: SortKey,
    ) -> Vec<usize> {
        let cards = normalize_all(records, &self.geo);
        select_indices(&cards, criteria, sort)
    }

    /// Build a view from an already computed selection.
    pub fn view<'a>(
        &self,
        records: &'a [Postcard],
        indices: &[usize],
        display_count: usize,
        map_mode: MapMode,
    ) -> DerivedView<'a> {
        let cards = normalize_all(records, &self.geo);
        self.assemble(records, &cards, indices, display_count, map_mode)
    }

    /// Matching records, sorted, without aggregation.
    pub fn results<'a>(
        &self,
        records: &'a [Postcard],
        criteria: &FilterCriteria,
        sort: SortKey,
    ) -> Vec<&'a Postcard> {
        self.select(records, criteria, sort)
            .into_iter()
            .map(|i| &records[i])
            .collect()
    }

    pub fn stats(&self, records: &[Postcard]) -> Stats {
        Stats::compute(&normalize_all(records, &self.geo))
    }

    pub fn facets(&self, records: &[Postcard]) -> Facets {
        Facets::compute(&normalize_all(records, &self.geo), &self.geo)
    }

    pub fn map_data(&self, records: &[Postcard], mode: MapMode) -> MapData {
        geo::map_data(&normalize_all(records, &self.geo), mode, &self.geo)
    }

    /// Country name behind a world map label.
    pub fn resolve_country(&self, label: &str) -> String {
        self.geo.resolve_country(label)
    }

    /// Criteria after the user clicks `label` on the map.
    pub fn map_click(
        &self,
        criteria: &FilterCriteria,
        mode: MapMode,
        label: &str,
    ) -> FilterCriteria {
        let mut next = criteria.clone();
        match mode {
            MapMode::Home => {
                next.country = Some(self.geo.home_country.clone());
                next.province = Some(label.to_string());
            }
            MapMode::World => {
                next.country = Some(self.geo.resolve_country(label));
                next.province = None;
            }
        }
        next
    }

    fn assemble<'a>(
        &self,
        records: &'a [Postcard],
        cards: &[NormalizedCard<'_>],
        indices: &[usize],
        display_count: usize,
        map_mode: MapMode,
    ) -> DerivedView<'a> {
        let all_results: Vec<&'a Postcard> = indices
            .iter()
            .filter_map(|&i| records.get(i))
            .collect();
        let display_cards: Vec<&'a Postcard> =
            all_results.iter().take(display_count).copied().collect();

        DerivedView {
            total_filtered_count: all_results.len(),
            has_more: all_results.len() > display_cards.len(),
            display_count,
            display_cards,
            all_results,
            stats: Stats::compute(cards),
            map: geo::map_data(cards, map_mode, &self.geo),
            facets: Facets::compute(cards, &self.geo),
        }
    }
}

fn select_indices(cards: &[NormalizedCard<'_>], criteria: &FilterCriteria, sort: SortKey) -> Vec<usize> {
    let matcher = criteria.matcher();
    let mut selected: Vec<usize> = (0..cards.len())
        .filter(|&i| matcher.matches(&cards[i]))
        .collect();
    selected.sort_by(|&a, &b| sort.compare(&cards[a], &cards[b]));

    debug!(
        total = cards.len(),
        matched = selected.len(),
        sort = %sort,
        "Evaluated query"
    );
    selected
}
