//! Dashboard session state.
//!
//! The dashboard owns the record list and the user's filter state, applies
//! the display-cap reset rule and memoizes the sorted selection so that
//! "load more" never re-runs the filter and sort stages.

use tracing::debug;

use crate::engine::{DerivedView, Engine, FilterState, DEFAULT_DISPLAY_COUNT};
use crate::filter::FilterCriteria;
use crate::geo::MapMode;
use crate::record::Postcard;
use crate::sort::SortKey;

/// Inputs the cached selection depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectionKey {
    version: u64,
    criteria: FilterCriteria,
    sort: SortKey,
}

#[derive(Debug)]
pub struct Dashboard {
    engine: Engine,
    records: Vec<Postcard>,
    version: u64,
    state: FilterState,
    cache: Option<(SelectionKey, Vec<usize>)>,
    evaluations: u64,
}

impl Dashboard {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            records: Vec::new(),
            version: 0,
            state: FilterState::default(),
            cache: None,
            evaluations: 0,
        }
    }

    pub fn with_records(engine: Engine, records: Vec<Postcard>) -> Self {
        let mut dashboard = Self::new(engine);
        dashboard.set_records(records);
        dashboard
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn records(&self) -> &[Postcard] {
        &self.records
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.state.criteria
    }

    pub fn display_count(&self) -> usize {
        self.state.display_count
    }

    /// How many times the filter and sort stages have run.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Replace the record list (e.g. after a fetch).
    pub fn set_records(&mut self, records: Vec<Postcard>) {
        self.records = records;
        self.version += 1;
        self.state.display_count = DEFAULT_DISPLAY_COUNT;
        debug!(count = self.records.len(), version = self.version, "Records replaced");
    }

    /// Replace all criteria at once. Resets the display cap if anything changed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.state.criteria {
            self.state.criteria = criteria;
            self.reset_display_count();
        }
    }

    /// Edit criteria in place. Resets the display cap if anything changed.
    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        let mut next = self.state.criteria.clone();
        edit(&mut next);
        self.set_criteria(next);
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if sort != self.state.sort {
            self.state.sort = sort;
            self.reset_display_count();
        }
    }

    /// Set the cap directly. Never triggers a reset.
    pub fn set_display_count(&mut self, count: usize) {
        self.state.display_count = count;
    }

    /// Grow the cap by one page.
    pub fn load_more(&mut self) {
        self.state.display_count = self.state.display_count.saturating_add(DEFAULT_DISPLAY_COUNT);
    }

    /// Switch map; country and province are cleared.
    pub fn toggle_map(&mut self, mode: MapMode) {
        self.state.map_mode = mode;
        self.update_criteria(|c| {
            c.country = None;
            c.province = None;
        });
    }

    /// Turn a click on map `label` into filter criteria.
    pub fn click_map(&mut self, label: &str) {
        let next = self
            .engine
            .map_click(&self.state.criteria, self.state.map_mode, label);
        self.set_criteria(next);
    }

    /// Back to defaults. The map mode is kept.
    pub fn reset(&mut self) {
        let map_mode = self.state.map_mode;
        self.state = FilterState {
            map_mode,
            ..FilterState::default()
        };
    }

    /// Current derived view.
    pub fn view(&mut self) -> DerivedView<'_> {
        self.refresh();
        let indices = self
            .cache
            .as_ref()
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or_default();
        self.engine.view(
            &self.records,
            indices,
            self.state.display_count,
            self.state.map_mode,
        )
    }

    fn reset_display_count(&mut self) {
        self.state.display_count = DEFAULT_DISPLAY_COUNT;
    }

    fn refresh(&mut self) {
        let key = SelectionKey {
            version: self.version,
            criteria: self.state.criteria.clone(),
            sort: self.state.sort,
        };
        if matches!(&self.cache, Some((cached, _)) if *cached == key) {
            return;
        }

        let indices = self
            .engine
            .select(&self.records, &key.criteria, key.sort);
        self.evaluations += 1;
        self.cache = Some((key, indices));
    }
}
