//! Postbox Core - query and aggregation engine for a postcard collection
//!
//! This crate turns a flat list of postcard records into the derived views a
//! collection dashboard needs: the filtered, sorted and paginated card list,
//! headline statistics, choropleth buckets and filter panel options.
//!
//! # Features
//!
//! - Lenient record parsing that preserves unknown fields
//! - Conjunctive filtering with home-country defaults
//! - Seven sort orders including numeric-aware id ordering
//! - Province and country bucketing driven by a loadable [`GeoConfig`]
//! - A memoized [`Dashboard`] session that applies the display-cap reset rule
//!
//! # Example
//!
//! ```
//! use postbox_core::{Engine, FilterState, Postcard, SortKey};
//!
//! # fn example() -> postbox_core::Result<()> {
//! let records = Postcard::parse_many(
//!     r#"[{"id": "P2", "type": "received", "country": "日本"},
//!         {"id": "P10", "type": "sent", "region": "浙江杭州"}]"#,
//! )?;
//!
//! let engine = Engine::default();
//! let state = FilterState {
//!     sort: SortKey::IdAsc,
//!     ..Default::default()
//! };
//! let view = engine.run(&records, &state);
//!
//! assert_eq!(view.total_filtered_count, 2);
//! assert_eq!(view.display_cards[0].id.as_deref(), Some("P2"));
//! assert_eq!(view.stats.country_count, 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod dashboard;
pub mod engine;
pub mod error;
pub mod filter;
pub mod geo;
pub mod normalize;
pub mod record;
pub mod sort;
pub mod stats;

// Re-export main types for convenience
pub use dashboard::Dashboard;
pub use engine::{DerivedView, Engine, FilterState, DEFAULT_DISPLAY_COUNT};
pub use error::{PostboxError, Result};
pub use filter::FilterCriteria;
pub use geo::{GeoBucket, GeoConfig, MapData, MapMode, DEFAULT_HOME_COUNTRY, MIN_SCALE_MAX};
pub use normalize::NormalizedCard;
pub use record::{list_items, parse_items, CardType, Postcard};
pub use sort::{natural_cmp, SortKey};
pub use stats::{Facets, Stats};
