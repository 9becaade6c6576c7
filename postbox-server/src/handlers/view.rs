//! Query handler
//!
//! Runs the engine server-side over the stored list, for clients that do not
//! want to download the whole collection.

use axum::{
    extract::{Query, State},
    Json,
};
use postbox_core::{
    CardType, DerivedView, Facets, FilterCriteria, FilterState, MapData, MapMode, Postcard,
    SortKey, Stats, DEFAULT_DISPLAY_COUNT,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::handlers::AppState;

/// Largest page a single request may ask for.
const MAX_LIMIT: usize = 500;

/// Query parameters for the derived view
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    /// Exact effective country
    pub country: Option<String>,
    /// Region substring (home country only)
    pub province: Option<String>,
    /// Region substring (home country only)
    pub city: Option<String>,
    /// received, sent, 收到 or 寄出
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    /// Exact platform
    pub platform: Option<String>,
    /// Keyword over tags, note, region, country and person
    pub tag: Option<String>,
    /// Id substring
    pub id: Option<String>,
    /// Sort key (default: id_desc)
    #[param(default = "id_desc")]
    pub sort: Option<String>,
    /// Number of cards to return
    #[param(default = 12, minimum = 0, maximum = 500)]
    pub limit: Option<usize>,
    /// Map mode: china or world
    #[serde(alias = "mode")]
    #[param(default = "china")]
    pub map_mode: Option<String>,
}

impl TryFrom<ViewQuery> for FilterState {
    type Error = ApiError;

    fn try_from(query: ViewQuery) -> Result<Self, Self::Error> {
        let card_type = match query.card_type.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => Some(label.parse::<CardType>()?),
            _ => None,
        };
        let sort = match query.sort.as_deref() {
            Some(key) if !key.trim().is_empty() => key.parse::<SortKey>()?,
            _ => SortKey::default(),
        };
        let map_mode = match query.map_mode.as_deref() {
            Some(mode) if !mode.trim().is_empty() => mode.parse::<MapMode>()?,
            _ => MapMode::default(),
        };
        let display_count = query.limit.unwrap_or(DEFAULT_DISPLAY_COUNT);
        if display_count > MAX_LIMIT {
            return Err(ApiError::bad_request(format!(
                "limit must be at most {}",
                MAX_LIMIT
            )));
        }

        Ok(FilterState {
            criteria: FilterCriteria {
                country: query.country,
                province: query.province,
                city: query.city,
                card_type,
                platform: query.platform,
                tag: query.tag,
                id: query.id,
            },
            sort,
            display_count,
            map_mode,
        })
    }
}

/// Derived view of the collection
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    /// First `limit` matching records, sorted
    #[schema(value_type = Vec<Object>)]
    pub cards: Vec<Postcard>,
    pub total_filtered_count: usize,
    pub display_count: usize,
    pub has_more: bool,
    /// Counters over the whole collection
    #[schema(value_type = Object)]
    pub stats: Stats,
    /// Map buckets over the whole collection
    #[schema(value_type = Object)]
    pub map: MapData,
    /// Filter panel options
    #[schema(value_type = Object)]
    pub facets: Facets,
}

impl From<DerivedView<'_>> for ViewResponse {
    fn from(view: DerivedView<'_>) -> Self {
        Self {
            cards: view.display_cards.into_iter().cloned().collect(),
            total_filtered_count: view.total_filtered_count,
            display_count: view.display_count,
            has_more: view.has_more,
            stats: view.stats,
            map: view.map,
            facets: view.facets,
        }
    }
}

/// Filter, sort and page the stored collection.
#[utoipa::path(
    get,
    path = "/api/cards/view",
    tag = "Query",
    params(ViewQuery),
    responses(
        (status = 200, description = "Derived view", body = ViewResponse),
        (status = 400, description = "Unknown sort key, map mode or card type"),
        (status = 500, description = "Record store failure")
    )
)]
pub async fn view_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewResponse>, ApiError> {
    let filter = FilterState::try_from(query)?;
    let items = state.store.get(&state.store_key).await?;
    let records = Postcard::from_items(&items);

    let view = state.engine.run(&records, &filter);
    tracing::debug!(
        total = records.len(),
        matched = view.total_filtered_count,
        sort = %filter.sort,
        "Served view"
    );

    Ok(Json(ViewResponse::from(view)))
}
