//! Country label resolution handler
//!
//! Handles `GET /api/countries/resolve`, translating a world map label back to
//! the country name stored on records.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::handlers::AppState;

/// Query parameters for label resolution
#[derive(Debug, Deserialize, IntoParams)]
pub struct ResolveQuery {
    /// World map label, e.g. "Japan"
    pub label: Option<String>,
}

/// Response for a resolution query.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolveResponse {
    /// The label that was looked up.
    #[schema(example = "Japan")]
    pub label: String,

    /// Country name as stored on records; the label itself when unknown.
    #[schema(example = "日本")]
    pub country: String,

    /// Whether the label is in the country-label table.
    #[schema(example = true)]
    pub found: bool,
}

/// Resolve a world map label to a country name.
///
/// Unknown labels pass through unchanged, with `found` set to false.
#[utoipa::path(
    get,
    path = "/api/countries/resolve",
    tag = "Query",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Resolution result", body = ResolveResponse),
        (status = 400, description = "Missing label")
    )
)]
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let label = query
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'label' is required"))?;

    let found = state
        .engine
        .geo()
        .country_labels
        .values()
        .any(|mapped| *mapped == label);
    let country = state.engine.resolve_country(&label);

    Ok(Json(ResolveResponse {
        label,
        country,
        found,
    }))
}
