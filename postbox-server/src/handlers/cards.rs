//! Record list handlers
//!
//! - `GET /api/get-cards` returns the stored list.
//! - `POST /api/add-cards` is the password-protected ingestion gateway. New
//!   records are prepended and the whole list is written back, so two
//!   concurrent writers can lose each other's records. Submitted and stored
//!   items are passed through as they are; no record schema is enforced.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use postbox_core::list_items;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::handlers::AppState;

/// Request body for the ingestion endpoint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCardsRequest {
    /// Shared admin password
    #[serde(default)]
    pub password: Option<String>,

    /// One record or a list of records. Preferred over `newCard`.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub cards: Option<Value>,

    /// A single record (legacy form field)
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub new_card: Option<Value>,

    /// Accepted for compatibility; records are always prepended
    #[serde(default)]
    #[schema(example = "append")]
    pub mode: Option<String>,
}

/// Response for a successful write.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddCardsResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Added 2 card(s)")]
    pub message: String,
    /// Number of records added by this request
    #[schema(example = 2)]
    pub processed: usize,
    /// Size of the stored list after the write
    #[schema(example = 120)]
    pub total: usize,
}

/// Return the whole stored record list.
#[utoipa::path(
    get,
    path = "/api/get-cards",
    tag = "Cards",
    responses(
        (status = 200, description = "Stored record list, `[]` when nothing is stored"),
        (status = 500, description = "Record store failure")
    )
)]
pub async fn get_cards_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let items = state.store.get(&state.store_key).await?;
    tracing::debug!(count = items.len(), "Served record list");
    Ok(Json(items))
}

/// Add one or more records to the front of the stored list.
///
/// `cards` is used when present, otherwise `newCard`. A single object is
/// treated as a one-element list; submitted order is kept.
#[utoipa::path(
    post,
    path = "/api/add-cards",
    tag = "Cards",
    request_body = AddCardsRequest,
    responses(
        (status = 200, description = "Records added", body = AddCardsResponse),
        (status = 400, description = "No records supplied or malformed body"),
        (status = 401, description = "Wrong or unconfigured admin password"),
        (status = 500, description = "Record store failure")
    )
)]
pub async fn add_cards_handler(
    State(state): State<AppState>,
    payload: Result<Json<AddCardsRequest>, JsonRejection>,
) -> Result<Json<AddCardsResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))?;

    check_password(state.admin_password.as_deref(), request.password.as_deref())?;

    let input = request
        .cards
        .filter(|v| !v.is_null())
        .or(request.new_card.filter(|v| !v.is_null()))
        .ok_or_else(|| ApiError::bad_request("No card data provided"))?;

    let mut items = list_items(input);
    let processed = items.len();

    let existing = state.store.get(&state.store_key).await?;
    items.extend(existing);
    state.store.set(&state.store_key, &items).await?;

    let total = items.len();
    tracing::info!(processed, total, mode = ?request.mode, "Added cards");

    Ok(Json(AddCardsResponse {
        success: true,
        message: format!("Added {} card(s)", processed),
        processed,
        total,
    }))
}

fn check_password(expected: Option<&str>, given: Option<&str>) -> Result<(), ApiError> {
    let expected = expected.ok_or_else(|| ApiError::unauthorized("Admin password not configured"))?;
    if given != Some(expected) {
        return Err(ApiError::unauthorized("Invalid password"));
    }
    Ok(())
}
