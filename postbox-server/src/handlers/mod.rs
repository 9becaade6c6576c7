//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod cards;
pub mod health;
pub mod resolve;
pub mod view;

pub use crate::state::AppState;
pub use cards::{add_cards_handler, get_cards_handler, AddCardsRequest, AddCardsResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use resolve::{resolve_handler, ResolveQuery, ResolveResponse};
pub use view::{view_handler, ViewQuery, ViewResponse};

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found_handler() -> ApiError {
    ApiError::not_found("No such endpoint")
}
