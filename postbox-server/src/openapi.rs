//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification for the Postbox API.

use utoipa::OpenApi;

use crate::handlers::{
    AddCardsRequest, AddCardsResponse, HealthResponse, ReadyResponse, ResolveResponse,
    ViewResponse,
};

/// Postbox API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postbox API",
        version = "0.1.0",
        description = r#"
## Postcard Collection API

Stores a personal postcard collection as a single record list and serves
derived views of it.

### How It Works

1. **Add** cards via `POST /api/add-cards` (admin password required)
2. Download the whole list via `GET /api/get-cards`
3. Or let the server filter, sort and aggregate via `GET /api/cards/view`
4. Translate world map labels back to country names via `GET /api/countries/resolve`
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Cards", description = "Read and append to the stored record list"),
        (name = "Query", description = "Filtered, sorted and aggregated views of the collection"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::cards::get_cards_handler,
        crate::handlers::cards::add_cards_handler,
        crate::handlers::view::view_handler,
        crate::handlers::resolve::resolve_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            AddCardsRequest,
            AddCardsResponse,
            ViewResponse,
            ResolveResponse,
        )
    )
)]
pub struct ApiDoc;
