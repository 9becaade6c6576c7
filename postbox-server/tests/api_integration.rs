//! API integration tests for postbox-server.
//!
//! These tests drive the router with in-process requests, covering the
//! ingestion gateway, the read endpoints and the server-side query view.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use postbox_core::{list_items, Engine};
use postbox_server::{create_router, create_router_with_config, AppState, Config, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

const PASSWORD: &str = "letmein";

fn test_config() -> Config {
    Config {
        admin_password: Some(PASSWORD.to_string()),
        ..Default::default()
    }
}

/// Build a router over an in-memory store seeded with `records`
fn create_test_app(records: Value) -> Router {
    let config = test_config();
    let store = MemoryStore::with_items(&config.store_key, list_items(records));
    let state = AppState::new(Arc::new(store), Engine::default(), &config);
    create_router_with_config(&config, state)
}

fn sample_records() -> Value {
    json!([
        {"id": "P10", "type": "sent", "region": "浙江杭州", "sendDate": "2024-02-01"},
        {"id": "P2", "type": "received", "country": "日本", "tags": ["temple"],
         "sendDate": "2024-01-01", "receiveDate": "2024-01-10"},
        {"id": "P1", "type": "收到", "region": "内蒙古包头", "platform": "Postcrossing"},
        {"type": "sent", "country": "法国", "image": "https://img.example/fr.jpg"}
    ])
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// Health & Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let (status, json) = send(create_router(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store"], "memory");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let (status, json) = send(create_router(), get("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn test_openapi_document_lists_paths() {
    let (status, json) = send(create_router(), get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/add-cards"].is_object());
    assert!(json["paths"]["/api/cards/view"].is_object());
}

#[tokio::test]
async fn test_unknown_route_returns_not_found() {
    let (status, json) = send(create_router(), get("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ============================================================================
// Get Cards Tests
// ============================================================================

#[tokio::test]
async fn test_get_cards_empty_store() {
    let (status, json) = send(create_router(), get("/api/get-cards")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_get_cards_preserves_unknown_fields() {
    let app = create_test_app(sample_records());
    let (status, json) = send(app, get("/api/get-cards")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 4);
    assert_eq!(json[3]["image"], "https://img.example/fr.jpg");
}

#[tokio::test]
async fn test_get_cards_rejects_post() {
    let app = create_test_app(sample_records());
    let (status, _) = send(app, post_json("/api/get-cards", json!({}))).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Add Cards Tests
// ============================================================================

#[tokio::test]
async fn test_add_cards_prepends_in_given_order() {
    let app = create_test_app(sample_records());

    let (status, json) = send(
        app.clone(),
        post_json(
            "/api/add-cards",
            json!({
                "password": PASSWORD,
                "cards": [{"id": "N1", "type": "received"}, {"id": "N2", "type": "sent"}],
                "mode": "append"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["processed"], 2);
    assert_eq!(json["total"], 6);

    let (_, list) = send(app, get("/api/get-cards")).await;
    let ids: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap_or("-").to_string())
        .collect();
    assert_eq!(ids, vec!["N1", "N2", "P10", "P2", "P1", "-"]);
}

#[tokio::test]
async fn test_add_cards_accepts_single_new_card() {
    let app = create_test_app(json!([]));

    let (status, json) = send(
        app,
        post_json(
            "/api/add-cards",
            json!({"password": PASSWORD, "newCard": {"id": "S1", "country": "德国"}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed"], 1);
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn test_add_cards_prefers_cards_over_new_card() {
    let app = create_test_app(json!([]));

    let (status, _) = send(
        app.clone(),
        post_json(
            "/api/add-cards",
            json!({
                "password": PASSWORD,
                "cards": {"id": "FROM-CARDS"},
                "newCard": {"id": "FROM-NEW-CARD"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(app, get("/api/get-cards")).await;
    assert_eq!(list, json!([{"id": "FROM-CARDS"}]));
}

#[tokio::test]
async fn test_add_cards_keeps_stored_records_verbatim() {
    let stored = json!({
        "id": 42,
        "type": "收到",
        "tags": [],
        "note": null,
        "region": {"p": "浙江"}
    });
    let app = create_test_app(json!([stored.clone()]));

    let (status, _) = send(
        app.clone(),
        post_json(
            "/api/add-cards",
            json!({"password": PASSWORD, "newCard": {"id": "N1"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(app, get("/api/get-cards")).await;
    assert_eq!(list, json!([{"id": "N1"}, stored]));
}

#[tokio::test]
async fn test_add_cards_accepts_non_object_items() {
    let submitted = json!([{"id": 42, "tags": [], "region": {"p": "x"}}, 7]);
    let app = create_test_app(json!([]));

    let (status, json) = send(
        app.clone(),
        post_json(
            "/api/add-cards",
            json!({"password": PASSWORD, "cards": submitted.clone()}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed"], 2);

    let (status, list) = send(app.clone(), get("/api/get-cards")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, submitted);

    // A later write and the view still work over the odd item.
    let (status, json) = send(
        app.clone(),
        post_json(
            "/api/add-cards",
            json!({"password": PASSWORD, "newCard": {"id": "N2"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);

    let (status, view) = send(app, get("/api/cards/view")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["totalFilteredCount"], 2);
    assert_eq!(view["cards"][0]["id"], "N2");
}

#[tokio::test]
async fn test_add_cards_wrong_password() {
    let app = create_test_app(sample_records());

    let (status, json) = send(
        app.clone(),
        post_json(
            "/api/add-cards",
            json!({"password": "guess", "newCard": {"id": "X"}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (_, list) = send(app, get("/api/get-cards")).await;
    assert_eq!(list.as_array().unwrap().len(), 4, "Store must be untouched");
}

#[tokio::test]
async fn test_add_cards_without_configured_password() {
    let (status, _) = send(
        create_router(),
        post_json("/api/add-cards", json!({"password": "", "newCard": {"id": "X"}})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_cards_missing_data() {
    let app = create_test_app(sample_records());

    let (status, json) = send(
        app,
        post_json("/api/add-cards", json!({"password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_add_cards_malformed_body() {
    let app = create_test_app(sample_records());
    let request = Request::builder()
        .method("POST")
        .uri("/api/add-cards")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
}

// ============================================================================
// View & Resolve Tests
// ============================================================================

#[tokio::test]
async fn test_view_defaults() {
    let app = create_test_app(sample_records());
    let (status, json) = send(app, get("/api/cards/view")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalFilteredCount"], 4);
    assert_eq!(json["displayCount"], 12);
    assert_eq!(json["hasMore"], false);
    assert_eq!(json["cards"][0]["id"], "P10");
    assert_eq!(json["stats"]["receiveCount"], 2);
    assert_eq!(json["stats"]["sendCount"], 2);
    assert_eq!(json["stats"]["countryCount"], 3);
    assert_eq!(json["map"]["scaleMax"], 5);
}

#[tokio::test]
async fn test_view_filters_and_pages() {
    let app = create_test_app(sample_records());
    let uri = "/api/cards/view?country=%E4%B8%AD%E5%9B%BD&sort=id_asc&limit=1";
    let (status, json) = send(app, get(uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalFilteredCount"], 2);
    assert_eq!(json["hasMore"], true);
    assert_eq!(json["cards"].as_array().unwrap().len(), 1);
    assert_eq!(json["cards"][0]["id"], "P1");
}

#[tokio::test]
async fn test_view_world_map() {
    let app = create_test_app(sample_records());
    let (status, json) = send(app, get("/api/cards/view?mapMode=world&tag=TEMPLE")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalFilteredCount"], 1);
    assert_eq!(json["map"]["mapName"], "world");

    let names: Vec<_> = json["map"]["buckets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["China", "Japan", "France"]);
}

#[tokio::test]
async fn test_view_rejects_unknown_sort() {
    let app = create_test_app(sample_records());
    let (status, json) = send(app, get("/api/cards/view?sort=newest")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_SORT_KEY");
}

#[tokio::test]
async fn test_resolve_known_and_unknown_labels() {
    let (status, json) = send(create_router(), get("/api/countries/resolve?label=France")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["country"], "法国");
    assert_eq!(json["found"], true);

    let (status, json) = send(create_router(), get("/api/countries/resolve?label=Peru")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["country"], "Peru");
    assert_eq!(json["found"], false);

    let (status, _) = send(create_router(), get("/api/countries/resolve")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
