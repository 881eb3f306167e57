//! Integration tests for the API server over the in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::MemoryStore;
use tower::ServiceExt;

use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> Router {
    let store = MemoryStore::new();
    let state = api::create_state(store);
    api::create_app(state, get_metrics_handle())
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_member(app: &Router, name: &str) -> String {
    let (status, json) = request(
        app,
        "POST",
        "/api/v1/members",
        Some(serde_json::json!({
            "name": name,
            "address": { "city": "Seoul", "street": "111", "zipcode": "12345" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

async fn create_item(app: &Router, name: &str, price: i64, stock: u32) -> String {
    let (status, json) = request(
        app,
        "POST",
        "/api/v1/items",
        Some(serde_json::json!({
            "name": name,
            "price": price,
            "stock_quantity": stock,
            "author": "Jane Doe",
            "isbn": "9780000000001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

async fn place_order(app: &Router, member_id: &str, item_id: &str, quantity: u32) -> String {
    let (status, json) = request(
        app,
        "POST",
        "/api/v1/orders",
        Some(serde_json::json!({
            "member_id": member_id,
            "item_id": item_id,
            "quantity": quantity
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "ORDERED");
    json["order_id"].as_str().unwrap().to_string()
}

async fn stock_of(app: &Router, item_id: &str) -> u64 {
    let (status, json) = request(app, "GET", "/api/v1/items", None).await;
    assert_eq!(status, StatusCode::OK);
    json.as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == item_id)
        .unwrap()["stock_quantity"]
        .as_u64()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_member_registration_v2_and_duplicate_rejection() {
    let app = setup();

    let (status, json) = request(
        &app,
        "POST",
        "/api/v2/members",
        Some(serde_json::json!({ "name": "userA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["id"].as_str().is_some());

    let (status, json) = request(
        &app,
        "POST",
        "/api/v2/members",
        Some(serde_json::json!({ "name": "userA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("userA"));
}

#[tokio::test]
async fn test_member_list_shapes() {
    let app = setup();
    create_member(&app, "userA").await;
    create_member(&app, "userB").await;

    // v1 ships the entity shape, address included
    let (status, json) = request(&app, "GET", "/api/v1/members", None).await;
    assert_eq!(status, StatusCode::OK);
    let members = json.as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["address"]["city"], "Seoul");

    // v2 wraps a trimmed DTO
    let (status, json) = request(&app, "GET", "/api/v2/members", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["data"][0], serde_json::json!({ "name": "userA" }));
}

#[tokio::test]
async fn test_member_rename() {
    let app = setup();
    let id = create_member(&app, "userA").await;

    let (status, json) = request(
        &app,
        "PUT",
        &format!("/api/v2/members/{id}"),
        Some(serde_json::json!({ "name": "userZ" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "userZ");
    assert_eq!(json["id"], id.as_str());
}

#[tokio::test]
async fn test_item_update() {
    let app = setup();
    let id = create_item(&app, "Book One", 10_000, 100).await;

    let (status, json) = request(
        &app,
        "PUT",
        &format!("/api/v1/items/{id}"),
        Some(serde_json::json!({
            "name": "Book One (2nd ed.)",
            "price": 12_000,
            "stock_quantity": 80
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Book One (2nd ed.)");
    assert_eq!(json["price"], 12_000);
    assert_eq!(json["stock_quantity"], 80);
}

#[tokio::test]
async fn test_place_order_decrements_stock() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 10).await;

    let order_id = place_order(&app, &member_id, &item_id, 2).await;

    assert_eq!(stock_of(&app, &item_id).await, 8);

    let (status, json) = request(&app, "GET", &format!("/api/v1/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ORDERED");
    assert_eq!(json["lines"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_beyond_stock_conflicts_and_leaves_stock_unchanged() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 10).await;

    let (status, json) = request(
        &app,
        "POST",
        "/api/v1/orders",
        Some(serde_json::json!({
            "member_id": member_id,
            "item_id": item_id,
            "quantity": 11
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("stock"));

    assert_eq!(stock_of(&app, &item_id).await, 10);

    let (status, json) = request(&app, "GET", "/api/v2/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 10).await;
    let order_id = place_order(&app, &member_id, &item_id, 2).await;

    let (status, json) = request(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "CANCELLED");

    assert_eq!(stock_of(&app, &item_id).await, 10);

    // a second cancel must not restore stock again
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(stock_of(&app, &item_id).await, 10);
}

#[tokio::test]
async fn test_cancel_after_delivery_completion_conflicts() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 10).await;
    let order_id = place_order(&app, &member_id, &item_id, 2).await;

    let (status, json) = request(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/delivery/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["delivery_status"], "COMPLETED");

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = request(&app, "GET", &format!("/api/v1/orders/{order_id}"), None).await;
    assert_eq!(json["status"], "ORDERED");
    assert_eq!(stock_of(&app, &item_id).await, 8);
}

#[tokio::test]
async fn test_order_listing_ladder_agrees() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 100).await;
    let order_id = place_order(&app, &member_id, &item_id, 2).await;

    let (_, v2) = request(&app, "GET", "/api/v2/orders", None).await;
    let (_, v3) = request(&app, "GET", "/api/v3/orders", None).await;
    let (_, v3_paged) = request(&app, "GET", "/api/v3.1/orders?offset=0&limit=10", None).await;

    // same DTO regardless of the fetch strategy underneath
    assert_eq!(v2, v3);
    assert_eq!(v2, v3_paged);
    assert_eq!(v2[0]["order_id"], order_id.as_str());
    assert_eq!(v2[0]["member_name"], "userA");
    assert_eq!(v2[0]["total_price"], 20_000);

    // the flat projection joins the item name in
    let (_, v4) = request(&app, "GET", "/api/v4/orders", None).await;
    assert_eq!(v4[0]["order_id"], order_id.as_str());
    assert_eq!(v4[0]["lines"][0]["item_name"], "Book One");
    assert_eq!(v4[0]["lines"][0]["quantity"], 2);

    // the raw variant exposes the entity graph
    let (_, v1) = request(&app, "GET", "/api/v1/orders", None).await;
    assert_eq!(v1[0]["member"]["name"], "userA");
    assert_eq!(v1[0]["order"]["status"], "ORDERED");
}

#[tokio::test]
async fn test_simple_order_ladder() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 100).await;
    place_order(&app, &member_id, &item_id, 1).await;

    let (status, v2) = request(&app, "GET", "/api/v2/simple-orders", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, v4) = request(&app, "GET", "/api/v4/simple-orders", None).await;
    assert_eq!(status, StatusCode::OK);

    // handler-mapped DTO and column-trimmed projection carry the same rows
    assert_eq!(v2, v4);
    assert_eq!(v2[0]["member_name"], "userA");
    assert_eq!(v2[0]["address"]["city"], "Seoul");
    assert!(v2[0].get("lines").is_none());
}

#[tokio::test]
async fn test_status_filter_and_bad_status() {
    let app = setup();
    let member_id = create_member(&app, "userA").await;
    let item_id = create_item(&app, "Book One", 10_000, 100).await;
    let order_id = place_order(&app, &member_id, &item_id, 1).await;
    place_order(&app, &member_id, &item_id, 1).await;

    let (_, _) = request(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/cancel"),
        None,
    )
    .await;

    let (status, json) = request(&app, "GET", "/api/v2/orders?status=CANCELLED", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["order_id"], order_id.as_str());

    let (status, json) = request(&app, "GET", "/api/v2/orders?member_name=serA", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, _) = request(&app, "GET", "/api/v2/orders?status=SHIPPED", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_not_found_mappings() {
    let app = setup();

    let missing = uuid::Uuid::new_v4();
    let (status, _) = request(&app, "GET", &format!("/api/v1/orders/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "POST",
        "/api/v1/orders",
        Some(serde_json::json!({
            "member_id": missing,
            "item_id": missing,
            "quantity": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "GET", "/api/v1/orders/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let app = setup();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
