//! HTTP-level flow tests over the full router with an in-memory store

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

use backoffice_server::{Config, Server, ServerState};

async fn test_router() -> Router {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    let state = ServerState::new(Config::with_overrides("/tmp/backoffice-test", 0), db);
    Server::build_router(state)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router().await;
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_product_create_mirrors_stock_and_publishes() {
    let router = test_router().await;

    let (status, product) = send(
        &router,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Widget",
            "product_type": "physical",
            "product_structure": "simple",
            "base_stock": 10,
            "min_stock": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = product["id"].as_str().unwrap().to_string();

    // The ledger mirrors the configuration
    let (status, entries) = send(&router, "GET", "/api/stock", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["quantity"], 10);
    assert_eq!(entries[0]["min_stock"], 5);

    // Publish is allowed and results in selling
    let (status, check) = send(
        &router,
        "PUT",
        &format!("/api/products/{}/publish", product_id),
        Some(json!({ "published": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["can_publish"], true);
    assert_eq!(check["status"], "selling");
}

#[tokio::test]
async fn test_publish_refusal_is_a_structured_result() {
    let router = test_router().await;

    let (_, product) = send(
        &router,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Shirt",
            "product_type": "physical",
            "product_structure": "variant",
            "variants": []
        })),
    )
    .await;
    let product_id = product["id"].as_str().unwrap();

    let (status, check) = send(
        &router,
        "PUT",
        &format!("/api/products/{}/publish", product_id),
        Some(json!({ "published": true })),
    )
    .await;
    // An expected, actionable outcome: HTTP 200 with can_publish = false
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["can_publish"], false);
    assert!(check["message"].as_str().unwrap().contains("variant"));
}

#[tokio::test]
async fn test_duplicate_stock_entry_is_conflict() {
    let router = test_router().await;

    let (_, product) = send(
        &router,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Widget",
            "product_type": "physical",
            "product_structure": "simple",
            "base_stock": 3,
            "min_stock": 1
        })),
    )
    .await;
    let product_id = product["id"].as_str().unwrap();

    let (status, _) = send(
        &router,
        "POST",
        "/api/stock",
        Some(json!({
            "product": product_id,
            "variant_id": null,
            "quantity": 1,
            "min_stock": 1,
            "actor": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_order_dispatch_deducts_stock() {
    let router = test_router().await;

    let (_, product) = send(
        &router,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Widget",
            "product_type": "physical",
            "product_structure": "simple",
            "base_stock": 3,
            "min_stock": 1
        })),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, order) = send(
        &router,
        "POST",
        "/api/orders",
        Some(json!({
            "items": [{ "product": product_id, "variant_id": null, "quantity": 4 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, result) = send(
        &router,
        "PUT",
        &format!("/api/orders/{}/status", order_id),
        Some(json!({ "status": "dispatched" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["order"]["status"], "dispatched");
    assert_eq!(result["dispatch"]["deducted"], 1);

    // Clamped at zero, flagged out of stock
    let (_, current) = send(&router, "GET", &format!("/api/products/{}", product_id), None).await;
    assert_eq!(current["base_stock"], 0);
    assert_eq!(current["status"], "out_of_stock");

    // A second dispatch transition reports no deduction
    let (_, result) = send(
        &router,
        "PUT",
        &format!("/api/orders/{}/status", order_id),
        Some(json!({ "status": "dispatched" })),
    )
    .await;
    assert!(result["dispatch"].is_null());
}

#[tokio::test]
async fn test_stock_export_formats() {
    let router = test_router().await;

    send(
        &router,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Widget",
            "product_type": "physical",
            "product_structure": "simple",
            "base_stock": 5,
            "min_stock": 2
        })),
    )
    .await;

    let (status, rows) = send(&router, "GET", "/api/stock/export?format=json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["product_name"], "Widget");

    let request = Request::builder()
        .method("GET")
        .uri("/api/stock/export?format=csv")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.lines().next().unwrap().starts_with("id,product,"));
    assert!(csv.contains("Widget"));
}

#[tokio::test]
async fn test_bulk_sync_endpoint_reports_summary() {
    let router = test_router().await;

    send(
        &router,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Widget",
            "product_type": "physical",
            "product_structure": "simple",
            "base_stock": 5,
            "min_stock": 2
        })),
    )
    .await;

    let (status, report) = send(&router, "POST", "/api/stock/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success_count"], 1);
    assert_eq!(report["failed_count"], 0);
}
