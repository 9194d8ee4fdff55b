//! Catalog client tests against an in-process fixture server.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use kirana_client::catalog::{CatalogClient, CatalogError};
use kirana_client::config::ClientConfig;
use kirana_core::Phone;

use kirana_integration_tests::{init_tracing, spawn_fixture_server};

fn product_fixture() -> serde_json::Value {
    json!({
        "id": 7,
        "name": "Basmati Rice",
        "brand": "Daawat",
        "category": "Staples",
        "image": "rice.jpg",
        "points": 5,
        "variants": [
            {"label": "1 kg", "price": 100, "sale_price": 90},
            {"label": "5 kg", "price": 450}
        ]
    })
}

async fn client_for(app: Router) -> CatalogClient {
    init_tracing();
    let base = spawn_fixture_server(app).await;
    CatalogClient::new(&ClientConfig::with_base_url(base)).unwrap()
}

#[tokio::test]
async fn test_bare_array_and_results_envelope_map_identically() {
    let bare = client_for(
        Router::new().route("/products", get(|| async { Json(json!([product_fixture()])) })),
    )
    .await;
    let enveloped = client_for(Router::new().route(
        "/products",
        get(|| async { Json(json!({"results": [product_fixture()]})) }),
    ))
    .await;

    let from_bare = bare.products().await.unwrap();
    let from_envelope = enveloped.products().await.unwrap();

    assert_eq!(
        serde_json::to_value(&from_bare).unwrap(),
        serde_json::to_value(&from_envelope).unwrap()
    );
}

#[tokio::test]
async fn test_products_normalize_variants_over_the_wire() {
    let client = client_for(Router::new().route(
        "/products",
        get(|| async { Json(json!({"data": [product_fixture()]})) }),
    ))
    .await;

    let products = client.products().await.unwrap();
    assert_eq!(products.len(), 1);

    let product = products.first().unwrap();
    assert_eq!(product.id.as_str(), "7");
    assert_eq!(product.variants.len(), 2);

    // range spans effective prices: 90 (sale) to 450
    let range = product.price_range.unwrap();
    assert_eq!(range.min, rust_decimal::Decimal::from(90));
    assert_eq!(range.max, rust_decimal::Decimal::from(450));
}

#[tokio::test]
async fn test_server_error_is_distinguishable_from_empty() {
    let failing = client_for(Router::new().route(
        "/products",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() }),
    ))
    .await;
    let empty = client_for(
        Router::new().route("/products", get(|| async { Json(json!([])) })),
    )
    .await;

    assert!(matches!(
        failing.products().await,
        Err(CatalogError::Status { status: 500, .. })
    ));
    assert_eq!(empty.products().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_non_json_body_is_a_parse_error() {
    let client = client_for(
        Router::new().route("/banners", get(|| async { "<html>not json</html>" })),
    )
    .await;

    assert!(matches!(client.banners().await, Err(CatalogError::Parse(_))));
}

#[tokio::test]
async fn test_unknown_envelope_is_an_error() {
    let client = client_for(Router::new().route(
        "/brands",
        get(|| async { Json(json!({"items": []})) }),
    ))
    .await;

    assert!(matches!(client.brands().await, Err(CatalogError::Envelope(_))));
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let client = client_for(Router::new().route(
        "/products",
        get(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", "30")],
                "slow down",
            )
                .into_response()
        }),
    ))
    .await;

    assert!(matches!(
        client.products().await,
        Err(CatalogError::RateLimited(30))
    ));
}

#[tokio::test]
async fn test_products_are_cached_within_ttl() {
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = hits.clone();

    let client = client_for(Router::new().route(
        "/products",
        get(move || {
            let hits = handler_hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!([]))
            }
        }),
    ))
    .await;

    client.products().await.unwrap();
    client.products().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client.invalidate_all().await;
    client.products().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_content_endpoints_map_leniently() {
    let app = Router::new()
        .route(
            "/banners",
            get(|| async { Json(json!([{"id": 1, "title": "Sale", "banner": "s.jpg"}])) }),
        )
        .route(
            "/categories",
            get(|| async { Json(json!({"results": [{"id": "c1", "title": "Staples"}]})) }),
        )
        .route(
            "/brands",
            get(|| async { Json(json!({"data": [{"id": "b1", "name": "Amul"}]})) }),
        )
        .route(
            "/rewards",
            get(|| async {
                Json(json!([{"id": "r1", "name": "Free Delivery", "points_cost": 200}]))
            }),
        );
    let client = client_for(app).await;

    assert_eq!(client.banners().await.unwrap().first().unwrap().image, "s.jpg");
    assert_eq!(
        client.categories().await.unwrap().first().unwrap().name,
        "Staples"
    );
    assert_eq!(client.brands().await.unwrap().first().unwrap().name, "Amul");

    let rewards = client.rewards().await.unwrap();
    assert_eq!(rewards.first().unwrap().title, "Free Delivery");
    assert_eq!(rewards.first().unwrap().points_cost, 200);
}

#[tokio::test]
async fn test_orders_for_passes_user_query() {
    let app = Router::new().route(
        "/orders",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("user").map(String::as_str), Some("+919876543210"));
            Json(json!([{"id": "ord-1", "user": "+919876543210", "status": "placed"}]))
        }),
    );
    let client = client_for(app).await;

    let user = Phone::parse("+919876543210").unwrap();
    let orders = client.orders_for(&user).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().unwrap().status, "placed");
}
