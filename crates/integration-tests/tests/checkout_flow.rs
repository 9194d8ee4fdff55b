//! End-to-end checkout: cart -> selections -> order placement.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use kirana_client::ClientError;
use kirana_client::ledger::{Address, CartLine, ShippingMethod};
use kirana_core::{Phone, ProductId, VariantKey};

use kirana_integration_tests::{init_tracing, spawn_fixture_server, test_state};

fn d(value: i64) -> Decimal {
    Decimal::from(value)
}

fn user() -> Phone {
    Phone::parse("9876543210").unwrap()
}

fn cart_line() -> CartLine {
    CartLine {
        product_id: ProductId::new("7"),
        name: "Basmati Rice".to_string(),
        pack_label: "5 kg".to_string(),
        price: d(450),
        sale_price: Some(d(400)),
        points: 10,
        quantity: 2,
        stock: None,
        image: "rice.jpg".to_string(),
        owner: user(),
        variant: Some(VariantKey::new(d(450), Some(d(400)))),
    }
}

fn selections() -> (Address, ShippingMethod) {
    let address = Address::new(
        user(),
        "Asha",
        "14 MG Road",
        None,
        "Bengaluru",
        "KA",
        "560001",
    );
    let shipping = ShippingMethod {
        id: "standard".to_string(),
        label: "Standard".to_string(),
        fee: d(40),
        eta_days: Some(3),
    };
    (address, shipping)
}

#[tokio::test]
async fn test_place_order_round_trip() {
    init_tracing();

    // the fixture echoes totals back so the payload itself is verified
    let app = Router::new().route(
        "/orders",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body.get("user").and_then(Value::as_str), Some("9876543210"));
            assert_eq!(
                body.get("subtotal").and_then(Value::as_str),
                Some("800"),
                "subtotal uses effective prices: 2 x 400"
            );
            assert_eq!(body.get("total").and_then(Value::as_str), Some("840"));
            assert_eq!(body.get("points_earned").and_then(Value::as_i64), Some(20));

            Json(json!({"data": {
                "id": "ord-99",
                "user": "9876543210",
                "status": "placed",
                "total": "840"
            }}))
        }),
    );
    let base = spawn_fixture_server(app).await;

    let dir = tempfile::tempdir().unwrap();
    let state = test_state(base, dir.path());

    state.cart().add(cart_line()).await;
    let (address, shipping) = selections();
    state.checkout().select_address(address);
    state.checkout().select_shipping(shipping);

    let order = state.place_order(&user(), 0).await.unwrap();
    assert_eq!(order.id.as_str(), "ord-99");
    assert_eq!(order.status, "placed");

    // success clears the user's cart and the selections
    assert!(state.cart().lines_for(&user()).await.is_empty());
    assert!(state.checkout().selected_address().is_none());
    assert!(state.checkout().selected_shipping().is_none());
}

#[tokio::test]
async fn test_rejected_order_keeps_cart_and_selections() {
    init_tracing();

    let app = Router::new().route(
        "/orders",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down").into_response() }),
    );
    let base = spawn_fixture_server(app).await;

    let dir = tempfile::tempdir().unwrap();
    let state = test_state(base, dir.path());

    state.cart().add(cart_line()).await;
    let (address, shipping) = selections();
    state.checkout().select_address(address);
    state.checkout().select_shipping(shipping);

    let result = state.place_order(&user(), 0).await;
    assert!(matches!(result, Err(ClientError::Catalog(_))));

    // nothing is cleared on failure
    assert_eq!(state.cart().lines_for(&user()).await.len(), 1);
    assert!(state.checkout().selected_address().is_some());
}

#[tokio::test]
async fn test_order_status_update_and_redemption() {
    init_tracing();

    let app = Router::new()
        .route(
            "/orders/{id}/status",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body.get("status").and_then(Value::as_str), Some("cancelled"));
                Json(json!({"ok": true}))
            }),
        )
        .route(
            "/redemptions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body.get("reward").and_then(Value::as_str), Some("r1"));
                Json(json!({"ok": true}))
            }),
        );
    let base = spawn_fixture_server(app).await;

    let dir = tempfile::tempdir().unwrap();
    let state = test_state(base, dir.path());

    state
        .catalog()
        .update_order_status(&kirana_core::OrderId::new("ord-99"), "cancelled")
        .await
        .unwrap();
    state
        .catalog()
        .redeem_reward(&user(), &kirana_core::RewardId::new("r1"))
        .await
        .unwrap();
}
