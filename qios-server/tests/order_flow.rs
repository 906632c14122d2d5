//! Order, cancel and notification flow against a real PostgreSQL
//!
//! Runs only when `TEST_DATABASE_URL` is set; every test seeds its own demo
//! store through `/api/dev/seed`, so the database can be shared.

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use qios_server::payment::PaymentConfig;
use qios_server::{AppState, Config, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn setup() -> Option<Router> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };
    let config = Config {
        database_url,
        database_max_connections: 10,
        http_port: 0,
        environment: "development".into(),
        jwt_secret: "test-secret".into(),
        gemini_api_key: None,
        gemini_model: "gemini-1.5-flash".into(),
        payment: PaymentConfig::default(),
        cors_origins: vec![],
    };
    let state = AppState::new(&config).await.expect("connect to test database");
    Some(build_router(state))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Seeded store with products and raw materials indexed by name
struct Demo {
    store_id: i64,
    products: HashMap<String, i64>,
    materials: HashMap<String, i64>,
}

async fn seed(app: &Router) -> Demo {
    let (status, body) = call(app, Method::POST, "/api/dev/seed", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let store_id = body["data"]["storeId"].as_i64().unwrap();

    let (_, body) = call(app, Method::GET, &format!("/api/products?storeId={store_id}"), None).await;
    let products = by_name(&body["data"]);
    let (_, body) = call(app, Method::GET, &format!("/api/inventory?storeId={store_id}"), None).await;
    let materials = by_name(&body["data"]);

    Demo {
        store_id,
        products,
        materials,
    }
}

fn by_name(rows: &Value) -> HashMap<String, i64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| (r["name"].as_str().unwrap().to_string(), r["id"].as_i64().unwrap()))
        .collect()
}

async fn product_stock(app: &Router, demo: &Demo, name: &str) -> i64 {
    let id = demo.products[name];
    let (_, body) = call(
        app,
        Method::GET,
        &format!("/api/products/{id}?storeId={}", demo.store_id),
        None,
    )
    .await;
    body["data"]["stockQuantity"].as_i64().unwrap()
}

async fn material_stock(app: &Router, demo: &Demo, name: &str) -> f64 {
    let (_, body) = call(
        app,
        Method::GET,
        &format!("/api/inventory?storeId={}", demo.store_id),
        None,
    )
    .await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == name)
        .and_then(|m| m["stock"].as_f64())
        .unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
}

#[tokio::test]
async fn order_totals_and_stock_decrements() {
    let Some(app) = setup().await else { return };
    let demo = seed(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "storeId": demo.store_id,
            "items": [
                {"productId": demo.products["Kopi Susu Gula Aren"], "quantity": 1},
                {"productId": demo.products["Americano"], "quantity": 1},
                {"productId": demo.products["Kopi Susu Gula Aren"], "quantity": 1},
            ],
            "discount": 1000,
            "paymentMethod": "CASH",
            "amountPaid": 60000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order = &body["data"];

    // 2 x 18.000 + 15.000
    assert_eq!(order["subtotal"].as_f64(), Some(51_000.0));
    assert_eq!(order["tax"].as_f64(), Some(5_610.0));
    assert_eq!(order["total"].as_f64(), Some(55_610.0));
    assert_eq!(order["changeAmount"].as_f64(), Some(4_390.0));
    assert_eq!(order["paymentStatus"], "PAID");
    assert_eq!(order["status"], "COMPLETED");
    // duplicate lines are merged
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    assert_eq!(product_stock(&app, &demo, "Kopi Susu Gula Aren").await, 98);
    assert_eq!(product_stock(&app, &demo, "Americano").await, 99);
    assert_close(material_stock(&app, &demo, "Biji Kopi Arabika").await, 4.946);
    assert_close(material_stock(&app, &demo, "Susu Segar").await, 19.7);
    assert_close(material_stock(&app, &demo, "Cup Plastik").await, 297.0);

    let coffee = demo.materials["Biji Kopi Arabika"];
    let (_, body) = call(
        &app,
        Method::GET,
        &format!(
            "/api/inventory/movements?storeId={}&rawMaterialId={coffee}",
            demo.store_id
        ),
        None,
    )
    .await;
    let usage = &body["data"][0];
    assert_eq!(usage["movementType"], "USAGE");
    assert_eq!(usage["referenceId"], order["id"]);
    assert_close(usage["quantity"].as_f64().unwrap(), -0.054);
    assert_close(usage["stockBefore"].as_f64().unwrap(), 5.0);
    assert_close(usage["stockAfter"].as_f64().unwrap(), 4.946);
}

#[tokio::test]
async fn out_of_stock_order_changes_nothing() {
    let Some(app) = setup().await else { return };
    let demo = seed(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "storeId": demo.store_id,
            "items": [
                {"productId": demo.products["Kopi Susu Gula Aren"], "quantity": 1},
                {"productId": demo.products["Americano"], "quantity": 101},
            ],
            "paymentMethod": "QRIS",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);

    assert_eq!(product_stock(&app, &demo, "Kopi Susu Gula Aren").await, 100);
    assert_eq!(product_stock(&app, &demo, "Americano").await, 100);
    assert_close(material_stock(&app, &demo, "Biji Kopi Arabika").await, 5.0);
}

#[tokio::test]
async fn concurrent_orders_never_oversell() {
    let Some(app) = setup().await else { return };
    let demo = seed(&app).await;
    // 40 in stock, 10 orders of 5
    let product_id = demo.products["Pisang Goreng"];

    let mut handles = Vec::new();
    for _ in 0..10 {
        let app = app.clone();
        let body = json!({
            "storeId": demo.store_id,
            "items": [{"productId": product_id, "quantity": 5}],
            "paymentMethod": "CARD",
        });
        handles.push(tokio::spawn(async move {
            call(&app, Method::POST, "/api/orders", Some(body)).await.0
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::OK {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 8);
    assert_eq!(product_stock(&app, &demo, "Pisang Goreng").await, 0);
    // 60 eggs, one per Pisang Goreng
    assert_close(material_stock(&app, &demo, "Telur").await, 20.0);
}

#[tokio::test]
async fn cancel_restores_stock_once() {
    let Some(app) = setup().await else { return };
    let demo = seed(&app).await;

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "storeId": demo.store_id,
            "items": [{"productId": demo.products["Cafe Latte"], "quantity": 3}],
            "paymentMethod": "TRANSFER",
        })),
    )
    .await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(product_stock(&app, &demo, "Cafe Latte").await, 77);
    assert_close(material_stock(&app, &demo, "Susu Segar").await, 19.4);

    let cancel = json!({"storeId": demo.store_id, "orderId": order_id});
    let (status, body) = call(&app, Method::POST, "/api/dev/cancel-order", Some(cancel.clone())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "CANCELLED");

    assert_eq!(product_stock(&app, &demo, "Cafe Latte").await, 80);
    assert_close(material_stock(&app, &demo, "Susu Segar").await, 20.0);
    assert_close(material_stock(&app, &demo, "Biji Kopi Arabika").await, 5.0);

    let (status, body) = call(&app, Method::POST, "/api/dev/cancel-order", Some(cancel)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4003);
    assert_eq!(product_stock(&app, &demo, "Cafe Latte").await, 80);
}

#[tokio::test]
async fn notifications_are_store_scoped() {
    let Some(app) = setup().await else { return };
    let a = seed(&app).await;
    let b = seed(&app).await;

    // ORDER notification lands in store A only
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "storeId": a.store_id,
            "items": [{"productId": a.products["Americano"], "quantity": 1}],
            "paymentMethod": "CASH",
            "amountPaid": 20000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for title in ["Tutup buku", "Stok opname"] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/notifications",
            Some(json!({
                "storeId": b.store_id,
                "kind": "SYSTEM",
                "title": title,
                "message": "Pengingat harian",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/notifications?storeId={}&limit=1", b.store_id),
        None,
    )
    .await;
    let list = &body["data"];
    assert_eq!(list["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(list["unreadCount"], 2);
    assert_eq!(list["notifications"][0]["storeId"].as_i64(), Some(b.store_id));
    let first = list["notifications"][0]["id"].as_i64().unwrap();

    let (_, body) = call(
        &app,
        Method::PUT,
        "/api/notifications/read",
        Some(json!({"storeId": b.store_id, "ids": [first]})),
    )
    .await;
    assert_eq!(body["data"], 1);

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/notifications?storeId={}", b.store_id),
        None,
    )
    .await;
    assert_eq!(body["data"]["unreadCount"], 1);
    assert_eq!(body["data"]["notifications"].as_array().unwrap().len(), 2);

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/notifications?storeId={}", a.store_id),
        None,
    )
    .await;
    let rows = body["data"]["notifications"].as_array().unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|n| n["storeId"].as_i64() == Some(a.store_id)));
    let unread = rows.iter().filter(|n| n["isRead"] == false).count() as i64;
    assert_eq!(body["data"]["unreadCount"].as_i64(), Some(unread));
}

#[tokio::test]
async fn restocked_product_sells_again() {
    let Some(app) = setup().await else { return };
    let demo = seed(&app).await;
    // 40 in stock, minimum 10
    let id = demo.products["Pisang Goreng"];
    let adjust = |quantity: i32, movement_type: &str| {
        json!({
            "storeId": demo.store_id,
            "quantity": quantity,
            "movementType": movement_type,
            "notes": "Stok opname",
        })
    };
    let uri = format!("/api/products/{id}/adjust");

    let (status, body) = call(&app, Method::POST, &uri, Some(adjust(-35, "ADJUSTMENT"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stockQuantity"], 5);

    let (status, body) = call(&app, Method::POST, &uri, Some(adjust(-6, "ADJUSTMENT"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7003);
    let (status, _) = call(&app, Method::POST, &uri, Some(adjust(-1, "RESTOCK"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(product_stock(&app, &demo, "Pisang Goreng").await, 5);

    let order = json!({
        "storeId": demo.store_id,
        "items": [{"productId": id, "quantity": 6}],
        "paymentMethod": "CASH",
        "amountPaid": 100000,
    });
    let (status, body) = call(&app, Method::POST, "/api/orders", Some(order.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);

    let (status, body) = call(&app, Method::POST, &uri, Some(adjust(20, "RESTOCK"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stockQuantity"], 25);

    let (status, body) = call(&app, Method::POST, "/api/orders", Some(order)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(product_stock(&app, &demo, "Pisang Goreng").await, 19);
    assert_close(material_stock(&app, &demo, "Telur").await, 54.0);

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/notifications?storeId={}", demo.store_id),
        None,
    )
    .await;
    let low_stock: Vec<&Value> = body["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["kind"] == "LOW_STOCK")
        .collect();
    assert_eq!(low_stock.len(), 1);
    assert!(low_stock[0]["message"].as_str().unwrap().contains("Pisang Goreng"));
}

#[tokio::test]
async fn large_order_gets_distinct_line_ids() {
    let Some(app) = setup().await else { return };
    let demo = seed(&app).await;

    let mut items = Vec::new();
    for n in 0..40 {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/products",
            Some(json!({
                "storeId": demo.store_id,
                "name": format!("Kue Kering {n:02}"),
                "price": 5000,
                "stockQuantity": 10,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        items.push(json!({"productId": body["data"]["id"], "quantity": 2}));
    }

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "storeId": demo.store_id,
            "items": items,
            "paymentMethod": "QRIS",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let lines = body["data"]["items"].as_array().unwrap();
    assert_eq!(lines.len(), 40);
    let mut ids: Vec<i64> = lines.iter().map(|l| l["id"].as_i64().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 40);
    assert_eq!(body["data"]["subtotal"].as_f64(), Some(400_000.0));
}
