//! Dispatch tests that call `handle` directly, without a socket.

use axum::http::{Method, StatusCode};
use book_orders::api::handler::{HandlerOptions, OrderRequest, OrderResponse, handle};
use book_orders::store::{OrderStore, SharedOrderStore};
use serde_json::{Value, json};

fn new_order_json(quantity: i64, price: Value) -> String {
    json!({
        "customer_name": "Dana",
        "customer_email": "dana@example.com",
        "book_title": "Programming Rust",
        "book_isbn": "978-1492052593",
        "quantity": quantity,
        "price": price,
    })
    .to_string()
}

fn body_json(resp: &OrderResponse) -> Value {
    serde_json::from_str(&resp.body).unwrap()
}

async fn create_order(store: &SharedOrderStore, opts: &HandlerOptions) -> String {
    let req = OrderRequest::new(Method::POST, "/orders").with_body(new_order_json(2, json!(4.5)));
    let resp = handle(store, req, opts).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    body_json(&resp)["order_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn preflight_has_cors_headers_and_no_content_type() {
    let store = OrderStore::new().shared();
    let resp = handle(
        &store,
        OrderRequest::new(Method::OPTIONS, "/whatever"),
        &HandlerOptions::default(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.is_empty());
    assert_eq!(resp.headers.len(), 3);
    assert_eq!(resp.headers["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn json_responses_carry_content_type() {
    let store = OrderStore::new().shared();
    let resp = handle(
        &store,
        OrderRequest::new(Method::GET, "/orders"),
        &HandlerOptions::default(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "[]");
    assert_eq!(resp.headers["content-type"], "application/json");
    assert_eq!(
        resp.headers["access-control-allow-methods"],
        "GET,POST,PUT,DELETE,OPTIONS"
    );
}

#[tokio::test]
async fn collection_route_requires_exact_path() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();

    for path in ["/orders/", "/api/orders", "/orders?x=1"] {
        let resp = handle(&store, OrderRequest::new(Method::GET, path), &opts).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "path {path}");
        assert_eq!(body_json(&resp)["error"], "Not found");
    }
}

#[tokio::test]
async fn member_route_matches_loosely_on_trailing_segment() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();
    let id = create_order(&store, &opts).await;

    let req = OrderRequest::new(Method::DELETE, format!("/api/v1/orders/{id}"));
    let resp = handle(&store, req, &opts).await;
    assert_eq!(resp.status, StatusCode::OK);

    let guard = store.read().await;
    assert_eq!(guard.get(&id).unwrap().status.as_str(), "cancelled");
}

#[tokio::test]
async fn empty_trailing_segment_is_order_not_found() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();
    create_order(&store, &opts).await;

    let resp = handle(&store, OrderRequest::new(Method::DELETE, "/orders/"), &opts).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(body_json(&resp)["error"], "Order not found");
}

#[tokio::test]
async fn malformed_json_is_a_500() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();

    let req = OrderRequest::new(Method::POST, "/orders").with_body("{not json");
    let resp = handle(&store, req, &opts).await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body_json(&resp)["error"].as_str().unwrap().is_empty());

    // The body is parsed before the id lookup, so an unknown id still yields 500.
    let req = OrderRequest::new(Method::PUT, "/orders/unknown").with_body("[1,");
    let resp = handle(&store, req, &opts).await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_body_is_a_500() {
    let store = OrderStore::new().shared();
    let resp = handle(
        &store,
        OrderRequest::new(Method::POST, "/orders"),
        &HandlerOptions::default(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(&resp)["error"], "request body is required");
}

#[tokio::test]
async fn wrong_field_type_is_a_500_even_when_strict() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions {
        strict_validation: true,
        ..HandlerOptions::default()
    };

    let req = OrderRequest::new(Method::POST, "/orders")
        .with_body(new_order_json(1, json!("not-a-price")));
    let resp = handle(&store, req, &opts).await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(&resp)["error"].as_str().unwrap().contains("price"));
    assert!(store.read().await.is_empty());
}

#[tokio::test]
async fn numeric_string_price_is_accepted() {
    let store = OrderStore::new().shared();
    let req = OrderRequest::new(Method::POST, "/orders").with_body(new_order_json(3, json!("0.10")));
    let resp = handle(&store, req, &HandlerOptions::default()).await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let order = body_json(&resp);
    assert_eq!(order["price"], "0.10");
    assert_eq!(order["total_amount"], "0.30");
}

#[tokio::test]
async fn update_recomputes_total_when_enabled() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions {
        recompute_total_on_update: true,
        ..HandlerOptions::default()
    };
    let id = create_order(&store, &opts).await;

    let req = OrderRequest::new(Method::PUT, format!("/orders/{id}"))
        .with_body(json!({ "quantity": 4 }).to_string());
    let resp = handle(&store, req, &opts).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(store.read().await.get(&id).unwrap().total_amount.to_string(), "18.0");

    // An explicit total always wins over recomputation.
    let req = OrderRequest::new(Method::PUT, format!("/orders/{id}"))
        .with_body(json!({ "price": 5, "total_amount": 1.25 }).to_string());
    handle(&store, req, &opts).await;
    let guard = store.read().await;
    let order = guard.get(&id).unwrap();
    assert_eq!(order.price.to_string(), "5");
    assert_eq!(order.total_amount.to_string(), "1.25");
}

#[tokio::test]
async fn update_with_custom_status_round_trips() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();
    let id = create_order(&store, &opts).await;

    let req = OrderRequest::new(Method::PUT, format!("/orders/{id}"))
        .with_body(json!({ "status": "backordered" }).to_string());
    assert_eq!(handle(&store, req, &opts).await.status, StatusCode::OK);

    let resp = handle(&store, OrderRequest::new(Method::GET, "/orders"), &opts).await;
    assert_eq!(body_json(&resp)[0]["status"], "backordered");
}

fn raw_order_body(quantity: &str) -> String {
    format!(
        r#"{{"customer_name":"Dana","customer_email":"dana@example.com","book_title":"Programming Rust","book_isbn":"978-1492052593","quantity":{quantity},"price":10}}"#
    )
}

#[tokio::test]
async fn float_quantity_is_accepted_and_echoed() {
    let store = OrderStore::new().shared();
    let req = OrderRequest::new(Method::POST, "/orders").with_body(raw_order_body("2.0"));
    let resp = handle(&store, req, &HandlerOptions::default()).await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let order = body_json(&resp);
    assert_eq!(order["quantity"], json!(2.0));
    assert_eq!(order["total_amount"], "20.0");

    let req = OrderRequest::new(Method::POST, "/orders").with_body(raw_order_body("1.5"));
    let resp = handle(&store, req, &HandlerOptions::default()).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(body_json(&resp)["total_amount"], "15.0");
}

#[tokio::test]
async fn quantity_beyond_i64_is_accepted() {
    let store = OrderStore::new().shared();
    let req = OrderRequest::new(Method::POST, "/orders")
        .with_body(raw_order_body("18446744073709551615"));
    let resp = handle(&store, req, &HandlerOptions::default()).await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let order = body_json(&resp);
    assert_eq!(order["quantity"], json!(u64::MAX));
    assert_eq!(order["total_amount"], "184467440737095516150");
}

#[tokio::test]
async fn non_utf8_body_is_a_500() {
    let store = OrderStore::new().shared();
    let mut body = br#"{"customer_name":""#.to_vec();
    body.extend_from_slice(&[0xff, 0xfe]);
    body.extend_from_slice(
        br#"","customer_email":"d@x","book_title":"t","book_isbn":"i","quantity":1,"price":1}"#,
    );

    let req = OrderRequest::new(Method::POST, "/orders").with_body(body);
    let resp = handle(&store, req, &HandlerOptions::default()).await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(&resp)["error"].as_str().unwrap().starts_with("malformed request body"));
    assert!(store.read().await.is_empty());
}

#[tokio::test]
async fn update_with_wrong_types_is_a_500_and_changes_nothing() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();
    let id = create_order(&store, &opts).await;
    let before = store.read().await.get(&id).unwrap().clone();

    for body in [
        json!({ "quantity": null }),
        json!({ "status": 7 }),
        json!({ "status": "shipped", "price": [1] }),
    ] {
        let req = OrderRequest::new(Method::PUT, format!("/orders/{id}")).with_body(body.to_string());
        let resp = handle(&store, req, &opts).await;
        assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR, "body {body}");
    }

    assert_eq!(store.read().await.get(&id).unwrap(), &before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_and_cancels_stay_consistent() {
    let store = OrderStore::new().shared();
    let opts = HandlerOptions::default();
    let id = create_order(&store, &opts).await;

    let mut tasks = Vec::new();
    for k in 1..=50u32 {
        let store = store.clone();
        let path = format!("/orders/{id}");
        tasks.push(tokio::spawn(async move {
            let req = if k % 10 == 0 {
                OrderRequest::new(Method::DELETE, path)
            } else {
                // Quantity and total always move together within one request.
                OrderRequest::new(Method::PUT, path)
                    .with_body(json!({ "quantity": k, "total_amount": k }).to_string())
            };
            handle(&store, req, &opts).await.status
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let guard = store.read().await;
    assert_eq!(guard.len(), 1);
    let order = guard.get(&id).unwrap();
    assert_eq!(order.status.as_str(), "cancelled");
    assert_eq!(order.quantity.to_string(), order.total_amount.to_string());
}
