mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer};

use bookmate::domain::PaymentError;
use bookmate::infrastructure::MemoryStore;
use bookmate::services::{PaymentRedirect, PaymentView};

use common::{app, data, order_json, sign_in};

const CASHIER_URL: &str = "https://checkout.paystack.com/abc123";

#[tokio::test]
async fn test_paid_order_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/o1"))
        .respond_with(data(order_json("o1", "paid")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate-cashier"))
        .respond_with(data(json!({ "cashierUrl": CASHIER_URL })))
        .expect(0)
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));
    sign_in(&state, "student");

    let view = state.payment.load_order("o1").await.unwrap();
    assert!(matches!(view, PaymentView::AlreadyPaid(_)));
    assert_eq!(view.order().id, "o1");
}

#[tokio::test]
async fn test_pending_order_redirects_to_cashier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/o1"))
        .respond_with(data(order_json("o1", "pending")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate-cashier"))
        .and(body_json(json!({ "orderId": "o1" })))
        .respond_with(data(json!({ "cashierUrl": CASHIER_URL, "reference": "ref-77" })))
        .expect(1)
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));
    sign_in(&state, "student");

    let view = state.payment.load_order("o1").await.unwrap();
    assert!(matches!(view, PaymentView::AwaitingPayment(_)));

    let redirect = state.payment.initiate_payment("o1").await.unwrap();
    assert_eq!(redirect, PaymentRedirect::Navigate(CASHIER_URL.to_string()));
}

#[tokio::test]
async fn test_missing_cashier_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate-cashier"))
        .respond_with(data(json!({ "reference": "ref-77" })))
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));
    sign_in(&state, "student");

    let err = state.payment.initiate_payment("o1").await.unwrap_err();
    assert!(matches!(err, PaymentError::MissingRedirect));
    assert_eq!(err.user_message(), "Payment URL not available. Please try again.");
}

#[tokio::test]
async fn test_initiation_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate-cashier"))
        .respond_with(common::error(400, "Order already paid"))
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));
    sign_in(&state, "student");

    let err = state.payment.initiate_payment("o1").await.unwrap_err();
    assert_eq!(err.user_message(), "Order already paid");
}

#[tokio::test]
async fn test_signed_out_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/o1"))
        .respond_with(data(order_json("o1", "pending")))
        .expect(0)
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));

    let err = state.payment.load_order("o1").await.unwrap_err();
    assert!(matches!(err, PaymentError::LoginRequired));
}

#[tokio::test]
async fn test_second_initiation_while_pending_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payments/initiate-cashier"))
        .respond_with(
            data(json!({ "cashierUrl": CASHIER_URL })).set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));
    sign_in(&state, "student");

    let (first, second) = tokio::join!(
        state.payment.initiate_payment("o1"),
        state.payment.initiate_payment("o1")
    );
    assert!(matches!(first.unwrap(), PaymentRedirect::Navigate(_)));
    assert_eq!(second.unwrap(), PaymentRedirect::AlreadyPending);
}

#[tokio::test]
async fn test_payment_status_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/status/ref-77"))
        .respond_with(data(json!({ "reference": "ref-77", "status": "success", "orderId": "o1" })))
        .mount(&server)
        .await;

    let state = app(&server, Arc::new(MemoryStore::new()));
    sign_in(&state, "student");

    let report = state.payment.payment_status("ref-77").await.unwrap();
    assert_eq!(report.status, "success");
    assert_eq!(report.order_id.as_deref(), Some("o1"));
}
