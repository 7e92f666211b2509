// Shared fixtures for the integration tests
#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::{MockServer, ResponseTemplate};

use bookmate::AppState;
use bookmate::config::Config;
use bookmate::infrastructure::MemoryStore;
use bookmate::models::{AuthResponse, Book, User};

pub const TOKEN: &str = "test-token";

// Config pointing at the mock server
pub fn config(server: &MockServer) -> Config {
    let base = format!("{}/api", server.uri());
    Config::from_lookup(move |key| match key {
        "API_BASE_URL" => Some(base.clone()),
        "HOME" => Some("/tmp/bookmate-tests".to_string()),
        "CART_POLL_INTERVAL_MS" => Some("50".to_string()),
        _ => None,
    })
}

pub fn app(server: &MockServer, store: Arc<MemoryStore>) -> AppState {
    AppState::with_store(config(server), store).expect("Failed to build app state")
}

pub fn user_json(role: &str) -> Value {
    json!({
        "_id": "u1",
        "name": "Ngozi Eze",
        "email": "ngozi@futo.edu.ng",
        "regNumber": "20201234567",
        "role": role,
        "accommodation": "Eziobodo"
    })
}

// Put a signed-in session of the given role into the app
pub fn sign_in(state: &AppState, role: &str) {
    let user: User = serde_json::from_value(user_json(role)).expect("user fixture");
    state
        .session
        .establish(AuthResponse {
            token: TOKEN.to_string(),
            user,
        })
        .expect("Failed to establish session");
}

pub fn book_json(id: &str, price: f64, stock: u32) -> Value {
    json!({
        "_id": id,
        "title": format!("Book {}", id),
        "author": "Faculty Press",
        "price": price,
        "stock": stock,
        "category": "Textbook",
        "classFormLevel": "100 Level"
    })
}

pub fn book(id: &str, price: f64, stock: u32) -> Book {
    serde_json::from_value(book_json(id, price, stock)).expect("book fixture")
}

pub fn order_json(id: &str, payment_status: &str) -> Value {
    json!({
        "_id": id,
        "items": [{ "book": "b1", "quantity": 2, "price": 1000 }],
        "deliveryAddress": "Phone: 08031234567\nSUG Building - Pickup Station",
        "deliveryMethod": "pickup",
        "totalAmount": 2000,
        "orderStatus": "processing",
        "paymentStatus": payment_status,
        "student": "u1",
        "createdAt": "2025-02-01T10:30:00.000Z"
    })
}

// 200 with the API's `{ data }` envelope
pub fn data(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

pub fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "message": message }))
}
