//! Repository trait definitions
//!
//! These traits define the contract for durable client state and for the
//! remote storefront API. Implementations live in the infrastructure layer.

use async_trait::async_trait;
use secrecy::SecretString;

use super::{ApiError, StorageError};
use crate::models::{
    AuthResponse, Book, BookForm, LoginRequest, NewOrder, Order, OrderStatus, PaymentSession,
    PaymentStatusReport, RegisterRequest,
};

/// Names of the durable slots
pub mod slots {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const CART: &str = "cart";
}

/// Durable string key-value slots, the client's only persistent state.
///
/// Writes replace the whole value; there is no partial update.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, `None` when it has never been written or was removed
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value of a slot
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot; removing an absent slot is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Supplies the bearer credential to the API client and learns when it was rejected.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;

    /// Called once per authenticated request the server answered with 401
    fn credentials_rejected(&self);
}

/// The storefront REST API as consumed by the client
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// POST /auth/register
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    /// POST /auth/login
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// GET /books
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;

    /// GET /books/:id
    async fn get_book(&self, id: &str) -> Result<Book, ApiError>;

    /// POST /books (multipart)
    async fn create_book(&self, form: &BookForm) -> Result<Book, ApiError>;

    /// PUT /books/:id (multipart)
    async fn update_book(&self, id: &str, form: &BookForm) -> Result<Book, ApiError>;

    /// DELETE /books/:id
    async fn delete_book(&self, id: &str) -> Result<(), ApiError>;

    /// POST /orders
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError>;

    /// GET /orders
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// GET /orders/:id
    async fn get_order(&self, id: &str) -> Result<Order, ApiError>;

    /// DELETE /orders/:id
    async fn cancel_order(&self, id: &str) -> Result<Order, ApiError>;

    /// POST /payments/initiate-cashier
    async fn initiate_cashier_payment(&self, order_id: &str)
    -> Result<PaymentSession, ApiError>;

    /// GET /payments/status/:reference
    async fn payment_status(&self, reference: &str) -> Result<PaymentStatusReport, ApiError>;

    /// GET /admin/orders
    async fn list_all_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// PUT /admin/orders/:id/status
    async fn update_order_status(&self, id: &str, status: OrderStatus)
    -> Result<Order, ApiError>;
}
