//! Domain error types
//!
//! One enum per concern. Each user-facing error knows the message to surface
//! and, where it applies, where the front-end should navigate next.

use thiserror::Error;

use super::Navigation;

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Durable slot read/write failure
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid slot name '{0}'")]
    InvalidKey(String),
}

/// Failure talking to the storefront API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    /// Credentials rejected on an authenticated call; the session has been cleared
    #[error("authorization rejected")]
    Unauthorized,
    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if e.is_builder() {
            ApiError::Configuration(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl ApiError {
    /// Message provided by the server, if it sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// Server message when present, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized => SESSION_EXPIRED.to_string(),
            _ => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            ApiError::Unauthorized => Some(Navigation::Login),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login failed: {0}")]
    Login(#[source] ApiError),
    #[error("registration failed: {0}")]
    Register(#[source] ApiError),
    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Login(e) => e.user_message("Login failed"),
            AuthError::Register(e) => e.user_message("Registration failed"),
            AuthError::Storage(_) => "Could not save your session on this device".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("login required")]
    LoginRequired,
    #[error("admin accounts cannot add items to cart")]
    AdminForbidden,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { available: u32, requested: u32 },
    #[error("book {0} is not in the cart")]
    NotInCart(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CartError {
    pub fn user_message(&self) -> String {
        match self {
            CartError::LoginRequired => "Please log in to add books to your cart".to_string(),
            CartError::AdminForbidden => "Admin accounts cannot add items to cart".to_string(),
            CartError::InvalidQuantity => "Quantity must be at least 1".to_string(),
            CartError::InsufficientStock { available, .. } if *available == 0 => {
                "This book is out of stock".to_string()
            }
            CartError::InsufficientStock {
                available,
                requested,
            } => format!(
                "Insufficient stock: only {} available, your cart would hold {}",
                available, requested
            ),
            CartError::NotInCart(_) => "That book is not in your cart".to_string(),
            CartError::Storage(_) => "Could not save your cart".to_string(),
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            CartError::LoginRequired => Some(Navigation::Login),
            CartError::AdminForbidden => Some(Navigation::AdminPanel),
            _ => None,
        }
    }
}

/// Locally detected checkout input problems; no request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("delivery address must be at least {min} characters")]
    AddressTooShort { min: usize },
    #[error("phone number must contain at least {min} digits")]
    InvalidPhone { min: usize },
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::AddressTooShort { min } => format!(
                "Please enter a valid Eziobodo or Umuchima delivery address (at least {} characters)",
                min
            ),
            ValidationError::InvalidPhone { .. } => "Please enter a valid phone number".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("login required")]
    LoginRequired,
    #[error("admin accounts cannot place orders")]
    AdminForbidden,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("order creation failed: {0}")]
    Api(#[from] ApiError),
}

impl CheckoutError {
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
            CheckoutError::LoginRequired => "Please login to complete your order.".to_string(),
            CheckoutError::AdminForbidden => {
                "Admin accounts are for operations only and cannot place orders.".to_string()
            }
            CheckoutError::Validation(e) => e.user_message(),
            CheckoutError::Api(e) => e.user_message("Failed to create order"),
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            CheckoutError::EmptyCart => Some(Navigation::Cart),
            CheckoutError::LoginRequired => Some(Navigation::Login),
            CheckoutError::AdminForbidden => Some(Navigation::AdminPanel),
            CheckoutError::Api(e) => e.redirect(),
            CheckoutError::Validation(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("login required")]
    LoginRequired,
    #[error("could not load order: {0}")]
    LoadOrder(#[source] ApiError),
    #[error("could not initiate payment: {0}")]
    Initiate(#[source] ApiError),
    #[error("payment session has no usable redirect url")]
    MissingRedirect,
    #[error("could not check payment status: {0}")]
    Status(#[source] ApiError),
}

impl PaymentError {
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::LoginRequired => "Please login to pay for your order.".to_string(),
            PaymentError::LoadOrder(e) => e.user_message("Failed to load order"),
            PaymentError::Initiate(e) => e.user_message("Failed to initiate payment"),
            PaymentError::MissingRedirect => {
                "Payment URL not available. Please try again.".to_string()
            }
            PaymentError::Status(e) => e.user_message("Failed to check payment status"),
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            PaymentError::LoginRequired => Some(Navigation::Login),
            PaymentError::LoadOrder(e) | PaymentError::Initiate(e) | PaymentError::Status(e) => {
                e.redirect()
            }
            PaymentError::MissingRedirect => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("login required")]
    LoginRequired,
    #[error("could not load orders: {0}")]
    Load(#[source] ApiError),
    #[error("could not cancel order: {0}")]
    Cancel(#[source] ApiError),
}

impl OrderError {
    pub fn user_message(&self) -> String {
        match self {
            OrderError::LoginRequired => "Please login to view your orders.".to_string(),
            OrderError::Load(e) => e.user_message("Failed to load orders"),
            OrderError::Cancel(e) => e.user_message("Failed to cancel order"),
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            OrderError::LoginRequired => Some(Navigation::Login),
            OrderError::Load(e) | OrderError::Cancel(e) => e.redirect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin role required")]
    Forbidden,
    #[error("invalid book form: {0}")]
    InvalidForm(String),
    #[error("could not load admin data: {0}")]
    Load(#[source] ApiError),
    #[error("could not update order status: {0}")]
    UpdateStatus(#[source] ApiError),
    #[error("could not save book: {0}")]
    SaveBook(#[source] ApiError),
    #[error("could not delete book: {0}")]
    DeleteBook(#[source] ApiError),
}

impl AdminError {
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Forbidden => "Admin access required".to_string(),
            AdminError::InvalidForm(message) => message.clone(),
            AdminError::Load(e) => e.user_message("Failed to load admin data"),
            AdminError::UpdateStatus(e) => e.user_message("Failed to update order status"),
            AdminError::SaveBook(e) => e.user_message("Failed to save book"),
            AdminError::DeleteBook(e) => e.user_message("Failed to delete book"),
        }
    }

    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            AdminError::Forbidden => Some(Navigation::Dashboard),
            AdminError::InvalidForm(_) => None,
            AdminError::Load(e)
            | AdminError::UpdateStatus(e)
            | AdminError::SaveBook(e)
            | AdminError::DeleteBook(e) => e.redirect(),
        }
    }
}

/// Failure building the application state at startup
#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build api client: {0}")]
    Api(#[from] ApiError),
    #[error("failed to open storage: {0}")]
    Storage(#[from] StorageError),
}
