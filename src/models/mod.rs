pub mod book;
pub mod cart;
pub mod order;
pub mod user;

pub use book::{Book, BookCategory, BookForm, CoverUpload};
pub use cart::{Cart, CartItem, FulfilmentMethod, Totals};
pub use order::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, PaymentSession, PaymentStatus,
    PaymentStatusReport,
};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, Role, User};

use serde::{Deserialize, Deserializer};

/// The API serializes decimal columns either as JSON numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Amount::deserialize(deserializer)? {
        Amount::Number(value) => Ok(value),
        Amount::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid amount {text:?}: {e}"))),
    }
}
