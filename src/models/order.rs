use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cart::{Cart, FulfilmentMethod};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub delivery_address: String,
    pub delivery_method: FulfilmentMethod,
    #[serde(deserialize_with = "super::deserialize_amount")]
    pub total_amount: f64,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "bookId")]
    pub book: BookRef,
    pub quantity: u32,
    /// Unit price captured when the order was placed
    #[serde(deserialize_with = "super::deserialize_amount")]
    pub price: f64,
}

/// Order lines reference a book either by id or as a populated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookRef {
    Id(String),
    Summary(BookSummary),
}

impl BookRef {
    pub fn id(&self) -> &str {
        match self {
            BookRef::Id(id) => id,
            BookRef::Summary(summary) => &summary.id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            BookRef::Id(_) => None,
            BookRef::Summary(summary) => summary.title.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentRef {
    Id(String),
    Summary(StudentSummary),
}

impl StudentRef {
    pub fn id(&self) -> &str {
        match self {
            StudentRef::Id(id) => id,
            StudentRef::Summary(summary) => &summary.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reg_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Purchased,
    Delivering,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Processing,
        OrderStatus::Purchased,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Purchased => "purchased",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown order status '{}' (expected processing, purchased, delivering or delivered)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("pending"),
            PaymentStatus::Paid => f.write_str("paid"),
            PaymentStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Body of POST /orders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub delivery_address: String,
    pub delivery_method: FulfilmentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub book_id: String,
    pub quantity: u32,
}

impl NewOrder {
    pub fn from_cart(cart: &Cart, delivery_address: String, method: FulfilmentMethod) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| NewOrderItem {
                    book_id: item.book.id.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            delivery_address,
            delivery_method: method,
        }
    }
}

/// Response of POST /payments/initiate-cashier
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    #[serde(default)]
    pub cashier_url: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Response of GET /payments/status/:reference
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusReport {
    #[serde(default)]
    pub reference: Option<String>,
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parses_populated_and_bare_references() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": "o1",
            "items": [
                { "book": { "_id": "b1", "title": "Calculus" }, "quantity": 2, "price": "1000" },
                { "bookId": "b2", "quantity": 1, "price": 500 }
            ],
            "deliveryAddress": "SUG Building - Pickup Station",
            "deliveryMethod": "pickup",
            "totalAmount": 2500,
            "orderStatus": "processing",
            "paymentStatus": "pending",
            "student": "u1",
            "createdAt": "2025-02-01T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].book.id(), "b1");
        assert_eq!(order.items[0].book.title(), Some("Calculus"));
        assert_eq!(order.items[1].book.id(), "b2");
        assert_eq!(order.student.as_ref().map(StudentRef::id), Some("u1"));
        assert!(!order.is_paid());
        assert!(order.created_at_utc().is_some());
    }

    #[test]
    fn test_new_order_wire_format() {
        let order = NewOrder {
            items: vec![NewOrderItem {
                book_id: "b1".to_string(),
                quantity: 2,
            }],
            delivery_address: "Phone: 08012345678\nSUG Building - Pickup Station".to_string(),
            delivery_method: FulfilmentMethod::Pickup,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["items"][0]["bookId"], "b1");
        assert_eq!(json["deliveryMethod"], "pickup");
        assert!(json["deliveryAddress"].as_str().unwrap().starts_with("Phone: "));
    }

    #[test]
    fn test_order_status_from_str() {
        assert_eq!("Delivering".parse::<OrderStatus>(), Ok(OrderStatus::Delivering));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
