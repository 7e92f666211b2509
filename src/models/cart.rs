use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::book::Book;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub book: Book,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.book.price * f64::from(self.quantity)
    }
}

/// Ordered cart, at most one entry per book id and never a zero quantity.
///
/// Persisted as a bare JSON array of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from untrusted persisted entries.
    ///
    /// Entries that do not parse or carry a zero quantity are dropped; repeated
    /// book ids are folded into the first occurrence, never past its stock
    /// snapshot. Returns the cart and the
    /// number of entries that were discarded.
    pub fn from_entries(entries: Vec<serde_json::Value>) -> (Self, usize) {
        let mut cart = Cart::new();
        let mut discarded = 0;

        for entry in entries {
            match serde_json::from_value::<CartItem>(entry) {
                Ok(item) if item.quantity > 0 => {
                    if let Some(existing) = cart.find_mut(&item.book.id) {
                        let cap = existing.book.stock.max(existing.quantity);
                        existing.quantity =
                            existing.quantity.saturating_add(item.quantity).min(cap);
                    } else {
                        cart.items.push(item);
                    }
                }
                _ => discarded += 1,
            }
        }

        (cart, discarded)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Badge count: total quantity across all entries.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn find(&self, book_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.book.id == book_id)
    }

    fn find_mut(&mut self, book_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.book.id == book_id)
    }

    /// Add `quantity` of `book`, summing with an existing entry.
    /// The stored snapshot is refreshed with the given book.
    pub(crate) fn merge(&mut self, book: &Book, quantity: u32) -> &CartItem {
        let index = match self.items.iter().position(|item| item.book.id == book.id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.saturating_add(quantity);
                item.book = book.clone();
                index
            }
            None => {
                self.items.push(CartItem {
                    book: book.clone(),
                    quantity,
                });
                self.items.len() - 1
            }
        };
        &self.items[index]
    }

    /// Returns false when the book is not in the cart. Zero removes the entry.
    pub(crate) fn set_quantity(&mut self, book_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(book_id);
        }
        match self.find_mut(book_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, book_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.book.id != book_id);
        self.items.len() != before
    }

    pub fn items_total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfilmentMethod {
    #[default]
    Pickup,
    Delivery,
}

impl fmt::Display for FulfilmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfilmentMethod::Pickup => f.write_str("pickup"),
            FulfilmentMethod::Delivery => f.write_str("delivery"),
        }
    }
}

impl FromStr for FulfilmentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pickup" => Ok(FulfilmentMethod::Pickup),
            "delivery" => Ok(FulfilmentMethod::Delivery),
            other => Err(format!(
                "unknown fulfilment method '{}' (expected pickup or delivery)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub items_total: f64,
    pub delivery_fee: f64,
    pub grand_total: f64,
}

impl Totals {
    pub fn compute(cart: &Cart, method: FulfilmentMethod, delivery_fee: f64) -> Self {
        let items_total = cart.items_total();
        let delivery_fee = match method {
            FulfilmentMethod::Delivery => delivery_fee,
            FulfilmentMethod::Pickup => 0.0,
        };

        Self {
            items_total,
            delivery_fee,
            grand_total: items_total + delivery_fee,
        }
    }
}
