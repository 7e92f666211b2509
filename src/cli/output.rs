//! Terminal rendering and failure reporting

use bookmate::domain::{
    AdminError, ApiError, AuthError, CartError, CheckoutError, Navigation, OrderError,
    PaymentError, StorageError,
};
use bookmate::models::{Book, Cart, Order, Totals};

/// A failed command: what to tell the user and where they should go next
#[derive(Debug)]
pub struct Failure {
    pub message: String,
    pub redirect: Option<Navigation>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            redirect: None,
        }
    }

    pub fn api(error: ApiError, fallback: &str) -> Self {
        tracing::debug!("{}", error);
        Self {
            message: error.user_message(fallback),
            redirect: error.redirect(),
        }
    }
}

macro_rules! failure_from {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for Failure {
                fn from(error: $error) -> Self {
                    tracing::debug!("{}", error);
                    Self {
                        message: error.user_message(),
                        redirect: error.redirect(),
                    }
                }
            }
        )+
    };
}

failure_from!(CartError, CheckoutError, PaymentError, OrderError, AdminError);

impl From<AuthError> for Failure {
    fn from(error: AuthError) -> Self {
        tracing::debug!("{}", error);
        Self::new(error.user_message())
    }
}

impl From<StorageError> for Failure {
    fn from(error: StorageError) -> Self {
        tracing::error!("{}", error);
        Self::new("Could not save your cart")
    }
}

pub fn report(failure: &Failure) {
    eprintln!("error: {}", failure.message);
    if let Some(target) = &failure.redirect {
        eprintln!("  -> {}", target);
    }
}

pub fn navigate(target: &Navigation) {
    println!("-> {}", target);
}

/// `₦1,234.50`
pub fn naira(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}\u{20a6}{}.{:02}", sign, grouped, cents % 100)
}

pub fn book_line(book: &Book) {
    let stock = if book.in_stock() {
        format!("{} in stock", book.stock)
    } else {
        "out of stock".to_string()
    };
    println!(
        "{:<26} {:<40} {:>12}  {:<10} {}",
        book.id,
        truncate(&format!("{} - {}", book.title, book.author), 40),
        naira(book.price),
        book.category.to_string(),
        stock
    );
}

pub fn book_detail(book: &Book) {
    println!("{}", book.title);
    println!("  by {}", book.author);
    println!("  id:       {}", book.id);
    println!("  price:    {}", naira(book.price));
    println!("  category: {}", book.category);
    if let Some(level) = &book.class_form_level {
        println!("  level:    {}", level);
    }
    println!("  stock:    {}", book.stock);
    if let Some(bytes) = book.decode_cover() {
        println!("  cover:    {} bytes", bytes.len());
    }
}

pub fn cart(cart: &Cart, totals: &Totals) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>3} x {:<40} {:>12}",
            item.quantity,
            truncate(&item.book.title, 40),
            naira(item.line_total())
        );
    }
    println!("Items:    {}", naira(totals.items_total));
    println!("Delivery: {}", naira(totals.delivery_fee));
    println!("Total:    {}", naira(totals.grand_total));
}

pub fn order_line(order: &Order) {
    let date = order
        .created_at_utc()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<26} {:<16} {:>12}  {:<10} {:<8} {}",
        order.id,
        date,
        naira(order.total_amount),
        order.order_status.to_string(),
        order.payment_status.to_string(),
        order.delivery_method
    );
}

pub fn order_detail(order: &Order) {
    order_line(order);
    for item in &order.items {
        println!(
            "    {:>3} x {:<40} {:>12}",
            item.quantity,
            truncate(item.book.title().unwrap_or(item.book.id()), 40),
            naira(item.price)
        );
    }
    println!("    {}", order.delivery_address.replace('\n', " / "));
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('\u{2026}');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naira_grouping() {
        assert_eq!(naira(0.0), "\u{20a6}0.00");
        assert_eq!(naira(500.0), "\u{20a6}500.00");
        assert_eq!(naira(2500.0), "\u{20a6}2,500.00");
        assert_eq!(naira(1234567.5), "\u{20a6}1,234,567.50");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 5), "exac\u{2026}");
    }
}
