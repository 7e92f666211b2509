//! Services Layer
//!
//! Client-side business logic. Services take the API, session and cart
//! explicitly; nothing here is global.

pub mod admin_service;
pub mod auth_service;
pub mod cart_events;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
mod in_flight;
pub mod order_service;
pub mod payment_service;
pub mod session;

// Re-export for convenience
pub use cart_events::{CartEvent, CartNotifier, CartWatcher, spawn_badge};
pub use cart_service::CartStore;
pub use catalog_service::BookFilter;
pub use checkout_service::{
    CheckoutFlow, CheckoutForm, CheckoutOutcome, CheckoutSettings, CheckoutState,
};
pub use payment_service::{PaymentHandoff, PaymentRedirect, PaymentView};
pub use session::{SessionContext, SessionEvent};
