//! Domain layer - Pure client abstractions
//!
//! Trait seams (durable slots, the storefront API, the credential source),
//! error types and navigation targets. Implementations live in the
//! infrastructure layer.

pub mod errors;
pub mod navigation;
pub mod repositories;

pub use errors::*;
pub use navigation::Navigation;
pub use repositories::*;
