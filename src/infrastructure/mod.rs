//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Configuration loading (config)
//! - Durable slot storage (storage)
//! - HTTP client for the storefront API (api_client)
//! - Application state (state)

pub mod api_client;
pub mod config;
pub mod state;
pub mod storage;

pub use api_client::HttpStorefrontApi;
pub use state::AppState;
pub use storage::{FileStore, MemoryStore};
