pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use infrastructure::AppState;
pub use infrastructure::config;
