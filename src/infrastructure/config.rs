use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_PICKUP_STATION: &str = "SUG Building - Pickup Station";
const DEFAULT_DELIVERY_FEE: f64 = 500.0;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_MS: u64 = 500;
const MIN_POLL_MS: u64 = 50;
const MAX_POLL_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub request_timeout: Duration,
    pub delivery_fee: f64,
    pub pickup_station: String,
    /// Backstop poll for cart changes made by other processes
    pub cart_poll_interval: Duration,
    /// Checkout captures a contact phone number and prefixes it to the address
    pub require_phone: bool,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = lookup("PROFILE")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "default".to_string());

        let storage_dir = lookup("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_storage_dir(lookup("HOME"), &profile));

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let delivery_fee = lookup("DELIVERY_FEE")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|fee| fee.is_finite() && *fee >= 0.0)
            .unwrap_or(DEFAULT_DELIVERY_FEE);

        let poll_ms = lookup("CART_POLL_INTERVAL_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_MS)
            .clamp(MIN_POLL_MS, MAX_POLL_MS);

        Self {
            api_base_url,
            storage_dir,
            request_timeout: Duration::from_secs(
                lookup("REQUEST_TIMEOUT_SECS")
                    .and_then(|v| v.trim().parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            delivery_fee,
            pickup_station: lookup("PICKUP_STATION")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PICKUP_STATION.to_string()),
            cart_poll_interval: Duration::from_millis(poll_ms),
            require_phone: lookup("REQUIRE_PHONE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            profile,
        }
    }
}

// On Linux: ~/.local/share/bookmate
fn default_storage_dir(home: Option<String>, profile: &str) -> PathBuf {
    let dir_name = if profile == "default" {
        "bookmate".to_string()
    } else {
        format!("bookmate_{}", profile)
    };

    match home {
        Some(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(dir_name),
        None => PathBuf::from(format!(".{}", dir_name)),
    }
}
