//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Order service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8080`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `API_SECRET_KEY` — shared secret for callback signatures
/// - `SWEEP_INTERVAL_SECS` — delivery sweep cadence (default: 30)
/// - `DELIVERY_DWELL_SECS` — dwell before a confirmed order is delivered (default: 60)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub secret_key: String,
    pub sweep_interval: Duration,
    pub delivery_dwell: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            secret_key: std::env::var("API_SECRET_KEY")
                .unwrap_or_else(|_| "dev-secret".to_string()),
            sweep_interval: Duration::from_secs(
                std::env::var("SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            delivery_dwell: Duration::from_secs(
                std::env::var("DELIVERY_DWELL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            secret_key: "dev-secret".to_string(),
            sweep_interval: Duration::from_secs(30),
            delivery_dwell: Duration::from_secs(60),
        }
    }
}
