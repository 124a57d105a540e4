//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Payment service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `8081`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `API_SECRET_KEY` — shared secret for callback signatures
/// - `ORDER_SERVICE_URL` — base URL of the order service (default: `http://localhost:8080`)
/// - `GATEWAY_APPROVAL_RATE` — share of charges the placeholder gateway approves (default: 0.8)
/// - `GATEWAY_TIMEOUT_SECS` — bound on a gateway resolution call (default: 10)
/// - `NOTIFY_TIMEOUT_SECS` — bound on a callback delivery (default: 5)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub secret_key: String,
    pub order_service_url: String,
    pub gateway_approval_rate: f64,
    pub gateway_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            secret_key: std::env::var("API_SECRET_KEY")
                .unwrap_or_else(|_| "dev-secret".to_string()),
            order_service_url: std::env::var("ORDER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            gateway_approval_rate: std::env::var("GATEWAY_APPROVAL_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.8),
            gateway_timeout: Duration::from_secs(
                std::env::var("GATEWAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            notify_timeout: Duration::from_secs(
                std::env::var("NOTIFY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
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
            port: 8081,
            log_level: "info".to_string(),
            secret_key: "dev-secret".to_string(),
            order_service_url: "http://localhost:8080".to_string(),
            gateway_approval_rate: 0.8,
            gateway_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(5),
        }
    }
}
