//! Hub configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::HubError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`HubConfig::from_env`].
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Capacity of each hub coordination channel (register, unregister,
    /// broadcast, query).
    pub hub_channel_capacity: usize,

    /// Capacity of every client's outbound queue. Frames beyond this are
    /// dropped for that client.
    pub client_queue_capacity: usize,

    /// Seconds between server pings on each WebSocket (0 disables).
    pub ping_interval_secs: u64,

    /// Maximum accepted size of one inbound WebSocket message.
    pub max_message_bytes: usize,

    /// How long a connection waits for its writer to flush after unregister.
    pub close_grace_ms: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            hub_channel_capacity: 1024,
            client_queue_capacity: 256,
            ping_interval_secs: 30,
            max_message_bytes: 1024 * 1024,
            close_grace_ms: 1000,
            log_format: LogFormat::Text,
        }
    }
}

impl HubConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or a numeric value
    /// does not parse. Calls `dotenvy::dotenv().ok()` to optionally load a
    /// `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Config`] if `LISTEN_ADDR` is set but cannot be
    /// parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, HubError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| HubError::Config(format!("LISTEN_ADDR={raw}: {e}")))?,
            Err(_) => defaults.listen_addr,
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            hub_channel_capacity: parse_env("HUB_CHANNEL_CAPACITY", defaults.hub_channel_capacity)
                .max(1),
            client_queue_capacity: parse_env(
                "CLIENT_QUEUE_CAPACITY",
                defaults.client_queue_capacity,
            )
            .max(1),
            ping_interval_secs: parse_env("WS_PING_INTERVAL_SECS", defaults.ping_interval_secs),
            max_message_bytes: parse_env("WS_MAX_MESSAGE_BYTES", defaults.max_message_bytes),
            close_grace_ms: parse_env("WS_CLOSE_GRACE_MS", defaults.close_grace_ms),
            log_format,
        })
    }

    /// Ping interval, or `None` when pings are disabled.
    #[must_use]
    pub const fn ping_interval(&self) -> Option<Duration> {
        if self.ping_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.ping_interval_secs))
        }
    }

    /// Writer flush grace period.
    #[must_use]
    pub const fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
