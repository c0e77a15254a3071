//! Server configuration
//!
//! Loaded from environment variables with defaults for everything.
//! Unparseable values fall back to the default.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::broadcast::{DEFAULT_SUBSCRIBER_BUFFER, MAX_HEARTBEAT_SECS};
use crate::selector::{SelectionPolicy, NEAR_WINDOW_MINUTES, RECENCY_WINDOW_HOURS};

/// Longest accepted recency window (one year)
pub const MAX_RECENCY_WINDOW_HOURS: i64 = 24 * 366;

/// Longest accepted near-appointment window (one day)
pub const MAX_NEAR_WINDOW_MINUTES: i64 = 24 * 60;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub broadcast: BroadcastConfig,
    pub selection: SelectionConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (`QUEUE_HOST`)
    pub host: String,
    /// Port to bind to (`QUEUE_PORT`)
    pub port: u16,
}

/// Ticket store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON Lines file for tickets (`QUEUE_DATA_FILE`); `None` keeps them in memory
    pub data_file: Option<PathBuf>,
}

/// Live update settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Events buffered per subscriber before it is dropped (`QUEUE_SUBSCRIBER_BUFFER`)
    pub subscriber_buffer: usize,
    /// Seconds between refresh pings, 0 disables (`QUEUE_HEARTBEAT_SECS`)
    pub heartbeat_secs: u64,
}

/// Selection windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// `QUEUE_RECENCY_WINDOW_HOURS`
    pub recency_window_hours: i64,
    /// `QUEUE_NEAR_WINDOW_MINUTES`
    pub near_window_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            store: StoreConfig { data_file: None },
            broadcast: BroadcastConfig {
                subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
                heartbeat_secs: 30,
            },
            selection: SelectionConfig {
                recency_window_hours: RECENCY_WINDOW_HOURS,
                near_window_minutes: NEAR_WINDOW_MINUTES,
            },
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            server: ServerConfig {
                host: lookup("QUEUE_HOST")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(defaults.server.host),
                port: parse_var(&lookup, "QUEUE_PORT").unwrap_or(defaults.server.port),
            },
            store: StoreConfig {
                data_file: lookup("QUEUE_DATA_FILE")
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
            },
            broadcast: BroadcastConfig {
                subscriber_buffer: parse_var(&lookup, "QUEUE_SUBSCRIBER_BUFFER")
                    .filter(|n: &usize| *n > 0)
                    .unwrap_or(defaults.broadcast.subscriber_buffer),
                heartbeat_secs: parse_var(&lookup, "QUEUE_HEARTBEAT_SECS")
                    .filter(|s: &u64| *s <= MAX_HEARTBEAT_SECS)
                    .unwrap_or(defaults.broadcast.heartbeat_secs),
            },
            selection: SelectionConfig {
                recency_window_hours: parse_var(&lookup, "QUEUE_RECENCY_WINDOW_HOURS")
                    .filter(|h: &i64| (1..=MAX_RECENCY_WINDOW_HOURS).contains(h))
                    .unwrap_or(defaults.selection.recency_window_hours),
                near_window_minutes: parse_var(&lookup, "QUEUE_NEAR_WINDOW_MINUTES")
                    .filter(|m: &i64| (0..=MAX_NEAR_WINDOW_MINUTES).contains(m))
                    .unwrap_or(defaults.selection.near_window_minutes),
            },
        }
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Selection policy built from the configured windows
    ///
    /// A window chrono cannot represent falls back to its default.
    pub fn selection_policy(&self) -> SelectionPolicy {
        let defaults = SelectionPolicy::default();
        SelectionPolicy::new(
            chrono::Duration::try_hours(self.selection.recency_window_hours)
                .unwrap_or(defaults.recency_window),
            chrono::Duration::try_minutes(self.selection.near_window_minutes)
                .unwrap_or(defaults.near_window),
        )
    }

    /// Heartbeat period, if enabled
    pub fn heartbeat_period(&self) -> Option<Duration> {
        match self.broadcast.heartbeat_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs.min(MAX_HEARTBEAT_SECS))),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}
