//! Bot configuration types.

use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Snapshot cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Price-feed HTTP client parameters.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Watch-mode reporting parameters.
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Snapshot cache parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Max age for a cached snapshot before a refetch (seconds).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// History window requested from the feed, in days. Two days is
    /// enough for a current close plus the prior close.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

/// Price-feed HTTP client parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Chart API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Watch-mode reporting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Report interval in watch mode (seconds).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Minimum |change_pct| for an instrument to count as a mover.
    #[serde(default = "default_movers_threshold")]
    pub movers_threshold_pct: f64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_ttl_secs() -> u64 {
    60
}
fn default_lookback_days() -> u32 {
    2
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}

fn default_interval_secs() -> u64 {
    300
}
fn default_movers_threshold() -> f64 {
    2.0
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            movers_threshold_pct: default_movers_threshold(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            feed: FeedConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}
