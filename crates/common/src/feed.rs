//! Price-feed port.
//!
//! The snapshot cache talks to the outside world only through this
//! trait, so the production HTTP client and in-test stubs are
//! interchangeable.

use async_trait::async_trait;

use crate::Error;

/// A provider of recent daily closing values per external symbol.
#[async_trait]
pub trait QuoteFeed: Send + Sync {
    /// Fetch up to `lookback_days` daily closes for `symbol`, ordered
    /// oldest → newest.
    ///
    /// An empty vector ("no data") and a single element ("one close so
    /// far") are valid non-error results; callers decide how to degrade.
    async fn recent_closes(&self, symbol: &str, lookback_days: u32) -> Result<Vec<f64>, Error>;
}
