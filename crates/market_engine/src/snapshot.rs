//! Single-slot TTL cache over the price feed.
//!
//! One `MarketSnapshot` at a time: served while younger than the TTL,
//! rebuilt from the full catalog otherwise. Failures are contained per
//! instrument; a bad symbol becomes an errored reading, never a failed
//! batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::config::CacheConfig;
use common::{format_value, Error, InstrumentId, InstrumentSnapshot, InstrumentStatus, QuoteFeed};

use crate::catalog::{InstrumentSpec, CATALOG};
use crate::clock::{Clock, SystemClock};

/// One refreshed batch of instrument readings, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub instruments: Vec<InstrumentSnapshot>,
    /// Monotonic refresh time used for TTL checks.
    #[serde(skip)]
    pub fetched_at: Instant,
    /// Wall-clock refresh time for report output.
    pub fetched_at_utc: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn get(&self, id: InstrumentId) -> Option<&InstrumentSnapshot> {
        self.instruments.iter().find(|reading| reading.id == id)
    }

    /// Count of (usable, errored) readings.
    pub fn health(&self) -> (usize, usize) {
        let ok = self.instruments.iter().filter(|r| r.is_ok()).count();
        (ok, self.instruments.len() - ok)
    }
}

/// Time-bounded single-slot cache around the feed.
///
/// Concurrent callers racing past an expired TTL may each trigger a
/// refetch (no single-flight de-duplication): the lock is released
/// during the fetch so readers are never blocked behind network I/O,
/// and the last writer wins. Accepted limitation.
pub struct SnapshotCache<F> {
    feed: F,
    ttl: Duration,
    lookback_days: u32,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<Arc<MarketSnapshot>>>,
}

impl<F: QuoteFeed> SnapshotCache<F> {
    pub fn new(feed: F, cfg: &CacheConfig) -> Self {
        Self::with_clock(feed, cfg, Arc::new(SystemClock))
    }

    /// Build with an explicit clock; tests drive TTL expiry through it.
    pub fn with_clock(feed: F, cfg: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            feed,
            ttl: Duration::from_secs(cfg.ttl_secs),
            lookback_days: cfg.lookback_days,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Serve the cached snapshot, refetching the whole catalog if the
    /// slot is empty or older than the TTL.
    pub async fn get_snapshot(&self) -> Arc<MarketSnapshot> {
        {
            let slot = self.slot.lock().await;
            if let Some(snapshot) = slot.as_ref() {
                let age = self.clock.now().saturating_duration_since(snapshot.fetched_at);
                if age < self.ttl {
                    debug!("Snapshot cache hit (age {:?})", age);
                    return Arc::clone(snapshot);
                }
            }
        }

        let fresh = Arc::new(self.refresh().await);

        let mut slot = self.slot.lock().await;
        *slot = Some(Arc::clone(&fresh));
        fresh
    }

    /// Clear the slot; the next `get_snapshot` call refetches.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
        info!("Snapshot cache invalidated");
    }

    async fn refresh(&self) -> MarketSnapshot {
        info!("Refreshing snapshot ({} instruments)...", CATALOG.len());

        let mut instruments = Vec::with_capacity(CATALOG.len());
        for spec in CATALOG {
            instruments.push(self.fetch_instrument(spec).await);
        }

        let snapshot = MarketSnapshot {
            instruments,
            fetched_at: self.clock.now(),
            fetched_at_utc: Utc::now(),
        };

        let (ok, errored) = snapshot.health();
        info!("Snapshot refreshed: {} ok, {} errored", ok, errored);
        snapshot
    }

    async fn fetch_instrument(&self, spec: &InstrumentSpec) -> InstrumentSnapshot {
        match self.try_fetch(spec).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Failed to fetch {}: {}", spec.symbol, e);
                error_reading(spec)
            }
        }
    }

    async fn try_fetch(&self, spec: &InstrumentSpec) -> Result<InstrumentSnapshot, Error> {
        let closes = self.feed.recent_closes(spec.symbol, self.lookback_days).await?;
        if closes.is_empty() {
            return Err(Error::EmptyHistory(spec.symbol.to_string()));
        }
        if closes.len() == 1 {
            debug!("{}: single close, zero-change reading", spec.symbol);
        }
        Ok(reading_from_closes(spec, &closes))
    }
}

/// Build a reading from the most recent closes (newest last). A single
/// close degrades to a zero-change reading rather than an error.
fn reading_from_closes(spec: &InstrumentSpec, closes: &[f64]) -> InstrumentSnapshot {
    let current = closes[closes.len() - 1];
    let previous = if closes.len() >= 2 {
        closes[closes.len() - 2]
    } else {
        current
    };

    let change_pct = if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    InstrumentSnapshot {
        id: spec.id,
        name: spec.name.to_string(),
        external_ref: spec.symbol.to_string(),
        current_value: current,
        previous_value: previous,
        change_pct,
        unit: spec.unit,
        status: InstrumentStatus::classify(change_pct),
        formatted_value: format_value(current, spec.unit),
    }
}

fn error_reading(spec: &InstrumentSpec) -> InstrumentSnapshot {
    InstrumentSnapshot {
        id: spec.id,
        name: spec.name.to_string(),
        external_ref: spec.symbol.to_string(),
        current_value: 0.0,
        previous_value: 0.0,
        change_pct: 0.0,
        unit: spec.unit,
        status: InstrumentStatus::Error,
        formatted_value: "N/A".to_string(),
    }
}

/// Non-error readings whose absolute change meets the threshold,
/// largest move first.
pub fn significant_movers(
    instruments: &[InstrumentSnapshot],
    min_abs_change_pct: f64,
) -> Vec<&InstrumentSnapshot> {
    let mut movers: Vec<&InstrumentSnapshot> = instruments
        .iter()
        .filter(|r| r.is_ok() && r.change_pct.abs() >= min_abs_change_pct)
        .collect();
    movers.sort_by(|a, b| b.change_pct.abs().total_cmp(&a.change_pct.abs()));
    movers
}
