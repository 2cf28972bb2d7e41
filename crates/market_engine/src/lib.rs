//! Market-pulse engine crate.
//!
//! Aggregates instrument readings behind a TTL cache and derives two
//! independent products: a weighted risk assessment and four
//! pair-trading signals.

pub mod catalog;
pub mod clock;
pub mod pairs;
mod readings;
pub mod risk;
pub mod snapshot;

pub use catalog::{instrument_spec, InstrumentSpec, CATALOG};
pub use clock::{Clock, SystemClock};
pub use pairs::compute_pair_signals;
pub use risk::compute_risk;
pub use snapshot::{significant_movers, MarketSnapshot, SnapshotCache};
