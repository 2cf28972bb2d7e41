//! Static instrument table.
//!
//! Declaration order is load-bearing: snapshots list instruments in
//! this order, which keeps risk factors and pair descriptions
//! deterministic for a given input.

use common::{InstrumentId, ValueUnit};

/// One catalog row: stable id, feed symbol, display name, render unit.
#[derive(Debug, Clone, Copy)]
pub struct InstrumentSpec {
    pub id: InstrumentId,
    pub symbol: &'static str,
    pub name: &'static str,
    pub unit: ValueUnit,
}

/// Every tracked instrument, in snapshot order.
pub const CATALOG: &[InstrumentSpec] = &[
    InstrumentSpec {
        id: InstrumentId::Gold,
        symbol: "GC=F",
        name: "Gold",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::Silver,
        symbol: "SI=F",
        name: "Silver",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::Copper,
        symbol: "HG=F",
        name: "Copper",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::Dxy,
        symbol: "DX-Y.NYB",
        name: "Dollar Index",
        unit: ValueUnit::Points,
    },
    InstrumentSpec {
        id: InstrumentId::Us10y,
        symbol: "^TNX",
        name: "US 10Y Treasury",
        unit: ValueUnit::Percentage,
    },
    InstrumentSpec {
        id: InstrumentId::Btc,
        symbol: "BTC-USD",
        name: "Bitcoin",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::KrwJpy,
        symbol: "KRWJPY=X",
        name: "KRW/JPY",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::KrwUsd,
        symbol: "KRW=X",
        name: "USD/KRW",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::UsdJpy,
        symbol: "JPY=X",
        name: "USD/JPY",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::Spx,
        symbol: "^GSPC",
        name: "S&P 500",
        unit: ValueUnit::Points,
    },
    InstrumentSpec {
        id: InstrumentId::Ndx,
        symbol: "^NDX",
        name: "Nasdaq 100",
        unit: ValueUnit::Currency,
    },
    InstrumentSpec {
        id: InstrumentId::Vix,
        symbol: "^VIX",
        name: "VIX",
        unit: ValueUnit::Points,
    },
];

/// Look up one catalog row by id.
pub fn instrument_spec(id: InstrumentId) -> Option<&'static InstrumentSpec> {
    CATALOG.iter().find(|spec| spec.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unit(id: InstrumentId) -> ValueUnit {
        instrument_spec(id).unwrap().unit
    }

    #[test]
    fn test_catalog_order_is_stable() {
        assert_eq!(CATALOG.len(), 12);
        assert_eq!(CATALOG[0].id, InstrumentId::Gold);
        assert_eq!(CATALOG[11].id, InstrumentId::Vix);
    }

    #[test]
    fn test_ids_and_symbols_are_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|s| s.id).collect();
        let symbols: HashSet<_> = CATALOG.iter().map(|s| s.symbol).collect();
        assert_eq!(ids.len(), CATALOG.len());
        assert_eq!(symbols.len(), CATALOG.len());
    }

    #[test]
    fn test_lookup_by_id() {
        let spx = instrument_spec(InstrumentId::Spx).unwrap();
        assert_eq!(spx.symbol, "^GSPC");
        assert_eq!(spx.name, "S&P 500");
    }

    #[test]
    fn test_unit_classification() {
        assert_eq!(unit(InstrumentId::Us10y), ValueUnit::Percentage);
        assert_eq!(unit(InstrumentId::Dxy), ValueUnit::Points);
        assert_eq!(unit(InstrumentId::Vix), ValueUnit::Points);
        assert_eq!(unit(InstrumentId::Gold), ValueUnit::Currency);
        // Nasdaq renders as currency in this table, unlike the other indices.
        assert_eq!(unit(InstrumentId::Ndx), ValueUnit::Currency);
    }
}
