//! Fixed-pair trading signals.
//!
//! Four hard-wired pairs, each graded by walking an ordered ladder of
//! rungs top-down: the first rung whose trigger fires decides the
//! grade and band label, otherwise the pair is neutral. A pair whose
//! required instruments are missing or errored is omitted from the
//! result entirely.

use std::collections::BTreeMap;

use tracing::debug;

use common::InstrumentId as Id;
use common::{InstrumentSnapshot, PairGrade, PairKey, PairSignal};

use crate::readings::Readings;

use self::Trigger::{Above, AboveWithMomentum, Below, BelowWithMomentum};

/// Predicate for one rung of a pair ladder.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Above(f64),
    Below(f64),
    /// Past `hard`, or past `soft` with the day's change above `momentum`.
    AboveWithMomentum { hard: f64, soft: f64, momentum: f64 },
    /// Past `hard`, or past `soft` with the day's change below `momentum`.
    BelowWithMomentum { hard: f64, soft: f64, momentum: f64 },
}

impl Trigger {
    fn fires(&self, value: f64, change_pct: f64) -> bool {
        match *self {
            Above(limit) => value > limit,
            Below(limit) => value < limit,
            AboveWithMomentum { hard, soft, momentum } => {
                value > hard || (value > soft && change_pct > momentum)
            }
            BelowWithMomentum { hard, soft, momentum } => {
                value < hard || (value < soft && change_pct < momentum)
            }
        }
    }
}

/// One rung of a ladder.
struct Rung {
    trigger: Trigger,
    grade: PairGrade,
    band: &'static str,
}

const GOLD_SILVER_RUNGS: &[Rung] = &[
    Rung {
        trigger: Above(90.0),
        grade: PairGrade::StrongBuy,
        band: "very high",
    },
    Rung {
        trigger: Above(82.0),
        grade: PairGrade::Buy,
        band: "high",
    },
    Rung {
        trigger: Below(60.0),
        grade: PairGrade::StrongSell,
        band: "very low",
    },
    Rung {
        trigger: Below(68.0),
        grade: PairGrade::Sell,
        band: "low",
    },
];

const VIX_RUNGS: &[Rung] = &[
    Rung {
        trigger: AboveWithMomentum {
            hard: 35.0,
            soft: 30.0,
            momentum: 10.0,
        },
        grade: PairGrade::StrongBuyStocks,
        band: "extreme fear",
    },
    Rung {
        trigger: AboveWithMomentum {
            hard: 25.0,
            soft: 22.0,
            momentum: 5.0,
        },
        grade: PairGrade::BuyStocks,
        band: "high fear",
    },
    Rung {
        trigger: Below(12.0),
        grade: PairGrade::StrongSellStocks,
        band: "extreme complacency",
    },
    Rung {
        trigger: Below(15.0),
        grade: PairGrade::SellStocks,
        band: "low fear",
    },
];

const USD_JPY_RUNGS: &[Rung] = &[
    Rung {
        trigger: AboveWithMomentum {
            hard: 160.0,
            soft: 155.0,
            momentum: 2.0,
        },
        grade: PairGrade::StrongBuyJpy,
        band: "extreme yen weakness",
    },
    Rung {
        trigger: AboveWithMomentum {
            hard: 152.0,
            soft: 148.0,
            momentum: 1.0,
        },
        grade: PairGrade::BuyJpy,
        band: "stretched yen weakness",
    },
    Rung {
        trigger: BelowWithMomentum {
            hard: 135.0,
            soft: 140.0,
            momentum: -2.0,
        },
        grade: PairGrade::StrongSellJpy,
        band: "extreme yen strength",
    },
    Rung {
        trigger: BelowWithMomentum {
            hard: 142.0,
            soft: 145.0,
            momentum: -1.0,
        },
        grade: PairGrade::SellJpy,
        band: "stretched yen strength",
    },
];

const SPX_NDX_RUNGS: &[Rung] = &[
    Rung {
        trigger: Above(3.0),
        grade: PairGrade::StrongBuySpx,
        band: "tech far ahead",
    },
    Rung {
        trigger: Above(1.5),
        grade: PairGrade::BuySpx,
        band: "tech ahead",
    },
    Rung {
        trigger: Below(-3.0),
        grade: PairGrade::StrongBuyNdx,
        band: "tech far behind",
    },
    Rung {
        trigger: Below(-1.5),
        grade: PairGrade::BuyNdx,
        band: "tech behind",
    },
];

/// Walk a ladder top-down; first firing rung wins.
fn classify(
    rungs: &'static [Rung],
    value: f64,
    change_pct: f64,
    neutral_band: &'static str,
) -> (PairGrade, &'static str) {
    for rung in rungs {
        if rung.trigger.fires(value, change_pct) {
            return (rung.grade, rung.band);
        }
    }
    (PairGrade::Neutral, neutral_band)
}

fn gold_silver(readings: &Readings<'_>) -> Option<PairSignal> {
    let gold = readings.get(Id::Gold)?;
    let silver = readings.get(Id::Silver)?;
    if silver.current_value <= 0.0 {
        // Non-positive denominator, treat the pair as unreadable.
        return None;
    }

    let ratio = gold.current_value / silver.current_value;
    let (grade, band) = classify(GOLD_SILVER_RUNGS, ratio, 0.0, "normal band 68-82");
    Some(PairSignal {
        name: "Gold/Silver Ratio".to_string(),
        metric: ratio,
        grade,
        description: format!("gold/silver ratio {:.1} ({})", ratio, band),
    })
}

fn vix_rotation(readings: &Readings<'_>) -> Option<PairSignal> {
    let vix = readings.get(Id::Vix)?;

    let (grade, band) = classify(
        VIX_RUNGS,
        vix.current_value,
        vix.change_pct,
        "normal band 15-25",
    );
    Some(PairSignal {
        name: "VIX Bonds/Stocks Rotation".to_string(),
        metric: vix.current_value,
        grade,
        description: format!("VIX {:.1} ({})", vix.current_value, band),
    })
}

fn usd_jpy_carry(readings: &Readings<'_>) -> Option<PairSignal> {
    let fx = readings.get(Id::UsdJpy)?;

    let (grade, band) = classify(
        USD_JPY_RUNGS,
        fx.current_value,
        fx.change_pct,
        "normal band 142-152",
    );
    Some(PairSignal {
        name: "USD/JPY Carry".to_string(),
        metric: fx.current_value,
        grade,
        description: format!("USD/JPY {:.2} ({})", fx.current_value, band),
    })
}

fn spx_ndx_relative(readings: &Readings<'_>) -> Option<PairSignal> {
    let spx = readings.get(Id::Spx)?;
    let ndx = readings.get(Id::Ndx)?;

    let gap = ndx.change_pct - spx.change_pct;
    let (grade, band) = classify(SPX_NDX_RUNGS, gap, 0.0, "balanced");
    Some(PairSignal {
        name: "S&P/Nasdaq Relative".to_string(),
        metric: gap,
        grade,
        description: format!("performance gap {:+.2}%p ({})", gap, band),
    })
}

/// Evaluate all four pairs over a snapshot's readings.
pub fn compute_pair_signals(instruments: &[InstrumentSnapshot]) -> BTreeMap<PairKey, PairSignal> {
    let readings = Readings::index(instruments);

    let mut signals = BTreeMap::new();
    if let Some(signal) = gold_silver(&readings) {
        signals.insert(PairKey::GoldSilver, signal);
    }
    if let Some(signal) = vix_rotation(&readings) {
        signals.insert(PairKey::VixBondsStocks, signal);
    }
    if let Some(signal) = usd_jpy_carry(&readings) {
        signals.insert(PairKey::UsdJpy, signal);
    }
    if let Some(signal) = spx_ndx_relative(&readings) {
        signals.insert(PairKey::SpxNdx, signal);
    }

    debug!("Pair evaluation: {} of 4 pairs classified", signals.len());
    signals
}
