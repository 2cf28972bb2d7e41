//! Weighted risk rule bank.
//!
//! An ordered table of independent rules, each a ladder of tiers
//! checked most-severe-first: the first matching tier fires, adds its
//! weight to the score, and appends one factor line. Rules whose
//! instruments are missing or errored are skipped. Several rules
//! deliberately reuse the same instrument (the dollar index feeds four
//! of them), so one move can count more than once.

use tracing::debug;

use common::InstrumentId as Id;
use common::{InstrumentSnapshot, RiskAssessment, RiskLevel};

use crate::readings::Readings;

use self::Cmp::{Above, Below};
use self::Metric::{AbsSwing, ChangePct, Divergence, Level};

/// Measured quantity a condition inspects.
#[derive(Debug, Clone, Copy)]
enum Metric {
    /// Day-over-day percent change of one instrument.
    ChangePct(Id),
    /// Current value of one instrument.
    Level(Id),
    /// Absolute move since the prior close, in native units.
    AbsSwing(Id),
    /// Absolute gap between two instruments' percent changes.
    Divergence(Id, Id),
}

impl Metric {
    fn value(&self, readings: &Readings<'_>) -> Option<f64> {
        match *self {
            ChangePct(id) => readings.get(id).map(|r| r.change_pct),
            Level(id) => readings.get(id).map(|r| r.current_value),
            AbsSwing(id) => readings.get(id).map(|r| (r.current_value - r.previous_value).abs()),
            Divergence(a, b) => match (readings.get(a), readings.get(b)) {
                (Some(ra), Some(rb)) => Some((ra.change_pct - rb.change_pct).abs()),
                _ => None,
            },
        }
    }

    fn render(&self, value: f64) -> String {
        match self {
            ChangePct(_) => format!("{:+.2}%", value),
            Level(_) => format!("{:.1}", value),
            AbsSwing(_) => format!("{:.2}p", value),
            Divergence(..) => format!("{:.2}%p", value),
        }
    }
}

/// Strict threshold comparison.
#[derive(Debug, Clone, Copy)]
enum Cmp {
    Above(f64),
    Below(f64),
}

impl Cmp {
    fn holds(&self, value: f64) -> bool {
        match *self {
            Above(limit) => value > limit,
            Below(limit) => value < limit,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Condition {
    metric: Metric,
    cmp: Cmp,
}

const fn cond(metric: Metric, cmp: Cmp) -> Condition {
    Condition { metric, cmp }
}

/// One rung of a rule's ladder. All conditions must hold.
struct Tier {
    conditions: &'static [Condition],
    weight: u32,
    label: &'static str,
}

/// One rule: a guarded, ordered ladder.
struct Rule {
    /// Instruments that must be present and error-free.
    requires: &'static [Id],
    /// Metric echoed into the factor line. Its ids are a subset of
    /// `requires`.
    display: Metric,
    tiers: &'static [Tier],
}

/// The rule bank, in evaluation order. Order is observable through the
/// `factors` list, so entries must not be reordered.
const RULES: &[Rule] = &[
    // Broad-index declines, one rule per benchmark.
    Rule {
        requires: &[Id::Spx],
        display: ChangePct(Id::Spx),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Spx), Below(-3.0))],
                weight: 3,
                label: "S&P 500 plunge",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Spx), Below(-1.5))],
                weight: 2,
                label: "S&P 500 decline",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Spx), Below(-0.5))],
                weight: 1,
                label: "S&P 500 weakness",
            },
        ],
    },
    Rule {
        requires: &[Id::Ndx],
        display: ChangePct(Id::Ndx),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Ndx), Below(-3.0))],
                weight: 3,
                label: "Nasdaq 100 plunge",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Ndx), Below(-1.5))],
                weight: 2,
                label: "Nasdaq 100 decline",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Ndx), Below(-0.5))],
                weight: 1,
                label: "Nasdaq 100 weakness",
            },
        ],
    },
    Rule {
        requires: &[Id::Spx, Id::Ndx],
        display: Divergence(Id::Spx, Id::Ndx),
        tiers: &[
            Tier {
                conditions: &[cond(Divergence(Id::Spx, Id::Ndx), Above(2.0))],
                weight: 2,
                label: "S&P/Nasdaq divergence",
            },
            Tier {
                conditions: &[cond(Divergence(Id::Spx, Id::Ndx), Above(1.0))],
                weight: 1,
                label: "Index divergence widening",
            },
        ],
    },
    Rule {
        requires: &[Id::Vix],
        display: Level(Id::Vix),
        tiers: &[
            Tier {
                conditions: &[cond(Level(Id::Vix), Above(35.0))],
                weight: 3,
                label: "VIX extreme",
            },
            Tier {
                conditions: &[cond(Level(Id::Vix), Above(25.0))],
                weight: 2,
                label: "VIX high",
            },
            Tier {
                conditions: &[cond(Level(Id::Vix), Above(15.0))],
                weight: 1,
                label: "VIX elevated",
            },
        ],
    },
    // Dollar index: change and level score separately, both may fire.
    Rule {
        requires: &[Id::Dxy],
        display: ChangePct(Id::Dxy),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Dxy), Above(1.0))],
                weight: 2,
                label: "Dollar index surge",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Dxy), Above(0.5))],
                weight: 1,
                label: "Dollar index rising",
            },
        ],
    },
    Rule {
        requires: &[Id::Dxy],
        display: Level(Id::Dxy),
        tiers: &[
            Tier {
                conditions: &[cond(Level(Id::Dxy), Above(110.0))],
                weight: 2,
                label: "Dollar very strong",
            },
            Tier {
                conditions: &[cond(Level(Id::Dxy), Above(105.0))],
                weight: 1,
                label: "Dollar strong",
            },
        ],
    },
    // Dollar strength pressing the won; needs the full FX set readable.
    Rule {
        requires: &[Id::Dxy, Id::KrwUsd, Id::UsdJpy, Id::KrwJpy],
        display: ChangePct(Id::KrwJpy),
        tiers: &[
            Tier {
                conditions: &[
                    cond(ChangePct(Id::Dxy), Above(0.5)),
                    cond(ChangePct(Id::KrwJpy), Below(-1.0)),
                ],
                weight: 2,
                label: "Won slide amid dollar strength",
            },
            Tier {
                conditions: &[
                    cond(ChangePct(Id::Dxy), Above(0.3)),
                    cond(ChangePct(Id::KrwJpy), Below(-0.5)),
                ],
                weight: 1,
                label: "Won soft amid dollar strength",
            },
        ],
    },
    Rule {
        requires: &[Id::Dxy, Id::KrwUsd, Id::UsdJpy, Id::KrwJpy],
        display: ChangePct(Id::KrwJpy),
        tiers: &[Tier {
            conditions: &[
                cond(ChangePct(Id::Dxy), Below(-0.5)),
                cond(ChangePct(Id::KrwJpy), Below(-1.0)),
            ],
            weight: 1,
            label: "Won weak despite dollar weakness",
        }],
    },
    Rule {
        requires: &[Id::KrwUsd],
        display: ChangePct(Id::KrwUsd),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::KrwUsd), Above(2.0))],
                weight: 3,
                label: "Won plunge vs dollar",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::KrwUsd), Above(1.0))],
                weight: 2,
                label: "Won drop vs dollar",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::KrwUsd), Above(0.5))],
                weight: 1,
                label: "Won slipping vs dollar",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::KrwUsd), Below(-2.0))],
                weight: 2,
                label: "Won spike vs dollar",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::KrwUsd), Below(-1.0))],
                weight: 1,
                label: "Won strength vs dollar",
            },
        ],
    },
    // Sharp yen appreciation flags carry-trade unwind, hence the
    // heaviest tier on the downside.
    Rule {
        requires: &[Id::UsdJpy],
        display: ChangePct(Id::UsdJpy),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::UsdJpy), Above(2.0))],
                weight: 2,
                label: "Yen plunge",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::UsdJpy), Above(1.0))],
                weight: 1,
                label: "Yen weakness",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::UsdJpy), Below(-2.0))],
                weight: 3,
                label: "Yen surge, carry unwind risk",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::UsdJpy), Below(-1.0))],
                weight: 2,
                label: "Yen strength",
            },
        ],
    },
    Rule {
        requires: &[Id::KrwJpy],
        display: ChangePct(Id::KrwJpy),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::KrwJpy), Below(-2.0))],
                weight: 2,
                label: "Won slide vs yen",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::KrwJpy), Below(-1.0))],
                weight: 1,
                label: "Won drop vs yen",
            },
        ],
    },
    Rule {
        requires: &[Id::Us10y],
        display: AbsSwing(Id::Us10y),
        tiers: &[
            Tier {
                conditions: &[cond(AbsSwing(Id::Us10y), Above(0.20))],
                weight: 2,
                label: "US 10Y sharp move",
            },
            Tier {
                conditions: &[cond(AbsSwing(Id::Us10y), Above(0.10))],
                weight: 1,
                label: "US 10Y volatility",
            },
        ],
    },
    // Commodity momentum.
    Rule {
        requires: &[Id::Gold],
        display: ChangePct(Id::Gold),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Gold), Above(2.0))],
                weight: 2,
                label: "Gold rally",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Gold), Above(1.0))],
                weight: 1,
                label: "Gold bid",
            },
        ],
    },
    Rule {
        requires: &[Id::Silver],
        display: ChangePct(Id::Silver),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Silver), Above(3.0))],
                weight: 2,
                label: "Silver rally",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Silver), Above(1.5))],
                weight: 1,
                label: "Silver bid",
            },
        ],
    },
    Rule {
        requires: &[Id::Copper],
        display: ChangePct(Id::Copper),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Copper), Above(3.0))],
                weight: 2,
                label: "Copper spike",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Copper), Above(1.5))],
                weight: 1,
                label: "Copper bid",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Copper), Below(-3.0))],
                weight: 1,
                label: "Copper slump",
            },
        ],
    },
    Rule {
        requires: &[Id::Btc],
        display: ChangePct(Id::Btc),
        tiers: &[
            Tier {
                conditions: &[cond(ChangePct(Id::Btc), Above(6.0))],
                weight: 2,
                label: "Bitcoin surge",
            },
            Tier {
                conditions: &[cond(ChangePct(Id::Btc), Above(3.0))],
                weight: 1,
                label: "Bitcoin rally",
            },
        ],
    },
];

/// Evaluate the rule bank over a snapshot's readings.
pub fn compute_risk(instruments: &[InstrumentSnapshot]) -> RiskAssessment {
    let readings = Readings::index(instruments);

    let mut score: u32 = 0;
    let mut factors: Vec<String> = Vec::new();

    for rule in RULES {
        if !readings.has_all(rule.requires) {
            continue;
        }

        let fired = rule.tiers.iter().find(|tier| {
            tier.conditions
                .iter()
                .all(|c| c.metric.value(&readings).map(|v| c.cmp.holds(v)).unwrap_or(false))
        });
        let Some(tier) = fired else { continue };

        score += tier.weight;
        // Display ids are a subset of `requires`, so the value is present.
        let shown = rule.display.value(&readings).unwrap_or_default();
        factors.push(format!(
            "{} ({}) +{}",
            tier.label,
            rule.display.render(shown),
            tier.weight
        ));
    }

    let level = RiskLevel::from_score(score);
    debug!(
        "Risk evaluation: score={} level={:?} factors={}",
        score,
        level,
        factors.len()
    );

    RiskAssessment {
        score,
        level,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{InstrumentStatus, ValueUnit};

    fn make_reading(id: Id, current: f64, previous: f64) -> InstrumentSnapshot {
        let change_pct = if previous != 0.0 {
            (current - previous) / previous * 100.0
        } else {
            0.0
        };
        InstrumentSnapshot {
            id,
            name: format!("{:?}", id),
            external_ref: String::new(),
            current_value: current,
            previous_value: previous,
            change_pct,
            unit: ValueUnit::Points,
            status: InstrumentStatus::classify(change_pct),
            formatted_value: String::new(),
        }
    }

    fn make_errored(id: Id) -> InstrumentSnapshot {
        InstrumentSnapshot {
            id,
            name: format!("{:?}", id),
            external_ref: String::new(),
            current_value: 0.0,
            previous_value: 0.0,
            change_pct: 0.0,
            unit: ValueUnit::Points,
            status: InstrumentStatus::Error,
            formatted_value: "N/A".to_string(),
        }
    }

    #[test]
    fn test_quiet_market_scores_zero() {
        let snapshot = vec![
            make_reading(Id::Gold, 2000.0, 2000.0),
            make_reading(Id::Silver, 24.0, 24.0),
            make_reading(Id::Copper, 4.0, 4.0),
            make_reading(Id::Dxy, 100.0, 100.0),
            make_reading(Id::Us10y, 4.2, 4.2),
            make_reading(Id::Btc, 60000.0, 60000.0),
            make_reading(Id::KrwJpy, 9.2, 9.2),
            make_reading(Id::KrwUsd, 1300.0, 1300.0),
            make_reading(Id::UsdJpy, 148.0, 148.0),
            make_reading(Id::Spx, 5000.0, 5000.0),
            make_reading(Id::Ndx, 17500.0, 17500.0),
            make_reading(Id::Vix, 14.0, 14.0),
        ];

        let assessment = compute_risk(&snapshot);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.factors.is_empty());
    }

    #[test]
    fn test_composite_selloff_scores_seven() {
        let snapshot = vec![
            make_reading(Id::Spx, 96.5, 100.0), // -3.50%
            make_reading(Id::Ndx, 99.6, 100.0), // -0.40%, below every decline tier
            make_reading(Id::Vix, 28.0, 28.0),
        ];

        let assessment = compute_risk(&snapshot);
        assert_eq!(
            assessment.factors,
            vec![
                "S&P 500 plunge (-3.50%) +3",
                "S&P/Nasdaq divergence (3.10%p) +2",
                "VIX high (28.0) +2",
            ]
        );
        assert_eq!(assessment.score, 7);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_both_benchmarks_firing_are_additive() {
        let snapshot = vec![
            make_reading(Id::Spx, 96.5, 100.0), // -3.50%
            make_reading(Id::Ndx, 99.0, 100.0), // -1.00%, trips the weakness tier too
            make_reading(Id::Vix, 28.0, 28.0),
        ];

        let assessment = compute_risk(&snapshot);
        assert_eq!(
            assessment.factors,
            vec![
                "S&P 500 plunge (-3.50%) +3",
                "Nasdaq 100 weakness (-1.00%) +1",
                "S&P/Nasdaq divergence (2.50%p) +2",
                "VIX high (28.0) +2",
            ]
        );
        assert_eq!(assessment.score, 8);
    }

    #[test]
    fn test_dollar_change_and_level_both_fire() {
        let snapshot = vec![make_reading(Id::Dxy, 111.5, 110.0)]; // +1.36%, level 111.5

        let assessment = compute_risk(&snapshot);
        assert_eq!(
            assessment.factors,
            vec![
                "Dollar index surge (+1.36%) +2",
                "Dollar very strong (111.5) +2",
            ]
        );
        assert_eq!(assessment.score, 4);
    }

    #[test]
    fn test_fx_stress_combination_counts_dollar_again() {
        let snapshot = vec![
            make_reading(Id::Dxy, 100.6, 100.0),   // +0.60%
            make_reading(Id::KrwJpy, 98.8, 100.0), // -1.20%
            make_reading(Id::KrwUsd, 1300.0, 1300.0),
            make_reading(Id::UsdJpy, 148.0, 148.0),
        ];

        let assessment = compute_risk(&snapshot);
        assert_eq!(
            assessment.factors,
            vec![
                "Dollar index rising (+0.60%) +1",
                "Won slide amid dollar strength (-1.20%) +2",
                "Won drop vs yen (-1.20%) +1",
            ]
        );
        assert_eq!(assessment.score, 4);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_missing_instrument_skips_dependent_rules() {
        let snapshot = vec![make_reading(Id::Spx, 96.5, 100.0)];

        let assessment = compute_risk(&snapshot);
        // No divergence rule without the second benchmark.
        assert_eq!(assessment.score, 3);
        assert_eq!(assessment.factors.len(), 1);
    }

    #[test]
    fn test_errored_instrument_is_skipped() {
        let snapshot = vec![make_reading(Id::Spx, 99.4, 100.0), make_errored(Id::Vix)];

        let assessment = compute_risk(&snapshot);
        assert_eq!(assessment.score, 1);
        assert!(
            assessment.factors.iter().all(|f| !f.contains("VIX")),
            "errored VIX must not contribute: {:?}",
            assessment.factors
        );
    }

    #[test]
    fn test_carry_unwind_is_heaviest_yen_tier() {
        let snapshot = vec![make_reading(Id::UsdJpy, 146.25, 150.0)]; // -2.50%

        let assessment = compute_risk(&snapshot);
        assert_eq!(
            assessment.factors,
            vec!["Yen surge, carry unwind risk (-2.50%) +3"]
        );
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_won_dollar_negative_tiers_first_match() {
        let snapshot = vec![make_reading(Id::KrwUsd, 97.5, 100.0)]; // -2.50%

        let assessment = compute_risk(&snapshot);
        assert_eq!(assessment.factors, vec!["Won spike vs dollar (-2.50%) +2"]);
    }

    #[test]
    fn test_rate_swing_tiers_with_strict_boundaries() {
        // 4.45 - 4.25 computes just above 0.20 in f64, landing in the
        // sharp-move tier as the strict comparison requires.
        let sharp = compute_risk(&[make_reading(Id::Us10y, 4.45, 4.25)]);
        assert_eq!(sharp.factors, vec!["US 10Y sharp move (0.20p) +2"]);

        let moderate = compute_risk(&[make_reading(Id::Us10y, 4.40, 4.25)]);
        assert_eq!(moderate.factors, vec!["US 10Y volatility (0.15p) +1"]);

        let calm = compute_risk(&[make_reading(Id::Us10y, 4.30, 4.25)]);
        assert!(calm.factors.is_empty());
    }

    #[test]
    fn test_vix_level_boundaries() {
        // 35 is not above 35, so the extreme tier stays quiet.
        let at_35 = compute_risk(&[make_reading(Id::Vix, 35.0, 35.0)]);
        assert_eq!(at_35.factors, vec!["VIX high (35.0) +2"]);

        let above_35 = compute_risk(&[make_reading(Id::Vix, 35.5, 35.5)]);
        assert_eq!(above_35.factors, vec!["VIX extreme (35.5) +3"]);

        let at_15 = compute_risk(&[make_reading(Id::Vix, 15.0, 15.0)]);
        assert!(at_15.factors.is_empty(), "15 is not above 15");
    }

    #[test]
    fn test_commodity_rules_in_bank_order() {
        let snapshot = vec![
            make_reading(Id::Gold, 101.5, 100.0),   // +1.50%
            make_reading(Id::Silver, 103.5, 100.0), // +3.50%
            make_reading(Id::Copper, 96.5, 100.0),  // -3.50%
            make_reading(Id::Btc, 106.5, 100.0),    // +6.50%
        ];

        let assessment = compute_risk(&snapshot);
        assert_eq!(
            assessment.factors,
            vec![
                "Gold bid (+1.50%) +1",
                "Silver rally (+3.50%) +2",
                "Copper slump (-3.50%) +1",
                "Bitcoin surge (+6.50%) +2",
            ]
        );
        assert_eq!(assessment.score, 6);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_all_errored_is_well_formed() {
        let snapshot: Vec<_> = [
            Id::Gold, Id::Silver, Id::Copper, Id::Dxy, Id::Us10y, Id::Btc,
            Id::KrwJpy, Id::KrwUsd, Id::UsdJpy, Id::Spx, Id::Ndx, Id::Vix,
        ]
        .into_iter()
        .map(make_errored)
        .collect();

        let assessment = compute_risk(&snapshot);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.factors.is_empty());
    }
}
