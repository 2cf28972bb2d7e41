//! Core value objects shared across the pulse-bot crates.
//!
//! A snapshot is a list of per-instrument readings; the risk and pair
//! engines consume snapshots and produce `RiskAssessment` /
//! `PairSignal` values. Everything here is plain serializable data so
//! downstream transports can render JSON without re-modeling.

use serde::{Deserialize, Serialize};

/// Stable identifier for a tracked instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentId {
    Gold,
    Silver,
    Copper,
    Dxy,
    Us10y,
    Btc,
    KrwJpy,
    KrwUsd,
    UsdJpy,
    Spx,
    Ndx,
    Vix,
}

/// How an instrument's value renders: `4.23%`, `24.55`, or `$2,043.50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueUnit {
    Percentage,
    Points,
    Currency,
}

/// Day-over-day state of one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentStatus {
    Stable,
    Up,
    Down,
    Error,
}

impl InstrumentStatus {
    /// Derive the status from a change percentage (non-error path).
    pub fn classify(change_pct: f64) -> Self {
        if change_pct.abs() < 1.0 {
            InstrumentStatus::Stable
        } else if change_pct > 0.0 {
            InstrumentStatus::Up
        } else {
            InstrumentStatus::Down
        }
    }
}

/// Five-grade movement classification used by report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGrade {
    Surge,
    Up,
    Flat,
    Down,
    Plunge,
}

impl TrendGrade {
    pub fn classify(change_pct: f64) -> Self {
        if change_pct > 2.0 {
            TrendGrade::Surge
        } else if change_pct > 0.5 {
            TrendGrade::Up
        } else if change_pct > -0.5 {
            TrendGrade::Flat
        } else if change_pct > -2.0 {
            TrendGrade::Down
        } else {
            TrendGrade::Plunge
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TrendGrade::Surge => "🚀",
            TrendGrade::Up => "📈",
            TrendGrade::Flat => "➡️",
            TrendGrade::Down => "📉",
            TrendGrade::Plunge => "⬇️",
        }
    }
}

/// One reading for one tracked instrument.
///
/// `status == Error` implies zeroed numeric fields and `formatted_value`
/// of `"N/A"`; scoring and pair logic must not consume such entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    pub id: InstrumentId,
    /// Human-readable name, e.g. "Gold".
    pub name: String,
    /// Symbol used with the external price feed, e.g. "GC=F".
    pub external_ref: String,
    pub current_value: f64,
    /// Prior trading-period close. Equals `current_value` when only a
    /// single historical point was available.
    pub previous_value: f64,
    /// (current − previous) / previous × 100.
    pub change_pct: f64,
    pub unit: ValueUnit,
    pub status: InstrumentStatus,
    /// Unit-aware render of `current_value`, or "N/A" on error.
    pub formatted_value: String,
}

impl InstrumentSnapshot {
    /// True when the reading is usable by scoring and pair logic.
    pub fn is_ok(&self) -> bool {
        self.status != InstrumentStatus::Error
    }

    /// Movement grade of this reading (Flat for errored entries).
    pub fn trend(&self) -> TrendGrade {
        TrendGrade::classify(self.change_pct)
    }
}

/// Render a value according to its unit.
pub fn format_value(value: f64, unit: ValueUnit) -> String {
    match unit {
        ValueUnit::Percentage => format!("{:.2}%", value),
        ValueUnit::Points => format!("{:.2}", value),
        ValueUnit::Currency => format!("${}", group_thousands(&format!("{:.2}", value))),
    }
}

/// Insert thousands separators into an already-formatted decimal string.
fn group_thousands(formatted: &str) -> String {
    let (number, decimals) = match formatted.split_once('.') {
        Some((n, d)) => (n, Some(d)),
        None => (formatted, None),
    };
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match decimals {
        Some(d) => format!("{}{}.{}", sign, grouped, d),
        None => format!("{}{}", sign, grouped),
    }
}

// ── Risk assessment ───────────────────────────────────────────────────

/// Aggregate risk bucket derived from the rule-bank score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fixed breakpoints: ≥6 high, ≥3 medium, else low.
    pub fn from_score(score: u32) -> Self {
        if score >= 6 {
            RiskLevel::High
        } else if score >= 3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::High => "#dc3545",
            RiskLevel::Medium => "#ffc107",
            RiskLevel::Low => "#28a745",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        }
    }
}

/// Output of the risk scorer: total score, bucket, and the ordered list
/// of fired-rule descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    /// One entry per fired rule, in rule-bank evaluation order.
    pub factors: Vec<String>,
}

// ── Pair signals ──────────────────────────────────────────────────────

/// The four fixed instrument pairs the signal engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairKey {
    GoldSilver,
    VixBondsStocks,
    UsdJpy,
    SpxNdx,
}

/// Five-grade classification; each pair uses its own subset of this
/// vocabulary plus `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairGrade {
    // gold/silver ratio
    StrongBuy,
    Buy,
    Sell,
    StrongSell,
    // vix rotation
    StrongBuyStocks,
    BuyStocks,
    SellStocks,
    StrongSellStocks,
    // dollar/yen carry
    StrongBuyJpy,
    BuyJpy,
    SellJpy,
    StrongSellJpy,
    // relative index performance
    StrongBuySpx,
    BuySpx,
    BuyNdx,
    StrongBuyNdx,
    // shared
    Neutral,
}

impl PairGrade {
    /// Short action phrase for report rendering.
    pub fn label(&self) -> &'static str {
        match self {
            PairGrade::StrongBuy => "silver strong buy / gold strong sell",
            PairGrade::Buy => "silver buy / gold sell",
            PairGrade::Sell => "gold buy / silver sell",
            PairGrade::StrongSell => "gold strong buy / silver strong sell",
            PairGrade::StrongBuyStocks => "stocks strong buy / bonds sell",
            PairGrade::BuyStocks => "stocks buy",
            PairGrade::SellStocks => "stocks trim",
            PairGrade::StrongSellStocks => "stocks sell / bonds buy",
            PairGrade::StrongBuyJpy => "yen strong buy / dollar sell",
            PairGrade::BuyJpy => "yen buy",
            PairGrade::SellJpy => "yen sell",
            PairGrade::StrongSellJpy => "yen strong sell / dollar buy",
            PairGrade::StrongBuySpx => "S&P strong buy / Nasdaq sell",
            PairGrade::BuySpx => "S&P buy",
            PairGrade::BuyNdx => "Nasdaq buy",
            PairGrade::StrongBuyNdx => "Nasdaq strong buy / S&P sell",
            PairGrade::Neutral => "neutral",
        }
    }

    /// Strength marker: doubled for extreme tiers, yellow for neutral.
    pub fn emoji(&self) -> &'static str {
        match self {
            PairGrade::StrongBuy
            | PairGrade::StrongSellStocks
            | PairGrade::StrongBuyJpy
            | PairGrade::StrongBuySpx => "🟢🟢",
            PairGrade::Buy
            | PairGrade::SellStocks
            | PairGrade::BuyJpy
            | PairGrade::BuySpx => "🟢",
            PairGrade::StrongSell
            | PairGrade::StrongBuyStocks
            | PairGrade::StrongSellJpy
            | PairGrade::StrongBuyNdx => "🔴🔴",
            PairGrade::Sell
            | PairGrade::BuyStocks
            | PairGrade::SellJpy
            | PairGrade::BuyNdx => "🔴",
            PairGrade::Neutral => "🟡",
        }
    }
}

/// One pair-trading classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSignal {
    /// Display name, e.g. "Gold/Silver Ratio".
    pub name: String,
    /// Pair-specific derived number: a ratio, a level, or a %p gap.
    pub metric: f64,
    pub grade: PairGrade,
    /// Formatted metric plus its qualitative band label.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_percentage() {
        assert_eq!(format_value(4.234, ValueUnit::Percentage), "4.23%");
    }

    #[test]
    fn test_format_value_points() {
        assert_eq!(format_value(24.553, ValueUnit::Points), "24.55");
    }

    #[test]
    fn test_format_value_currency_groups_thousands() {
        assert_eq!(format_value(2043.5, ValueUnit::Currency), "$2,043.50");
        assert_eq!(
            format_value(1234567.891, ValueUnit::Currency),
            "$1,234,567.89"
        );
        assert_eq!(format_value(950.0, ValueUnit::Currency), "$950.00");
    }

    #[test]
    fn test_format_value_negative_currency() {
        assert_eq!(format_value(-1234.5, ValueUnit::Currency), "$-1,234.50");
    }

    #[test]
    fn test_status_classification_boundaries() {
        assert_eq!(InstrumentStatus::classify(0.0), InstrumentStatus::Stable);
        assert_eq!(InstrumentStatus::classify(0.99), InstrumentStatus::Stable);
        assert_eq!(InstrumentStatus::classify(-0.99), InstrumentStatus::Stable);
        assert_eq!(InstrumentStatus::classify(1.0), InstrumentStatus::Up);
        assert_eq!(InstrumentStatus::classify(-1.0), InstrumentStatus::Down);
    }

    #[test]
    fn test_trend_grade_boundaries() {
        assert_eq!(TrendGrade::classify(2.5), TrendGrade::Surge);
        assert_eq!(TrendGrade::classify(2.0), TrendGrade::Up);
        assert_eq!(TrendGrade::classify(0.5), TrendGrade::Flat);
        assert_eq!(TrendGrade::classify(-0.5), TrendGrade::Down);
        assert_eq!(TrendGrade::classify(-2.0), TrendGrade::Plunge);
    }

    #[test]
    fn test_risk_level_breakpoints() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(5), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_render() {
        assert_eq!(RiskLevel::High.color(), "#dc3545");
        assert_eq!(RiskLevel::Medium.color(), "#ffc107");
        assert_eq!(RiskLevel::Low.color(), "#28a745");
        assert_eq!(RiskLevel::High.emoji(), "🔴");
    }

    #[test]
    fn test_pair_key_serializes_snake_case() {
        let key = serde_json::to_string(&PairKey::VixBondsStocks).unwrap();
        assert_eq!(key, "\"vix_bonds_stocks\"");
    }
}
