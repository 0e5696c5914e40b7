use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::summary::summarize;
use crate::models::Trade;

/// Closed-trade count at which the activity component saturates.
const FULL_ACTIVITY_TRADES: i64 = 50;
/// Multiplier mapping profit factor onto the 0-100 scale (5.0 → 100).
const PROFIT_FACTOR_SCALE: i64 = 20;

/// Composite 0-100 trader rating over closed trades:
/// 40% win rate, 40% profit factor × 20, 20% activity (closed count / 50),
/// each component capped at 100, rounded half-up.
pub fn compute_tracker_score(trades: &[Trade]) -> u8 {
    let summary = summarize(trades.iter().filter(|t| t.is_closed()));
    if summary.closed_trades == 0 {
        return 0;
    }

    let hundred = Decimal::ONE_HUNDRED;

    // Each component is capped at 100 before weighting, so the weighted
    // sum stays within 0..=100.
    let win_rate_component = summary.win_rate.min(hundred) * Decimal::new(4, 1);
    let profit_factor_component = summary
        .profit_factor
        .saturating_mul(Decimal::from(PROFIT_FACTOR_SCALE))
        .min(hundred)
        * Decimal::new(4, 1);
    let activity_component = (Decimal::from(summary.closed_trades) * hundred
        / Decimal::from(FULL_ACTIVITY_TRADES))
    .min(hundred)
        * Decimal::new(2, 1);

    let score = (win_rate_component + profit_factor_component + activity_component)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    score.to_u8().unwrap_or(0).min(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
    Poor,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreTier::Excellent,
            60..=79 => ScoreTier::Good,
            40..=59 => ScoreTier::Average,
            20..=39 => ScoreTier::NeedsImprovement,
            _ => ScoreTier::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent",
            ScoreTier::Good => "Good",
            ScoreTier::Average => "Average",
            ScoreTier::NeedsImprovement => "Needs Improvement",
            ScoreTier::Poor => "Poor",
        }
    }
}
