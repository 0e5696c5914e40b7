//! Pure trade-performance aggregation.
//!
//! Every function here takes already-fetched trades and returns plain
//! values. Nothing performs I/O, and every division guards its denominator,
//! so the functions are total over any well-typed input.

pub mod calendar;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod score;
pub mod series;
pub mod summary;

pub use calendar::{
    compute_calendar_summary, compute_daily_stats, compute_monthly_rollup, compute_yearly_rollup,
    CalendarSummary, DailyStats, DayResult, MonthlyStats, YearlyStats,
};
pub use score::{compute_tracker_score, ScoreTier};
pub use series::{cumulative_pnl, daily_pnl, return_on_capital, DailyPnl, PnlPoint};
pub use summary::{
    average_trades_per_user, compute_summary, percentage_gain, summarize, TradeSummary,
};

use rust_decimal::Decimal;

/// `part / whole × 100`, or zero when `whole` is zero.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    safe_div(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Sum clamped to the `Decimal` range.
pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `numerator / denominator`, or zero when the denominator is zero.
/// A quotient beyond the `Decimal` range clamps to `MAX`/`MIN`.
pub(crate) fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_guards_zero_and_overflow() {
        assert_eq!(safe_div(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(Decimal::MAX, Decimal::new(1, 2)), Decimal::MAX);
        assert_eq!(safe_div(Decimal::MIN, Decimal::new(1, 2)), Decimal::MIN);
        assert_eq!(percent_of(Decimal::MAX, Decimal::ONE), Decimal::MAX);
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::MAX]), Decimal::MAX);
    }
}
