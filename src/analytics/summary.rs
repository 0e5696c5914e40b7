use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{percent_of, safe_div};
use crate::models::Trade;

/// Summary statistics over one user's trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub total_trades: i64,
    pub open_trades: i64,
    pub closed_trades: i64,
    pub winning_trades: i64,
    pub losing_trades: i64,
    pub total_profit: Decimal,
    pub win_rate: Decimal,
    pub average_profit: Decimal,
    pub average_loss: Decimal,
    pub profit_factor: Decimal,
    pub largest_gain: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
}

/// Compute the summary for a mixed set of open and closed trades.
///
/// A trade with a recorded profit of exactly zero is classified as losing,
/// so `winning_trades + losing_trades` always equals the number of trades
/// carrying a profit.
pub fn compute_summary(trades: &[Trade]) -> TradeSummary {
    summarize(trades)
}

/// Single pass over borrowed trades; `compute_summary` for any iterator.
/// Sums saturate at the `Decimal` range.
pub fn summarize<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> TradeSummary {
    let mut total_trades = 0i64;
    let mut open_trades = 0i64;
    let mut closed_trades = 0i64;
    let mut winning_trades = 0i64;
    let mut losing_trades = 0i64;
    let mut gross_profit = Decimal::ZERO;
    let mut loss_sum = Decimal::ZERO;
    let mut largest_gain = Decimal::ZERO;

    for trade in trades {
        total_trades += 1;
        if trade.is_open() {
            open_trades += 1;
        }
        if trade.is_closed() {
            closed_trades += 1;
        }
        match trade.profit {
            Some(profit) if profit > Decimal::ZERO => {
                winning_trades += 1;
                gross_profit = gross_profit.saturating_add(profit);
                largest_gain = largest_gain.max(profit);
            }
            Some(profit) => {
                losing_trades += 1;
                loss_sum = loss_sum.saturating_add(profit);
            }
            None => {}
        }
    }

    let total_profit = gross_profit.saturating_add(loss_sum);
    let gross_loss = loss_sum.abs();

    let win_rate = percent_of(Decimal::from(winning_trades), Decimal::from(closed_trades));
    let average_profit = safe_div(gross_profit, Decimal::from(winning_trades));
    let average_loss = safe_div(loss_sum, Decimal::from(losing_trades));

    TradeSummary {
        total_trades,
        open_trades,
        closed_trades,
        winning_trades,
        losing_trades,
        total_profit,
        win_rate,
        average_profit,
        average_loss,
        profit_factor: profit_factor(gross_profit, gross_loss),
        largest_gain,
        gross_profit,
        gross_loss,
    }
}

/// Gross profit over gross loss. With no losses the ratio degrades to the
/// gross profit itself rather than infinity.
pub fn profit_factor(gross_profit: Decimal, gross_loss: Decimal) -> Decimal {
    if gross_loss > Decimal::ZERO {
        safe_div(gross_profit, gross_loss)
    } else if gross_profit > Decimal::ZERO {
        gross_profit
    } else {
        Decimal::ZERO
    }
}

/// Realized return on the capital committed to a single trade, in percent.
/// Open trades report zero.
pub fn percentage_gain(trade: &Trade) -> Decimal {
    percent_of(trade.profit.unwrap_or(Decimal::ZERO), trade.invested())
}

// ---------------------------------------------------------------------------
// Platform statistics
// ---------------------------------------------------------------------------

/// Trades per registered user, rounded half-up to one decimal place.
pub fn average_trades_per_user(total_trades: i64, total_users: i64) -> Decimal {
    safe_div(Decimal::from(total_trades), Decimal::from(total_users))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
