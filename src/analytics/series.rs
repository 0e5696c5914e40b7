use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{percent_of, saturating_sum};
use crate::models::Trade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlPoint {
    pub trade_id: Uuid,
    pub date: NaiveDate,
    pub profit: Decimal,
    pub cumulative_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub daily_pnl: Decimal,
    pub cumulative_pnl: Decimal,
}

fn realized<'a>(trades: &'a [Trade]) -> impl Iterator<Item = (&'a Trade, NaiveDate)> + 'a {
    trades
        .iter()
        .filter(|t| t.is_closed())
        .filter_map(|t| t.exit_date.map(|d| (t, d)))
}

/// Running P&L per closed trade, ordered by exit date. Trades closed on the
/// same day keep their input order.
pub fn cumulative_pnl(trades: &[Trade]) -> Vec<PnlPoint> {
    let mut closed: Vec<(&Trade, NaiveDate)> = realized(trades).collect();
    closed.sort_by_key(|(_, date)| *date);

    let mut cumulative = Decimal::ZERO;
    closed
        .into_iter()
        .map(|(trade, date)| {
            let profit = trade.profit.unwrap_or(Decimal::ZERO);
            cumulative = cumulative.saturating_add(profit);
            PnlPoint {
                trade_id: trade.id,
                date,
                profit,
                cumulative_profit: cumulative,
            }
        })
        .collect()
}

/// Net realized P&L per exit date with a running total.
pub fn daily_pnl(trades: &[Trade]) -> Vec<DailyPnl> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (trade, date) in realized(trades) {
        let day = by_day.entry(date).or_default();
        *day = day.saturating_add(trade.profit.unwrap_or(Decimal::ZERO));
    }

    let mut cumulative = Decimal::ZERO;
    by_day
        .into_iter()
        .map(|(date, daily)| {
            cumulative = cumulative.saturating_add(daily);
            DailyPnl {
                date,
                daily_pnl: daily,
                cumulative_pnl: cumulative,
            }
        })
        .collect()
}

/// Closed trades' total profit as a percentage of the capital they used.
pub fn return_on_capital(trades: &[Trade]) -> Decimal {
    let closed = || trades.iter().filter(|t| t.is_closed());
    let profit = saturating_sum(closed().map(|t| t.profit.unwrap_or(Decimal::ZERO)));
    let invested = saturating_sum(closed().map(Trade::invested));
    percent_of(profit, invested)
}
