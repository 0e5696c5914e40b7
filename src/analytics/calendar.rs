use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{percent_of, saturating_sum};
use crate::models::Trade;

/// All trades attributed to one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub trades: Vec<Trade>,
    pub total_profit: Decimal,
    pub total_invested: Decimal,
    pub percentage_gain: Decimal,
    pub has_winning_trades: bool,
    pub has_losing_trades: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub total_profit: Decimal,
    pub trading_days: i64,
    pub winning_days: i64,
    pub losing_days: i64,
    pub win_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStats {
    pub year: i32,
    pub months: Vec<MonthlyStats>,
    pub total_profit: Decimal,
    pub trading_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub profit: Decimal,
    pub percentage_gain: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarSummary {
    pub total_trading_days: i64,
    pub profitable_days: i64,
    pub unprofitable_days: i64,
    pub win_rate: Decimal,
    pub total_profit: Decimal,
    pub overall_percentage_gain: Decimal,
    pub best_day: DayResult,
    pub worst_day: DayResult,
}

/// Calendar date a trade is shown under: its exit date once closed,
/// otherwise its entry date.
pub fn bucket_date(trade: &Trade) -> NaiveDate {
    match trade.exit_date {
        Some(exit_date) if trade.is_closed() => exit_date,
        _ => trade.entry_date,
    }
}

/// Group trades into per-date buckets. A point-in-time view: a trade moves
/// from its entry day to its exit day when it is closed.
pub fn compute_daily_stats(trades: &[Trade]) -> BTreeMap<NaiveDate, DailyStats> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        grouped.entry(bucket_date(trade)).or_default().push(trade.clone());
    }

    grouped
        .into_iter()
        .map(|(date, day_trades)| {
            let total_profit =
                saturating_sum(day_trades.iter().map(|t| t.profit.unwrap_or(Decimal::ZERO)));
            let total_invested = saturating_sum(day_trades.iter().map(Trade::invested));
            let has_winning_trades = day_trades
                .iter()
                .any(|t| t.profit.unwrap_or(Decimal::ZERO) > Decimal::ZERO);
            let has_losing_trades = day_trades
                .iter()
                .any(|t| t.profit.unwrap_or(Decimal::ZERO) < Decimal::ZERO);

            let stats = DailyStats {
                date,
                trades: day_trades,
                total_profit,
                total_invested,
                percentage_gain: percent_of(total_profit, total_invested),
                has_winning_trades,
                has_losing_trades,
            };
            (date, stats)
        })
        .collect()
}

/// Roll daily buckets up into one calendar month. A day with exactly zero
/// net profit is a trading day but neither winning nor losing.
pub fn compute_monthly_rollup(
    daily_stats: &BTreeMap<NaiveDate, DailyStats>,
    year: i32,
    month: u32,
) -> MonthlyStats {
    let days: Vec<&DailyStats> = daily_stats
        .values()
        .filter(|d| d.date.year() == year && d.date.month() == month)
        .collect();

    let trading_days = days.len() as i64;
    let winning_days = days.iter().filter(|d| d.total_profit > Decimal::ZERO).count() as i64;
    let losing_days = days.iter().filter(|d| d.total_profit < Decimal::ZERO).count() as i64;

    MonthlyStats {
        year,
        month,
        total_profit: saturating_sum(days.iter().map(|d| d.total_profit)),
        trading_days,
        winning_days,
        losing_days,
        win_rate: percent_of(Decimal::from(winning_days), Decimal::from(trading_days)),
    }
}

pub fn compute_yearly_rollup(
    daily_stats: &BTreeMap<NaiveDate, DailyStats>,
    year: i32,
) -> YearlyStats {
    let months: Vec<MonthlyStats> = (1..=12)
        .map(|month| compute_monthly_rollup(daily_stats, year, month))
        .collect();

    YearlyStats {
        year,
        total_profit: saturating_sum(months.iter().map(|m| m.total_profit)),
        trading_days: months.iter().map(|m| m.trading_days).sum(),
        months,
    }
}

/// Whole-history calendar overview, or `None` when there are no buckets.
/// Best and worst days keep the earliest date on ties.
pub fn compute_calendar_summary(
    daily_stats: &BTreeMap<NaiveDate, DailyStats>,
) -> Option<CalendarSummary> {
    let mut days = daily_stats.values();
    let first = days.next()?;

    let mut best = first;
    let mut worst = first;
    for day in days {
        if day.total_profit > best.total_profit {
            best = day;
        }
        if day.total_profit < worst.total_profit {
            worst = day;
        }
    }

    let total_trading_days = daily_stats.len() as i64;
    let profitable_days = daily_stats
        .values()
        .filter(|d| d.total_profit > Decimal::ZERO)
        .count() as i64;
    let unprofitable_days = daily_stats
        .values()
        .filter(|d| d.total_profit < Decimal::ZERO)
        .count() as i64;
    let total_profit = saturating_sum(daily_stats.values().map(|d| d.total_profit));
    let total_invested = saturating_sum(daily_stats.values().map(|d| d.total_invested));

    Some(CalendarSummary {
        total_trading_days,
        profitable_days,
        unprofitable_days,
        win_rate: percent_of(Decimal::from(profitable_days), Decimal::from(total_trading_days)),
        total_profit,
        overall_percentage_gain: percent_of(total_profit, total_invested),
        best_day: day_result(best),
        worst_day: day_result(worst),
    })
}

fn day_result(day: &DailyStats) -> DayResult {
    DayResult {
        date: day.date,
        profit: day.total_profit,
        percentage_gain: day.percentage_gain,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{closed_trade, open_trade, ymd};
    use chrono::Utc;

    #[test]
    fn test_daily_buckets_by_exit_and_entry_date() {
        let trades = vec![
            closed_trade(Decimal::new(350, 2), 2, Decimal::from(140), (2024, 3, 4)),
            closed_trade(Decimal::new(200, 2), 1, Decimal::from(-50), (2024, 3, 4)),
            open_trade(Decimal::new(100, 2), 5, (2024, 3, 6)),
        ];
        let daily = compute_daily_stats(&trades);

        assert_eq!(daily.len(), 2);
        let day = &daily[&ymd((2024, 3, 4))];
        assert_eq!(day.trades.len(), 2);
        assert_eq!(day.total_profit, Decimal::from(90));
        // 3.50*2*100 + 2.00*1*100
        assert_eq!(day.total_invested, Decimal::from(900));
        assert_eq!(day.percentage_gain, Decimal::from(10));
        assert!(day.has_winning_trades);
        assert!(day.has_losing_trades);

        let open_day = &daily[&ymd((2024, 3, 6))];
        assert_eq!(open_day.total_profit, Decimal::ZERO);
        assert_eq!(open_day.total_invested, Decimal::from(500));
        assert!(!open_day.has_winning_trades);
        assert!(!open_day.has_losing_trades);
    }

    #[test]
    fn test_trade_moves_to_exit_day_when_closed() {
        let mut trade = open_trade(Decimal::ONE, 1, (2024, 5, 1));
        let before = compute_daily_stats(std::slice::from_ref(&trade));
        assert!(before.contains_key(&ymd((2024, 5, 1))));

        trade
            .close(Decimal::TWO, ymd((2024, 5, 9)), Utc::now())
            .unwrap();
        let after = compute_daily_stats(std::slice::from_ref(&trade));
        assert!(!after.contains_key(&ymd((2024, 5, 1))));
        assert_eq!(after[&ymd((2024, 5, 9))].total_profit, Decimal::from(100));
    }

    #[test]
    fn test_zero_capital_day() {
        let trades = vec![closed_trade(Decimal::ZERO, 0, Decimal::ZERO, (2024, 3, 4))];
        let daily = compute_daily_stats(&trades);
        assert_eq!(daily[&ymd((2024, 3, 4))].percentage_gain, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_rollup_filters_month() {
        let trades = vec![
            closed_trade(Decimal::ONE, 1, Decimal::from(100), (2024, 3, 4)),
            closed_trade(Decimal::ONE, 1, Decimal::from(-40), (2024, 3, 5)),
            closed_trade(Decimal::ONE, 1, Decimal::ZERO, (2024, 3, 6)),
            closed_trade(Decimal::ONE, 1, Decimal::from(70), (2024, 3, 7)),
            closed_trade(Decimal::ONE, 1, Decimal::from(999), (2024, 4, 1)),
            closed_trade(Decimal::ONE, 1, Decimal::from(999), (2023, 3, 4)),
        ];
        let daily = compute_daily_stats(&trades);
        let march = compute_monthly_rollup(&daily, 2024, 3);

        assert_eq!(march.trading_days, 4);
        assert_eq!(march.winning_days, 2);
        assert_eq!(march.losing_days, 1);
        assert_eq!(march.total_profit, Decimal::from(130));
        assert_eq!(march.win_rate, Decimal::from(50));
    }

    #[test]
    fn test_monthly_rollup_empty_month() {
        let daily = compute_daily_stats(&[]);
        let m = compute_monthly_rollup(&daily, 2024, 2);
        assert_eq!(m.trading_days, 0);
        assert_eq!(m.win_rate, Decimal::ZERO);
        assert_eq!(m.total_profit, Decimal::ZERO);
    }

    #[test]
    fn test_yearly_rollup() {
        let trades = vec![
            closed_trade(Decimal::ONE, 1, Decimal::from(100), (2024, 1, 10)),
            closed_trade(Decimal::ONE, 1, Decimal::from(-30), (2024, 12, 30)),
            closed_trade(Decimal::ONE, 1, Decimal::from(500), (2025, 1, 2)),
        ];
        let year = compute_yearly_rollup(&compute_daily_stats(&trades), 2024);
        assert_eq!(year.months.len(), 12);
        assert_eq!(year.total_profit, Decimal::from(70));
        assert_eq!(year.trading_days, 2);
        assert_eq!(year.months[0].winning_days, 1);
        assert_eq!(year.months[11].losing_days, 1);
    }

    #[test]
    fn test_calendar_summary_best_and_worst() {
        let trades = vec![
            closed_trade(Decimal::ONE, 1, Decimal::from(50), (2024, 3, 4)),
            closed_trade(Decimal::ONE, 1, Decimal::from(200), (2024, 3, 5)),
            closed_trade(Decimal::ONE, 1, Decimal::from(-80), (2024, 3, 6)),
            closed_trade(Decimal::ONE, 1, Decimal::from(200), (2024, 3, 7)),
        ];
        let summary = compute_calendar_summary(&compute_daily_stats(&trades)).unwrap();

        assert_eq!(summary.total_trading_days, 4);
        assert_eq!(summary.profitable_days, 3);
        assert_eq!(summary.unprofitable_days, 1);
        assert_eq!(summary.win_rate, Decimal::from(75));
        assert_eq!(summary.total_profit, Decimal::from(370));
        // 370 / 400 * 100
        assert_eq!(summary.overall_percentage_gain, Decimal::new(925, 1));
        assert_eq!(summary.best_day.date, ymd((2024, 3, 5)));
        assert_eq!(summary.worst_day.date, ymd((2024, 3, 6)));
    }

    #[test]
    fn test_extreme_prices_do_not_panic() {
        let trades = vec![
            open_trade(Decimal::MAX, i32::MAX, (2024, 3, 4)),
            open_trade(Decimal::MAX, i32::MAX, (2024, 3, 4)),
            closed_trade(Decimal::ONE, 1, Decimal::MAX, (2024, 3, 5)),
            closed_trade(Decimal::ONE, 1, Decimal::MAX, (2024, 3, 6)),
        ];
        let daily = compute_daily_stats(&trades);
        assert_eq!(daily[&ymd((2024, 3, 4))].total_invested, Decimal::MAX);

        let month = compute_monthly_rollup(&daily, 2024, 3);
        assert_eq!(month.total_profit, Decimal::MAX);
        assert_eq!(compute_yearly_rollup(&daily, 2024).total_profit, Decimal::MAX);
        assert!(compute_calendar_summary(&daily).is_some());
    }

    #[test]
    fn test_calendar_summary_empty() {
        assert!(compute_calendar_summary(&BTreeMap::new()).is_none());
    }
}
