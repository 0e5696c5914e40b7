use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Direction, OptionType, Trade, TradeStatus, CONTRACT_MULTIPLIER};

pub fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn open_trade(entry_price: Decimal, contracts: i32, entry: (i32, u32, u32)) -> Trade {
    let entry_date = ymd(entry);
    Trade {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        symbol: "SPY".into(),
        strategy: "test".into(),
        option_type: OptionType::Call,
        direction: Direction::Long,
        strike_price: Decimal::from(500),
        entry_price,
        exit_price: None,
        expiry_date: entry_date + Duration::days(30),
        entry_date,
        exit_date: None,
        contracts,
        profit: None,
        status: TradeStatus::Open,
        notes: None,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Closed trade entered the day before `exit`.
pub fn closed_trade(
    entry_price: Decimal,
    contracts: i32,
    profit: Decimal,
    exit: (i32, u32, u32),
) -> Trade {
    let exit_date = ymd(exit);
    let mut trade = open_trade(entry_price, contracts, exit);
    trade.entry_date = exit_date - Duration::days(1);

    let units = Decimal::from(contracts) * Decimal::from(CONTRACT_MULTIPLIER);
    let exit_price = if units.is_zero() {
        entry_price
    } else {
        entry_price + profit / units
    };

    trade.exit_price = Some(exit_price);
    trade.exit_date = Some(exit_date);
    trade.profit = Some(profit);
    trade.status = TradeStatus::Closed;
    trade
}
