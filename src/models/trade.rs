use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use super::{Direction, OptionType, TradeStatus, CONTRACT_MULTIPLIER};

/// Largest accepted strike, entry or exit price per unit.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Largest accepted contract count on one trade.
pub const MAX_CONTRACTS: i32 = 1_000_000;

/// Trade record rejected at the boundary, or an illegal lifecycle transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TradeError {
    #[error("invalid trade data: {field} {reason}")]
    InvalidTradeData { field: &'static str, reason: String },

    #[error("trade {0} is already closed")]
    AlreadyClosed(Uuid),
}

impl TradeError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TradeError::InvalidTradeData {
            field,
            reason: reason.into(),
        }
    }
}

/// Database row for the trades table, exactly as stored.
#[derive(Debug, Clone, FromRow)]
pub struct TradeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub strategy: String,
    pub option_type: String,
    pub direction: String,
    pub strike_price: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub expiry_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub contracts: i32,
    pub profit: Option<Decimal>,
    pub status: String,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated options trade.
///
/// `exit_price`, `exit_date` and `profit` are either all set (closed) or
/// all unset (open). Rows that break this are rejected by `TryFrom<TradeRow>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub strategy: String,
    pub option_type: OptionType,
    pub direction: Direction,
    pub strike_price: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub expiry_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub contracts: i32,
    pub profit: Option<Decimal>,
    pub status: TradeStatus,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Capital committed at entry: entry price × contracts × 100.
    pub fn invested(&self) -> Decimal {
        self.entry_price
            .saturating_mul(Decimal::from(self.contracts))
            .saturating_mul(Decimal::from(CONTRACT_MULTIPLIER))
    }

    /// Transition open → closed. Profit is computed here and never again.
    pub fn close(
        &mut self,
        exit_price: Decimal,
        exit_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Decimal, TradeError> {
        if self.is_closed() {
            return Err(TradeError::AlreadyClosed(self.id));
        }
        ensure_price("exit_price", exit_price)?;
        if exit_date < self.entry_date {
            return Err(TradeError::invalid("exit_date", "is before the entry date"));
        }

        let profit = realized_profit(self.direction, self.entry_price, exit_price, self.contracts);

        self.exit_price = Some(exit_price);
        self.exit_date = Some(exit_date);
        self.profit = Some(profit);
        self.status = TradeStatus::Closed;
        self.updated_at = now;

        Ok(profit)
    }

    /// True when both trades are closed with identical exit data.
    pub fn same_close(&self, other: &Trade) -> bool {
        self.is_closed()
            && other.is_closed()
            && self.exit_price == other.exit_price
            && self.exit_date == other.exit_date
            && self.profit == other.profit
    }
}

/// (exit − entry) × contracts × 100 for long; sign flipped for short.
pub fn realized_profit(
    direction: Direction,
    entry_price: Decimal,
    exit_price: Decimal,
    contracts: i32,
) -> Decimal {
    let per_unit = match direction {
        Direction::Long => exit_price.saturating_sub(entry_price),
        Direction::Short => entry_price.saturating_sub(exit_price),
    };
    per_unit
        .saturating_mul(Decimal::from(contracts))
        .saturating_mul(Decimal::from(CONTRACT_MULTIPLIER))
}

fn ensure_price(field: &'static str, value: Decimal) -> Result<(), TradeError> {
    if value < Decimal::ZERO {
        return Err(TradeError::invalid(field, "must not be negative"));
    }
    if value > MAX_PRICE {
        return Err(TradeError::invalid(field, format!("must not exceed {MAX_PRICE}")));
    }
    Ok(())
}

fn ensure_contracts(contracts: i32, min: i32) -> Result<(), TradeError> {
    if contracts < min {
        return Err(TradeError::invalid("contracts", format!("must be at least {min}")));
    }
    if contracts > MAX_CONTRACTS {
        return Err(TradeError::invalid("contracts", format!("must not exceed {MAX_CONTRACTS}")));
    }
    Ok(())
}

impl TryFrom<TradeRow> for Trade {
    type Error = TradeError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let status = TradeStatus::from_db_str(&row.status)
            .ok_or_else(|| TradeError::invalid("status", format!("unknown value '{}'", row.status)))?;
        let option_type = OptionType::from_db_str(&row.option_type).ok_or_else(|| {
            TradeError::invalid("option_type", format!("unknown value '{}'", row.option_type))
        })?;
        let direction = Direction::from_db_str(&row.direction).ok_or_else(|| {
            TradeError::invalid("direction", format!("unknown value '{}'", row.direction))
        })?;

        ensure_contracts(row.contracts, 0)?;
        ensure_price("strike_price", row.strike_price)?;
        ensure_price("entry_price", row.entry_price)?;
        if let Some(exit_price) = row.exit_price {
            ensure_price("exit_price", exit_price)?;
        }
        if let Some(profit) = row.profit {
            let max_profit = realized_profit(Direction::Long, Decimal::ZERO, MAX_PRICE, MAX_CONTRACTS);
            if profit.abs() > max_profit {
                return Err(TradeError::invalid("profit", format!("must not exceed {max_profit} in magnitude")));
            }
        }

        let exit_fields = [
            row.exit_price.is_some(),
            row.exit_date.is_some(),
            row.profit.is_some(),
        ];
        match status {
            TradeStatus::Open if exit_fields.iter().any(|set| *set) => {
                return Err(TradeError::invalid("status", "open trade carries exit data"));
            }
            TradeStatus::Closed if !exit_fields.iter().all(|set| *set) => {
                return Err(TradeError::invalid("status", "closed trade is missing exit data"));
            }
            _ => {}
        }

        Ok(Trade {
            id: row.id,
            user_id: row.user_id,
            symbol: row.symbol,
            strategy: row.strategy,
            option_type,
            direction,
            strike_price: row.strike_price,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            expiry_date: row.expiry_date,
            entry_date: row.entry_date,
            exit_date: row.exit_date,
            contracts: row.contracts,
            profit: row.profit,
            status,
            notes: row.notes,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Request body for logging a new trade.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrade {
    /// Client-generated id; resubmitting the same id never creates a duplicate.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub symbol: String,
    pub strategy: String,
    pub option_type: OptionType,
    pub direction: Option<Direction>,
    pub strike_price: Decimal,
    pub entry_price: Decimal,
    pub expiry_date: NaiveDate,
    pub entry_date: NaiveDate,
    pub contracts: i32,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

impl NewTrade {
    /// Validate and build an open trade owned by `user_id`.
    pub fn into_trade(
        self,
        id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Trade, TradeError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TradeError::invalid("symbol", "is required"));
        }
        let strategy = self.strategy.trim().to_string();
        if strategy.is_empty() {
            return Err(TradeError::invalid("strategy", "is required"));
        }
        ensure_contracts(self.contracts, 1)?;
        ensure_price("strike_price", self.strike_price)?;
        ensure_price("entry_price", self.entry_price)?;

        Ok(Trade {
            id,
            user_id,
            symbol,
            strategy,
            option_type: self.option_type,
            direction: self.direction.unwrap_or_default(),
            strike_price: self.strike_price,
            entry_price: self.entry_price,
            exit_price: None,
            expiry_date: self.expiry_date,
            entry_date: self.entry_date,
            exit_date: None,
            contracts: self.contracts,
            profit: None,
            status: TradeStatus::Open,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            created_at: now,
            updated_at: now,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_row() -> TradeRow {
        TradeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            symbol: "SPY".into(),
            strategy: "momentum".into(),
            option_type: "call".into(),
            direction: "long".into(),
            strike_price: Decimal::from(450),
            entry_price: Decimal::new(350, 2),
            exit_price: None,
            expiry_date: date(2024, 6, 21),
            entry_date: date(2024, 6, 3),
            exit_date: None,
            contracts: 2,
            profit: None,
            status: "open".into(),
            notes: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_close_long_computes_profit() {
        let mut trade = Trade::try_from(open_row()).unwrap();
        let profit = trade
            .close(Decimal::new(420, 2), date(2024, 6, 5), Utc::now())
            .unwrap();
        // (4.20 - 3.50) * 2 * 100 = 140
        assert_eq!(profit, Decimal::from(140));
        assert_eq!(trade.status, TradeStatus::Closed);
        assert_eq!(trade.exit_price, Some(Decimal::new(420, 2)));
        assert_eq!(trade.exit_date, Some(date(2024, 6, 5)));
        assert_eq!(trade.profit, Some(Decimal::from(140)));
    }

    #[test]
    fn test_close_short_flips_sign() {
        let profit = realized_profit(Direction::Short, Decimal::new(200, 2), Decimal::new(150, 2), 1);
        assert_eq!(profit, Decimal::from(50));
    }

    #[test]
    fn test_close_twice_rejected() {
        let mut trade = Trade::try_from(open_row()).unwrap();
        trade.close(Decimal::ONE, date(2024, 6, 5), Utc::now()).unwrap();
        let err = trade.close(Decimal::TWO, date(2024, 6, 6), Utc::now()).unwrap_err();
        assert_eq!(err, TradeError::AlreadyClosed(trade.id));
        // Frozen at first close
        assert_eq!(trade.exit_price, Some(Decimal::ONE));
    }

    #[test]
    fn test_same_close_compares_exit_data() {
        let open = Trade::try_from(open_row()).unwrap();
        let mut first = open.clone();
        first.close(Decimal::ONE, date(2024, 6, 5), Utc::now()).unwrap();
        let mut repeat = open.clone();
        repeat.close(Decimal::new(100, 2), date(2024, 6, 5), Utc::now()).unwrap();
        let mut other = open.clone();
        other.close(Decimal::TWO, date(2024, 6, 5), Utc::now()).unwrap();

        assert!(first.same_close(&repeat));
        assert!(!first.same_close(&other));
        assert!(!open.same_close(&open));
    }

    #[test]
    fn test_close_before_entry_rejected() {
        let mut trade = Trade::try_from(open_row()).unwrap();
        let result = trade.close(Decimal::ONE, date(2024, 6, 1), Utc::now());
        assert!(matches!(result, Err(TradeError::InvalidTradeData { field: "exit_date", .. })));
        assert!(trade.is_open());
    }

    #[test]
    fn test_row_negative_contracts_rejected() {
        let row = TradeRow { contracts: -1, ..open_row() };
        let result = Trade::try_from(row);
        assert!(matches!(result, Err(TradeError::InvalidTradeData { field: "contracts", .. })));
    }

    #[test]
    fn test_row_out_of_range_values_rejected() {
        let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);

        let row = TradeRow { entry_price: huge, ..open_row() };
        assert!(matches!(
            Trade::try_from(row),
            Err(TradeError::InvalidTradeData { field: "entry_price", .. })
        ));

        let row = TradeRow { contracts: MAX_CONTRACTS + 1, ..open_row() };
        assert!(matches!(
            Trade::try_from(row),
            Err(TradeError::InvalidTradeData { field: "contracts", .. })
        ));

        let row = TradeRow {
            status: "closed".into(),
            exit_price: Some(Decimal::ONE),
            exit_date: Some(date(2024, 6, 5)),
            profit: Some(-huge),
            ..open_row()
        };
        assert!(matches!(
            Trade::try_from(row),
            Err(TradeError::InvalidTradeData { field: "profit", .. })
        ));
    }

    #[test]
    fn test_close_rejects_price_above_limit() {
        let mut trade = Trade::try_from(open_row()).unwrap();
        let result = trade.close(MAX_PRICE + Decimal::ONE, date(2024, 6, 5), Utc::now());
        assert!(matches!(result, Err(TradeError::InvalidTradeData { field: "exit_price", .. })));
        assert!(trade.is_open());
    }

    #[test]
    fn test_extreme_values_saturate_instead_of_panicking() {
        let mut trade = Trade::try_from(open_row()).unwrap();
        trade.entry_price = Decimal::MAX;
        trade.contracts = i32::MAX;
        assert_eq!(trade.invested(), Decimal::MAX);
        assert_eq!(
            realized_profit(Direction::Short, Decimal::ZERO, Decimal::MAX, i32::MAX),
            Decimal::MIN
        );
    }

    #[test]
    fn test_row_open_with_exit_data_rejected() {
        let row = TradeRow {
            profit: Some(Decimal::from(10)),
            ..open_row()
        };
        assert!(Trade::try_from(row).is_err());
    }

    #[test]
    fn test_row_closed_missing_exit_rejected() {
        let row = TradeRow {
            status: "closed".into(),
            exit_price: Some(Decimal::ONE),
            ..open_row()
        };
        assert!(Trade::try_from(row).is_err());
    }

    #[test]
    fn test_row_unknown_status_rejected() {
        let row = TradeRow {
            status: "pending".into(),
            ..open_row()
        };
        assert!(matches!(
            Trade::try_from(row),
            Err(TradeError::InvalidTradeData { field: "status", .. })
        ));
    }

    #[test]
    fn test_new_trade_normalizes_and_defaults_long() {
        let new = NewTrade {
            id: None,
            symbol: " aapl ".into(),
            strategy: "earnings".into(),
            option_type: OptionType::Put,
            direction: None,
            strike_price: Decimal::from(180),
            entry_price: Decimal::new(215, 2),
            expiry_date: date(2024, 7, 19),
            entry_date: date(2024, 7, 1),
            contracts: 3,
            notes: Some("  ".into()),
            image_url: None,
        };
        let trade = new.into_trade(Uuid::new_v4(), Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(trade.symbol, "AAPL");
        assert_eq!(trade.direction, Direction::Long);
        assert_eq!(trade.status, TradeStatus::Open);
        assert!(trade.notes.is_none());
        assert_eq!(trade.invested(), Decimal::from(645));
    }

    #[test]
    fn test_new_trade_zero_contracts_rejected() {
        let new = NewTrade {
            id: None,
            symbol: "QQQ".into(),
            strategy: "scalp".into(),
            option_type: OptionType::Call,
            direction: Some(Direction::Long),
            strike_price: Decimal::from(400),
            entry_price: Decimal::ONE,
            expiry_date: date(2024, 7, 19),
            entry_date: date(2024, 7, 1),
            contracts: 0,
            notes: None,
            image_url: None,
        };
        assert!(new.into_trade(Uuid::new_v4(), Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_new_trade_huge_price_rejected() {
        let new = NewTrade {
            id: None,
            symbol: "SPY".into(),
            strategy: "scalp".into(),
            option_type: OptionType::Call,
            direction: None,
            strike_price: Decimal::from(400),
            entry_price: Decimal::from_i128_with_scale(10i128.pow(27), 0),
            expiry_date: date(2024, 7, 19),
            entry_date: date(2024, 7, 1),
            contracts: 1,
            notes: None,
            image_url: None,
        };
        let result = new.into_trade(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        assert!(matches!(result, Err(TradeError::InvalidTradeData { field: "entry_price", .. })));
    }
}
