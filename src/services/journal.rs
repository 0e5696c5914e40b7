//! The single write path for trades.
//!
//! Every mutation goes through here: validation, one retried database
//! write, metrics, and a change notification on the owner's feed. Each
//! write is safe to repeat, including when an earlier attempt committed
//! but its reply was lost. Creates carry their own id and skip on
//! conflict, closes only touch open rows and reconcile against the stored
//! row, and deletes treat "already gone after a retry" as done.

use std::future::Future;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::api::ws_types::{DeletedTrade, WsMessage};
use crate::db::retry::with_retry_attempts;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::{NewTrade, Trade, TradeError};
use crate::AppState;

/// Validate and store a new open trade.
pub async fn create_trade(
    state: &AppState,
    user_id: Uuid,
    new: NewTrade,
) -> Result<Trade, AppError> {
    let id = new.id.unwrap_or_else(Uuid::new_v4);
    let trade = new.into_trade(id, user_id, Utc::now())?;

    let (inserted, _) = write(state, "create_trade", || {
        trade_repo::insert_trade(&state.db, &trade)
    })
    .await?;

    match inserted {
        Some(stored) => {
            counter!("trades_created_total").increment(1);
            tracing::info!(
                trade_id = %stored.id,
                user_id = %user_id,
                symbol = %stored.symbol,
                "Trade created"
            );
            notify(state, WsMessage::TradeCreated(stored.clone()));
            Ok(stored)
        }
        // Same id submitted again: hand back what is stored.
        None => trade_repo::get_trade(&state.db, user_id, id)
            .await?
            .ok_or_else(|| AppError::Conflict(format!("Trade id {id} is already in use"))),
    }
}

/// Close one of the user's open trades. `exit_date` defaults to today (UTC).
pub async fn close_trade(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    exit_price: Decimal,
    exit_date: Option<NaiveDate>,
) -> Result<Trade, AppError> {
    let mut trade = trade_repo::get_trade(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trade {id} not found")))?;

    let now = Utc::now();
    let exit_date = exit_date.unwrap_or_else(|| now.date_naive());
    let profit = trade.close(exit_price, exit_date, now)?;
    let closed = persist_close(state, &trade).await?;

    counter!("trades_closed_total").increment(1);
    tracing::info!(
        trade_id = %id,
        user_id = %user_id,
        profit = %profit,
        "Trade closed"
    );
    notify(state, WsMessage::TradeClosed(closed.clone()));

    Ok(closed)
}

/// Store a close already computed by `Trade::close`.
///
/// If no open row matches, the stored row decides: the same exit data means
/// this close already landed (an earlier attempt committed), anything else
/// is a genuine `AlreadyClosed`.
pub async fn persist_close(state: &AppState, trade: &Trade) -> Result<Trade, AppError> {
    let (updated, _) = write(state, "close_trade", || {
        trade_repo::close_trade(&state.db, trade)
    })
    .await?;

    if let Some(closed) = updated {
        return Ok(closed);
    }

    match trade_repo::get_trade(&state.db, trade.user_id, trade.id).await? {
        Some(stored) if stored.same_close(trade) => {
            tracing::info!(trade_id = %trade.id, "Close already applied");
            Ok(stored)
        }
        Some(_) => Err(TradeError::AlreadyClosed(trade.id).into()),
        None => Err(AppError::NotFound(format!("Trade {} not found", trade.id))),
    }
}

/// Delete one of the user's trades.
pub async fn delete_trade(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let (removed, attempts) = write(state, "delete_trade", || {
        trade_repo::delete_trade(&state.db, user_id, id)
    })
    .await?;

    if !delete_confirmed(removed, attempts) {
        return Err(AppError::NotFound(format!("Trade {id} not found")));
    }

    counter!("trades_deleted_total").increment(1);
    tracing::info!(trade_id = %id, user_id = %user_id, "Trade deleted");
    notify(state, WsMessage::TradeDeleted(DeletedTrade { id, user_id }));

    Ok(())
}

/// A delete counts as done when it removed a row, or when it needed a retry:
/// the failed attempt may have committed, and the row is gone either way.
fn delete_confirmed(removed: u64, attempts: u32) -> bool {
    removed > 0 || attempts > 1
}

/// One retried write. Returns the value and the number of attempts made.
async fn write<T, F, Fut>(
    state: &AppState,
    operation: &'static str,
    op: F,
) -> Result<(T, u32), AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let started = Instant::now();
    let result = with_retry_attempts(&state.config.retry_policy(), operation, op).await;
    histogram!("write_latency_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());

    result.map_err(|e| {
        counter!("write_failures_total", "operation" => operation).increment(1);
        tracing::error!(operation, error = %e, "Trade write failed");
        AppError::from(e)
    })
}

fn notify(state: &AppState, msg: WsMessage) {
    // No subscribers is the normal case when nobody has a feed open.
    if state.ws_tx.send(msg).is_err() {
        tracing::debug!("No WebSocket subscribers for trade change");
    }
}
