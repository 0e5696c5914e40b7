use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Trade, TradeRow, TradeStatus};

fn into_trades(rows: Vec<TradeRow>) -> anyhow::Result<Vec<Trade>> {
    rows.into_iter()
        .map(|row| Trade::try_from(row).map_err(anyhow::Error::from))
        .collect()
}

fn into_trade(row: Option<TradeRow>) -> anyhow::Result<Option<Trade>> {
    row.map(Trade::try_from).transpose().map_err(anyhow::Error::from)
}

/// Insert a new trade. Returns `None` if a row with the same id already
/// exists, so a retried insert never duplicates.
pub async fn insert_trade(pool: &PgPool, trade: &Trade) -> anyhow::Result<Option<Trade>> {
    let row = sqlx::query_as::<_, TradeRow>(
        r#"
        INSERT INTO trades (
            id, user_id, symbol, strategy, option_type, direction,
            strike_price, entry_price, expiry_date, entry_date, contracts,
            status, notes, image_url, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(trade.id)
    .bind(trade.user_id)
    .bind(&trade.symbol)
    .bind(&trade.strategy)
    .bind(trade.option_type.as_str())
    .bind(trade.direction.as_str())
    .bind(trade.strike_price)
    .bind(trade.entry_price)
    .bind(trade.expiry_date)
    .bind(trade.entry_date)
    .bind(trade.contracts)
    .bind(trade.status.as_str())
    .bind(&trade.notes)
    .bind(&trade.image_url)
    .bind(trade.created_at)
    .bind(trade.updated_at)
    .fetch_optional(pool)
    .await?;

    into_trade(row)
}

/// Get one of a user's trades.
pub async fn get_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Trade>> {
    let row = sqlx::query_as::<_, TradeRow>(
        "SELECT * FROM trades WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    into_trade(row)
}

/// A user's trades, newest entry first, optionally filtered by status.
pub async fn list_trades(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<TradeStatus>,
) -> anyhow::Result<Vec<Trade>> {
    let rows = sqlx::query_as::<_, TradeRow>(
        r#"
        SELECT * FROM trades
        WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;

    into_trades(rows)
}

/// Persist a close computed by `Trade::close`. The update only applies to
/// a trade that is still open; returns `None` otherwise.
pub async fn close_trade(pool: &PgPool, trade: &Trade) -> anyhow::Result<Option<Trade>> {
    let row = sqlx::query_as::<_, TradeRow>(
        r#"
        UPDATE trades
        SET exit_price = $3, exit_date = $4, profit = $5, status = 'closed', updated_at = $6
        WHERE id = $1 AND user_id = $2 AND status = 'open'
        RETURNING *
        "#,
    )
    .bind(trade.id)
    .bind(trade.user_id)
    .bind(trade.exit_price)
    .bind(trade.exit_date)
    .bind(trade.profit)
    .bind(trade.updated_at)
    .fetch_optional(pool)
    .await?;

    into_trade(row)
}

/// Delete one of a user's trades. Returns the number of rows removed.
pub async fn delete_trade(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Count all trades, optionally only those created since `since`.
pub async fn count_trades(
    pool: &PgPool,
    since: Option<chrono::DateTime<chrono::Utc>>,
) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM trades WHERE $1::timestamptz IS NULL OR created_at >= $1",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Number of distinct users who logged a trade since `since`.
pub async fn count_active_traders(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(DISTINCT user_id) FROM trades WHERE created_at >= $1",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
