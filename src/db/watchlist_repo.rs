use sqlx::PgPool;
use uuid::Uuid;

use crate::models::WatchlistEntry;

pub async fn list_entries(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<WatchlistEntry>> {
    let entries = sqlx::query_as::<_, WatchlistEntry>(
        "SELECT * FROM watchlist WHERE user_id = $1 ORDER BY symbol",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Add a symbol to a user's watchlist. Adding one already present returns
/// the existing entry.
pub async fn add_entry(pool: &PgPool, user_id: Uuid, symbol: &str) -> anyhow::Result<WatchlistEntry> {
    let entry = sqlx::query_as::<_, WatchlistEntry>(
        r#"
        INSERT INTO watchlist (user_id, symbol)
        VALUES ($1, $2)
        ON CONFLICT (user_id, symbol) DO UPDATE SET symbol = EXCLUDED.symbol
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

pub async fn remove_entry(pool: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM watchlist WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
