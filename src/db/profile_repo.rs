use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Profile;

pub async fn get_profile(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// All profiles, newest first.
pub async fn list_profiles(pool: &PgPool) -> anyhow::Result<Vec<Profile>> {
    let profiles =
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    Ok(profiles)
}

/// Grant or revoke admin rights.
pub async fn set_admin(pool: &PgPool, id: Uuid, is_admin: bool) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles SET is_admin = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(is_admin)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

/// Count profiles, optionally only those created since `since`.
pub async fn count_profiles(pool: &PgPool, since: Option<DateTime<Utc>>) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM profiles WHERE $1::timestamptz IS NULL OR created_at >= $1",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
