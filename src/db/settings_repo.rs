use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AdminSetting;

pub async fn list_settings(pool: &PgPool) -> anyhow::Result<Vec<AdminSetting>> {
    let settings =
        sqlx::query_as::<_, AdminSetting>("SELECT * FROM admin_settings ORDER BY setting_key")
            .fetch_all(pool)
            .await?;

    Ok(settings)
}

pub async fn get_setting_by_key(pool: &PgPool, key: &str) -> anyhow::Result<Option<AdminSetting>> {
    let setting =
        sqlx::query_as::<_, AdminSetting>("SELECT * FROM admin_settings WHERE setting_key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(setting)
}

pub async fn update_setting(
    pool: &PgPool,
    id: Uuid,
    value: &serde_json::Value,
) -> anyhow::Result<Option<AdminSetting>> {
    let setting = sqlx::query_as::<_, AdminSetting>(
        r#"
        UPDATE admin_settings SET setting_value = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(value)
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}
