use axum::extract::{Path, State};
use axum::Json;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analytics::ScoreView;
use super::{ok, ApiResult};
use crate::analytics::{average_trades_per_user, compute_summary, cumulative_pnl, PnlPoint, TradeSummary};
use crate::api::auth::AdminUser;
use crate::db::{profile_repo, settings_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{AdminSetting, Profile, Trade};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub setting_value: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct UserPerformance {
    pub profile: Profile,
    pub trades: Vec<Trade>,
    pub summary: TradeSummary,
    pub score: ScoreView,
    pub cumulative: Vec<PnlPoint>,
}

#[derive(Debug, Serialize)]
pub struct AppStatistics {
    pub total_users: i64,
    pub new_users_today: i64,
    pub total_trades: i64,
    pub trades_this_week: i64,
    pub active_traders_this_week: i64,
    pub average_trades_per_user: Decimal,
}

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<Profile>> {
    ok(profile_repo::list_profiles(&state.db).await?)
}

pub async fn set_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SetAdminRequest>,
) -> ApiResult<Profile> {
    let profile = profile_repo::set_admin(&state.db, id, body.is_admin)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %id,
        is_admin = body.is_admin,
        "Admin flag updated"
    );
    ok(profile)
}

pub async fn user_performance(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<UserPerformance> {
    let profile = profile_repo::get_profile(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    let trades = trade_repo::list_trades(&state.db, id, None).await?;

    ok(UserPerformance {
        profile,
        summary: compute_summary(&trades),
        score: ScoreView::from_trades(&trades),
        cumulative: cumulative_pnl(&trades),
        trades,
    })
}

pub async fn statistics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<AppStatistics> {
    let now = Utc::now();
    let start_of_today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    let week_ago = now - Duration::days(7);

    let total_users = profile_repo::count_profiles(&state.db, None).await?;
    let new_users_today = profile_repo::count_profiles(&state.db, Some(start_of_today)).await?;
    let total_trades = trade_repo::count_trades(&state.db, None).await?;
    let trades_this_week = trade_repo::count_trades(&state.db, Some(week_ago)).await?;
    let active_traders_this_week = trade_repo::count_active_traders(&state.db, week_ago).await?;

    ok(AppStatistics {
        total_users,
        new_users_today,
        total_trades,
        trades_this_week,
        active_traders_this_week,
        average_trades_per_user: average_trades_per_user(total_trades, total_users),
    })
}

pub async fn list_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<AdminSetting>> {
    ok(settings_repo::list_settings(&state.db).await?)
}

pub async fn update_setting(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSettingRequest>,
) -> ApiResult<AdminSetting> {
    let setting = settings_repo::update_setting(&state.db, id, &body.setting_value)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Setting {id} not found")))?;

    tracing::info!(
        admin_id = %admin.id,
        setting_key = %setting.setting_key,
        "Admin setting updated"
    );
    ok(setting)
}
