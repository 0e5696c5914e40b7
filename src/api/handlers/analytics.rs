use std::collections::BTreeMap;

use axum::extract::{Path, State};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{ok, ApiResult};
use crate::analytics::{
    compute_calendar_summary, compute_daily_stats, compute_monthly_rollup, compute_summary,
    compute_tracker_score, compute_yearly_rollup, cumulative_pnl, daily_pnl, return_on_capital,
    CalendarSummary, DailyPnl, DailyStats, MonthlyStats, PnlPoint, ScoreTier, TradeSummary,
    YearlyStats,
};
use crate::api::auth::CurrentUser;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::Trade;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ScoreView {
    pub score: u8,
    pub tier: ScoreTier,
    pub label: &'static str,
}

impl ScoreView {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let score = compute_tracker_score(trades);
        let tier = ScoreTier::from_score(score);
        Self {
            score,
            tier,
            label: tier.label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: TradeSummary,
    pub score: ScoreView,
}

#[derive(Debug, Serialize)]
pub struct MonthResponse {
    pub stats: MonthlyStats,
    pub days: Vec<DailyStats>,
}

#[derive(Debug, Serialize)]
pub struct CumulativeResponse {
    pub points: Vec<PnlPoint>,
    pub return_on_capital: Decimal,
}

async fn user_trades(state: &AppState, user_id: Uuid) -> Result<Vec<Trade>, AppError> {
    Ok(trade_repo::list_trades(&state.db, user_id, None).await?)
}

pub async fn summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<SummaryResponse> {
    let trades = user_trades(&state, user_id).await?;
    ok(SummaryResponse {
        summary: compute_summary(&trades),
        score: ScoreView::from_trades(&trades),
    })
}

pub async fn daily(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<BTreeMap<NaiveDate, DailyStats>> {
    let trades = user_trades(&state, user_id).await?;
    ok(compute_daily_stats(&trades))
}

pub async fn calendar_month(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<MonthResponse> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!("Invalid month {month}")));
    }

    let trades = user_trades(&state, user_id).await?;
    let daily_stats = compute_daily_stats(&trades);
    let stats = compute_monthly_rollup(&daily_stats, year, month);
    let days = daily_stats
        .into_values()
        .filter(|d| d.date.year() == year && d.date.month() == month)
        .collect();

    ok(MonthResponse { stats, days })
}

pub async fn calendar_year(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(year): Path<i32>,
) -> ApiResult<YearlyStats> {
    let trades = user_trades(&state, user_id).await?;
    ok(compute_yearly_rollup(&compute_daily_stats(&trades), year))
}

pub async fn calendar_summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Option<CalendarSummary>> {
    let trades = user_trades(&state, user_id).await?;
    ok(compute_calendar_summary(&compute_daily_stats(&trades)))
}

pub async fn pnl_history(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Vec<DailyPnl>> {
    let trades = user_trades(&state, user_id).await?;
    ok(daily_pnl(&trades))
}

pub async fn cumulative(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<CumulativeResponse> {
    let trades = user_trades(&state, user_id).await?;
    ok(CumulativeResponse {
        points: cumulative_pnl(&trades),
        return_on_capital: return_on_capital(&trades),
    })
}

pub async fn score(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<ScoreView> {
    let trades = user_trades(&state, user_id).await?;
    ok(ScoreView::from_trades(&trades))
}
