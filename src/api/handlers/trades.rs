use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ok, ApiResponse, ApiResult};
use crate::api::auth::CurrentUser;
use crate::db::trade_repo;
use crate::errors::AppError;
use crate::models::{NewTrade, Trade, TradeStatus};
use crate::services::journal;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloseTradeRequest {
    pub exit_price: Decimal,
    pub exit_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Trade>> {
    let status = match query.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            TradeStatus::from_db_str(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{raw}'")))?,
        ),
    };

    ok(trade_repo::list_trades(&state.db, user_id, status).await?)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<NewTrade>,
) -> Result<(StatusCode, Json<ApiResponse<Trade>>), AppError> {
    let trade = journal::create_trade(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, ok(trade)?))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Trade> {
    let trade = trade_repo::get_trade(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trade {id} not found")))?;
    ok(trade)
}

pub async fn close(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CloseTradeRequest>,
) -> ApiResult<Trade> {
    ok(journal::close_trade(&state, user_id, id, body.exit_price, body.exit_date).await?)
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    journal::delete_trade(&state, user_id, id).await?;
    ok(DeletedResponse { id })
}
