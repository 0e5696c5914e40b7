use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ok, ApiResult};
use crate::api::auth::CurrentUser;
use crate::db::watchlist_repo;
use crate::errors::AppError;
use crate::models::WatchlistEntry;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddSymbolRequest {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Vec<WatchlistEntry>> {
    ok(watchlist_repo::list_entries(&state.db, user_id).await?)
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<AddSymbolRequest>,
) -> ApiResult<WatchlistEntry> {
    let symbol = body.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }

    let entry = watchlist_repo::add_entry(&state.db, user_id, &symbol).await?;
    tracing::info!(user_id = %user_id, symbol = %entry.symbol, "Watchlist symbol added");
    ok(entry)
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<RemovedResponse> {
    if watchlist_repo::remove_entry(&state.db, user_id, id).await? == 0 {
        return Err(AppError::NotFound(format!("Watchlist entry {id} not found")));
    }
    ok(RemovedResponse { id })
}
