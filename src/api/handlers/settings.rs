use axum::extract::State;

use super::{ok, ApiResult};
use crate::api::auth::CurrentUser;
use crate::db::settings_repo;
use crate::models::setting::FEATURE_FLAGS_KEY;
use crate::models::FeatureFlags;
use crate::AppState;

/// Feature flags visible to any signed-in user. Missing setting → defaults.
pub async fn feature_flags(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<FeatureFlags> {
    let flags = settings_repo::get_setting_by_key(&state.db, FEATURE_FLAGS_KEY)
        .await?
        .map(|s| FeatureFlags::from_setting_value(&s.setting_value))
        .unwrap_or_default();
    ok(flags)
}
