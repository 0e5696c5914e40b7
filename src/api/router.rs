use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected routes — Bearer token when API_TOKEN is set, plus x-user-id
    let protected = Router::new()
        // Trades
        .route("/api/trades", get(handlers::trades::list).post(handlers::trades::create))
        .route("/api/trades/:id", get(handlers::trades::detail).delete(handlers::trades::remove))
        .route("/api/trades/:id/close", post(handlers::trades::close))
        // Analytics
        .route("/api/analytics/summary", get(handlers::analytics::summary))
        .route("/api/analytics/daily", get(handlers::analytics::daily))
        .route("/api/analytics/calendar/:year", get(handlers::analytics::calendar_year))
        .route("/api/analytics/calendar/:year/:month", get(handlers::analytics::calendar_month))
        .route("/api/analytics/calendar-summary", get(handlers::analytics::calendar_summary))
        .route("/api/analytics/pnl-history", get(handlers::analytics::pnl_history))
        .route("/api/analytics/cumulative", get(handlers::analytics::cumulative))
        .route("/api/analytics/score", get(handlers::analytics::score))
        // Watchlist
        .route("/api/watchlist", get(handlers::watchlist::list).post(handlers::watchlist::add))
        .route("/api/watchlist/:id", delete(handlers::watchlist::remove))
        // Settings
        .route("/api/settings/feature-flags", get(handlers::settings::feature_flags))
        // Admin
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route("/api/admin/users/:id/admin", put(handlers::admin::set_admin))
        .route("/api/admin/users/:id/performance", get(handlers::admin::user_performance))
        .route("/api/admin/statistics", get(handlers::admin::statistics))
        .route("/api/admin/settings", get(handlers::admin::list_settings))
        .route("/api/admin/settings/:id", put(handlers::admin::update_setting))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
