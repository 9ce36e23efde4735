use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes, require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Markets
        .route(
            "/api/markets",
            get(handlers::markets::list).post(handlers::markets::create),
        )
        .route("/api/markets/active", get(handlers::markets::list_active))
        .route("/api/markets/:id", get(handlers::markets::detail))
        .route("/api/markets/:id/activate", post(handlers::markets::activate))
        .route("/api/markets/:id/resolve", post(handlers::markets::resolve))
        .route("/api/markets/:id/cancel", post(handlers::markets::cancel))
        .route("/api/markets/:id/odds", get(handlers::markets::odds))
        // Bets and predictions
        .route("/api/markets/:id/bets", post(handlers::predictions::place_bet))
        .route(
            "/api/markets/:id/predictions",
            get(handlers::predictions::list_for_market),
        )
        .route("/api/predictions/:id", get(handlers::predictions::detail))
        .route(
            "/api/predictions/:id/claim",
            post(handlers::predictions::claim),
        )
        // Profiles
        .route("/api/creators", post(handlers::profiles::register_creator))
        .route("/api/creators/:id", get(handlers::profiles::creator_detail))
        .route("/api/users", post(handlers::profiles::register_user))
        .route("/api/users/:id", get(handlers::profiles::user_detail))
        .route(
            "/api/users/:id/predictions",
            get(handlers::predictions::list_for_user),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // CORS: the API is consumed by browser frontends on other origins
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
