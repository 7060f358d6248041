//! Route definitions for the docdeck web server
//!
//! Protected routes carry the session gate as a `route_layer`, so unmatched
//! paths fall through to 404 instead of 401.

use crate::{handlers, middleware::require_session, openapi, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

/// The HTML shell
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::index))
}

/// Login and logout
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::logout))
        .route_layer(from_fn_with_state(state, require_session))
        .route("/login", post(handlers::login))
}

/// Create API routes, mounted under `/api`
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // Browsing
        .route("/databases", get(handlers::list_databases))
        .route("/collections", get(handlers::list_collections))
        .route("/docs", get(handlers::get_documents))
        // Destructive operations
        .route("/delete_doc", post(handlers::delete_document))
        .route("/delete_collection", post(handlers::delete_collection))
        .route("/delete_database", post(handlers::delete_database))
        .route_layer(from_fn_with_state(state, require_session));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/session", get(handlers::session_status))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(protected)
        .fallback(handlers::api_not_found)
}

/// Create static file routes
pub fn static_routes(static_dir: &str) -> Router<AppState> {
    Router::new().nest_service("/static", ServeDir::new(static_dir))
}
