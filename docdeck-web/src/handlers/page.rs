//! HTML page handlers

use crate::templates::IndexTemplate;
use crate::{ApiError, AppState};
use askama::Template;
use axum::{extract::State, response::Html};
use tracing::error;

/// Serve the single-page application shell
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let template = IndexTemplate::new(state.config.default_db.as_deref());
    template.render().map(Html).map_err(|e| {
        error!(error = %e, "Failed to render index page");
        ApiError::internal("Failed to render page")
    })
}

/// Unknown paths under `/api` answer with the JSON envelope
pub async fn api_not_found() -> ApiError {
    ApiError::not_found("Not found.")
}
