//! OpenAPI specification for the docdeck web server

use axum::response::Json;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::{
    CollectionsResponse, DatabasesResponse, DeleteCollectionRequest, DeleteDatabaseRequest,
    DeleteDocumentRequest, DeletedCountResponse, DocumentsResponse, DroppedResponse,
    ErrorResponse, HealthResponse, LoginRequest, SuccessResponse,
};
use crate::session::{SessionStatus, SESSION_COOKIE};

/// Main OpenAPI specification for the docdeck web server
#[derive(OpenApi)]
#[openapi(
    info(
        title = "docdeck API",
        description = "Administrative panel for a document database",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Health endpoints
        crate::handlers::health_check,

        // Session
        crate::handlers::login,
        crate::handlers::logout,
        crate::handlers::session_status,

        // Browsing
        crate::handlers::list_databases,
        crate::handlers::list_collections,
        crate::handlers::get_documents,

        // Destructive operations
        crate::handlers::delete_document,
        crate::handlers::delete_collection,
        crate::handlers::delete_database,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            SuccessResponse,
            LoginRequest,
            SessionStatus,
            DatabasesResponse,
            CollectionsResponse,
            DocumentsResponse,
            DeleteDocumentRequest,
            DeleteCollectionRequest,
            DeleteDatabaseRequest,
            DeletedCountResponse,
            DroppedResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Session", description = "Login, logout and session status"),
        (name = "Store", description = "Browse and delete databases, collections and documents"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Session cookie security scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> serde_json::Result<String> {
    ApiDoc::openapi().to_pretty_json()
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
