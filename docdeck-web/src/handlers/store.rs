//! Store browsing and destructive-operation handlers
//!
//! Every handler here sits behind the session guard.

use super::types::{
    CollectionsQuery, CollectionsResponse, DatabasesResponse, DeleteCollectionRequest,
    DeleteDatabaseRequest, DeleteDocumentRequest, DeletedCountResponse, DocumentsQuery,
    DocumentsResponse, DroppedResponse, ErrorResponse,
};
use crate::{ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::Json,
};
use docdeck_core::PageRequest;

/// List every database name
#[utoipa::path(
    get,
    path = "/api/databases",
    tag = "Store",
    summary = "List databases",
    responses(
        (status = 200, description = "Database names, sorted", body = DatabasesResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_databases(
    State(state): State<AppState>,
) -> Result<Json<DatabasesResponse>, ApiError> {
    let databases = state
        .gateway
        .list_databases()
        .await
        .inspect_err(|e| e.log("list_databases"))?;
    Ok(Json(DatabasesResponse { databases }))
}

/// List the collections of one database
#[utoipa::path(
    get,
    path = "/api/collections",
    tag = "Store",
    summary = "List collections",
    params(CollectionsQuery),
    responses(
        (status = 200, description = "Collection names, sorted", body = CollectionsResponse),
        (status = 400, description = "Missing database name", body = ErrorResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse),
        (status = 404, description = "Database not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<CollectionsQuery>,
) -> Result<Json<CollectionsResponse>, ApiError> {
    let collections = state
        .gateway
        .list_collections(query.db.as_deref())
        .await
        .inspect_err(|e| e.log("list_collections"))?;
    Ok(Json(CollectionsResponse { collections }))
}

/// Fetch one page of documents
#[utoipa::path(
    get,
    path = "/api/docs",
    tag = "Store",
    summary = "Browse documents",
    description = "Documents are ordered by `_id` and sanitized into plain JSON. `limit` is clamped to 1..=100 and `page` to at least 1.",
    params(DocumentsQuery),
    responses(
        (status = 200, description = "One page of documents", body = DocumentsResponse),
        (status = 400, description = "Missing or malformed parameter", body = ErrorResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse),
        (status = 404, description = "Database or collection not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentsQuery>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref())?;
    let documents = state
        .gateway
        .get_documents(query.db.as_deref(), query.collection.as_deref(), page)
        .await
        .inspect_err(|e| e.log("get_documents"))?;
    Ok(Json(documents.into()))
}

/// Delete a single document by `_id`
#[utoipa::path(
    post,
    path = "/api/delete_doc",
    tag = "Store",
    summary = "Delete a document",
    description = "An identifier that matches nothing reports `deleted: 0`.",
    request_body = DeleteDocumentRequest,
    responses(
        (status = 200, description = "Number of documents removed", body = DeletedCountResponse),
        (status = 400, description = "Missing database or collection", body = ErrorResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse),
        (status = 500, description = "Malformed identifier or store failure", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_document(
    State(state): State<AppState>,
    payload: Result<Json<DeleteDocumentRequest>, JsonRejection>,
) -> Result<Json<DeletedCountResponse>, ApiError> {
    let Json(request) = payload?;
    let deleted = state
        .gateway
        .delete_document(
            request.db.as_deref(),
            request.collection.as_deref(),
            request.id.as_ref(),
        )
        .await
        .inspect_err(|e| e.log("delete_document"))?;
    Ok(Json(DeletedCountResponse { deleted }))
}

/// Drop a whole collection
#[utoipa::path(
    post,
    path = "/api/delete_collection",
    tag = "Store",
    summary = "Drop a collection",
    description = "`confirm` must repeat the collection name exactly, case included.",
    request_body = DeleteCollectionRequest,
    responses(
        (status = 200, description = "Collection dropped", body = DroppedResponse),
        (status = 400, description = "Missing name or confirmation mismatch", body = ErrorResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    payload: Result<Json<DeleteCollectionRequest>, JsonRejection>,
) -> Result<Json<DroppedResponse>, ApiError> {
    let Json(request) = payload?;
    state
        .gateway
        .delete_collection(
            request.db.as_deref(),
            request.collection.as_deref(),
            request.confirm.as_deref(),
        )
        .await
        .inspect_err(|e| e.log("delete_collection"))?;
    Ok(Json(DroppedResponse { deleted: true }))
}

/// Drop a whole database
#[utoipa::path(
    post,
    path = "/api/delete_database",
    tag = "Store",
    summary = "Drop a database",
    description = "`confirm` must repeat the database name exactly, case included.",
    request_body = DeleteDatabaseRequest,
    responses(
        (status = 200, description = "Database dropped", body = DroppedResponse),
        (status = 400, description = "Missing name or confirmation mismatch", body = ErrorResponse),
        (status = 401, description = "Not logged in or session expired", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_database(
    State(state): State<AppState>,
    payload: Result<Json<DeleteDatabaseRequest>, JsonRejection>,
) -> Result<Json<DroppedResponse>, ApiError> {
    let Json(request) = payload?;
    state
        .gateway
        .delete_database(request.db.as_deref(), request.confirm.as_deref())
        .await
        .inspect_err(|e| e.log("delete_database"))?;
    Ok(Json(DroppedResponse { deleted: true }))
}
