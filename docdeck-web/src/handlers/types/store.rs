//! Store browsing and destructive-operation types

use docdeck_core::DocumentPage;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// `GET /api/collections` query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CollectionsQuery {
    /// Database name
    pub db: Option<String>,
}

/// `GET /api/docs` query
///
/// Page and limit stay textual so that absent, blank and malformed values
/// can be told apart.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentsQuery {
    /// Database name
    pub db: Option<String>,
    /// Collection name
    pub collection: Option<String>,
    /// 1-based page number, default 1
    pub page: Option<String>,
    /// Page size, default 25, clamped to 1..=100
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabasesResponse {
    pub databases: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
}

/// One page of sanitized documents
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentsResponse {
    #[schema(value_type = Vec<Object>)]
    pub docs: Vec<serde_json::Value>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 25)]
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl From<DocumentPage> for DocumentsResponse {
    fn from(page: DocumentPage) -> Self {
        Self {
            docs: page.docs,
            page: page.page,
            limit: page.limit,
            total_count: page.total_count,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteDocumentRequest {
    pub db: Option<String>,
    pub collection: Option<String>,
    /// 24-character hex identifier; any other JSON value is a parse failure
    #[schema(value_type = Option<String>, example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteCollectionRequest {
    pub db: Option<String>,
    pub collection: Option<String>,
    /// Must equal `collection` exactly
    pub confirm: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteDatabaseRequest {
    pub db: Option<String>,
    /// Must equal `db` exactly
    pub confirm: Option<String>,
}

/// Number of documents removed by `delete_doc`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedCountResponse {
    #[schema(example = 1)]
    pub deleted: u64,
}

/// Acknowledgement of a dropped collection or database
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DroppedResponse {
    #[schema(example = true)]
    pub deleted: bool,
}
