//! Store gateway
//!
//! Translates panel operations into store calls. Named databases and
//! collections are checked against the live listings on every call that reads
//! them; nothing about existence is cached between requests because the store
//! can change underneath the panel at any time.

use crate::error::{DeckError, DeckResult};
use crate::pagination::{total_pages, PageRequest};
use crate::sanitize::sanitize_document;
use crate::store::DocumentStore;
use bson::oid::ObjectId;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One page of sanitized documents plus the numbers needed to page further
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPage {
    pub docs: Vec<serde_json::Value>,
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn DocumentStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All visible database names, sorted ascending
    pub async fn list_databases(&self) -> DeckResult<Vec<String>> {
        let mut names = self.store.list_database_names().await?;
        names.sort();
        Ok(names)
    }

    /// Collection names of an existing database, sorted ascending
    pub async fn list_collections(&self, db: Option<&str>) -> DeckResult<Vec<String>> {
        let db = required(db).ok_or_else(|| DeckError::bad_request("Missing 'db' parameter."))?;
        self.ensure_database(db).await?;

        let mut names = self.store.list_collection_names(db).await?;
        names.sort();
        Ok(names)
    }

    /// One page of a collection, ordered by `_id`
    ///
    /// Pages are computed from a count taken just before the fetch. Writes
    /// landing between two calls can shift page boundaries.
    pub async fn get_documents(
        &self,
        db: Option<&str>,
        collection: Option<&str>,
        page: PageRequest,
    ) -> DeckResult<DocumentPage> {
        let (db, collection) = match (required(db), required(collection)) {
            (Some(db), Some(collection)) => (db, collection),
            _ => {
                return Err(DeckError::bad_request(
                    "Missing 'db' or 'collection' parameter.",
                ))
            }
        };
        self.ensure_collection(db, collection).await?;

        let total_count = self.store.count_documents(db, collection).await?;
        let documents = self
            .store
            .find_page(db, collection, page.skip(), page.limit())
            .await?;
        debug!(
            db,
            collection,
            page = page.page(),
            limit = page.limit(),
            returned = documents.len(),
            total_count,
            "Fetched documents"
        );

        Ok(DocumentPage {
            docs: documents.iter().map(sanitize_document).collect(),
            page: page.page(),
            limit: page.limit(),
            total_count,
            total_pages: total_pages(total_count, page.limit()),
        })
    }

    /// Delete one document by identifier
    ///
    /// Single round trip: the database and collection are not checked first,
    /// and an identifier that matches nothing yields 0 rather than an error.
    /// `id` is taken as raw JSON so that a non-string identifier is reported
    /// as a parse failure like any other malformed one.
    pub async fn delete_document(
        &self,
        db: Option<&str>,
        collection: Option<&str>,
        id: Option<&Value>,
    ) -> DeckResult<u64> {
        let (db, collection) = require_pair(db, collection)?;
        let id = match id {
            Some(Value::String(id)) => parse_object_id(id)?,
            None | Some(Value::Null) => parse_object_id("")?,
            Some(other) => return Err(invalid_id(&other.to_string())),
        };

        let deleted = self.store.delete_by_id(db, collection, id).await?;
        info!(db, collection, id = %id, deleted, "Deleted document");
        Ok(deleted)
    }

    /// Drop a collection once `confirm` repeats its name exactly
    pub async fn delete_collection(
        &self,
        db: Option<&str>,
        collection: Option<&str>,
        confirm: Option<&str>,
    ) -> DeckResult<()> {
        let (db, collection) = require_pair(db, collection)?;
        check_confirmation(collection, confirm)?;

        self.store.drop_collection(db, collection).await?;
        warn!(db, collection, "Dropped collection");
        Ok(())
    }

    /// Drop a database once `confirm` repeats its name exactly
    pub async fn delete_database(&self, db: Option<&str>, confirm: Option<&str>) -> DeckResult<()> {
        let db = required(db).ok_or_else(|| DeckError::bad_request("Missing 'db' parameter."))?;
        check_confirmation(db, confirm)?;

        self.store.drop_database(db).await?;
        warn!(db, "Dropped database");
        Ok(())
    }

    async fn ensure_database(&self, db: &str) -> DeckResult<()> {
        let names = self.store.list_database_names().await?;
        if names.iter().any(|name| name == db) {
            Ok(())
        } else {
            Err(DeckError::not_found(format!("Database '{}' not found.", db)))
        }
    }

    async fn ensure_collection(&self, db: &str, collection: &str) -> DeckResult<()> {
        self.ensure_database(db).await?;
        let names = self.store.list_collection_names(db).await?;
        if names.iter().any(|name| name == collection) {
            Ok(())
        } else {
            Err(DeckError::not_found(format!(
                "Collection '{}' not found in '{}'.",
                collection, db
            )))
        }
    }
}

/// Parse a 24-character hex string into the store's identifier type
///
/// The text is parsed exactly as sent; surrounding whitespace is an error.
pub fn parse_object_id(id: &str) -> DeckResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| invalid_id(id))
}

fn invalid_id(id: &str) -> DeckError {
    DeckError::InvalidId {
        id: id.to_string(),
        reason: format!(
            "'{}' is not a valid ObjectId, expected a 24-character hex string",
            id
        ),
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn require_pair<'a>(
    db: Option<&'a str>,
    collection: Option<&'a str>,
) -> DeckResult<(&'a str, &'a str)> {
    match (required(db), required(collection)) {
        (Some(db), Some(collection)) => Ok((db, collection)),
        _ => Err(DeckError::bad_request(
            "Missing 'db' or 'collection' parameter.",
        )),
    }
}

/// Exact, case-sensitive comparison; a textual guard, not a capability
fn check_confirmation(resource: &str, confirm: Option<&str>) -> DeckResult<()> {
    if confirm == Some(resource) {
        Ok(())
    } else {
        warn!(resource, "Destructive operation refused: confirmation mismatch");
        Err(DeckError::bad_request("Confirmation text does not match."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use bson::doc;
    use serde_json::json;

    async fn seeded() -> (MemoryStore, StoreGateway) {
        let store = MemoryStore::new();
        store
            .insert_many("shop", "orders", (0..25).map(|i| doc! { "_id": i, "n": i }))
            .await;
        store.create_collection("shop", "customers").await;
        store.create_collection("analytics", "events").await;
        let gateway = StoreGateway::new(Arc::new(store.clone()));
        (store, gateway)
    }

    #[tokio::test]
    async fn test_list_databases_sorted() {
        let (_, gateway) = seeded().await;
        assert_eq!(gateway.list_databases().await.unwrap(), vec!["analytics", "shop"]);
    }

    #[tokio::test]
    async fn test_list_collections() {
        let (_, gateway) = seeded().await;
        assert_eq!(
            gateway.list_collections(Some("shop")).await.unwrap(),
            vec!["customers", "orders"]
        );

        let err = gateway.list_collections(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_string(), "Missing 'db' parameter.");

        let err = gateway.list_collections(Some("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = gateway.list_collections(Some("nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Database 'nope' not found.");
    }

    #[tokio::test]
    async fn test_get_documents_second_page() {
        let (_, gateway) = seeded().await;
        let page = gateway
            .get_documents(Some("shop"), Some("orders"), PageRequest::new(2, 10))
            .await
            .unwrap();

        assert_eq!(page.docs.len(), 10);
        assert_eq!(page.docs[0]["_id"], 10);
        assert_eq!(page.docs[9]["_id"], 19);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);
    }

    #[tokio::test]
    async fn test_get_documents_bounds() {
        let (_, gateway) = seeded().await;
        for limit in [1_i64, 7, 10, 25, 100] {
            for page_number in 1..=30_i64 {
                let request = PageRequest::new(page_number, limit);
                let page = gateway
                    .get_documents(Some("shop"), Some("orders"), request)
                    .await
                    .unwrap();
                let skip = request.skip();
                let expected = if skip < 25 { (25 - skip).min(request.limit()) } else { 0 };
                assert_eq!(page.docs.len() as u64, expected);
            }
        }
    }

    #[tokio::test]
    async fn test_get_documents_empty_collection() {
        let (_, gateway) = seeded().await;
        let page = gateway
            .get_documents(Some("shop"), Some("customers"), PageRequest::default())
            .await
            .unwrap();
        assert!(page.docs.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_get_documents_validation() {
        let (_, gateway) = seeded().await;

        let err = gateway
            .get_documents(Some("shop"), None, PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing 'db' or 'collection' parameter.");

        let err = gateway
            .get_documents(Some("ghost"), Some("orders"), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = gateway
            .get_documents(Some("shop"), Some("ghosts"), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Collection 'ghosts' not found in 'shop'.");
    }

    #[tokio::test]
    async fn test_delete_document() {
        let store = MemoryStore::new();
        let oid = ObjectId::new();
        store
            .insert_many("shop", "orders", vec![doc! { "_id": oid }])
            .await;
        let gateway = StoreGateway::new(Arc::new(store.clone()));

        let missing = ObjectId::new().to_hex();
        let deleted = gateway
            .delete_document(Some("shop"), Some("orders"), Some(&json!(missing)))
            .await
            .unwrap();
        assert_eq!(deleted, 0);

        let deleted = gateway
            .delete_document(Some("shop"), Some("orders"), Some(&json!(oid.to_hex())))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(store.documents("shop", "orders").await.is_empty());

        let err = gateway
            .delete_document(Some("shop"), Some("orders"), Some(&json!("not-an-id")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("not-an-id"));

        let err = gateway
            .delete_document(Some("shop"), Some("orders"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_delete_document_rejects_non_string_id() {
        let store = MemoryStore::new();
        let oid = ObjectId::new();
        store
            .insert_many("shop", "orders", vec![doc! { "_id": oid }])
            .await;
        let gateway = StoreGateway::new(Arc::new(store.clone()));

        for id in [json!(12345), json!(true), json!({ "$oid": oid.to_hex() })] {
            let err = gateway
                .delete_document(Some("shop"), Some("orders"), Some(&id))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Internal);
            assert!(matches!(err, DeckError::InvalidId { .. }));
        }

        // Missing database still wins over a bad identifier
        let err = gateway
            .delete_document(None, Some("orders"), Some(&json!(12345)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(store.documents("shop", "orders").await.len(), 1);
    }

    #[test]
    fn test_parse_object_id_is_exact() {
        let hex = "65a1f0c2e4b0a1b2c3d4e5f6";
        assert_eq!(parse_object_id(hex).unwrap().to_hex(), hex);
        assert!(parse_object_id(&format!(" {} ", hex)).is_err());
        assert!(parse_object_id(&format!("{}\n", hex)).is_err());
        assert!(parse_object_id("").is_err());
    }

    #[tokio::test]
    async fn test_delete_collection_requires_exact_confirmation() {
        let (store, gateway) = seeded().await;

        for confirm in [None, Some(""), Some("Orders"), Some("orders ")] {
            let err = gateway
                .delete_collection(Some("shop"), Some("orders"), confirm)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest);
            assert_eq!(err.to_string(), "Confirmation text does not match.");
            assert_eq!(store.count_documents("shop", "orders").await.unwrap(), 25);
        }

        gateway
            .delete_collection(Some("shop"), Some("orders"), Some("orders"))
            .await
            .unwrap();
        assert_eq!(
            gateway.list_collections(Some("shop")).await.unwrap(),
            vec!["customers"]
        );

        gateway
            .delete_collection(Some("shop"), Some("never-existed"), Some("never-existed"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_database_requires_exact_confirmation() {
        let (_, gateway) = seeded().await;

        let err = gateway
            .delete_database(Some("shop"), Some("shoP"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(gateway.list_databases().await.unwrap(), vec!["analytics", "shop"]);

        gateway.delete_database(Some("shop"), Some("shop")).await.unwrap();
        assert_eq!(gateway.list_databases().await.unwrap(), vec!["analytics"]);

        let err = gateway.delete_database(None, Some("shop")).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing 'db' parameter.");
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let (store, gateway) = seeded().await;
        store
            .set_unavailable(Some("server selection timeout".to_string()))
            .await;

        let err = gateway.list_databases().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "server selection timeout");

        let err = gateway
            .get_documents(Some("shop"), Some("orders"), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
