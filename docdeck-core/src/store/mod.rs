//! Document store capability
//!
//! The gateway only ever talks to the store through [`DocumentStore`], so the
//! production driver and the in-process store are interchangeable.

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

use crate::error::DeckResult;
use async_trait::async_trait;
use bson::{oid::ObjectId, Document};

/// Client capability of an external document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of every database visible to the configured credential
    async fn list_database_names(&self) -> DeckResult<Vec<String>>;

    /// Names of the collections in `db`
    async fn list_collection_names(&self, db: &str) -> DeckResult<Vec<String>>;

    /// Unfiltered document count of a collection
    async fn count_documents(&self, db: &str, collection: &str) -> DeckResult<u64>;

    /// Documents ordered ascending by `_id`, skipping `skip`, at most `limit`
    async fn find_page(
        &self,
        db: &str,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> DeckResult<Vec<Document>>;

    /// Delete at most one document by identifier, returning the removed count
    async fn delete_by_id(&self, db: &str, collection: &str, id: ObjectId) -> DeckResult<u64>;

    /// Drop a collection; dropping a missing collection is a no-op
    async fn drop_collection(&self, db: &str, collection: &str) -> DeckResult<()>;

    /// Drop a database; dropping a missing database is a no-op
    async fn drop_database(&self, db: &str) -> DeckResult<()>;
}
