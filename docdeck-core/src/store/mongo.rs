//! MongoDB backend

use super::DocumentStore;
use crate::error::{DeckError, DeckResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{options::ClientOptions, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Largest skip the server accepts; counts travel as signed 64-bit integers
const MAX_WIRE_COUNT: u64 = i64::MAX as u64;

/// Process-wide MongoDB client; the driver pools connections internally
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Parse the connection string and build a client
    ///
    /// No round trip happens here. The first operation waits at most
    /// `server_selection_timeout` for a usable server and fails otherwise.
    pub async fn connect(uri: &str, server_selection_timeout: Duration) -> DeckResult<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| DeckError::config(format!("Invalid MongoDB connection string: {}", e)))?;
        options.server_selection_timeout = Some(server_selection_timeout);
        if options.app_name.is_none() {
            options.app_name = Some("docdeck".to_string());
        }

        let client = Client::with_options(options).map_err(DeckError::from_source)?;
        info!(
            timeout_ms = server_selection_timeout.as_millis() as u64,
            "MongoDB client initialized"
        );
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_database_names(&self) -> DeckResult<Vec<String>> {
        self.client
            .list_database_names()
            .await
            .map_err(DeckError::from_source)
    }

    async fn list_collection_names(&self, db: &str) -> DeckResult<Vec<String>> {
        self.client
            .database(db)
            .list_collection_names()
            .await
            .map_err(DeckError::from_source)
    }

    async fn count_documents(&self, db: &str, collection: &str) -> DeckResult<u64> {
        self.client
            .database(db)
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await
            .map_err(DeckError::from_source)
    }

    async fn find_page(
        &self,
        db: &str,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> DeckResult<Vec<Document>> {
        debug!(db, collection, skip, limit, "find_page");
        let cursor = self
            .client
            .database(db)
            .collection::<Document>(collection)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(skip.min(MAX_WIRE_COUNT))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .map_err(DeckError::from_source)?;

        cursor.try_collect().await.map_err(DeckError::from_source)
    }

    async fn delete_by_id(&self, db: &str, collection: &str, id: ObjectId) -> DeckResult<u64> {
        let result = self
            .client
            .database(db)
            .collection::<Document>(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(DeckError::from_source)?;
        Ok(result.deleted_count)
    }

    async fn drop_collection(&self, db: &str, collection: &str) -> DeckResult<()> {
        self.client
            .database(db)
            .collection::<Document>(collection)
            .drop()
            .await
            .map_err(DeckError::from_source)
    }

    async fn drop_database(&self, db: &str) -> DeckResult<()> {
        self.client
            .database(db)
            .drop()
            .await
            .map_err(DeckError::from_source)
    }
}
