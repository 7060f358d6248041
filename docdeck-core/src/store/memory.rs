//! In-process document store
//!
//! Holds `database -> collection -> documents` behind a single async lock and
//! reproduces the observable behaviour of the real store that the gateway
//! depends on: `_id` assignment, `_id` ordering and the disappearance of
//! databases that no longer hold any collection.

use super::DocumentStore;
use crate::error::{DeckError, DeckResult};
use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Collections = BTreeMap<String, Vec<Document>>;

#[derive(Default)]
struct Inner {
    databases: BTreeMap<String, Collections>,
    unavailable: Option<String>,
}

impl Inner {
    fn check_available(&self) -> DeckResult<()> {
        match &self.unavailable {
            Some(message) => Err(DeckError::store(message.clone())),
            None => Ok(()),
        }
    }
}

/// Cheaply cloneable handle to a shared in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection, creating its database as needed
    pub async fn create_collection(&self, db: &str, collection: &str) {
        let mut inner = self.inner.write().await;
        inner
            .databases
            .entry(db.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();
    }

    /// Insert documents, assigning an `ObjectId` to any without `_id`
    ///
    /// Returns the identifiers of the inserted documents in order.
    pub async fn insert_many<I>(&self, db: &str, collection: &str, documents: I) -> Vec<Bson>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut inner = self.inner.write().await;
        let target = inner
            .databases
            .entry(db.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        let mut ids = Vec::new();
        for mut document in documents {
            if !document.contains_key("_id") {
                let mut with_id = Document::new();
                with_id.insert("_id", ObjectId::new());
                for (key, value) in document {
                    with_id.insert(key, value);
                }
                document = with_id;
            }
            if let Some(id) = document.get("_id") {
                ids.push(id.clone());
            }
            target.push(document);
        }
        ids
    }

    /// Make every subsequent operation fail with `message`, or recover with `None`
    pub async fn set_unavailable(&self, message: Option<String>) {
        self.inner.write().await.unavailable = message;
    }

    /// Snapshot of a collection's documents in insertion order
    pub async fn documents(&self, db: &str, collection: &str) -> Vec<Document> {
        let inner = self.inner.read().await;
        inner
            .databases
            .get(db)
            .and_then(|collections| collections.get(collection))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_database_names(&self) -> DeckResult<Vec<String>> {
        let inner = self.inner.read().await;
        inner.check_available()?;
        Ok(inner
            .databases
            .iter()
            .filter(|(_, collections)| !collections.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn list_collection_names(&self, db: &str) -> DeckResult<Vec<String>> {
        let inner = self.inner.read().await;
        inner.check_available()?;
        Ok(inner
            .databases
            .get(db)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_documents(&self, db: &str, collection: &str) -> DeckResult<u64> {
        let inner = self.inner.read().await;
        inner.check_available()?;
        Ok(inner
            .databases
            .get(db)
            .and_then(|collections| collections.get(collection))
            .map(|documents| documents.len() as u64)
            .unwrap_or(0))
    }

    async fn find_page(
        &self,
        db: &str,
        collection: &str,
        skip: u64,
        limit: u64,
    ) -> DeckResult<Vec<Document>> {
        let inner = self.inner.read().await;
        inner.check_available()?;
        let Some(documents) = inner
            .databases
            .get(db)
            .and_then(|collections| collections.get(collection))
        else {
            return Ok(Vec::new());
        };

        let mut sorted: Vec<&Document> = documents.iter().collect();
        sorted.sort_by(|a, b| compare_bson(a.get("_id"), b.get("_id")));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(sorted.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn delete_by_id(&self, db: &str, collection: &str, id: ObjectId) -> DeckResult<u64> {
        let mut inner = self.inner.write().await;
        inner.check_available()?;
        let Some(documents) = inner
            .databases
            .get_mut(db)
            .and_then(|collections| collections.get_mut(collection))
        else {
            return Ok(0);
        };

        let target = Bson::ObjectId(id);
        match documents
            .iter()
            .position(|document| document.get("_id") == Some(&target))
        {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn drop_collection(&self, db: &str, collection: &str) -> DeckResult<()> {
        let mut inner = self.inner.write().await;
        inner.check_available()?;
        if let Some(collections) = inner.databases.get_mut(db) {
            collections.remove(collection);
            if collections.is_empty() {
                inner.databases.remove(db);
            }
        }
        Ok(())
    }

    async fn drop_database(&self, db: &str) -> DeckResult<()> {
        let mut inner = self.inner.write().await;
        inner.check_available()?;
        inner.databases.remove(db);
        Ok(())
    }
}

/// Rank of a BSON type in the store's cross-type sort order
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 13,
        _ => 12,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

/// Total order over optional `_id` values; a missing `_id` sorts first
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };

    let by_rank = type_rank(a).cmp(&type_rank(b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }

    match (a, b) {
        (Bson::String(x) | Bson::Symbol(x), Bson::String(y) | Bson::Symbol(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.timestamp_millis().cmp(&y.timestamp_millis()),
        (Bson::Binary(x), Bson::Binary(y)) => x.bytes.cmp(&y.bytes),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => {
            (x.time, x.increment).cmp(&(y.time, y.increment))
        }
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}
