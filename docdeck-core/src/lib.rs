//! docdeck core
//!
//! Store capability, gateway operations, pagination and BSON sanitization for
//! the docdeck administrative panel. Nothing here knows about HTTP.

pub mod error;
pub mod gateway;
pub mod pagination;
pub mod sanitize;
pub mod store;

pub use error::{DeckError, DeckResult, ErrorKind};
pub use gateway::{parse_object_id, DocumentPage, StoreGateway};
pub use pagination::{total_pages, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
pub use sanitize::{sanitize, sanitize_document};
pub use store::{DocumentStore, MemoryStore};

#[cfg(feature = "mongodb")]
pub use store::MongoStore;

// Re-export the value model so callers share one bson version
pub use bson;
