//! Error taxonomy shared by the store backends and the gateway
//!
//! Every failure carries a caller-facing message. [`DeckError::kind`] folds the
//! variants into the three outcomes an endpoint can report.

use thiserror::Error;
use tracing::{error, warn};

pub type DeckResult<T> = Result<T, DeckError>;

/// Coarse classification used at the transport boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid parameters, confirmation mismatch
    BadRequest,
    /// A named database or collection is absent from the live store
    NotFound,
    /// Any unexpected store or transport fault
    Internal,
}

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{reason}")]
    InvalidId { id: String, reason: String },

    #[error("{message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DeckError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        DeckError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DeckError::NotFound {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        DeckError::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a backend error, keeping its text as the caller-facing message
    pub fn from_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DeckError::Store {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DeckError::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DeckError::BadRequest { .. } => ErrorKind::BadRequest,
            DeckError::NotFound { .. } => ErrorKind::NotFound,
            DeckError::InvalidId { .. } | DeckError::Store { .. } | DeckError::Config { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Log the error with a level matching its kind
    pub fn log(&self, operation: &str) {
        match self.kind() {
            ErrorKind::Internal => error!(operation, error = %self, "Store operation failed"),
            ErrorKind::BadRequest | ErrorKind::NotFound => {
                warn!(operation, error = %self, "Request rejected")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(DeckError::bad_request("x").kind(), ErrorKind::BadRequest);
        assert_eq!(DeckError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(DeckError::store("x").kind(), ErrorKind::Internal);
        assert_eq!(DeckError::config("x").kind(), ErrorKind::Internal);

        let invalid = DeckError::InvalidId {
            id: "zz".to_string(),
            reason: "'zz' is not a valid ObjectId".to_string(),
        };
        assert_eq!(invalid.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_message_is_caller_facing() {
        let err = DeckError::not_found("Database 'shop' not found.");
        assert_eq!(err.to_string(), "Database 'shop' not found.");

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "server selection timeout");
        let err = DeckError::from_source(io);
        assert_eq!(err.to_string(), "server selection timeout");
        assert!(std::error::Error::source(&err).is_some());
    }
}
