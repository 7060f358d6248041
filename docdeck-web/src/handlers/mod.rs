//! HTTP request handlers for the docdeck web server
//!
//! This module contains all the HTTP request handlers organized by functionality.

pub mod auth;
pub mod health;
pub mod page;
pub mod store;
pub mod types;

// Re-export all handler functions
pub use auth::*;
pub use health::*;
pub use page::*;
pub use store::*;

// Re-export all types for convenience
pub use types::*;
