//! Type definitions for handlers
//!
//! This module contains all the request/response types used by the handlers.

pub mod auth;
pub mod common;
pub mod store;

// Re-export all types for convenience
pub use auth::*;
pub use common::*;
pub use store::*;
