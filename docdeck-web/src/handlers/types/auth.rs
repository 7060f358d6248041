//! Authentication types

use serde::Deserialize;
use utoipa::ToSchema;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// The administrative password
    #[serde(default)]
    pub password: String,
}
