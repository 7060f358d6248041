//! Server-side rendering of the single-page shell
//!
//! The page itself is static; the only server-provided value is the default
//! database name handed to the browser script.

use askama::Template;

/// Main page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub version: String,
    /// JavaScript literal for `window.DEFAULT_DB`, already escaped for a
    /// `<script>` block
    pub default_db_json: String,
}

impl IndexTemplate {
    pub fn new(default_db: Option<&str>) -> Self {
        Self {
            title: "docdeck".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            default_db_json: script_literal(default_db),
        }
    }
}

/// Encode a value as JSON that cannot close the surrounding script element
fn script_literal(value: Option<&str>) -> String {
    serde_json::to_string(&value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
