//! Page request parsing and page-count arithmetic

use crate::error::{DeckError, DeckResult};
use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;
pub const MAX_LIMIT: u64 = 100;

/// A clamped page window: `page >= 1`, `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from raw integers, clamping into range
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1) as u64,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u64,
        }
    }

    /// Build from optional query-string values
    ///
    /// Absent values take the defaults. Present values that are not integers
    /// are rejected rather than silently defaulted.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> DeckResult<Self> {
        let page = parse_param("page", page)?.unwrap_or(DEFAULT_PAGE as i64);
        let limit = parse_param("limit", limit)?.unwrap_or(DEFAULT_LIMIT as i64);
        Ok(Self::new(page, limit))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of documents before this page
    ///
    /// Saturates at `i64::MAX`, the largest offset a store can be asked for.
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

fn parse_param(name: &str, raw: Option<&str>) -> DeckResult<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| DeckError::bad_request(format!("Invalid '{}' parameter.", name))),
    }
}

/// `max(1, ceil(total_count / limit))`, and 1 for an empty collection
pub fn total_pages(total_count: u64, limit: u64) -> u64 {
    let limit = limit.max(1);
    if total_count == 0 {
        return 1;
    }
    total_count.div_ceil(limit).max(1)
}
