//! Wayback Machine timemap index: query construction and row parsing.

use chrono::Utc;
use thiserror::Error;

/// Timemap endpoint returning JSON rows.
pub const WAYBACK_TIMEMAP_URL: &str = "https://web.archive.org/web/timemap/json";

/// Base for snapshot URLs: `{base}/{timestamp}/{original}`.
pub const WAYBACK_SNAPSHOT_BASE: &str = "https://web.archive.org/web";

/// Fields requested from the index. Only the first three are consumed.
pub const TIMEMAP_FIELDS: &str = "original,mimetype,timestamp,endtimestamp,groupcount,uniqcount";

/// Excludes captures that recorded a client or server error.
const STATUS_FILTER: &str = "!statuscode:[45]..";

/// Upper bound on rows returned for one account.
pub const DEFAULT_ROW_LIMIT: usize = 1_000_000;

/// Listing of every capture under an account's profile URL, one row per
/// distinct URL.
#[derive(Debug, Clone)]
pub struct TimemapQuery {
    endpoint: String,
    prefix: String,
    limit: usize,
    cache_buster: Option<i64>,
}

impl TimemapQuery {
    /// Query for `{profile_base_url}/{handle}` and everything below it.
    ///
    /// A millisecond cache buster is appended so intermediaries never serve a
    /// stale listing.
    pub fn for_account(profile_base_url: &str, handle: &str) -> Self {
        Self {
            endpoint: WAYBACK_TIMEMAP_URL.to_string(),
            prefix: format!("{}/{}", profile_base_url.trim_end_matches('/'), handle),
            limit: DEFAULT_ROW_LIMIT,
            cache_buster: Some(Utc::now().timestamp_millis()),
        }
    }

    /// Point at a different timemap endpoint.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn limit(mut self, rows: usize) -> Self {
        self.limit = rows;
        self
    }

    pub fn without_cache_buster(mut self) -> Self {
        self.cache_buster = None;
        self
    }

    /// Query parameters in request order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("url", self.prefix.clone()),
            ("matchType", "prefix".to_string()),
            ("collapse", "urlkey".to_string()),
            ("output", "json".to_string()),
            ("fl", TIMEMAP_FIELDS.to_string()),
            ("filter", STATUS_FILTER.to_string()),
        ];
        if self.limit > 0 {
            params.push(("limit", self.limit.to_string()));
        }
        if let Some(ms) = self.cache_buster {
            params.push(("_", ms.to_string()));
        }
        params
    }

    /// Full request URL with percent-encoded values.
    pub fn url(&self) -> String {
        let query = self
            .params()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.endpoint, query)
    }
}

/// Errors from index response parsing.
#[derive(Debug, Error)]
pub enum CdxParseError {
    #[error("Empty index response")]
    Empty,
    #[error("Failed to parse index JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One positional index row: original URL, mime type, capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdxRow {
    pub original: String,
    pub mimetype: String,
    pub timestamp: String,
}

/// Parse an index body (array of arrays) into positional rows.
///
/// Rows with fewer than three fields are skipped. A header row, when the
/// service sends one, comes through as an ordinary row and is rejected by
/// the caller's URL filter.
pub fn parse_cdx_response(body: &str) -> Result<Vec<CdxRow>, CdxParseError> {
    if body.trim().is_empty() {
        return Err(CdxParseError::Empty);
    }

    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(body)?;

    Ok(rows
        .into_iter()
        .filter_map(|row| match row.as_slice() {
            [original, mimetype, timestamp, ..] => Some(CdxRow {
                original: field_text(original),
                mimetype: field_text(mimetype),
                timestamp: field_text(timestamp),
            }),
            _ => None,
        })
        .collect())
}

fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Snapshot URL for a capture.
pub fn build_archive_url(snapshot_base: &str, timestamp: &str, original_url: &str) -> String {
    format!(
        "{}/{}/{}",
        snapshot_base.trim_end_matches('/'),
        timestamp,
        original_url
    )
}
