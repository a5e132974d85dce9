//! Capture index records.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// How a captured document is stored and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Rendered status page markup.
    Html,
    /// API payload.
    Json,
}

impl ContentKind {
    /// Classify a mime type. Anything that is not a JSON subtype is markup.
    pub fn from_mime(mime: &str) -> Self {
        let subtype = mime
            .split_once('/')
            .map(|(_, sub)| sub)
            .unwrap_or(mime)
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if subtype.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Html
        }
    }

    /// Classify a stored file extension, defaulting to markup.
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Html
        }
    }

    /// File extension and export tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One capture of a status URL, as listed by the archive index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    /// Snowflake id parsed from the status URL.
    pub id: u64,
    /// URL as originally captured.
    pub original_url: String,
    /// Snapshot URL to retrieve.
    pub archive_url: String,
    /// Mime type reported by the index.
    pub mimetype: String,
    /// Capture timestamp (`YYYYMMDDhhmmss`).
    pub timestamp: String,
}

impl CaptureRecord {
    /// Storage and parsing kind for this capture.
    pub fn kind(&self) -> ContentKind {
        ContentKind::from_mime(&self.mimetype)
    }

    /// When the archive took this capture.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        let digits = self.timestamp.get(..14)?;
        NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S")
            .ok()
            .map(|dt| dt.and_utc())
    }
}
