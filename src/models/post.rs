//! Extracted posts and export rows.

use super::ContentKind;
use crate::snowflake::{format_utc_ms, snowflake_to_utc_ms};

/// Structured content recovered from one archived document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPost {
    pub id: u64,
    /// Creation time derived from the id, Unix milliseconds.
    pub utc_ms: i64,
    pub kind: ContentKind,
    pub text: String,
    pub quoted_handle: Option<String>,
    pub quoted_text: Option<String>,
    pub reply_to_handle: Option<String>,
    pub retweet_handle: Option<String>,
}

impl ExtractedPost {
    /// Start a record with only the id-derived fields populated.
    pub fn new(id: u64, kind: ContentKind) -> Self {
        Self {
            id,
            utc_ms: snowflake_to_utc_ms(id),
            kind,
            text: String::new(),
            quoted_handle: None,
            quoted_text: None,
            reply_to_handle: None,
            retweet_handle: None,
        }
    }
}

/// One line of the final table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub handle: String,
    pub tweet_id: u64,
    pub utc_time: String,
    pub archive_url: String,
    pub text: String,
    pub kind: ContentKind,
    pub quoted_handle: String,
    pub quoted_text: String,
    pub reply_to_handle: String,
    pub retweet_handle: String,
}

impl ExportRow {
    /// Column headers, in output order.
    pub const COLUMNS: [&'static str; 10] = [
        "handle",
        "tweetID",
        "utcTime",
        "archiveURL",
        "text",
        "type",
        "quotedHandle",
        "quotedText",
        "replyToHandle",
        "retweetHandle",
    ];

    /// Combine an extracted post with its archive URL and owning handle.
    pub fn from_post(handle: &str, post: ExtractedPost, archive_url: &str) -> Self {
        Self {
            handle: handle.to_string(),
            tweet_id: post.id,
            utc_time: format_utc_ms(post.utc_ms),
            archive_url: archive_url.to_string(),
            text: post.text,
            kind: post.kind,
            quoted_handle: post.quoted_handle.unwrap_or_default(),
            quoted_text: post.quoted_text.unwrap_or_default(),
            reply_to_handle: post.reply_to_handle.unwrap_or_default(),
            retweet_handle: post.retweet_handle.unwrap_or_default(),
        }
    }

    /// Field values in `COLUMNS` order.
    pub fn fields(&self) -> [String; 10] {
        [
            self.handle.clone(),
            self.tweet_id.to_string(),
            self.utc_time.clone(),
            self.archive_url.clone(),
            self.text.clone(),
            self.kind.to_string(),
            self.quoted_handle.clone(),
            self.quoted_text.clone(),
            self.reply_to_handle.clone(),
            self.retweet_handle.clone(),
        ]
    }
}
