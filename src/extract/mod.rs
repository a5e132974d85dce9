//! Recover post content from stored captures.

mod html;
mod json;
mod text;

pub use html::{default_strategies, extract_html, ExtractionStrategy, HtmlFields};
pub use json::{extract_json, JsonFields};
pub use text::{leading_mention, retweet_handle};

use thiserror::Error;

use crate::models::{ContentKind, ExtractedPost};

/// Why a capture yielded no post.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid status payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no known page layout matched")]
    NoMatchingLayout,
}

/// Extracts posts using a fixed set of page layouts.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(default_strategies())
    }
}

impl Extractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Fill in `post` from a capture body of the given kind.
    pub fn extract(
        &self,
        body: &str,
        kind: ContentKind,
        mut post: ExtractedPost,
    ) -> Result<ExtractedPost, ExtractError> {
        match kind {
            ContentKind::Json => {
                let fields = extract_json(body)?;
                post.text = fields.text;
                post.reply_to_handle = fields.reply_to_handle;
                post.quoted_handle = fields.quoted_handle;
                post.quoted_text = fields.quoted_text;
            }
            ContentKind::Html => {
                let fields =
                    extract_html(body, &self.strategies).ok_or(ExtractError::NoMatchingLayout)?;
                post.text = fields.text;
                post.reply_to_handle = fields.reply_to_handle;
                post.quoted_handle = fields.quoted_handle;
                post.quoted_text = fields.quoted_text;
            }
        }
        post.retweet_handle = retweet_handle(&post.text);
        Ok(post)
    }
}
