//! Data models for archived posts.

mod capture;
mod post;

pub use capture::{CaptureRecord, ContentKind};
pub use post::{ExportRow, ExtractedPost};
