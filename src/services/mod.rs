//! Pipeline stages for archiving an account.
//!
//! Each stage reports progress through an event callback so the CLI can
//! decide how to present it.

pub mod export;
pub mod index;
pub mod retrieval;

pub use export::{
    build_rows, export_account, parse_captures, write_export, ExportSummary, ParseEvent,
    ParseTally,
};
pub use index::{fetch_index, load_index, select_candidates, status_id, write_candidates};
pub use retrieval::{
    classify_body, BodyClass, CaptureRetriever, FailureReason, FetchOutcome, FetchState,
    RetrievalEvent, RetrievalTally, RetryPolicy,
};
