//! Recover an account's archived posts from the Wayback Machine.
//!
//! The pipeline lists status captures from the archive index, downloads each
//! capture once, extracts post content from whichever page layout or API
//! payload was archived, and writes a table sorted by post id.

pub mod cdx;
pub mod config;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod models;
pub mod services;
pub mod snowflake;
pub mod storage;
pub mod utils;

pub use error::WaybackError;
