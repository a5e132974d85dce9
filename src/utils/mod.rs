//! Shared utility functions.
//!
//! - `csv`: CSV escaping and row writing for the index and export tables

mod csv;

pub use csv::{escape_csv, write_csv_row};
