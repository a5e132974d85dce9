//! Parse stored captures and write the final table.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::WaybackError;
use crate::extract::Extractor;
use crate::models::{CaptureRecord, ExportRow, ExtractedPost};
use crate::services::index::load_index;
use crate::storage::{AccountPaths, CaptureStore};
use crate::utils::write_csv_row;

/// Counters for a parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseTally {
    pub parsed: usize,
    pub errors: usize,
}

/// Notifications emitted while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A stored file produced no post.
    Failed { path: PathBuf, reason: String },
    /// Running count of parsed captures.
    Progress { parsed: usize },
}

/// Parse every file in the capture store.
///
/// Files whose name is not a numeric id, that cannot be read, or that match
/// no known layout are counted as errors and skipped.
pub fn parse_captures<F>(
    store: &CaptureStore,
    extractor: &Extractor,
    progress_interval: usize,
    mut on_event: F,
) -> Result<(Vec<ExtractedPost>, ParseTally), WaybackError>
where
    F: FnMut(ParseEvent),
{
    let mut posts = Vec::new();
    let mut tally = ParseTally::default();

    for capture in store.list()? {
        let result = match capture.id {
            None => Err("file name is not a post id".to_string()),
            Some(id) => fs::read_to_string(&capture.path)
                .map_err(|e| e.to_string())
                .and_then(|body| {
                    extractor
                        .extract(&body, capture.kind, ExtractedPost::new(id, capture.kind))
                        .map_err(|e| e.to_string())
                }),
        };

        match result {
            Ok(post) => {
                posts.push(post);
                tally.parsed += 1;
                if progress_interval > 0 && tally.parsed % progress_interval == 0 {
                    on_event(ParseEvent::Progress {
                        parsed: tally.parsed,
                    });
                }
            }
            Err(reason) => {
                debug!("Failed to parse {}: {}", capture.path.display(), reason);
                tally.errors += 1;
                on_event(ParseEvent::Failed {
                    path: capture.path,
                    reason,
                });
            }
        }
    }

    Ok((posts, tally))
}

/// Join posts with their index records, sorted by id.
///
/// A post whose id is not in the index has no archive URL and is dropped.
pub fn build_rows(
    handle: &str,
    posts: Vec<ExtractedPost>,
    records: &[CaptureRecord],
) -> Vec<ExportRow> {
    let urls: HashMap<u64, &str> = records
        .iter()
        .map(|r| (r.id, r.archive_url.as_str()))
        .collect();

    let mut rows: Vec<ExportRow> = posts
        .into_iter()
        .filter_map(|post| match urls.get(&post.id) {
            Some(url) => Some(ExportRow::from_post(handle, post, url)),
            None => {
                warn!("Dropping post {}: not present in the capture index", post.id);
                None
            }
        })
        .collect();

    rows.sort_by_key(|r| r.tweet_id);
    rows
}

/// Write the export table.
pub fn write_export(path: &Path, rows: &[ExportRow]) -> Result<(), WaybackError> {
    let out = render_rows(rows).map_err(|e| WaybackError::io(path, e))?;
    fs::write(path, out).map_err(|e| WaybackError::io(path, e))
}

fn render_rows(rows: &[ExportRow]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_csv_row(&mut out, ExportRow::COLUMNS)?;
    for row in rows {
        write_csv_row(&mut out, row.fields())?;
    }
    Ok(out)
}

/// Outcome of an export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub tally: ParseTally,
    pub rows: usize,
}

/// Parse an account's captures and write its export table.
///
/// Requires the raw index from a previous fetch.
pub fn export_account<F>(
    paths: &AccountPaths,
    snapshot_base: &str,
    extractor: &Extractor,
    progress_interval: usize,
    on_event: F,
) -> Result<ExportSummary, WaybackError>
where
    F: FnMut(ParseEvent),
{
    let records = load_index(paths, snapshot_base)?;
    let store = paths.capture_store()?;

    let (posts, tally) = parse_captures(&store, extractor, progress_interval, on_event)?;
    let rows = build_rows(&paths.handle, posts, &records);

    let out = paths.export_csv();
    write_export(&out, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), out.display());

    Ok(ExportSummary {
        tally,
        rows: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentKind;
    use tempfile::tempdir;

    const JSON_ID: u64 = 300_000_000_000_000_000;
    const HTML_ID: u64 = 300_000_000_000_000_001;

    fn record(id: u64) -> CaptureRecord {
        CaptureRecord {
            id,
            original_url: format!("https://twitter.com/a/status/{}", id),
            archive_url: format!("https://web.archive.org/web/2020/{}", id),
            mimetype: "text/html".to_string(),
            timestamp: "20200101000000".to_string(),
        }
    }

    #[test]
    fn parse_counts_successes_and_errors() {
        let dir = tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).unwrap();
        store
            .save(JSON_ID, ContentKind::Json, r#"{"text":"hello"}"#)
            .unwrap();
        store
            .save(
                HTML_ID,
                ContentKind::Html,
                r#"<p class="TweetTextSize--26px">hi</p>"#,
            )
            .unwrap();
        store
            .save(300_000_000_000_000_002, ContentKind::Html, "<p>layout gone</p>")
            .unwrap();
        fs::write(dir.path().join("readme.txt"), "x").unwrap();

        let mut events = Vec::new();
        let (posts, tally) =
            parse_captures(&store, &Extractor::default(), 100, |e| events.push(e)).unwrap();

        assert_eq!(tally, ParseTally { parsed: 2, errors: 2 });
        assert_eq!(posts.len(), 2);
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|e| matches!(e, ParseEvent::Failed { .. })));
    }

    #[test]
    fn parse_reports_progress() {
        let dir = tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).unwrap();
        for i in 0..4 {
            store
                .save(JSON_ID + i, ContentKind::Json, r#"{"text":"x"}"#)
                .unwrap();
        }

        let mut events = Vec::new();
        parse_captures(&store, &Extractor::default(), 2, |e| events.push(e)).unwrap();
        assert_eq!(
            events,
            vec![
                ParseEvent::Progress { parsed: 2 },
                ParseEvent::Progress { parsed: 4 }
            ]
        );
    }

    #[test]
    fn unknown_extension_parsed_as_markup() {
        let dir = tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join(format!("{}.xhtml", HTML_ID)),
            r#"<p class="TweetTextSize--26px">legacy</p>"#,
        )
        .unwrap();

        let (posts, tally) = parse_captures(&store, &Extractor::default(), 100, |_| {}).unwrap();
        assert_eq!(tally.errors, 0);
        assert_eq!(posts[0].kind, ContentKind::Html);
        assert_eq!(posts[0].text, "legacy");
    }

    #[test]
    fn rows_joined_and_sorted() {
        let mut later = ExtractedPost::new(HTML_ID, ContentKind::Html);
        later.text = "later".to_string();
        let mut earlier = ExtractedPost::new(JSON_ID, ContentKind::Json);
        earlier.text = "earlier".to_string();
        let mut orphan = ExtractedPost::new(JSON_ID + 50, ContentKind::Json);
        orphan.text = "orphan".to_string();

        let rows = build_rows(
            "jack",
            vec![later, orphan, earlier],
            &[record(JSON_ID), record(HTML_ID)],
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tweet_id, JSON_ID);
        assert_eq!(rows[0].handle, "jack");
        assert_eq!(
            rows[0].archive_url,
            format!("https://web.archive.org/web/2020/{}", JSON_ID)
        );
        assert_eq!(rows[1].text, "later");
    }

    #[test]
    fn export_table_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut post = ExtractedPost::new(JSON_ID, ContentKind::Json);
        post.text = "hello, \"world\"".to_string();
        post.reply_to_handle = Some("bob".to_string());
        let rows = build_rows("jack", vec![post], &[record(JSON_ID)]);

        write_export(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("handle,tweetID,utcTime,archiveURL,text,type,quotedHandle,quotedText,replyToHandle,retweetHandle")
        );
        assert_eq!(
            lines.next(),
            Some(
                format!(
                    "jack,{id},{utc},https://web.archive.org/web/2020/{id},\"hello, \"\"world\"\"\",json,,,bob,",
                    id = JSON_ID,
                    utc = rows[0].utc_time
                )
                .as_str()
            )
        );
    }

    #[test]
    fn export_requires_index() {
        let dir = tempdir().unwrap();
        let paths = AccountPaths::new(dir.path(), "jack");
        let err = export_account(
            &paths,
            "https://web.archive.org/web",
            &Extractor::default(),
            100,
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, WaybackError::MissingIndex(_)));
        assert!(!paths.export_csv().exists());
    }
}
