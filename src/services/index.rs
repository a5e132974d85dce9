//! Capture index: list an account's archived status pages.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::cdx::{build_archive_url, parse_cdx_response, CdxRow, TimemapQuery};
use crate::config::Settings;
use crate::error::WaybackError;
use crate::http_client::HttpClient;
use crate::models::CaptureRecord;
use crate::snowflake::is_snowflake;
use crate::storage::AccountPaths;
use crate::utils::write_csv_row;

/// Path segment that precedes a post id in a status URL.
pub const STATUS_MARKER: &str = "/status/";

/// Column headers of the candidate table.
pub const CANDIDATE_COLUMNS: [&str; 5] = ["tweetURL", "mime", "t", "id", "archiveURL"];

/// Extract the post id from a status URL.
///
/// Everything after the last `/status/` must be ASCII digits and the value
/// must be a snowflake id.
pub fn status_id(url: &str) -> Option<u64> {
    let (_, tail) = url.rsplit_once(STATUS_MARKER)?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok().filter(|id| is_snowflake(*id))
}

/// Turn raw index rows into capture records.
///
/// Rows are kept in index order; an id seen earlier in the listing is skipped.
pub fn select_candidates(rows: Vec<CdxRow>, snapshot_base: &str) -> Vec<CaptureRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in rows {
        let Some(id) = status_id(&row.original) else {
            continue;
        };
        if !seen.insert(id) {
            debug!("Duplicate capture for {} at {}", id, row.original);
            continue;
        }
        records.push(CaptureRecord {
            id,
            archive_url: build_archive_url(snapshot_base, &row.timestamp, &row.original),
            original_url: row.original,
            mimetype: row.mimetype,
            timestamp: row.timestamp,
        });
    }

    records
}

/// Write the candidate table.
pub fn write_candidates(path: &Path, records: &[CaptureRecord]) -> Result<(), WaybackError> {
    let out = render_candidates(records).map_err(|e| WaybackError::io(path, e))?;
    fs::write(path, out).map_err(|e| WaybackError::io(path, e))
}

fn render_candidates(records: &[CaptureRecord]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_csv_row(&mut out, CANDIDATE_COLUMNS)?;
    for r in records {
        let id = r.id.to_string();
        write_csv_row(
            &mut out,
            [
                r.original_url.as_str(),
                r.mimetype.as_str(),
                r.timestamp.as_str(),
                id.as_str(),
                r.archive_url.as_str(),
            ],
        )?;
    }
    Ok(out)
}

/// Load capture records from a previously saved raw index.
pub fn load_index(
    paths: &AccountPaths,
    snapshot_base: &str,
) -> Result<Vec<CaptureRecord>, WaybackError> {
    let path = paths.index_json();
    if !path.exists() {
        return Err(WaybackError::MissingIndex(path));
    }
    let body = fs::read_to_string(&path).map_err(|e| WaybackError::io(&path, e))?;
    let rows = parse_cdx_response(&body)?;
    Ok(select_candidates(rows, snapshot_base))
}

/// Query the archive index for an account, persist it, and return the
/// candidate captures in index order.
pub async fn fetch_index(
    client: &HttpClient,
    settings: &Settings,
    paths: &AccountPaths,
) -> Result<Vec<CaptureRecord>, WaybackError> {
    let url = TimemapQuery::for_account(&settings.profile_base_url, &paths.handle)
        .endpoint(&settings.cdx_url)
        .url();
    info!("Fetching capture index for {}", paths.handle);
    debug!("Index query: {}", url);

    let response = client
        .get_with_timeout(&url, settings.index_timeout())
        .await?;
    if !response.is_success() {
        warn!(
            "Index request for {} returned HTTP {}",
            paths.handle, response.status
        );
    }

    let raw_path = paths.index_json();
    fs::write(&raw_path, &response.body).map_err(|e| WaybackError::io(&raw_path, e))?;

    let rows = parse_cdx_response(&response.body)?;
    let total = rows.len();
    let records = select_candidates(rows, &settings.snapshot_base_url);
    info!(
        "{} of {} index rows are status captures for {}",
        records.len(),
        total,
        paths.handle
    );

    write_candidates(&paths.candidates_csv(), &records)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdx::WAYBACK_SNAPSHOT_BASE;
    use crate::snowflake::MIN_SNOWFLAKE_ID;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn row(url: &str) -> CdxRow {
        CdxRow {
            original: url.to_string(),
            mimetype: "text/html".to_string(),
            timestamp: "20200101000000".to_string(),
        }
    }

    #[test]
    fn status_id_threshold_boundaries() {
        let at = format!("https://twitter.com/a/status/{}", MIN_SNOWFLAKE_ID);
        let below = format!("https://twitter.com/a/status/{}", MIN_SNOWFLAKE_ID - 1);
        assert_eq!(status_id(&at), Some(MIN_SNOWFLAKE_ID));
        assert_eq!(status_id(&below), None);
    }

    #[test]
    fn status_id_rejects_non_numeric() {
        assert_eq!(status_id("https://twitter.com/a/status/abc"), None);
        assert_eq!(
            status_id("https://twitter.com/a/status/300000000000000000/photo/1"),
            None
        );
        assert_eq!(
            status_id("https://twitter.com/a/status/300000000000000000?s=20"),
            None
        );
        assert_eq!(status_id("https://twitter.com/a/status/"), None);
        assert_eq!(status_id("https://twitter.com/a/statuses/300000000000000000"), None);
        assert_eq!(status_id("https://twitter.com/a"), None);
    }

    #[test]
    fn status_id_uses_last_marker() {
        assert_eq!(
            status_id("https://twitter.com/a/status/1/status/300000000000000000"),
            Some(300_000_000_000_000_000)
        );
    }

    #[test]
    fn status_id_rejects_overflow() {
        assert_eq!(
            status_id("https://twitter.com/a/status/99999999999999999999999"),
            None
        );
    }

    #[test]
    fn select_candidates_filters_and_dedupes() {
        let rows = vec![
            row("original"),
            row("https://twitter.com/a/status/300000000000000000"),
            row("https://twitter.com/a/status/12345"),
            row("https://twitter.com/a/following"),
            row("http://twitter.com/a/status/300000000000000000"),
            row("https://twitter.com/a/status/400000000000000000"),
        ];

        let records = select_candidates(rows, WAYBACK_SNAPSHOT_BASE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 300_000_000_000_000_000);
        assert_eq!(
            records[0].archive_url,
            "https://web.archive.org/web/20200101000000/https://twitter.com/a/status/300000000000000000"
        );
        assert_eq!(records[1].id, 400_000_000_000_000_000);
    }

    #[test]
    fn candidates_table_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a_wayback_urls.csv");
        let records = select_candidates(
            vec![row("https://twitter.com/a/status/300000000000000000")],
            "https://web.archive.org/web",
        );
        write_candidates(&path, &records).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("tweetURL,mime,t,id,archiveURL"));
        assert_eq!(
            lines.next(),
            Some("https://twitter.com/a/status/300000000000000000,text/html,20200101000000,300000000000000000,https://web.archive.org/web/20200101000000/https://twitter.com/a/status/300000000000000000")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn load_index_requires_prior_fetch() {
        let dir = tempdir().unwrap();
        let paths = AccountPaths::new(dir.path(), "nobody");
        assert!(matches!(
            load_index(&paths, WAYBACK_SNAPSHOT_BASE),
            Err(WaybackError::MissingIndex(_))
        ));
    }

    #[tokio::test]
    async fn fetch_index_persists_raw_and_candidates() {
        let server = MockServer::start().await;
        let body = r#"[
            ["original","mimetype","timestamp","endtimestamp","groupcount","uniqcount"],
            ["https://twitter.com/jack/status/300000000000000000","application/json","20130301000000","20130301000000","1","1"],
            ["https://twitter.com/jack/status/20","text/html","20070301000000","20070301000000","1","1"]
        ]"#;
        Mock::given(method("GET"))
            .and(path("/web/timemap/json"))
            .and(query_param("matchType", "prefix"))
            .and(query_param("url", "https://twitter.com/jack"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let settings = Settings {
            cdx_url: format!("{}/web/timemap/json", server.uri()),
            snapshot_base_url: format!("{}/web", server.uri()),
            ..Settings::default()
        };
        let paths = AccountPaths::new(dir.path(), "jack");
        let client = HttpClient::new(settings.request_timeout(), None).unwrap();

        let records = fetch_index(&client, &settings, &paths).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mimetype, "application/json");
        assert_eq!(
            records[0].archive_url,
            format!(
                "{}/web/20130301000000/https://twitter.com/jack/status/300000000000000000",
                server.uri()
            )
        );

        assert_eq!(fs::read_to_string(paths.index_json()).unwrap(), body);
        assert!(paths.candidates_csv().exists());

        let reloaded = load_index(&paths, &settings.snapshot_base_url).unwrap();
        assert_eq!(reloaded, records);
    }

    #[tokio::test]
    async fn fetch_index_malformed_body_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let settings = Settings {
            cdx_url: format!("{}/web/timemap/json", server.uri()),
            ..Settings::default()
        };
        let paths = AccountPaths::new(dir.path(), "jack");
        let client = HttpClient::new(settings.request_timeout(), None).unwrap();

        let err = fetch_index(&client, &settings, &paths).await.unwrap_err();
        assert!(matches!(err, WaybackError::Index(_)));
        assert!(!paths.candidates_csv().exists());
    }
}
