//! On-disk layout for an account's captures and tables.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::WaybackError;
use crate::models::ContentKind;

/// File locations for one account, all relative to the target directory.
///
/// `{target}/{handle}_wayback.json`, `{target}/{handle}_wayback_urls.csv`,
/// `{target}/{handle}_wayback/` and `{target}/{handle}_wayback_tweets.csv`.
#[derive(Debug, Clone)]
pub struct AccountPaths {
    pub handle: String,
    pub target: PathBuf,
}

impl AccountPaths {
    pub fn new(target: impl Into<PathBuf>, handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            target: target.into(),
        }
    }

    /// Raw index response.
    pub fn index_json(&self) -> PathBuf {
        self.target.join(format!("{}_wayback.json", self.handle))
    }

    /// Filtered candidate table.
    pub fn candidates_csv(&self) -> PathBuf {
        self.target.join(format!("{}_wayback_urls.csv", self.handle))
    }

    /// Directory of raw captures.
    pub fn capture_dir(&self) -> PathBuf {
        self.target.join(format!("{}_wayback", self.handle))
    }

    /// Final export table.
    pub fn export_csv(&self) -> PathBuf {
        self.target.join(format!("{}_wayback_tweets.csv", self.handle))
    }

    /// Open the capture store, creating its directory if needed.
    pub fn capture_store(&self) -> Result<CaptureStore, WaybackError> {
        CaptureStore::open(self.capture_dir())
    }
}

/// A stored capture found when scanning the capture directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCapture {
    pub path: PathBuf,
    /// Id parsed from the file stem, `None` when the stem is not numeric.
    pub id: Option<u64>,
    pub kind: ContentKind,
}

/// Directory of raw captures, one file per id: `{id}.{ext}`.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    dir: PathBuf,
}

impl CaptureStore {
    /// Open a store rooted at `dir`, creating the directory if missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, WaybackError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| WaybackError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a capture is stored at.
    pub fn capture_path(&self, id: u64, kind: ContentKind) -> PathBuf {
        self.dir.join(format!("{}.{}", id, kind.as_str()))
    }

    /// Whether a capture is already on disk.
    pub fn contains(&self, id: u64, kind: ContentKind) -> bool {
        self.capture_path(id, kind).exists()
    }

    /// Write a capture's body. Existing files are left untouched.
    pub fn save(&self, id: u64, kind: ContentKind, body: &str) -> Result<PathBuf, WaybackError> {
        let path = self.capture_path(id, kind);
        if path.exists() {
            debug!("Capture {} already stored at {}", id, path.display());
            return Ok(path);
        }
        fs::write(&path, body).map_err(|e| WaybackError::io(&path, e))?;
        Ok(path)
    }

    /// List stored captures, sorted by file name.
    pub fn list(&self) -> Result<Vec<StoredCapture>, WaybackError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| WaybackError::io(&self.dir, e))?;

        let mut captures = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| WaybackError::io(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
            captures.push(StoredCapture {
                id: stem.parse().ok(),
                kind: ContentKind::from_extension(ext),
                path,
            });
        }
        captures.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(captures)
    }
}
