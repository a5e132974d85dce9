//! Configuration management for waybacktweets using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cdx::{WAYBACK_SNAPSHOT_BASE, WAYBACK_TIMEMAP_URL};

/// Name used for config file discovery (`waybacktweets.toml`, `.yaml`, ...).
pub const CONFIG_NAME: &str = "waybacktweets";

/// Default profile URL prefix the index is queried under.
pub const DEFAULT_PROFILE_BASE_URL: &str = "https://twitter.com";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory all output files are written under.
    pub target: PathBuf,
    /// User agent config (`None`, `"impersonate"`, or a literal agent).
    pub user_agent: Option<String>,
    /// Snapshot request timeout in seconds.
    pub request_timeout: u64,
    /// Index request timeout in seconds.
    pub index_timeout: u64,
    /// Transport-error retry budget per capture.
    pub retry_attempts: u32,
    /// Wait after an overload response, in seconds.
    pub overload_cooldown_secs: u64,
    /// Wait after a transport error, in seconds.
    pub transport_retry_delay_secs: u64,
    /// Report progress every N successes.
    pub progress_interval: usize,
    /// Index (timemap) endpoint.
    pub cdx_url: String,
    /// Snapshot URL base.
    pub snapshot_base_url: String,
    /// Profile URL prefix queried in the index.
    pub profile_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: PathBuf::from("."),
            user_agent: None,
            request_timeout: 15,
            index_timeout: 120,
            retry_attempts: 3,
            overload_cooldown_secs: 15,
            transport_retry_delay_secs: 5,
            progress_interval: 100,
            cdx_url: WAYBACK_TIMEMAP_URL.to_string(),
            snapshot_base_url: WAYBACK_SNAPSHOT_BASE.to_string(),
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Snapshot request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Index request timeout.
    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.index_timeout)
    }

    /// Ensure the target directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.target).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create target directory '{}': {}",
                    self.target.display(),
                    e
                ),
            )
        })
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output directory.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "data_dir")]
    pub target: Option<String>,
    /// User agent string or `"impersonate"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Snapshot request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Index request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_timeout: Option<u64>,
    /// Transport-error retry budget per capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    /// Wait after an overload response, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overload_cooldown_secs: Option<u64>,
    /// Wait after a transport error, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_retry_delay_secs: Option<u64>,
    /// Report progress every N successes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_interval: Option<usize>,
    /// Index endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdx_url: Option<String>,
    /// Snapshot URL base override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_base_url: Option<String>,
    /// Profile URL prefix override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_base_url: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover and load a config file, falling back to defaults.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref target) = self.target {
            settings.target = self.resolve_path(target, base_dir);
        }
        if let Some(ref ua) = self.user_agent {
            settings.user_agent = Some(ua.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(timeout) = self.index_timeout {
            settings.index_timeout = timeout;
        }
        if let Some(attempts) = self.retry_attempts {
            settings.retry_attempts = attempts;
        }
        if let Some(secs) = self.overload_cooldown_secs {
            settings.overload_cooldown_secs = secs;
        }
        if let Some(secs) = self.transport_retry_delay_secs {
            settings.transport_retry_delay_secs = secs;
        }
        if let Some(interval) = self.progress_interval {
            settings.progress_interval = interval;
        }
        if let Some(ref url) = self.cdx_url {
            settings.cdx_url = url.clone();
        }
        if let Some(ref url) = self.snapshot_base_url {
            settings.snapshot_base_url = url.clone();
        }
        if let Some(ref url) = self.profile_base_url {
            settings.profile_base_url = url.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Output directory (--target flag).
    pub target: Option<PathBuf>,
}

/// Load config from the explicit path or by discovery.
async fn load_file_config(options: &LoadOptions) -> Config {
    if let Some(ref config_path) = options.config_path {
        return match Config::load_from_path(config_path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config {}: {}", config_path.display(), e);
                Config::default()
            }
        };
    }

    Config::load().await
}

/// Resolve settings from defaults, the config file, environment, and flags.
///
/// Precedence, lowest to highest: defaults, config file,
/// `WAYBACKTWEETS_*` environment variables, command-line flags.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = load_file_config(&options).await;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = config.base_dir().unwrap_or_else(|| cwd.clone());

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings, &cwd);

    if let Some(target) = options.target {
        settings.target = if target.is_absolute() {
            target
        } else {
            cwd.join(target)
        };
    }

    (settings, config)
}

fn apply_env_overrides(settings: &mut Settings, cwd: &Path) {
    if let Some(target) = env_var("WAYBACKTWEETS_TARGET") {
        tracing::debug!("Using WAYBACKTWEETS_TARGET from environment: {}", target);
        let expanded = shellexpand::tilde(&target);
        let path = Path::new(expanded.as_ref());
        settings.target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
    }

    if let Some(ua) = env_var("WAYBACKTWEETS_USER_AGENT") {
        tracing::debug!("Using WAYBACKTWEETS_USER_AGENT from environment");
        settings.user_agent = Some(ua);
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
