//! Command-line interface.

mod archive;

use std::path::PathBuf;

use clap::Parser;

use waybacktweets::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "wbtweets")]
#[command(about = "Recover an account's archived posts from the Wayback Machine")]
#[command(version)]
pub struct Cli {
    /// Account handle, without the leading @
    handle: String,

    /// Output directory (overrides config file)
    #[arg(long, short = 't')]
    target: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        target: cli.target,
    };
    let (settings, config) = load_settings_with_options(options).await;
    if let Some(ref path) = config.source_path {
        tracing::info!("Using config {}", path.display());
    }

    archive::cmd_archive(&settings, cli.handle.trim_start_matches('@')).await
}
