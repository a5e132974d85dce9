//! The archive command: index, retrieve, export.

use console::style;

use waybacktweets::config::Settings;
use waybacktweets::extract::Extractor;
use waybacktweets::http_client::HttpClient;
use waybacktweets::services::{
    export_account, fetch_index, CaptureRetriever, ParseEvent, RetrievalEvent, RetryPolicy,
};
use waybacktweets::storage::AccountPaths;

pub async fn cmd_archive(settings: &Settings, handle: &str) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let paths = AccountPaths::new(&settings.target, handle);
    let client = HttpClient::new(settings.request_timeout(), settings.user_agent.as_deref())?;

    let records = fetch_index(&client, settings, &paths).await?;
    println!(
        "{} {} archived posts to try",
        style("→").cyan(),
        records.len()
    );

    let store = paths.capture_store()?;
    let retriever = CaptureRetriever::new(&client, &store, RetryPolicy::from_settings(settings));
    let retrieval = retriever
        .retrieve_all(&records, settings.progress_interval, |event| match event {
            RetrievalEvent::Overloaded { cooldown, .. } => println!(
                "  {} Archive busy, sleeping {}s...",
                style("↻").cyan(),
                cooldown.as_secs()
            ),
            RetrievalEvent::Failed { id, reason } => {
                println!("  {} {}: {}", style("✗").red(), id, reason)
            }
            RetrievalEvent::Progress { succeeded } => {
                println!("  {} {} retrieved so far", style("●").cyan(), succeeded)
            }
        })
        .await;

    let extractor = Extractor::default();
    let summary = export_account(
        &paths,
        &settings.snapshot_base_url,
        &extractor,
        settings.progress_interval,
        |event| match event {
            ParseEvent::Failed { path, reason } => println!(
                "  {} {}: {}",
                style("✗").red(),
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                reason
            ),
            ParseEvent::Progress { parsed } => {
                println!("  {} {} parsed successfully", style("●").cyan(), parsed)
            }
        },
    )?;

    println!(
        "{} {} captures parsed successfully",
        style("✓").green(),
        summary.tally.parsed
    );
    println!(
        "{} {} errors or missing captures",
        style("!").yellow(),
        retrieval.failed + summary.tally.errors
    );
    println!(
        "{} Wrote {} rows to {}",
        style("→").dim(),
        summary.rows,
        paths.export_csv().display()
    );

    Ok(())
}
