//! Capture retrieval with bounded retries.
//!
//! Each capture moves through a small state machine. The archive answers
//! most failures with a 200 and a plain error page, so outcomes are decided
//! by matching the body against known markers rather than by status code.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Settings;
use crate::http_client::HttpClient;
use crate::models::CaptureRecord;
use crate::storage::CaptureStore;

/// Snapshot service could not produce the capture.
pub const JOB_FAILED_MARKER: &str = "<p>Job failed</p>";
/// Snapshot service has no capture for the URL.
pub const NOT_ARCHIVED_MARKER: &str = "<p>The Wayback Machine has not archived that URL.</p>";
/// Snapshot service is throttling this client.
pub const SESSION_LIMIT_MARKER: &str =
    "<p>You have already reached the limit of active sessions.</p>";
/// Snapshot service gateway timed out.
pub const GATEWAY_TIMEOUT_MARKER: &str = "<h1>504 Gateway Time-out</h1>";

/// Why a capture could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("empty response")]
    Empty,
    #[error("archive job failed")]
    JobFailed,
    #[error("URL not archived")]
    NotArchived,
    #[error("gave up after repeated transport errors: {0}")]
    RetriesExhausted(String),
    #[error("could not store capture: {0}")]
    Write(String),
}

/// Classification of a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyClass {
    /// The capture will never be available; do not retry.
    Missing(FailureReason),
    /// The service is overloaded; wait and retry.
    Overloaded,
    /// The archived document itself.
    Document,
}

/// Classify a snapshot response body.
pub fn classify_body(body: &str) -> BodyClass {
    if body.is_empty() {
        BodyClass::Missing(FailureReason::Empty)
    } else if body.contains(JOB_FAILED_MARKER) {
        BodyClass::Missing(FailureReason::JobFailed)
    } else if body.contains(NOT_ARCHIVED_MARKER) {
        BodyClass::Missing(FailureReason::NotArchived)
    } else if body.contains(SESSION_LIMIT_MARKER) || body.contains(GATEWAY_TIMEOUT_MARKER) {
        BodyClass::Overloaded
    } else {
        BodyClass::Document
    }
}

/// Result of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Body(BodyClass),
    Transport(String),
}

/// Per-capture fetch state. Non-terminal states carry the remaining
/// transport-error budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    /// Ready to issue a request.
    Pending(u32),
    /// A transport error occurred; wait briefly, then retry.
    RetryableError(u32),
    /// The service is overloaded; cool down, then retry.
    TransientWait(u32),
    /// The document arrived and should be stored.
    Success,
    /// No further attempts will be made.
    Failed(FailureReason),
}

impl FetchState {
    /// State after an attempt made with `budget` retries remaining.
    ///
    /// Overload responses do not consume budget. Transport errors do, and
    /// exhausting the budget fails the capture.
    pub fn after_attempt(budget: u32, attempt: Attempt) -> Self {
        match attempt {
            Attempt::Body(BodyClass::Document) => Self::Success,
            Attempt::Body(BodyClass::Missing(reason)) => Self::Failed(reason),
            Attempt::Body(BodyClass::Overloaded) => Self::TransientWait(budget),
            Attempt::Transport(error) => match budget.saturating_sub(1) {
                0 => Self::Failed(FailureReason::RetriesExhausted(error)),
                left => Self::RetryableError(left),
            },
        }
    }
}

/// Retry timings and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub overload_cooldown: Duration,
    pub transport_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            overload_cooldown: Duration::from_secs(15),
            transport_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            attempts: settings.retry_attempts,
            overload_cooldown: Duration::from_secs(settings.overload_cooldown_secs),
            transport_delay: Duration::from_secs(settings.transport_retry_delay_secs),
        }
    }
}

/// Final result for one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded and written to disk.
    Retrieved,
    /// Already on disk; no request made.
    AlreadyStored,
    Failed(FailureReason),
}

/// Notifications emitted while retrieving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalEvent {
    /// The service asked us to back off.
    Overloaded { id: u64, cooldown: Duration },
    /// A capture could not be retrieved.
    Failed { id: u64, reason: FailureReason },
    /// Running count of successful captures.
    Progress { succeeded: usize },
}

/// Counters for a retrieval run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrievalTally {
    pub retrieved: usize,
    pub already_stored: usize,
    pub failed: usize,
}

impl RetrievalTally {
    /// Captures available on disk after the run.
    pub fn succeeded(&self) -> usize {
        self.retrieved + self.already_stored
    }

    fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Retrieved => self.retrieved += 1,
            FetchOutcome::AlreadyStored => self.already_stored += 1,
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Downloads captures into a [`CaptureStore`], one at a time.
pub struct CaptureRetriever<'a> {
    client: &'a HttpClient,
    store: &'a CaptureStore,
    policy: RetryPolicy,
}

impl<'a> CaptureRetriever<'a> {
    pub fn new(client: &'a HttpClient, store: &'a CaptureStore, policy: RetryPolicy) -> Self {
        Self {
            client,
            store,
            policy,
        }
    }

    /// Retrieve one capture. Never returns an error; failures are outcomes.
    pub async fn retrieve<F>(&self, record: &CaptureRecord, on_event: &mut F) -> FetchOutcome
    where
        F: FnMut(RetrievalEvent),
    {
        let kind = record.kind();
        if self.store.contains(record.id, kind) {
            debug!("Capture {} already on disk", record.id);
            return FetchOutcome::AlreadyStored;
        }

        let mut state = FetchState::Pending(self.policy.attempts);
        let mut body = String::new();

        loop {
            state = match state {
                FetchState::Pending(budget) => {
                    let attempt = match self.client.get(&record.archive_url).await {
                        Ok(response) => {
                            let class = classify_body(&response.body);
                            body = response.body;
                            Attempt::Body(class)
                        }
                        Err(e) => {
                            debug!("Transport error fetching {}: {}", record.id, e);
                            Attempt::Transport(e.to_string())
                        }
                    };
                    FetchState::after_attempt(budget, attempt)
                }
                FetchState::RetryableError(budget) => {
                    tokio::time::sleep(self.policy.transport_delay).await;
                    FetchState::Pending(budget)
                }
                FetchState::TransientWait(budget) => {
                    on_event(RetrievalEvent::Overloaded {
                        id: record.id,
                        cooldown: self.policy.overload_cooldown,
                    });
                    tokio::time::sleep(self.policy.overload_cooldown).await;
                    FetchState::Pending(budget)
                }
                FetchState::Success => {
                    return match self.store.save(record.id, kind, &body) {
                        Ok(path) => {
                            debug!(
                                "Stored {} (captured {:?}) at {}",
                                record.id,
                                record.captured_at(),
                                path.display()
                            );
                            FetchOutcome::Retrieved
                        }
                        Err(e) => FetchOutcome::Failed(FailureReason::Write(e.to_string())),
                    };
                }
                FetchState::Failed(reason) => return FetchOutcome::Failed(reason),
            };
        }
    }

    /// Retrieve every capture in order, reporting progress every
    /// `progress_interval` successes.
    pub async fn retrieve_all<F>(
        &self,
        records: &[CaptureRecord],
        progress_interval: usize,
        mut on_event: F,
    ) -> RetrievalTally
    where
        F: FnMut(RetrievalEvent),
    {
        let mut tally = RetrievalTally::default();

        for record in records {
            let outcome = self.retrieve(record, &mut on_event).await;
            tally.record(&outcome);

            match outcome {
                FetchOutcome::Failed(reason) => {
                    on_event(RetrievalEvent::Failed {
                        id: record.id,
                        reason,
                    });
                }
                _ => {
                    let succeeded = tally.succeeded();
                    if progress_interval > 0 && succeeded % progress_interval == 0 {
                        on_event(RetrievalEvent::Progress { succeeded });
                    }
                }
            }
        }

        info!(
            "Retrieval finished: {} downloaded, {} already stored, {} failed",
            tally.retrieved, tally.already_stored, tally.failed
        );
        tally
    }
}
