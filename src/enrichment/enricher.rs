//! Retry driver over [`SongInfoApi`] probes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::backoff::BackoffSchedule;
use super::client::{ProbeOutcome, SongInfoApi};
use crate::library_store::SongDetail;

/// Terminal result of an enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Succeeded(SongDetail),
    /// The upstream rejected the identifying fields, never retried.
    FailedClient,
    /// Every attempt in the budget ended in an upstream server error.
    FailedServer,
    /// Transport failure (no status) or a status outside the service contract.
    FailedUnexpected { status: Option<u16>, detail: String },
}

enum RunState {
    Attempting(u32),
    Backoff(u32, Duration),
    Done(EnrichmentOutcome),
}

/// Drives repeated probes with bounded, deterministic backoff. Only server
/// errors consume the retry budget; every other outcome is terminal on the
/// first sighting. A backoff sleep follows each server error, including the
/// last one before giving up.
pub struct Enricher {
    api: Arc<dyn SongInfoApi>,
    schedule: BackoffSchedule,
    max_attempts: u32,
}

impl Enricher {
    pub fn new(api: Arc<dyn SongInfoApi>, schedule: BackoffSchedule, max_attempts: u32) -> Self {
        Self {
            api,
            schedule,
            max_attempts,
        }
    }

    pub async fn enrich(&self, author: &str, title: &str) -> EnrichmentOutcome {
        let mut state = RunState::Attempting(1);
        loop {
            state = match state {
                RunState::Attempting(attempt) => {
                    match self.api.fetch_detail(author, title).await {
                        ProbeOutcome::Found(detail) => {
                            debug!("Song info found for {} - {}", author, title);
                            RunState::Done(EnrichmentOutcome::Succeeded(detail))
                        }
                        ProbeOutcome::Rejected => {
                            debug!("Song info api rejected {} - {}", author, title);
                            RunState::Done(EnrichmentOutcome::FailedClient)
                        }
                        ProbeOutcome::Unavailable => {
                            let delay = self.schedule.delay_for(attempt);
                            warn!(
                                "Song info api server error on attempt {}/{}, backing off for {:?}",
                                attempt, self.max_attempts, delay
                            );
                            RunState::Backoff(attempt, delay)
                        }
                        ProbeOutcome::Unexpected(status) => {
                            warn!("Song info api returned unsupported status {}", status);
                            RunState::Done(EnrichmentOutcome::FailedUnexpected {
                                status: Some(status),
                                detail: format!("unsupported status code {}", status),
                            })
                        }
                        ProbeOutcome::Failed(detail) => {
                            warn!("Song info api request failed: {}", detail);
                            RunState::Done(EnrichmentOutcome::FailedUnexpected {
                                status: None,
                                detail,
                            })
                        }
                    }
                }
                RunState::Backoff(attempt, delay) => {
                    tokio::time::sleep(delay).await;
                    if attempt >= self.max_attempts {
                        RunState::Done(EnrichmentOutcome::FailedServer)
                    } else {
                        RunState::Attempting(attempt + 1)
                    }
                }
                RunState::Done(outcome) => return outcome,
            };
        }
    }
}
