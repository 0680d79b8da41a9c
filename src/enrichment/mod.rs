mod backoff;
mod client;
mod enricher;

pub use backoff::BackoffSchedule;
pub use client::{HttpSongInfoClient, ProbeOutcome, SongInfoApi};
pub use enricher::{Enricher, EnrichmentOutcome};
