//! Error types for snapshot fetching

use thiserror::Error;

/// Failures from one upstream query. Every arm must be handled explicitly;
/// callers never probe response fields ad hoc.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure talking to the spawn data source")]
    Transport(#[from] reqwest::Error),

    #[error("spawn data source returned status {status}")]
    Status { status: u16 },

    #[error("spawn data response missing expected fields: {detail}")]
    MissingFields { detail: String },

    #[error("spawn data source reported an error: {message}")]
    Upstream { message: String },
}

/// Failures surfaced by the orchestrator. Only `NoFallback` is a
/// user-facing error; everything recoverable degrades to stale cache
/// before reaching the caller.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The fetch failed and no cached snapshot exists at all. Latches the
    /// orchestrator against automatic retries.
    #[error("spawn data unavailable and no cached snapshot to fall back on")]
    NoFallback(#[source] FetchError),

    /// An automatic refresh hit the latch left by a prior fatal failure.
    #[error("refresh blocked after a fatal fetch failure; explicit reset required")]
    Blocked,
}
