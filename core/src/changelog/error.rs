//! Error types for change log store access

use thiserror::Error;

/// Failures talking to the external append-only change-record store
#[derive(Debug, Error)]
pub enum ChangeLogError {
    #[error("transport failure talking to the change log store")]
    Transport(#[from] reqwest::Error),

    #[error("change log store returned status {status}")]
    Status { status: u16 },

    #[error("change log store rejected the batch")]
    Rejected,
}
