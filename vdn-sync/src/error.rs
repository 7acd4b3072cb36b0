use thiserror::Error;

/// Failures that abort a sync pass.
///
/// A log that cannot be decoded is not an error; see
/// [`Decoded::Unmatched`](crate::events::Decoded::Unmatched).
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid node URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to the log source failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("log source answered {status} for `{url}`")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
