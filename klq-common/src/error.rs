//! Common error types for the lyric quiz pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the quiz pipeline stages
#[derive(Error, Debug)]
pub enum Error {
    /// An outbound dependency answered with a non-success HTTP status
    /// (or could not be reached at all)
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// A fetched dataset record could not be decoded into a song record
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The sampler exhausted its retry budget without finding a record
    #[error("No candidate found: {0}")]
    NoCandidateFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
