//! Common error types for SESA

use thiserror::Error;

/// Common result type for SESA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the assessment pipeline.
///
/// Acquisition, Recognition and Database errors are fatal for the
/// assessment that raised them. Feedback errors are recovered locally by
/// the orchestrator (placeholder text) and never reach callers as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading/validation error, including missing
    /// external-service credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio acquisition failure (upload decode, URL fetch, conversion)
    #[error("Audio acquisition error: {0}")]
    Acquisition(String),

    /// Recognizer failure, including no-speech-detected results
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// Narrative feedback generation failure (recoverable)
    #[error("Feedback generation error: {0}")]
    Feedback(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
