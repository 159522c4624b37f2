//! Error types for feedly-rules.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Configuration-related errors.
///
/// All of these are fatal: they surface before any entry is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed configuration file {}: {reason}", .path.display())]
    Syntax { path: PathBuf, reason: String },

    #[error("Invalid configuration file {}: {reason}", .path.display())]
    Schema { path: PathBuf, reason: String },

    #[error("Invalid configuration value in {} for {key}: {message}", .path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        message: String,
    },

    #[error("Missing required environment variable: {0}")]
    MissingCredential(String),

    #[error("Unknown processor: {0}")]
    UnknownProcessor(String),

    #[error("Processor constructor for {expected} given {actual} config")]
    ProcessorMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the feed service (fetching saved entries).
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Feedly authentication failed: {0}")]
    Auth(String),

    #[error("Feedly request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feedly returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode Feedly response: {0}")]
    Decode(String),
}

/// Per-entry, per-rule failures.
///
/// The processing loop catches these, logs them, and moves on.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Entry {entry_id} rejected by {processor}: {reason}")]
    InvalidEntry {
        processor: String,
        entry_id: String,
        reason: String,
    },

    #[error("Upstream service {service} failed: {reason}")]
    Upstream { service: String, reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
