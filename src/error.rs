//! Error types for onboard-tour.
//!
//! Run-time degradation (an unresolvable target, a declined start) is
//! policy rather than failure; those paths log through `tracing` and
//! return nothing. The fallible surface of this crate is configuration
//! parsing.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid event binding '{input}': {reason}")]
    InvalidEventBinding { input: String, reason: String },

    #[error("Failed to parse tour options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
