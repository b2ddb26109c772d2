use thiserror::Error;

/// Main error type for linkrace
#[derive(Error, Debug)]
pub enum LinkraceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (server bind, stdin)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single link-fetch attempt failed (network, status, or parse).
    /// Workers recover from this locally; it never aborts a traversal.
    #[error("Link fetch error: {0}")]
    Fetch(String),

    /// The link source was unreachable for the start article itself.
    /// Surfaced to the caller as a retriable upstream failure.
    #[error("Upstream link source unavailable: {0}")]
    Upstream(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using LinkraceError
pub type Result<T> = std::result::Result<T, LinkraceError>;
