//! Errors that stop the worker.
//!
//! Request-level failures never appear here: they are converted into
//! ordinary responses. Only a broken protocol stream ends the loop early.

use thiserror::Error;

/// Errors raised while reading requests or writing responses.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Reading a request line from stdin failed.
    #[error("failed to read request: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Writing a response line to stdout failed.
    #[error("failed to write response: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Serializing the response payload failed.
    #[error("failed to serialize response: {source}")]
    Serialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}
