//! Response encoding and JSONL framing.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use strudel_transpiler::TranspileError;

use crate::errors::WorkerError;

/// Message returned when a validate request carries no usable code.
pub const EMPTY_CODE_MESSAGE: &str = "Empty or invalid code";

/// Message returned for requests with a missing or unrecognised type.
pub const UNKNOWN_REQUEST_TYPE_MESSAGE: &str = "unknown request type";

/// One response line.
///
/// Serialised as the optional `id` followed by the payload's fields, e.g.
/// `{"id":1,"pong":true}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(flatten)]
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum Payload {
    /// Startup completed.
    Ready {
        /// Always `true`.
        ready: bool,
    },
    /// Ping acknowledgment.
    Pong {
        /// Always `true`.
        pong: bool,
    },
    /// Outcome of a validate request.
    Validation(ValidationResult),
    /// Startup failed; the worker exits after sending this.
    Fatal {
        /// Description of the load failure.
        error: String,
        /// Always `true`.
        fatal: bool,
    },
    /// Malformed line or unknown request type.
    Error {
        /// Description of the problem.
        error: String,
    },
}

/// Outcome of validating one snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    location: Option<ErrorLocation>,
}

/// Best-effort position of a compilation error.
///
/// Both coordinates serialise as `null` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    /// Line of the error, if known.
    pub line: Option<u32>,
    /// Column of the error, if known.
    pub column: Option<u32>,
}

impl ErrorLocation {
    /// Extracts a location from a compilation error.
    ///
    /// Each coordinate is taken from the flat `loc` position first, then
    /// from the start of the nested `location` range, independently.
    #[must_use]
    pub fn from_error(error: &TranspileError) -> Self {
        let flat = error.loc();
        let nested = error.location().map(|range| range.start);
        Self {
            line: flat.map(|loc| loc.line).or(nested.map(|loc| loc.line)),
            column: flat.map(|loc| loc.column).or(nested.map(|loc| loc.column)),
        }
    }
}

impl ValidationResult {
    /// The snippet compiled.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            location: None,
        }
    }

    /// The request carried no usable code; the compiler was not invoked.
    #[must_use]
    pub fn empty_code() -> Self {
        Self {
            valid: false,
            error: Some(EMPTY_CODE_MESSAGE.to_owned()),
            location: None,
        }
    }

    /// The compiler rejected the snippet.
    #[must_use]
    pub fn failed(error: &TranspileError) -> Self {
        Self {
            valid: false,
            error: Some(error.message().to_owned()),
            location: Some(ErrorLocation::from_error(error)),
        }
    }
}

impl Response {
    /// Readiness signal sent once after startup.
    #[must_use]
    pub const fn ready() -> Self {
        Self {
            id: None,
            payload: Payload::Ready { ready: true },
        }
    }

    /// Fatal startup failure.
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            id: None,
            payload: Payload::Fatal {
                error: message.into(),
                fatal: true,
            },
        }
    }

    /// Ping acknowledgment.
    #[must_use]
    pub const fn pong(id: Option<Value>) -> Self {
        Self {
            id,
            payload: Payload::Pong { pong: true },
        }
    }

    /// Validation outcome for a request.
    #[must_use]
    pub const fn validation(id: Option<Value>, result: ValidationResult) -> Self {
        Self {
            id,
            payload: Payload::Validation(result),
        }
    }

    /// Rejection of a request whose type is not recognised.
    #[must_use]
    pub fn unknown_type(id: Option<Value>) -> Self {
        Self {
            id,
            payload: Payload::Error {
                error: UNKNOWN_REQUEST_TYPE_MESSAGE.to_owned(),
            },
        }
    }

    /// Rejection of a line that could not be decoded.
    #[must_use]
    pub fn parse_error(detail: &impl std::fmt::Display) -> Self {
        Self {
            id: None,
            payload: Payload::Error {
                error: format!("parse error: {detail}"),
            },
        }
    }
}

/// Writer that frames responses as JSONL on an output stream.
///
/// Each response is flushed immediately so the parent sees it before the
/// worker blocks on the next read.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a writer over the given stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or flushing fails.
    pub fn write(&mut self, response: &Response) -> Result<(), WorkerError> {
        let payload = serde_json::to_string(response)
            .map_err(|source| WorkerError::Serialize { source })?;
        self.writer
            .write_all(payload.as_bytes())
            .map_err(|source| WorkerError::Write { source })?;
        self.writer
            .write_all(b"\n")
            .map_err(|source| WorkerError::Write { source })?;
        self.writer
            .flush()
            .map_err(|source| WorkerError::Write { source })
    }
}
