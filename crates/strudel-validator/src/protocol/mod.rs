//! Line-delimited JSON protocol between the parent process and the worker.
//!
//! The parent writes one [`Request`] object per line to stdin. The worker
//! answers every line with exactly one [`Response`] object on stdout, echoing
//! the request `id` whenever one could be extracted. Before the first request
//! the worker emits a readiness signal (or a fatal error) with no `id`.

mod request;
mod response;


pub use request::{Request, RequestKind, RequestParseError};
pub use response::{
    EMPTY_CODE_MESSAGE, ErrorLocation, Response, ResponseWriter, UNKNOWN_REQUEST_TYPE_MESSAGE,
    ValidationResult,
};
