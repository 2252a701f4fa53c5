//! Worker lifecycle and request loop.
//!
//! The worker moves through three states. While `Loading` it acquires the
//! compilation capability. Once `Ready` it answers one request per input
//! line, strictly in order. It ends `Terminated`, either because loading
//! failed or because stdin closed. The capability is created once by the
//! loader and owned by [`Worker`]; nothing is global.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use serde_json::Value;
use strudel_transpiler::{Transpile, TranspileOptions};
use tracing::{debug, error, info};

use crate::errors::WorkerError;
use crate::protocol::{Request, RequestKind, Response, ResponseWriter, ValidationResult};

/// Tracing target for worker events.
pub(crate) const WORKER_TARGET: &str = "validate_strudel::worker";

/// Options passed to the transpiler on every validation.
pub const VALIDATION_OPTIONS: TranspileOptions = TranspileOptions {
    wrap_async: true,
    add_return: true,
    simple_locs: true,
};

/// How the worker terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Stdin reached end-of-stream.
    InputClosed,
    /// The compilation capability could not be loaded.
    LoadFailed,
}

impl Shutdown {
    /// Returns the process exit code for this termination.
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            Self::InputClosed => ExitCode::SUCCESS,
            Self::LoadFailed => ExitCode::FAILURE,
        }
    }
}

/// Runs the whole worker lifecycle over the given streams.
///
/// Calls `load` once. On failure a single fatal response is written and
/// [`Shutdown::LoadFailed`] is returned. On success the readiness signal is
/// written, then every input line is answered until end-of-stream.
///
/// # Errors
///
/// Returns an error if reading stdin or writing a response fails.
pub fn serve<T, E, L, R, W>(load: L, input: R, output: W) -> Result<Shutdown, WorkerError>
where
    T: Transpile,
    E: Display,
    L: FnOnce() -> Result<T, E>,
    R: BufRead,
    W: Write,
{
    let mut writer = ResponseWriter::new(output);

    let transpiler = match load() {
        Ok(transpiler) => transpiler,
        Err(load_error) => {
            error!(target: WORKER_TARGET, error = %load_error, "failed to load transpiler");
            writer.write(&Response::fatal(format!(
                "failed to load transpiler: {load_error}"
            )))?;
            return Ok(Shutdown::LoadFailed);
        }
    };

    writer.write(&Response::ready())?;
    info!(target: WORKER_TARGET, "transpiler loaded, worker ready");

    Worker::new(transpiler).run(input, &mut writer)?;
    info!(target: WORKER_TARGET, "input closed, shutting down");
    Ok(Shutdown::InputClosed)
}

/// Request handler that owns the loaded compilation capability.
pub struct Worker<T> {
    transpiler: T,
}

impl<T: Transpile> Worker<T> {
    /// Creates a worker around a loaded transpiler.
    pub const fn new(transpiler: T) -> Self {
        Self { transpiler }
    }

    /// Answers every line of `input` until end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        writer: &mut ResponseWriter<W>,
    ) -> Result<(), WorkerError> {
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = input
                .read_until(b'\n', &mut buffer)
                .map_err(|source| WorkerError::Read { source })?;
            if read == 0 {
                return Ok(());
            }

            let line = String::from_utf8_lossy(strip_line_ending(&buffer));
            let response = self.handle_line(&line);
            writer.write(&response)?;
        }
    }

    /// Produces the response for one input line.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match Request::parse(line) {
            Ok(request) => self.dispatch(&request),
            Err(parse_error) => {
                debug!(target: WORKER_TARGET, error = %parse_error, "malformed request line");
                Response::parse_error(&parse_error)
            }
        }
    }

    fn dispatch(&mut self, request: &Request) -> Response {
        let id = request.id().cloned();
        match request.kind() {
            RequestKind::Validate { code } => {
                debug!(target: WORKER_TARGET, "validate request");
                Response::validation(id, self.validate(code.as_ref()))
            }
            RequestKind::Ping => {
                debug!(target: WORKER_TARGET, "ping request");
                Response::pong(id)
            }
            RequestKind::Unknown => {
                debug!(target: WORKER_TARGET, "unknown request type");
                Response::unknown_type(id)
            }
        }
    }

    /// Validates a snippet taken from a request's `code` field.
    ///
    /// Absent, `null`, non-string and empty values are rejected without
    /// invoking the transpiler.
    pub fn validate(&mut self, code: Option<&Value>) -> ValidationResult {
        let Some(snippet) = code.and_then(Value::as_str).filter(|text| !text.is_empty()) else {
            return ValidationResult::empty_code();
        };

        match self.transpiler.transpile(snippet, &VALIDATION_OPTIONS) {
            Ok(_) => ValidationResult::valid(),
            Err(compile_error) => {
                debug!(target: WORKER_TARGET, error = %compile_error, "snippet failed to compile");
                ValidationResult::failed(&compile_error)
            }
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let without_newline = line.strip_suffix(b"\n").unwrap_or(line);
    without_newline
        .strip_suffix(b"\r")
        .unwrap_or(without_newline)
}
