//! Line-delimited JSON worker that validates Strudel snippets.
//!
//! The parent process spawns `validate-strudel`, waits for the readiness
//! signal and then writes one request per line to its stdin:
//!
//! ```text
//! <- {"ready":true}
//! -> {"type":"ping","id":1}
//! <- {"id":1,"pong":true}
//! -> {"type":"validate","id":2,"code":"s(\"bd sd\")"}
//! <- {"id":2,"valid":true}
//! -> {"type":"validate","id":3,"code":"s(\"bd sd\""}
//! <- {"id":3,"valid":false,"error":"Expected \")\" (1:9)","line":1,"column":9}
//! ```
//!
//! Compilation is delegated to [`strudel_transpiler`] through the
//! [`Transpile`](strudel_transpiler::Transpile) trait, so the request loop
//! in [`worker`] can be exercised with any capability.

pub mod config;
pub mod errors;
pub mod protocol;
pub mod telemetry;
pub mod worker;

pub use config::Config;
pub use errors::WorkerError;
pub use worker::{Shutdown, VALIDATION_OPTIONS, Worker, serve};

#[cfg(test)]
mod tests;
