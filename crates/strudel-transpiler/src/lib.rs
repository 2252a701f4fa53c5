//! Tree-sitter powered transpiler for Strudel live-coding snippets.
//!
//! This crate provides the compilation capability behind the
//! `validate-strudel` worker:
//!
//! - **JavaScript syntax checking** of the snippet, reporting the first
//!   error with an acorn-style location
//! - **Mini-notation checking** of double-quoted and template string
//!   literals, reporting bracket errors with a peggy-style location range
//! - **Code generation** that rewrites pattern literals into `mini(...)`
//!   calls, optionally returns the final expression and wraps the result in
//!   an async function
//!
//! # Example
//!
//! ```
//! use strudel_transpiler::{StrudelTranspiler, Transpile, TranspileOptions};
//!
//! let mut transpiler = StrudelTranspiler::load()?;
//! let options = TranspileOptions {
//!     wrap_async: true,
//!     add_return: true,
//!     simple_locs: true,
//! };
//!
//! let output = transpiler.transpile("s(\"bd sd\")", &options)?;
//! assert!(output.output().contains("mini(\"bd sd\")"));
//!
//! let error = transpiler
//!     .transpile("s(\"bd [sd\")", &options)
//!     .expect_err("unbalanced pattern");
//! assert!(error.location().is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod mini;
mod parser;
mod position;
mod transpiler;

pub use error::{TranspileError, TranspilerLoadError};
pub use position::{Loc, LocationRange};
pub use transpiler::{StrudelTranspiler, Transpile, TranspileOptions, Transpiled};

#[cfg(test)]
mod tests;
