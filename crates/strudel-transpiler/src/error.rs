//! Error types for loading and running the transpiler.
//!
//! Loading failures are infrastructure errors and end the worker. Compilation
//! failures are ordinary domain data: they carry a message and whichever
//! location shape the failing stage produced.

use thiserror::Error;

use crate::position::{Loc, LocationRange};

/// Errors raised while acquiring the compilation capability.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranspilerLoadError {
    /// The Tree-sitter grammar could not be bound to the parser.
    #[error("failed to initialise {grammar} grammar: {message}")]
    GrammarInit {
        /// Name of the grammar that failed to load.
        grammar: &'static str,
        /// Description of the failure.
        message: String,
    },
}

impl TranspilerLoadError {
    /// Creates a grammar initialisation error.
    #[must_use]
    pub fn grammar_init(grammar: &'static str, message: impl Into<String>) -> Self {
        Self::GrammarInit {
            grammar,
            message: message.into(),
        }
    }
}

/// A compilation failure reported by the transpiler.
///
/// JavaScript syntax errors carry a flat [`Loc`] when simplified locations
/// were requested and a [`LocationRange`] otherwise. Mini-notation errors
/// always carry a [`LocationRange`]. Callers should treat both fields as
/// optional and independent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TranspileError {
    message: String,
    loc: Option<Loc>,
    location: Option<LocationRange>,
}

impl TranspileError {
    /// Creates an error without location information.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            loc: None,
            location: None,
        }
    }

    /// Creates an error pinned to a single position.
    #[must_use]
    pub fn at(message: impl Into<String>, loc: Loc) -> Self {
        Self {
            message: message.into(),
            loc: Some(loc),
            location: None,
        }
    }

    /// Creates an error covering a source range.
    #[must_use]
    pub fn spanning(message: impl Into<String>, location: LocationRange) -> Self {
        Self {
            message: message.into(),
            loc: None,
            location: Some(location),
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the flat position, if the error carries one.
    #[must_use]
    pub const fn loc(&self) -> Option<Loc> {
        self.loc
    }

    /// Returns the location range, if the error carries one.
    #[must_use]
    pub const fn location(&self) -> Option<LocationRange> {
        self.location
    }
}
