//! The Strudel transpiler and the capability trait it implements.

use crate::error::{TranspileError, TranspilerLoadError};
use crate::mini::check_pattern;
use crate::parser::{ParseResult, Parser, PatternLiteral, SyntaxFault};
use crate::position::{LocationRange, acorn_loc};

/// Options controlling a single transpilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Wrap the output in an immediately invoked async arrow function.
    pub wrap_async: bool,
    /// Return the value of the final expression statement.
    pub add_return: bool,
    /// Report syntax errors with a flat position instead of a range.
    pub simple_locs: bool,
}

/// Output of a successful transpilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpiled {
    output: String,
}

impl Transpiled {
    /// Creates a transpilation result.
    #[must_use]
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Returns the generated JavaScript.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// A compilation capability for Strudel snippets.
///
/// The worker only depends on this contract, which keeps request handling
/// testable without a real grammar.
pub trait Transpile {
    /// Compiles `code`, returning the generated output.
    ///
    /// # Errors
    ///
    /// Returns a [`TranspileError`] describing the first problem found.
    fn transpile(
        &mut self,
        code: &str,
        options: &TranspileOptions,
    ) -> Result<Transpiled, TranspileError>;
}

/// Transpiler backed by a Tree-sitter JavaScript-compatible grammar.
pub struct StrudelTranspiler {
    parser: Parser,
}

impl StrudelTranspiler {
    /// Acquires the compilation capability.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be bound to the parser.
    pub fn load() -> Result<Self, TranspilerLoadError> {
        Ok(Self {
            parser: Parser::new()?,
        })
    }
}

impl Transpile for StrudelTranspiler {
    fn transpile(
        &mut self,
        code: &str,
        options: &TranspileOptions,
    ) -> Result<Transpiled, TranspileError> {
        let parsed = self
            .parser
            .parse(code)
            .ok_or_else(|| TranspileError::new("parser produced no syntax tree"))?;

        if let Some(fault) = parsed.first_error() {
            return Err(syntax_error(code, &fault, options));
        }

        let literals = parsed.pattern_literals();
        for literal in &literals {
            check_pattern(code, literal.content.clone())?;
        }

        Ok(generate(&parsed, &literals, options))
    }
}

fn syntax_error(code: &str, fault: &SyntaxFault, options: &TranspileOptions) -> TranspileError {
    let start = acorn_loc(code, fault.byte_range.start);
    let message = match &fault.expected {
        Some(kind) => format!("Expected \"{kind}\" ({}:{})", start.line, start.column),
        None => format!("Unexpected token ({}:{})", start.line, start.column),
    };

    if options.simple_locs {
        TranspileError::at(message, start)
    } else {
        let end = acorn_loc(code, fault.byte_range.end);
        TranspileError::spanning(message, LocationRange::new(start, end))
    }
}

fn generate(
    parsed: &ParseResult<'_>,
    literals: &[PatternLiteral],
    options: &TranspileOptions,
) -> Transpiled {
    let source = parsed.source();
    let mut insertions: Vec<(usize, String)> = Vec::new();

    if options.add_return
        && let Some(start) = parsed.final_expression_start()
    {
        insertions.push((start, String::from("return ")));
    }

    for literal in literals {
        insertions.push((literal.literal.start, String::from("mini(")));
        let suffix = if options.simple_locs {
            String::from(")")
        } else {
            format!(", {}, {})", literal.literal.start, literal.literal.end)
        };
        insertions.push((literal.literal.end, suffix));
    }

    // Stable sort keeps `return ` ahead of a `mini(` at the same offset.
    insertions.sort_by_key(|(offset, _)| *offset);

    let capacity = source
        .len()
        .saturating_add(insertions.len().saturating_mul(8));
    let mut body = String::with_capacity(capacity);
    let mut cursor = 0;
    for (offset, text) in &insertions {
        body.push_str(source.get(cursor..*offset).unwrap_or_default());
        body.push_str(text);
        cursor = *offset;
    }
    body.push_str(source.get(cursor..).unwrap_or_default());

    let output = if options.wrap_async {
        format!("(async () => {{\n{body}\n}})()")
    } else {
        body
    };

    Transpiled::new(output)
}
