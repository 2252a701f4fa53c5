//! Source positions and conversion helpers.
//!
//! Tree-sitter reports byte offsets. Users see character columns, so both
//! conventions used by Strudel tooling are derived from the source text:
//! acorn-style (1-based line, 0-based column) for JavaScript errors and
//! peggy-style (1-based line and column) for mini-notation errors.

/// A single position in a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loc {
    /// Line number (one-based).
    pub line: u32,
    /// Column number. Zero- or one-based depending on the producer.
    pub column: u32,
}

impl Loc {
    /// Creates a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A start/end pair of positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRange {
    /// First position covered by the range.
    pub start: Loc,
    /// Position just past the range.
    pub end: Loc,
}

impl LocationRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(start: Loc, end: Loc) -> Self {
        Self { start, end }
    }
}

/// Converts a byte offset to an acorn-style position.
pub(crate) fn acorn_loc(source: &str, byte: usize) -> Loc {
    let (line, column) = line_and_column(source, byte);
    Loc::new(line, column)
}

/// Converts a byte offset to a peggy-style position.
pub(crate) fn peggy_loc(source: &str, byte: usize) -> Loc {
    let (line, column) = line_and_column(source, byte);
    Loc::new(line, column.saturating_add(1))
}

/// Returns the one-based line and zero-based character column of `byte`.
fn line_and_column(source: &str, byte: usize) -> (u32, u32) {
    let prefix = source.get(..byte).unwrap_or(source);
    let newlines = prefix.matches('\n').count();
    let line_text = prefix
        .rfind('\n')
        .and_then(|index| prefix.get(index.saturating_add(1)..))
        .unwrap_or(prefix);

    // Snippets will realistically never exceed u32::MAX lines or columns.
    let line = u32::try_from(newlines.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(line_text.chars().count()).unwrap_or(u32::MAX);
    (line, column)
}
