//! Structural checks for mini-notation pattern strings.
//!
//! Mini-notation nests sequences `[..]`, alternations `<..>`, polymeters
//! `{..}` and Euclidean arguments `(..)`. A pattern whose brackets do not
//! balance cannot be evaluated, so it fails compilation here with a
//! peggy-style location pointing at the offending bracket.

use std::ops::Range;

use crate::error::TranspileError;
use crate::position::{LocationRange, peggy_loc};

/// Checks that the brackets in `source[content]` balance.
///
/// # Errors
///
/// Returns a [`TranspileError`] with a nested location range for the first
/// unexpected or mismatched closer, or for the innermost unclosed opener.
pub(crate) fn check_pattern(source: &str, content: Range<usize>) -> Result<(), TranspileError> {
    let Some(text) = source.get(content.clone()) else {
        return Ok(());
    };

    let mut open: Vec<(char, usize)> = Vec::new();
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }

        let at = content.start.saturating_add(offset);
        if is_opener(ch) {
            open.push((ch, at));
            continue;
        }
        let Some(expected_opener) = opener_for(ch) else {
            continue;
        };

        match open.pop() {
            None => {
                return Err(bracket_error(
                    source,
                    at,
                    ch,
                    format!("unexpected \"{ch}\" in mini-notation"),
                ));
            }
            Some((opener, _)) if opener != expected_opener => {
                let wanted = closer_for(opener);
                return Err(bracket_error(
                    source,
                    at,
                    ch,
                    format!("expected \"{wanted}\" but found \"{ch}\" in mini-notation"),
                ));
            }
            Some(_) => {}
        }
    }

    match open.pop() {
        Some((opener, at)) => Err(bracket_error(
            source,
            at,
            opener,
            format!("unclosed \"{opener}\" in mini-notation"),
        )),
        None => Ok(()),
    }
}

const fn is_opener(ch: char) -> bool {
    matches!(ch, '[' | '<' | '{' | '(')
}

const fn opener_for(ch: char) -> Option<char> {
    match ch {
        ']' => Some('['),
        '>' => Some('<'),
        '}' => Some('{'),
        ')' => Some('('),
        _ => None,
    }
}

const fn closer_for(ch: char) -> char {
    match ch {
        '[' => ']',
        '<' => '>',
        '{' => '}',
        _ => ')',
    }
}

fn bracket_error(source: &str, at: usize, ch: char, message: String) -> TranspileError {
    let end = at.saturating_add(ch.len_utf8());
    TranspileError::spanning(
        message,
        LocationRange::new(peggy_loc(source, at), peggy_loc(source, end)),
    )
}
