//! Syntax errors with positional context

use std::fmt;

use memchr::{memchr_iter, memrchr};
use thiserror::Error;

/// Location in the input, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    /// Locate a byte offset in `input`.
    ///
    /// Offsets past the end are clamped to the end. Offsets inside a
    /// multi-byte character move back to its first byte.
    pub fn locate(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input.as_bytes()[..offset];
        let line = memchr_iter(b'\n', before).count() + 1;
        let line_start = memrchr(b'\n', before).map_or(0, |i| i + 1);
        let column = input[line_start..offset].chars().count() + 1;
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Why a document failed to parse
///
/// `found` fields describe the offending token, e.g. `identifier "b"`, or
/// `end of input`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected start of a new tag, but got {found} at {position}")]
    ExpectedTag { found: String, position: Position },

    #[error("malformed start tag <{tag}>: expected '>' or '/>', but got {found} at {position}")]
    MalformedTag {
        tag: String,
        found: String,
        position: Position,
    },

    #[error("closing tag doesn't match opening tag: \"{open}\" <> \"{close}\" at {position}")]
    MismatchedTag {
        open: String,
        close: String,
        position: Position,
    },

    #[error("missing closing tag for \"{tag}\", found {found} at {position}")]
    MissingClosingTag {
        tag: String,
        found: String,
        position: Position,
    },

    #[error("unterminated comment at {position}")]
    UnterminatedComment { position: Position },

    #[error("unexpected {found} after the root element at {position}")]
    TrailingContent { found: String, position: Position },

    #[error("unexpected input {snippet:?} at {position}")]
    UnexpectedInput { snippet: String, position: Position },

    #[error("elements nested deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },
}

impl SyntaxError {
    /// Where the error was detected
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::ExpectedTag { position, .. }
            | SyntaxError::MalformedTag { position, .. }
            | SyntaxError::MismatchedTag { position, .. }
            | SyntaxError::MissingClosingTag { position, .. }
            | SyntaxError::UnterminatedComment { position }
            | SyntaxError::TrailingContent { position, .. }
            | SyntaxError::UnexpectedInput { position, .. }
            | SyntaxError::TooDeep { position, .. } => *position,
        }
    }
}
