// SPDX-License-Identifier: Apache-2.0

use crate::location::Location;
use std::io;
use thiserror::Error;

/// Errors raised while reading JSON text.
///
/// The parser is fail-fast: once any of these is returned, the session is
/// dead and further calls keep failing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A malformed token: bad escape, unterminated string, malformed
    /// number, invalid character encoding.
    #[error("{message} at {location}")]
    Lexical {
        message: String,
        location: Location,
    },

    /// A structurally valid token that is illegal where it appeared, such
    /// as a trailing comma or a second top-level value.
    #[error("{message} at {location}")]
    Grammar {
        message: String,
        location: Location,
    },

    /// An API call that is not valid for the parser's current event, for
    /// example `get_int()` while positioned on a string.
    #[error("{0}")]
    State(String),

    /// A configured resource ceiling was exceeded.
    #[error("{message} at {location}")]
    Limit {
        message: String,
        location: Location,
    },

    /// A number conversion failed inside a parser accessor.
    #[error(transparent)]
    Number(#[from] NumberError),

    /// The underlying reader failed.
    #[error("I/O error while parsing: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// The input location carried by the error, for the categories that
    /// pinpoint one.
    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::Lexical { location, .. }
            | ParseError::Grammar { location, .. }
            | ParseError::Limit { location, .. } => Some(*location),
            _ => None,
        }
    }
}

/// Errors raised by exact number conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberError {
    /// The value cannot be represented in the requested type without loss.
    #[error("{0}")]
    Arithmetic(String),

    /// A scale ceiling stopped a conversion that would otherwise allocate
    /// an enormous integer.
    #[error("{0}")]
    LimitExceeded(String),
}

/// Errors raised while writing JSON text.
///
/// The generator computes no locations; messages describe the misuse in
/// terms of the write-call sequence.
#[derive(Debug, Error)]
pub enum GenError {
    /// The write-call sequence violates the generator grammar, such as a
    /// value in object context without a preceding key.
    #[error("{0}")]
    Grammar(String),

    /// A double with no JSON representation under the active policy.
    #[error("{0}")]
    NumberFormat(String),

    /// The nesting ceiling was exceeded.
    #[error("{0}")]
    Limit(String),

    /// The underlying writer failed.
    #[error("I/O error while generating: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_display_includes_location() {
        let err = ParseError::Lexical {
            message: "unexpected character '@'".to_string(),
            location: Location {
                line: 2,
                column: 5,
                offset: 14,
            },
        };
        assert_eq!(
            err.to_string(),
            "unexpected character '@' at line 2, column 5, offset 14"
        );
        assert!(err.location().is_some());
    }

    #[test]
    fn test_state_has_no_location() {
        let err = ParseError::State("no more parsing events".to_string());
        assert!(err.location().is_none());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "boom");
        let err = ParseError::from(io_err);
        assert!(matches!(err, ParseError::Io(_)));
    }

    #[test]
    fn test_number_error_display() {
        let err = NumberError::Arithmetic("2147483648 does not fit in an i32".to_string());
        assert_eq!(err.to_string(), "2147483648 does not fit in an i32");
    }
}
