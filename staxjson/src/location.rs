// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// A position in the JSON input, tracked per character.
///
/// `line` and `column` are 1-based, `offset` is the 0-based count of
/// characters consumed before this position. Multi-byte UTF-8 sequences
/// advance each counter once, not once per byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number within the line.
    pub column: u64,
    /// 0-based character offset from the start of the input.
    pub offset: u64,
}

impl Location {
    /// Location of the first character of the input.
    pub(crate) fn start() -> Self {
        Location {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advance past one UTF-8 encoded byte.
    ///
    /// Continuation bytes do not move the position, so a multi-byte
    /// character counts as a single column. A newline moves to column 1
    /// of the next line.
    pub(crate) fn advance(&mut self, byte: u8) {
        if byte & 0xC0 == 0x80 {
            return;
        }
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}, offset {}",
            self.line, self.column, self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_location() {
        let loc = Location::start();
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.offset, 0);
    }

    #[test]
    fn test_advance_within_line() {
        let mut loc = Location::start();
        loc.advance(b'{');
        loc.advance(b'"');
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.offset, 2);
    }

    #[test]
    fn test_advance_newline() {
        let mut loc = Location::start();
        loc.advance(b'[');
        loc.advance(b'\n');
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
        assert_eq!(loc.offset, 2);
        loc.advance(b'1');
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn test_multibyte_counts_once() {
        let mut loc = Location::start();
        // U+00E9 is two bytes in UTF-8
        for byte in "é".as_bytes() {
            loc.advance(*byte);
        }
        assert_eq!(loc.column, 2);
        assert_eq!(loc.offset, 1);
    }

    #[test]
    fn test_display() {
        let mut loc = Location::start();
        loc.advance(b'x');
        assert_eq!(loc.to_string(), "line 1, column 2, offset 1");
    }
}
