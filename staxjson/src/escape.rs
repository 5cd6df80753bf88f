// SPDX-License-Identifier: Apache-2.0

//! Escape sequence handling shared by the tokenizer and the generator.

/// Convert the character after a backslash to its unescaped byte.
///
/// Covers the eight simple escapes. `\uXXXX` is handled separately by the
/// tokenizer because it needs lookahead for surrogate pairs.
pub(crate) fn unescape_simple(escape: u8) -> Option<u8> {
    match escape {
        b'"' => Some(b'"'),
        b'\\' => Some(b'\\'),
        b'/' => Some(b'/'),
        b'b' => Some(0x08),
        b'f' => Some(0x0C),
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        _ => None,
    }
}

/// Convert an ASCII hex digit to its value.
pub(crate) fn hex_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u32),
        b'a'..=b'f' => Some((byte - b'a' + 10) as u32),
        b'A'..=b'F' => Some((byte - b'A' + 10) as u32),
        _ => None,
    }
}

/// True for the first half of a UTF-16 surrogate pair.
pub(crate) fn is_high_surrogate(code_unit: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code_unit)
}

/// True for the second half of a UTF-16 surrogate pair.
pub(crate) fn is_low_surrogate(code_unit: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code_unit)
}

/// Combine a surrogate pair into the code point it encodes.
///
/// Callers must have validated both halves first.
pub(crate) fn combine_surrogates(high: u32, low: u32) -> u32 {
    0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF)
}

/// The escape text a character needs in generated output, if any.
///
/// Quotes, backslashes and the named control characters get their short
/// form; remaining control characters need a `\u00XX` escape, which the
/// caller formats. Everything else passes through unescaped.
pub(crate) fn escape_for(ch: char) -> WriteEscape {
    match ch {
        '"' => WriteEscape::Short("\\\""),
        '\\' => WriteEscape::Short("\\\\"),
        '\x08' => WriteEscape::Short("\\b"),
        '\x0C' => WriteEscape::Short("\\f"),
        '\n' => WriteEscape::Short("\\n"),
        '\r' => WriteEscape::Short("\\r"),
        '\t' => WriteEscape::Short("\\t"),
        c if (c as u32) < 0x20 => WriteEscape::Unicode(c as u32),
        _ => WriteEscape::None,
    }
}

/// Classification of a character for output escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteEscape {
    /// No escaping needed.
    None,
    /// One of the short two-character escapes.
    Short(&'static str),
    /// Needs the `\u00XX` form; carries the code point.
    Unicode(u32),
}
