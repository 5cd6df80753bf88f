// SPDX-License-Identifier: Apache-2.0

//! The lexical layer: raw JSON tokens over decoded UTF-8 bytes.
//!
//! The tokenizer owns a pooled working buffer that it refills from the
//! decoding reader. String and number payloads are recorded as spans into
//! that buffer and only materialized when an accessor asks, so plain
//! values are never copied. Escaped strings fall back to rebuilding the
//! text in a side buffer, byte by byte as the escapes are resolved.

use crate::buffer_pool::{BufferPool, PooledBuf};
use crate::encoding::DecodingReader;
use crate::error::ParseError;
use crate::escape;
use crate::location::Location;
use log::debug;
use std::fmt;
use std::io;
use std::sync::Arc;

/// How many bytes each refill asks the decoder for.
const READ_CHUNK: usize = 4096;

/// Raw lexical tokens. Values carry no payload here; the tokenizer holds
/// the most recent string or number span until the next value token
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
    Colon,
    Comma,
    Str,
    Number,
    True,
    False,
    Null,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::BraceOpen => "'{'",
            Token::BraceClose => "'}'",
            Token::BracketOpen => "'['",
            Token::BracketClose => "']'",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::Str => "a string",
            Token::Number => "a number",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::Null => "'null'",
            Token::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// Shape facts recorded while scanning a numeric literal.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NumberShape {
    /// The literal had no fraction and no exponent.
    pub integral: bool,
    /// Integer-part digit count, sign excluded. Only meaningful when
    /// `integral` is set; it drives the i32/i64 fast paths.
    pub digits: usize,
}

pub(crate) struct Tokenizer<R> {
    source: DecodingReader<R>,
    source_done: bool,
    buf: PooledBuf,
    pos: usize,
    /// Span of the current string/number payload within `buf`.
    store_begin: usize,
    store_end: usize,
    /// The span must survive buffer compaction until the parser says the
    /// value is dead.
    span_valid: bool,
    /// Rebuilt text of the current string when it contained escapes.
    unescaped: Vec<u8>,
    escaped: bool,
    shape: NumberShape,
    /// Position of the next character to be consumed.
    loc: Location,
    /// Position of the last consumed character.
    last_loc: Location,
    /// Position of the first character of the current token.
    token_loc: Location,
    max_number_length: usize,
}

impl<R: io::Read> Tokenizer<R> {
    pub(crate) fn new(
        source: DecodingReader<R>,
        pool: &Arc<dyn BufferPool>,
        max_number_length: usize,
    ) -> Self {
        Tokenizer {
            source,
            source_done: false,
            buf: PooledBuf::take_from(pool),
            pos: 0,
            store_begin: 0,
            store_end: 0,
            span_valid: false,
            unescaped: Vec::new(),
            escaped: false,
            shape: NumberShape::default(),
            loc: Location::start(),
            last_loc: Location::start(),
            token_loc: Location::start(),
            max_number_length,
        }
    }

    /// Scan the next token, skipping insignificant whitespace. Returns
    /// `Token::Eof` once the input is exhausted, repeatably.
    pub(crate) fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            match self.peek()? {
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                    self.next_byte()?;
                }
                _ => break,
            }
        }
        self.token_loc = self.loc;
        let Some(byte) = self.peek()? else {
            return Ok(Token::Eof);
        };
        match byte {
            b'{' => self.single(Token::BraceOpen),
            b'}' => self.single(Token::BraceClose),
            b'[' => self.single(Token::BracketOpen),
            b']' => self.single(Token::BracketClose),
            b':' => self.single(Token::Colon),
            b',' => self.single(Token::Comma),
            b'"' => self.scan_string(),
            b'-' | b'0'..=b'9' => self.scan_number(),
            b't' => self.scan_keyword("true", Token::True),
            b'f' => self.scan_keyword("false", Token::False),
            b'n' => self.scan_keyword("null", Token::Null),
            other => {
                self.next_byte()?;
                Err(self.lexical(
                    format!("unexpected character {}", fmt_byte(other)),
                    self.last_loc,
                ))
            }
        }
    }

    /// Invalidate the held value span. The parser calls this when it is
    /// about to move past the current value, which lets compaction drop
    /// the bytes.
    pub(crate) fn clear_span(&mut self) {
        self.span_valid = false;
    }

    /// The text of the last string token, unescaped.
    pub(crate) fn string_value(&self) -> Result<&str, ParseError> {
        let bytes: &[u8] = if self.escaped {
            &self.unescaped
        } else {
            &self.buf[self.store_begin..self.store_end]
        };
        std::str::from_utf8(bytes).map_err(|_| ParseError::Lexical {
            message: "invalid UTF-8 in string".to_string(),
            location: self.token_loc,
        })
    }

    /// The exact source text of the last number token.
    pub(crate) fn number_literal(&self) -> Result<&str, ParseError> {
        // Number scans only accept ASCII, so this cannot fail in practice.
        std::str::from_utf8(&self.buf[self.store_begin..self.store_end]).map_err(|_| {
            ParseError::Lexical {
                message: "invalid UTF-8 in number".to_string(),
                location: self.token_loc,
            }
        })
    }

    pub(crate) fn number_shape(&self) -> NumberShape {
        self.shape
    }

    /// Position of the next character to be consumed.
    pub(crate) fn location(&self) -> Location {
        self.loc
    }

    /// Position of the first character of the most recent token.
    pub(crate) fn token_location(&self) -> Location {
        self.token_loc
    }

    /// Return the working buffer to its pool ahead of drop.
    pub(crate) fn release_buffer(&mut self) {
        debug!("tokenizer released, {} characters consumed", self.loc.offset);
        self.span_valid = false;
        self.pos = 0;
        self.buf.release();
    }

    fn single(&mut self, token: Token) -> Result<Token, ParseError> {
        self.next_byte()?;
        Ok(token)
    }

    fn scan_keyword(&mut self, expected: &'static str, token: Token) -> Result<Token, ParseError> {
        for want in expected.bytes() {
            match self.next_byte()? {
                Some(b) if b == want => {}
                Some(b) => {
                    return Err(self.lexical(
                        format!(
                            "unexpected character {} in literal, expected '{expected}'",
                            fmt_byte(b)
                        ),
                        self.last_loc,
                    ))
                }
                None => {
                    return Err(self.lexical(
                        format!("unexpected end of input, expected '{expected}'"),
                        self.loc,
                    ))
                }
            }
        }
        Ok(token)
    }

    fn scan_string(&mut self) -> Result<Token, ParseError> {
        self.next_byte()?; // opening quote
        self.escaped = false;
        self.span_valid = true;
        self.store_begin = self.pos;
        self.store_end = self.pos;
        loop {
            let Some(byte) = self.peek()? else {
                return Err(self.lexical("unterminated string literal".to_string(), self.loc));
            };
            match byte {
                b'"' => {
                    if !self.escaped {
                        self.store_end = self.pos;
                    }
                    self.next_byte()?;
                    return Ok(Token::Str);
                }
                b'\\' => {
                    if !self.escaped {
                        // Switch to the rebuild path, carrying the
                        // literal prefix along. The span is dead from
                        // here on.
                        self.unescaped.clear();
                        self.unescaped
                            .extend_from_slice(&self.buf[self.store_begin..self.pos]);
                        self.escaped = true;
                        self.span_valid = false;
                    }
                    self.next_byte()?;
                    self.scan_escape()?;
                }
                b if b < 0x20 => {
                    self.next_byte()?;
                    return Err(self.lexical(
                        format!("unescaped control character {} in string", fmt_byte(b)),
                        self.last_loc,
                    ));
                }
                b => {
                    if self.escaped {
                        self.unescaped.push(b);
                    }
                    self.next_byte()?;
                }
            }
        }
    }

    /// Resolve one escape sequence; the backslash is already consumed.
    fn scan_escape(&mut self) -> Result<(), ParseError> {
        let Some(byte) = self.next_byte()? else {
            return Err(self.lexical("unterminated string literal".to_string(), self.loc));
        };
        if let Some(plain) = escape::unescape_simple(byte) {
            self.unescaped.push(plain);
            return Ok(());
        }
        if byte != b'u' {
            return Err(self.lexical(
                format!("invalid escape sequence '\\{}'", fmt_byte_bare(byte)),
                self.last_loc,
            ));
        }
        let first = self.scan_hex4()?;
        let code = if escape::is_high_surrogate(first) {
            if self.next_byte()? != Some(b'\\') || self.next_byte()? != Some(b'u') {
                return Err(self.lexical(
                    format!("unpaired high surrogate \\u{first:04X} in string"),
                    self.last_loc,
                ));
            }
            let low = self.scan_hex4()?;
            if !escape::is_low_surrogate(low) {
                return Err(self.lexical(
                    format!("invalid low surrogate \\u{low:04X} after \\u{first:04X}"),
                    self.last_loc,
                ));
            }
            escape::combine_surrogates(first, low)
        } else if escape::is_low_surrogate(first) {
            return Err(self.lexical(
                format!("unpaired low surrogate \\u{first:04X} in string"),
                self.last_loc,
            ));
        } else {
            first
        };
        match char::from_u32(code) {
            Some(ch) => {
                let mut utf8 = [0u8; 4];
                self.unescaped
                    .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                Ok(())
            }
            None => Err(self.lexical(
                format!("escape resolves to invalid code point U+{code:X}"),
                self.last_loc,
            )),
        }
    }

    fn scan_hex4(&mut self) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..4 {
            match self.next_byte()? {
                Some(b) => match escape::hex_value(b) {
                    Some(v) => value = value * 16 + v,
                    None => {
                        return Err(self.lexical(
                            format!("invalid hex digit {} in unicode escape", fmt_byte(b)),
                            self.last_loc,
                        ))
                    }
                },
                None => {
                    return Err(
                        self.lexical("unterminated unicode escape".to_string(), self.loc)
                    )
                }
            }
        }
        Ok(value)
    }

    fn scan_number(&mut self) -> Result<Token, ParseError> {
        self.escaped = false;
        self.span_valid = true;
        self.store_begin = self.pos;
        self.store_end = self.pos;
        let mut length = 0usize;
        let mut shape = NumberShape {
            integral: true,
            digits: 0,
        };

        if self.peek()? == Some(b'-') {
            self.consume_number_byte(&mut length)?;
        }
        match self.peek()? {
            Some(b'0') => {
                self.consume_number_byte(&mut length)?;
                shape.digits += 1;
                if let Some(b'0'..=b'9') = self.peek()? {
                    return Err(
                        self.lexical("unexpected digit after leading zero".to_string(), self.loc)
                    );
                }
            }
            Some(b'1'..=b'9') => {
                self.consume_number_byte(&mut length)?;
                shape.digits += 1;
                while let Some(b'0'..=b'9') = self.peek()? {
                    self.consume_number_byte(&mut length)?;
                    shape.digits += 1;
                }
            }
            Some(other) => {
                return Err(self.lexical(
                    format!("expected a digit in number, found {}", fmt_byte(other)),
                    self.loc,
                ))
            }
            None => {
                return Err(
                    self.lexical("unexpected end of input in number".to_string(), self.loc)
                )
            }
        }

        if self.peek()? == Some(b'.') {
            shape.integral = false;
            self.consume_number_byte(&mut length)?;
            if !matches!(self.peek()?, Some(b'0'..=b'9')) {
                return Err(self.lexical(
                    "expected a digit after the decimal point".to_string(),
                    self.loc,
                ));
            }
            while let Some(b'0'..=b'9') = self.peek()? {
                self.consume_number_byte(&mut length)?;
            }
        }

        if matches!(self.peek()?, Some(b'e') | Some(b'E')) {
            shape.integral = false;
            self.consume_number_byte(&mut length)?;
            if matches!(self.peek()?, Some(b'+') | Some(b'-')) {
                self.consume_number_byte(&mut length)?;
            }
            if !matches!(self.peek()?, Some(b'0'..=b'9')) {
                return Err(
                    self.lexical("expected a digit in the exponent".to_string(), self.loc)
                );
            }
            while let Some(b'0'..=b'9') = self.peek()? {
                self.consume_number_byte(&mut length)?;
            }
        }

        self.store_end = self.pos;
        self.shape = shape;
        Ok(Token::Number)
    }

    /// Consume one byte of a numeric literal, enforcing the length
    /// ceiling as the scan goes so an endless digit stream fails fast.
    fn consume_number_byte(&mut self, length: &mut usize) -> Result<(), ParseError> {
        self.next_byte()?;
        *length += 1;
        if *length > self.max_number_length {
            return Err(ParseError::Limit {
                message: format!(
                    "numeric literal length {} exceeds the configured maximum {}",
                    *length, self.max_number_length
                ),
                location: self.token_loc,
            });
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<u8>, ParseError> {
        if self.pos >= self.buf.len() && !self.refill()? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    fn next_byte(&mut self) -> Result<Option<u8>, ParseError> {
        if self.pos >= self.buf.len() && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        self.last_loc = self.loc;
        self.loc.advance(byte);
        Ok(Some(byte))
    }

    /// Pull more decoded bytes into the working buffer. Consumed bytes
    /// are dropped first, except that a live value span is kept so the
    /// parser can still materialize it. Returns false at end of input.
    fn refill(&mut self) -> Result<bool, ParseError> {
        if self.source_done {
            return Ok(false);
        }
        let keep_from = if self.span_valid {
            self.store_begin.min(self.pos)
        } else {
            self.pos
        };
        if keep_from > 0 {
            self.buf.drain(..keep_from);
            self.pos -= keep_from;
            self.store_begin = self.store_begin.saturating_sub(keep_from);
            self.store_end = self.store_end.saturating_sub(keep_from);
        }
        let start = self.buf.len();
        self.buf.resize(start + READ_CHUNK, 0);
        let n = match self.source.read(&mut self.buf[start..]) {
            Ok(n) => n,
            Err(e) => {
                self.buf.truncate(start);
                return Err(self.map_io(e));
            }
        };
        self.buf.truncate(start + n);
        if n == 0 {
            self.source_done = true;
            return Ok(false);
        }
        Ok(true)
    }

    /// Decoder errors about malformed input become lexical errors at the
    /// current location; real I/O failures pass through.
    fn map_io(&self, error: io::Error) -> ParseError {
        if error.kind() == io::ErrorKind::InvalidData {
            ParseError::Lexical {
                message: error.to_string(),
                location: self.loc,
            }
        } else {
            ParseError::Io(error)
        }
    }

    fn lexical(&self, message: String, location: Location) -> ParseError {
        ParseError::Lexical { message, location }
    }
}

/// Render a byte for an error message: printable ASCII quoted, anything
/// else as hex.
fn fmt_byte(byte: u8) -> String {
    if (0x20..0x7F).contains(&byte) {
        format!("'{}'", byte as char)
    } else {
        format!("0x{byte:02X}")
    }
}

fn fmt_byte_bare(byte: u8) -> String {
    if (0x20..0x7F).contains(&byte) {
        (byte as char).to_string()
    } else {
        format!("0x{byte:02X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer_pool::VecPool;
    use test_log::test;

    fn tok(input: &str) -> Tokenizer<&[u8]> {
        tok_limited(input, 1100)
    }

    fn tok_limited(input: &str, max_number_length: usize) -> Tokenizer<&[u8]> {
        let pool: Arc<dyn BufferPool> = Arc::new(VecPool::new());
        Tokenizer::new(
            DecodingReader::detecting(input.as_bytes()),
            &pool,
            max_number_length,
        )
    }

    /// Hands out input a few bytes at a time to exercise refills.
    struct TrickleReader<'a> {
        data: &'a [u8],
        pos: usize,
        chunk: usize,
    }

    impl io::Read for TrickleReader<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(self.data.len() - self.pos).min(out.len());
            out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_structural_tokens() {
        let mut t = tok("{ } [ ] : ,");
        assert_eq!(t.next_token().unwrap(), Token::BraceOpen);
        assert_eq!(t.next_token().unwrap(), Token::BraceClose);
        assert_eq!(t.next_token().unwrap(), Token::BracketOpen);
        assert_eq!(t.next_token().unwrap(), Token::BracketClose);
        assert_eq!(t.next_token().unwrap(), Token::Colon);
        assert_eq!(t.next_token().unwrap(), Token::Comma);
        assert_eq!(t.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_eof_is_repeatable() {
        let mut t = tok("  ");
        assert_eq!(t.next_token().unwrap(), Token::Eof);
        assert_eq!(t.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_keywords() {
        let mut t = tok("true false null");
        assert_eq!(t.next_token().unwrap(), Token::True);
        assert_eq!(t.next_token().unwrap(), Token::False);
        assert_eq!(t.next_token().unwrap(), Token::Null);
    }

    #[test]
    fn test_keyword_typo() {
        let mut t = tok("trux");
        let err = t.next_token().unwrap_err();
        match err {
            ParseError::Lexical { message, .. } => {
                assert!(message.contains("expected 'true'"), "message: {message}")
            }
            other => panic!("Expected Lexical, got: {other:?}"),
        }
    }

    #[test]
    fn test_plain_string_span() {
        let mut t = tok("\"hello\"");
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), "hello");
    }

    #[test]
    fn test_escaped_string() {
        let mut t = tok(r#""a\"b\\c\nd\te""#);
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), "a\"b\\c\nd\te");
    }

    #[test]
    fn test_unicode_escape() {
        let mut t = tok(r#""café""#);
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), "café");
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let mut t = tok(r#""𝄞""#);
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), "𝄞");
    }

    #[test]
    fn test_multibyte_literal_passes_through() {
        let mut t = tok(r#""𝄞 café""#);
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), "𝄞 café");
    }

    #[test]
    fn test_unpaired_surrogate_is_lexical() {
        let mut t = tok(r#""\uD834x""#);
        assert!(matches!(
            t.next_token().unwrap_err(),
            ParseError::Lexical { .. }
        ));
    }

    #[test]
    fn test_bad_escape() {
        let mut t = tok(r#""\x""#);
        let err = t.next_token().unwrap_err();
        match err {
            ParseError::Lexical { message, .. } => {
                assert!(message.contains("invalid escape"), "message: {message}")
            }
            other => panic!("Expected Lexical, got: {other:?}"),
        }
    }

    #[test]
    fn test_control_character_in_string() {
        let mut t = tok("\"a\u{1}b\"");
        assert!(matches!(
            t.next_token().unwrap_err(),
            ParseError::Lexical { .. }
        ));
    }

    #[test]
    fn test_unterminated_string() {
        let mut t = tok("\"abc");
        assert!(matches!(
            t.next_token().unwrap_err(),
            ParseError::Lexical { .. }
        ));
    }

    #[test]
    fn test_number_shapes() {
        let mut t = tok("0 -17 123456789 1.5 2e3 -0.5");
        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert!(t.number_shape().integral);
        assert_eq!(t.number_shape().digits, 1);
        assert_eq!(t.number_literal().unwrap(), "0");

        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert!(t.number_shape().integral);
        assert_eq!(t.number_shape().digits, 2);
        assert_eq!(t.number_literal().unwrap(), "-17");

        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert_eq!(t.number_shape().digits, 9);

        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert!(!t.number_shape().integral);
        assert_eq!(t.number_literal().unwrap(), "1.5");

        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert!(!t.number_shape().integral);
        assert_eq!(t.number_literal().unwrap(), "2e3");

        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert_eq!(t.number_literal().unwrap(), "-0.5");
    }

    #[test]
    fn test_number_stops_at_delimiter() {
        let mut t = tok("[1,2]");
        assert_eq!(t.next_token().unwrap(), Token::BracketOpen);
        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert_eq!(t.number_literal().unwrap(), "1");
        assert_eq!(t.next_token().unwrap(), Token::Comma);
        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert_eq!(t.number_literal().unwrap(), "2");
        assert_eq!(t.next_token().unwrap(), Token::BracketClose);
    }

    #[test]
    fn test_leading_zero_rejected() {
        let mut t = tok("012");
        assert!(matches!(
            t.next_token().unwrap_err(),
            ParseError::Lexical { .. }
        ));
    }

    #[test]
    fn test_malformed_numbers() {
        for input in ["-", "1.", "1e", "1e+", ".5", "-x"] {
            let mut t = tok(input);
            let result = t.next_token();
            assert!(result.is_err(), "input {input:?} should fail");
        }
    }

    #[test]
    fn test_number_length_ceiling() {
        let mut t = tok_limited("12345678901", 10);
        let err = t.next_token().unwrap_err();
        match err {
            ParseError::Limit { message, .. } => {
                assert!(message.contains("11"), "message: {message}");
                assert!(message.contains("10"), "message: {message}");
            }
            other => panic!("Expected Limit, got: {other:?}"),
        }
        // Exactly at the ceiling is fine.
        let mut t = tok_limited("1234567890", 10);
        assert_eq!(t.next_token().unwrap(), Token::Number);
    }

    #[test]
    fn test_length_ceiling_counts_sign_and_point() {
        // Seven characters of source for five digits of value.
        let mut t = tok_limited("-1.2345", 6);
        assert!(matches!(
            t.next_token().unwrap_err(),
            ParseError::Limit { .. }
        ));
    }

    #[test]
    fn test_error_location() {
        let mut t = tok("[\n  @");
        assert_eq!(t.next_token().unwrap(), Token::BracketOpen);
        let err = t.next_token().unwrap_err();
        let loc = err.location().unwrap();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.offset, 4);
    }

    #[test]
    fn test_span_survives_refill() {
        // A value larger than a trickle chunk has to span many refills.
        let long = "x".repeat(600);
        let doc = format!("\"{long}\" 42");
        let pool: Arc<dyn BufferPool> = Arc::new(VecPool::new());
        let reader = TrickleReader {
            data: doc.as_bytes(),
            pos: 0,
            chunk: 7,
        };
        let mut t = Tokenizer::new(DecodingReader::detecting(reader), &pool, 1100);
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), long);
        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert_eq!(t.number_literal().unwrap(), "42");
        assert_eq!(t.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_span_survives_lookahead_to_eof() {
        // Reading the EOF after a root number must not invalidate the
        // number's span.
        let mut t = tok("1234");
        assert_eq!(t.next_token().unwrap(), Token::Number);
        assert_eq!(t.next_token().unwrap(), Token::Eof);
        assert_eq!(t.number_literal().unwrap(), "1234");
    }

    #[test]
    fn test_clear_span_allows_compaction() {
        let mut t = tok("\"abc\" \"def\"");
        assert_eq!(t.next_token().unwrap(), Token::Str);
        t.clear_span();
        assert_eq!(t.next_token().unwrap(), Token::Str);
        assert_eq!(t.string_value().unwrap(), "def");
    }

    #[test]
    fn test_unexpected_character() {
        let mut t = tok("@");
        let err = t.next_token().unwrap_err();
        match err {
            ParseError::Lexical { message, .. } => {
                assert!(message.contains("'@'"), "message: {message}")
            }
            other => panic!("Expected Lexical, got: {other:?}"),
        }
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::BraceOpen.to_string(), "'{'");
        assert_eq!(Token::Str.to_string(), "a string");
        assert_eq!(Token::Eof.to_string(), "end of input");
    }
}
