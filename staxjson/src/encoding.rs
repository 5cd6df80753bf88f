// SPDX-License-Identifier: Apache-2.0

//! Character encoding detection and transcoding for byte input.
//!
//! JSON text arrives as bytes in one of five Unicode encodings. The first
//! four bytes are enough to tell them apart: either a byte order mark, or
//! the NUL-byte pattern that falls out of the first two characters being
//! ASCII (RFC 4627 section 3). Everything downstream of this module works
//! on UTF-8 only.

use crate::escape;
use log::debug;
use std::io;

/// Bytes read from the underlying source per refill.
const RAW_CHUNK: usize = 4096;

/// A character encoding recognized on byte input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl Encoding {
    /// The byte order mark for this encoding.
    fn bom(self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf32Be => &[0x00, 0x00, 0xFE, 0xFF],
            Encoding::Utf32Le => &[0xFF, 0xFE, 0x00, 0x00],
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf32Le => "UTF-32LE",
            Encoding::Utf32Be => "UTF-32BE",
        };
        f.write_str(name)
    }
}

/// Classify the input from its first bytes.
///
/// Returns the encoding and how many leading BOM bytes to discard. BOMs
/// win over NUL patterns; the UTF-32LE BOM is checked before the UTF-16LE
/// one because the latter is its prefix.
fn detect(prefix: &[u8]) -> (Encoding, usize) {
    if prefix.starts_with(Encoding::Utf32Be.bom()) {
        return (Encoding::Utf32Be, 4);
    }
    if prefix.starts_with(Encoding::Utf32Le.bom()) {
        return (Encoding::Utf32Le, 4);
    }
    if prefix.starts_with(Encoding::Utf8.bom()) {
        return (Encoding::Utf8, 3);
    }
    if prefix.starts_with(Encoding::Utf16Be.bom()) {
        return (Encoding::Utf16Be, 2);
    }
    if prefix.starts_with(Encoding::Utf16Le.bom()) {
        return (Encoding::Utf16Le, 2);
    }
    // No BOM. The first character of JSON text is ASCII, so NUL bytes
    // reveal wider encodings.
    if prefix.len() >= 4 {
        if prefix[0] == 0 && prefix[1] == 0 && prefix[2] == 0 && prefix[3] != 0 {
            return (Encoding::Utf32Be, 0);
        }
        if prefix[0] != 0 && prefix[1] == 0 && prefix[2] == 0 && prefix[3] == 0 {
            return (Encoding::Utf32Le, 0);
        }
    }
    if prefix.len() >= 2 {
        if prefix[0] == 0 && prefix[1] != 0 {
            return (Encoding::Utf16Be, 0);
        }
        if prefix[0] != 0 && prefix[1] == 0 {
            return (Encoding::Utf16Le, 0);
        }
    }
    (Encoding::Utf8, 0)
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Reads raw bytes from an inner source and yields UTF-8.
///
/// UTF-8 input passes through untouched apart from BOM removal. The wider
/// encodings are decoded unit by unit and re-encoded; a decoded character
/// is never split across two `read` calls. Malformed input surfaces as
/// `io::ErrorKind::InvalidData`, which the tokenizer turns into a lexical
/// error at its current location.
pub(crate) struct DecodingReader<R> {
    inner: R,
    /// Caller-supplied encoding, or `None` to autodetect on first read.
    preset: Option<Encoding>,
    /// Resolved encoding. Meaningless until `started`.
    mode: Encoding,
    started: bool,
    raw: Vec<u8>,
    raw_pos: usize,
    eof: bool,
}

impl<R: io::Read> DecodingReader<R> {
    /// Autodetect the encoding from the first bytes of `inner`.
    pub(crate) fn detecting(inner: R) -> Self {
        DecodingReader {
            inner,
            preset: None,
            mode: Encoding::Utf8,
            started: false,
            raw: Vec::new(),
            raw_pos: 0,
            eof: false,
        }
    }

    /// Decode `inner` as the given encoding, skipping a matching BOM.
    pub(crate) fn with_encoding(inner: R, encoding: Encoding) -> Self {
        DecodingReader {
            preset: Some(encoding),
            ..Self::detecting(inner)
        }
    }

    /// Fill `out` with decoded UTF-8. Returns 0 only at end of input.
    ///
    /// `out` must be at least 4 bytes long so the worst-case character
    /// always fits.
    pub(crate) fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if !self.started {
            self.start()?;
        }
        match self.mode {
            Encoding::Utf8 => self.read_passthrough(out),
            Encoding::Utf16Le => self.read_utf16(out, false),
            Encoding::Utf16Be => self.read_utf16(out, true),
            Encoding::Utf32Le => self.read_utf32(out, false),
            Encoding::Utf32Be => self.read_utf32(out, true),
        }
    }

    fn start(&mut self) -> io::Result<()> {
        self.fill_raw(4)?;
        match self.preset {
            Some(encoding) => {
                self.mode = encoding;
                let bom = encoding.bom();
                if self.raw.starts_with(bom) {
                    self.raw_pos = bom.len();
                }
            }
            None => {
                let (encoding, skip) = detect(&self.raw);
                debug!("detected input encoding {encoding}, {skip} BOM bytes");
                self.mode = encoding;
                self.raw_pos = skip;
            }
        }
        self.started = true;
        Ok(())
    }

    fn available(&self) -> usize {
        self.raw.len() - self.raw_pos
    }

    /// Compact the consumed prefix, then read until at least `want` bytes
    /// are available or the source runs dry.
    fn fill_raw(&mut self, want: usize) -> io::Result<()> {
        if self.raw_pos > 0 {
            self.raw.drain(..self.raw_pos);
            self.raw_pos = 0;
        }
        while self.raw.len() < want && !self.eof {
            let start = self.raw.len();
            self.raw.resize(start + RAW_CHUNK, 0);
            let n = loop {
                match self.inner.read(&mut self.raw[start..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.raw.truncate(start);
                        return Err(e);
                    }
                }
            };
            self.raw.truncate(start + n);
            if n == 0 {
                self.eof = true;
            }
        }
        Ok(())
    }

    fn read_passthrough(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.available() == 0 {
            if self.eof {
                return Ok(0);
            }
            self.fill_raw(1)?;
            if self.available() == 0 {
                return Ok(0);
            }
        }
        let n = self.available().min(out.len());
        out[..n].copy_from_slice(&self.raw[self.raw_pos..self.raw_pos + n]);
        self.raw_pos += n;
        Ok(n)
    }

    fn read_utf16(&mut self, out: &mut [u8], big_endian: bool) -> io::Result<usize> {
        let mut written = 0;
        loop {
            if out.len() - written < 4 {
                break;
            }
            if self.available() < 2 {
                self.fill_raw(2)?;
                match self.available() {
                    0 => break,
                    1 => {
                        return Err(invalid_data(
                            "truncated UTF-16 sequence at end of input".to_string(),
                        ))
                    }
                    _ => {}
                }
            }
            let unit = self.take_u16(big_endian) as u32;
            let code = if escape::is_high_surrogate(unit) {
                if self.available() < 2 {
                    self.fill_raw(2)?;
                }
                if self.available() < 2 {
                    return Err(invalid_data(
                        "unpaired UTF-16 high surrogate at end of input".to_string(),
                    ));
                }
                let low = self.take_u16(big_endian) as u32;
                if !escape::is_low_surrogate(low) {
                    return Err(invalid_data(format!(
                        "unpaired UTF-16 high surrogate 0x{unit:04X}"
                    )));
                }
                escape::combine_surrogates(unit, low)
            } else if escape::is_low_surrogate(unit) {
                return Err(invalid_data(format!(
                    "unexpected UTF-16 low surrogate 0x{unit:04X}"
                )));
            } else {
                unit
            };
            match char::from_u32(code) {
                Some(ch) => written += ch.encode_utf8(&mut out[written..]).len(),
                None => return Err(invalid_data(format!("invalid code point 0x{code:X}"))),
            }
        }
        Ok(written)
    }

    fn read_utf32(&mut self, out: &mut [u8], big_endian: bool) -> io::Result<usize> {
        let mut written = 0;
        loop {
            if out.len() - written < 4 {
                break;
            }
            if self.available() < 4 {
                self.fill_raw(4)?;
                match self.available() {
                    0 => break,
                    1..=3 => {
                        return Err(invalid_data(
                            "truncated UTF-32 sequence at end of input".to_string(),
                        ))
                    }
                    _ => {}
                }
            }
            let p = self.raw_pos;
            let quad = [
                self.raw[p],
                self.raw[p + 1],
                self.raw[p + 2],
                self.raw[p + 3],
            ];
            self.raw_pos += 4;
            let code = if big_endian {
                u32::from_be_bytes(quad)
            } else {
                u32::from_le_bytes(quad)
            };
            match char::from_u32(code) {
                Some(ch) => written += ch.encode_utf8(&mut out[written..]).len(),
                None => {
                    return Err(invalid_data(format!(
                        "invalid UTF-32 code point 0x{code:X}"
                    )))
                }
            }
        }
        Ok(written)
    }

    fn take_u16(&mut self, big_endian: bool) -> u16 {
        let p = self.raw_pos;
        let pair = [self.raw[p], self.raw[p + 1]];
        self.raw_pos += 2;
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(reader: &mut DecodingReader<&[u8]>) -> io::Result<String> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 64];
        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        Ok(String::from_utf8(out).unwrap())
    }

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn utf16be(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    fn utf32be(text: &str) -> Vec<u8> {
        text.chars().flat_map(|c| (c as u32).to_be_bytes()).collect()
    }

    fn utf32le(text: &str) -> Vec<u8> {
        text.chars().flat_map(|c| (c as u32).to_le_bytes()).collect()
    }

    #[test]
    fn test_detect_boms() {
        assert_eq!(detect(&[0xEF, 0xBB, 0xBF, b'{']), (Encoding::Utf8, 3));
        assert_eq!(detect(&[0xFE, 0xFF, 0, b'{']), (Encoding::Utf16Be, 2));
        assert_eq!(detect(&[0xFF, 0xFE, b'{', 0]), (Encoding::Utf16Le, 2));
        assert_eq!(detect(&[0x00, 0x00, 0xFE, 0xFF]), (Encoding::Utf32Be, 4));
        assert_eq!(detect(&[0xFF, 0xFE, 0x00, 0x00]), (Encoding::Utf32Le, 4));
    }

    #[test]
    fn test_detect_nul_patterns() {
        assert_eq!(detect(&[0, 0, 0, b'[']), (Encoding::Utf32Be, 0));
        assert_eq!(detect(&[b'[', 0, 0, 0]), (Encoding::Utf32Le, 0));
        assert_eq!(detect(&[0, b'[', 0, b'1']), (Encoding::Utf16Be, 0));
        assert_eq!(detect(&[b'[', 0, b'1', 0]), (Encoding::Utf16Le, 0));
        assert_eq!(detect(b"[1,2]"), (Encoding::Utf8, 0));
    }

    #[test]
    fn test_detect_short_input() {
        assert_eq!(detect(b""), (Encoding::Utf8, 0));
        assert_eq!(detect(b"1"), (Encoding::Utf8, 0));
        assert_eq!(detect(&[0, b'1']), (Encoding::Utf16Be, 0));
        assert_eq!(detect(&[b'1', 0]), (Encoding::Utf16Le, 0));
    }

    #[test]
    fn test_passthrough_strips_bom() {
        let data = [0xEF, 0xBB, 0xBF, b'4', b'2'];
        let mut reader = DecodingReader::detecting(&data[..]);
        assert_eq!(decode_all(&mut reader).unwrap(), "42");
    }

    #[test]
    fn test_utf16le_roundtrip() {
        let data = utf16le("{\"k\":\"héllo\"}");
        let mut reader = DecodingReader::detecting(&data[..]);
        assert_eq!(decode_all(&mut reader).unwrap(), "{\"k\":\"héllo\"}");
    }

    #[test]
    fn test_utf16be_surrogate_pair() {
        let data = utf16be("[\"𝄞\"]");
        let mut reader = DecodingReader::detecting(&data[..]);
        assert_eq!(decode_all(&mut reader).unwrap(), "[\"𝄞\"]");
    }

    #[test]
    fn test_utf32_both_endians() {
        let be = utf32be("[true]");
        let mut reader = DecodingReader::detecting(&be[..]);
        assert_eq!(decode_all(&mut reader).unwrap(), "[true]");

        let le = utf32le("[true]");
        let mut reader = DecodingReader::detecting(&le[..]);
        assert_eq!(decode_all(&mut reader).unwrap(), "[true]");
    }

    #[test]
    fn test_explicit_encoding_skips_matching_bom() {
        let mut data = vec![0xFF, 0xFE];
        data.extend(utf16le("[1]"));
        let mut reader = DecodingReader::with_encoding(&data[..], Encoding::Utf16Le);
        assert_eq!(decode_all(&mut reader).unwrap(), "[1]");
    }

    #[test]
    fn test_lone_high_surrogate_is_invalid_data() {
        // High surrogate D800 followed by a plain char instead of a low half.
        let data: Vec<u8> = [0xD800u16, b'a' as u16]
            .iter()
            .flat_map(|u| u.to_be_bytes())
            .collect();
        let mut reader = DecodingReader::with_encoding(&data[..], Encoding::Utf16Be);
        let err = decode_all(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_utf32_is_invalid_data() {
        let mut data = utf32be("[]");
        data.truncate(data.len() - 1);
        let mut reader = DecodingReader::detecting(&data[..]);
        let err = decode_all(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_empty_input() {
        let mut reader = DecodingReader::detecting(&b""[..]);
        assert_eq!(decode_all(&mut reader).unwrap(), "");
    }
}
