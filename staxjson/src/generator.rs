// SPDX-License-Identifier: Apache-2.0

//! Push-mode JSON writer.
//!
//! [`JsonGenerator`] is the mirror image of the parser: the caller makes
//! a sequence of `write_*` calls and the generator validates that the
//! sequence spells well-formed JSON, inserting the structural commas and
//! colons itself. Output is staged in a pooled buffer and spilled to the
//! sink in chunks; nothing reaches the sink one byte at a time.
//!
//! A session writes exactly one top-level value and must be finished
//! with [`close`](JsonGenerator::close), which rejects incomplete
//! documents. Dropping an unclosed generator discards any staged bytes
//! rather than flushing a truncated document.

use crate::buffer_pool::PooledBuf;
use crate::config::{GeneratorConfig, NonFinitePolicy};
use crate::error::GenError;
use crate::escape::{escape_for, WriteEscape};
use crate::number::{Decimal, JsonNumber};
use crate::pretty::Indenter;
use log::debug;
use std::io::{self, Write};

/// Staged output is spilled to the sink once it reaches this size.
const SPILL_THRESHOLD: usize = 4096;

/// Where the generator is inside the document grammar.
#[derive(Debug, Clone, Copy)]
enum GenContext {
    Root { value_written: bool },
    Object { first_done: bool, key_pending: bool },
    Array { first_done: bool },
}

/// Streaming JSON writer over any [`io::Write`] sink.
///
/// Every writer returns `&mut Self` so calls chain through `?`:
///
/// ```
/// use staxjson::JsonGenerator;
///
/// let mut out = Vec::new();
/// let mut gen = JsonGenerator::new(&mut out);
/// gen.write_start_object()?
///     .write_string_member("name", "staxjson")?
///     .write_int_member("stars", 3)?
///     .write_end()?;
/// gen.close()?;
/// drop(gen);
/// assert_eq!(out, br#"{"name":"staxjson","stars":3}"#);
/// # Ok::<(), staxjson::GenError>(())
/// ```
#[derive(Debug)]
pub struct JsonGenerator<W: io::Write> {
    sink: W,
    out: PooledBuf,
    stack: Vec<GenContext>,
    current: GenContext,
    indenter: Option<Indenter>,
    non_finite: NonFinitePolicy,
    max_depth: usize,
    closed: bool,
}

impl<W: io::Write> JsonGenerator<W> {
    /// A generator with default settings, emitting compact output.
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, GeneratorConfig::default())
    }

    /// A generator emitting indented multi-line output.
    pub fn pretty(sink: W) -> Self {
        Self::with_config(sink, GeneratorConfig::new().with_pretty(true))
    }

    /// A generator with explicit settings.
    pub fn with_config(sink: W, config: GeneratorConfig) -> Self {
        debug!(
            "generator session: pretty={} max_depth={}",
            config.pretty, config.max_depth
        );
        JsonGenerator {
            sink,
            out: PooledBuf::take_from(&config.pool),
            stack: Vec::new(),
            current: GenContext::Root {
                value_written: false,
            },
            indenter: config.pretty.then(Indenter::new),
            non_finite: config.non_finite,
            max_depth: config.max_depth,
            closed: false,
        }
    }

    /// Opens an object. Valid wherever a value is valid.
    pub fn write_start_object(&mut self) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        self.check_depth()?;
        self.before_value()?;
        self.push_context(GenContext::Object {
            first_done: false,
            key_pending: false,
        });
        self.out.push(b'{');
        if let Some(indenter) = &mut self.indenter {
            indenter.ascend();
        }
        self.spill_if_full()?;
        Ok(self)
    }

    /// Opens an array. Valid wherever a value is valid.
    pub fn write_start_array(&mut self) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        self.check_depth()?;
        self.before_value()?;
        self.push_context(GenContext::Array { first_done: false });
        self.out.push(b'[');
        if let Some(indenter) = &mut self.indenter {
            indenter.ascend();
        }
        self.spill_if_full()?;
        Ok(self)
    }

    /// Writes a member key inside an object. Exactly one value write
    /// must follow before the next key or `write_end`.
    pub fn write_key(&mut self, name: &str) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        match &mut self.current {
            GenContext::Object {
                first_done,
                key_pending,
            } => {
                if *key_pending {
                    return Err(GenError::Grammar(
                        "a key was already written, expected its value".to_string(),
                    ));
                }
                if *first_done {
                    self.out.push(b',');
                }
                *first_done = true;
                *key_pending = true;
            }
            _ => {
                return Err(GenError::Grammar(
                    "write_key() is valid only in object context".to_string(),
                ))
            }
        }
        if let Some(indenter) = &self.indenter {
            indenter.write_break(&mut self.out);
        }
        self.write_escaped(name);
        self.out.push(b':');
        if let Some(indenter) = &self.indenter {
            indenter.space_after_colon(&mut self.out);
        }
        self.spill_if_full()?;
        Ok(self)
    }

    /// Closes the innermost open object or array.
    pub fn write_end(&mut self) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        let (close_byte, non_empty) = match self.current {
            GenContext::Root { .. } => {
                return Err(GenError::Grammar(
                    "no open object or array to end".to_string(),
                ))
            }
            GenContext::Object {
                key_pending: true, ..
            } => {
                return Err(GenError::Grammar(
                    "dangling key: expected a value before closing the object".to_string(),
                ))
            }
            GenContext::Object { first_done, .. } => (b'}', first_done),
            GenContext::Array { first_done } => (b']', first_done),
        };
        if let Some(indenter) = &mut self.indenter {
            indenter.descend();
            if non_empty {
                indenter.write_break(&mut self.out);
            }
        }
        self.out.push(close_byte);
        self.pop_context();
        self.spill_if_full()?;
        Ok(self)
    }

    /// Writes a string value, escaped as needed.
    pub fn write_string(&mut self, value: &str) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        self.before_value()?;
        self.write_escaped(value);
        self.spill_if_full()?;
        Ok(self)
    }

    /// Writes an `i32` value.
    pub fn write_int(&mut self, value: i32) -> Result<&mut Self, GenError> {
        self.write_displayed(value)
    }

    /// Writes an `i64` value.
    pub fn write_long(&mut self, value: i64) -> Result<&mut Self, GenError> {
        self.write_displayed(value)
    }

    /// Writes an arbitrary-precision decimal in its canonical text form.
    pub fn write_decimal(&mut self, value: &Decimal) -> Result<&mut Self, GenError> {
        self.write_displayed(value)
    }

    /// Writes a parsed number back out in its canonical text form.
    pub fn write_number(&mut self, value: &JsonNumber) -> Result<&mut Self, GenError> {
        self.write_displayed(value)
    }

    /// Writes a double, subject to the configured
    /// [`NonFinitePolicy`] for NaN and the infinities.
    pub fn write_f64(&mut self, value: f64) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        if !value.is_finite() {
            return match self.non_finite {
                NonFinitePolicy::Reject => Err(GenError::NumberFormat(format!(
                    "double value {value} has no JSON representation"
                ))),
                NonFinitePolicy::AsNull => self.write_null(),
                NonFinitePolicy::AsString => {
                    let sentinel = if value.is_nan() {
                        "NaN"
                    } else if value > 0.0 {
                        "Infinity"
                    } else {
                        "-Infinity"
                    };
                    self.write_string(sentinel)
                }
            };
        }
        self.write_displayed(value)
    }

    /// Writes `true` or `false`.
    pub fn write_bool(&mut self, value: bool) -> Result<&mut Self, GenError> {
        self.write_literal(if value { "true" } else { "false" })
    }

    /// Writes `null`.
    pub fn write_null(&mut self) -> Result<&mut Self, GenError> {
        self.write_literal("null")
    }

    /// Key and string value in one call.
    pub fn write_string_member(&mut self, name: &str, value: &str) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_string(value)
    }

    /// Key and `i32` value in one call.
    pub fn write_int_member(&mut self, name: &str, value: i32) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_int(value)
    }

    /// Key and `i64` value in one call.
    pub fn write_long_member(&mut self, name: &str, value: i64) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_long(value)
    }

    /// Key and double value in one call.
    pub fn write_f64_member(&mut self, name: &str, value: f64) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_f64(value)
    }

    /// Key and decimal value in one call.
    pub fn write_decimal_member(
        &mut self,
        name: &str,
        value: &Decimal,
    ) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_decimal(value)
    }

    /// Key and boolean value in one call.
    pub fn write_bool_member(&mut self, name: &str, value: bool) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_bool(value)
    }

    /// Key and `null` in one call.
    pub fn write_null_member(&mut self, name: &str) -> Result<&mut Self, GenError> {
        self.write_key(name)?.write_null()
    }

    /// Spills staged output and flushes the sink. The session stays
    /// usable.
    pub fn flush(&mut self) -> Result<(), GenError> {
        self.ensure_open()?;
        self.spill()?;
        self.sink.flush().map_err(GenError::Io)
    }

    /// Finishes the session.
    ///
    /// Fails with [`GenError::Grammar`] if containers are still open or
    /// no top-level value was written; staged output is discarded in
    /// that case rather than flushed. On success all staged output
    /// reaches the sink and the sink is flushed. Idempotent; every
    /// writer fails after the first `close`.
    pub fn close(&mut self) -> Result<(), GenError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let complete = self.stack.is_empty()
            && matches!(
                self.current,
                GenContext::Root {
                    value_written: true
                }
            );
        if !complete {
            self.out.release();
            let detail = if self.stack.is_empty() && matches!(self.current, GenContext::Root { .. })
            {
                "no top-level value written"
            } else {
                "unclosed containers remain"
            };
            return Err(GenError::Grammar(format!(
                "generating incomplete JSON: {detail}"
            )));
        }
        let spilled = self.spill();
        self.out.release();
        spilled?;
        self.sink.flush().map_err(GenError::Io)
    }

    fn ensure_open(&self) -> Result<(), GenError> {
        if self.closed {
            return Err(GenError::Grammar("generator is closed".to_string()));
        }
        Ok(())
    }

    /// Validates that a value may appear here and stages any separator
    /// the context requires. Errors before any byte is staged.
    fn before_value(&mut self) -> Result<(), GenError> {
        match &mut self.current {
            GenContext::Root { value_written } => {
                if *value_written {
                    return Err(GenError::Grammar(
                        "only one top-level value is allowed".to_string(),
                    ));
                }
                *value_written = true;
            }
            GenContext::Object { key_pending, .. } => {
                if !*key_pending {
                    return Err(GenError::Grammar(
                        "expected write_key() before a value in object context".to_string(),
                    ));
                }
                *key_pending = false;
            }
            GenContext::Array { first_done } => {
                if *first_done {
                    self.out.push(b',');
                }
                *first_done = true;
                if let Some(indenter) = &self.indenter {
                    indenter.write_break(&mut self.out);
                }
            }
        }
        Ok(())
    }

    fn check_depth(&self) -> Result<(), GenError> {
        let depth = self.stack.len() + 1;
        if depth >= self.max_depth {
            return Err(GenError::Limit(format!(
                "nesting depth {depth} exceeds the configured maximum depth {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn push_context(&mut self, context: GenContext) {
        self.stack.push(self.current);
        self.current = context;
    }

    fn pop_context(&mut self) {
        // The root frame below the first push already records that its
        // one value exists, so a second top-level container is refused.
        self.current = self.stack.pop().unwrap_or(GenContext::Root {
            value_written: true,
        });
    }

    fn write_literal(&mut self, text: &str) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        self.before_value()?;
        self.out.extend_from_slice(text.as_bytes());
        self.spill_if_full()?;
        Ok(self)
    }

    fn write_displayed<T: std::fmt::Display>(&mut self, value: T) -> Result<&mut Self, GenError> {
        self.ensure_open()?;
        self.before_value()?;
        write!(&mut *self.out, "{value}").map_err(GenError::Io)?;
        self.spill_if_full()?;
        Ok(self)
    }

    /// Stages `text` as a quoted JSON string.
    fn write_escaped(&mut self, text: &str) {
        self.out.push(b'"');
        for ch in text.chars() {
            match escape_for(ch) {
                WriteEscape::None => {
                    let mut utf8 = [0u8; 4];
                    self.out
                        .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                }
                WriteEscape::Short(sequence) => self.out.extend_from_slice(sequence.as_bytes()),
                WriteEscape::Unicode(code) => {
                    let digits = [
                        b"0123456789abcdef"[(code >> 12 & 0xF) as usize],
                        b"0123456789abcdef"[(code >> 8 & 0xF) as usize],
                        b"0123456789abcdef"[(code >> 4 & 0xF) as usize],
                        b"0123456789abcdef"[(code & 0xF) as usize],
                    ];
                    self.out.extend_from_slice(b"\\u");
                    self.out.extend_from_slice(&digits);
                }
            }
        }
        self.out.push(b'"');
    }

    fn spill_if_full(&mut self) -> Result<(), GenError> {
        if self.out.len() >= SPILL_THRESHOLD {
            self.spill()?;
        }
        Ok(())
    }

    fn spill(&mut self) -> Result<(), GenError> {
        if !self.out.is_empty() {
            self.sink.write_all(&self.out).map_err(GenError::Io)?;
            self.out.clear();
        }
        Ok(())
    }
}
