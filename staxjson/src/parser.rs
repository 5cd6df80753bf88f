// SPDX-License-Identifier: Apache-2.0

//! The event layer: a pull parser over the tokenizer.
//!
//! Grammar state is a current [`Context`] plus a stack of the enclosing
//! ones. Each `next_event` call consumes one token (occasionally two, for
//! the `:` and `,` separators which never surface as events) and maps it
//! to an [`Event`] legal in the current context, or a grammar error.

use crate::config::ParserConfig;
use crate::encoding::{DecodingReader, Encoding};
use crate::error::ParseError;
use crate::location::Location;
use crate::number::{self, Decimal, JsonNumber};
use crate::tokenizer::{Token, Tokenizer};
use log::debug;
use num_bigint::BigInt;
use std::io;

/// Parser events, in declaration order that doubles as the completion
/// order: everything greater than `KeyName` is a value or a container
/// end, which is exactly what may finish a document at top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Event {
    StartObject,
    StartArray,
    KeyName,
    ValueString,
    ValueNumber,
    ValueTrue,
    ValueFalse,
    ValueNull,
    EndObject,
    EndArray,
}

impl Event {
    /// True when this event can complete a top-level value.
    pub(crate) fn completes_value(self) -> bool {
        self > Event::KeyName
    }
}

/// Grammar context. A closed set dispatched by match; the stack holds the
/// enclosing contexts with the innermost one in `JsonParser::current`.
#[derive(Debug, Clone, Copy)]
enum Context {
    Root,
    Object { first_done: bool },
    Array { first_done: bool },
}

/// Streaming pull parser for JSON text.
///
/// Events come one at a time from [`next_event`](Self::next_event);
/// value accessors read the current event's payload without copying when
/// the text had no escapes. The parser is fail-fast: the first error
/// poisons the session.
pub struct JsonParser<R> {
    tokenizer: Tokenizer<R>,
    stack: Vec<Context>,
    current: Context,
    current_event: Option<Event>,
    max_depth: usize,
    max_bigint_scale: u64,
    closed: bool,
    failed: bool,
}

impl<'a> JsonParser<&'a [u8]> {
    /// Parse JSON from a string slice.
    pub fn from_str(text: &'a str) -> Self {
        Self::from_str_with_config(text, ParserConfig::default())
    }

    pub fn from_str_with_config(text: &'a str, config: ParserConfig) -> Self {
        let source = DecodingReader::with_encoding(text.as_bytes(), Encoding::Utf8);
        Self::build(source, config)
    }
}

impl<R: io::Read> JsonParser<R> {
    /// Parse JSON from a byte reader, autodetecting the encoding from
    /// its first bytes.
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with_config(reader, ParserConfig::default())
    }

    pub fn from_reader_with_config(reader: R, config: ParserConfig) -> Self {
        Self::build(DecodingReader::detecting(reader), config)
    }

    /// Parse JSON from a byte reader in a known encoding, skipping a
    /// matching BOM if one is present.
    pub fn from_reader_with_encoding(reader: R, encoding: Encoding, config: ParserConfig) -> Self {
        Self::build(DecodingReader::with_encoding(reader, encoding), config)
    }

    fn build(source: DecodingReader<R>, config: ParserConfig) -> Self {
        debug!(
            "parse session: max_depth={} max_number_length={} max_bigint_scale={}",
            config.max_depth, config.max_number_length, config.max_bigint_scale
        );
        JsonParser {
            tokenizer: Tokenizer::new(source, &config.pool, config.max_number_length),
            stack: Vec::with_capacity(config.max_depth.min(4096)),
            current: Context::Root,
            current_event: None,
            max_depth: config.max_depth,
            max_bigint_scale: config.max_bigint_scale,
            closed: false,
            failed: false,
        }
    }

    /// Whether another event is available.
    ///
    /// Once the top-level value is complete this looks one token ahead:
    /// anything but end of input there is a grammar error, so `"1 2"` is
    /// rejected rather than silently stopping after the first root.
    pub fn has_next(&mut self) -> Result<bool, ParseError> {
        self.ensure_open()?;
        let result = self.probe_end();
        self.note_failure(&result);
        result
    }

    fn probe_end(&mut self) -> Result<bool, ParseError> {
        if self.stack.is_empty() {
            if let Some(event) = self.current_event {
                if event.completes_value() {
                    let token = self.tokenizer.next_token()?;
                    if token != Token::Eof {
                        return Err(self.grammar(format!(
                            "expected end of input, but found {token}"
                        )));
                    }
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Advance to the next event.
    pub fn next_event(&mut self) -> Result<Event, ParseError> {
        self.ensure_open()?;
        let result = self.advance();
        self.note_failure(&result);
        result
    }

    fn advance(&mut self) -> Result<Event, ParseError> {
        if !self.probe_end()? {
            return Err(ParseError::State("no more parsing events".to_string()));
        }
        // The previous value is dead once the caller moves on; let the
        // tokenizer compact it away.
        self.tokenizer.clear_span();
        let token = self.tokenizer.next_token()?;
        let event = match self.current {
            Context::Root => self.value_event(token, "a JSON value"),
            Context::Object { first_done } => self.object_event(token, first_done),
            Context::Array { first_done } => self.array_event(token, first_done),
        }?;
        self.current_event = Some(event);
        Ok(event)
    }

    /// The event the parser is currently positioned on.
    pub fn current_event(&self) -> Option<Event> {
        self.current_event
    }

    /// Position of the next character to be consumed, for diagnostics.
    pub fn location(&self) -> Location {
        self.tokenizer.location()
    }

    /// Skip the array whose `StartArray` is the current event, without
    /// materializing any of the values inside. A no-op at any other
    /// position. Afterwards the current event is the matching `EndArray`.
    pub fn skip_array(&mut self) -> Result<(), ParseError> {
        self.ensure_open()?;
        if self.current_event != Some(Event::StartArray) {
            return Ok(());
        }
        let result =
            self.skip_container(Token::BracketOpen, Token::BracketClose, Event::EndArray, "array");
        self.note_failure(&result);
        result
    }

    /// Skip the object whose `StartObject` is the current event. A no-op
    /// at any other position. Afterwards the current event is the
    /// matching `EndObject`.
    pub fn skip_object(&mut self) -> Result<(), ParseError> {
        self.ensure_open()?;
        if self.current_event != Some(Event::StartObject) {
            return Ok(());
        }
        let result =
            self.skip_container(Token::BraceOpen, Token::BraceClose, Event::EndObject, "object");
        self.note_failure(&result);
        result
    }

    /// Replay raw tokens, counting brackets of the container's own kind,
    /// until its close token balances the open. Values inside are scanned
    /// but never classified or copied.
    fn skip_container(
        &mut self,
        open: Token,
        close: Token,
        end_event: Event,
        kind: &str,
    ) -> Result<(), ParseError> {
        self.tokenizer.clear_span();
        let mut depth: usize = 1;
        while depth > 0 {
            let token = self.tokenizer.next_token()?;
            if token == open {
                depth += 1;
            } else if token == close {
                depth -= 1;
            } else if token == Token::Eof {
                return Err(ParseError::Grammar {
                    message: format!("unexpected end of input inside a skipped {kind}"),
                    location: self.tokenizer.location(),
                });
            }
        }
        self.pop_context();
        self.current_event = Some(end_event);
        Ok(())
    }

    /// The text of the current `KeyName` or `ValueString`, or the exact
    /// source literal of the current `ValueNumber`.
    pub fn get_string(&self) -> Result<&str, ParseError> {
        self.ensure_open()?;
        match self.current_event {
            Some(Event::KeyName) | Some(Event::ValueString) => self.tokenizer.string_value(),
            Some(Event::ValueNumber) => self.tokenizer.number_literal(),
            other => Err(state_error(
                "get_string()",
                "KeyName, ValueString or ValueNumber",
                other,
            )),
        }
    }

    /// The current number in its narrowest lossless representation.
    pub fn get_number(&self) -> Result<JsonNumber, ParseError> {
        self.require_number("get_number()")?;
        let literal = self.tokenizer.number_literal()?;
        let shape = self.tokenizer.number_shape();
        number::classify(literal, shape.integral, shape.digits).map_err(ParseError::from)
    }

    /// The current number as an exact `i32`.
    pub fn get_int(&self) -> Result<i32, ParseError> {
        self.require_number("get_int()")?;
        Ok(self.get_number()?.as_i32()?)
    }

    /// The current number as an exact `i64`.
    pub fn get_long(&self) -> Result<i64, ParseError> {
        self.require_number("get_long()")?;
        Ok(self.get_number()?.as_i64()?)
    }

    /// The current number as a decimal, preserving its source scale.
    pub fn get_decimal(&self) -> Result<Decimal, ParseError> {
        self.require_number("get_decimal()")?;
        Ok(self.get_number()?.to_decimal())
    }

    /// The current number as an exact integer, with the configured scale
    /// ceiling bounding how far a negative scale may be multiplied out.
    pub fn get_exact_integer(&self) -> Result<BigInt, ParseError> {
        self.require_number("get_exact_integer()")?;
        Ok(self.get_number()?.to_bigint_exact(self.max_bigint_scale)?)
    }

    /// Whether the current number's scale is zero. `2.5E1` is integral;
    /// `1.0` is not.
    pub fn is_integral(&self) -> Result<bool, ParseError> {
        self.require_number("is_integral()")?;
        Ok(self.get_number()?.is_integral())
    }

    /// Release the session's pooled buffer. Idempotent; every later call
    /// on the parser fails with a state error.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.current_event = None;
            self.tokenizer.release_buffer();
        }
    }

    fn ensure_open(&self) -> Result<(), ParseError> {
        if self.closed {
            return Err(ParseError::State("parser is closed".to_string()));
        }
        if self.failed {
            return Err(ParseError::State("parser already failed".to_string()));
        }
        Ok(())
    }

    /// Records a fatal error. State errors are advisory, everything else
    /// leaves the token stream in no condition to continue.
    fn note_failure<T>(&mut self, result: &Result<T, ParseError>) {
        if let Err(err) = result {
            if !matches!(err, ParseError::State(_)) {
                self.failed = true;
            }
        }
    }

    fn require_number(&self, operation: &str) -> Result<(), ParseError> {
        self.ensure_open()?;
        if self.current_event != Some(Event::ValueNumber) {
            return Err(state_error(operation, "ValueNumber", self.current_event));
        }
        Ok(())
    }

    fn value_event(&mut self, token: Token, expected: &str) -> Result<Event, ParseError> {
        match token {
            Token::BraceOpen => {
                self.push_context(Context::Object { first_done: false })?;
                Ok(Event::StartObject)
            }
            Token::BracketOpen => {
                self.push_context(Context::Array { first_done: false })?;
                Ok(Event::StartArray)
            }
            Token::Str => Ok(Event::ValueString),
            Token::Number => Ok(Event::ValueNumber),
            Token::True => Ok(Event::ValueTrue),
            Token::False => Ok(Event::ValueFalse),
            Token::Null => Ok(Event::ValueNull),
            Token::Eof => Err(self.grammar(format!("unexpected end of input, expected {expected}"))),
            other => Err(self.grammar(format!("unexpected token {other}, expected {expected}"))),
        }
    }

    fn object_event(&mut self, token: Token, first_done: bool) -> Result<Event, ParseError> {
        if self.current_event == Some(Event::KeyName) {
            if token != Token::Colon {
                return Err(self.grammar(format!(
                    "expected ':' after object key, but found {token}"
                )));
            }
            let value_token = self.tokenizer.next_token()?;
            return self.value_event(value_token, "a value after ':'");
        }
        match token {
            Token::BraceClose => {
                self.pop_context();
                Ok(Event::EndObject)
            }
            Token::Comma if first_done => {
                let key = self.tokenizer.next_token()?;
                if key != Token::Str {
                    return Err(self.grammar(format!("expected an object key, but found {key}")));
                }
                Ok(Event::KeyName)
            }
            Token::Str if !first_done => {
                self.mark_first();
                Ok(Event::KeyName)
            }
            Token::Eof => Err(self.grammar("unexpected end of input inside an object".to_string())),
            other if first_done => Err(self.grammar(format!(
                "expected ',' or '}}' in object, but found {other}"
            ))),
            other => Err(self.grammar(format!(
                "expected an object key or '}}', but found {other}"
            ))),
        }
    }

    fn array_event(&mut self, token: Token, first_done: bool) -> Result<Event, ParseError> {
        if token == Token::BracketClose {
            self.pop_context();
            return Ok(Event::EndArray);
        }
        if first_done {
            if token == Token::Eof {
                return Err(
                    self.grammar("unexpected end of input inside an array".to_string())
                );
            }
            if token != Token::Comma {
                return Err(self.grammar(format!(
                    "expected ',' or ']' in array, but found {token}"
                )));
            }
            let value_token = self.tokenizer.next_token()?;
            self.value_event(value_token, "a value after ','")
        } else {
            self.mark_first();
            self.value_event(token, "a value or ']'")
        }
    }

    fn mark_first(&mut self) {
        match &mut self.current {
            Context::Object { first_done } | Context::Array { first_done } => *first_done = true,
            Context::Root => {}
        }
    }

    fn push_context(&mut self, context: Context) -> Result<(), ParseError> {
        let depth = self.stack.len() + 1;
        if depth >= self.max_depth {
            return Err(ParseError::Limit {
                message: format!(
                    "nesting depth {depth} exceeds the configured maximum depth {}",
                    self.max_depth
                ),
                location: self.tokenizer.token_location(),
            });
        }
        self.stack.push(self.current);
        self.current = context;
        Ok(())
    }

    fn pop_context(&mut self) {
        // The grammar admits a close token only inside a container, so
        // the stack is never empty here.
        self.current = self.stack.pop().unwrap_or(Context::Root);
    }

    fn grammar(&self, message: String) -> ParseError {
        ParseError::Grammar {
            message,
            location: self.tokenizer.token_location(),
        }
    }
}

fn state_error(operation: &str, valid: &str, current: Option<Event>) -> ParseError {
    let current = match current {
        Some(event) => format!("{event:?}"),
        None => "none".to_string(),
    };
    ParseError::State(format!(
        "{operation} is valid only for {valid} (current event: {current})"
    ))
}
