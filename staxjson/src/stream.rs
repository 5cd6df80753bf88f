// SPDX-License-Identifier: Apache-2.0

//! Lazy, single-pass views over parser events.
//!
//! Each view borrows the parser mutably for its whole lifetime, so the
//! borrow checker enforces the invalidation contract: the parser cannot
//! be advanced behind a live view's back, and a view cannot outlive the
//! parser. Views are cursors, not collections; nothing is buffered and
//! nothing can be replayed.

use crate::error::ParseError;
use crate::location::Location;
use crate::number::{Decimal, JsonNumber};
use crate::parser::{Event, JsonParser};
use num_bigint::BigInt;
use std::fmt;
use std::io;

macro_rules! delegate_accessors {
    () => {
        /// See [`JsonParser::get_string`].
        pub fn get_string(&self) -> Result<&str, ParseError> {
            self.parser.get_string()
        }

        /// See [`JsonParser::get_number`].
        pub fn get_number(&self) -> Result<JsonNumber, ParseError> {
            self.parser.get_number()
        }

        /// See [`JsonParser::get_int`].
        pub fn get_int(&self) -> Result<i32, ParseError> {
            self.parser.get_int()
        }

        /// See [`JsonParser::get_long`].
        pub fn get_long(&self) -> Result<i64, ParseError> {
            self.parser.get_long()
        }

        /// See [`JsonParser::get_decimal`].
        pub fn get_decimal(&self) -> Result<Decimal, ParseError> {
            self.parser.get_decimal()
        }

        /// See [`JsonParser::get_exact_integer`].
        pub fn get_exact_integer(&self) -> Result<BigInt, ParseError> {
            self.parser.get_exact_integer()
        }

        /// See [`JsonParser::is_integral`].
        pub fn is_integral(&self) -> Result<bool, ParseError> {
            self.parser.is_integral()
        }

        /// See [`JsonParser::location`].
        pub fn location(&self) -> Location {
            self.parser.location()
        }
    };
}

/// A view over every remaining event of the document.
pub struct ValueStream<'p, R> {
    parser: &'p mut JsonParser<R>,
    done: bool,
}

impl<'p, R: io::Read> ValueStream<'p, R> {
    pub(crate) fn new(parser: &'p mut JsonParser<R>) -> Self {
        ValueStream {
            parser,
            done: false,
        }
    }

    /// The next event, or `None` once the document is exhausted. After
    /// `None` the view stays exhausted.
    pub fn next_event(&mut self) -> Result<Option<Event>, ParseError> {
        if self.done {
            return Ok(None);
        }
        if !self.parser.has_next()? {
            self.done = true;
            return Ok(None);
        }
        self.parser.next_event().map(Some)
    }

    delegate_accessors!();
}

/// A view over the events inside one array.
///
/// Yields every event between the array's `StartArray` and its matching
/// `EndArray`, including those of nested containers. The matching end is
/// consumed, becomes the parser's current event, and is not yielded.
pub struct ArrayStream<'p, R> {
    parser: &'p mut JsonParser<R>,
    depth: usize,
    done: bool,
}

impl<'p, R: io::Read> ArrayStream<'p, R> {
    pub(crate) fn new(parser: &'p mut JsonParser<R>) -> Result<Self, ParseError> {
        if parser.current_event() != Some(Event::StartArray) {
            return Err(ParseError::State(
                "array_stream() is valid only immediately after StartArray".to_string(),
            ));
        }
        Ok(ArrayStream {
            parser,
            depth: 1,
            done: false,
        })
    }

    /// The next event inside the array, or `None` at its end.
    pub fn next_event(&mut self) -> Result<Option<Event>, ParseError> {
        if self.done {
            return Ok(None);
        }
        let event = self.parser.next_event()?;
        match event {
            Event::StartArray | Event::StartObject => self.depth += 1,
            Event::EndArray | Event::EndObject => {
                self.depth -= 1;
                if self.depth == 0 {
                    self.done = true;
                    return Ok(None);
                }
            }
            _ => {}
        }
        Ok(Some(event))
    }

    delegate_accessors!();
}

impl<R> fmt::Debug for ArrayStream<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayStream")
            .field("depth", &self.depth)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// A view over the events inside one object, `KeyName`s included.
pub struct ObjectStream<'p, R> {
    parser: &'p mut JsonParser<R>,
    depth: usize,
    done: bool,
}

impl<'p, R: io::Read> ObjectStream<'p, R> {
    pub(crate) fn new(parser: &'p mut JsonParser<R>) -> Result<Self, ParseError> {
        if parser.current_event() != Some(Event::StartObject) {
            return Err(ParseError::State(
                "object_stream() is valid only immediately after StartObject".to_string(),
            ));
        }
        Ok(ObjectStream {
            parser,
            depth: 1,
            done: false,
        })
    }

    /// The next event inside the object, or `None` at its end.
    pub fn next_event(&mut self) -> Result<Option<Event>, ParseError> {
        if self.done {
            return Ok(None);
        }
        let event = self.parser.next_event()?;
        match event {
            Event::StartArray | Event::StartObject => self.depth += 1,
            Event::EndArray | Event::EndObject => {
                self.depth -= 1;
                if self.depth == 0 {
                    self.done = true;
                    return Ok(None);
                }
            }
            _ => {}
        }
        Ok(Some(event))
    }

    delegate_accessors!();
}

impl<R> fmt::Debug for ObjectStream<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStream")
            .field("depth", &self.depth)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<R: io::Read> JsonParser<R> {
    /// A view over every remaining event of the document.
    pub fn value_stream(&mut self) -> ValueStream<'_, R> {
        ValueStream::new(self)
    }

    /// A view over the current array's contents. The current event must
    /// be `StartArray`.
    pub fn array_stream(&mut self) -> Result<ArrayStream<'_, R>, ParseError> {
        ArrayStream::new(self)
    }

    /// A view over the current object's contents. The current event must
    /// be `StartObject`.
    pub fn object_stream(&mut self) -> Result<ObjectStream<'_, R>, ParseError> {
        ObjectStream::new(self)
    }
}
