// SPDX-License-Identifier: Apache-2.0

mod buffer_pool;
pub use buffer_pool::{BufferPool, VecPool};

mod config;
pub use config::{GeneratorConfig, NonFinitePolicy, ParserConfig};

mod encoding;
pub use encoding::Encoding;

mod error;
pub use error::{GenError, NumberError, ParseError};

mod escape;

mod generator;
pub use generator::JsonGenerator;

mod location;
pub use location::Location;

mod number;
pub use number::{Decimal, JsonNumber};

mod parser;
pub use parser::{Event, JsonParser};

mod pretty;

mod stream;
pub use stream::{ArrayStream, ObjectStream, ValueStream};

mod tokenizer;
