// SPDX-License-Identifier: Apache-2.0

use crate::buffer_pool::{BufferPool, VecPool};
use std::fmt;
use std::sync::Arc;

/// Default ceiling on container nesting.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 500;

/// Default ceiling on the source length of a numeric literal.
pub(crate) const DEFAULT_MAX_NUMBER_LENGTH: usize = 1100;

/// Default ceiling on |scale| when converting a decimal to an integer.
pub(crate) const DEFAULT_MAX_BIGINT_SCALE: u64 = 100_000;

/// How the generator renders doubles that have no JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonFinitePolicy {
    /// Refuse to write NaN and the infinities. The default.
    #[default]
    Reject,
    /// Write `null` in their place.
    AsNull,
    /// Write the string sentinels `"NaN"`, `"Infinity"` and `"-Infinity"`.
    AsString,
}

/// Tunables for a parser session.
///
/// The ceilings exist so hostile input fails fast instead of exhausting
/// memory. Each has a generous default; lower them for untrusted sources.
#[derive(Clone)]
pub struct ParserConfig {
    /// Hard ceiling on container nesting. Opening a container at this
    /// depth is a fatal [`ParseError::Limit`](crate::ParseError::Limit).
    pub max_depth: usize,
    /// Longest numeric literal, in source characters, the tokenizer will
    /// scan before giving up.
    pub max_number_length: usize,
    /// Largest |scale| accepted when converting a decimal to an exact
    /// integer via [`get_exact_integer`](crate::JsonParser::get_exact_integer).
    pub max_bigint_scale: u64,
    /// Pool that supplies the session's working buffer.
    pub pool: Arc<dyn BufferPool>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_number_length: DEFAULT_MAX_NUMBER_LENGTH,
            max_bigint_scale: DEFAULT_MAX_BIGINT_SCALE,
            pool: Arc::new(VecPool::new()),
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        ParserConfig::default()
    }

    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn with_max_number_length(mut self, limit: usize) -> Self {
        self.max_number_length = limit;
        self
    }

    pub fn with_max_bigint_scale(mut self, limit: u64) -> Self {
        self.max_bigint_scale = limit;
        self
    }

    pub fn with_pool(mut self, pool: Arc<dyn BufferPool>) -> Self {
        self.pool = pool;
        self
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("max_depth", &self.max_depth)
            .field("max_number_length", &self.max_number_length)
            .field("max_bigint_scale", &self.max_bigint_scale)
            .finish_non_exhaustive()
    }
}

/// Tunables for a generator session.
#[derive(Clone)]
pub struct GeneratorConfig {
    /// Emit indented multi-line output instead of compact text.
    pub pretty: bool,
    /// Policy for NaN and infinite doubles passed to
    /// [`write_f64`](crate::JsonGenerator::write_f64).
    pub non_finite: NonFinitePolicy,
    /// Hard ceiling on container nesting, mirroring the parser's.
    pub max_depth: usize,
    /// Pool that supplies the session's output staging buffer.
    pub pool: Arc<dyn BufferPool>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            pretty: false,
            non_finite: NonFinitePolicy::Reject,
            max_depth: DEFAULT_MAX_DEPTH,
            pool: Arc::new(VecPool::new()),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        GeneratorConfig::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn with_pool(mut self, pool: Arc<dyn BufferPool>) -> Self {
        self.pool = pool;
        self
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("pretty", &self.pretty)
            .field("non_finite", &self.non_finite)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_depth, 500);
        assert_eq!(config.max_number_length, 1100);
        assert_eq!(config.max_bigint_scale, 100_000);
    }

    #[test]
    fn test_parser_builders() {
        let config = ParserConfig::new()
            .with_max_depth(16)
            .with_max_number_length(50)
            .with_max_bigint_scale(10);
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.max_number_length, 50);
        assert_eq!(config.max_bigint_scale, 10);
    }

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorConfig::default();
        assert!(!config.pretty);
        assert_eq!(config.non_finite, NonFinitePolicy::Reject);
        assert_eq!(config.max_depth, 500);
    }

    #[test]
    fn test_shared_pool_is_same_instance() {
        let pool: Arc<dyn BufferPool> = Arc::new(VecPool::new());
        let a = ParserConfig::new().with_pool(Arc::clone(&pool));
        let b = ParserConfig::new().with_pool(Arc::clone(&pool));
        assert!(Arc::ptr_eq(&a.pool, &b.pool));
    }
}
