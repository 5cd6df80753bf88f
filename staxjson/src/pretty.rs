// SPDX-License-Identifier: Apache-2.0

//! Indentation state for pretty-printed output.
//!
//! The generator owns the grammar; this type only knows how deep it is
//! and what whitespace to emit at each break point. Plain output simply
//! never calls it.

const INDENT_STEP: &[u8] = b"    ";

/// Tracks nesting depth and writes the whitespace between tokens.
#[derive(Debug)]
pub(crate) struct Indenter {
    level: usize,
}

impl Indenter {
    pub(crate) fn new() -> Self {
        Indenter { level: 0 }
    }

    pub(crate) fn ascend(&mut self) {
        self.level += 1;
    }

    pub(crate) fn descend(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Newline plus indentation at the current level. Written before
    /// every member of a container, the first included, and before a
    /// non-empty container's closing bracket.
    pub(crate) fn write_break(&self, out: &mut Vec<u8>) {
        out.push(b'\n');
        for _ in 0..self.level {
            out.extend_from_slice(INDENT_STEP);
        }
    }

    /// The single space between a key's colon and its value.
    pub(crate) fn space_after_colon(&self, out: &mut Vec<u8>) {
        out.push(b' ');
    }
}
