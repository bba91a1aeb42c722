// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The glyph-rewrite seam.
//!
//! Text fed to a renderer passes through an optional rewrite engine that
//! may reorder or replace glyphs based on matched patterns (ligatures,
//! contextual alternates, and similar). The engine lives behind the
//! [`Rewriter`] trait; the layout engine consumes only its output stream.

use core::fmt;

use crate::glyph::Glyph;

/// The operation a mapping sequence is being run for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Pass {
    Measure,
    Draw,
    /// Re-draw of previously computed buffers; no new text is fed.
    Buffer,
}

/// Error starting a rewrite pass, e.g. because rule conditions reference
/// settings the font doesn't declare.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RewriteError {
    message: String,
}

impl RewriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rewrite error: {}", self.message)
    }
}

impl core::error::Error for RewriteError {}

/// Incremental glyph rewriting over a stream of Unicode scalars.
///
/// Implementations receive scalars one at a time and emit zero or more
/// glyphs per call through the `emit` callback; pattern matchers may hold
/// scalars back until a match resolves, flushing on [`Rewriter::break_run`]
/// or [`Rewriter::finish`].
pub trait Rewriter {
    /// Starts a mapping sequence for the given pass.
    fn begin_pass(&mut self, pass: Pass) -> Result<(), RewriteError>;

    /// Feeds one scalar, emitting any glyphs that became unambiguous.
    fn feed(&mut self, ch: char, emit: &mut dyn FnMut(Glyph));

    /// Flushes pending state without ending the sequence, e.g. at a point
    /// where matching must not cross.
    fn break_run(&mut self, emit: &mut dyn FnMut(Glyph));

    /// Ends the sequence, flushing everything still pending.
    fn finish(&mut self, emit: &mut dyn FnMut(Glyph));

    /// Notifies the end of the pass started by [`Rewriter::begin_pass`].
    fn finish_pass(&mut self, _pass: Pass) {}

    /// Re-evaluates rule conditions after a strand setting change.
    fn refresh_conditions(&mut self, _settings: &[u8]) {}
}
