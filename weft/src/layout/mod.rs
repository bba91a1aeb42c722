// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run layout: per-glyph advances, kernings, line lengths, wrap points and
//! the overall bounding rectangle of a glyph stream.

mod compute;
pub(crate) mod wrap;

pub(crate) use compute::compute_run_layout;

use crate::glyph::PackedGlyph;
use crate::strand::Strand;

/// Hard bound on the number of glyphs a single operation may process.
pub(crate) const MAX_RUN_GLYPHS: usize = 32_000;

/// Top bit of a wrap index, flagging the elide variant: the glyph at the
/// index is consumed by the wrap and not drawn.
pub(crate) const ELIDE_BIT: u16 = 0x8000;
pub(crate) const WRAP_INDEX_MASK: u16 = 0x7FFF;

/// How bounding rectangles are derived.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum BoundingMode {
    /// Font-metrics based: ascent, descent and line height (default).
    #[default]
    Logical,
    /// Logical bounding with descent contributions suppressed (rare).
    LogicalNoDescent,
    /// Glyph-mask rectangle based; requires fetching the full masks.
    Mask,
    /// Mask bounding with descent contributions suppressed (rare).
    MaskNoDescent,
}

impl BoundingMode {
    pub fn is_mask(self) -> bool {
        matches!(self, Self::Mask | Self::MaskNoDescent)
    }

    pub fn no_descent(self) -> bool {
        matches!(self, Self::LogicalNoDescent | Self::MaskNoDescent)
    }
}

/// Inputs a layout pass reads besides the glyph stream.
pub(crate) struct LayoutParams<'a> {
    pub(crate) strand: &'a Strand,
    pub(crate) scale: i32,
    pub(crate) par_break: bool,
}

/// Reusable per-operation buffers, cleared and repopulated on every measure
/// or draw. Buffer capacity grows monotonically across calls.
///
/// All measurements are relative to the first-line baseline origin (0, 0).
#[derive(Clone, Default, Debug)]
pub(crate) struct RunLayout {
    /// The full post-rewrite glyph stream.
    pub(crate) glyphs: Vec<PackedGlyph>,
    /// Scaled advances, parallel to `glyphs`.
    pub(crate) advances: Vec<u16>,
    /// Scaled kernings, parallel to `glyphs`.
    pub(crate) kernings: Vec<i16>,
    /// One entry per produced output line, wrap lines included.
    pub(crate) line_lengths: Vec<u16>,
    /// Sorted glyph indices at which a wrap break is injected; the top bit
    /// flags the elide variant.
    pub(crate) wrap_indices: Vec<u16>,

    pub(crate) left: i32,
    pub(crate) right: i32,
    pub(crate) top: i32,
    pub(crate) bottom: i32,

    pub(crate) first_line_ascent: i32,
    pub(crate) last_line_descent: i32,
    /// Whether the run produced more than one visible line; needed for
    /// last-baseline alignment.
    pub(crate) is_multiline: bool,
}

impl RunLayout {
    /// Resets everything except the glyph stream, resizing the parallel
    /// arrays to match it.
    pub(crate) fn clear_metrics(&mut self) {
        let len = self.glyphs.len();
        self.advances.clear();
        self.advances.resize(len, 0);
        self.kernings.clear();
        self.kernings.resize(len, 0);
        self.line_lengths.clear();
        self.wrap_indices.clear();
        self.left = 0;
        self.right = 0;
        self.top = 0;
        self.bottom = 0;
        self.first_line_ascent = 0;
        self.last_line_descent = 0;
        self.is_multiline = false;
    }

    pub(crate) fn width(&self) -> i32 {
        self.right - self.left
    }

    pub(crate) fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether a line break at `index` is absorbed by the wrap break
    /// immediately preceding it.
    pub(crate) fn elides_line_break(&self, index: usize) -> bool {
        match self.wrap_indices.last() {
            Some(&last) => usize::from(last & WRAP_INDEX_MASK) + 1 == index,
            None => false,
        }
    }
}
