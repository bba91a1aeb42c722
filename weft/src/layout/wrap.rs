// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-wrap and line-break state machines.
//!
//! The layout passes carry a [`WrapState`] remembering the most recent safe
//! wrap point of the current line and a [`BreakState`] tracking consecutive
//! break heights; the draw loop walks the recorded wrap indices back with a
//! [`WrapCursor`] and mirrors the break-height logic in [`DrawBreakState`].

use crate::align::Align;
use crate::glyph::GlyphId;
use crate::layout::{ELIDE_BIT, RunLayout, WRAP_INDEX_MASK};
use crate::strand::{Strand, WrapClass};

/// Greedy wrap tracking for one line of a layout pass.
#[derive(Clone, Default, Debug)]
pub(crate) struct WrapState {
    found_safe_point: bool,
    line_char_count: u32,
    safe_width: i32,
    safe_index: usize,
    safe_class: Option<WrapClass>,
}

impl WrapState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bump_char_count(&mut self) {
        self.line_char_count += 1;
    }

    /// Records the glyph as the line's most recent safe wrap point if it is
    /// wrappable. `pre_x` is the pen before the glyph, `post_x` after it.
    pub(crate) fn note_fit(
        &mut self,
        strand: &Strand,
        glyph: GlyphId,
        index: usize,
        pre_x: i32,
        post_x: i32,
    ) {
        if strand.can_wrap(glyph, WrapClass::After) {
            self.safe_index = index + 1;
            self.safe_class = Some(WrapClass::After);
            self.found_safe_point = true;
            self.safe_width = post_x;
        } else if strand.can_wrap(glyph, WrapClass::Elide) {
            self.safe_index = index;
            self.safe_class = Some(WrapClass::Elide);
            self.found_safe_point = true;
            self.safe_width = pre_x;
        } else if strand.can_wrap(glyph, WrapClass::Before) {
            self.safe_index = index;
            self.safe_class = Some(WrapClass::Before);
            self.found_safe_point = true;
            self.safe_width = pre_x;
        }
    }

    /// Selects the break point for a glyph that overflowed the line.
    /// Returns the index to continue on and the finished line's width.
    pub(crate) fn break_at(
        &mut self,
        run: &mut RunLayout,
        strand: &Strand,
        glyph: GlyphId,
        index: usize,
        pre_x: i32,
        post_x: i32,
    ) -> (usize, i32) {
        let mut index = index;
        let mut post_x = post_x;
        if self.line_char_count > 1 && strand.can_wrap(glyph, WrapClass::Elide) {
            // The overflowing glyph itself absorbs the break.
            run.wrap_indices.push(index as u16 | ELIDE_BIT);
            index += 1;
            post_x = pre_x;
        } else if self.line_char_count > 1 && strand.can_wrap(glyph, WrapClass::Before) {
            // The glyph moves to the new line; retry it there.
            run.wrap_indices.push(index as u16);
        } else if self.found_safe_point {
            let mut wrap_index = self.safe_index as u16;
            if self.safe_class == Some(WrapClass::Elide) {
                wrap_index |= ELIDE_BIT;
                self.safe_index += 1;
            }
            post_x = self.safe_width;
            run.wrap_indices.push(wrap_index);
            index = self.safe_index;
        } else if self.line_char_count == 1 {
            // A single glyph wider than the line: keep it and move on. At
            // the end of the stream there is nothing left to wrap.
            index += 1;
            if index < run.glyphs.len() {
                run.wrap_indices.push(index as u16);
            }
        } else {
            // No safe point at all: force-break before the current glyph.
            post_x = pre_x;
            run.wrap_indices.push(index as u16);
        }

        self.post_break(index);
        (index, post_x)
    }

    /// Resets wrap tracking after any break; `index` is where the new line
    /// starts.
    pub(crate) fn post_break(&mut self, index: usize) {
        self.found_safe_point = false;
        self.safe_index = index;
        self.safe_width = 0;
        self.safe_class = None;
        self.line_char_count = 0;
    }
}

/// Line-break bookkeeping for a layout pass: break heights, the paragraph
/// rule, and the line-length/bound side effects of committing a line.
#[derive(Clone, Debug)]
pub(crate) struct BreakState {
    break_height: i32,
    consecutive_breaks: i32,
    breaks_only: bool,
}

pub(crate) fn par_break_height(height: i32, consecutive: i32, par_break: bool) -> i32 {
    if !par_break {
        return height;
    }
    match consecutive {
        2 => height >> 1,
        // The third break completes the previous half break.
        3 => height - (height >> 1),
        _ => height,
    }
}

impl BreakState {
    pub(crate) fn new(break_height: i32) -> Self {
        Self {
            break_height,
            consecutive_breaks: 0,
            breaks_only: true,
        }
    }

    pub(crate) fn note_glyph(&mut self) {
        self.breaks_only = false;
        self.consecutive_breaks = 0;
    }

    /// Commits a line of extent `left..right` and returns the advanced
    /// vertical position. Updates line lengths, horizontal bounds and the
    /// multiline flag; the caller stores the returned value.
    pub(crate) fn apply(
        &mut self,
        run: &mut RunLayout,
        par_break: bool,
        left: i32,
        right: i32,
        y: i32,
    ) -> i32 {
        if !run.is_multiline && (!self.breaks_only || run.glyphs.len() > 1) {
            run.is_multiline = true;
        }
        self.consecutive_breaks += 1;
        let line_len = right - left;
        run.line_lengths.push(line_len.max(0) as u16);
        if right > run.right {
            run.right = right;
        }
        if left < run.left {
            run.left = left;
        }
        y + par_break_height(self.break_height, self.consecutive_breaks, par_break)
    }

    /// Commits the final line and settles the bottom bound. Runs made of
    /// line breaks alone have no last-line descent to account for; instead
    /// the first-line ascent is taken back out.
    pub(crate) fn finish(&self, run: &mut RunLayout, x: i32) {
        if x > run.right {
            run.right = x;
        }
        run.line_lengths.push(x.max(0) as u16);
        if self.breaks_only {
            run.bottom -= run.first_line_ascent;
        } else {
            run.bottom += run.last_line_descent;
        }
    }
}

/// Computes where a line starts horizontally, given the alignment anchor.
pub(crate) fn line_start(align: Align, run: &RunLayout, origin: i32, line: u16) -> i32 {
    let length = i32::from(run.line_lengths[line as usize]);
    match align.horz() {
        Align::LEFT => origin,
        Align::HORZ_CENTER => origin - (length >> 1),
        Align::RIGHT => origin - length,
        _ => panic!("renderer align has no horizontal component"),
    }
}

/// Walks the recorded wrap indices of a run, in order, during drawing.
#[derive(Clone, Debug)]
pub(crate) struct WrapCursor {
    next_index: u16,
    slice_pos: usize,
    elide: bool,
}

impl WrapCursor {
    pub(crate) fn new(run: &RunLayout) -> Self {
        let mut cursor = Self {
            next_index: u16::MAX,
            slice_pos: 0,
            elide: false,
        };
        cursor.advance(run);
        cursor
    }

    pub(crate) fn advance(&mut self, run: &RunLayout) {
        if run.wrap_indices.len() <= self.slice_pos {
            self.next_index = u16::MAX;
        } else {
            let value = run.wrap_indices[self.slice_pos];
            self.elide = value & ELIDE_BIT != 0;
            self.next_index = value & WRAP_INDEX_MASK;
            self.slice_pos += 1;
        }
    }

    pub(crate) fn is_wrap(&self, index: usize) -> bool {
        index as u16 == self.next_index
    }

    pub(crate) fn is_elide(&self) -> bool {
        self.elide
    }
}

/// Line-break bookkeeping for the draw loop.
#[derive(Clone, Debug)]
pub(crate) struct DrawBreakState {
    break_height: i32,
    consecutive_breaks: i32,
    line_index: u16,
}

impl DrawBreakState {
    pub(crate) fn new(break_height: i32) -> Self {
        Self {
            break_height,
            consecutive_breaks: 0,
            line_index: 0,
        }
    }

    pub(crate) fn note_glyph(&mut self) {
        self.consecutive_breaks = 0;
    }

    fn next_height(&self, par_break: bool) -> i32 {
        par_break_height(self.break_height, self.consecutive_breaks, par_break)
    }

    pub(crate) fn apply_horz(
        &mut self,
        run: &RunLayout,
        align: Align,
        par_break: bool,
        origin_x: i32,
        y: i32,
    ) -> (i32, i32) {
        self.line_index += 1;
        self.consecutive_breaks += 1;
        let x = line_start(align, run, origin_x, self.line_index);
        (x, y + self.next_height(par_break))
    }

    pub(crate) fn apply_sideways(
        &mut self,
        run: &RunLayout,
        align: Align,
        par_break: bool,
        x: i32,
        origin_y: i32,
    ) -> (i32, i32) {
        self.line_index += 1;
        self.consecutive_breaks += 1;
        let y = origin_y - (line_start(align, run, origin_y, self.line_index) - origin_y);
        (x + self.next_height(par_break), y)
    }

    pub(crate) fn apply_sideways_right(
        &mut self,
        run: &RunLayout,
        align: Align,
        par_break: bool,
        x: i32,
        origin_y: i32,
    ) -> (i32, i32) {
        self.line_index += 1;
        self.consecutive_breaks += 1;
        let y = line_start(align, run, origin_y, self.line_index);
        (x - self.next_height(par_break), y)
    }
}
