// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Origin placement and the draw loop.

mod raster;

pub use raster::{Pixmap, Target};
pub(crate) use raster::{Orientation, draw_mask};

use crate::align::Align;
use crate::blend::PremulRgba;
use crate::direction::Direction;
use crate::font::Metrics;
use crate::glyph::{Glyph, GlyphId};
use crate::layout::RunLayout;
use crate::layout::wrap::{DrawBreakState, WrapCursor, line_start};
use crate::strand::Strand;

/// Parameters of a single glyph draw command.
#[derive(Copy, Clone, Debug)]
pub struct DrawParams {
    /// Baseline position of the glyph on the target.
    pub x: i32,
    pub y: i32,
    pub scale: i32,
    /// Resolved pass color for the main dye, premultiplied.
    pub rgba: PremulRgba,
}

/// Receives per-glyph draw commands in reading order.
///
/// Installing one on a renderer replaces the built-in mask compositor,
/// which is how custom draw backends hook in.
pub trait GlyphEmitter {
    fn emit(&mut self, target: &mut dyn Target, glyph: GlyphId, params: DrawParams);
}

/// The passes of a draw operation, in emission order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PaintPass {
    Shadow,
    Main,
}

/// Maps the user anchor to the baseline origin of the first line, given the
/// run bounds, the alignment policy and the writing direction.
pub(crate) fn compute_origin(
    run: &RunLayout,
    metrics: &Metrics,
    align: Align,
    direction: Direction,
    scale: i32,
    x: i32,
    y: i32,
) -> (i32, i32) {
    let shift = match align.vert() {
        Align::TOP => -run.top,
        Align::CAP_LINE => {
            let shift = metrics.uppercase_ascent * scale;
            // Fonts without uppercase metrics fall back to the run top.
            if shift == 0 { -run.top } else { shift }
        }
        Align::MIDLINE => {
            let shift = metrics.midline_ascent * scale;
            if shift == 0 { (-run.top) >> 1 } else { shift }
        }
        Align::VERT_CENTER => -run.top - ((run.bottom - run.top) >> 1),
        Align::BASELINE => 0,
        Align::BOTTOM => -run.bottom,
        Align::LAST_BASELINE => {
            if run.is_multiline {
                -(run.bottom + run.last_line_descent)
            } else {
                0
            }
        }
        _ => panic!("renderer align has no vertical component"),
    };

    match direction {
        Direction::Horizontal => (x, y + shift),
        Direction::Vertical => panic!("vertical direction is unimplemented"),
        Direction::Sideways => (x + shift, y),
        Direction::SidewaysRight => (x - shift, y),
    }
}

/// Shared inputs of the draw walkers.
pub(crate) struct WalkParams<'a> {
    pub(crate) run: &'a RunLayout,
    pub(crate) strand: &'a Strand,
    pub(crate) align: Align,
    pub(crate) par_break: bool,
    pub(crate) scale: i32,
    /// Baseline origin as produced by [`compute_origin`].
    pub(crate) origin: (i32, i32),
    /// Extra offset applied to every emitted glyph (shadow passes).
    pub(crate) offset: (i32, i32),
    pub(crate) rgba: PremulRgba,
}

/// Walks the glyph stream left to right, lines top to bottom.
pub(crate) fn walk_horz<F: FnMut(GlyphId, DrawParams)>(params: &WalkParams<'_>, mut emit: F) {
    let run = params.run;
    if run.glyphs.is_empty() {
        return;
    }
    let interspacing = params.strand.full_glyph_spacing() * params.scale;
    let mut wrap = WrapCursor::new(run);
    let mut breaks = DrawBreakState::new(params.strand.full_line_height() * params.scale);

    let (ox, oy) = params.origin;
    let (offset_x, offset_y) = params.offset;
    let mut x = line_start(params.align, run, ox, 0);
    let mut y = oy;
    let mut index = 0;
    while index < run.glyphs.len() {
        if wrap.is_wrap(index) {
            let elide = wrap.is_elide();
            (x, y) = breaks.apply_horz(run, params.align, params.par_break, ox, y);
            wrap.advance(run);
            if elide {
                index += 1;
                continue;
            }
        }

        match run.glyphs[index].unpack() {
            Glyph::Real(glyph) => {
                breaks.note_glyph();
                x += i32::from(run.kernings[index]);
                emit(
                    glyph,
                    DrawParams {
                        x: x + offset_x,
                        y: y + offset_y,
                        scale: params.scale,
                        rgba: params.rgba,
                    },
                );
                x += i32::from(run.advances[index]) + interspacing;
            }
            Glyph::Newline => {
                if !run.elides_line_break(index) {
                    (x, y) = breaks.apply_horz(run, params.align, params.par_break, ox, y);
                }
            }
            Glyph::Missing => panic!("missing glyph in run"),
            Glyph::Effect => panic!("effect markers within a run are unimplemented"),
            Glyph::Zilch | Glyph::Custom(_) => {}
        }
        index += 1;
    }
}

/// Walks the glyph stream bottom to top, lines left to right.
pub(crate) fn walk_sideways<F: FnMut(GlyphId, DrawParams)>(params: &WalkParams<'_>, mut emit: F) {
    let run = params.run;
    if run.glyphs.is_empty() {
        return;
    }
    let interspacing = params.strand.full_glyph_spacing() * params.scale;
    let mut wrap = WrapCursor::new(run);
    let mut breaks = DrawBreakState::new(params.strand.full_line_height() * params.scale);

    let (ox, oy) = params.origin;
    let (offset_x, offset_y) = params.offset;
    let start_diff = line_start(params.align, run, oy, 0) - oy;
    let mut x = ox;
    let mut y = oy - start_diff;
    let mut index = 0;
    while index < run.glyphs.len() {
        if wrap.is_wrap(index) {
            let elide = wrap.is_elide();
            (x, y) = breaks.apply_sideways(run, params.align, params.par_break, x, oy);
            wrap.advance(run);
            if elide {
                index += 1;
                continue;
            }
        }

        match run.glyphs[index].unpack() {
            Glyph::Real(glyph) => {
                breaks.note_glyph();
                y -= i32::from(run.kernings[index]);
                emit(
                    glyph,
                    DrawParams {
                        x: x + offset_y,
                        y: y - offset_x,
                        scale: params.scale,
                        rgba: params.rgba,
                    },
                );
                y -= i32::from(run.advances[index]) + interspacing;
            }
            Glyph::Newline => {
                if !run.elides_line_break(index) {
                    (x, y) = breaks.apply_sideways(run, params.align, params.par_break, x, oy);
                }
            }
            Glyph::Missing => panic!("missing glyph in run"),
            Glyph::Effect => panic!("effect markers within a run are unimplemented"),
            Glyph::Zilch | Glyph::Custom(_) => {}
        }
        index += 1;
    }
}

/// Walks the glyph stream top to bottom, lines right to left.
pub(crate) fn walk_sideways_right<F: FnMut(GlyphId, DrawParams)>(
    params: &WalkParams<'_>,
    mut emit: F,
) {
    let run = params.run;
    if run.glyphs.is_empty() {
        return;
    }
    let interspacing = params.strand.full_glyph_spacing() * params.scale;
    let mut wrap = WrapCursor::new(run);
    let mut breaks = DrawBreakState::new(params.strand.full_line_height() * params.scale);

    let (ox, oy) = params.origin;
    let (offset_x, offset_y) = params.offset;
    let mut x = ox;
    let mut y = line_start(params.align, run, oy, 0);
    let mut index = 0;
    while index < run.glyphs.len() {
        if wrap.is_wrap(index) {
            let elide = wrap.is_elide();
            (x, y) = breaks.apply_sideways_right(run, params.align, params.par_break, x, oy);
            wrap.advance(run);
            if elide {
                index += 1;
                continue;
            }
        }

        match run.glyphs[index].unpack() {
            Glyph::Real(glyph) => {
                breaks.note_glyph();
                y += i32::from(run.kernings[index]);
                emit(
                    glyph,
                    DrawParams {
                        x: x - offset_y,
                        y: y + offset_x,
                        scale: params.scale,
                        rgba: params.rgba,
                    },
                );
                y += i32::from(run.advances[index]) + interspacing;
            }
            Glyph::Newline => {
                if !run.elides_line_break(index) {
                    (x, y) = breaks.apply_sideways_right(run, params.align, params.par_break, x, oy);
                }
            }
            Glyph::Missing => panic!("missing glyph in run"),
            Glyph::Effect => panic!("effect markers within a run are unimplemented"),
            Glyph::Zilch | Glyph::Custom(_) => {}
        }
        index += 1;
    }
}
