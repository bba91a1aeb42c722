// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The two layout passes: logical (metric-driven) and mask (glyph-rect
//! driven). Both share the same traversal; they differ in how the bounding
//! rectangle is grown and in which widths feed the wrap policy.

use crate::cache::load_mask;
use crate::font::Rect;
use crate::glyph::{Glyph, GlyphId};
use crate::layout::wrap::{BreakState, WrapState};
use crate::layout::{BoundingMode, LayoutParams, MAX_RUN_GLYPHS, RunLayout};

/// Far-out sentinel for extents no visible mask has touched yet. Large
/// enough to dominate any raster coordinate, small enough that extent
/// arithmetic can't overflow.
const NO_EXTENT: i32 = 1 << 20;

pub(crate) fn compute_run_layout(
    run: &mut RunLayout,
    params: &LayoutParams<'_>,
    bounding: BoundingMode,
    max_line_len: i32,
) {
    run.clear_metrics();
    if run.glyphs.is_empty() {
        return;
    }
    assert!(
        run.glyphs.len() <= MAX_RUN_GLYPHS,
        "text run exceeds {MAX_RUN_GLYPHS} glyphs"
    );
    if bounding.is_mask() {
        compute_mask(run, params, bounding.no_descent(), max_line_len);
    } else {
        compute_logical(run, params, bounding.no_descent(), max_line_len);
    }
}

fn scaled_kerning(
    params: &LayoutParams<'_>,
    prev: Option<GlyphId>,
    glyph: GlyphId,
) -> i32 {
    let font = params.strand.font();
    prev.map_or(0, |prev| i32::from(font.kerning(prev, glyph))) * params.scale
}

fn scaled_advance(params: &LayoutParams<'_>, glyph: GlyphId) -> i32 {
    let advance = i32::from(params.strand.font().advance(glyph)) * params.scale;
    assert!(advance <= 65_535, "glyph advance overflow");
    advance
}

fn compute_logical(
    run: &mut RunLayout,
    params: &LayoutParams<'_>,
    no_descent: bool,
    max_line_len: i32,
) {
    let strand = params.strand;
    let metrics = strand.font().metrics();
    let scale = params.scale;
    let interspacing = strand.full_glyph_spacing() * scale;
    let mut breaks = BreakState::new(strand.full_line_height() * scale);
    run.first_line_ascent = metrics.ascent * scale;
    run.top = -run.first_line_ascent;
    if !no_descent {
        run.last_line_descent = metrics.descent * scale;
    }

    let mut prev_glyph: Option<GlyphId> = None;
    let mut prev_spacing = 0;
    let mut x = 0;
    let mut wrap = WrapState::new();
    let mut index = 0;
    while index < run.glyphs.len() {
        match run.glyphs[index].unpack() {
            Glyph::Real(glyph) => {
                breaks.note_glyph();
                wrap.bump_char_count();

                let memo_x = x;
                let kerning = scaled_kerning(params, prev_glyph, glyph);
                run.kernings[index] = kerning as i16;
                let advance = scaled_advance(params, glyph);
                run.advances[index] = advance as u16;
                x += prev_spacing + kerning + advance;
                prev_spacing = interspacing;
                prev_glyph = Some(glyph);

                if x <= max_line_len {
                    wrap.note_fit(strand, glyph, index, memo_x, x);
                } else {
                    let (new_index, new_x) =
                        wrap.break_at(run, strand, glyph, index, memo_x, x);
                    let bottom = breaks.apply(run, params.par_break, 0, new_x, run.bottom);
                    run.bottom = bottom;
                    index = new_index;
                    x = 0;
                    prev_spacing = 0;
                    prev_glyph = None;
                    continue;
                }
            }
            Glyph::Newline => {
                if !run.elides_line_break(index) {
                    let bottom = breaks.apply(run, params.par_break, 0, x, run.bottom);
                    run.bottom = bottom;
                    x = 0;
                    prev_spacing = 0;
                    prev_glyph = None;
                    wrap.post_break(index + 1);
                }
            }
            // Zero width; the kerning pair around it stays intact.
            Glyph::Zilch => {}
            Glyph::Missing => panic!("missing glyph in run"),
            Glyph::Effect => panic!("effect markers within a run are unimplemented"),
            // Custom controls contribute nothing to layout.
            Glyph::Custom(_) => {}
        }
        index += 1;
    }

    breaks.finish(run, x);
}

fn compute_mask(
    run: &mut RunLayout,
    params: &LayoutParams<'_>,
    no_descent: bool,
    max_line_len: i32,
) {
    run.bottom = -NO_EXTENT;
    run.left = NO_EXTENT;

    let strand = params.strand;
    let font = strand.font().clone();
    let scale = params.scale;
    let interspacing = strand.full_glyph_spacing() * scale;
    let mut breaks = BreakState::new(strand.full_line_height() * scale);

    let mut prev_glyph: Option<GlyphId> = None;
    let mut prev_spacing = 0;
    let mut prev_mask_right = -NO_EXTENT;
    let mut mask_left = NO_EXTENT;
    let mut x = 0;
    let mut y = 0;
    // 0 before the first visible line, 1 on it, 2 past it.
    let mut first_line_stage = 0_u8;
    let mut wrap = WrapState::new();
    let mut index = 0;
    while index < run.glyphs.len() {
        match run.glyphs[index].unpack() {
            Glyph::Real(glyph) => {
                breaks.note_glyph();
                wrap.bump_char_count();

                let mask = load_mask(font.as_ref(), glyph);
                let bounds = if mask.is_empty() {
                    Rect::default()
                } else {
                    mask_left = mask_left.min(x + mask.bounds().min_x * scale);
                    mask.bounds()
                };

                let kerning = scaled_kerning(params, prev_glyph, glyph);
                run.kernings[index] = kerning as i16;
                let advance = scaled_advance(params, glyph);
                run.advances[index] = advance as u16;
                let mask_right = x + bounds.max_x * scale + prev_spacing + kerning;

                if x <= max_line_len {
                    wrap.note_fit(strand, glyph, index, prev_mask_right, mask_right);
                    if !mask.is_empty() {
                        if first_line_stage == 0 {
                            first_line_stage = 1;
                            // Corrected by the first-line ascent at the end.
                            run.top = y;
                        }
                        if first_line_stage == 1 {
                            run.first_line_ascent =
                                run.first_line_ascent.max(-bounds.min_y * scale);
                        }
                        if !no_descent {
                            run.last_line_descent =
                                run.last_line_descent.max(bounds.max_y * scale);
                        }
                        let elevation = (bounds.max_y * scale).min(0);
                        run.bottom = run
                            .bottom
                            .max(y + elevation)
                            .max(y + elevation + run.last_line_descent);
                        prev_mask_right = mask_right;
                    }
                    x += prev_spacing + kerning + advance;
                    prev_spacing = interspacing;
                    prev_glyph = Some(glyph);
                } else {
                    let (new_index, new_x) =
                        wrap.break_at(run, strand, glyph, index, prev_mask_right, mask_right);
                    y = breaks.apply(run, params.par_break, mask_left, new_x, y);
                    run.last_line_descent = 0;
                    x = 0;
                    prev_spacing = 0;
                    prev_mask_right = -NO_EXTENT;
                    mask_left = NO_EXTENT;
                    prev_glyph = None;
                    if first_line_stage == 1 {
                        first_line_stage = 2;
                    }
                    index = new_index;
                    continue;
                }
            }
            Glyph::Newline => {
                if !run.elides_line_break(index) {
                    y = breaks.apply(run, params.par_break, mask_left, prev_mask_right, y);
                    wrap.post_break(index + 1);
                    run.last_line_descent = 0;
                    x = 0;
                    prev_spacing = 0;
                    prev_mask_right = -NO_EXTENT;
                    mask_left = NO_EXTENT;
                    prev_glyph = None;
                    if first_line_stage == 1 {
                        first_line_stage = 2;
                    }
                }
            }
            Glyph::Zilch => {}
            Glyph::Missing => panic!("missing glyph in run"),
            Glyph::Effect => panic!("effect markers within a run are unimplemented"),
            Glyph::Custom(_) => {}
        }
        index += 1;
    }

    run.top -= run.first_line_ascent;
    run.left = run.left.min(mask_left);
    if prev_mask_right > run.right {
        run.right = prev_mask_right;
    }
    let line_len = run.right - run.left;
    run.line_lengths.push(line_len.max(0) as u16);

    run.bottom = run.bottom.max(run.top);
    run.left = run.left.min(run.right);
}
