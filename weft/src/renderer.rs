// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer: configuration, measuring and drawing.

use peniko::Color;

use crate::align::Align;
use crate::blend::{BlendMode, PremulRgba};
use crate::cache::load_mask;
use crate::direction::Direction;
use crate::glyph::{Glyph, GlyphId, PackedGlyph};
use crate::layout::{BoundingMode, LayoutParams, MAX_RUN_GLYPHS, RunLayout, compute_run_layout};
use crate::render::{
    DrawParams, GlyphEmitter, Orientation, PaintPass, Target, WalkParams, compute_origin,
    draw_mask, walk_horz, walk_sideways, walk_sideways_right,
};
use crate::rewrite::Pass;
use crate::strand::{Strand, premultiplied};

const NO_STRAND: &str = "renderer can't operate without a strand; set one first";

/// Measures and draws pixel-art text.
///
/// A renderer owns its configuration (align, direction, scale, blend mode,
/// bounding mode) and a set of [`Strand`] slots, and reuses its internal
/// layout buffers across operations. It is not meant to be shared across
/// threads; create one renderer per thread instead — the glyph-mask cache
/// behind them is process-wide already.
pub struct Renderer {
    strands: Vec<Option<Strand>>,
    strand_index: u8,

    align: Align,
    direction: Direction,
    scale: u8,
    bounding: BoundingMode,
    par_break: bool,

    blend_mode: BlendMode,
    /// Used for strands whose main dye is inactive.
    fallback_color: Color,

    emitter: Option<Box<dyn GlyphEmitter>>,
    pass_listener: Option<Box<dyn FnMut(PaintPass)>>,

    run: RunLayout,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer with scale 1, horizontal direction, logical
    /// bounding, left/baseline alignment and a white fallback color. A
    /// strand must still be set before operating.
    pub fn new() -> Self {
        Self {
            strands: vec![None],
            strand_index: 0,
            align: Align::LEFT | Align::BASELINE,
            direction: Direction::Horizontal,
            scale: 1,
            bounding: BoundingMode::Logical,
            par_break: false,
            blend_mode: BlendMode::Over,
            fallback_color: Color::WHITE,
            emitter: None,
            pass_listener: None,
            run: RunLayout::default(),
        }
    }

    // ---- configuration ----

    /// Adjusts the alignment. Components left unset by `align` keep their
    /// current value, so `set_align(Align::RIGHT)` only changes the
    /// horizontal component.
    pub fn set_align(&mut self, align: Align) {
        self.align = self.align.adjusted(align);
    }

    pub fn align(&self) -> Align {
        self.align
    }

    /// Sets the text direction for subsequent operations.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sets the integer text scale. Panics on zero.
    pub fn set_scale(&mut self, scale: u8) {
        assert!(scale != 0, "renderer scale can't be zero");
        self.scale = scale;
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Sets the blend mode applied on subsequent draws.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Sets the fallback text color, used with strands that don't have an
    /// active main dye. Strands with one keep their own color; see
    /// [`Strand::set_main_dye`].
    pub fn set_color(&mut self, color: Color) {
        self.fallback_color = color;
    }

    pub fn color(&self) -> Color {
        self.fallback_color
    }

    /// Sets how bounding rectangles are derived, affecting both measuring
    /// and drawing. Mask bounding needs the full glyph masks, which makes
    /// measuring more expensive; the default logical mode only reads font
    /// metrics.
    pub fn set_bounding_mode(&mut self, mode: BoundingMode) {
        self.bounding = mode;
    }

    pub fn bounding_mode(&self) -> BoundingMode {
        self.bounding
    }

    /// When enabled, two consecutive line breaks advance 1.5 line heights
    /// instead of 2, and three advance as two. With long text this tends to
    /// make paragraph spacing look more natural.
    pub fn set_par_break_enabled(&mut self, enabled: bool) {
        self.par_break = enabled;
    }

    pub fn par_break_enabled(&self) -> bool {
        self.par_break
    }

    /// Installs a custom per-glyph draw function, replacing the built-in
    /// mask compositor. `None` restores the default.
    pub fn set_emitter(&mut self, emitter: Option<Box<dyn GlyphEmitter>>) {
        self.emitter = emitter;
    }

    /// Notifies the given listener right before each draw pass begins. Its
    /// main use is swapping emitters between the shadow and main passes.
    pub fn set_pass_listener(&mut self, listener: Option<Box<dyn FnMut(PaintPass)>>) {
        self.pass_listener = listener;
    }

    // ---- strand management ----

    /// The currently selected strand. Panics if none is set.
    pub fn strand(&self) -> &Strand {
        self.strands[self.strand_index as usize]
            .as_ref()
            .expect(NO_STRAND)
    }

    /// Mutable access to the currently selected strand, for changing dyes,
    /// spacing, wrap glyphs and so on between operations.
    pub fn strand_mut(&mut self) -> &mut Strand {
        self.strands[self.strand_index as usize]
            .as_mut()
            .expect(NO_STRAND)
    }

    /// Replaces the currently selected strand slot.
    pub fn set_strand(&mut self, strand: Strand) {
        self.strands[self.strand_index as usize] = Some(strand);
    }

    /// Stores an additional strand and returns its slot index. At most 255
    /// strands can be stored.
    pub fn add_strand(&mut self, strand: Strand) -> u8 {
        if self.strands[0].is_none() {
            self.strands[0] = Some(strand);
            return 0;
        }
        assert!(self.strands.len() < 255, "can't exceed 255 strands");
        self.strands.push(Some(strand));
        (self.strands.len() - 1) as u8
    }

    /// Selects the active strand slot. Panics on an out-of-bounds index.
    pub fn select_strand(&mut self, index: u8) {
        assert!(
            (index as usize) < self.strands.len(),
            "strand index out of bounds"
        );
        self.strand_index = index;
    }

    /// The strand stored at the given slot. Panics if the index is invalid
    /// or the slot is empty.
    pub fn strand_at(&self, index: u8) -> &Strand {
        self.strands[index as usize].as_ref().expect(NO_STRAND)
    }

    pub fn strand_at_mut(&mut self, index: u8) -> &mut Strand {
        self.strands[index as usize].as_mut().expect(NO_STRAND)
    }

    /// Replaces the strand at the given slot. Panics on an invalid index.
    pub fn replace_strand(&mut self, index: u8, strand: Strand) {
        assert!(
            (index as usize) < self.strands.len(),
            "strand index out of bounds"
        );
        self.strands[index as usize] = Some(strand);
    }

    /// Number of strand slots currently stored.
    pub fn strand_count(&self) -> usize {
        self.strands.len()
    }

    /// The index of the currently selected strand slot.
    pub fn strand_index(&self) -> u8 {
        self.strand_index
    }

    /// Removes every strand from the renderer.
    pub fn clear_strands(&mut self) {
        self.strands.clear();
        self.strands.push(None);
        self.strand_index = 0;
    }

    // ---- operations ----

    /// Returns the dimensions of the text under the current configuration.
    ///
    /// In the default logical bounding mode this is the "highlight
    /// rectangle" of the text; some glyphs may spill outside it, which is
    /// part of typographic design rather than something to compensate for.
    ///
    /// Text can't exceed 32000 glyphs.
    pub fn measure(&mut self, text: &str) -> (i32, i32) {
        self.measure_with_wrap(text, i32::MAX)
    }

    /// Like [`Renderer::measure`], but wrapping lines that would exceed
    /// `max_line_len`.
    pub fn measure_with_wrap(&mut self, text: &str, max_line_len: i32) -> (i32, i32) {
        self.map_text(Pass::Measure, text);
        self.compute_layout(max_line_len);
        self.finish_pass(Pass::Measure);
        (self.run.width(), self.run.height())
    }

    /// Draws the text at the given coordinates, interpreted through the
    /// renderer's alignment.
    ///
    /// Text can't exceed 32000 glyphs.
    pub fn draw(&mut self, target: &mut dyn Target, text: &str, x: i32, y: i32) {
        self.draw_with_wrap(target, text, x, y, i32::MAX);
    }

    /// Like [`Renderer::draw`], but wrapping lines that would exceed
    /// `max_line_len`.
    pub fn draw_with_wrap(
        &mut self,
        target: &mut dyn Target,
        text: &str,
        x: i32,
        y: i32,
        max_line_len: i32,
    ) {
        self.map_text(Pass::Draw, text);
        self.compute_layout(max_line_len);
        let (ox, oy) = self.origin_at(x, y);
        self.draw_run(target, ox, oy);
        self.finish_pass(Pass::Draw);
    }

    /// Re-draws the buffers of the previous measure or draw at a new
    /// anchor, without recomputing the layout. Low level: the target,
    /// anchor and colors may change between the original operation and
    /// this one, but scale and wrap length must not.
    pub fn draw_from_buffer(&mut self, target: &mut dyn Target, x: i32, y: i32) {
        self.begin_pass(Pass::Buffer);
        let (ox, oy) = self.origin_at(x, y);
        self.draw_run(target, ox, oy);
        self.finish_pass(Pass::Buffer);
    }

    /// Offset of the last operation's top-left corner relative to its
    /// baseline origin. Mostly interesting under mask bounding, where the
    /// left offset can be non-zero.
    pub fn last_bounds_offset(&self) -> (i32, i32) {
        (self.run.left, self.run.top)
    }

    /// Rasterizes and caches every glyph the text maps to. Never strictly
    /// necessary, but can smooth performance before scenes that draw a lot
    /// of new text.
    pub fn precache(&self, text: &str) {
        let strand = self.strand();
        let font = strand.font();
        for ch in text.chars() {
            if let Some(group) = strand.lookup(ch) {
                for i in 0..group.len() {
                    let _ = load_mask(font.as_ref(), group.get(i).unwrap());
                }
            }
        }
    }

    /// Whether the current strand can map every character of the text.
    /// Rewrite rules are not taken into account.
    pub fn all_glyphs_available(&self, text: &str) -> bool {
        text.chars().all(|ch| self.is_char_available(ch))
    }

    /// Single-character version of [`Renderer::all_glyphs_available`].
    pub fn is_char_available(&self, ch: char) -> bool {
        self.strand().lookup(ch).is_some()
    }

    // ---- internals ----

    /// Converts the input text to the run's glyph stream, applying the
    /// strand's rewrite engine when it has one.
    fn map_text(&mut self, pass: Pass, text: &str) {
        let strand = self.strands[self.strand_index as usize]
            .as_mut()
            .expect(NO_STRAND);
        let glyphs = &mut self.run.glyphs;
        glyphs.clear();

        if strand.has_rewriter() {
            let rewriter = strand.rewriter_mut().unwrap();
            if let Err(err) = rewriter.begin_pass(pass) {
                panic!("{err}");
            }
            for ch in text.chars() {
                rewriter.feed(ch, &mut |glyph| glyphs.push(PackedGlyph::pack(glyph)));
                assert!(
                    glyphs.len() <= MAX_RUN_GLYPHS,
                    "text run exceeds {MAX_RUN_GLYPHS} glyphs"
                );
            }
            rewriter.finish(&mut |glyph| glyphs.push(PackedGlyph::pack(glyph)));
            assert!(
                glyphs.len() <= MAX_RUN_GLYPHS,
                "text run exceeds {MAX_RUN_GLYPHS} glyphs"
            );
        } else {
            for ch in text.chars() {
                if ch == '\n' {
                    glyphs.push(PackedGlyph::pack(Glyph::Newline));
                } else {
                    match strand.lookup(ch) {
                        Some(group) => glyphs.push(PackedGlyph::from(group.first())),
                        None => missing_glyph(ch),
                    }
                }
                assert!(
                    glyphs.len() <= MAX_RUN_GLYPHS,
                    "text run exceeds {MAX_RUN_GLYPHS} glyphs"
                );
            }
        }
    }

    fn begin_pass(&mut self, pass: Pass) {
        let strand = self.strands[self.strand_index as usize]
            .as_mut()
            .expect(NO_STRAND);
        if let Some(rewriter) = strand.rewriter_mut() {
            if let Err(err) = rewriter.begin_pass(pass) {
                panic!("{err}");
            }
        }
    }

    fn finish_pass(&mut self, pass: Pass) {
        let strand = self.strands[self.strand_index as usize]
            .as_mut()
            .expect(NO_STRAND);
        if let Some(rewriter) = strand.rewriter_mut() {
            rewriter.finish_pass(pass);
        }
    }

    fn compute_layout(&mut self, max_line_len: i32) {
        let strand = self.strands[self.strand_index as usize]
            .as_ref()
            .expect(NO_STRAND);
        let params = LayoutParams {
            strand,
            scale: i32::from(self.scale),
            par_break: self.par_break,
        };
        compute_run_layout(&mut self.run, &params, self.bounding, max_line_len);
    }

    fn origin_at(&self, x: i32, y: i32) -> (i32, i32) {
        let metrics = self.strand().font().metrics();
        compute_origin(
            &self.run,
            &metrics,
            self.align,
            self.direction,
            i32::from(self.scale),
            x,
            y,
        )
    }

    fn draw_run(&mut self, target: &mut dyn Target, ox: i32, oy: i32) {
        let Self {
            strands,
            strand_index,
            align,
            direction,
            scale,
            par_break,
            blend_mode,
            fallback_color,
            emitter,
            pass_listener,
            run,
            ..
        } = self;
        let strand = strands[*strand_index as usize].as_ref().expect(NO_STRAND);
        let scale = i32::from(*scale);
        let orientation = match direction {
            Direction::Horizontal => Orientation::Horz,
            Direction::Vertical => panic!("vertical direction is unimplemented"),
            Direction::Sideways => Orientation::Sideways,
            Direction::SidewaysRight => Orientation::SidewaysRight,
        };

        // Shadow pre-pass: same glyph stream and baselines, offset anchor,
        // shadow color substituted for the main dye.
        if let Some(shadow) = strand.shadow() {
            if let Some(listener) = pass_listener.as_mut() {
                listener(PaintPass::Shadow);
            }
            let (off_x, off_y) = strand.shadow_offsets();
            let (mut off_x, mut off_y) = (i32::from(off_x), i32::from(off_y));
            if strand.shadow_offset_scaling() {
                off_x *= scale;
                off_y *= scale;
            }
            let params = WalkParams {
                run,
                strand,
                align: *align,
                par_break: *par_break,
                scale,
                origin: (ox, oy),
                offset: (off_x, off_y),
                rgba: premultiplied(strand.shadow_color()),
            };
            match emitter.as_mut() {
                Some(custom) => {
                    walk(*direction, &params, |glyph, p| custom.emit(target, glyph, p));
                }
                None => {
                    walk(*direction, &params, |glyph, p| {
                        let mask = load_mask(shadow.font().as_ref(), glyph);
                        if !mask.is_empty() {
                            draw_mask(
                                target,
                                shadow,
                                &mask,
                                p.x,
                                p.y,
                                p.scale,
                                p.rgba,
                                *blend_mode,
                                orientation,
                            );
                        }
                    });
                }
            }
        }

        // Main pass.
        if let Some(listener) = pass_listener.as_mut() {
            listener(PaintPass::Main);
        }
        let main_rgba: PremulRgba = if strand.is_main_dye_active() {
            strand.dye(strand.main_dye_key())
        } else {
            premultiplied(*fallback_color)
        };
        let params = WalkParams {
            run,
            strand,
            align: *align,
            par_break: *par_break,
            scale,
            origin: (ox, oy),
            offset: (0, 0),
            rgba: main_rgba,
        };
        match emitter.as_mut() {
            Some(custom) => {
                walk(*direction, &params, |glyph, p| custom.emit(target, glyph, p));
            }
            None => {
                walk(*direction, &params, |glyph, p| {
                    let mask = load_mask(strand.font().as_ref(), glyph);
                    if !mask.is_empty() {
                        draw_mask(
                            target,
                            strand,
                            &mask,
                            p.x,
                            p.y,
                            p.scale,
                            p.rgba,
                            *blend_mode,
                            orientation,
                        );
                    }
                });
            }
        }
    }
}

fn walk<F: FnMut(GlyphId, DrawParams)>(
    direction: Direction,
    params: &WalkParams<'_>,
    emit: F,
) {
    match direction {
        Direction::Horizontal => walk_horz(params, emit),
        Direction::Vertical => panic!("vertical direction is unimplemented"),
        Direction::Sideways => walk_sideways(params, emit),
        Direction::SidewaysRight => walk_sideways_right(params, emit),
    }
}

fn missing_glyph(ch: char) -> ! {
    let code = ch as u32;
    if code < 32 {
        panic!("no glyph for ASCII control code {code} [U+{code:04X}]");
    }
    panic!("no glyph for '{ch}' [U+{code:04X}]");
}

#[cfg(test)]
impl Renderer {
    pub(crate) fn run(&self) -> &RunLayout {
        &self.run
    }
}

impl core::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Renderer")
            .field("align", &self.align)
            .field("direction", &self.direction)
            .field("scale", &self.scale)
            .field("bounding", &self.bounding)
            .field("blend_mode", &self.blend_mode)
            .finish_non_exhaustive()
    }
}
