// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font strands: mutable parametrizations over static fonts.
//!
//! Fonts carry many parameters worth configuring before drawing: dye
//! colors, settings, spacing, wrap behavior. A [`Strand`] owns that
//! parametrization while the font itself stays immutable and shared. In
//! general you can mentally replace "strand" with "font", but they are not
//! the same object: several strands may parametrize one font differently.

mod shadow;

use std::sync::Arc;

use peniko::Color;
use smallvec::SmallVec;

use crate::blend::PremulRgba;
use crate::font::{DyeKey, Font, GlyphGroup, PaletteKey};
use crate::glyph::GlyphId;
use crate::rewrite::Rewriter;

const WHITE: PremulRgba = [1.0, 1.0, 1.0, 1.0];

pub(crate) fn premultiplied(color: Color) -> PremulRgba {
    color.premultiply().components
}

/// Classes of line-wrap opportunity a glyph may be declared under.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum WrapClass {
    /// The glyph moves to the new line when chosen as the wrap point.
    Before = 0,
    /// The glyph stays on the current line; the next one starts the new line.
    After = 1,
    /// The glyph is absorbed by the wrap and not drawn.
    Elide = 2,
}

const NUM_WRAP_CLASSES: usize = 3;

/// A mutable parametrization over a [`Font`]: dye colors, settings, shadow,
/// spacing shifts and wrap-glyph membership. Owns no pixels.
pub struct Strand {
    font: Arc<dyn Font>,

    glyph_spacing_shift: i8,
    line_spacing_shift: i8,

    settings: Vec<u8>,
    rewriter: Option<Box<dyn Rewriter>>,

    pub(crate) shadow: Option<Box<Strand>>,
    pub(crate) shadow_color: Color,
    pub(crate) shadow_offset_x: i8,
    pub(crate) shadow_offset_y: i8,
    pub(crate) shadow_offset_scaling: bool,

    main_dye: DyeKey,
    main_dye_color: Color,
    main_dye_active: bool,
    dyes: Vec<PremulRgba>,
    /// Flat color table: dye tones stored as `(α, α, α, α)`, palette colors
    /// stored premultiplied, indexed by 1-based mask samples minus one.
    font_colors: Vec<PremulRgba>,
    /// Maps each dye-tone index of the color table to its owning dye.
    dye_mapping: Vec<DyeKey>,

    space_glyph: Option<GlyphId>,
    wrap_glyphs: [SmallVec<[GlyphId; 8]>; NUM_WRAP_CLASSES],
    wrap_ranges: [SmallVec<[(GlyphId, GlyphId); 2]>; NUM_WRAP_CLASSES],
}

impl Strand {
    /// Creates a default strand for the font: all dyes white, main dye
    /// inactive, no shadow, no spacing shifts, spaces as the only wrap
    /// glyphs.
    ///
    /// Panics on inconsistent font color data (a font data fault).
    pub fn new(font: Arc<dyn Font>) -> Self {
        let num_colors = font.num_colors();
        assert!(num_colors > 0, "font declares no colors");

        let mut main_dye = DyeKey::NONE;
        let mut dyes = Vec::with_capacity(font.num_dyes() as usize);
        let mut font_colors = Vec::with_capacity(num_colors as usize);
        let mut dye_mapping = Vec::with_capacity(font.num_dye_indices() as usize);
        for key in 0..font.num_dyes() {
            let key = DyeKey(key);
            if font.dye_name(key) == "main" {
                assert!(
                    main_dye == DyeKey::NONE,
                    "font contains multiple 'main' dye keys"
                );
                main_dye = key;
            }
            dyes.push(WHITE);
            for &alpha in font.dye_alphas(key) {
                let a = f32::from(alpha) / 255.0;
                font_colors.push([a, a, a, a]);
                dye_mapping.push(key);
            }
        }
        assert_eq!(
            dye_mapping.len(),
            font.num_dye_indices() as usize,
            "dye tone entries don't add up to the declared dye index count"
        );
        for palette in 0..font.num_palettes() {
            for &color in font.palette_colors(PaletteKey(palette)) {
                font_colors.push(premultiplied(color));
            }
        }
        assert_eq!(
            font_colors.len(),
            num_colors as usize,
            "font color table doesn't add up to the declared color count"
        );

        let settings = vec![0; font.num_settings() as usize];
        let space_glyph = font.lookup(' ', &settings).map(|group| {
            assert!(
                group.len() == 1,
                "expected ' ' to map to a single glyph or not be mapped at all"
            );
            group.first()
        });

        Self {
            font,
            glyph_spacing_shift: 0,
            line_spacing_shift: 0,
            settings,
            rewriter: None,
            shadow: None,
            shadow_color: Color::TRANSPARENT,
            shadow_offset_x: 0,
            shadow_offset_y: 0,
            shadow_offset_scaling: true,
            main_dye,
            main_dye_color: Color::WHITE,
            main_dye_active: false,
            dyes,
            font_colors,
            dye_mapping,
            space_glyph,
            wrap_glyphs: Default::default(),
            wrap_ranges: Default::default(),
        }
    }

    /// The underlying font.
    pub fn font(&self) -> &Arc<dyn Font> {
        &self.font
    }

    // ---- spacing ----

    /// Signed shift applied on top of the font's glyph interspacing.
    pub fn glyph_spacing_shift(&self) -> i8 {
        self.glyph_spacing_shift
    }

    pub fn set_glyph_spacing_shift(&mut self, value: i8) {
        self.glyph_spacing_shift = value;
    }

    /// Signed shift applied on top of the font's line height.
    pub fn line_spacing_shift(&self) -> i8 {
        self.line_spacing_shift
    }

    pub fn set_line_spacing_shift(&mut self, value: i8) {
        self.line_spacing_shift = value;
    }

    /// Glyph interspacing with the strand shift applied, unscaled.
    pub(crate) fn full_glyph_spacing(&self) -> i32 {
        self.font.metrics().horz_interspacing + i32::from(self.glyph_spacing_shift)
    }

    /// Line height with the strand shift applied, unscaled.
    pub(crate) fn full_line_height(&self) -> i32 {
        self.font.metrics().line_height + i32::from(self.line_spacing_shift)
    }

    // ---- settings ----

    /// Modifies a setting value. Panics if the setting or option doesn't
    /// exist. Rewrite conditions are refreshed on change.
    pub fn set_setting(&mut self, setting: u8, option: u8) {
        assert!(
            setting < self.font.num_settings(),
            "given setting doesn't exist"
        );
        assert!(
            option < self.font.num_setting_options(setting),
            "given setting option doesn't exist"
        );
        self.settings[setting as usize] = option;
        if let Some(rewriter) = self.rewriter.as_mut() {
            rewriter.refresh_conditions(&self.settings);
        }
    }

    /// Current value of a setting. Panics if the setting doesn't exist.
    pub fn setting(&self, setting: u8) -> u8 {
        self.settings[setting as usize]
    }

    pub fn settings(&self) -> &[u8] {
        &self.settings
    }

    // ---- rewrite engine ----

    /// Installs (or removes) the rewrite engine consulted when mapping text
    /// for this strand. Without one, characters map straight through the
    /// font's lookup table.
    pub fn set_rewriter(&mut self, rewriter: Option<Box<dyn Rewriter>>) {
        self.rewriter = rewriter;
        if let Some(rw) = self.rewriter.as_mut() {
            rw.refresh_conditions(&self.settings);
        }
    }

    pub(crate) fn has_rewriter(&self) -> bool {
        self.rewriter.is_some()
    }

    pub(crate) fn rewriter_mut(&mut self) -> Option<&mut dyn Rewriter> {
        match &mut self.rewriter {
            Some(r) => Some(r.as_mut()),
            None => None,
        }
    }

    // ---- wrap glyphs ----

    /// Declares the glyphs at which line wrapping is allowed for the given
    /// class. Spaces are always implicitly allowed, in every class.
    pub fn set_wrap_glyphs(&mut self, class: WrapClass, glyphs: &[GlyphId]) {
        self.wrap_glyphs[class as usize] = glyphs.iter().copied().collect();
    }

    /// Like [`Strand::set_wrap_glyphs`], but with inclusive glyph ranges.
    pub fn set_wrap_ranges(&mut self, class: WrapClass, ranges: &[(GlyphId, GlyphId)]) {
        self.wrap_ranges[class as usize] = ranges.iter().copied().collect();
    }

    pub(crate) fn can_wrap(&self, glyph: GlyphId, class: WrapClass) -> bool {
        if self.space_glyph == Some(glyph) {
            return true;
        }
        if self.wrap_glyphs[class as usize].contains(&glyph) {
            return true;
        }
        self.wrap_ranges[class as usize]
            .iter()
            .any(|&(lo, hi)| glyph >= lo && glyph <= hi)
    }

    // ---- color ----

    /// The main dye key, [`DyeKey::NONE`] if the font declares none.
    ///
    /// Most fonts have a main dye, but some rare ones might not (e.g. icon
    /// fonts that only use palettes).
    pub fn main_dye_key(&self) -> DyeKey {
        self.main_dye
    }

    /// Sets a dye color. Setting the main dye also marks it active.
    /// Panics on an invalid dye key.
    pub fn set_dye(&mut self, dye: DyeKey, color: Color) {
        if dye == self.main_dye {
            self.set_main_dye(color);
        } else {
            assert!((dye.0 as usize) < self.dyes.len(), "invalid dye key");
            self.dyes[dye.0 as usize] = premultiplied(color);
        }
    }

    /// Returns a dye's premultiplied color. Panics on an invalid dye key.
    pub fn dye(&self, dye: DyeKey) -> PremulRgba {
        assert!((dye.0 as usize) < self.dyes.len(), "invalid dye key");
        self.dyes[dye.0 as usize]
    }

    /// Sets the strand's main dye color and marks the main dye active.
    /// Panics if the font has no "main" dye.
    pub fn set_main_dye(&mut self, color: Color) {
        assert!(
            self.main_dye != DyeKey::NONE,
            "font doesn't have a \"main\" dye key"
        );
        self.main_dye_color = color;
        self.main_dye_active = true;
        self.dyes[self.main_dye.0 as usize] = premultiplied(color);
    }

    /// The strand's main dye color. Panics if the font has no "main" dye.
    pub fn main_dye(&self) -> Color {
        assert!(
            self.main_dye != DyeKey::NONE,
            "font doesn't have a \"main\" dye key"
        );
        self.main_dye_color
    }

    /// While the main dye is inactive, the renderer's fallback color is
    /// used in its place. Setting the main dye activates it; this method
    /// can deactivate it again without losing the stored color.
    pub fn set_main_dye_active(&mut self, active: bool) {
        assert!(
            !active || self.main_dye != DyeKey::NONE,
            "font doesn't have a \"main\" dye key"
        );
        self.main_dye_active = active;
    }

    pub fn is_main_dye_active(&self) -> bool {
        self.main_dye_active
    }

    /// Replaces the colors of the given palette. Panics if the palette key
    /// is invalid or the number of colors doesn't match the palette size.
    pub fn recolor(&mut self, palette: PaletteKey, colors: &[Color]) {
        assert!(palette.0 < self.font.num_palettes(), "invalid palette key");
        let size = self.font.palette_colors(palette).len();
        assert_eq!(
            colors.len(),
            size,
            "number of colors does not match palette size"
        );
        let mut index = self.dye_mapping.len();
        for key in 0..palette.0 {
            index += self.font.palette_colors(PaletteKey(key)).len();
        }
        for &color in colors {
            self.font_colors[index] = premultiplied(color);
            index += 1;
        }
    }

    pub(crate) fn font_colors(&self) -> &[PremulRgba] {
        &self.font_colors
    }

    pub(crate) fn dye_mapping(&self) -> &[DyeKey] {
        &self.dye_mapping
    }

    // ---- mapping helpers ----

    /// Maps a character under the strand's current settings.
    pub fn lookup(&self, ch: char) -> Option<GlyphGroup> {
        self.font.lookup(ch, &self.settings)
    }
}

impl core::fmt::Debug for Strand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Strand")
            .field("font", &self.font.id())
            .field("main_dye", &self.main_dye)
            .field("main_dye_active", &self.main_dye_active)
            .finish_non_exhaustive()
    }
}
