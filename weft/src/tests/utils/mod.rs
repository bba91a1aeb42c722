// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test environment: a deterministic hand-built bitmap font, so
//! every layout assertion can be exact.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use peniko::Color;

use crate::font::{
    AlphaMask, DyeKey, Font, GlyphGroup, GlyphPlacement, Metrics, PaletteKey, Rect,
};
use crate::glyph::GlyphId;
use crate::renderer::Renderer;
use crate::strand::Strand;

/// Characters the test font maps, in glyph-id order.
const CHARS: &str = " ABCDEFGHIJKLMNOPQRSTUVWXYZ.-_";

pub(crate) const ASCENT: i32 = 7;
pub(crate) const DESCENT: i32 = 2;
pub(crate) const LINE_GAP: i32 = 1;
pub(crate) const LINE_HEIGHT: i32 = ASCENT + DESCENT + LINE_GAP;
pub(crate) const INTERSPACING: i32 = 1;
pub(crate) const LETTER_ADVANCE: i32 = 5;
pub(crate) const SPACE_ADVANCE: i32 = 3;

static NEXT_FONT_ID: AtomicU64 = AtomicU64::new(1);

/// A tiny in-memory bitmap font: uppercase letters as 5x6 blocks ('O' is
/// hollow), a dot, a dash, an underscore descender, and a space. One
/// "main" dye with a single full-alpha tone, followed by a red/blue
/// palette.
pub(crate) struct TestFont {
    id: u64,
    kerning: HashMap<(GlyphId, GlyphId), i8>,
    dyes: Vec<(&'static str, Vec<u8>)>,
    palette: Vec<Color>,
}

impl TestFont {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed),
            kerning: HashMap::new(),
            dyes: vec![("main", vec![255])],
            palette: vec![
                Color::from_rgba8(255, 0, 0, 255),
                Color::from_rgba8(0, 0, 255, 255),
            ],
        }
    }

    /// Variant with a second, half-alpha "accent" dye.
    pub(crate) fn with_accent_dye() -> Self {
        let mut font = Self::new();
        font.dyes.push(("accent", vec![128]));
        font
    }

    pub(crate) fn set_kerning(&mut self, prev: char, next: char, value: i8) {
        self.kerning
            .insert((self.glyph(prev), self.glyph(next)), value);
    }

    pub(crate) fn glyph(&self, ch: char) -> GlyphId {
        GlyphId(CHARS.find(ch).expect("char not in test font") as u16)
    }

    fn char_of(&self, glyph: GlyphId) -> char {
        CHARS.as_bytes()[glyph.0 as usize] as char
    }
}

impl Font for TestFont {
    fn id(&self) -> u64 {
        self.id
    }

    fn metrics(&self) -> Metrics {
        Metrics {
            ascent: ASCENT,
            descent: DESCENT,
            line_gap: LINE_GAP,
            line_height: LINE_HEIGHT,
            uppercase_ascent: 6,
            midline_ascent: 4,
            horz_interspacing: INTERSPACING,
        }
    }

    fn advance(&self, glyph: GlyphId) -> u8 {
        match self.char_of(glyph) {
            ' ' => SPACE_ADVANCE as u8,
            '.' => 2,
            '-' => 4,
            _ => LETTER_ADVANCE as u8,
        }
    }

    fn placement(&self, glyph: GlyphId) -> GlyphPlacement {
        let advance = self.advance(glyph);
        GlyphPlacement {
            advance,
            top_advance: ASCENT as u8,
            bottom_advance: DESCENT as u8,
            horz_center: advance / 2,
        }
    }

    fn kerning(&self, prev: GlyphId, next: GlyphId) -> i8 {
        self.kerning.get(&(prev, next)).copied().unwrap_or(0)
    }

    fn rasterize(&self, glyph: GlyphId) -> AlphaMask {
        match self.char_of(glyph) {
            ' ' => AlphaMask::empty(),
            '.' => AlphaMask::new(Rect::new(0, -1, 2, 0), vec![1; 2]),
            '-' => AlphaMask::new(Rect::new(0, -4, 4, -3), vec![1; 4]),
            '_' => AlphaMask::new(Rect::new(0, 1, 5, 2), vec![1; 5]),
            'O' => {
                // A hollow ring, so Replace blending has interior
                // transparency to stamp.
                let bounds = Rect::new(0, -6, 5, 0);
                let mut data = vec![1_u8; 30];
                for y in 1..5 {
                    for x in 1..4 {
                        data[y * 5 + x] = 0;
                    }
                }
                AlphaMask::new(bounds, data)
            }
            _ => AlphaMask::new(Rect::new(0, -6, 5, 0), vec![1; 30]),
        }
    }

    fn num_colors(&self) -> u8 {
        (self.num_dye_indices() as usize + self.palette.len()) as u8
    }

    fn num_dyes(&self) -> u8 {
        self.dyes.len() as u8
    }

    fn num_dye_indices(&self) -> u8 {
        self.dyes.iter().map(|(_, alphas)| alphas.len() as u8).sum()
    }

    fn dye_name(&self, dye: DyeKey) -> &str {
        self.dyes[dye.0 as usize].0
    }

    fn dye_alphas(&self, dye: DyeKey) -> &[u8] {
        &self.dyes[dye.0 as usize].1
    }

    fn num_palettes(&self) -> u8 {
        1
    }

    fn palette_colors(&self, palette: PaletteKey) -> &[Color] {
        assert_eq!(palette.0, 0);
        &self.palette
    }

    fn lookup(&self, ch: char, _settings: &[u8]) -> Option<GlyphGroup> {
        CHARS
            .find(ch)
            .map(|index| GlyphGroup::single(GlyphId(index as u16)))
    }
}

/// A renderer with a fresh strand over a fresh test font.
pub(crate) fn new_renderer() -> Renderer {
    renderer_over(Arc::new(TestFont::new()))
}

pub(crate) fn renderer_over(font: Arc<TestFont>) -> Renderer {
    let mut renderer = Renderer::new();
    renderer.set_strand(Strand::new(font));
    renderer
}
