// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The font seam: metric, color and rasterization data consumed by the
//! engine. Parsing a font from its on-disk format is the business of an
//! external crate; the engine only sees this trait.

use peniko::Color;
use smallvec::SmallVec;

use crate::glyph::GlyphId;

/// Axis-aligned integer rectangle with exclusive max edges.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }
}

/// Font-wide metrics, in integral pixel units at scale 1.
///
/// `line_height` is the full baseline-to-baseline distance, typically
/// `ascent + descent + line_gap`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Metrics {
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
    pub line_height: i32,
    /// Height of uppercase letters above the baseline. Zero when undefined.
    pub uppercase_ascent: i32,
    /// Height of lowercase letters above the baseline. Zero when undefined.
    pub midline_ascent: i32,
    /// Default spacing inserted between consecutive glyphs.
    pub horz_interspacing: i32,
}

/// Per-glyph placement data.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct GlyphPlacement {
    pub advance: u8,
    pub top_advance: u8,
    pub bottom_advance: u8,
    pub horz_center: u8,
}

/// A rasterized glyph: one byte per pixel within `bounds`.
///
/// The origin (0, 0) is the glyph baseline, so `bounds.min_y` is typically
/// negative (ascending portions) and `bounds.max_y` may be positive
/// (descending ones). A byte value of 0 is reserved for transparency; any
/// other value is a 1-based index into the font's color table, not an
/// opacity.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AlphaMask {
    bounds: Rect,
    data: Vec<u8>,
}

impl AlphaMask {
    /// Panics if `data` does not hold exactly `bounds.width() * bounds.height()`
    /// bytes.
    pub fn new(bounds: Rect, data: Vec<u8>) -> Self {
        let expected = (bounds.width().max(0) * bounds.height().max(0)) as usize;
        assert_eq!(data.len(), expected, "mask data does not match its bounds");
        Self { bounds, data }
    }

    /// A mask with no pixels, used for glyphs like spaces.
    pub fn empty() -> Self {
        Self {
            bounds: Rect::default(),
            data: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Sample at mask coordinates, `x` in `min_x..max_x`, `y` in `min_y..max_y`.
    pub fn sample(&self, x: i32, y: i32) -> u8 {
        debug_assert!(self.bounds.contains(x, y));
        let row = (y - self.bounds.min_y) as usize;
        let col = (x - self.bounds.min_x) as usize;
        self.data[row * self.bounds.width() as usize + col]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Key of a user-tintable dye within a font's color table.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DyeKey(pub u8);

impl DyeKey {
    /// Sentinel for fonts that declare no main dye.
    pub const NONE: Self = Self(0xFF);
}

/// Key of a fixed-color palette within a font's color table.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PaletteKey(pub u8);

/// A non-empty set of interchangeable glyphs that a character maps to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GlyphGroup {
    glyphs: SmallVec<[GlyphId; 4]>,
}

impl GlyphGroup {
    /// Panics if `glyphs` is empty.
    pub fn new(glyphs: impl IntoIterator<Item = GlyphId>) -> Self {
        let glyphs: SmallVec<[GlyphId; 4]> = glyphs.into_iter().collect();
        assert!(!glyphs.is_empty(), "glyph groups can't be empty");
        Self { glyphs }
    }

    pub fn single(glyph: GlyphId) -> Self {
        Self::new([glyph])
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<GlyphId> {
        self.glyphs.get(index).copied()
    }

    /// The default pick when no glyph picker intervenes.
    pub fn first(&self) -> GlyphId {
        self.glyphs[0]
    }
}

/// A parsed bitmap font, as seen by the engine.
///
/// Implementations are expected to be cheap to query: the layout engine
/// calls `advance` and `kerning` once per glyph per pass, while `rasterize`
/// is only reached on glyph-mask cache misses.
pub trait Font {
    /// Stable identity used for cache keying.
    fn id(&self) -> u64;

    fn metrics(&self) -> Metrics;

    /// Horizontal advance of the glyph, unscaled.
    fn advance(&self, glyph: GlyphId) -> u8;

    fn placement(&self, glyph: GlyphId) -> GlyphPlacement;

    /// Kerning adjustment between two consecutive glyphs, unscaled.
    fn kerning(&self, prev: GlyphId, next: GlyphId) -> i8;

    /// Rasterizes the glyph into an alpha mask. Glyphs without visible
    /// pixels return an empty mask.
    fn rasterize(&self, glyph: GlyphId) -> AlphaMask;

    /// Total number of entries in the color table (dye tones followed by
    /// palette colors). At most 255.
    fn num_colors(&self) -> u8;

    fn num_dyes(&self) -> u8;

    /// Number of dye tone entries at the head of the color table; the sum
    /// of `dye_alphas(key).len()` over all dyes.
    fn num_dye_indices(&self) -> u8;

    fn dye_name(&self, dye: DyeKey) -> &str;

    /// Alpha tones of the dye, in color-table order.
    fn dye_alphas(&self, dye: DyeKey) -> &[u8];

    fn num_palettes(&self) -> u8;

    fn palette_colors(&self, palette: PaletteKey) -> &[Color];

    /// Maps a Unicode scalar to its glyph group under the given settings.
    fn lookup(&self, ch: char, settings: &[u8]) -> Option<GlyphGroup>;

    /// Number of configurable font settings. Settings parameterize mapping
    /// and rewrite conditions; fonts without them report zero.
    fn num_settings(&self) -> u8 {
        0
    }

    /// Number of valid options for the given setting.
    fn num_setting_options(&self, _setting: u8) -> u8 {
        0
    }
}
