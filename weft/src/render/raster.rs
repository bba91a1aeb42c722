// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The raster target seam and the CPU mask compositor.

use peniko::Color;

use crate::blend::{self, BlendMemo, BlendMode, PremulRgba};
use crate::font::{AlphaMask, Rect};
use crate::palette::ResolveMemo;
use crate::strand::{Strand, premultiplied};

/// A raster surface glyph masks are composed onto.
///
/// Pixels are premultiplied RGBA. Out-of-bounds accesses never happen; the
/// compositor clips to [`Target::bounds`] before touching pixels.
pub trait Target {
    fn bounds(&self) -> Rect;

    fn read(&self, x: i32, y: i32) -> PremulRgba;

    fn write(&mut self, x: i32, y: i32, rgba: PremulRgba);
}

/// A simple owned pixel grid storing premultiplied RGBA8, usable as a CPU
/// rendering [`Target`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Pixmap {
    width: i32,
    height: i32,
    data: Vec<[u8; 4]>,
}

impl Pixmap {
    /// Creates a fully transparent pixmap. Panics on non-positive sizes.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "pixmap dimensions must be positive");
        Self {
            width,
            height,
            data: vec![[0; 4]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Fills every pixel with the given color.
    pub fn fill(&mut self, color: Color) {
        let rgba = quantize(premultiplied(color));
        self.data.fill(rgba);
    }

    /// Raw premultiplied RGBA8 pixel data, row-major.
    pub fn data(&self) -> &[[u8; 4]] {
        &self.data
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.bounds().contains(x, y));
        (y * self.width + x) as usize
    }
}

fn quantize(rgba: PremulRgba) -> [u8; 4] {
    [
        (rgba[0] * 255.0) as u8,
        (rgba[1] * 255.0) as u8,
        (rgba[2] * 255.0) as u8,
        (rgba[3] * 255.0) as u8,
    ]
}

impl Target for Pixmap {
    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn read(&self, x: i32, y: i32) -> PremulRgba {
        let [r, g, b, a] = self.data[self.offset(x, y)];
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        ]
    }

    fn write(&mut self, x: i32, y: i32, rgba: PremulRgba) {
        let offset = self.offset(x, y);
        self.data[offset] = quantize(rgba);
    }
}

/// Screen orientation a mask is drawn under.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Orientation {
    Horz,
    Sideways,
    SidewaysRight,
}

impl Orientation {
    /// Top-left target pixel covered by mask pixel `(sx, sy)` when drawing
    /// at `(x, y)` with the given scale.
    fn scaled_top_left(self, x: i32, y: i32, sx: i32, sy: i32, scale: i32) -> (i32, i32) {
        match self {
            Self::Horz => (x + sx * scale, y + sy * scale),
            Self::Sideways => (x + sy * scale, y - (sx + 1) * scale),
            Self::SidewaysRight => (x - (sy + 1) * scale, y + sx * scale),
        }
    }
}

/// Composes a glyph mask onto the target: resolves each sample through the
/// strand's color tables, blends with the chosen mode, and replicates every
/// source pixel into a `scale x scale` block.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_mask(
    target: &mut dyn Target,
    strand: &Strand,
    mask: &AlphaMask,
    x: i32,
    y: i32,
    scale: i32,
    rgba: PremulRgba,
    mode: BlendMode,
    orientation: Orientation,
) {
    // Monomorphised per blend mode; the kernel dispatch happens once per
    // mask, not once per pixel.
    match mode {
        BlendMode::Over => {
            composite(target, strand, mask, x, y, scale, rgba, false, orientation, blend::over);
        }
        BlendMode::Replace => {
            composite(target, strand, mask, x, y, scale, rgba, true, orientation, |new, _| new);
        }
        BlendMode::Add => {
            composite(target, strand, mask, x, y, scale, rgba, false, orientation, blend::add);
        }
        BlendMode::Sub => {
            composite(target, strand, mask, x, y, scale, rgba, false, orientation, blend::sub);
        }
        BlendMode::Multiply => {
            composite(target, strand, mask, x, y, scale, rgba, false, orientation, blend::multiply);
        }
        BlendMode::Cut => {
            composite(target, strand, mask, x, y, scale, rgba, false, orientation, blend::cut);
        }
        BlendMode::Hue => {
            composite(target, strand, mask, x, y, scale, rgba, false, orientation, blend::hue);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn composite(
    target: &mut dyn Target,
    strand: &Strand,
    mask: &AlphaMask,
    x: i32,
    y: i32,
    scale: i32,
    rgba: PremulRgba,
    keep_transparent: bool,
    orientation: Orientation,
    kernel: impl Fn(PremulRgba, PremulRgba) -> PremulRgba,
) {
    let src = mask.bounds();
    let dst = target.bounds();
    let mut colors = ResolveMemo::new();
    let mut memo = BlendMemo::new();
    let mut prev_transparent = false;
    for sy in src.min_y..src.max_y {
        for sx in src.min_x..src.max_x {
            let index = mask.sample(sx, sy);
            let color = if index == 0 {
                // Reserved for transparency; only Replace stamps it.
                if !keep_transparent {
                    continue;
                }
                if !prev_transparent {
                    memo.reset();
                    prev_transparent = true;
                }
                blend::TRANSPARENT
            } else {
                let (color, changed) = colors.resolve(strand, index, rgba);
                // The memo is keyed on the destination only, so leaving a
                // transparent run must reset it even when the resolved
                // index is unchanged.
                if changed || prev_transparent {
                    memo.reset();
                }
                prev_transparent = false;
                color
            };

            let (tx, ty) = orientation.scaled_top_left(x, y, sx, sy, scale);
            for zy in 0..scale {
                let py = ty + zy;
                if py < dst.min_y {
                    continue;
                }
                if py >= dst.max_y {
                    break;
                }
                for zx in 0..scale {
                    let px = tx + zx;
                    if px < dst.min_x {
                        continue;
                    }
                    if px >= dst.max_x {
                        break;
                    }
                    let out = memo.apply(&kernel, color, target.read(px, py));
                    target.write(px, py, out);
                }
            }
        }
    }
}
