// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pixel compose kernels over premultiplied RGBA.

/// Premultiplied RGBA components in `[0, 1]`.
pub type PremulRgba = [f32; 4];

pub(crate) const TRANSPARENT: PremulRgba = [0.0, 0.0, 0.0, 0.0];

/// How to compose resolved glyph colors with the destination pixels.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum BlendMode {
    /// Glyphs drawn over the target (default).
    #[default]
    Over,
    /// Glyph mask only, transparent pixels included.
    Replace,
    /// Add colors; black adds nothing, white stays white.
    Add,
    /// Subtract colors; black removes nothing. Alpha is kept from the target.
    Sub,
    /// Multiply glyph and target colors.
    Multiply,
    /// Cut a glyph-shaped hole based on alpha (cutout text).
    Cut,
    /// Keep the highest alpha, blend hues proportionally to alpha.
    Hue,
}

/// Composes `new` over `dst` with the given mode. Generic dispatch; draw
/// loops that know the mode up front use the kernels directly instead.
pub fn blend(mode: BlendMode, new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    match mode {
        BlendMode::Over => over(new, dst),
        BlendMode::Replace => new,
        BlendMode::Add => add(new, dst),
        BlendMode::Sub => sub(new, dst),
        BlendMode::Multiply => multiply(new, dst),
        BlendMode::Cut => cut(new, dst),
        BlendMode::Hue => hue(new, dst),
    }
}

pub(crate) fn over(new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    if new[3] == 1.0 || dst[3] == 0.0 {
        return new;
    }
    if new[3] == 0.0 {
        return dst;
    }
    let oma = 1.0 - new[3];
    [
        new[0] + dst[0] * oma,
        new[1] + dst[1] * oma,
        new[2] + dst[2] * oma,
        new[3] + dst[3] * oma,
    ]
}

pub(crate) fn add(new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    [
        (new[0] + dst[0]).min(1.0),
        (new[1] + dst[1]).min(1.0),
        (new[2] + dst[2]).min(1.0),
        (new[3] + dst[3]).min(1.0),
    ]
}

pub(crate) fn sub(new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    if new[3] == 0.0 {
        return dst;
    }
    [
        (dst[0] - new[0]).max(0.0),
        (dst[1] - new[1]).max(0.0),
        (dst[2] - new[2]).max(0.0),
        dst[3],
    ]
}

pub(crate) fn multiply(new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    if new[3] == 0.0 || dst[3] == 0.0 {
        return TRANSPARENT;
    }
    [
        (new[0] * dst[0]).min(1.0),
        (new[1] * dst[1]).min(1.0),
        (new[2] * dst[2]).min(1.0),
        (new[3] * dst[3]).min(1.0),
    ]
}

pub(crate) fn cut(new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    if new[3] == 0.0 {
        return dst;
    }
    let alpha = (dst[3] - new[3]).max(0.0);
    [
        dst[0].min(alpha),
        dst[1].min(alpha),
        dst[2].min(alpha),
        alpha,
    ]
}

pub(crate) fn hue(new: PremulRgba, dst: PremulRgba) -> PremulRgba {
    if new[3] == 0.0 {
        return dst;
    }
    if dst[3] == 0.0 {
        return new;
    }
    // Hue contribution is proportional to alpha; equal alphas blend 50/50.
    let ta = new[3] + dst[3];
    let ma = new[3].max(dst[3]);
    let r = (new[0] + dst[0]) * ma / ta;
    let g = (new[1] + dst[1]) * ma / ta;
    let b = (new[2] + dst[2]) * ma / ta;
    over([r, g, b, ma], dst)
}

/// Memo over the most recent `(dst, out)` pair of a single draw, used to
/// short-circuit runs of identical destination pixels. Must be reset
/// whenever the resolved source color changes.
#[derive(Clone, Debug)]
pub(crate) struct BlendMemo {
    valid: bool,
    dst: PremulRgba,
    out: PremulRgba,
}

impl BlendMemo {
    pub(crate) fn new() -> Self {
        Self {
            valid: false,
            dst: TRANSPARENT,
            out: TRANSPARENT,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.valid = false;
    }

    pub(crate) fn apply(
        &mut self,
        kernel: impl Fn(PremulRgba, PremulRgba) -> PremulRgba,
        new: PremulRgba,
        dst: PremulRgba,
    ) -> PremulRgba {
        if self.valid && dst == self.dst {
            return self.out;
        }
        let out = kernel(new, dst);
        self.valid = true;
        self.dst = dst;
        self.out = out;
        out
    }
}
