// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph identities and control codes.

/// Identifier of a real glyph within a font.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GlyphId(pub u16);

/// One element of a glyph stream.
///
/// Control variants carry layout meaning but never a visible mask. Only
/// [`Glyph::Newline`] and [`Glyph::Zilch`] affect layout; the remaining
/// controls contribute zero advance and zero kerning.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Glyph {
    /// A drawable glyph of the current font.
    Real(GlyphId),
    /// An explicit line break.
    Newline,
    /// Zero-width glyph: no advance, no kerning, and it does not interrupt
    /// the kerning pair formed by its neighbors.
    Zilch,
    /// A code point the font could not map. Fatal when it reaches layout.
    Missing,
    /// Inline formatting-effect marker. Declared unimplemented.
    Effect,
    /// Reserved user-range control. Ignored by layout and drawing.
    Custom(u32),
}

impl Glyph {
    /// Whether this is a drawable [`Glyph::Real`] variant.
    pub fn is_real(self) -> bool {
        matches!(self, Self::Real(_))
    }
}

/// Largest payload representable by [`Glyph::Custom`] once packed.
pub const MAX_CUSTOM_GLYPH: u32 = PackedGlyph::EFFECT - PackedGlyph::CUSTOM_BASE - 1;

/// Compact 32-bit form of [`Glyph`] used in run buffers and cache keys.
///
/// Real glyph ids occupy the low 16-bit range, custom controls sit above
/// them, and the named controls take the top values.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct PackedGlyph(u32);

impl PackedGlyph {
    const CUSTOM_BASE: u32 = 0x0001_0000;
    const EFFECT: u32 = 0xFFFF_FFFC;
    const MISSING: u32 = 0xFFFF_FFFD;
    const ZILCH: u32 = 0xFFFF_FFFE;
    const NEWLINE: u32 = 0xFFFF_FFFF;

    pub(crate) fn pack(glyph: Glyph) -> Self {
        match glyph {
            Glyph::Real(GlyphId(id)) => Self(u32::from(id)),
            Glyph::Newline => Self(Self::NEWLINE),
            Glyph::Zilch => Self(Self::ZILCH),
            Glyph::Missing => Self(Self::MISSING),
            Glyph::Effect => Self(Self::EFFECT),
            Glyph::Custom(value) => {
                assert!(value <= MAX_CUSTOM_GLYPH, "custom glyph value out of range");
                Self(Self::CUSTOM_BASE + value)
            }
        }
    }

    pub(crate) fn unpack(self) -> Glyph {
        match self.0 {
            Self::NEWLINE => Glyph::Newline,
            Self::ZILCH => Glyph::Zilch,
            Self::MISSING => Glyph::Missing,
            Self::EFFECT => Glyph::Effect,
            bits if bits < Self::CUSTOM_BASE => Glyph::Real(GlyphId(bits as u16)),
            bits => Glyph::Custom(bits - Self::CUSTOM_BASE),
        }
    }

    /// Raw bits, usable as the glyph half of a cache key.
    pub(crate) fn bits(self) -> u32 {
        self.0
    }
}

impl From<Glyph> for PackedGlyph {
    fn from(glyph: Glyph) -> Self {
        Self::pack(glyph)
    }
}

impl From<GlyphId> for PackedGlyph {
    fn from(id: GlyphId) -> Self {
        Self::pack(Glyph::Real(id))
    }
}
