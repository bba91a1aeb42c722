// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-axis text alignment.

use core::fmt;
use core::ops::BitOr;

/// Tells a renderer how to interpret the coordinates passed to draw and
/// measure operations: which part of the text's bounding rectangle is
/// anchored to them.
///
/// An align has a vertical and a horizontal component, combined with `|`:
///
/// ```
/// # use weft::Align;
/// let align = Align::TOP | Align::RIGHT;
/// assert_eq!(align.vert(), Align::TOP);
/// assert_eq!(align.horz(), Align::RIGHT);
/// ```
///
/// Component names assume the horizontal writing direction; for sideways
/// directions the same shifts are projected onto the rotated axes.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Align(u8);

impl Align {
    /// Anchor to the left edge.
    pub const LEFT: Self = Self(0b0010_0000);
    /// Anchor to the horizontal center.
    pub const HORZ_CENTER: Self = Self(0b0100_0000);
    /// Anchor to the right edge.
    pub const RIGHT: Self = Self(0b1000_0000);

    /// Anchor to the top of the font's ascent.
    pub const TOP: Self = Self(0b0000_0001);
    /// Anchor to the top of uppercase letters (rarely used).
    pub const CAP_LINE: Self = Self(0b0000_0011);
    /// Anchor to the top of lowercase letters (rarely used).
    pub const MIDLINE: Self = Self(0b0000_0010);
    /// Anchor to the vertical middle of the text.
    pub const VERT_CENTER: Self = Self(0b0000_1001);
    /// Anchor to the first-line baseline.
    pub const BASELINE: Self = Self(0b0000_0100);
    /// Anchor to the bottom of the font's descent.
    pub const BOTTOM: Self = Self(0b0000_1000);
    /// Anchor to the last baseline (relevant for multiline text).
    pub const LAST_BASELINE: Self = Self(0b0000_1100);

    /// Both components centered.
    pub const CENTER: Self = Self(Self::HORZ_CENTER.0 | Self::VERT_CENTER.0);

    const VERT_BITS: u8 = 0b0000_1111;
    const HORZ_BITS: u8 = 0b1111_0000;

    /// The vertical component, or an empty align if unset.
    pub fn vert(self) -> Self {
        Self(self.0 & Self::VERT_BITS)
    }

    /// The horizontal component, or an empty align if unset.
    pub fn horz(self) -> Self {
        Self(self.0 & Self::HORZ_BITS)
    }

    pub fn has_vert_component(self) -> bool {
        self.0 & Self::VERT_BITS != 0
    }

    pub fn has_horz_component(self) -> bool {
        self.0 & Self::HORZ_BITS != 0
    }

    /// Overrides the current align with the non-empty components of `new`.
    /// Components that `new` leaves unset are preserved.
    pub fn adjusted(self, new: Self) -> Self {
        let horz = new.horz();
        let vert = new.vert();
        if horz.0 != 0 {
            if vert.0 != 0 {
                return new;
            }
            Self(horz.0 | self.vert().0)
        } else if vert.0 != 0 {
            Self(self.horz().0 | vert.0)
        } else {
            self
        }
    }

    fn vert_name(self) -> &'static str {
        match self.vert() {
            Self::TOP => "Top",
            Self::CAP_LINE => "CapLine",
            Self::MIDLINE => "Midline",
            Self::VERT_CENTER => "VertCenter",
            Self::BASELINE => "Baseline",
            Self::BOTTOM => "Bottom",
            Self::LAST_BASELINE => "LastBaseline",
            _ => "VertUnknown",
        }
    }

    fn horz_name(self) -> &'static str {
        match self.horz() {
            Self::LEFT => "Left",
            Self::HORZ_CENTER => "HorzCenter",
            Self::RIGHT => "Right",
            _ => "HorzUnknown",
        }
    }
}

impl BitOr for Align {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "(ZeroAlign)");
        }
        if !self.has_vert_component() {
            return write!(f, "({})", self.horz_name());
        }
        if !self.has_horz_component() {
            return write!(f, "({})", self.vert_name());
        }
        write!(f, "({} | {})", self.vert_name(), self.horz_name())
    }
}
