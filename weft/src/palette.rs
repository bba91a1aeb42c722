// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of alpha-mask color indices into premultiplied RGBA.
//!
//! Mask samples are 1-based indices into the font's color table, which
//! splits into a dye range (user-tintable, stored as alpha tones) followed
//! by a palette range (fixed colors). Index 0 means transparent and never
//! reaches this module.

use crate::blend::PremulRgba;
use crate::strand::Strand;

/// Resolves a non-zero mask sample against the strand's color tables.
///
/// `main_rgba` is the color of the current draw pass for the main dye:
/// the strand's main dye when active, the renderer's fallback otherwise,
/// and the shadow color during shadow passes.
pub(crate) fn resolve_color(strand: &Strand, index: u8, main_rgba: PremulRgba) -> PremulRgba {
    debug_assert!(index != 0, "index 0 is reserved for transparency");
    let k = (index - 1) as usize;
    let colors = strand.font_colors();
    assert!(k < colors.len(), "mask sample outside the font's color table");
    let mapping = strand.dye_mapping();
    if k < mapping.len() {
        let dye = mapping[k];
        let base = if dye == strand.main_dye_key() {
            main_rgba
        } else {
            strand.dye(dye)
        };
        // The stored entry holds the tone's alpha on all four components.
        let tone = colors[k];
        [
            base[0] * tone[0],
            base[1] * tone[1],
            base[2] * tone[2],
            base[3] * tone[3],
        ]
    } else {
        colors[k]
    }
}

/// Memo over the most recent resolved index, for runs of equal samples.
#[derive(Clone, Debug)]
pub(crate) struct ResolveMemo {
    prev_index: u16,
    prev_rgba: PremulRgba,
}

impl ResolveMemo {
    pub(crate) fn new() -> Self {
        Self {
            prev_index: u16::MAX,
            prev_rgba: [0.0; 4],
        }
    }

    /// Resolves `index`, reporting through the second tuple element whether
    /// the color changed since the previous call (so blend memos can reset).
    pub(crate) fn resolve(
        &mut self,
        strand: &Strand,
        index: u8,
        main_rgba: PremulRgba,
    ) -> (PremulRgba, bool) {
        if u16::from(index) == self.prev_index {
            return (self.prev_rgba, false);
        }
        let rgba = resolve_color(strand, index, main_rgba);
        self.prev_index = u16::from(index);
        self.prev_rgba = rgba;
        (rgba, true)
    }
}
