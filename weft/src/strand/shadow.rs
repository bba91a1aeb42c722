// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strand shadow configuration.
//!
//! A strand can carry another strand to be drawn as a "shadow" pre-pass,
//! which is how outlines and hard shadows are done. Shadows are rendered
//! with the same glyph indices and baseline positions as the primary
//! strand, so the two must be closely related: usually the same font with
//! an offset, or a derived outline font.

use peniko::Color;

use super::Strand;

impl Strand {
    /// Sets the strand drawn as a shadow under this one. `None` removes it.
    pub fn set_shadow(&mut self, shadow: Option<Strand>) {
        self.shadow = shadow.map(Box::new);
    }

    /// The current shadow strand, if any.
    pub fn shadow(&self) -> Option<&Strand> {
        self.shadow.as_deref()
    }

    pub fn shadow_mut(&mut self) -> Option<&mut Strand> {
        self.shadow.as_deref_mut()
    }

    /// Sets the color the shadow pass substitutes for the main dye.
    pub fn set_shadow_color(&mut self, color: Color) {
        self.shadow_color = color;
    }

    pub fn shadow_color(&self) -> Color {
        self.shadow_color
    }

    /// Sets the shadow offsets. By default offsets are scaled alongside the
    /// text scale; see [`Strand::set_shadow_offset_scaling`].
    pub fn set_shadow_offsets(&mut self, x: i8, y: i8) {
        self.shadow_offset_x = x;
        self.shadow_offset_y = y;
    }

    pub fn shadow_offsets(&self) -> (i8, i8) {
        (self.shadow_offset_x, self.shadow_offset_y)
    }

    /// Disabling offset scaling gives precise control over the shadow
    /// position regardless of the text scale.
    pub fn set_shadow_offset_scaling(&mut self, enabled: bool) {
        self.shadow_offset_scaling = enabled;
    }

    pub fn shadow_offset_scaling(&self) -> bool {
        self.shadow_offset_scaling
    }
}
