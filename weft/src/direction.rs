// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Writing directions.

/// Main direction of the text.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    /// Left to right, lines going top to bottom.
    #[default]
    Horizontal,
    /// Vertical, lines going left to right. Unimplemented; operations
    /// using it panic.
    Vertical,
    /// Sideways, glyph tops on the left side, text going bottom to top.
    Sideways,
    /// Sideways, glyph tops on the right side, text going top to bottom.
    SidewaysRight,
}
