// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-loop tests over the in-memory pixmap target.

use std::sync::{Arc, Mutex};

use peniko::Color;

use super::utils::{TestFont, new_renderer, renderer_over};
use crate::align::Align;
use crate::blend::BlendMode;
use crate::direction::Direction;
use crate::font::Font as _;
use crate::glyph::{GlyphId, PackedGlyph};
use crate::render::{DrawParams, GlyphEmitter, PaintPass, Pixmap, Target};
use crate::strand::Strand;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn pixel(target: &Pixmap, x: i32, y: i32) -> [u8; 4] {
    target.data()[(y * target.width() + x) as usize]
}

#[test]
fn wrap_draw_matches_explicit_break_draw() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::TOP | Align::LEFT);

    let (w, h) = renderer.measure("HELLO\nHELLO");
    let mut explicit = Pixmap::new(w, h);
    let mut wrapped = Pixmap::new(w, h);
    renderer.draw(&mut explicit, "HELLO\nHELLO", 0, 0);
    assert!(renderer.run().wrap_indices.is_empty());
    renderer.draw_with_wrap(&mut wrapped, "HELLO HELLO", 0, 0, w);
    assert!(!renderer.run().wrap_indices.is_empty());
    assert_eq!(explicit, wrapped);
}

#[test]
fn glyphs_land_on_the_baseline_grid() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::TOP | Align::LEFT);
    let mut target = Pixmap::new(8, 12);
    renderer.draw(&mut target, "A", 0, 0);

    // The block body spans the uppercase height under the ascent line.
    assert_eq!(pixel(&target, 0, 0), CLEAR);
    assert_eq!(pixel(&target, 0, 1), WHITE);
    assert_eq!(pixel(&target, 4, 6), WHITE);
    assert_eq!(pixel(&target, 5, 1), CLEAR);
    assert_eq!(pixel(&target, 0, 7), CLEAR);
}

#[test]
fn descenders_draw_below_the_baseline() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::BASELINE | Align::LEFT);
    let mut target = Pixmap::new(8, 12);
    renderer.draw(&mut target, "_", 0, 7);
    assert_eq!(pixel(&target, 0, 7), CLEAR);
    assert_eq!(pixel(&target, 0, 8), WHITE);
    assert_eq!(pixel(&target, 4, 8), WHITE);
    assert_eq!(pixel(&target, 0, 9), CLEAR);
}

#[test]
fn scaling_replicates_whole_pixel_blocks() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::BASELINE | Align::LEFT);
    renderer.set_scale(3);
    let mut target = Pixmap::new(10, 10);
    renderer.draw(&mut target, ".", 0, 5);

    // The 2x1 dot becomes a 6x3 block right above the baseline.
    for y in 2..5 {
        for x in 0..6 {
            assert_eq!(pixel(&target, x, y), WHITE, "expected lit pixel at {x},{y}");
        }
    }
    assert_eq!(pixel(&target, 6, 2), CLEAR);
    assert_eq!(pixel(&target, 0, 5), CLEAR);
    assert_eq!(pixel(&target, 0, 1), CLEAR);
}

#[test]
fn replace_blending_stamps_transparency() {
    let red = Color::from_rgba8(255, 0, 0, 255);

    let mut renderer = new_renderer();
    renderer.set_align(Align::TOP | Align::LEFT);
    let mut target = Pixmap::new(10, 10);
    target.fill(red);
    renderer.set_blend_mode(BlendMode::Replace);
    renderer.draw(&mut target, "O", 0, 0);

    // Ring pixels become the text color, the hollow interior is cleared,
    // and anything outside the mask keeps the background. The right edge
    // follows a transparent run within its row, so it also catches stale
    // compose-memo state.
    assert_eq!(pixel(&target, 0, 1), WHITE);
    assert_eq!(pixel(&target, 4, 1), WHITE);
    assert_eq!(pixel(&target, 4, 3), WHITE);
    assert_eq!(pixel(&target, 2, 3), CLEAR);
    assert_eq!(pixel(&target, 7, 7), [255, 0, 0, 255]);

    // Over blending skips the transparent interior instead.
    let mut over_target = Pixmap::new(10, 10);
    over_target.fill(red);
    renderer.set_blend_mode(BlendMode::Over);
    renderer.draw(&mut over_target, "O", 0, 0);
    assert_eq!(pixel(&over_target, 2, 3), [255, 0, 0, 255]);
}

#[test]
fn shadow_pass_draws_under_the_main_pass() {
    let font = Arc::new(TestFont::new());
    let mut strand = Strand::new(font.clone());
    let shadow = Strand::new(font);
    strand.set_shadow(Some(shadow));
    strand.set_shadow_color(Color::from_rgba8(0, 0, 0, 255));
    strand.set_shadow_offsets(1, 1);

    let mut renderer = new_renderer();
    renderer.set_strand(strand);
    renderer.set_align(Align::TOP | Align::LEFT);
    let mut target = Pixmap::new(10, 10);
    renderer.draw(&mut target, "A", 0, 0);

    // Offset corner only touched by the shadow; body kept by the main pass.
    assert_eq!(pixel(&target, 5, 7), BLACK);
    assert_eq!(pixel(&target, 2, 3), WHITE);
    assert_eq!(pixel(&target, 0, 0), CLEAR);
}

#[test]
fn shadow_offsets_scale_with_the_text() {
    let font = Arc::new(TestFont::new());
    let mut strand = Strand::new(font.clone());
    strand.set_shadow(Some(Strand::new(font)));
    strand.set_shadow_color(Color::from_rgba8(0, 0, 0, 255));
    strand.set_shadow_offsets(1, 1);

    let mut renderer = new_renderer();
    renderer.set_strand(strand);
    renderer.set_align(Align::TOP | Align::LEFT);
    renderer.set_scale(2);
    let mut target = Pixmap::new(16, 20);
    renderer.draw(&mut target, ".", 0, 0);

    // At scale 2 the dot body covers a 4x2 block starting two rows under
    // the scaled ascent; the shadow pokes out two pixels on each axis.
    assert_eq!(pixel(&target, 0, 12), WHITE);
    assert_eq!(pixel(&target, 4, 14), BLACK);
    assert_eq!(pixel(&target, 5, 15), BLACK);

    renderer.strand_mut().set_shadow_offset_scaling(false);
    let mut unscaled = Pixmap::new(16, 20);
    renderer.draw(&mut unscaled, ".", 0, 0);
    assert_eq!(pixel(&unscaled, 4, 14), BLACK);
    assert_eq!(pixel(&unscaled, 5, 15), CLEAR);
}

#[test]
fn draw_from_buffer_replays_the_last_layout() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::TOP | Align::LEFT);
    let (w, h) = renderer.measure("AB");

    let mut direct = Pixmap::new(w, h);
    renderer.draw(&mut direct, "AB", 0, 0);

    let mut replayed = Pixmap::new(w, h);
    let _ = renderer.measure("AB");
    renderer.draw_from_buffer(&mut replayed, 0, 0);
    assert_eq!(direct, replayed);
}

#[test]
fn right_alignment_anchors_the_right_edge() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::TOP | Align::LEFT);
    let (w, h) = renderer.measure("AB");
    let mut left = Pixmap::new(w, h);
    renderer.draw(&mut left, "AB", 0, 0);

    renderer.set_align(Align::RIGHT);
    let mut right = Pixmap::new(w, h);
    renderer.draw(&mut right, "AB", w, 0);
    assert_eq!(left, right);
}

#[test]
fn sideways_text_runs_bottom_to_top() {
    let mut renderer = new_renderer();
    renderer.set_align(Align::TOP | Align::LEFT);
    renderer.set_direction(Direction::Sideways);
    let mut target = Pixmap::new(12, 12);
    renderer.draw(&mut target, "A", 0, 10);

    let lit = target
        .data()
        .iter()
        .filter(|&&rgba| rgba == WHITE)
        .count();
    assert_eq!(lit, 30);
    // The block lies rotated: uppercase height along x, advance along y.
    assert_eq!(pixel(&target, 1, 5), WHITE);
    assert_eq!(pixel(&target, 6, 9), WHITE);
    assert_eq!(pixel(&target, 0, 5), CLEAR);
    assert_eq!(pixel(&target, 1, 10), CLEAR);
}

struct RecordingEmitter {
    glyphs: Arc<Mutex<Vec<(GlyphId, i32, i32)>>>,
}

impl GlyphEmitter for RecordingEmitter {
    fn emit(&mut self, _target: &mut dyn Target, glyph: GlyphId, params: DrawParams) {
        self.glyphs.lock().unwrap().push((glyph, params.x, params.y));
    }
}

#[test]
fn custom_emitters_see_reading_order() {
    let font = Arc::new(TestFont::new());
    let mut renderer = renderer_over(font.clone());
    renderer.set_align(Align::TOP | Align::LEFT);

    let glyphs = Arc::new(Mutex::new(Vec::new()));
    renderer.set_emitter(Some(Box::new(RecordingEmitter {
        glyphs: glyphs.clone(),
    })));
    let mut target = Pixmap::new(16, 24);
    renderer.draw(&mut target, "AB\nC", 0, 0);

    let recorded = glyphs.lock().unwrap();
    let ids: Vec<GlyphId> = recorded.iter().map(|&(id, _, _)| id).collect();
    assert_eq!(ids, vec![font.glyph('A'), font.glyph('B'), font.glyph('C')]);
    // Second line starts back at the left edge, one line height down.
    assert_eq!(recorded[0].1, 0);
    assert!(recorded[1].1 > recorded[0].1);
    assert_eq!(recorded[2].1, 0);
    assert_eq!(recorded[2].2, recorded[0].2 + super::utils::LINE_HEIGHT);
    // Nothing was composited.
    assert!(target.data().iter().all(|&rgba| rgba == CLEAR));
}

#[test]
fn pass_listener_runs_shadow_then_main() {
    let font = Arc::new(TestFont::new());
    let mut strand = Strand::new(font.clone());
    strand.set_shadow(Some(Strand::new(font)));

    let mut renderer = new_renderer();
    renderer.set_strand(strand);
    let passes = Arc::new(Mutex::new(Vec::new()));
    let recorded = passes.clone();
    renderer.set_pass_listener(Some(Box::new(move |pass| {
        recorded.lock().unwrap().push(pass);
    })));
    let mut target = Pixmap::new(8, 12);
    renderer.draw(&mut target, "A", 0, 8);
    assert_eq!(
        passes.lock().unwrap().as_slice(),
        &[PaintPass::Shadow, PaintPass::Main]
    );
}

#[test]
fn precache_fills_the_shared_cache() {
    let font = Arc::new(TestFont::new());
    let renderer = renderer_over(font.clone());
    let glyph_bits = PackedGlyph::from(font.glyph('B')).bits();
    assert!(crate::cache::shared().get(font.id(), glyph_bits).is_none());
    renderer.precache("B");
    assert!(crate::cache::shared().get(font.id(), glyph_bits).is_some());
}

#[test]
fn measure_matches_the_drawn_extent() {
    let mut renderer = new_renderer();
    renderer.set_bounding_mode(crate::layout::BoundingMode::Mask);
    renderer.set_align(Align::TOP | Align::LEFT);
    let (w, h) = renderer.measure("A.");

    let mut target = Pixmap::new(w + 4, h + 4);
    renderer.draw(&mut target, "A.", 0, 0);

    // Every lit pixel stays inside the measured box, and the box's top and
    // left edges are touched.
    let mut lit_left = i32::MAX;
    let mut lit_top = i32::MAX;
    for y in 0..target.height() {
        for x in 0..target.width() {
            if pixel(&target, x, y) != CLEAR {
                assert!(x < w && y < h, "lit pixel outside the measured box");
                lit_left = lit_left.min(x);
                lit_top = lit_top.min(y);
            }
        }
    }
    assert_eq!(lit_left, 0);
    assert_eq!(lit_top, 0);
}
