// Copyright 2025 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-wrap policy tests.

use std::sync::Arc;

use super::utils::{TestFont, new_renderer, renderer_over};
use crate::font::Font;
use crate::glyph::Glyph;
use crate::layout::{ELIDE_BIT, WRAP_INDEX_MASK};
use crate::rewrite::{Pass, RewriteError, Rewriter};
use crate::strand::WrapClass;

#[test]
fn wrap_at_space_matches_explicit_break() {
    let mut renderer = new_renderer();

    let (hello_width, _) = renderer.measure("HELLO");
    let (two_lines_width, two_lines_height) = renderer.measure("HELLO\nHELLO");
    assert_eq!(hello_width, two_lines_width);
    assert!(renderer.run().wrap_indices.is_empty());

    let (w, h) = renderer.measure_with_wrap("HELLO HELLO", hello_width);
    assert_eq!(w, hello_width);
    assert_eq!(h, two_lines_height);
    assert!(!renderer.run().wrap_indices.is_empty());
}

#[test]
fn wrap_indices_are_strictly_increasing() {
    let mut renderer = new_renderer();
    let text = "AA BB CC DD EE FF GG HH";
    let (narrow, _) = renderer.measure("AA B");
    let _ = renderer.measure_with_wrap(text, narrow);
    let run = renderer.run();
    assert!(run.wrap_indices.len() > 1);
    let indices: Vec<usize> = run
        .wrap_indices
        .iter()
        .map(|&w| usize::from(w & WRAP_INDEX_MASK))
        .collect();
    for pair in indices.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    for index in indices {
        assert!(index < run.glyphs.len());
    }
}

#[test]
fn spaces_wrap_as_elisions() {
    let mut renderer = new_renderer();
    // "AB CD" with room for exactly "AB": the space is consumed.
    let (prefix, _) = renderer.measure("AB");
    let _ = renderer.measure_with_wrap("AB CD", prefix);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[2 | ELIDE_BIT]);
    let (w, _) = renderer.measure_with_wrap("AB CD", prefix);
    assert_eq!(w, prefix);
}

#[test]
fn after_class_keeps_the_glyph_on_the_line() {
    let font = Arc::new(TestFont::new());
    let dash = font.glyph('-');
    let mut renderer = renderer_over(font);
    renderer
        .strand_mut()
        .set_wrap_glyphs(WrapClass::After, &[dash]);

    // "AB-CD" with room up to mid-C: break at the dash, dash stays.
    let (w, _) = renderer.measure_with_wrap("AB-CD", 20);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[3]);
    let (dash_line, _) = renderer.measure("AB-");
    assert_eq!(w, dash_line);
}

#[test]
fn before_class_moves_the_glyph_to_the_new_line() {
    let font = Arc::new(TestFont::new());
    let dash = font.glyph('-');
    let mut renderer = renderer_over(font);
    renderer
        .strand_mut()
        .set_wrap_glyphs(WrapClass::Before, &[dash]);

    let (w, _) = renderer.measure_with_wrap("AB-CD", 20);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[2]);
    // The second line carries "-CD" and is the longer one.
    let (second_line, _) = renderer.measure("-CD");
    assert_eq!(w, second_line);
}

#[test]
fn elide_class_consumes_the_glyph() {
    let font = Arc::new(TestFont::new());
    let dash = font.glyph('-');
    let mut renderer = renderer_over(font);
    renderer
        .strand_mut()
        .set_wrap_glyphs(WrapClass::Elide, &[dash]);

    let (w, _) = renderer.measure_with_wrap("AB-CD", 20);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[2 | ELIDE_BIT]);
    let (prefix, _) = renderer.measure("AB");
    assert_eq!(w, prefix);
}

#[test]
fn wrap_ranges_declare_membership() {
    let font = Arc::new(TestFont::new());
    let dash = font.glyph('-');
    let mut renderer = renderer_over(font);
    renderer
        .strand_mut()
        .set_wrap_ranges(WrapClass::After, &[(dash, dash)]);
    let _ = renderer.measure_with_wrap("AB-CD", 20);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[3]);
}

#[test]
fn forced_break_keeps_at_least_one_glyph() {
    let mut renderer = new_renderer();
    // No wrap opportunities at all: break before the overflowing glyph.
    let _ = renderer.measure_with_wrap("AAAA", 12);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[2]);

    // A line narrower than a single glyph still keeps one per line.
    let (w, _) = renderer.measure_with_wrap("AA", 3);
    assert_eq!(renderer.run().wrap_indices.as_slice(), &[1]);
    assert_eq!(w, 5);
}

#[test]
fn newline_right_after_a_wrap_is_absorbed() {
    let mut renderer = new_renderer();
    let (prefix, _) = renderer.measure("AB");
    let (_, wrapped_height) = renderer.measure_with_wrap("AB \nCD", prefix);
    let (_, two_lines_height) = renderer.measure("AB\nCD");
    assert_eq!(wrapped_height, two_lines_height);
}

/// Test rewriter: maps through the font, plus 'z' to a zero-width glyph,
/// '#' to a custom control and '!' to an effect marker.
struct ControlRewriter {
    font: Arc<TestFont>,
}

impl Rewriter for ControlRewriter {
    fn begin_pass(&mut self, _pass: Pass) -> Result<(), RewriteError> {
        Ok(())
    }

    fn feed(&mut self, ch: char, emit: &mut dyn FnMut(Glyph)) {
        match ch {
            'z' => emit(Glyph::Zilch),
            '#' => emit(Glyph::Custom(7)),
            '!' => emit(Glyph::Effect),
            '\n' => emit(Glyph::Newline),
            _ => match self.font.lookup(ch, &[]) {
                Some(group) => emit(Glyph::Real(group.first())),
                None => emit(Glyph::Missing),
            },
        }
    }

    fn break_run(&mut self, _emit: &mut dyn FnMut(Glyph)) {}

    fn finish(&mut self, _emit: &mut dyn FnMut(Glyph)) {}
}

fn renderer_with_rewriter() -> crate::renderer::Renderer {
    let font = Arc::new(TestFont::new());
    let mut renderer = renderer_over(font.clone());
    renderer
        .strand_mut()
        .set_rewriter(Some(Box::new(ControlRewriter { font })));
    renderer
}

#[test]
fn zilch_glyphs_preserve_the_kerning_pair() {
    let mut font = TestFont::new();
    font.set_kerning('A', 'B', -2);
    let font = Arc::new(font);
    let mut renderer = renderer_over(font.clone());
    renderer
        .strand_mut()
        .set_rewriter(Some(Box::new(ControlRewriter { font })));
    let (plain, _) = renderer.measure("AB");
    let (with_zilch, _) = renderer.measure("AzB");
    assert_eq!(plain, with_zilch);
}

#[test]
fn custom_controls_contribute_nothing() {
    let mut renderer = renderer_with_rewriter();
    let (plain, h1) = renderer.measure("AB");
    let (with_control, h2) = renderer.measure("A#B");
    assert_eq!(plain, with_control);
    assert_eq!(h1, h2);
}

#[test]
#[should_panic(expected = "unimplemented")]
fn effect_markers_are_fatal() {
    let mut renderer = renderer_with_rewriter();
    let _ = renderer.measure("A!B");
}

#[test]
#[should_panic(expected = "missing glyph")]
fn missing_glyphs_in_the_stream_are_fatal() {
    let mut renderer = renderer_with_rewriter();
    let _ = renderer.measure("Aé");
}
