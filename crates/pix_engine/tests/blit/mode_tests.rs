use pix_engine::{
    BlitMode, Buffer, Color, Palette, PenColor, PixelFormat, Position, Ramp, Rectangle, ShiftDirection, Size,
    blit::{
        blit, blit_blend, blit_keyed, blit_keyed_zoomed, blit_matte, blit_matte_zoomed, blit_range_shift, blit_range_shift_zoomed, blit_swap, blit_with,
        blit_zoomed,
    },
};
use pretty_assertions::assert_eq;

use crate::{indexed, numbered};

fn at(x: i32, y: i32) -> Rectangle {
    Rectangle::new(Position::new(x, y), Size::new(0, 0))
}

// ============================================================================
// Copy
// ============================================================================

#[test]
fn test_copy_region() {
    let src = numbered(4, 4);
    let mut dest = indexed(6, 6, 99);
    let mut src_rect = Rectangle::from(1, 1, 2, 2);
    let mut dest_rect = at(3, 4);
    blit(&src, &mut src_rect, &mut dest, &mut dest_rect);

    assert_eq!(dest_rect, Rectangle::from(3, 4, 2, 2));
    assert_eq!(dest.index_at(3, 4), 5);
    assert_eq!(dest.index_at(4, 4), 6);
    assert_eq!(dest.index_at(3, 5), 9);
    assert_eq!(dest.index_at(4, 5), 10);
    assert_eq!(dest.index_at(2, 4), 99);
}

#[test]
fn test_copy_fully_clipped_is_noop() {
    let src = numbered(4, 4);
    let mut dest = indexed(4, 4, 7);
    let before = dest.clone();
    let mut src_rect = src.bounds();
    let mut dest_rect = at(10, 0);
    blit(&src, &mut src_rect, &mut dest, &mut dest_rect);
    assert!(dest_rect.is_empty());
    assert_eq!(dest, before);
}

#[test]
#[should_panic(expected = "unsupported copy blit")]
fn test_copy_format_mismatch_panics() {
    let src = numbered(2, 2);
    let mut dest = Buffer::new(PixelFormat::Rgb8, 2, 2).unwrap();
    blit(&src, &mut src.bounds(), &mut dest, &mut at(0, 0));
}

#[test]
fn test_zoomed_copy_replicates_blocks() {
    let src = numbered(2, 2);
    let mut dest = indexed(6, 4, 0);
    let mut src_rect = src.bounds();
    let mut dest_rect = at(0, 0);
    blit_zoomed(&src, &mut src_rect, &mut dest, &mut dest_rect, 3, 2);
    assert_eq!(dest_rect, Rectangle::from(0, 0, 6, 4));
    assert_eq!(dest.row(0), &[0, 0, 0, 1, 1, 1]);
    assert_eq!(dest.row(1), &[0, 0, 0, 1, 1, 1]);
    assert_eq!(dest.row(3), &[2, 2, 2, 3, 3, 3]);
}

#[test]
fn test_zoomed_copy_keeps_partly_visible_block() {
    let src = Buffer::from_raw(PixelFormat::Indexed8, 4, 1, vec![1, 2, 3, 4]).unwrap();
    let mut dest = indexed(8, 2, 0);
    let mut src_rect = src.bounds();
    let mut dest_rect = at(-1, 0);
    blit_zoomed(&src, &mut src_rect, &mut dest, &mut dest_rect, 2, 2);
    assert_eq!(dest_rect, Rectangle::from(0, 0, 7, 2));
    assert_eq!(src_rect, Rectangle::from(0, 0, 4, 1));
    // the first block is cut in half but its visible pixel still shows
    assert_eq!(dest.row(0), &[1, 2, 2, 3, 3, 4, 4, 0]);
    assert_eq!(dest.row(1), &[1, 2, 2, 3, 3, 4, 4, 0]);
}

#[test]
fn test_zoomed_copy_partial_block_top_left() {
    let src = numbered(3, 3);
    let mut dest = indexed(4, 4, 99);
    let mut dest_rect = at(-2, -1);
    blit_zoomed(&src, &mut src.bounds(), &mut dest, &mut dest_rect, 3, 3);
    assert_eq!(dest_rect, Rectangle::from(0, 0, 4, 4));
    assert_eq!(dest.row(0), &[0, 1, 1, 1]);
    assert_eq!(dest.row(1), &[0, 1, 1, 1]);
    assert_eq!(dest.row(2), &[3, 4, 4, 4]);
    assert_eq!(dest.row(3), &[3, 4, 4, 4]);
}

// ============================================================================
// Swap
// ============================================================================

#[test]
fn test_swap_twice_restores_both() {
    let mut a = numbered(8, 8);
    let mut b = indexed(5, 5, 200);
    let (orig_a, orig_b) = (a.clone(), b.clone());

    let mut a_rect = Rectangle::from(2, 3, 6, 6);
    let mut b_rect = at(-1, 1);
    blit_swap(&mut a, &mut a_rect, &mut b, &mut b_rect);
    assert_ne!(a, orig_a);
    assert_eq!(b.index_at(0, 1), orig_a.index_at(3, 3));
    assert_eq!(a.index_at(3, 3), 200);

    let mut a_rect = Rectangle::from(2, 3, 6, 6);
    let mut b_rect = at(-1, 1);
    blit_swap(&mut a, &mut a_rect, &mut b, &mut b_rect);
    assert_eq!(a, orig_a);
    assert_eq!(b, orig_b);
}

#[test]
fn test_swap_rgba() {
    let mut a = Buffer::new(PixelFormat::Rgba8, 2, 1).unwrap();
    a.set_rgba(0, 0, Color::rgba(1, 2, 3, 4));
    let mut b = Buffer::new(PixelFormat::Rgba8, 2, 1).unwrap();
    b.set_rgba(1, 0, Color::rgba(9, 9, 9, 9));
    let mut a_rect = a.bounds();
    blit_swap(&mut a, &mut a_rect, &mut b, &mut at(0, 0));
    assert_eq!(a.rgba_at(1, 0), Color::rgba(9, 9, 9, 9));
    assert_eq!(b.rgba_at(0, 0), Color::rgba(1, 2, 3, 4));
}

// ============================================================================
// Keyed & matte
// ============================================================================

#[test]
fn test_keyed_indexed_skips_key() {
    let src = Buffer::from_raw(PixelFormat::Indexed8, 3, 1, vec![0, 4, 0]).unwrap();
    let mut dest = indexed(3, 1, 9);
    let key = PenColor::indexed(Color::BLACK, 0);
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &key, None);
    assert_eq!(dest.row(0), &[9, 4, 9]);
}

#[test]
fn test_keyed_rgb_compares_color() {
    let mut src = Buffer::new(PixelFormat::Rgb8, 2, 1).unwrap();
    src.set_rgb(0, 0, Color::new(255, 0, 255));
    src.set_rgb(1, 0, Color::new(10, 20, 30));
    let mut dest = Buffer::new(PixelFormat::Rgba8, 2, 1).unwrap();
    let key = PenColor::rgb(Color::new(255, 0, 255));
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &key, None);
    assert_eq!(dest.rgba_at(0, 0), Color::TRANSPARENT);
    assert_eq!(dest.rgba_at(1, 0), Color::new(10, 20, 30));
}

#[test]
fn test_keyed_rgba_uses_alpha() {
    let mut src = Buffer::new(PixelFormat::Rgba8, 2, 1).unwrap();
    src.set_rgba(0, 0, Color::rgba(50, 50, 50, 0));
    src.set_rgba(1, 0, Color::rgba(60, 70, 80, 1));
    let mut dest = Buffer::new(PixelFormat::Rgb8, 2, 1).unwrap();
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &PenColor::default(), None);
    assert_eq!(dest.rgb_at(0, 0), Color::BLACK);
    assert_eq!(dest.rgb_at(1, 0), Color::new(60, 70, 80));
}

#[test]
fn test_keyed_indexed_onto_rgb_uses_palette() {
    let palette = Palette::from_colors(vec![Color::BLACK, Color::new(1, 2, 3), Color::rgba(4, 5, 6, 7)]).unwrap();
    let src = Buffer::from_raw(PixelFormat::Indexed8, 3, 1, vec![0, 1, 2]).unwrap();
    let mut dest = Buffer::new(PixelFormat::Rgb8, 3, 1).unwrap();
    dest.set_rgb(0, 0, Color::WHITE);
    let key = PenColor::from_palette(&palette, 0);
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &key, Some(&palette));
    assert_eq!(dest.rgb_at(0, 0), Color::WHITE);
    assert_eq!(dest.rgb_at(1, 0), Color::new(1, 2, 3));
    // RGB targets never store alpha
    assert_eq!(dest.rgb_at(2, 0), Color::new(4, 5, 6));
}

#[test]
#[should_panic(expected = "needs a palette")]
fn test_keyed_indexed_onto_rgb_without_palette_panics() {
    let src = numbered(2, 2);
    let mut dest = Buffer::new(PixelFormat::Rgb8, 2, 2).unwrap();
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &PenColor::indexed(Color::BLACK, 0), None);
}

#[test]
#[should_panic(expected = "unsupported keyed blit")]
fn test_keyed_rgb_onto_indexed_panics() {
    let src = Buffer::new(PixelFormat::Rgb8, 2, 2).unwrap();
    let mut dest = indexed(2, 2, 0);
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &PenColor::rgb(Color::WHITE), None);
}

#[test]
#[should_panic(expected = "has no palette index")]
fn test_keyed_indexed_key_without_index_panics() {
    let src = numbered(2, 2);
    let mut dest = indexed(2, 2, 0);
    blit_keyed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &PenColor::rgb(Color::WHITE), None);
}

#[test]
fn test_keyed_zoomed() {
    let src = Buffer::from_raw(PixelFormat::Indexed8, 2, 1, vec![0, 3]).unwrap();
    let mut dest = indexed(4, 2, 1);
    let key = PenColor::indexed(Color::BLACK, 0);
    blit_keyed_zoomed(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &key, None, 2, 2);
    assert_eq!(dest.row(0), &[1, 1, 3, 3]);
    assert_eq!(dest.row(1), &[1, 1, 3, 3]);
}

#[test]
fn test_matte_paints_constant() {
    let src = Buffer::from_raw(PixelFormat::Indexed8, 3, 1, vec![0, 4, 5]).unwrap();
    let mut dest = Buffer::new(PixelFormat::Rgba8, 3, 1).unwrap();
    let key = PenColor::indexed(Color::BLACK, 0);
    let matte = PenColor::rgb(Color::new(255, 255, 0));
    blit_matte(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &key, &matte);
    assert_eq!(dest.rgba_at(0, 0), Color::TRANSPARENT);
    assert_eq!(dest.rgba_at(1, 0), Color::new(255, 255, 0));
    assert_eq!(dest.rgba_at(2, 0), Color::new(255, 255, 0));
}

#[test]
fn test_matte_onto_indexed() {
    let mut src = Buffer::new(PixelFormat::Rgba8, 2, 1).unwrap();
    src.set_rgba(1, 0, Color::WHITE);
    let mut dest = indexed(2, 1, 0);
    blit_matte(&src, &mut src.bounds(), &mut dest, &mut at(0, 0), &PenColor::default(), &PenColor::indexed(Color::WHITE, 15));
    assert_eq!(dest.row(0), &[0, 15]);
}

#[test]
fn test_matte_zoomed_paints_blocks() {
    let src = Buffer::from_raw(PixelFormat::Indexed8, 2, 2, vec![0, 4, 6, 0]).unwrap();
    let mut dest = indexed(4, 2, 1);
    let key = PenColor::indexed(Color::BLACK, 0);
    let matte = PenColor::indexed(Color::WHITE, 9);
    let mut dest_rect = at(0, 0);
    blit_matte_zoomed(&src, &mut src.bounds(), &mut dest, &mut dest_rect, &key, &matte, 2, 1);
    assert_eq!(dest_rect, Rectangle::from(0, 0, 4, 2));
    // keyed pixels leave the target untouched
    assert_eq!(dest.row(0), &[1, 1, 9, 9]);
    assert_eq!(dest.row(1), &[9, 9, 1, 1]);
}

// ============================================================================
// Blend
// ============================================================================

#[test]
fn test_blend_onto_rgb() {
    let mut src = Buffer::new(PixelFormat::Rgba8, 3, 1).unwrap();
    src.set_rgba(0, 0, Color::rgba(255, 255, 255, 0));
    src.set_rgba(1, 0, Color::rgba(255, 255, 255, 255));
    src.set_rgba(2, 0, Color::rgba(255, 0, 0, 51));
    let mut dest = Buffer::new(PixelFormat::Rgb8, 3, 1).unwrap();
    dest.fill_rect(dest.bounds(), &PenColor::rgb(Color::new(0, 0, 255)));
    blit_blend(&src, &mut src.bounds(), &mut dest, &mut at(0, 0));
    assert_eq!(dest.rgb_at(0, 0), Color::new(0, 0, 255));
    assert_eq!(dest.rgb_at(1, 0), Color::WHITE);
    assert_eq!(dest.rgb_at(2, 0), Color::new(51, 0, 204));
}

#[test]
fn test_blend_onto_rgba_blends_alpha() {
    let mut src = Buffer::new(PixelFormat::Rgba8, 1, 1).unwrap();
    src.set_rgba(0, 0, Color::rgba(255, 255, 255, 255));
    let mut dest = Buffer::new(PixelFormat::Rgba8, 1, 1).unwrap();
    blit_blend(&src, &mut src.bounds(), &mut dest, &mut at(0, 0));
    assert_eq!(dest.rgba_at(0, 0), Color::rgba(255, 255, 255, 255));
}

#[test]
#[should_panic(expected = "unsupported blend blit")]
fn test_blend_rgb_source_panics() {
    let src = Buffer::new(PixelFormat::Rgb8, 1, 1).unwrap();
    let mut dest = Buffer::new(PixelFormat::Rgb8, 1, 1).unwrap();
    blit_blend(&src, &mut src.bounds(), &mut dest, &mut at(0, 0));
}

// ============================================================================
// Range shift
// ============================================================================

#[test]
fn test_range_shift_moves_along_ramp() {
    let ramp = Ramp::new(vec![10, 11, 12]);
    let mask = Buffer::from_raw(PixelFormat::Indexed8, 5, 1, vec![1, 1, 1, 1, 0]).unwrap();
    let mut dest = Buffer::from_raw(PixelFormat::Indexed8, 5, 1, vec![10, 11, 12, 50, 10]).unwrap();
    let key = PenColor::indexed(Color::BLACK, 0);
    blit_range_shift(&mask, &mut mask.bounds(), &mut dest, &mut at(0, 0), &key, &ramp, ShiftDirection::Up);
    // end of ramp and non-members stay, masked out pixel stays
    assert_eq!(dest.row(0), &[11, 12, 12, 50, 10]);

    blit_range_shift(&mask, &mut mask.bounds(), &mut dest, &mut at(0, 0), &key, &ramp, ShiftDirection::Down);
    assert_eq!(dest.row(0), &[10, 11, 11, 50, 10]);
}

#[test]
fn test_range_shift_zoomed_only_masked_blocks() {
    let ramp = Ramp::new(vec![10, 11, 12]);
    let mask = Buffer::from_raw(PixelFormat::Indexed8, 2, 1, vec![1, 0]).unwrap();
    let mut dest = Buffer::from_raw(PixelFormat::Indexed8, 4, 2, vec![10, 12, 10, 11, 11, 50, 11, 12]).unwrap();
    let key = PenColor::indexed(Color::BLACK, 0);
    blit_range_shift_zoomed(&mask, &mut mask.bounds(), &mut dest, &mut at(0, 0), &key, &ramp, ShiftDirection::Up, 2, 2);
    // ramp end and non members stay, the right block is masked out
    assert_eq!(dest.row(0), &[11, 12, 10, 11]);
    assert_eq!(dest.row(1), &[12, 50, 11, 12]);
}

#[test]
#[should_panic(expected = "unsupported range shift blit")]
fn test_range_shift_needs_indexed_target() {
    let mask = numbered(1, 1);
    let mut dest = Buffer::new(PixelFormat::Rgba8, 1, 1).unwrap();
    let ramp = Ramp::span(0, 3);
    blit_range_shift(&mask, &mut mask.bounds(), &mut dest, &mut at(0, 0), &PenColor::indexed(Color::BLACK, 0), &ramp, ShiftDirection::Up);
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_blit_with_matches_direct_calls() {
    let src = numbered(4, 4);
    let key = PenColor::indexed(Color::BLACK, 5);

    let mut direct = indexed(8, 8, 1);
    blit_keyed_zoomed(&src, &mut src.bounds(), &mut direct, &mut at(1, 1), &key, None, 2, 1);

    let mut dispatched = indexed(8, 8, 1);
    let mode = BlitMode::Keyed { key, palette: None };
    let mut dest_rect = at(1, 1);
    blit_with(&mode, &src, &mut src.bounds(), &mut dispatched, &mut dest_rect, 2, 1);

    assert_eq!(dispatched, direct);
    // the last column sticks out by half a block and keeps its visible half
    assert_eq!(dest_rect, Rectangle::from(1, 1, 7, 4));
}
