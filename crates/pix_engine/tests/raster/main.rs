//! Flood fill, curve drawing, quantisation and format conversion on whole buffers.

use pix_engine::{
    Buffer, Color, Palette, PenColor, PixelFormat, Position, Rectangle,
    convert::convert,
    draw::{draw_ellipse, draw_filled_ellipse, draw_line},
    flood_fill,
    quantize::{calculate_palette, quantize_to_indexed},
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pen(index: u8) -> PenColor {
    PenColor::indexed(Color::WHITE, index)
}

// ============================================================================
// Flood fill
// ============================================================================

#[test]
fn test_fill_4x4_scenario() {
    init_logging();
    let mut buf = Buffer::new(PixelFormat::Indexed8, 4, 4).unwrap();
    let damage = flood_fill(&mut buf, Position::new(0, 0), &pen(2));
    assert_eq!(damage, Rectangle::from(0, 0, 4, 4));
    assert!(buf.data().iter().all(|&p| p == 2));
}

#[test]
fn test_fill_twice_reports_nothing() {
    let mut buf = Buffer::new(PixelFormat::Rgba8, 6, 5).unwrap();
    let red = PenColor::rgb(Color::new(255, 0, 0));
    assert!(!flood_fill(&mut buf, Position::new(3, 3), &red).is_empty());
    let snapshot = buf.clone();
    assert!(flood_fill(&mut buf, Position::new(3, 3), &red).is_empty());
    assert_eq!(buf, snapshot);
}

#[test]
fn test_fill_is_four_connected() {
    // diagonal wall of 1s: the fill must not leak through the corners
    #[rustfmt::skip]
    let data = vec![
        0, 0, 0, 1,
        0, 0, 1, 0,
        0, 1, 0, 0,
        1, 0, 0, 0,
    ];
    let mut buf = Buffer::from_raw(PixelFormat::Indexed8, 4, 4, data).unwrap();
    let damage = flood_fill(&mut buf, Position::new(0, 0), &pen(7));
    assert_eq!(damage, Rectangle::from(0, 0, 3, 3));
    assert_eq!(buf.row(0), &[7, 7, 7, 1]);
    assert_eq!(buf.row(2), &[7, 1, 0, 0]);
    assert_eq!(buf.row(3), &[1, 0, 0, 0]);
}

#[test]
fn test_fill_u_shape_reaches_both_arms() {
    init_logging();
    #[rustfmt::skip]
    let data = vec![
        0, 1, 0,
        0, 1, 0,
        0, 0, 0,
    ];
    let mut buf = Buffer::from_raw(PixelFormat::Indexed8, 3, 3, data).unwrap();
    flood_fill(&mut buf, Position::new(0, 0), &pen(4));
    assert_eq!(buf.data(), &[4, 1, 4, 4, 1, 4, 4, 4, 4]);
}

#[test]
fn test_fill_rgb_ignores_padding() {
    let mut buf = Buffer::new(PixelFormat::Rgb8, 3, 3).unwrap();
    buf.set_rgb(1, 1, Color::WHITE);
    let damage = flood_fill(&mut buf, Position::new(1, 1), &PenColor::rgb(Color::rgba(0, 255, 0, 0)));
    assert_eq!(damage, Rectangle::from(1, 1, 1, 1));
    assert_eq!(buf.rgb_at(1, 1), Color::new(0, 255, 0));
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_draw_line_clipped_damage() {
    let mut buf = Buffer::new(PixelFormat::Indexed8, 5, 5).unwrap();
    let damage = draw_line(&mut buf, Position::new(-2, 2), Position::new(10, 2), &pen(1));
    assert_eq!(damage, Rectangle::from(0, 2, 5, 1));
    assert_eq!(buf.row(2), &[1, 1, 1, 1, 1]);
}

#[test]
fn test_draw_ellipse_outline_only() {
    let mut buf = Buffer::new(PixelFormat::Indexed8, 11, 11).unwrap();
    let damage = draw_ellipse(&mut buf, Position::new(5, 5), 4, 3, &pen(1));
    assert_eq!(damage, Rectangle::from(1, 2, 9, 7));
    assert_eq!(buf.index_at(5, 5), 0);
    assert_eq!(buf.index_at(1, 5), 1);
    assert_eq!(buf.index_at(5, 2), 1);
}

#[test]
fn test_draw_filled_ellipse_covers_outline() {
    let mut outline = Buffer::new(PixelFormat::Indexed8, 11, 11).unwrap();
    draw_ellipse(&mut outline, Position::new(5, 5), 4, 3, &pen(1));
    let mut filled = Buffer::new(PixelFormat::Indexed8, 11, 11).unwrap();
    let damage = draw_filled_ellipse(&mut filled, Position::new(5, 5), 4, 3, &pen(1));
    assert_eq!(damage, Rectangle::from(1, 2, 9, 7));
    assert_eq!(filled.index_at(5, 5), 1);
    for y in 0..11 {
        for x in 0..11 {
            if outline.index_at(x, y) == 1 {
                assert_eq!(filled.index_at(x, y), 1, "outline pixel ({x}, {y}) not filled");
            }
        }
    }
}

// ============================================================================
// Quantiser & conversion
// ============================================================================

fn gradient() -> Buffer {
    let mut buf = Buffer::new(PixelFormat::Rgba8, 32, 8).unwrap();
    for y in 0..8 {
        for x in 0..32 {
            buf.set_rgba(x, y, Color::rgba((x * 8) as u8, (y * 32) as u8, 128, 255));
        }
    }
    buf
}

#[test]
fn test_palette_budget() {
    init_logging();
    let buf = gradient();
    for n in [1, 3, 16, 255] {
        let pal = calculate_palette(&buf, n);
        assert!(pal.len() <= n);
    }
    assert_eq!(calculate_palette(&buf, 256).len(), 256);
    assert_eq!(calculate_palette(&buf, 1000).len(), 256);
}

#[test]
fn test_palette_is_deterministic() {
    let buf = gradient();
    assert_eq!(calculate_palette(&buf, 13), calculate_palette(&buf, 13));
}

#[test]
fn test_quantize_then_expand() {
    init_logging();
    let (indexed, palette) = quantize_to_indexed(&gradient(), 64).unwrap();
    assert_eq!(palette.len(), 64);
    let back = convert(&indexed, &palette, PixelFormat::Rgba8, &palette).unwrap();
    let src = gradient();
    let mut max_err = 0;
    for y in 0..8 {
        for x in 0..32 {
            max_err = max_err.max(src.rgba_at(x, y).distance_sq(&back.rgba_at(x, y)));
        }
    }
    assert!(max_err < 64 * 64, "quantisation error {max_err} too large");
}

#[test]
fn test_indexed_rgba_round_trip() {
    let palette = Palette::from_colors((0..16).map(|i| Color::new(i * 16, 255 - i * 16, i)).collect()).unwrap();
    let data = (0..64).map(|i| (i % 16) as u8).collect();
    let src = Buffer::from_raw(PixelFormat::Indexed8, 8, 8, data).unwrap();
    let rgba = convert(&src, &palette, PixelFormat::Rgba8, &palette).unwrap();
    let back = convert(&rgba, &palette, PixelFormat::Indexed8, &palette).unwrap();
    assert_eq!(back, src);
}
