use pix_engine::{Rectangle, blit::clip_blit};
use pretty_assertions::assert_eq;

#[test]
fn test_clip_scenario_negative_offset() {
    let mut src = Rectangle::from(0, 0, 10, 10);
    let mut dest = Rectangle::from(-5, -5, 10, 10);
    clip_blit(&Rectangle::from(0, 0, 10, 10), &mut src, &Rectangle::from(0, 0, 20, 20), &mut dest, 1, 1);
    assert_eq!(dest, Rectangle::from(0, 0, 5, 5));
    assert_eq!(src, Rectangle::from(5, 5, 5, 5));
}

#[test]
fn test_clip_right_bottom_edges() {
    let mut src = Rectangle::from(0, 0, 8, 8);
    let mut dest = Rectangle::from(16, 18, 0, 0);
    clip_blit(&Rectangle::from(0, 0, 8, 8), &mut src, &Rectangle::from(0, 0, 20, 20), &mut dest, 1, 1);
    assert_eq!(dest, Rectangle::from(16, 18, 4, 2));
    assert_eq!(src, Rectangle::from(0, 0, 4, 2));
}

#[test]
fn test_clip_source_outside_own_bounds() {
    let mut src = Rectangle::from(-2, 6, 6, 6);
    let mut dest = Rectangle::from(10, 10, 0, 0);
    clip_blit(&Rectangle::from(0, 0, 8, 8), &mut src, &Rectangle::from(0, 0, 50, 50), &mut dest, 1, 1);
    assert_eq!(src, Rectangle::from(0, 6, 4, 2));
    assert_eq!(dest, Rectangle::from(12, 10, 4, 2));
}

/// For every combination the clipped destination must be exactly the visible part
/// of the zoomed source, the source must stay inside its bounds, and both must
/// still correspond pixel for pixel.
#[test]
fn test_clip_always_contained() {
    let src_bounds = Rectangle::from(0, 0, 7, 5);
    let dest_bounds = Rectangle::from(0, 0, 13, 11);
    for zoom_x in 1..=3 {
        for zoom_y in 1..=3 {
            for sx in -3..6 {
                for sy in -3..5 {
                    for dx in -20..16 {
                        for dy in (-14..14).step_by(3) {
                            let orig_src = Rectangle::from(sx, sy, 5, 4);
                            let mut src = orig_src;
                            let mut dest = Rectangle::from(dx, dy, 0, 0);
                            let phase = clip_blit(&src_bounds, &mut src, &dest_bounds, &mut dest, zoom_x, zoom_y);
                            if dest.is_empty() {
                                assert!(src.is_empty());
                                continue;
                            }
                            assert!(dest_bounds.contains_rect(&dest), "{dest:?} escapes the target");
                            assert!(src_bounds.contains_rect(&src), "{src:?} escapes the source");

                            let visible = orig_src.clip(&src_bounds);
                            let zoomed = Rectangle::from(
                                dx + (visible.left() - sx) * zoom_x,
                                dy + (visible.top() - sy) * zoom_y,
                                visible.width() * zoom_x,
                                visible.height() * zoom_y,
                            );
                            assert_eq!(dest, zoomed.clip(&dest_bounds));

                            assert!(phase.x < zoom_x && phase.y < zoom_y);
                            // the source pixel at dest's corner is the one the unclipped mapping would pick
                            assert_eq!(dest.left() - dx, (src.left() - sx) * zoom_x + phase.x);
                            assert_eq!(dest.top() - dy, (src.top() - sy) * zoom_y + phase.y);
                            // and the far corner lands on the last kept source pixel
                            assert_eq!((dest.width() - 1 + phase.x) / zoom_x, src.width() - 1);
                            assert_eq!((dest.height() - 1 + phase.y) / zoom_y, src.height() - 1);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_clip_empty_source() {
    let mut src = Rectangle::from(2, 2, 0, 3);
    let mut dest = Rectangle::from(0, 0, 0, 0);
    clip_blit(&Rectangle::from(0, 0, 8, 8), &mut src, &Rectangle::from(0, 0, 8, 8), &mut dest, 2, 2);
    assert!(src.is_empty());
    assert!(dest.is_empty());
}
