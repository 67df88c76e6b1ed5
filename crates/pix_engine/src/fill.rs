use crate::{Buffer, PenColor, Position, Rectangle};

/// Span based 4-connected flood fill.
///
/// Replaces the contiguous region of pixels equal to the seed pixel with `pen`
/// and returns the bounding box of every filled span. Pixels compare by raw
/// value, so the same code serves all three formats.
///
/// Nothing is touched and an empty rectangle is returned if the seed lies
/// outside the buffer or already has the fill value.
///
/// # Panics
///
/// Panics on indexed buffers if `pen` has no palette index.
pub fn flood_fill(buf: &mut Buffer, seed: Position, pen: &PenColor) -> Rectangle {
    if !buf.is_inside(seed.x, seed.y) {
        return Rectangle::empty();
    }
    let new_value = pen.encode(buf.format());
    let old_value = buf.raw_pixel(seed.x, seed.y);
    if old_value == new_value {
        return Rectangle::empty();
    }

    let width = buf.width();
    let height = buf.height();
    let mut damage = Rectangle::empty();
    let mut work = vec![seed];

    while let Some(Position { x, y }) = work.pop() {
        if buf.raw_pixel(x, y) != old_value {
            continue;
        }
        let mut left = x;
        while left > 0 && buf.raw_pixel(left - 1, y) == old_value {
            left -= 1;
        }
        let mut right = x + 1;
        while right < width && buf.raw_pixel(right, y) == old_value {
            right += 1;
        }
        buf.fill_span(left, right, y, new_value);
        damage = damage.merge(&Rectangle::from(left, y, right - left, 1));

        for ny in [y - 1, y + 1] {
            if ny < 0 || ny >= height {
                continue;
            }
            // one seed per run of matching pixels
            let mut in_run = false;
            for nx in left..right {
                let matches = buf.raw_pixel(nx, ny) == old_value;
                if matches && !in_run {
                    work.push(Position::new(nx, ny));
                }
                in_run = matches;
            }
        }
    }

    log::trace!("flood fill at {seed:?} damaged {damage:?}");
    damage
}
