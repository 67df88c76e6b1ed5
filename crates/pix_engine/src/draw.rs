//! Curve rasterisation
//!
//! The `walk_*` functions only generate coordinates and hand them to a callback,
//! so tools can either plot directly or drive a blit per point/span. The
//! `draw_*` helpers plot a pen onto a buffer and return the damage rectangle.
//! All arithmetic is integer.

use crate::{Buffer, PenColor, Position, Rectangle};

/// Bresenham line from `p0` to `p1`, both endpoints included.
pub fn walk_line<F: FnMut(Position)>(p0: Position, p1: Position, mut plot: F) {
    let dx = (p1.x - p0.x).abs();
    let dy = -(p1.y - p0.y).abs();
    let sx = if p0.x < p1.x { 1 } else { -1 };
    let sy = if p0.y < p1.y { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = p0.x;
    let mut y = p0.y;
    loop {
        plot(Position::new(x, y));
        if x == p1.x && y == p1.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Points of the upper right quadrant (x >= 0, y >= 0) of an axis aligned
/// ellipse, sorted and without duplicates.
///
/// Two passes with integer decision variables: the first walks from (rx, 0)
/// while the tangent slope is above -1, the second from (0, ry) for the rest.
/// `stop_s`/`stop_t` track where the passes hand over.
fn quadrant_points(rx: i32, ry: i32) -> Vec<(i32, i32)> {
    let rx = i64::from(rx);
    let ry = i64::from(ry);
    let two_a2 = 2 * rx * rx;
    let two_b2 = 2 * ry * ry;
    let mut points = Vec::new();

    let (mut x, mut y) = (rx, 0);
    let mut x_change = ry * ry * (1 - 2 * rx);
    let mut y_change = rx * rx;
    let mut error = 0;
    let mut stop_s = two_b2 * rx;
    let mut stop_t = 0;
    while stop_s >= stop_t {
        points.push((x as i32, y as i32));
        y += 1;
        stop_t += two_a2;
        error += y_change;
        y_change += two_a2;
        if 2 * error + x_change > 0 {
            x -= 1;
            stop_s -= two_b2;
            error += x_change;
            x_change += two_b2;
        }
    }

    let (mut x, mut y) = (0, ry);
    let mut x_change = ry * ry;
    let mut y_change = rx * rx * (1 - 2 * ry);
    let mut error = 0;
    let mut stop_s = 0;
    let mut stop_t = two_a2 * ry;
    while stop_s <= stop_t {
        points.push((x as i32, y as i32));
        x += 1;
        stop_s += two_b2;
        error += x_change;
        x_change += two_b2;
        if 2 * error + y_change > 0 {
            y -= 1;
            stop_t -= two_a2;
            error += y_change;
            y_change += two_a2;
        }
    }

    points.sort_unstable();
    points.dedup();
    points
}

/// Outline of the ellipse around `center` with radii `rx`, `ry`.
///
/// Every pixel is reported once. A zero radius degenerates into a straight line
/// along the other axis; negative radii are treated as their absolute value.
pub fn walk_ellipse<F: FnMut(Position)>(center: Position, rx: i32, ry: i32, mut plot: F) {
    let (rx, ry) = (rx.abs(), ry.abs());
    if rx == 0 || ry == 0 {
        walk_line(center - Position::new(rx, ry), center + Position::new(rx, ry), plot);
        return;
    }
    for (x, y) in quadrant_points(rx, ry) {
        plot(Position::new(center.x + x, center.y + y));
        if x != 0 {
            plot(Position::new(center.x - x, center.y + y));
        }
        if y != 0 {
            plot(Position::new(center.x + x, center.y - y));
            if x != 0 {
                plot(Position::new(center.x - x, center.y - y));
            }
        }
    }
}

/// Filled ellipse as horizontal spans, one callback `(y, x0, x1)` per row with
/// `x0..=x1` inclusive. Rows are reported top to bottom.
pub fn walk_filled_ellipse<F: FnMut(i32, i32, i32)>(center: Position, rx: i32, ry: i32, mut span: F) {
    let (rx, ry) = (rx.abs(), ry.abs());
    if ry == 0 {
        span(center.y, center.x - rx, center.x + rx);
        return;
    }
    if rx == 0 {
        for y in center.y - ry..=center.y + ry {
            span(y, center.x, center.x);
        }
        return;
    }
    let mut extent = vec![0; ry as usize + 1];
    for (x, y) in quadrant_points(rx, ry) {
        let e = &mut extent[y as usize];
        *e = (*e).max(x);
    }
    // the two passes may leave a row uncovered near the hand over
    for y in (0..ry as usize).rev() {
        extent[y] = extent[y].max(extent[y + 1]);
    }
    for dy in -ry..=ry {
        let w = extent[dy.unsigned_abs() as usize];
        span(center.y + dy, center.x - w, center.x + w);
    }
}

/// One pixel wide outline of `rect`, each pixel once.
pub fn walk_rect<F: FnMut(Position)>(rect: Rectangle, mut plot: F) {
    if rect.is_empty() {
        return;
    }
    let (l, t) = (rect.left(), rect.top());
    let (r, b) = (rect.right() - 1, rect.bottom() - 1);
    for x in l..=r {
        plot(Position::new(x, t));
    }
    if b > t {
        for x in l..=r {
            plot(Position::new(x, b));
        }
    }
    for y in t + 1..b {
        plot(Position::new(l, y));
        if r > l {
            plot(Position::new(r, y));
        }
    }
}

struct Plotter<'a> {
    buf: &'a mut Buffer,
    value: u32,
    damage: Rectangle,
}

impl<'a> Plotter<'a> {
    fn new(buf: &'a mut Buffer, pen: &PenColor) -> Self {
        let value = pen.encode(buf.format());
        Self {
            buf,
            value,
            damage: Rectangle::empty(),
        }
    }

    fn plot(&mut self, pos: Position) {
        if self.buf.is_inside(pos.x, pos.y) {
            self.buf.set_raw_pixel(pos.x, pos.y, self.value);
            self.damage = self.damage.merge(&Rectangle::from(pos.x, pos.y, 1, 1));
        }
    }

    fn span(&mut self, y: i32, x0: i32, x1: i32) {
        if y < 0 || y >= self.buf.height() {
            return;
        }
        let x0 = x0.max(0);
        let x1 = (x1 + 1).min(self.buf.width());
        if x1 > x0 {
            self.buf.fill_span(x0, x1, y, self.value);
            self.damage = self.damage.merge(&Rectangle::from(x0, y, x1 - x0, 1));
        }
    }
}

/// Plots a line with `pen`, clipped to the buffer.
pub fn draw_line(buf: &mut Buffer, p0: Position, p1: Position, pen: &PenColor) -> Rectangle {
    let mut plotter = Plotter::new(buf, pen);
    walk_line(p0, p1, |p| plotter.plot(p));
    plotter.damage
}

/// Plots an ellipse outline with `pen`, clipped to the buffer.
pub fn draw_ellipse(buf: &mut Buffer, center: Position, rx: i32, ry: i32, pen: &PenColor) -> Rectangle {
    let mut plotter = Plotter::new(buf, pen);
    walk_ellipse(center, rx, ry, |p| plotter.plot(p));
    plotter.damage
}

pub fn draw_filled_ellipse(buf: &mut Buffer, center: Position, rx: i32, ry: i32, pen: &PenColor) -> Rectangle {
    let mut plotter = Plotter::new(buf, pen);
    walk_filled_ellipse(center, rx, ry, |y, x0, x1| plotter.span(y, x0, x1));
    plotter.damage
}

/// Ellipse fitted into the bounding box spanned by two inclusive corners.
pub fn ellipse_from_corners(p0: Position, p1: Position) -> (Position, i32, i32) {
    let min = p0.min(p1);
    let max = p0.max(p1);
    let center = Position::new((min.x + max.x) / 2, (min.y + max.y) / 2);
    (center, (max.x - min.x) / 2, (max.y - min.y) / 2)
}
