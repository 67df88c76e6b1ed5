//! Clipped compositing between buffers.
//!
//! Every function takes the source and destination rectangles by mutable
//! reference and leaves the post clip geometry in them. The destination
//! rectangle's size is derived from the source rectangle and the zoom factors
//! and then cut exactly to the target, so callers only need to set its position.
//!
//! Valid format combinations are fixed. Anything else panics: convert the
//! buffer with [`crate::convert`] first.

use crate::{Buffer, Palette, PenColor, PixelFormat, Position, Ramp, Rectangle, ShiftDirection, Size};

/// Compositing mode for [`blit_with`].
#[derive(Debug, Clone, Copy)]
pub enum BlitMode<'a> {
    /// Raw copy, formats must match.
    Copy,
    /// Copy everything except pixels matching `key`. `palette` is needed when an
    /// indexed source is drawn onto a true color target.
    Keyed { key: PenColor, palette: Option<&'a Palette> },
    /// Paint `matte` wherever the source doesn't match `key`.
    Matte { key: PenColor, matte: PenColor },
    /// RGBA source blended over an RGB or RGBA target by source alpha.
    Blend,
    /// Move indexed destination pixels along `ramp` wherever the source is opaque.
    RangeShift {
        key: PenColor,
        ramp: &'a Ramp,
        direction: ShiftDirection,
    },
}

/// Clips a blit against both buffers.
///
/// The destination size is set to the source size scaled by the zoom factors.
/// The source is clipped against `src_bounds` first, then the destination is
/// cut exactly to `dest_bounds`. The cut is projected back onto the source with
/// floor division, so a partly visible zoom block keeps its source pixel. The
/// returned phase is how many destination pixels of the first source block
/// were cut on each axis; it is always 0 at zoom 1. If nothing remains both
/// rectangles end up empty.
///
/// # Panics
///
/// Panics if a zoom factor is below 1.
pub fn clip_blit(src_bounds: &Rectangle, src_rect: &mut Rectangle, dest_bounds: &Rectangle, dest_rect: &mut Rectangle, zoom_x: i32, zoom_y: i32) -> Position {
    assert!(zoom_x >= 1 && zoom_y >= 1, "blit zoom must be at least 1, got {zoom_x}x{zoom_y}");

    let clipped = src_rect.clip(src_bounds);
    if clipped.is_empty() {
        make_empty(src_rect, dest_rect);
        return Position::default();
    }
    dest_rect.start.x += (clipped.left() - src_rect.left()) * zoom_x;
    dest_rect.start.y += (clipped.top() - src_rect.top()) * zoom_y;
    *src_rect = clipped;

    let horizontal = clip_axis(dest_rect.left(), src_rect.width(), zoom_x, dest_bounds.left(), dest_bounds.right());
    let vertical = clip_axis(dest_rect.top(), src_rect.height(), zoom_y, dest_bounds.top(), dest_bounds.bottom());
    let (Some(h), Some(v)) = (horizontal, vertical) else {
        make_empty(src_rect, dest_rect);
        return Position::default();
    };

    src_rect.start.x += h.skip;
    src_rect.start.y += v.skip;
    src_rect.size = Size::new(h.keep, v.keep);
    dest_rect.start.x += h.cut;
    dest_rect.start.y += v.cut;
    dest_rect.size = Size::new(h.dest_len, v.dest_len);
    Position::new(h.cut % zoom_x, v.cut % zoom_y)
}

struct AxisClip {
    /// Destination pixels cut at the start.
    cut: i32,
    dest_len: i32,
    /// Source pixels skipped at the start.
    skip: i32,
    keep: i32,
}

fn clip_axis(dest_start: i32, src_len: i32, zoom: i32, lo: i32, hi: i32) -> Option<AxisClip> {
    let dest_end = dest_start + src_len * zoom;
    let first = dest_start.max(lo);
    let last = dest_end.min(hi);
    if last <= first {
        return None;
    }
    let cut = first - dest_start;
    let skip = cut / zoom;
    let keep = ceil_div(last - dest_start, zoom) - skip;
    Some(AxisClip {
        cut,
        dest_len: last - first,
        skip,
        keep,
    })
}

fn ceil_div(a: i32, b: i32) -> i32 {
    (a + b - 1) / b
}

fn make_empty(src_rect: &mut Rectangle, dest_rect: &mut Rectangle) {
    src_rect.size = Size::new(0, 0);
    dest_rect.size = Size::new(0, 0);
}

#[track_caller]
fn unsupported(mode: &str, src: PixelFormat, dest: PixelFormat) -> ! {
    panic!("unsupported {mode} blit from {src} to {dest}")
}

/// Runs `op` for every destination pixel of the clipped blit, handing it the
/// corresponding source pixel. Source pixels are replicated into zoom blocks,
/// the first block on each axis shortened by the clip phase.
fn for_each_pixel<F>(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle, zoom_x: i32, zoom_y: i32, mut op: F)
where
    F: FnMut(&[u8], &mut [u8]),
{
    let phase = clip_blit(&src.bounds(), src_rect, &dest.bounds(), dest_rect, zoom_x, zoom_y);
    if dest_rect.is_empty() {
        return;
    }
    let sbpp = src.format().bytes_per_pixel();
    let dbpp = dest.format().bytes_per_pixel();
    for dy in 0..dest_rect.height() {
        let src_row = src.row(src_rect.top() + (dy + phase.y) / zoom_y);
        let dest_row = dest.row_mut(dest_rect.top() + dy);
        for dx in 0..dest_rect.width() {
            let s = (src_rect.left() + (dx + phase.x) / zoom_x) as usize * sbpp;
            let d = (dest_rect.left() + dx) as usize * dbpp;
            op(&src_row[s..s + sbpp], &mut dest_row[d..d + dbpp]);
        }
    }
}

/// How a source pixel is recognised as transparent.
#[derive(Clone, Copy)]
enum KeyTest {
    Index(u8),
    Rgb([u8; 3]),
    Alpha,
}

impl KeyTest {
    fn new(format: PixelFormat, key: &PenColor) -> Self {
        match format {
            PixelFormat::Indexed8 => KeyTest::Index(key.index()),
            PixelFormat::Rgb8 => KeyTest::Rgb([key.color.r, key.color.g, key.color.b]),
            PixelFormat::Rgba8 => KeyTest::Alpha,
        }
    }

    #[inline]
    fn is_transparent(self, px: &[u8]) -> bool {
        match self {
            KeyTest::Index(idx) => px[0] == idx,
            KeyTest::Rgb(rgb) => px[..3] == rgb,
            KeyTest::Alpha => px[3] == 0,
        }
    }
}

fn palette_lut(palette: Option<&Palette>, dest_format: PixelFormat) -> [[u8; 4]; 256] {
    let Some(palette) = palette else {
        panic!("blitting an indexed source onto a {dest_format} target needs a palette");
    };
    let mut lut = [[0u8; 4]; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let c = palette.get(i);
        *entry = [c.r, c.g, c.b, if dest_format == PixelFormat::Rgb8 { 255 } else { c.a }];
    }
    lut
}

// ═══════════════════════════════════════════════════════════════════════════
// Copy & swap
// ═══════════════════════════════════════════════════════════════════════════

/// Raw copy between buffers of the same format.
pub fn blit(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle) {
    blit_zoomed(src, src_rect, dest, dest_rect, 1, 1);
}

/// Raw copy with every source pixel replicated into a `zoom_x` × `zoom_y` block.
pub fn blit_zoomed(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle, zoom_x: i32, zoom_y: i32) {
    if src.format() != dest.format() {
        unsupported("copy", src.format(), dest.format());
    }
    if zoom_x == 1 && zoom_y == 1 {
        clip_blit(&src.bounds(), src_rect, &dest.bounds(), dest_rect, 1, 1);
        if dest_rect.is_empty() {
            return;
        }
        let bpp = src.format().bytes_per_pixel();
        let len = src_rect.width() as usize * bpp;
        for y in 0..src_rect.height() {
            let s = src_rect.left() as usize * bpp;
            let d = dest_rect.left() as usize * bpp;
            dest.row_mut(dest_rect.top() + y)[d..d + len].copy_from_slice(&src.row(src_rect.top() + y)[s..s + len]);
        }
        return;
    }
    for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| d.copy_from_slice(s));
}

/// Exchanges the pixels of both regions. Running it twice restores both buffers.
pub fn blit_swap(a: &mut Buffer, a_rect: &mut Rectangle, b: &mut Buffer, b_rect: &mut Rectangle) {
    if a.format() != b.format() {
        unsupported("swap", a.format(), b.format());
    }
    clip_blit(&a.bounds(), a_rect, &b.bounds(), b_rect, 1, 1);
    if a_rect.is_empty() {
        return;
    }
    let bpp = a.format().bytes_per_pixel();
    let len = a_rect.width() as usize * bpp;
    for y in 0..a_rect.height() {
        let sa = a_rect.left() as usize * bpp;
        let sb = b_rect.left() as usize * bpp;
        let row_a = &mut a.row_mut(a_rect.top() + y)[sa..sa + len];
        let row_b = &mut b.row_mut(b_rect.top() + y)[sb..sb + len];
        row_a.swap_with_slice(row_b);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Color keyed & matte
// ═══════════════════════════════════════════════════════════════════════════

/// Copies every source pixel that doesn't match the transparent `key`.
///
/// Indexed sources compare the key's palette index, RGB sources its color and
/// RGBA sources treat alpha 0 as transparent. Supported combinations: same
/// format, RGBA onto RGB, RGB onto RGBA and indexed onto true color (needs `palette`).
pub fn blit_keyed(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle, key: &PenColor, palette: Option<&Palette>) {
    blit_keyed_zoomed(src, src_rect, dest, dest_rect, key, palette, 1, 1);
}

#[allow(clippy::too_many_arguments)]
pub fn blit_keyed_zoomed(
    src: &Buffer,
    src_rect: &mut Rectangle,
    dest: &mut Buffer,
    dest_rect: &mut Rectangle,
    key: &PenColor,
    palette: Option<&Palette>,
    zoom_x: i32,
    zoom_y: i32,
) {
    let test = KeyTest::new(src.format(), key);
    match (src.format(), dest.format()) {
        (PixelFormat::Indexed8, PixelFormat::Indexed8)
        | (PixelFormat::Rgb8, PixelFormat::Rgb8)
        | (PixelFormat::Rgba8, PixelFormat::Rgba8)
        | (PixelFormat::Rgb8, PixelFormat::Rgba8) => {
            for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
                if !test.is_transparent(s) {
                    d.copy_from_slice(s);
                }
            });
        }
        (PixelFormat::Rgba8, PixelFormat::Rgb8) => {
            for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
                if !test.is_transparent(s) {
                    d.copy_from_slice(&[s[0], s[1], s[2], 255]);
                }
            });
        }
        (PixelFormat::Indexed8, PixelFormat::Rgb8 | PixelFormat::Rgba8) => {
            let lut = palette_lut(palette, dest.format());
            for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
                if !test.is_transparent(s) {
                    d.copy_from_slice(&lut[s[0] as usize]);
                }
            });
        }
        (src_format, dest_format) => unsupported("keyed", src_format, dest_format),
    }
}

/// Paints `matte` on every destination pixel whose source pixel isn't
/// transparent. Works for any pair of formats; `matte` must carry a palette
/// index when the target is indexed.
pub fn blit_matte(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle, key: &PenColor, matte: &PenColor) {
    blit_matte_zoomed(src, src_rect, dest, dest_rect, key, matte, 1, 1);
}

#[allow(clippy::too_many_arguments)]
pub fn blit_matte_zoomed(
    src: &Buffer,
    src_rect: &mut Rectangle,
    dest: &mut Buffer,
    dest_rect: &mut Rectangle,
    key: &PenColor,
    matte: &PenColor,
    zoom_x: i32,
    zoom_y: i32,
) {
    let test = KeyTest::new(src.format(), key);
    let dest_format = dest.format();
    let value = matte.encode(dest_format).to_le_bytes();
    let bpp = dest_format.bytes_per_pixel();
    for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
        if !test.is_transparent(s) {
            d.copy_from_slice(&value[..bpp]);
        }
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// Alpha blend
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn lerp(dest: u8, src: u8, alpha: u32) -> u8 {
    (dest as u32 * (255 - alpha) / 255 + src as u32 * alpha / 255) as u8
}

/// Blends an RGBA source over an RGB or RGBA destination:
/// `out = dest * (255 - a) / 255 + src * a / 255` per channel. RGBA targets
/// blend their alpha channel the same way.
pub fn blit_blend(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle) {
    blit_blend_zoomed(src, src_rect, dest, dest_rect, 1, 1);
}

pub fn blit_blend_zoomed(src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle, zoom_x: i32, zoom_y: i32) {
    match (src.format(), dest.format()) {
        (PixelFormat::Rgba8, PixelFormat::Rgb8) => {
            for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
                let a = s[3] as u32;
                d[0] = lerp(d[0], s[0], a);
                d[1] = lerp(d[1], s[1], a);
                d[2] = lerp(d[2], s[2], a);
            });
        }
        (PixelFormat::Rgba8, PixelFormat::Rgba8) => {
            for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
                let a = s[3] as u32;
                for c in 0..4 {
                    d[c] = lerp(d[c], s[c], a);
                }
            });
        }
        (src_format, dest_format) => unsupported("blend", src_format, dest_format),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Range shift
// ═══════════════════════════════════════════════════════════════════════════

/// Uses the source purely as a mask and moves every masked destination index
/// one step along `ramp`. Pixels outside the ramp or at its end stay unchanged.
#[allow(clippy::too_many_arguments)]
pub fn blit_range_shift(
    src: &Buffer,
    src_rect: &mut Rectangle,
    dest: &mut Buffer,
    dest_rect: &mut Rectangle,
    key: &PenColor,
    ramp: &Ramp,
    direction: ShiftDirection,
) {
    blit_range_shift_zoomed(src, src_rect, dest, dest_rect, key, ramp, direction, 1, 1);
}

#[allow(clippy::too_many_arguments)]
pub fn blit_range_shift_zoomed(
    src: &Buffer,
    src_rect: &mut Rectangle,
    dest: &mut Buffer,
    dest_rect: &mut Rectangle,
    key: &PenColor,
    ramp: &Ramp,
    direction: ShiftDirection,
    zoom_x: i32,
    zoom_y: i32,
) {
    if dest.format() != PixelFormat::Indexed8 {
        unsupported("range shift", src.format(), dest.format());
    }
    let test = KeyTest::new(src.format(), key);
    let table = ramp.lookup_table(direction);
    for_each_pixel(src, src_rect, dest, dest_rect, zoom_x, zoom_y, |s, d| {
        if !test.is_transparent(s) {
            d[0] = table[d[0] as usize];
        }
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════

/// Runs the blit selected by `mode`.
///
/// # Panics
///
/// Panics for format combinations the selected mode doesn't support.
pub fn blit_with(mode: &BlitMode<'_>, src: &Buffer, src_rect: &mut Rectangle, dest: &mut Buffer, dest_rect: &mut Rectangle, zoom_x: i32, zoom_y: i32) {
    match mode {
        BlitMode::Copy => blit_zoomed(src, src_rect, dest, dest_rect, zoom_x, zoom_y),
        BlitMode::Keyed { key, palette } => blit_keyed_zoomed(src, src_rect, dest, dest_rect, key, *palette, zoom_x, zoom_y),
        BlitMode::Matte { key, matte } => blit_matte_zoomed(src, src_rect, dest, dest_rect, key, matte, zoom_x, zoom_y),
        BlitMode::Blend => blit_blend_zoomed(src, src_rect, dest, dest_rect, zoom_x, zoom_y),
        BlitMode::RangeShift { key, ramp, direction } => blit_range_shift_zoomed(src, src_rect, dest, dest_rect, key, ramp, *direction, zoom_x, zoom_y),
    }
}
