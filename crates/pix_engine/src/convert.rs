//! Pixel format conversion.
//!
//! Every converter allocates a new buffer; inputs are never mutated.

use std::collections::HashMap;

use crate::{Buffer, Color, Palette, PixelFormat, Result};

/// Converts `src` into `dest_format`.
///
/// `src_palette` is consulted when the source is indexed, `dest_palette` when the
/// target is indexed. Converting into the same true color format is a plain copy.
///
/// # Errors
///
/// `AllocationFailed` if the target buffer can't be allocated.
pub fn convert(src: &Buffer, src_palette: &Palette, dest_format: PixelFormat, dest_palette: &Palette) -> Result<Buffer> {
    match (src.format(), dest_format) {
        (PixelFormat::Indexed8, PixelFormat::Indexed8) => repalette(src, src_palette, dest_palette),
        (PixelFormat::Indexed8, PixelFormat::Rgb8 | PixelFormat::Rgba8) => indexed_to_truecolor(src, src_palette, dest_format),
        (PixelFormat::Rgb8 | PixelFormat::Rgba8, PixelFormat::Indexed8) => truecolor_to_indexed(src, dest_palette),
        (PixelFormat::Rgb8, PixelFormat::Rgba8) => rgb_to_rgba(src),
        (PixelFormat::Rgba8, PixelFormat::Rgb8) => rgba_to_rgb(src),
        (PixelFormat::Rgb8, PixelFormat::Rgb8) | (PixelFormat::Rgba8, PixelFormat::Rgba8) => Ok(src.clone()),
    }
}

/// Palette lookup per pixel.
///
/// # Panics
///
/// Panics if `src` isn't indexed or `dest_format` is indexed.
///
/// # Errors
///
/// `AllocationFailed` if the target buffer can't be allocated.
pub fn indexed_to_truecolor(src: &Buffer, palette: &Palette, dest_format: PixelFormat) -> Result<Buffer> {
    assert_eq!(src.format(), PixelFormat::Indexed8, "indexed_to_truecolor needs an indexed source");
    assert!(!dest_format.is_indexed(), "indexed_to_truecolor needs a true color target");
    let mut lut = [0u32; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let c = palette.get(i);
        *entry = match dest_format {
            PixelFormat::Rgb8 => c.with_alpha(255).to_u32(),
            _ => c.to_u32(),
        };
    }
    let mut dest = Buffer::new(dest_format, src.width(), src.height())?;
    for y in 0..src.height() {
        let row = dest.row_mut(y);
        for (px, &idx) in row.chunks_exact_mut(4).zip(src.row(y)) {
            px.copy_from_slice(&lut[idx as usize].to_le_bytes());
        }
    }
    Ok(dest)
}

/// Nearest color match against `palette` (squared RGBA distance, first index on ties).
/// RGB sources are matched as opaque colors.
///
/// # Errors
///
/// `AllocationFailed` if the target buffer can't be allocated.
pub fn truecolor_to_indexed(src: &Buffer, palette: &Palette) -> Result<Buffer> {
    assert!(!src.format().is_indexed(), "truecolor_to_indexed needs a true color source");
    let mut dest = Buffer::new(PixelFormat::Indexed8, src.width(), src.height())?;
    let mut matcher = NearestMatcher::new(palette);
    for y in 0..src.height() {
        for x in 0..src.width() {
            let c = Color::from_u32(src.raw_pixel(x, y));
            dest.set_index(x, y, matcher.find(c));
        }
    }
    Ok(dest)
}

/// Re-maps an indexed buffer from one palette onto another.
///
/// # Errors
///
/// `AllocationFailed` if the target buffer can't be allocated.
pub fn repalette(src: &Buffer, src_palette: &Palette, dest_palette: &Palette) -> Result<Buffer> {
    assert_eq!(src.format(), PixelFormat::Indexed8, "repalette needs an indexed source");
    let mut matcher = NearestMatcher::new(dest_palette);
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = matcher.find(src_palette.get(i));
    }
    let mut dest = Buffer::new(PixelFormat::Indexed8, src.width(), src.height())?;
    for y in 0..src.height() {
        for (d, &s) in dest.row_mut(y).iter_mut().zip(src.row(y)) {
            *d = lut[s as usize];
        }
    }
    Ok(dest)
}

/// Lossless; every pixel becomes opaque.
///
/// # Errors
///
/// `AllocationFailed` if the target buffer can't be allocated.
pub fn rgb_to_rgba(src: &Buffer) -> Result<Buffer> {
    assert_eq!(src.format(), PixelFormat::Rgb8, "rgb_to_rgba needs an rgb source");
    // RGB padding is already 255, so the bytes carry over unchanged.
    Buffer::from_raw(PixelFormat::Rgba8, src.width(), src.height(), copy_data(src)?)
}

/// Drops the alpha channel.
///
/// # Errors
///
/// `AllocationFailed` if the target buffer can't be allocated.
pub fn rgba_to_rgb(src: &Buffer) -> Result<Buffer> {
    assert_eq!(src.format(), PixelFormat::Rgba8, "rgba_to_rgb needs an rgba source");
    Buffer::from_raw(PixelFormat::Rgb8, src.width(), src.height(), copy_data(src)?)
}

fn copy_data(src: &Buffer) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(src.data().len()).map_err(|_| crate::EngineError::AllocationFailed {
        width: src.width(),
        height: src.height(),
        format: src.format(),
        bytes: src.data().len(),
    })?;
    data.extend_from_slice(src.data());
    Ok(data)
}

/// Caches nearest palette lookups; images tend to reuse few colors.
struct NearestMatcher<'a> {
    palette: &'a Palette,
    cache: HashMap<u32, u8>,
}

impl<'a> NearestMatcher<'a> {
    fn new(palette: &'a Palette) -> Self {
        Self {
            palette,
            cache: HashMap::new(),
        }
    }

    fn find(&mut self, color: Color) -> u8 {
        let palette = self.palette;
        *self.cache.entry(color.to_u32()).or_insert_with(|| palette.nearest_index(color))
    }
}
