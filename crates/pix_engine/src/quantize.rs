//! Median cut palette generation.
//!
//! Based on Heckbert's "Color Image Quantization for Frame Buffer Display".
//! Buckets are split by their number of distinct colors, not by pixel weight,
//! and every step is deterministic: the same image always yields the same palette.

use std::collections::HashMap;

use crate::{Buffer, Color, Palette, Result, convert::truecolor_to_indexed};

#[derive(Debug, Clone, Copy)]
struct ColorCount {
    color: [u8; 4],
    count: u64,
}

/// A run `start..start + len` of the shared color table.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    start: usize,
    len: usize,
}

/// Distinct colors in order of first appearance, with their pixel counts.
fn histogram(buf: &Buffer) -> Vec<ColorCount> {
    let mut slots: HashMap<u32, usize> = HashMap::new();
    let mut table: Vec<ColorCount> = Vec::new();
    for y in 0..buf.height() {
        for x in 0..buf.width() {
            let raw = buf.raw_pixel(x, y);
            let slot = *slots.entry(raw).or_insert_with(|| {
                table.push(ColorCount {
                    color: raw.to_le_bytes(),
                    count: 0,
                });
                table.len() - 1
            });
            table[slot].count += 1;
        }
    }
    table
}

/// Channel with the widest value range; R, G, B, A order breaks ties.
fn largest_by_norm(entries: &[ColorCount]) -> usize {
    let mut min = [u8::MAX; 4];
    let mut max = [u8::MIN; 4];
    for e in entries {
        for plane in 0..4 {
            min[plane] = min[plane].min(e.color[plane]);
            max[plane] = max[plane].max(e.color[plane]);
        }
    }
    let mut largest = 0;
    for plane in 1..4 {
        if max[plane] - min[plane] > max[largest] - min[largest] {
            largest = plane;
        }
    }
    largest
}

/// Pixel count weighted average, rounded to nearest.
fn average_pixels(entries: &[ColorCount]) -> Color {
    let total: u64 = entries.iter().map(|e| e.count).sum();
    let mut out = [0u8; 4];
    for (plane, channel) in out.iter_mut().enumerate() {
        let sum: u64 = entries.iter().map(|e| u64::from(e.color[plane]) * e.count).sum();
        *channel = ((sum + total / 2) / total) as u8;
    }
    Color::from(out)
}

/// Computes a palette of at most `max_colors` entries for a true color buffer.
///
/// If the image has no more distinct colors than requested they are returned
/// unchanged in order of first appearance. Otherwise the bucket holding the
/// most distinct colors (first one on ties) is repeatedly sorted along its
/// widest channel and cut in half until `max_colors` buckets exist.
///
/// # Panics
///
/// Panics if `buf` is indexed.
pub fn calculate_palette(buf: &Buffer, max_colors: usize) -> Vec<Color> {
    assert!(!buf.format().is_indexed(), "median cut needs a true color buffer, got {}", buf.format());
    if max_colors == 0 {
        return Vec::new();
    }
    let mut table = histogram(buf);
    if table.len() <= max_colors {
        return table.iter().map(|e| Color::from(e.color)).collect();
    }

    let mut buckets = vec![Bucket { start: 0, len: table.len() }];
    while buckets.len() < max_colors {
        let mut pick = 0;
        for (i, b) in buckets.iter().enumerate() {
            if b.len > buckets[pick].len {
                pick = i;
            }
        }
        let bucket = buckets[pick];
        if bucket.len < 2 {
            break;
        }
        let entries = &mut table[bucket.start..bucket.start + bucket.len];
        let plane = largest_by_norm(entries);
        entries.sort_by_key(|e| e.color[plane]);

        let half = bucket.len / 2;
        buckets[pick] = Bucket { start: bucket.start, len: half };
        buckets.insert(
            pick + 1,
            Bucket {
                start: bucket.start + half,
                len: bucket.len - half,
            },
        );
    }

    log::debug!("median cut: {} distinct colors into {} buckets", table.len(), buckets.len());
    buckets.iter().map(|b| average_pixels(&table[b.start..b.start + b.len])).collect()
}

/// Quantises a true color buffer into an indexed one with a generated palette.
///
/// # Errors
///
/// Propagates allocation failures of the palette or target buffer.
pub fn quantize_to_indexed(buf: &Buffer, max_colors: usize) -> Result<(Buffer, Palette)> {
    let palette = Palette::from_colors(calculate_palette(buf, max_colors))?;
    let indexed = truecolor_to_indexed(buf, &palette)?;
    Ok((indexed, palette))
}
