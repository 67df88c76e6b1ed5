#![allow(clippy::many_single_char_names)]
use std::{fmt::Display, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// Maximum number of entries a palette may hold.
pub const MAX_PALETTE_SIZE: usize = 256;

lazy_static::lazy_static! {
    static ref HEX_REGEX: Regex = Regex::new(r"([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})").unwrap();

    static ref PAL_REGEX: Regex = Regex::new(r"(\d+)\s+(\d+)\s+(\d+)").unwrap();

    static ref GPL_COLOR_REGEX: Regex = Regex::new(r"^\s*(\d+)\s+(\d+)\s+(\d+)").unwrap();
    static ref GPL_NAME_REGEX: Regex = Regex::new(r"^\s*Name:\s*(.*)\s*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{Color: r={:02X}, g={:02X}, b={:02X}, a={:02X}}}", self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub fn get_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Packs the channels little endian, red in the lowest byte.
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    pub const fn from_u32(value: u32) -> Self {
        let [r, g, b, a] = value.to_le_bytes();
        Color { r, g, b, a }
    }

    /// Squared euclidean distance over all four channels.
    pub fn distance_sq(&self, other: &Color) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        let da = self.a as i32 - other.a as i32;
        (dr * dr + dg * dg + db * db + da * da) as u32
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// # Errors
    ///
    /// Returns an error if `hex` doesn't contain six hex digits.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let Some(cap) = HEX_REGEX.captures(hex) else {
            return Err(EngineError::invalid_palette(format!("invalid hex color: {hex}")));
        };
        let (_, [r, g, b]) = cap.extract();
        Ok(Color::new(u8::from_str_radix(r, 16)?, u8::from_str_radix(g, 16)?, u8::from_str_radix(b, 16)?))
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Color::new(value.0, value.1, value.2)
    }
}

impl From<[u8; 4]> for Color {
    fn from(value: [u8; 4]) -> Self {
        Color::rgba(value[0], value[1], value[2], value[3])
    }
}

impl From<Color> for [u8; 4] {
    fn from(value: Color) -> [u8; 4] {
        [value.r, value.g, value.b, value.a]
    }
}

pub enum PaletteFormat {
    /// GIMP palette
    Gpl,
    /// JASC-PAL (Paint Shop Pro)
    Pal,
    /// One `rrggbb` per line
    Hex,
}

/// Ordered color table with at most 256 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub title: String,
    colors: Vec<Color>,
}

impl Palette {
    /// Create a new empty palette
    pub fn new() -> Self {
        Palette::default()
    }

    /// Palette of `len` opaque black entries.
    ///
    /// # Errors
    ///
    /// `PaletteTooLarge` for more than 256 entries, `Generic` if the allocation fails.
    pub fn with_len(len: usize) -> Result<Self> {
        let mut pal = Palette::new();
        pal.resize(len)?;
        Ok(pal)
    }

    /// # Errors
    ///
    /// `PaletteTooLarge` for more than 256 entries.
    pub fn from_colors(colors: Vec<Color>) -> Result<Self> {
        if colors.len() > MAX_PALETTE_SIZE {
            return Err(EngineError::PaletteTooLarge { len: colors.len() });
        }
        Ok(Palette { title: String::new(), colors })
    }

    /// Builds a palette from packed `r g b` triples.
    ///
    /// # Errors
    ///
    /// Fails if the data isn't a multiple of 3 or holds more than 256 colors.
    pub fn from_rgb_bytes(pal: &[u8]) -> Result<Self> {
        if pal.len() % 3 != 0 {
            return Err(EngineError::invalid_palette(format!("rgb palette length {} is not a multiple of 3", pal.len())));
        }
        Palette::from_colors(pal.chunks_exact(3).map(|c| Color::new(c[0], c[1], c[2])).collect())
    }

    /// Builds a palette from packed `r g b a` quads.
    ///
    /// # Errors
    ///
    /// Fails if the data isn't a multiple of 4 or holds more than 256 colors.
    pub fn from_rgba_bytes(pal: &[u8]) -> Result<Self> {
        if pal.len() % 4 != 0 {
            return Err(EngineError::invalid_palette(format!("rgba palette length {} is not a multiple of 4", pal.len())));
        }
        Palette::from_colors(pal.chunks_exact(4).map(|c| Color::rgba(c[0], c[1], c[2], c[3])).collect())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn color_iter(&self) -> impl Iterator<Item = &Color> {
        self.colors.iter()
    }

    /// Color at `index`. Indices past the end yield opaque black.
    pub fn get(&self, index: usize) -> Color {
        self.colors.get(index).copied().unwrap_or(Color::BLACK)
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the palette.
    pub fn set(&mut self, index: usize, color: Color) {
        assert!(index < self.colors.len(), "palette index {index} out of range (len {})", self.colors.len());
        self.colors[index] = color;
    }

    /// Overwrites `colors.len()` entries starting at `first` and returns the
    /// entries that were replaced.
    ///
    /// # Panics
    ///
    /// Panics if the range doesn't fit into the palette.
    pub fn set_range(&mut self, first: usize, colors: &[Color]) -> Vec<Color> {
        let end = first + colors.len();
        assert!(end <= self.colors.len(), "palette range {first}..{end} out of range (len {})", self.colors.len());
        let old = self.colors[first..end].to_vec();
        self.colors[first..end].copy_from_slice(colors);
        old
    }

    /// Resizes the palette, keeping entries by index. New entries are opaque black.
    ///
    /// # Errors
    ///
    /// `PaletteTooLarge` for more than 256 entries, `Generic` if the allocation fails.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        if len > MAX_PALETTE_SIZE {
            return Err(EngineError::PaletteTooLarge { len });
        }
        if len > self.colors.len() {
            self.colors
                .try_reserve_exact(len - self.colors.len())
                .map_err(|err| EngineError::generic(format!("palette allocation failed: {err}")))?;
        }
        self.colors.resize(len, Color::BLACK);
        Ok(())
    }

    /// Index of the closest entry by squared RGBA distance. Ties go to the lowest
    /// index. An empty palette yields 0.
    pub fn nearest_index(&self, color: Color) -> u8 {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let dist = c.distance_sq(&color);
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }

    /// # Errors
    ///
    /// Returns an error if the data can't be parsed as the given format.
    pub fn load_palette(format: &PaletteFormat, bytes: &[u8]) -> Result<Self> {
        let data = std::str::from_utf8(bytes).map_err(|err| EngineError::invalid_palette(format!("invalid input: {err}")))?;
        let mut colors = Vec::new();
        let mut title = String::new();
        match format {
            PaletteFormat::Hex => {
                for (_, [r, g, b]) in HEX_REGEX.captures_iter(data).map(|c| c.extract()) {
                    colors.push(Color::new(u8::from_str_radix(r, 16)?, u8::from_str_radix(g, 16)?, u8::from_str_radix(b, 16)?));
                }
            }
            PaletteFormat::Pal => {
                for (i, line) in data.lines().enumerate() {
                    match i {
                        0 => {
                            if line.trim() != "JASC-PAL" {
                                return Err(EngineError::invalid_palette(format!("only JASC-PAL supported: {line}")));
                            }
                        }
                        1 | 2 => {
                            // version and color count
                        }
                        _ => {
                            for (_, [r, g, b]) in PAL_REGEX.captures_iter(line).map(|c| c.extract()) {
                                colors.push(Color::new(r.parse()?, g.parse()?, b.parse()?));
                            }
                        }
                    }
                }
            }
            PaletteFormat::Gpl => {
                for (i, line) in data.lines().enumerate() {
                    if i == 0 {
                        if line.trim() != "GIMP Palette" {
                            return Err(EngineError::invalid_palette(format!("only GIMP Palette supported: {line}")));
                        }
                        continue;
                    }
                    if line.starts_with('#') {
                        continue;
                    }
                    if let Some(cap) = GPL_NAME_REGEX.captures(line) {
                        if let Some(name) = cap.get(1) {
                            title = name.as_str().trim().to_string();
                        }
                    } else if let Some(cap) = GPL_COLOR_REGEX.captures(line) {
                        let (_, [r, g, b]) = cap.extract();
                        colors.push(Color::new(r.parse()?, g.parse()?, b.parse()?));
                    }
                }
            }
        }
        let mut pal = Palette::from_colors(colors)?;
        pal.title = title;
        Ok(pal)
    }

    /// Picks the palette format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions or unparsable data.
    pub fn import_palette(file_name: &Path, bytes: &[u8]) -> Result<Self> {
        let Some(ext) = file_name.extension() else {
            return Err(EngineError::UnsupportedPaletteExtension { extension: String::new() });
        };
        let ext = ext.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "pal" => Palette::load_palette(&PaletteFormat::Pal, bytes),
            "gpl" => Palette::load_palette(&PaletteFormat::Gpl, bytes),
            "hex" => Palette::load_palette(&PaletteFormat::Hex, bytes),
            _ => Err(EngineError::UnsupportedPaletteExtension { extension: ext }),
        }
    }

    pub fn export_palette(&self, format: &PaletteFormat) -> Vec<u8> {
        let mut res = String::new();
        match format {
            PaletteFormat::Hex => {
                for c in &self.colors {
                    res.push_str(&format!("{:02x}{:02x}{:02x}\n", c.r, c.g, c.b));
                }
            }
            PaletteFormat::Pal => {
                res.push_str("JASC-PAL\n");
                res.push_str("0100\n");
                res.push_str(&format!("{}\n", self.colors.len()));
                for c in &self.colors {
                    res.push_str(&format!("{} {} {}\n", c.r, c.g, c.b));
                }
            }
            PaletteFormat::Gpl => {
                res.push_str("GIMP Palette\n");
                res.push_str(&format!("Name: {}\n", self.title));
                res.push_str("#\n");
                for (i, c) in self.colors.iter().enumerate() {
                    res.push_str(&format!("{:3} {:3} {:3}\tIndex {i}\n", c.r, c.g, c.b));
                }
            }
        }
        res.into_bytes()
    }
}
