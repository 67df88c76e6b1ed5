use serde::{Deserialize, Serialize};

use crate::{Color, Palette, PixelFormat};

/// A drawing color usable against indexed and true color buffers alike.
///
/// The RGBA value is always valid. The palette index is only present when the
/// pen was picked from a palette; drawing into an indexed buffer requires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenColor {
    pub color: Color,
    index: Option<u8>,
}

impl PenColor {
    /// Pen with a color but no palette index.
    pub const fn rgb(color: Color) -> Self {
        Self { color, index: None }
    }

    pub const fn indexed(color: Color, index: u8) -> Self {
        Self { color, index: Some(index) }
    }

    /// Pen for a palette entry.
    pub fn from_palette(palette: &Palette, index: u8) -> Self {
        Self::indexed(palette.get(index as usize), index)
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn try_index(&self) -> Option<u8> {
        self.index
    }

    /// # Panics
    ///
    /// Panics if the pen carries no palette index.
    pub fn index(&self) -> u8 {
        match self.index {
            Some(idx) => idx,
            None => panic!("pen color {} has no palette index", self.color),
        }
    }

    /// Raw pixel value of this pen in the given buffer format, packed the same
    /// way as [`crate::Buffer::raw_pixel`].
    ///
    /// # Panics
    ///
    /// Panics for indexed formats if the pen has no palette index.
    pub fn encode(&self, format: PixelFormat) -> u32 {
        match format {
            PixelFormat::Indexed8 => self.index() as u32,
            PixelFormat::Rgb8 => self.color.with_alpha(255).to_u32(),
            PixelFormat::Rgba8 => self.color.to_u32(),
        }
    }
}

impl From<Color> for PenColor {
    fn from(color: Color) -> Self {
        PenColor::rgb(color)
    }
}
