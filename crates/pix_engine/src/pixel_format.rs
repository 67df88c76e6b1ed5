use serde::{Deserialize, Serialize};

/// Pixel encodings a [`crate::Buffer`] can hold.
///
/// * `Indexed8` - one byte per pixel, a palette index.
/// * `Rgb8` - four bytes per pixel: red, green, blue and a padding byte that is always 255.
/// * `Rgba8` - four bytes per pixel: red, green, blue, alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Indexed8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 3] = [PixelFormat::Indexed8, PixelFormat::Rgb8, PixelFormat::Rgba8];

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Indexed8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => 4,
        }
    }

    pub const fn is_indexed(self) -> bool {
        matches!(self, PixelFormat::Indexed8)
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8)
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Indexed8 => write!(f, "indexed8"),
            PixelFormat::Rgb8 => write!(f, "rgb8"),
            PixelFormat::Rgba8 => write!(f, "rgba8"),
        }
    }
}
