//! Boundary to the image decoding collaborator.
//!
//! The engine parses no file formats itself. Decoding is delegated to the
//! `image` crate and the result handed over as [`DecodedFrame`]s.

use std::{fs::File, io::BufReader, path::Path};

use image::{AnimationDecoder, DynamicImage, codecs::gif::GifDecoder};

use crate::{Buffer, EngineError, Palette, PixelFormat, Result};

/// One decoded animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub buffer: Buffer,
    /// Present for indexed buffers.
    pub palette: Option<Palette>,
    /// `None` for still images; the editor substitutes its default.
    pub duration_ms: Option<u32>,
}

impl DecodedFrame {
    pub fn new(buffer: Buffer, palette: Option<Palette>, duration_ms: Option<u32>) -> Self {
        Self { buffer, palette, duration_ms }
    }

    /// Indexed frame from raw indices and packed RGB (`rgba == false`) or RGBA palette bytes.
    ///
    /// # Errors
    ///
    /// Fails if the index data doesn't match the size, or the palette has more than 256 entries.
    pub fn indexed(width: i32, height: i32, indices: Vec<u8>, palette_bytes: &[u8], rgba: bool, duration_ms: Option<u32>) -> Result<Self> {
        let buffer = Buffer::from_raw(PixelFormat::Indexed8, width, height, indices)?;
        let palette = if rgba {
            Palette::from_rgba_bytes(palette_bytes)?
        } else {
            Palette::from_rgb_bytes(palette_bytes)?
        };
        Ok(Self::new(buffer, Some(palette), duration_ms))
    }

    /// Converts a decoded image. Images with an alpha channel become RGBA, all
    /// others RGB.
    ///
    /// # Errors
    ///
    /// Fails if the image is too large for the engine's buffers.
    pub fn from_dynamic_image(img: &DynamicImage, duration_ms: Option<u32>) -> Result<Self> {
        let width = i32::try_from(img.width()).map_err(|_| EngineError::InvalidDimensions { width: i32::MAX, height: 0 })?;
        let height = i32::try_from(img.height()).map_err(|_| EngineError::InvalidDimensions { width, height: i32::MAX })?;
        let buffer = if img.color().has_alpha() {
            Buffer::from_raw(PixelFormat::Rgba8, width, height, img.to_rgba8().into_raw())?
        } else {
            let rgb = img.to_rgb8();
            let mut data = Vec::new();
            data.try_reserve_exact(rgb.len() / 3 * 4).map_err(|_| EngineError::AllocationFailed {
                width,
                height,
                format: PixelFormat::Rgb8,
                bytes: rgb.len() / 3 * 4,
            })?;
            for px in rgb.chunks_exact(3) {
                data.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
            Buffer::from_raw(PixelFormat::Rgb8, width, height, data)?
        };
        Ok(Self::new(buffer, None, duration_ms))
    }
}

/// Decodes an image file into frames. GIF files yield every animation frame
/// with its delay; everything else yields a single still frame.
///
/// # Errors
///
/// Returns an error if the file can't be opened or decoded.
pub fn load_image(path: &Path) -> Result<Vec<DecodedFrame>> {
    let is_gif = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    if is_gif {
        let file = File::open(path).map_err(|err| EngineError::open_file(path, err.to_string()))?;
        let decoder = GifDecoder::new(BufReader::new(file))?;
        let frames = decoder.into_frames().collect_frames()?;
        log::debug!("decoded {} gif frames from {}", frames.len(), path.display());
        return frames
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let duration = if denom == 0 { 0 } else { numer / denom };
                DecodedFrame::from_dynamic_image(&DynamicImage::ImageRgba8(frame.into_buffer()), Some(duration))
            })
            .collect();
    }

    let img = image::open(path)?;
    log::debug!("decoded {}x{} image from {}", img.width(), img.height(), path.display());
    Ok(vec![DecodedFrame::from_dynamic_image(&img, None)?])
}
