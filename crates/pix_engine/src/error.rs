//! Unified error types for pix_engine
//!
//! Only recoverable failures live here. Misuse of the API (format mismatches,
//! unsupported blit combinations, missing pen indices) panics instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::PixelFormat;

/// Main error type for pix_engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    // === Resource Errors ===
    #[error("Failed to allocate {bytes} bytes for a {width}x{height} {format} buffer")]
    AllocationFailed {
        width: i32,
        height: i32,
        format: PixelFormat,
        bytes: usize,
    },

    #[error("Invalid buffer dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Pixel data length mismatch: expected {expected}, got {actual}")]
    InvalidDataLength { expected: usize, actual: usize },

    // === Palette Errors ===
    #[error("Palette holds at most 256 colors, got {len}")]
    PaletteTooLarge { len: usize },

    #[error("Invalid palette format: {message}")]
    InvalidPaletteFormat { message: String },

    #[error("Unsupported palette file extension: {extension}")]
    UnsupportedPaletteExtension { extension: String },

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open file '{path}': {message}")]
    OpenFile { path: PathBuf, message: String },

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pix_engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

// === Convenience constructors ===
impl EngineError {
    /// Create a generic error from any displayable type
    pub fn generic(msg: impl std::fmt::Display) -> Self {
        Self::Generic(msg.to_string())
    }

    pub fn invalid_palette(msg: impl Into<String>) -> Self {
        Self::InvalidPaletteFormat { message: msg.into() }
    }

    /// Create an open file error
    pub fn open_file(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::OpenFile {
            path: path.into(),
            message: msg.into(),
        }
    }
}
