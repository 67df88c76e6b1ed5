#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]
mod position;
pub use position::*;

mod rectangle;
pub use rectangle::*;

mod pixel_format;
pub use pixel_format::*;

mod palette;
pub use palette::*;

mod pen;
pub use pen::*;

mod buffer;
pub use buffer::*;

mod ramp;
pub use ramp::*;

pub mod blit;
pub mod convert;
pub mod draw;
pub mod fill;
pub mod import;
pub mod quantize;

pub use blit::BlitMode;
pub use fill::flood_fill;
pub use import::DecodedFrame;
pub use quantize::calculate_palette;

mod error;
pub use error::{EngineError, Result};
