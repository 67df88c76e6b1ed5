#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]
mod error;
pub use error::{EditError, Result};

mod layer;
pub use layer::*;

mod tree;
pub use tree::*;

pub mod notify;
pub use notify::{ChangeEvent, ChangeListener, EventLog, ListenerId, Notifier};

pub mod cmd;
pub use cmd::{Cmd, CmdKind, CmdState};

pub mod undo_stack;
pub use undo_stack::{UndoStack, UndoState};

mod session;
pub use session::*;

mod brush;
pub use brush::*;

pub mod context;
pub use context::{EditingContext, EditorConfig};

// Re-export the engine types commands are built from
pub use pix_engine::{Buffer, Color, EngineError, Palette, PenColor, PixelFormat, Position, Rectangle, Size};
