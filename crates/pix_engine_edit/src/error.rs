use thiserror::Error;

use pix_engine::EngineError;

use crate::NodeId;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Layer tree node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("Layer tree node {0} is not a layer")]
    NotALayer(NodeId),

    #[error("Frames {start}..{end} out of range, layer has {len} frames")]
    FrameOutOfRange { start: usize, end: usize, len: usize },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EditError>;
