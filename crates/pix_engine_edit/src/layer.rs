use pix_engine::{Buffer, DecodedFrame, Palette, PixelFormat, Size};

use crate::{EditError, Result};

/// One animation frame: a buffer plus its display time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub buffer: Buffer,
    pub duration_ms: u32,
}

impl Frame {
    pub fn new(buffer: Buffer, duration_ms: u32) -> Self {
        Self { buffer, duration_ms }
    }
}

/// Ordered frames sharing one palette.
///
/// All frames of a layer have the same format and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub(crate) frames: Vec<Frame>,
    pub(crate) palette: Palette,
    pub fps: u32,
}

impl Layer {
    /// Single frame layer with a cleared buffer.
    ///
    /// # Errors
    ///
    /// Fails if the buffer can't be allocated.
    pub fn new(name: impl Into<String>, format: PixelFormat, size: Size, palette: Palette, fps: u32, duration_ms: u32) -> Result<Self> {
        let buffer = Buffer::new(format, size.width, size.height)?;
        Ok(Self {
            name: name.into(),
            frames: vec![Frame::new(buffer, duration_ms)],
            palette,
            fps,
        })
    }

    /// Builds a layer from decoded frames. The palette of the first frame that
    /// carries one becomes the layer palette; frames without a duration get
    /// `default_duration_ms`.
    ///
    /// # Errors
    ///
    /// Fails if there are no frames or the frames disagree on format or size.
    pub fn from_decoded(name: impl Into<String>, decoded: Vec<DecodedFrame>, fps: u32, default_duration_ms: u32) -> Result<Self> {
        let Some(first) = decoded.first() else {
            return Err(pix_engine::EngineError::generic("no frames to build a layer from").into());
        };
        let format = first.buffer.format();
        let size = first.buffer.size();
        let mut palette = None;
        let mut frames = Vec::with_capacity(decoded.len());
        for frame in decoded {
            if frame.buffer.format() != format || frame.buffer.size() != size {
                return Err(pix_engine::EngineError::generic(format!(
                    "frame {} is {} {}x{}, expected {format} {}x{}",
                    frames.len(),
                    frame.buffer.format(),
                    frame.buffer.width(),
                    frame.buffer.height(),
                    size.width,
                    size.height
                ))
                .into());
            }
            if palette.is_none() {
                palette = frame.palette;
            }
            frames.push(Frame::new(frame.buffer, frame.duration_ms.unwrap_or(default_duration_ms)));
        }
        Ok(Self {
            name: name.into(),
            frames,
            palette: palette.unwrap_or_default(),
            fps,
        })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Format of the frames, `None` for a layer without frames.
    pub fn format(&self) -> Option<PixelFormat> {
        self.frames.first().map(|f| f.buffer.format())
    }

    pub fn size(&self) -> Size {
        self.frames.first().map(|f| f.buffer.size()).unwrap_or_default()
    }

    pub(crate) fn check_frame(&self, index: usize) -> Result<()> {
        self.check_range(index, index + 1)
    }

    pub(crate) fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end || end > self.frames.len() {
            return Err(EditError::FrameOutOfRange {
                start,
                end,
                len: self.frames.len(),
            });
        }
        Ok(())
    }
}
