//! Reversible edits.
//!
//! A [`Cmd`] owns everything it needs to apply and reverse itself. Most kinds
//! are self-inverse: applying swaps the stored data with the live data, so
//! reversing is the very same swap.

use std::ops::Range;

use pix_engine::{
    Buffer, Color, Palette, PixelFormat, Position, Rectangle, Size,
    blit::{blit, blit_swap},
    convert::convert,
    quantize::calculate_palette,
};

use crate::{ChangeEvent, EditError, Frame, Layer, LayerTree, NodeId, Notifier, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdState {
    NotDone,
    Done,
}

#[derive(Debug)]
pub enum CmdKind {
    /// Swaps `snapshot` with the frame pixels at `rect`.
    Draw {
        layer: NodeId,
        frame: usize,
        rect: Rectangle,
        snapshot: Buffer,
    },
    /// Swaps in precomputed frames of a different size.
    Resize { layer: NodeId, frames: Vec<Frame> },
    /// Swaps in precomputed frames and palette, used for format changes and re-palettes.
    ChangeFormat { layer: NodeId, frames: Vec<Frame>, palette: Palette },
    /// Swaps a run of palette entries starting at `first`.
    ModifyPalette { layer: NodeId, first: usize, colors: Vec<Color> },
    InsertFrames {
        layer: NodeId,
        at: usize,
        count: usize,
        frames: Vec<Frame>,
    },
    DeleteFrames {
        layer: NodeId,
        range: Range<usize>,
        frames: Vec<Frame>,
    },
    /// Applied in order, reversed in reverse order, as one history entry.
    Batch { description: String, cmds: Vec<Cmd> },
}

#[derive(Debug)]
pub struct Cmd {
    state: CmdState,
    kind: CmdKind,
}

fn at(pos: Position) -> Rectangle {
    Rectangle::new(pos, Size::new(0, 0))
}

/// Every inserted frame must share the layer's format and size. An empty layer
/// takes its shape from the first inserted frame.
fn check_frame_shape(layer: &Layer, frames: &[Frame]) {
    let (format, size, against) = match (layer.format(), frames.first()) {
        (Some(format), _) => (format, layer.size(), "layer"),
        (None, Some(first)) => (first.buffer.format(), first.buffer.size(), "first inserted frame"),
        (None, None) => return,
    };
    for f in frames {
        assert!(
            f.buffer.format() == format && f.buffer.size() == size,
            "frame {} {}x{} doesn't match {against} {format} {}x{}",
            f.buffer.format(),
            f.buffer.width(),
            f.buffer.height(),
            size.width,
            size.height
        );
    }
}

impl Cmd {
    pub fn new(kind: CmdKind) -> Self {
        Self { state: CmdState::NotDone, kind }
    }

    /// Draw command that puts `pixels` onto the frame at `pos` when applied.
    pub fn draw(layer: NodeId, frame: usize, pos: Position, pixels: Buffer) -> Self {
        let rect = Rectangle::new(pos, pixels.size());
        Self::new(CmdKind::Draw {
            layer,
            frame,
            rect,
            snapshot: pixels,
        })
    }

    /// Draw command for an edit that already happened on the canvas. `before`
    /// holds the pixels at `pos` prior to the edit; the command starts out done.
    pub fn draw_applied(layer: NodeId, frame: usize, pos: Position, before: Buffer) -> Self {
        let mut cmd = Self::draw(layer, frame, pos, before);
        cmd.state = CmdState::Done;
        cmd
    }

    /// Crops or extends every frame of `layer` to `rect` (in current frame
    /// coordinates). New area is cleared.
    ///
    /// # Errors
    ///
    /// Fails for stale ids or if the new buffers can't be allocated.
    pub fn resize(tree: &LayerTree, layer: NodeId, rect: Rectangle) -> Result<Self> {
        let l = tree.layer(layer).ok_or(EditError::NodeNotFound(layer))?;
        let mut frames = Vec::with_capacity(l.frame_count());
        for f in l.frames() {
            let mut buffer = Buffer::new(f.buffer.format(), rect.width().max(0), rect.height().max(0))?;
            let mut src_rect = rect;
            blit(&f.buffer, &mut src_rect, &mut buffer, &mut at(Position::default()));
            frames.push(Frame::new(buffer, f.duration_ms));
        }
        Ok(Self::new(CmdKind::Resize { layer, frames }))
    }

    /// Converts every frame of `layer` to `format`.
    ///
    /// Converting to indexed uses `palette` if given; true color layers
    /// otherwise get a median cut palette computed over all frames, indexed
    /// layers keep theirs. Passing the current format with a new palette
    /// re-maps an indexed layer onto that palette.
    ///
    /// # Errors
    ///
    /// Fails for stale ids or allocation failures during conversion.
    pub fn change_format(tree: &LayerTree, layer: NodeId, format: PixelFormat, palette: Option<Palette>) -> Result<Self> {
        let l = tree.layer(layer).ok_or(EditError::NodeNotFound(layer))?;
        let src_palette = l.palette();
        let dest_palette = match palette {
            Some(p) => p,
            None if format.is_indexed() && l.format().is_some_and(|f| !f.is_indexed()) => {
                let colors = calculate_palette(&frame_sheet(l)?, pix_engine::MAX_PALETTE_SIZE);
                Palette::from_colors(colors)?
            }
            None => src_palette.clone(),
        };
        let mut frames = Vec::with_capacity(l.frame_count());
        for f in l.frames() {
            frames.push(Frame::new(convert(&f.buffer, src_palette, format, &dest_palette)?, f.duration_ms));
        }
        Ok(Self::new(CmdKind::ChangeFormat {
            layer,
            frames,
            palette: dest_palette,
        }))
    }

    /// Replaces palette entries `first..first + colors.len()`.
    pub fn modify_palette(layer: NodeId, first: usize, colors: Vec<Color>) -> Self {
        Self::new(CmdKind::ModifyPalette { layer, first, colors })
    }

    pub fn insert_frames(layer: NodeId, at: usize, frames: Vec<Frame>) -> Self {
        let count = frames.len();
        Self::new(CmdKind::InsertFrames { layer, at, count, frames })
    }

    pub fn delete_frames(layer: NodeId, range: Range<usize>) -> Self {
        Self::new(CmdKind::DeleteFrames {
            layer,
            range,
            frames: Vec::new(),
        })
    }

    /// Groups commands into one history entry. All of them must be in the same state.
    pub fn batch(description: impl Into<String>, cmds: Vec<Cmd>) -> Self {
        let state = cmds.first().map_or(CmdState::NotDone, |c| c.state);
        assert!(cmds.iter().all(|c| c.state == state), "batched commands must share one state");
        Self {
            state,
            kind: CmdKind::Batch {
                description: description.into(),
                cmds,
            },
        }
    }

    pub fn state(&self) -> CmdState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == CmdState::Done
    }

    pub fn kind(&self) -> &CmdKind {
        &self.kind
    }

    pub fn description(&self) -> String {
        match &self.kind {
            CmdKind::Draw { .. } => "Draw".to_string(),
            CmdKind::Resize { .. } => "Resize".to_string(),
            CmdKind::ChangeFormat { .. } => "Change format".to_string(),
            CmdKind::ModifyPalette { colors, .. } => {
                if colors.len() == 1 {
                    "Change color".to_string()
                } else {
                    "Change colors".to_string()
                }
            }
            CmdKind::InsertFrames { .. } => "Insert frames".to_string(),
            CmdKind::DeleteFrames { .. } => "Delete frames".to_string(),
            CmdKind::Batch { description, .. } => description.clone(),
        }
    }

    /// Performs the edit. On error nothing was changed and the command stays not done.
    ///
    /// # Errors
    ///
    /// Fails if the target layer or frame no longer exists.
    ///
    /// # Panics
    ///
    /// Panics if the command is already done.
    pub fn apply(&mut self, tree: &mut LayerTree, notifier: &Notifier) -> Result<()> {
        assert!(self.state == CmdState::NotDone, "cannot apply '{}': already done", self.description());
        log::debug!("apply {}", self.description());
        match &mut self.kind {
            CmdKind::InsertFrames { layer, at, count, frames } => insert(tree, notifier, *layer, *at, frames, *count)?,
            CmdKind::DeleteFrames { layer, range, frames } => *frames = remove(tree, notifier, *layer, range.clone())?,
            CmdKind::Batch { cmds, .. } => {
                for i in 0..cmds.len() {
                    if let Err(err) = cmds[i].apply(tree, notifier) {
                        for done in cmds[..i].iter_mut().rev() {
                            done.reverse(tree, notifier)?;
                        }
                        return Err(err);
                    }
                }
            }
            _ => self.swap(tree, notifier)?,
        }
        self.state = CmdState::Done;
        Ok(())
    }

    /// Undoes the edit. On error nothing was changed and the command stays done.
    ///
    /// # Errors
    ///
    /// Fails if the target layer or frame no longer exists.
    ///
    /// # Panics
    ///
    /// Panics if the command isn't done.
    pub fn reverse(&mut self, tree: &mut LayerTree, notifier: &Notifier) -> Result<()> {
        assert!(self.state == CmdState::Done, "cannot reverse '{}': not done", self.description());
        log::debug!("reverse {}", self.description());
        match &mut self.kind {
            CmdKind::InsertFrames { layer, at, count, frames } => *frames = remove(tree, notifier, *layer, *at..*at + *count)?,
            CmdKind::DeleteFrames { layer, range, frames } => insert(tree, notifier, *layer, range.start, frames, range.len())?,
            CmdKind::Batch { cmds, .. } => {
                let len = cmds.len();
                for i in (0..len).rev() {
                    if let Err(err) = cmds[i].reverse(tree, notifier) {
                        for undone in &mut cmds[i + 1..] {
                            undone.apply(tree, notifier)?;
                        }
                        return Err(err);
                    }
                }
            }
            _ => self.swap(tree, notifier)?,
        }
        self.state = CmdState::NotDone;
        Ok(())
    }

    /// The self-inverse kinds.
    fn swap(&mut self, tree: &mut LayerTree, notifier: &Notifier) -> Result<()> {
        match &mut self.kind {
            CmdKind::Draw { layer, frame, rect, snapshot } => {
                let l = tree.require_layer_mut(*layer)?;
                l.check_frame(*frame)?;
                let mut src_rect = snapshot.bounds();
                let mut dest_rect = at(rect.start);
                blit_swap(snapshot, &mut src_rect, &mut l.frames[*frame].buffer, &mut dest_rect);
                notifier.notify(&ChangeEvent::RegionDamaged {
                    layer: *layer,
                    frame: *frame,
                    rect: dest_rect,
                });
            }
            CmdKind::Resize { layer, frames } => {
                let l = tree.require_layer_mut(*layer)?;
                std::mem::swap(&mut l.frames, frames);
                notifier.notify(&ChangeEvent::FramesReplaced { layer: *layer });
            }
            CmdKind::ChangeFormat { layer, frames, palette } => {
                let l = tree.require_layer_mut(*layer)?;
                std::mem::swap(&mut l.frames, frames);
                std::mem::swap(&mut l.palette, palette);
                notifier.notify(&ChangeEvent::FramesReplaced { layer: *layer });
                notifier.notify(&ChangeEvent::PaletteReplaced { layer: *layer });
            }
            CmdKind::ModifyPalette { layer, first, colors } => {
                let l = tree.require_layer_mut(*layer)?;
                let old = l.palette.set_range(*first, colors);
                for (i, color) in colors.iter().enumerate() {
                    notifier.notify(&ChangeEvent::PaletteEntryChanged {
                        layer: *layer,
                        index: *first + i,
                        color: *color,
                    });
                }
                *colors = old;
            }
            CmdKind::InsertFrames { .. } | CmdKind::DeleteFrames { .. } | CmdKind::Batch { .. } => {
                unreachable!("{} is not a swap command", self.description())
            }
        }
        Ok(())
    }
}

/// Moves `frames` into the layer at `at`. `count` is the number of frames expected.
fn insert(tree: &mut LayerTree, notifier: &Notifier, layer: NodeId, at: usize, frames: &mut Vec<Frame>, count: usize) -> Result<()> {
    let l = tree.require_layer_mut(layer)?;
    l.check_range(at, at)?;
    debug_assert_eq!(frames.len(), count);
    check_frame_shape(l, frames);
    l.frames.splice(at..at, frames.drain(..));
    notifier.notify(&ChangeEvent::FramesAdded { layer, range: at..at + count });
    Ok(())
}

fn remove(tree: &mut LayerTree, notifier: &Notifier, layer: NodeId, range: Range<usize>) -> Result<Vec<Frame>> {
    let l = tree.require_layer_mut(layer)?;
    l.check_range(range.start, range.end)?;
    let frames = l.frames.drain(range.clone()).collect();
    notifier.notify(&ChangeEvent::FramesRemoved { layer, range });
    Ok(frames)
}

/// All frames stacked vertically, used to compute one palette for an animation.
fn frame_sheet(layer: &Layer) -> Result<Buffer> {
    let size = layer.size();
    let format = layer.format().unwrap_or(PixelFormat::Rgba8);
    let mut sheet = Buffer::new(format, size.width, size.height * layer.frame_count() as i32)?;
    for (i, f) in layer.frames().iter().enumerate() {
        let mut src_rect = f.buffer.bounds();
        blit(&f.buffer, &mut src_rect, &mut sheet, &mut at(Position::new(0, size.height * i as i32)));
    }
    Ok(sheet)
}
