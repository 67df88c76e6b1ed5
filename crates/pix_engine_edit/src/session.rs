use std::{cell::RefCell, rc::Rc};

use pix_engine::{Buffer, Rectangle};

use crate::{ChangeEvent, ChangeListener, Cmd, EditError, Layer, LayerTree, ListenerId, NodeId, NodeKind, Notifier, Result, UndoStack, UndoState};

/// A document being edited: the layer tree plus its history.
#[derive(Debug, Default)]
pub struct EditSession {
    tree: LayerTree,
    undo_stack: UndoStack,
    notifier: Notifier,
    is_dirty: bool,
}

impl EditSession {
    pub fn new(undo_limit: usize) -> Self {
        Self::with_tree(LayerTree::new(), undo_limit)
    }

    pub fn with_tree(tree: LayerTree, undo_limit: usize) -> Self {
        Self {
            tree,
            undo_stack: UndoStack::new(undo_limit),
            notifier: Notifier::new(),
            is_dirty: false,
        }
    }

    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    /// Direct access to the tree. Changes made this way bypass the history.
    pub fn tree_mut(&mut self) -> &mut LayerTree {
        &mut self.tree
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn add_listener(&mut self, listener: Rc<RefCell<dyn ChangeListener>>) -> ListenerId {
        self.notifier.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    pub fn undo_stack_len(&self) -> usize {
        self.undo_stack.undo_len()
    }

    pub fn redo_stack_len(&self) -> usize {
        self.undo_stack.redo_len()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_saved(&mut self) {
        self.is_dirty = false;
    }

    /// Removes a detached node from the tree. Commands that still refer to it
    /// fail with [`EditError::NodeNotFound`] when undone or redone.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for stale ids.
    pub fn remove_node(&mut self, id: NodeId) -> Result<NodeKind> {
        let kind = self.tree.remove(id)?;
        self.is_dirty = true;
        Ok(kind)
    }

    /// Layer lookup that reports why it failed.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for stale ids, `NotALayer` for stacks.
    pub fn layer(&self, id: NodeId) -> Result<&Layer> {
        match self.tree.kind(id) {
            Some(NodeKind::Layer(layer)) => Ok(layer),
            Some(NodeKind::Stack { .. }) => Err(EditError::NotALayer(id)),
            None => Err(EditError::NodeNotFound(id)),
        }
    }

    /// Applies `cmd` unless it is already done and records it.
    ///
    /// # Errors
    ///
    /// If applying fails the command is dropped and the history stays as it was.
    pub fn add_cmd(&mut self, mut cmd: Cmd) -> Result<()> {
        if !cmd.is_done() {
            cmd.apply(&mut self.tree, &self.notifier)?;
        }
        self.undo_stack.push(cmd);
        self.is_dirty = true;
        Ok(())
    }

    /// Lets `op` paint into `rect` of a frame and records the change as one
    /// draw command. Returns the clipped rectangle that was captured.
    ///
    /// # Errors
    ///
    /// Fails for stale ids, non layer nodes, a frame index out of range or if
    /// the snapshot can't be allocated.
    pub fn draw<F>(&mut self, layer: NodeId, frame: usize, rect: Rectangle, op: F) -> Result<Rectangle>
    where
        F: FnOnce(&mut Buffer),
    {
        let l = self.tree.require_layer_mut(layer)?;
        l.check_frame(frame)?;
        let buffer = &mut l.frames[frame].buffer;
        let rect = rect.clip(&buffer.bounds());
        if rect.is_empty() {
            return Ok(rect);
        }
        let before = Buffer::from_region(buffer, rect)?;
        op(buffer);
        self.notifier.notify(&ChangeEvent::RegionDamaged { layer, frame, rect });
        self.undo_stack.push(Cmd::draw_applied(layer, frame, rect.start, before));
        self.is_dirty = true;
        Ok(rect)
    }
}

impl UndoState for EditSession {
    fn undo_description(&self) -> Option<String> {
        self.undo_stack.undo_description()
    }

    fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    /// A command that fails to reverse is discarded, the next undo continues
    /// with the one below it.
    fn undo(&mut self) -> Result<()> {
        let Some(mut cmd) = self.undo_stack.pop_undo() else {
            return Ok(());
        };
        if let Err(err) = cmd.reverse(&mut self.tree, &self.notifier) {
            log::warn!("discarding '{}' after failed undo: {err}", cmd.description());
            return Err(err);
        }
        self.undo_stack.push_redo(cmd);
        self.is_dirty = true;
        Ok(())
    }

    fn redo_description(&self) -> Option<String> {
        self.undo_stack.redo_description()
    }

    fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    fn redo(&mut self) -> Result<()> {
        let Some(mut cmd) = self.undo_stack.pop_redo() else {
            return Ok(());
        };
        if let Err(err) = cmd.apply(&mut self.tree, &self.notifier) {
            log::warn!("discarding '{}' after failed redo: {err}", cmd.description());
            return Err(err);
        }
        self.undo_stack.push_redone(cmd);
        self.is_dirty = true;
        Ok(())
    }
}
