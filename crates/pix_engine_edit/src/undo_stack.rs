use std::collections::VecDeque;

use crate::{Cmd, Result};

pub const DEFAULT_UNDO_LIMIT: usize = 128;

/// Undo/redo operations of an editing session.
pub trait UndoState {
    fn undo_description(&self) -> Option<String>;
    fn can_undo(&self) -> bool;
    /// # Errors
    ///
    /// Fails if the command's target no longer exists.
    fn undo(&mut self) -> Result<()>;

    fn redo_description(&self) -> Option<String>;
    fn can_redo(&self) -> bool;
    /// # Errors
    ///
    /// Fails if the command's target no longer exists.
    fn redo(&mut self) -> Result<()>;
}

/// Bounded pair of undo and redo stacks.
///
/// Pushing a new command clears the redo stack. Once more than `limit`
/// commands are on the undo stack the oldest ones are dropped for good.
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: VecDeque<Cmd>,
    redo_stack: Vec<Cmd>,
    limit: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoStack {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Push a new, done command and drop everything that could be redone.
    pub fn push(&mut self, cmd: Cmd) {
        debug_assert!(cmd.is_done(), "only done commands belong on the undo stack");
        if !self.redo_stack.is_empty() {
            log::debug!("dropping {} redo entries", self.redo_stack.len());
            self.redo_stack.clear();
        }
        self.undo_stack.push_back(cmd);
        self.enforce_limit();
    }

    /// Put a redone command back without touching the redo stack.
    pub(crate) fn push_redone(&mut self, cmd: Cmd) {
        self.undo_stack.push_back(cmd);
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        while self.undo_stack.len() > self.limit {
            if let Some(cmd) = self.undo_stack.pop_front() {
                log::debug!("undo limit {} reached, discarding '{}'", self.limit, cmd.description());
            }
        }
    }

    pub fn pop_undo(&mut self) -> Option<Cmd> {
        self.undo_stack.pop_back()
    }

    pub fn push_redo(&mut self, cmd: Cmd) {
        debug_assert!(!cmd.is_done(), "only reversed commands belong on the redo stack");
        self.redo_stack.push(cmd);
    }

    pub fn pop_redo(&mut self) -> Option<Cmd> {
        self.redo_stack.pop()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(Cmd::description)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Cmd::description)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
