//! Synchronous change notifications for views.
//!
//! Commands raise events while they apply or reverse; every registered listener
//! sees them before the call returns.

use std::{cell::RefCell, ops::Range, rc::Rc};

use pix_engine::{Color, Rectangle};

use crate::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    RegionDamaged { layer: NodeId, frame: usize, rect: Rectangle },
    PaletteEntryChanged { layer: NodeId, index: usize, color: Color },
    PaletteReplaced { layer: NodeId },
    FramesAdded { layer: NodeId, range: Range<usize> },
    FramesRemoved { layer: NodeId, range: Range<usize> },
    /// Every frame of the layer was swapped out, possibly with a new size or format.
    FramesReplaced { layer: NodeId },
}

pub trait ChangeListener {
    fn on_change(&mut self, event: &ChangeEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct Notifier {
    listeners: Vec<(ListenerId, Rc<RefCell<dyn ChangeListener>>)>,
    next_id: u64,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("listeners", &self.listeners.len()).finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Rc<RefCell<dyn ChangeListener>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the listener wasn't registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let len = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != len
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// # Panics
    ///
    /// Panics if a listener is already borrowed, i.e. it re-entered the notifier.
    pub fn notify(&self, event: &ChangeEvent) {
        log::trace!("change: {event:?}");
        for (_, listener) in &self.listeners {
            listener.borrow_mut().on_change(event);
        }
    }
}

/// Listener that records every event.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<ChangeEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// New log already wrapped for [`Notifier::add_listener`].
    pub fn shared() -> Rc<RefCell<EventLog>> {
        Rc::new(RefCell::new(EventLog::new()))
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ChangeListener for EventLog {
    fn on_change(&mut self, event: &ChangeEvent) {
        self.events.push(event.clone());
    }
}
