//! Layer tree stored in a generational arena.
//!
//! Nodes refer to each other by [`NodeId`]. Removing a node bumps the slot's
//! generation, so ids held elsewhere (for example by commands on the undo
//! stack) stop resolving instead of pointing at a recycled node.

use std::fmt;

use crate::{EditError, Layer, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Layer(Layer),
    /// Groups child nodes for composition.
    Stack { name: String },
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub struct LayerTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl LayerTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a detached node.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or_else(|_| panic!("layer tree exceeds {} nodes", u32::MAX));
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId { index, generation: 0 }
    }

    pub fn add_layer(&mut self, layer: Layer) -> NodeId {
        self.add(NodeKind::Layer(layer))
    }

    pub fn add_stack(&mut self, name: impl Into<String>) -> NodeId {
        self.add(NodeKind::Stack { name: name.into() })
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(EditError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children in order; empty for stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// Nodes without a parent, in slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().filter(|n| n.parent.is_none()).map(|_| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    pub fn layer(&self, id: NodeId) -> Option<&Layer> {
        match self.kind(id) {
            Some(NodeKind::Layer(layer)) => Some(layer),
            _ => None,
        }
    }

    pub fn layer_mut(&mut self, id: NodeId) -> Option<&mut Layer> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Layer(layer)) => Some(layer),
            _ => None,
        }
    }

    /// Like [`Self::layer_mut`] but tells stale ids and non layer nodes apart.
    pub(crate) fn require_layer_mut(&mut self, id: NodeId) -> Result<&mut Layer> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Layer(layer)) => Ok(layer),
            Some(NodeKind::Stack { .. }) => Err(EditError::NotALayer(id)),
            None => Err(EditError::NodeNotFound(id)),
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Appends `child` to the children of the stack `parent`.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for stale ids.
    ///
    /// # Panics
    ///
    /// Panics if `child` is already attached, `parent` isn't a stack, or the
    /// attach would create a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let child_node = self.require(child)?;
        assert!(child_node.parent.is_none(), "node {child} is already attached, detach it first");
        let parent_node = self.require(parent)?;
        assert!(matches!(parent_node.kind, NodeKind::Stack { .. }), "node {parent} is not a stack");
        assert!(parent != child && !self.is_ancestor(child, parent), "attaching {child} under {parent} creates a cycle");

        if let Some(n) = self.node_mut(parent) {
            n.children.push(child);
        }
        if let Some(n) = self.node_mut(child) {
            n.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlinks `child` from its parent. Detaching a root is a no-op.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for stale ids.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.require(child)?.parent else {
            return Ok(());
        };
        if let Some(n) = self.node_mut(parent) {
            n.children.retain(|&c| c != child);
        }
        if let Some(n) = self.node_mut(child) {
            n.parent = None;
        }
        Ok(())
    }

    /// Destroys a detached node together with all its descendants and returns
    /// the node's own contents.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` for stale ids.
    ///
    /// # Panics
    ///
    /// Panics if the node is still attached to a parent.
    pub fn remove(&mut self, id: NodeId) -> Result<NodeKind> {
        let node = self.require(id)?;
        assert!(node.parent.is_none(), "node {id} must be detached before it is removed");
        let node = self.free_slot(id);
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            let child_node = self.free_slot(child);
            pending.extend(child_node.children);
        }
        Ok(node.kind)
    }

    fn free_slot(&mut self, id: NodeId) -> Node {
        let slot = &mut self.slots[id.index as usize];
        let Some(node) = slot.node.take() else {
            panic!("layer tree corrupted: node {id} listed but missing");
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        node
    }
}
