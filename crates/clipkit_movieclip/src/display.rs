// SPDX-License-Identifier: MIT OR Apache-2.0
//! Display tree hosting clips.
//!
//! [`DisplayHost`] is the container contract a clip resolves against.
//! [`Stage`] is an arena implementation of it with a depth-first tick driver.

use crate::clip::Clip;
use crate::error::ClipError;
use crate::shim::START_POSITION_PROP;
use clipkit_timeline::{NodeId, PropertyBag, TimelineHost, VisualTarget};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Property that toggles a node's exclusion from timeline placement
pub const EXCLUDED_PROP: &str = "excluded";

/// Container operations a clip needs from its host
pub trait DisplayHost: TimelineHost {
    /// Children of a node, back to front
    fn children(&self, parent: NodeId) -> &[NodeId];

    /// Insert `child` under `parent` at `index`, moving it if it already has a parent
    fn insert_child_at(&mut self, parent: NodeId, child: NodeId, index: usize);

    /// Detach the child at `index`
    fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Option<NodeId>;

    /// Whether the node opted out of timeline placement
    fn is_excluded(&self, node: NodeId) -> bool;

    /// Parent of a node
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// The clip stored at a node
    fn clip(&self, node: NodeId) -> Option<&Clip>;

    /// Mutable access to the clip stored at a node
    fn clip_mut(&mut self, node: NodeId) -> Option<&mut Clip>;

    /// Deliver a named event raised by a frame action
    fn emit(&mut self, source: NodeId, name: &str);

    /// Ancestors of a node, nearest first
    fn ancestors(&self, node: NodeId) -> Ancestors<'_, Self>
    where
        Self: Sized,
    {
        Ancestors {
            host: self,
            next: self.parent_of(node),
        }
    }
}

/// Iterator over a node's ancestors
pub struct Ancestors<'a, H: ?Sized> {
    host: &'a H,
    next: Option<NodeId>,
}

impl<H: DisplayHost + ?Sized> Iterator for Ancestors<'_, H> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.next?;
        self.next = self.host.parent_of(node);
        Some(node)
    }
}

/// What a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain grouping node
    Container,
    /// Leaf visual
    Shape,
    /// Timeline-driven clip
    Clip,
}

/// A node in the stage arena
#[derive(Debug)]
pub struct Node {
    /// Node ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Node kind
    pub kind: NodeKind,
    /// Excluded from timeline placement
    pub excluded: bool,
    /// Assigned property values
    pub props: PropertyBag,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    clip: Option<Box<Clip>>,
}

impl Node {
    fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            excluded: false,
            props: PropertyBag::new(),
            parent: None,
            children: Vec::new(),
            clip: None,
        }
    }

    /// Parent node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children, back to front
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Assign properties. Control properties go to the node or its clip.
    pub fn assign(&mut self, props: &PropertyBag) {
        for (name, value) in props {
            if name == EXCLUDED_PROP {
                if let Some(flag) = value.as_bool() {
                    self.excluded = flag;
                    continue;
                }
            }
            if name == START_POSITION_PROP {
                if let (Some(clip), Some(frame)) = (self.clip.as_deref_mut(), value.as_frame()) {
                    clip.start_position = frame;
                    continue;
                }
            }
            self.props.insert(name.clone(), value.clone());
        }
    }
}

/// A named event raised by a clip's frame action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipEvent {
    /// Clip that raised the event
    pub source: NodeId,
    /// Event name
    pub name: String,
    /// Tick during which it was raised
    pub tick: u64,
}

/// Arena display tree
#[derive(Debug)]
pub struct Stage {
    nodes: IndexMap<NodeId, Node>,
    root: NodeId,
    events: Vec<ClipEvent>,
    ticks: u64,
}

impl Stage {
    /// Create a stage with an empty root container
    pub fn new() -> Self {
        let root = NodeId::new();
        let mut nodes = IndexMap::new();
        nodes.insert(root, Node::new(root, "stage", NodeKind::Container));
        Self {
            nodes,
            root,
            events: Vec::new(),
            ticks: 0,
        }
    }

    /// Root container
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a detached container
    pub fn add_container(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, Node::new(id, name, NodeKind::Container));
        id
    }

    /// Add a detached shape
    pub fn add_shape(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, Node::new(id, name, NodeKind::Shape));
        id
    }

    /// Add a detached clip. The node takes the clip's ID.
    pub fn add_clip(&mut self, name: impl Into<String>, clip: Clip) -> NodeId {
        let id = clip.id();
        let mut node = Node::new(id, name, NodeKind::Clip);
        node.clip = Some(Box::new(clip));
        self.nodes.insert(id, node);
        id
    }

    /// Add a shape as the frontmost child of `parent`
    pub fn attach_shape(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, ClipError> {
        let id = self.add_shape(name);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Add a clip as the frontmost child of `parent`
    pub fn attach_clip(&mut self, parent: NodeId, name: impl Into<String>, clip: Clip) -> Result<NodeId, ClipError> {
        let id = self.add_clip(name, clip);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` as the frontmost child of `parent`
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ClipError> {
        if !self.nodes.contains_key(&parent) {
            return Err(ClipError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(ClipError::NodeNotFound(child));
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(ClipError::InvalidOperation(
                "cannot parent a node under itself or its descendant".into(),
            ));
        }
        let index = self.children(parent).len();
        self.insert_child_at(parent, child, index);
        Ok(())
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ClipError> {
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == child)
            .ok_or(ClipError::NodeNotFound(child))?;
        self.remove_child_at(parent, index);
        Ok(())
    }

    /// Get a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// First node with this name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.values().find(|n| n.name == name).map(|n| n.id)
    }

    /// Tween target for a node
    pub fn visual_target(&self, node: NodeId) -> Option<VisualTarget> {
        self.nodes.get(&node).map(|n| match n.kind {
            NodeKind::Clip => VisualTarget::clip(node),
            NodeKind::Container | NodeKind::Shape => VisualTarget::node(node),
        })
    }

    /// Run `f` on the clip at `id` with the rest of the stage as its host
    pub fn with_clip<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Clip, &mut Stage) -> R,
    ) -> Result<R, ClipError> {
        let mut clip = self.take_clip(id).ok_or(ClipError::NodeNotFound(id))?;
        let result = f(&mut clip, self);
        self.restore_clip(id, clip);
        Ok(result)
    }

    fn take_clip(&mut self, id: NodeId) -> Option<Box<Clip>> {
        self.nodes.get_mut(&id)?.clip.take()
    }

    fn restore_clip(&mut self, id: NodeId, clip: Box<Clip>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.clip = Some(clip);
        }
    }

    /// Advance every reachable clip once, parent before children.
    ///
    /// `elapsed_ms` is the host time since the previous tick; `None` steps
    /// every playing clip by one frame. A clip that an earlier clip's resolve
    /// moves further down the walk is still advanced only once.
    pub fn tick(&mut self, elapsed_ms: Option<f64>) {
        self.ticks += 1;
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(mut clip) = self.take_clip(id) {
                clip.advance(self, elapsed_ms);
                clip.prepare_frame(self);
                self.restore_clip(id, clip);
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// Drain the events raised since the last call
    pub fn take_events(&mut self) -> Vec<ClipEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of ticks run
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Shallow copy of a node, detached. Clips cannot be duplicated.
    pub fn duplicate(&mut self, id: NodeId) -> Result<NodeId, ClipError> {
        let node = self.nodes.get(&id).ok_or(ClipError::NodeNotFound(id))?;
        if node.kind == NodeKind::Clip {
            return Err(ClipError::Unsupported("duplicating a clip"));
        }
        let copy_id = NodeId::new();
        let mut copy = Node::new(copy_id, node.name.clone(), node.kind);
        copy.excluded = node.excluded;
        copy.props = node.props.clone();
        self.nodes.insert(copy_id, copy);
        Ok(copy_id)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineHost for Stage {
    fn apply_properties(&mut self, node: NodeId, props: &PropertyBag) {
        match self.nodes.get_mut(&node) {
            Some(n) => n.assign(props),
            None => tracing::trace!(?node, "properties for unknown node dropped"),
        }
    }
}

impl DisplayHost for Stage {
    fn children(&self, parent: NodeId) -> &[NodeId] {
        self.nodes
            .get(&parent)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    fn insert_child_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if !self.nodes.contains_key(&parent) {
            tracing::warn!(?parent, "insert under unknown parent ignored");
            return;
        }
        let Some(old_parent) = self.nodes.get(&child).map(|n| n.parent) else {
            tracing::warn!(?child, "insert of unknown child ignored");
            return;
        };
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|&c| c != child);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
    }

    fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let node = self.nodes.get_mut(&parent)?;
        if index >= node.children.len() {
            return None;
        }
        let child = node.children.remove(index);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        Some(child)
    }

    fn is_excluded(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.excluded)
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node)?.parent
    }

    fn clip(&self, node: NodeId) -> Option<&Clip> {
        self.nodes.get(&node)?.clip.as_deref()
    }

    fn clip_mut(&mut self, node: NodeId) -> Option<&mut Clip> {
        self.nodes.get_mut(&node)?.clip.as_deref_mut()
    }

    fn emit(&mut self, source: NodeId, name: &str) {
        tracing::debug!(?source, event = name, "clip event");
        self.events.push(ClipEvent {
            source,
            name: name.to_owned(),
            tick: self.ticks,
        });
    }
}
