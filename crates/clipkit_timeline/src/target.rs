// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tween targets.

use crate::keyframe::PropertyBag;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a display node that tweens can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A renderable node driven by a motion tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualTarget {
    /// Node receiving the tweened properties
    pub node: NodeId,
    /// Whether the node is itself a timeline-driven clip
    pub nested_clip: bool,
}

impl VisualTarget {
    /// Target a plain visual node
    pub fn node(node: NodeId) -> Self {
        Self { node, nested_clip: false }
    }

    /// Target a nested clip
    pub fn clip(node: NodeId) -> Self {
        Self { node, nested_clip: true }
    }
}

/// What a tween drives.
///
/// The variant is fixed when the tween is registered, so frame resolution
/// never has to inspect the target again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenTarget {
    /// The clip owning the timeline (carries frame actions only)
    Owner,
    /// A visual node (motion tween)
    Visual(VisualTarget),
    /// A stepped list of state assignments (state tween)
    State,
}

impl TweenTarget {
    /// Whether the target is a nested clip
    pub fn is_nested_clip(&self) -> bool {
        matches!(self, Self::Visual(VisualTarget { nested_clip: true, .. }))
    }
}

/// One entry of a state list: properties assigned wholesale onto a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAssignment {
    /// Node receiving the properties
    pub target: NodeId,
    /// Properties to assign
    #[serde(default)]
    pub props: PropertyBag,
}

impl StateAssignment {
    /// Create an assignment with no properties
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            props: PropertyBag::new(),
        }
    }

    /// Add a property to assign
    pub fn with_prop(mut self, name: impl Into<String>, value: crate::keyframe::PropValue) -> Self {
        self.props.insert(name.into(), value);
        self
    }
}
