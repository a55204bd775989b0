// SPDX-License-Identifier: MIT OR Apache-2.0
//! Managed-child reconciliation.
//!
//! Every resolve marks the registry, re-manages whatever the current frame
//! names, and sweeps the rest. Children a clip never managed are left alone.

use crate::clip::ClipMode;
use crate::display::DisplayHost;
use clipkit_timeline::{NodeId, StateAssignment};
use std::collections::HashMap;

/// Registry tag of a managed child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedTag {
    /// Not named by the frame being resolved (yet)
    RemovalCandidate,
    /// Named by the frame being resolved
    Kept,
}

/// Children a clip has placed, keyed by node
#[derive(Debug, Clone, Default)]
pub struct ManagedRegistry {
    entries: HashMap<NodeId, ManagedTag>,
}

impl ManagedRegistry {
    /// Tag of a node, `None` if the clip never managed it
    pub fn tag(&self, node: NodeId) -> Option<ManagedTag> {
        self.entries.get(&node).copied()
    }

    /// Number of tracked children
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn mark_all_candidates(&mut self) {
        for tag in self.entries.values_mut() {
            *tag = ManagedTag::RemovalCandidate;
        }
    }

    pub(crate) fn keep(&mut self, node: NodeId) {
        self.entries.insert(node, ManagedTag::Kept);
    }

    pub(crate) fn forget(&mut self, node: NodeId) {
        self.entries.remove(&node);
    }
}

/// Applies one frame's worth of placements to a clip's children
pub(crate) struct Reconciler<'a, H: DisplayHost> {
    parent: NodeId,
    managed: &'a mut ManagedRegistry,
    host: &'a mut H,
}

impl<'a, H: DisplayHost> Reconciler<'a, H> {
    pub(crate) fn new(parent: NodeId, managed: &'a mut ManagedRegistry, host: &'a mut H) -> Self {
        Self {
            parent,
            managed,
            host,
        }
    }

    /// Assign a state list. Lower indices are applied last and win.
    pub(crate) fn apply_state(&mut self, list: &[StateAssignment], offset: u32) {
        for assignment in list.iter().rev() {
            self.host.apply_properties(assignment.target, &assignment.props);
            self.manage(assignment.target, offset);
        }
    }

    /// Place a child at the back of the parent and tag it kept
    pub(crate) fn manage(&mut self, child: NodeId, offset: u32) {
        if self.host.is_excluded(child) {
            return;
        }
        self.host.insert_child_at(self.parent, child, 0);

        let first_sighting = self.managed.tag(child).is_none();
        if let Some(clip) = self.host.clip_mut(child) {
            clip.synch_offset = offset;
            if clip.mode == ClipMode::Independent && clip.auto_reset && first_sighting {
                clip.reset_playhead();
            }
        }
        self.managed.keep(child);
    }

    /// Remove every child still tagged as a removal candidate, last index first
    pub(crate) fn sweep(self) {
        let count = self.host.children(self.parent).len();
        for index in (0..count).rev() {
            let Some(&child) = self.host.children(self.parent).get(index) else {
                continue;
            };
            if self.managed.tag(child) == Some(ManagedTag::RemovalCandidate) {
                self.host.remove_child_at(self.parent, index);
                self.managed.forget(child);
                tracing::trace!(parent = ?self.parent, ?child, "removed managed child");
            }
        }
    }
}
