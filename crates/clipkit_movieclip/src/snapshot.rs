// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-tick view of the display tree.

use crate::display::{DisplayHost, Stage};
use clipkit_timeline::NodeId;
use serde::Serialize;
use std::fmt;

/// One node as seen after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Node name
    pub name: String,
    /// Depth below the stage root
    pub depth: usize,
    /// Current frame, for clips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
    /// Current label, for clips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The reachable display tree, back to front, depth first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    /// Ticks run so far
    pub tick: u64,
    /// Reachable nodes, excluding the root
    pub nodes: Vec<NodeSnapshot>,
}

impl Stage {
    /// Capture the reachable tree
    pub fn snapshot(&self) -> StageSnapshot {
        let mut nodes = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self
            .children(self.root())
            .iter()
            .rev()
            .map(|&id| (id, 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let clip = self.clip(id);
            nodes.push(NodeSnapshot {
                name: node.name.clone(),
                depth,
                frame: clip.map(|c| c.current_frame()),
                label: clip.and_then(|c| c.current_label()).map(str::to_owned),
            });
            stack.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
        }

        StageSnapshot {
            tick: self.tick_count(),
            nodes,
        }
    }
}

impl fmt::Display for StageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tick {}", self.tick)?;
        for node in &self.nodes {
            write!(f, "{:indent$}{}", "", node.name, indent = node.depth * 2 + 2)?;
            if let Some(frame) = node.frame {
                write!(f, " @{frame}")?;
            }
            if let Some(label) = &node.label {
                write!(f, " [{label}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
