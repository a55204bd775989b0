// SPDX-License-Identifier: MIT OR Apache-2.0
//! RON clip documents.
//!
//! A document describes one root clip: its settings, labels, shapes, nested
//! clips and tweens. Nodes are referenced by name; names are unique across the
//! whole document.

use crate::clip::{Clip, ClipSettings};
use crate::display::Stage;
use crate::error::ClipError;
use clipkit_timeline::{
    ActionMarker, Keyframe, NodeId, PropertyBag, StateAssignment, Timeline, Tween, VisualTarget,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A whole scene: one root clip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDocument {
    /// The clip attached to the stage root
    pub root: ClipSpec,
}

/// Declaration of a clip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Unique node name
    pub name: String,
    /// Playback settings
    #[serde(default)]
    pub settings: ClipSettings,
    /// Declared frame count; tweens may extend it
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Named frames
    #[serde(default)]
    pub labels: IndexMap<String, u32>,
    /// Shapes this clip's tweens place
    #[serde(default)]
    pub shapes: Vec<ShapeSpec>,
    /// Nested clips this clip's tweens place
    #[serde(default)]
    pub clips: Vec<ClipSpec>,
    /// Tweens, in processing order
    #[serde(default)]
    pub tweens: Vec<TweenSpec>,
}

fn default_frames() -> u32 {
    1
}

/// Declaration of a shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// Unique node name
    pub name: String,
    /// Initial properties
    #[serde(default)]
    pub props: PropertyBag,
    /// Excluded from timeline placement
    #[serde(default)]
    pub excluded: bool,
}

/// Declaration of a tween, with targets referenced by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TweenSpec {
    /// Motion tween on a shape or nested clip
    Motion {
        /// Target node name
        target: String,
        /// Keyframes
        keyframes: Vec<Keyframe>,
    },
    /// State tween
    State {
        /// Stepped state lists
        keyframes: Vec<StateKeySpec>,
    },
    /// Frame actions on the owning clip
    Actions {
        /// Action markers
        markers: Vec<ActionMarker>,
    },
}

/// A state list starting at a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateKeySpec {
    /// Frame the list takes effect on
    pub frame: u32,
    /// Assignments, highest priority first
    #[serde(default)]
    pub assignments: Vec<AssignmentSpec>,
}

/// One state assignment, by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSpec {
    /// Target node name
    pub target: String,
    /// Properties to assign
    #[serde(default)]
    pub props: PropertyBag,
}

impl ClipDocument {
    /// Parse a document from RON text
    pub fn from_ron(text: &str) -> Result<Self, ClipError> {
        Ok(ron::from_str(text)?)
    }

    /// Write the document as pretty RON
    pub fn to_ron(&self) -> Result<String, ClipError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Build a stage holding the document. Returns the stage and the root clip.
    pub fn build(&self) -> Result<(Stage, NodeId), ClipError> {
        let mut stage = Stage::new();
        let mut names = HashMap::new();
        let root = build_clip(&self.root, &mut stage, &mut names)?;
        stage.add_child(stage.root(), root)?;
        tracing::debug!(root = %self.root.name, nodes = names.len(), "built clip document");
        Ok((stage, root))
    }
}

/// Create a clip and everything it declares, nested clips first
fn build_clip(
    decl: &ClipSpec,
    stage: &mut Stage,
    names: &mut HashMap<String, NodeId>,
) -> Result<NodeId, ClipError> {
    for child in &decl.clips {
        build_clip(child, stage, names)?;
    }

    for shape in &decl.shapes {
        let id = stage.add_shape(shape.name.clone());
        register(names, &shape.name, id)?;
        if let Some(node) = stage.node_mut(id) {
            node.excluded = shape.excluded;
            node.props = shape.props.clone();
        }
    }

    let mut timeline = Timeline::new(decl.frames);
    for tween in &decl.tweens {
        timeline.add_tween(build_tween(tween, stage, names)?);
    }
    for (label, &frame) in &decl.labels {
        timeline.add_label(label.clone(), frame)?;
    }

    let id = stage.add_clip(decl.name.clone(), Clip::with_settings(timeline, decl.settings.clone()));
    register(names, &decl.name, id)?;
    tracing::trace!(clip = %decl.name, tweens = decl.tweens.len(), "built clip");
    Ok(id)
}

fn build_tween(
    decl: &TweenSpec,
    stage: &Stage,
    names: &HashMap<String, NodeId>,
) -> Result<Tween, ClipError> {
    let tween = match decl {
        TweenSpec::Motion { target, keyframes } => {
            let target = visual_target(target, stage, names)?;
            keyframes
                .iter()
                .cloned()
                .fold(Tween::motion(target), Tween::with_keyframe)
        }
        TweenSpec::State { keyframes } => {
            let mut tween = Tween::state();
            for key in keyframes {
                let list = key
                    .assignments
                    .iter()
                    .map(|a| {
                        Ok(StateAssignment {
                            target: lookup(names, &a.target)?,
                            props: a.props.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, ClipError>>()?;
                tween = tween.with_state(key.frame, list);
            }
            tween
        }
        TweenSpec::Actions { markers } => markers
            .iter()
            .fold(Tween::owner(), |tween, m| tween.with_action(m.frame, m.action.clone())),
    };
    Ok(tween)
}

fn visual_target(
    name: &str,
    stage: &Stage,
    names: &HashMap<String, NodeId>,
) -> Result<VisualTarget, ClipError> {
    let id = lookup(names, name)?;
    // A clip is registered after its own tweens, so it can never target itself.
    stage
        .visual_target(id)
        .ok_or_else(|| ClipError::UnknownNode(name.to_owned()))
}

fn lookup(names: &HashMap<String, NodeId>, name: &str) -> Result<NodeId, ClipError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| ClipError::UnknownNode(name.to_owned()))
}

fn register(names: &mut HashMap<String, NodeId>, name: &str, id: NodeId) -> Result<(), ClipError> {
    if names.insert(name.to_owned(), id).is_some() {
        return Err(ClipError::DuplicateName(name.to_owned()));
    }
    Ok(())
}
