// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tween definitions for the timeline.

use crate::keyframe::{Interpolation, Keyframe, PropertyBag};
use crate::plugin;
use crate::target::{StateAssignment, TweenTarget, VisualTarget};
use crate::timeline::FrameRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property key holding the state list of a state tween
pub const STATE_PROP: &str = "state";

/// Unique identifier for a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenId(pub Uuid);

impl TweenId {
    /// Create a new random tween ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TweenId {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame action, run after the frame it sits on has been resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Pause the owning clip
    Stop,
    /// Resume the owning clip
    Play,
    /// Seek the owning clip and resume
    GotoAndPlay(FrameRef),
    /// Seek the owning clip and pause
    GotoAndStop(FrameRef),
    /// Emit a named event to the host
    Emit(String),
}

/// An action placed on a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMarker {
    /// Frame the action fires on
    pub frame: u32,
    /// The action
    pub action: Action,
}

/// A tween: one target driven by a list of keyframes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tween {
    /// Unique tween ID
    #[serde(default)]
    pub id: TweenId,
    target: TweenTarget,
    #[serde(default)]
    keyframes: Vec<Keyframe>,
    #[serde(default)]
    actions: Vec<ActionMarker>,
    #[serde(skip)]
    step_offset: u32,
    #[serde(skip)]
    passive: bool,
    #[serde(skip)]
    current: PropertyBag,
}

impl Tween {
    /// Create a new tween for a target
    pub fn new(target: TweenTarget) -> Self {
        Self {
            id: TweenId::new(),
            target,
            keyframes: Vec::new(),
            actions: Vec::new(),
            step_offset: 0,
            passive: false,
            current: PropertyBag::new(),
        }
    }

    /// Create a motion tween for a visual target
    pub fn motion(target: VisualTarget) -> Self {
        Self::new(TweenTarget::Visual(target))
    }

    /// Create a state tween
    pub fn state() -> Self {
        Self::new(TweenTarget::State)
    }

    /// Create an action carrier targeting the owning clip
    pub fn owner() -> Self {
        Self::new(TweenTarget::Owner)
    }

    /// Add a keyframe (builder form)
    pub fn with_keyframe(mut self, keyframe: Keyframe) -> Self {
        self.add_keyframe(keyframe);
        self
    }

    /// Add a state keyframe holding `list` from `frame` on
    pub fn with_state(self, frame: u32, list: Vec<StateAssignment>) -> Self {
        self.with_keyframe(
            Keyframe::new(frame)
                .with_prop(STATE_PROP, crate::keyframe::PropValue::State(list))
                .with_interpolation(crate::keyframe::InterpolationMode::Constant),
        )
    }

    /// Add an action (builder form)
    pub fn with_action(mut self, frame: u32, action: Action) -> Self {
        self.add_action(frame, action);
        self
    }

    /// Add a keyframe
    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
        self.keyframes.sort_by_key(|k| k.frame);
    }

    /// Add an action on a frame
    pub fn add_action(&mut self, frame: u32, action: Action) {
        self.actions.push(ActionMarker { frame, action });
        self.actions.sort_by_key(|m| m.frame);
    }

    /// What this tween drives
    pub fn target(&self) -> &TweenTarget {
        &self.target
    }

    /// All keyframes, sorted by frame
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Frames elapsed since the keyframe the playhead currently sits on
    pub fn step_offset(&self) -> u32 {
        self.step_offset
    }

    /// Whether the current segment is passive
    pub fn is_passive(&self) -> bool {
        self.passive
    }

    /// Property values at the committed position
    pub fn current(&self) -> &PropertyBag {
        &self.current
    }

    /// State list at the committed position, if this is a well-formed state tween
    pub fn state_list(&self) -> Option<&[StateAssignment]> {
        self.current.get(STATE_PROP)?.as_state()
    }

    /// Number of frames this tween spans
    pub fn content_duration(&self) -> u32 {
        let keys = self.keyframes.last().map_or(0, |k| k.frame.saturating_add(1));
        let actions = self.actions.last().map_or(0, |m| m.frame.saturating_add(1));
        keys.max(actions)
    }

    /// Actions placed on a frame, in insertion order
    pub fn actions_at(&self, frame: u32) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |m| m.frame == frame)
            .map(|m| &m.action)
    }

    /// Recompute step offset, passive flag and property values for a position
    pub(crate) fn update(&mut self, position: u32) {
        let Some(idx) = self.keyframes.iter().rposition(|k| k.frame <= position) else {
            // Before the first keyframe the first values hold.
            self.step_offset = 0;
            match self.keyframes.first() {
                Some(first) => {
                    self.passive = first.passive;
                    self.current = first.props.clone();
                }
                None => {
                    self.passive = false;
                    self.current.clear();
                }
            }
            return;
        };

        let start = &self.keyframes[idx];
        self.step_offset = position - start.frame;
        self.passive = start.passive;

        let Some(next) = self.keyframes.get(idx + 1) else {
            self.current = start.props.clone();
            return;
        };

        let ratio = self.step_offset as f32 / (next.frame - start.frame) as f32;
        let eased = Interpolation::ease(start.interpolation, ratio);

        let mut current = PropertyBag::with_capacity(start.props.len());
        for (name, from) in &start.props {
            let to = next.props.get(name).unwrap_or(from);
            let value = plugin::change(&self.target, name, from, to, ratio)
                .or_else(|| from.interpolate(to, eased))
                .unwrap_or_else(|| from.clone());
            current.insert(name.clone(), value);
        }
        self.current = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::PropValue;
    use crate::target::NodeId;

    fn x_tween() -> Tween {
        Tween::motion(VisualTarget::node(NodeId::new()))
            .with_keyframe(Keyframe::new(0).with_prop("x", PropValue::Float(0.0)))
            .with_keyframe(Keyframe::new(4).with_prop("x", PropValue::Float(8.0)))
    }

    #[test]
    fn test_keyframes_sorted() {
        let tween = Tween::motion(VisualTarget::node(NodeId::new()))
            .with_keyframe(Keyframe::new(6))
            .with_keyframe(Keyframe::new(2));
        let frames: Vec<u32> = tween.keyframes().iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![2, 6]);
    }

    #[test]
    fn test_update_interpolates_and_tracks_offset() {
        let mut tween = x_tween();

        tween.update(1);
        assert_eq!(tween.step_offset(), 1);
        assert_eq!(tween.current().get("x"), Some(&PropValue::Float(2.0)));

        tween.update(6);
        assert_eq!(tween.step_offset(), 2);
        assert_eq!(tween.current().get("x"), Some(&PropValue::Float(8.0)));
    }

    #[test]
    fn test_constant_segments_step() {
        let mut tween = Tween::motion(VisualTarget::node(NodeId::new()))
            .with_keyframe(
                Keyframe::new(0)
                    .with_prop("x", PropValue::Float(0.0))
                    .with_interpolation(crate::keyframe::InterpolationMode::Constant),
            )
            .with_keyframe(Keyframe::new(4).with_prop("x", PropValue::Float(8.0)));

        tween.update(3);
        assert_eq!(tween.current().get("x"), Some(&PropValue::Float(0.0)));
    }

    #[test]
    fn test_passive_follows_segment() {
        let mut tween = Tween::motion(VisualTarget::node(NodeId::new()))
            .with_keyframe(Keyframe::new(0))
            .with_keyframe(Keyframe::new(3).passive())
            .with_keyframe(Keyframe::new(5));

        tween.update(2);
        assert!(!tween.is_passive());
        tween.update(4);
        assert!(tween.is_passive());
        tween.update(5);
        assert!(!tween.is_passive());
    }

    #[test]
    fn test_state_list_lookup() {
        let node = NodeId::new();
        let mut tween = Tween::state()
            .with_state(0, vec![StateAssignment::new(node)])
            .with_state(3, Vec::new());

        tween.update(2);
        assert_eq!(tween.state_list().map(<[StateAssignment]>::len), Some(1));
        assert_eq!(tween.step_offset(), 2);

        tween.update(3);
        assert_eq!(tween.state_list().map(<[StateAssignment]>::len), Some(0));

        let mut malformed = Tween::state().with_keyframe(Keyframe::new(0));
        malformed.update(0);
        assert!(malformed.state_list().is_none());
    }

    #[test]
    fn test_content_duration_covers_actions() {
        let tween = x_tween().with_action(9, Action::Stop);
        assert_eq!(tween.content_duration(), 10);
        assert_eq!(tween.actions_at(9).count(), 1);
        assert_eq!(tween.actions_at(4).count(), 0);
    }

    #[test]
    fn test_content_duration_saturates_at_last_frame() {
        let tween = Tween::motion(VisualTarget::node(NodeId::new()))
            .with_keyframe(Keyframe::new(u32::MAX))
            .with_action(u32::MAX, Action::Stop);
        assert_eq!(tween.content_duration(), u32::MAX);
    }
}
