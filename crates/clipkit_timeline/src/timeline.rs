// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline containing tweens, labels and the committed position.

use crate::error::TimelineError;
use crate::keyframe::PropertyBag;
use crate::target::{NodeId, TweenTarget};
use crate::tween::{Action, Tween, TweenId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Loop forever
pub const LOOP_FOREVER: i32 = -1;

/// A seek request: a frame index or a label name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameRef {
    /// Absolute frame index
    Frame(u32),
    /// Named label
    Label(String),
}

impl From<u32> for FrameRef {
    fn from(frame: u32) -> Self {
        Self::Frame(frame)
    }
}

impl From<&str> for FrameRef {
    fn from(label: &str) -> Self {
        Self::Label(label.to_owned())
    }
}

impl From<String> for FrameRef {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

/// A label and the frame it marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Label name
    pub name: String,
    /// Frame index
    pub frame: u32,
}

/// Receiver of tweened property values
pub trait TimelineHost {
    /// Assign property values onto a node
    fn apply_properties(&mut self, node: NodeId, props: &PropertyBag);
}

/// Outcome of committing a position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCommit {
    /// Committed frame
    pub position: u32,
    /// Whether a finite loop has run to its last frame
    pub complete: bool,
    /// Actions that fired, in order; empty when actions were ignored
    pub actions: Vec<Action>,
}

/// A keyframe timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    tweens: Vec<Tween>,
    #[serde(default)]
    labels: IndexMap<String, u32>,
    /// Declared frame count (the content may extend it)
    duration: u32,
    /// `-1` loops forever, `0` plays once, `N` repeats N more times
    #[serde(default = "loop_forever")]
    loop_count: i32,
    #[serde(skip)]
    position: u32,
    #[serde(skip)]
    raw_position: Option<u32>,
}

fn loop_forever() -> i32 {
    LOOP_FOREVER
}

impl Timeline {
    /// Create an empty timeline with a declared frame count
    pub fn new(duration: u32) -> Self {
        Self {
            tweens: Vec::new(),
            labels: IndexMap::new(),
            duration,
            loop_count: LOOP_FOREVER,
            position: 0,
            raw_position: None,
        }
    }

    /// Add a tween; tweens are processed in insertion order
    pub fn add_tween(&mut self, tween: Tween) -> TweenId {
        let id = tween.id;
        self.tweens.push(tween);
        id
    }

    /// Remove a tween
    pub fn remove_tween(&mut self, tween_id: TweenId) -> Result<Tween, TimelineError> {
        let idx = self
            .tweens
            .iter()
            .position(|t| t.id == tween_id)
            .ok_or(TimelineError::TweenNotFound(tween_id))?;
        Ok(self.tweens.remove(idx))
    }

    /// All tweens, in processing order
    pub fn tweens(&self) -> impl Iterator<Item = &Tween> {
        self.tweens.iter()
    }

    /// Get tween count
    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// Name a frame
    pub fn add_label(&mut self, name: impl Into<String>, frame: u32) -> Result<(), TimelineError> {
        let name = name.into();
        let duration = self.duration();
        if frame >= duration {
            return Err(TimelineError::FrameOutOfRange { frame, duration });
        }
        if self.labels.contains_key(&name) {
            return Err(TimelineError::DuplicateLabel(name));
        }
        self.labels.insert(name, frame);
        Ok(())
    }

    /// All labels, sorted by frame
    pub fn labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .labels
            .iter()
            .map(|(name, &frame)| Label {
                name: name.clone(),
                frame,
            })
            .collect();
        labels.sort_by_key(|l| l.frame);
        labels
    }

    /// The label at or most recently before the committed position
    pub fn current_label(&self) -> Option<&str> {
        self.labels
            .iter()
            .filter(|(_, frame)| **frame <= self.position)
            .max_by_key(|(_, frame)| **frame)
            .map(|(name, _)| name.as_str())
    }

    /// Resolve a seek request to a raw position
    pub fn resolve(&self, target: &FrameRef) -> Option<u32> {
        match target {
            FrameRef::Frame(frame) => Some(*frame),
            FrameRef::Label(name) => self.labels.get(name).copied(),
        }
    }

    /// Frame count: the declared duration, extended to cover all tweens
    pub fn duration(&self) -> u32 {
        self.tweens
            .iter()
            .map(Tween::content_duration)
            .fold(self.duration, u32::max)
    }

    /// Loop policy
    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    /// Set the loop policy
    pub fn set_loop_count(&mut self, loop_count: i32) {
        self.loop_count = loop_count;
    }

    /// Committed frame
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Raw position of the last commit, before looping
    pub fn raw_position(&self) -> Option<u32> {
        self.raw_position
    }

    /// Commit a raw position.
    ///
    /// Tween properties are applied to `host` first, then `on_resolved` runs,
    /// then the actions crossed by this commit are collected and returned.
    /// A jump only collects the actions on the destination frame.
    pub fn set_position<H, F>(
        &mut self,
        raw: u32,
        ignore_actions: bool,
        jump: bool,
        host: &mut H,
        on_resolved: F,
    ) -> FrameCommit
    where
        H: TimelineHost + ?Sized,
        F: FnOnce(&Timeline, &mut H),
    {
        let previous = self.raw_position;
        let (position, complete) = self.locate(raw);
        self.raw_position = Some(raw);
        self.position = position;

        for tween in &mut self.tweens {
            tween.update(position);
            if tween.is_passive() {
                continue;
            }
            if let TweenTarget::Visual(visual) = tween.target() {
                host.apply_properties(visual.node, tween.current());
            }
        }

        on_resolved(self, host);

        let actions = if ignore_actions {
            Vec::new()
        } else {
            self.crossed_frames(previous, raw, jump)
                .into_iter()
                .flat_map(|frame| self.actions_at(frame))
                .collect()
        };

        if complete {
            tracing::trace!(position, "timeline reached its final frame");
        }

        FrameCommit {
            position,
            complete,
            actions,
        }
    }

    fn actions_at(&self, frame: u32) -> Vec<Action> {
        self.tweens
            .iter()
            .flat_map(|t| t.actions_at(frame))
            .cloned()
            .collect()
    }

    /// Frames whose actions fire when moving from `previous` to `raw`
    fn crossed_frames(&self, previous: Option<u32>, raw: u32, jump: bool) -> Vec<u32> {
        match previous {
            Some(prev) if !jump && raw == prev => Vec::new(),
            Some(prev) if !jump && raw > prev => {
                let (_, mut was_complete) = self.locate(prev);
                let mut frames = Vec::new();
                for step in prev + 1..=raw {
                    let (frame, complete) = self.locate(step);
                    if complete && was_complete {
                        break;
                    }
                    was_complete = complete;
                    frames.push(frame);
                }
                frames
            }
            _ => vec![self.position],
        }
    }

    /// Map a raw position onto a frame, honoring the loop policy
    fn locate(&self, raw: u32) -> (u32, bool) {
        let duration = self.duration().max(1);
        if self.loop_count >= 0 {
            let last = u64::from(duration) * (self.loop_count as u64 + 1) - 1;
            if u64::from(raw) >= last {
                return (duration - 1, true);
            }
        }
        (raw % duration, false)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(1)
    }
}
