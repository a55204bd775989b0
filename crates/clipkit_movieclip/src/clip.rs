// SPDX-License-Identifier: MIT OR Apache-2.0
//! The timeline-driven clip.

use crate::error::ClipError;
use crate::playhead::{PlaybackState, Playhead};
use crate::reconcile::ManagedRegistry;
use crate::shim;
use clipkit_timeline::{Label, NodeId, Timeline, LOOP_FOREVER};
use serde::{Deserialize, Serialize};

/// How a clip's playhead moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClipMode {
    /// Advances on its own clock
    #[default]
    Independent,
    /// Always shows `start_position`
    SingleFrame,
    /// Shows `start_position` plus the offset borrowed from its parent
    Synced,
}

/// Configurable clip properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    /// Playback mode
    pub mode: ClipMode,
    /// First frame for synced and single-frame modes
    pub start_position: u32,
    /// `-1` loops forever, `0` plays once, `N` repeats N more times
    pub loop_count: i32,
    /// Target frames per second; `None` steps once per tick or inherits
    pub framerate: Option<f64>,
    /// Start paused
    pub paused: bool,
    /// Run frame actions
    pub actions_enabled: bool,
    /// Restart when reintroduced by a parent timeline
    pub auto_reset: bool,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            mode: ClipMode::Independent,
            start_position: 0,
            loop_count: LOOP_FOREVER,
            framerate: None,
            paused: false,
            actions_enabled: true,
            auto_reset: true,
        }
    }
}

/// A container whose children are resolved from a timeline every frame.
///
/// Clips live in a display host (see [`crate::display::Stage`]), which owns
/// the child lists; the clip owns its timeline and its managed-child registry.
#[derive(Debug)]
pub struct Clip {
    id: NodeId,
    /// Playback mode
    pub mode: ClipMode,
    /// First frame for synced and single-frame modes
    pub start_position: u32,
    /// Loop policy, copied onto the timeline at every commit
    pub loop_count: i32,
    /// Target frames per second
    pub framerate: Option<f64>,
    /// Run frame actions
    pub actions_enabled: bool,
    /// Restart when reintroduced by a parent timeline
    pub auto_reset: bool,
    pub(crate) synch_offset: u32,
    pub(crate) current_frame: u32,
    pub(crate) raw_position: Option<u32>,
    pub(crate) effective_framerate: Option<f64>,
    pub(crate) playhead: Playhead,
    pub(crate) timeline: Timeline,
    pub(crate) managed: ManagedRegistry,
}

impl Clip {
    /// Create a clip with default settings
    pub fn new(timeline: Timeline) -> Self {
        Self::with_settings(timeline, ClipSettings::default())
    }

    /// Create a clip from settings
    pub fn with_settings(timeline: Timeline, settings: ClipSettings) -> Self {
        shim::install();
        Self {
            id: NodeId::new(),
            mode: settings.mode,
            start_position: settings.start_position,
            loop_count: settings.loop_count,
            framerate: settings.framerate,
            actions_enabled: settings.actions_enabled,
            auto_reset: settings.auto_reset,
            synch_offset: 0,
            current_frame: 0,
            raw_position: None,
            effective_framerate: None,
            playhead: Playhead::new(settings.paused),
            timeline,
            managed: ManagedRegistry::default(),
        }
    }

    /// Current settings
    pub fn settings(&self) -> ClipSettings {
        ClipSettings {
            mode: self.mode,
            start_position: self.start_position,
            loop_count: self.loop_count,
            framerate: self.framerate,
            paused: self.playhead.paused,
            actions_enabled: self.actions_enabled,
            auto_reset: self.auto_reset,
        }
    }

    /// Node identity of this clip
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Last committed frame
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Raw playhead position; `None` until the first commit or after a reset
    pub fn raw_position(&self) -> Option<u32> {
        self.raw_position
    }

    /// Offset borrowed from the controlling parent
    pub fn synch_offset(&self) -> u32 {
        self.synch_offset
    }

    /// Framerate used by the last advance (own or inherited)
    pub fn effective_framerate(&self) -> Option<f64> {
        self.effective_framerate
    }

    /// Whether the clip is paused
    pub fn is_paused(&self) -> bool {
        self.playhead.paused
    }

    /// Playing or stopped
    pub fn state(&self) -> PlaybackState {
        self.playhead.state()
    }

    /// Unconsumed fraction of a frame
    pub fn leftover(&self) -> f64 {
        self.playhead.leftover
    }

    /// The clip's timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutable access to the timeline, for registering tweens
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Labels, sorted by frame
    pub fn labels(&self) -> Vec<Label> {
        self.timeline.labels()
    }

    /// The label at or before the current frame
    pub fn current_label(&self) -> Option<&str> {
        self.timeline.current_label()
    }

    /// Number of frames in the timeline
    pub fn total_frames(&self) -> u32 {
        self.timeline.duration()
    }

    /// Length in seconds at the effective framerate
    pub fn duration_secs(&self) -> Option<f64> {
        let fps = self.framerate.or(self.effective_framerate)?;
        (fps.is_finite() && fps > 0.0).then(|| f64::from(self.total_frames()) / fps)
    }

    /// Whether a node is currently tracked as a managed child
    pub fn is_managed(&self, node: NodeId) -> bool {
        self.managed.tag(node).is_some()
    }

    /// Resume playback
    pub fn play(&mut self) {
        self.playhead.paused = false;
    }

    /// Pause playback
    pub fn stop(&mut self) {
        self.playhead.paused = true;
    }

    /// Clips cannot be duplicated: a timeline and its retargeted tweens have no copy semantics.
    pub fn duplicate(&self) -> Result<Clip, ClipError> {
        Err(ClipError::Unsupported("duplicating a clip"))
    }

    /// Rewind to the uninitialized state used when a parent reintroduces this clip
    pub(crate) fn reset_playhead(&mut self) {
        tracing::debug!(clip = ?self.id, "auto-reset on reintroduction");
        self.raw_position = None;
        self.current_frame = 0;
        self.playhead.leftover = 0.0;
        self.playhead.paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ClipSettings::default();
        assert_eq!(settings.mode, ClipMode::Independent);
        assert_eq!(settings.loop_count, LOOP_FOREVER);
        assert!(settings.actions_enabled);
        assert!(settings.auto_reset);
        assert!(!settings.paused);
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = ClipSettings {
            mode: ClipMode::Synced,
            start_position: 3,
            framerate: Some(24.0),
            ..ClipSettings::default()
        };
        let clip = Clip::with_settings(Timeline::new(8), settings.clone());
        assert_eq!(clip.settings(), settings);
        assert_eq!(clip.raw_position(), None);

        let text = ron::ser::to_string(&settings).unwrap();
        let loaded: ClipSettings = ron::from_str("(mode: Synced, start_position: 3, framerate: Some(24.0))").unwrap();
        assert_eq!(loaded, settings);
        assert!(text.contains("Synced"));
    }

    #[test]
    fn test_play_stop_flags() {
        let mut clip = Clip::new(Timeline::new(4));
        clip.stop();
        assert!(clip.is_paused());
        assert_eq!(clip.state(), PlaybackState::Stopped);
        clip.play();
        assert!(!clip.is_paused());
        assert_eq!(clip.state(), PlaybackState::Playing);
        assert_eq!(clip.raw_position(), None);
    }

    #[test]
    fn test_duplicate_is_unsupported() {
        let clip = Clip::new(Timeline::new(4));
        assert!(matches!(clip.duplicate(), Err(ClipError::Unsupported(_))));
    }

    #[test]
    fn test_duration_secs() {
        let mut clip = Clip::new(Timeline::new(48));
        assert_eq!(clip.duration_secs(), None);
        clip.framerate = Some(24.0);
        assert_eq!(clip.duration_secs(), Some(2.0));
    }

    #[test]
    fn test_constructing_installs_shim() {
        let _clip = Clip::new(Timeline::new(1));
        assert!(clipkit_timeline::plugin::is_installed(shim::SHIM_NAME));
    }
}
