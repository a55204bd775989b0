// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playhead advancement.
//!
//! Converts elapsed host time into whole frame steps, carrying the fractional
//! remainder over to the next tick. Each step commits exactly one raw
//! position so every intermediate frame resolves and fires its actions.

use crate::clip::{Clip, ClipMode};
use crate::display::DisplayHost;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Playing
    #[default]
    Playing,
    /// Stopped
    Stopped,
}

/// Pause flag and fractional time accumulator
#[derive(Debug, Clone, Default)]
pub struct Playhead {
    pub(crate) paused: bool,
    pub(crate) leftover: f64,
}

impl Playhead {
    /// Create a playhead
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            leftover: 0.0,
        }
    }

    /// Playing or stopped
    pub fn state(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Stopped
        } else {
            PlaybackState::Playing
        }
    }

    /// Number of frames to step for this tick.
    ///
    /// Without a finite framerate or a finite elapsed time every tick is one
    /// frame. A framerate of zero (or below) never advances.
    pub fn frames_due(&mut self, framerate: Option<f64>, elapsed_ms: Option<f64>) -> u32 {
        let fps = framerate.filter(|fps| fps.is_finite()).map(|fps| fps.max(0.0));
        let elapsed_ms = elapsed_ms.filter(|ms| ms.is_finite()).map(|ms| ms.max(0.0));
        let t = match (fps, elapsed_ms) {
            (Some(fps), Some(elapsed)) => elapsed / (1000.0 / fps) + self.leftover,
            _ => 1.0,
        };
        let frames = t.floor().max(0.0);
        self.leftover = t - frames;
        frames as u32
    }
}

impl Clip {
    /// Advance the playhead by the time elapsed since the last tick.
    ///
    /// Only independent clips advance. The framerate is looked up even while
    /// paused so descendants can inherit it.
    pub fn advance<H: DisplayHost>(&mut self, host: &mut H, elapsed_ms: Option<f64>) {
        if self.mode != ClipMode::Independent {
            return;
        }

        self.effective_framerate = self.framerate.or_else(|| self.inherited_framerate(host));
        if self.playhead.paused {
            return;
        }

        let frames = self.playhead.frames_due(self.effective_framerate, elapsed_ms);
        for _ in 0..frames {
            let next = self.raw_position.map_or(0, |raw| raw.saturating_add(1));
            self.commit(host, next, false);
        }
    }

    /// Effective framerate of the nearest independent ancestor clip that has one
    fn inherited_framerate<H: DisplayHost>(&self, host: &H) -> Option<f64> {
        host.ancestors(self.id())
            .filter_map(|ancestor| host.clip(ancestor))
            .filter(|clip| clip.mode == ClipMode::Independent)
            .find_map(Clip::effective_framerate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Stage;
    use clipkit_timeline::Timeline;

    #[test]
    fn test_no_framerate_steps_once_per_tick() {
        let mut playhead = Playhead::default();
        assert_eq!(playhead.frames_due(None, Some(500.0)), 1);
        assert_eq!(playhead.frames_due(Some(30.0), None), 1);
        assert_eq!(playhead.frames_due(Some(f64::INFINITY), Some(16.0)), 1);
        assert_eq!(playhead.leftover, 0.0);
    }

    #[test]
    fn test_fractional_time_carries_over() {
        let mut playhead = Playhead::default();
        let frames: Vec<u32> = (0..8)
            .map(|_| playhead.frames_due(Some(10.0), Some(25.0)))
            .collect();
        assert_eq!(frames, vec![0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_accumulation_is_lossless() {
        let mut playhead = Playhead::default();
        let mut total = 0u64;
        for _ in 0..1000 {
            total += u64::from(playhead.frames_due(Some(24.0), Some(16.7)));
        }
        let exact = 1000.0 * 16.7 / (1000.0 / 24.0);
        assert!((exact - total as f64).abs() <= 1.0);
    }

    #[test]
    fn test_zero_framerate_holds() {
        let mut playhead = Playhead::default();
        for _ in 0..3 {
            assert_eq!(playhead.frames_due(Some(0.0), Some(100.0)), 0);
        }
        assert_eq!(playhead.frames_due(Some(-5.0), Some(100.0)), 0);
        assert_eq!(playhead.leftover, 0.0);
    }

    #[test]
    fn test_non_finite_elapsed_steps_once() {
        let mut playhead = Playhead::default();
        assert_eq!(playhead.frames_due(Some(10.0), Some(f64::NAN)), 1);
        assert_eq!(playhead.leftover, 0.0);
        let frames: Vec<u32> = (0..4)
            .map(|_| playhead.frames_due(Some(10.0), Some(50.0)))
            .collect();
        assert_eq!(frames, vec![0, 1, 0, 1]);
        assert_eq!(playhead.frames_due(Some(10.0), Some(f64::INFINITY)), 1);
    }

    #[test]
    fn test_large_delta_steps_many_frames() {
        let mut playhead = Playhead::default();
        assert_eq!(playhead.frames_due(Some(10.0), Some(350.0)), 3);
        assert!((playhead.leftover - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_paused_advance_is_inert() {
        let mut stage = Stage::new();
        let mut clip = Clip::new(Timeline::new(10));
        clip.framerate = Some(10.0);
        clip.stop();
        let id = stage.attach_clip(stage.root(), "paused", clip).unwrap();

        stage
            .with_clip(id, |clip, stage| {
                clip.advance(stage, Some(1000.0));
                assert_eq!(clip.raw_position(), None);
                assert_eq!(clip.current_frame(), 0);
                assert_eq!(clip.leftover(), 0.0);
                assert_eq!(clip.effective_framerate(), Some(10.0));
            })
            .unwrap();
    }

    #[test]
    fn test_synced_advance_is_inert() {
        let mut stage = Stage::new();
        let mut clip = Clip::new(Timeline::new(10));
        clip.mode = ClipMode::Synced;
        let id = stage.attach_clip(stage.root(), "synced", clip).unwrap();

        stage
            .with_clip(id, |clip, stage| {
                for _ in 0..5 {
                    clip.advance(stage, Some(100.0));
                }
                assert_eq!(clip.raw_position(), None);
                assert_eq!(clip.current_frame(), 0);
            })
            .unwrap();
    }

    #[test]
    fn test_steps_one_frame_at_a_time() {
        let mut stage = Stage::new();
        let mut clip = Clip::new(Timeline::new(10));
        clip.framerate = Some(10.0);
        let id = stage.attach_clip(stage.root(), "walker", clip).unwrap();

        stage
            .with_clip(id, |clip, stage| {
                clip.advance(stage, Some(300.0));
                assert_eq!(clip.raw_position(), Some(2));
                assert_eq!(clip.current_frame(), 2);
            })
            .unwrap();
    }

    #[test]
    fn test_zero_framerate_clip_does_not_advance() {
        let mut stage = Stage::new();
        let mut clip = Clip::new(Timeline::new(10));
        clip.framerate = Some(0.0);
        let id = stage.attach_clip(stage.root(), "frozen", clip).unwrap();

        for _ in 0..3 {
            stage.tick(Some(100.0));
        }
        let clip = stage.clip(id).unwrap();
        assert_eq!(clip.current_frame(), 0);
        assert_eq!(clip.raw_position(), Some(0));
    }

    #[test]
    fn test_framerate_inherited_from_independent_ancestor() {
        let mut stage = Stage::new();
        let mut parent = Clip::new(Timeline::new(10));
        parent.framerate = Some(12.0);
        let parent_id = stage.attach_clip(stage.root(), "parent", parent).unwrap();
        let child_id = stage
            .attach_clip(parent_id, "child", Clip::new(Timeline::new(10)))
            .unwrap();

        stage.tick(Some(0.0));

        let child = stage.clip(child_id).unwrap();
        assert_eq!(child.effective_framerate(), Some(12.0));
        assert_eq!(child.framerate, None);
    }

    #[test]
    fn test_synced_ancestor_framerate_ignored() {
        let mut stage = Stage::new();
        let mut parent = Clip::new(Timeline::new(10));
        parent.framerate = Some(12.0);
        parent.mode = ClipMode::Synced;
        let parent_id = stage.attach_clip(stage.root(), "parent", parent).unwrap();
        let child_id = stage
            .attach_clip(parent_id, "child", Clip::new(Timeline::new(10)))
            .unwrap();

        stage.tick(Some(0.0));

        assert_eq!(stage.clip(child_id).unwrap().effective_framerate(), None);
    }
}
