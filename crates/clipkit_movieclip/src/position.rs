// SPDX-License-Identifier: MIT OR Apache-2.0
//! Seeking and committing timeline positions.

use crate::clip::{Clip, ClipMode};
use crate::display::DisplayHost;
use crate::frame_state;
use clipkit_timeline::{Action, FrameRef};

impl Clip {
    /// Seek to a frame or label and resume playback.
    ///
    /// Unknown labels are ignored: neither position nor pause state changes.
    pub fn goto_and_play<H: DisplayHost>(&mut self, host: &mut H, target: impl Into<FrameRef>) -> bool {
        let found = self.seek(host, &target.into());
        if found {
            self.play();
        }
        found
    }

    /// Seek to a frame or label and pause.
    ///
    /// Unknown labels are ignored: neither position nor pause state changes.
    pub fn goto_and_stop<H: DisplayHost>(&mut self, host: &mut H, target: impl Into<FrameRef>) -> bool {
        let found = self.seek(host, &target.into());
        if found {
            self.stop();
        }
        found
    }

    /// Jump to a frame or label. Returns `false` if the target does not resolve.
    pub fn seek<H: DisplayHost>(&mut self, host: &mut H, target: &FrameRef) -> bool {
        let Some(raw) = self.timeline.resolve(target) else {
            tracing::debug!(clip = ?self.id(), ?target, "seek target not found");
            return false;
        };
        self.playhead.leftover = 0.0;
        self.commit(host, raw, true);
        true
    }

    /// Bring a clip that has never been positioned, or that follows its
    /// parent, up to date before it is drawn.
    pub fn prepare_frame<H: DisplayHost>(&mut self, host: &mut H) {
        if self.raw_position.is_none() || self.mode != ClipMode::Independent {
            self.seek(host, &FrameRef::Frame(0));
        }
    }

    /// Commit a raw position. Returns `false` when the position is unchanged
    /// and nothing was resolved.
    pub(crate) fn commit<H: DisplayHost>(&mut self, host: &mut H, raw: u32, jump: bool) -> bool {
        let raw = match self.mode {
            ClipMode::Independent => raw,
            ClipMode::SingleFrame => self.start_position,
            ClipMode::Synced => self.start_position.saturating_add(self.synch_offset),
        };
        if self.raw_position == Some(raw) {
            return false;
        }
        self.raw_position = Some(raw);
        self.timeline.set_loop_count(self.loop_count);

        let ignore_actions = !self.actions_enabled || self.mode != ClipMode::Independent;
        let clip = self.id();
        let Self {
            timeline,
            managed,
            current_frame,
            ..
        } = self;
        let commit = timeline.set_position(raw, ignore_actions, jump, host, |timeline, host| {
            frame_state::resolve(clip, timeline, managed, current_frame, host);
        });

        tracing::trace!(?clip, raw, frame = commit.position, jump, "committed position");
        if commit.complete {
            tracing::debug!(?clip, frame = commit.position, "timeline complete");
        }

        self.dispatch(host, commit.actions);
        true
    }

    /// Run frame actions after the frame has been resolved
    fn dispatch<H: DisplayHost>(&mut self, host: &mut H, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Stop => self.stop(),
                Action::Play => self.play(),
                Action::GotoAndPlay(target) => {
                    self.goto_and_play(host, target);
                }
                Action::GotoAndStop(target) => {
                    self.goto_and_stop(host, target);
                }
                Action::Emit(name) => host.emit(self.id(), &name),
            }
        }
    }
}
