// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline for clipkit.
//!
//! This crate provides the timeline a clip resolves every frame:
//! - Tweens with typed keyframes and step offsets
//! - Labels and seek resolution
//! - Loop policy and frame actions
//! - Process-wide interpolation plugins
//!
//! ## Architecture
//!
//! A [`Timeline`] owns its tweens. Committing a position applies tweened
//! properties to a [`TimelineHost`], runs a resolve callback, and hands back
//! the frame actions that fired so the caller can run them last.

pub mod error;
pub mod keyframe;
pub mod plugin;
pub mod target;
pub mod timeline;
pub mod tween;

pub use error::TimelineError;
pub use keyframe::{Interpolation, InterpolationMode, Keyframe, PropValue, PropertyBag};
pub use plugin::{install_plugin, TweenPlugin};
pub use target::{NodeId, StateAssignment, TweenTarget, VisualTarget};
pub use timeline::{FrameCommit, FrameRef, Label, Timeline, TimelineHost, LOOP_FOREVER};
pub use tween::{Action, ActionMarker, Tween, TweenId, STATE_PROP};
