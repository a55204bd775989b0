// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline-driven movie clips.
//!
//! A [`Clip`] is a container whose children are not edited directly: every
//! frame its [`Timeline`](clipkit_timeline::Timeline) is resolved into the set
//! of children it shows, their stacking order and their properties.
//!
//! ## Architecture
//!
//! Per tick, a clip:
//! - converts elapsed host time into frame steps ([`playhead`])
//! - commits each raw position to its timeline
//! - resolves the committed frame into managed children ([`reconcile`])
//! - runs the frame actions that fired
//!
//! Clips live in a [`DisplayHost`]; [`Stage`] is the bundled arena host and
//! tick driver. Scenes can be described in RON ([`document`]).

pub mod clip;
pub mod display;
pub mod document;
pub mod error;
mod frame_state;
pub mod playhead;
mod position;
pub mod reconcile;
pub mod shim;
pub mod snapshot;

pub use clip::{Clip, ClipMode, ClipSettings};
pub use display::{ClipEvent, DisplayHost, Node, NodeKind, Stage};
pub use document::{ClipDocument, ClipSpec, ShapeSpec, TweenSpec};
pub use error::ClipError;
pub use playhead::{PlaybackState, Playhead};
pub use reconcile::{ManagedRegistry, ManagedTag};
pub use snapshot::{NodeSnapshot, StageSnapshot};
