// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline errors.

use crate::tween::TweenId;

/// Error editing a timeline
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// A label with this name already exists
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// Frame lies past the end of the timeline
    #[error("Frame {frame} is outside a timeline of {duration} frames")]
    FrameOutOfRange {
        /// Requested frame
        frame: u32,
        /// Timeline frame count
        duration: u32,
    },

    /// Tween not found
    #[error("Tween not found: {0:?}")]
    TweenNotFound(TweenId),
}
