// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip and stage errors.

use clipkit_timeline::{NodeId, TimelineError};

/// Error type for clip and stage operations
#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    /// The operation has no defined semantics for live clips
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Node not found (or not a clip where one is required)
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Invalid hierarchy edit
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A document refers to a name it never declares
    #[error("Unknown node in document: {0}")]
    UnknownNode(String),

    /// A document declares the same name twice
    #[error("Duplicate node name in document: {0}")]
    DuplicateName(String),

    /// Document could not be parsed
    #[error("Document parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Document could not be written
    #[error("Document serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Timeline edit failed
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}
