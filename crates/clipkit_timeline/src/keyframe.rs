// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for timeline tweens.

use crate::target::StateAssignment;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named property values, in assignment order
pub type PropertyBag = IndexMap<String, PropValue>;

/// Interpolation mode between a keyframe and the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpolationMode {
    /// Constant (step)
    Constant,
    /// Linear interpolation
    #[default]
    Linear,
    /// Quadratic ease in
    EaseIn,
    /// Quadratic ease out
    EaseOut,
    /// Quadratic ease in and out
    EaseInOut,
}

/// Value stored in a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    /// Float value
    Float(f32),
    /// Integer value
    Int(i64),
    /// 2D vector
    Vec2([f32; 2]),
    /// Color (RGBA)
    Color([f32; 4]),
    /// Boolean
    Bool(bool),
    /// Free-form text
    Text(String),
    /// State list applied wholesale by the owning clip
    State(Vec<StateAssignment>),
}

/// A keyframe in a tween
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyframe {
    /// Frame index on the timeline
    pub frame: u32,
    /// Property values at this keyframe
    #[serde(default)]
    pub props: PropertyBag,
    /// Interpolation mode to the next keyframe
    #[serde(default)]
    pub interpolation: InterpolationMode,
    /// While the playhead sits in this keyframe's segment the tween is passive
    #[serde(default)]
    pub passive: bool,
}

impl Keyframe {
    /// Create a new keyframe with no properties
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            props: PropertyBag::new(),
            interpolation: InterpolationMode::Linear,
            passive: false,
        }
    }

    /// Add a property value
    pub fn with_prop(mut self, name: impl Into<String>, value: PropValue) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    /// Mark the segment starting at this keyframe as passive
    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Interpolate Vec2
    pub fn lerp_vec2(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
        [Self::lerp(a[0], b[0], t), Self::lerp(a[1], b[1], t)]
    }

    /// Interpolate Vec4
    pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
            Self::lerp(a[3], b[3], t),
        ]
    }

    /// Map a linear ratio through an easing curve
    pub fn ease(mode: InterpolationMode, t: f32) -> f32 {
        match mode {
            InterpolationMode::Constant => 0.0,
            InterpolationMode::Linear => t,
            InterpolationMode::EaseIn => t * t,
            InterpolationMode::EaseOut => t * (2.0 - t),
            InterpolationMode::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

impl PropValue {
    /// Interpolate between two values at an already-eased ratio.
    ///
    /// Non-numeric values hold the start value. Returns `None` for mismatched types.
    pub fn interpolate(&self, other: &PropValue, t: f32) -> Option<PropValue> {
        match (self, other) {
            (PropValue::Float(a), PropValue::Float(b)) => {
                Some(PropValue::Float(Interpolation::lerp(*a, *b, t)))
            }
            (PropValue::Int(a), PropValue::Int(b)) => {
                let value = Interpolation::lerp(*a as f32, *b as f32, t);
                Some(PropValue::Int(value.round() as i64))
            }
            (PropValue::Vec2(a), PropValue::Vec2(b)) => {
                Some(PropValue::Vec2(Interpolation::lerp_vec2(*a, *b, t)))
            }
            (PropValue::Color(a), PropValue::Color(b)) => {
                Some(PropValue::Color(Interpolation::lerp_vec4(*a, *b, t)))
            }
            (PropValue::Bool(_), PropValue::Bool(_))
            | (PropValue::Text(_), PropValue::Text(_))
            | (PropValue::State(_), PropValue::State(_)) => Some(self.clone()),
            _ => None,
        }
    }

    /// Get as float if possible
    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropValue::Float(v) => Some(*v),
            PropValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Get as a non-negative frame index if possible
    pub fn as_frame(&self) -> Option<u32> {
        match self {
            PropValue::Int(v) => u32::try_from(*v).ok(),
            PropValue::Float(v) if *v >= 0.0 => Some(v.floor() as u32),
            _ => None,
        }
    }

    /// Get as bool if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as a state list if possible
    pub fn as_state(&self) -> Option<&[StateAssignment]> {
        match self {
            PropValue::State(list) => Some(list),
            _ => None,
        }
    }
}
