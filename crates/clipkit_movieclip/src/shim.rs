// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step interpolation for the `start_position` of nested clips.
//!
//! A start position is a frame index, so tweening it between keyframes would
//! scrub the nested clip through frames nobody placed there. The shim holds
//! the start value until the segment ends.

use clipkit_timeline::{install_plugin, PropValue, TweenPlugin, TweenTarget};
use std::sync::{Arc, OnceLock};

/// Property carrying a nested clip's start position
pub const START_POSITION_PROP: &str = "start_position";

/// Name the shim is registered under
pub const SHIM_NAME: &str = "clipkit.start_position";

/// Plugin that steps `start_position` instead of interpolating it
#[derive(Debug, Clone, Copy, Default)]
pub struct StartPositionShim;

impl StartPositionShim {
    /// Start value until the ratio reaches 1, then the end value
    pub fn step<'v>(start: &'v PropValue, end: &'v PropValue, ratio: f32) -> &'v PropValue {
        if ratio >= 1.0 {
            end
        } else {
            start
        }
    }
}

impl TweenPlugin for StartPositionShim {
    fn name(&self) -> &'static str {
        SHIM_NAME
    }

    fn change(
        &self,
        target: &TweenTarget,
        prop: &str,
        start: &PropValue,
        end: &PropValue,
        ratio: f32,
    ) -> Option<PropValue> {
        if !target.is_nested_clip() || prop != START_POSITION_PROP {
            return None;
        }
        Some(Self::step(start, end, ratio).clone())
    }
}

/// Register the shim with the tween plugin registry. Safe to call repeatedly.
pub fn install() {
    static INSTALLED: OnceLock<bool> = OnceLock::new();
    INSTALLED.get_or_init(|| install_plugin(Arc::new(StartPositionShim)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkit_timeline::{NodeId, VisualTarget};

    #[test]
    fn test_step_holds_start_until_end() {
        let start = PropValue::Int(2);
        let end = PropValue::Int(10);
        for ratio in [0.0, 0.5, 0.999] {
            assert_eq!(StartPositionShim::step(&start, &end, ratio), &start);
        }
        assert_eq!(StartPositionShim::step(&start, &end, 1.0), &end);
    }

    #[test]
    fn test_only_nested_clip_start_position() {
        let shim = StartPositionShim;
        let start = PropValue::Int(0);
        let end = PropValue::Int(8);
        let clip = TweenTarget::Visual(VisualTarget::clip(NodeId::new()));
        let shape = TweenTarget::Visual(VisualTarget::node(NodeId::new()));

        assert_eq!(
            shim.change(&clip, START_POSITION_PROP, &start, &end, 0.5),
            Some(PropValue::Int(0))
        );
        assert_eq!(shim.change(&clip, "x", &start, &end, 0.5), None);
        assert_eq!(shim.change(&shape, START_POSITION_PROP, &start, &end, 0.5), None);
        assert_eq!(shim.change(&TweenTarget::State, START_POSITION_PROP, &start, &end, 0.5), None);
    }

    #[test]
    fn test_install_is_idempotent() {
        install();
        install();
        assert!(clipkit_timeline::plugin::is_installed(SHIM_NAME));
        assert!(!install_plugin(Arc::new(StartPositionShim)));
    }
}
