// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame resolution: which children a committed position shows.

use crate::display::DisplayHost;
use crate::reconcile::{ManagedRegistry, Reconciler};
use clipkit_timeline::{NodeId, Timeline, TweenTarget};

/// Rebuild the managed-child set of `clip` from the timeline's committed position.
///
/// Runs inside the timeline commit, after tweened properties were applied and
/// before any frame action.
pub(crate) fn resolve<H: DisplayHost>(
    clip: NodeId,
    timeline: &Timeline,
    managed: &mut ManagedRegistry,
    current_frame: &mut u32,
    host: &mut H,
) {
    *current_frame = timeline.position();
    managed.mark_all_candidates();

    let mut reconciler = Reconciler::new(clip, managed, host);
    for tween in timeline.tweens() {
        if tween.is_passive() {
            continue;
        }
        let offset = tween.step_offset();
        match tween.target() {
            TweenTarget::Owner => {}
            TweenTarget::Visual(visual) => reconciler.manage(visual.node, offset),
            TweenTarget::State => match tween.state_list() {
                Some(list) => reconciler.apply_state(list, offset),
                None => tracing::trace!(?clip, tween = ?tween.id, "state tween without a state list"),
            },
        }
    }
    reconciler.sweep();
}

#[cfg(test)]
mod tests {
    use crate::clip::{Clip, ClipMode};
    use crate::display::{DisplayHost, Stage};
    use clipkit_timeline::{
        Keyframe, PropValue, StateAssignment, Timeline, Tween, VisualTarget,
    };

    #[test]
    fn test_motion_targets_follow_keyframes() {
        let mut stage = Stage::new();
        let a = stage.add_shape("a");
        let b = stage.add_shape("b");
        let mut timeline = Timeline::new(6);
        timeline.add_tween(
            Tween::motion(VisualTarget::node(a))
                .with_keyframe(Keyframe::new(0))
                .with_keyframe(Keyframe::new(3).passive()),
        );
        timeline.add_tween(Tween::motion(VisualTarget::node(b)).with_keyframe(Keyframe::new(0)));
        let id = stage.attach_clip(stage.root(), "clip", Clip::new(timeline)).unwrap();

        stage.tick(None);
        assert_eq!(stage.children(id), &[b, a]);

        for _ in 0..3 {
            stage.tick(None);
        }
        // a went passive at frame 3
        assert_eq!(stage.clip(id).unwrap().current_frame(), 3);
        assert_eq!(stage.children(id), &[b]);
        assert!(!stage.clip(id).unwrap().is_managed(a));
    }

    #[test]
    fn test_state_tween_switches_sets() {
        let mut stage = Stage::new();
        let a = stage.add_shape("a");
        let b = stage.add_shape("b");
        let mut timeline = Timeline::new(4);
        timeline.add_tween(
            Tween::state()
                .with_state(0, vec![StateAssignment::new(a).with_prop("alpha", PropValue::Float(0.5))])
                .with_state(2, vec![StateAssignment::new(b)]),
        );
        let id = stage.attach_clip(stage.root(), "clip", Clip::new(timeline)).unwrap();

        stage.tick(None);
        assert_eq!(stage.children(id), &[a]);
        let alpha = stage.node(a).and_then(|n| n.props.get("alpha")).cloned();
        assert_eq!(alpha, Some(PropValue::Float(0.5)));

        stage.tick(None);
        stage.tick(None);
        assert_eq!(stage.children(id), &[b]);
        assert_eq!(stage.parent_of(a), None);
    }

    #[test]
    fn test_state_tween_without_list_is_skipped() {
        let mut stage = Stage::new();
        let mut timeline = Timeline::new(2);
        timeline.add_tween(
            Tween::state().with_keyframe(Keyframe::new(0).with_prop("x", PropValue::Float(1.0))),
        );
        let id = stage.attach_clip(stage.root(), "clip", Clip::new(timeline)).unwrap();

        stage.tick(None);
        assert!(stage.children(id).is_empty());
        assert_eq!(stage.clip(id).unwrap().current_frame(), 0);
    }

    #[test]
    fn test_nested_synced_clip_follows_parent() {
        let mut stage = Stage::new();
        let mut child = Clip::new(Timeline::new(10));
        child.mode = ClipMode::Synced;
        let child_id = stage.add_clip("child", child);

        let mut timeline = Timeline::new(10);
        timeline.add_tween(Tween::motion(VisualTarget::clip(child_id)).with_keyframe(Keyframe::new(0)));
        let parent = stage.attach_clip(stage.root(), "parent", Clip::new(timeline)).unwrap();

        let frames: Vec<(u32, u32)> = (0..4)
            .map(|_| {
                stage.tick(None);
                (
                    stage.clip(parent).unwrap().current_frame(),
                    stage.clip(child_id).unwrap().current_frame(),
                )
            })
            .collect();
        assert_eq!(frames, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_start_position_steps_on_nested_clip() {
        let mut stage = Stage::new();
        let mut child = Clip::new(Timeline::new(20));
        child.mode = ClipMode::SingleFrame;
        let child_id = stage.add_clip("child", child);

        let mut timeline = Timeline::new(5);
        timeline.add_tween(
            Tween::motion(VisualTarget::clip(child_id))
                .with_keyframe(Keyframe::new(0).with_prop("start_position", PropValue::Int(0)))
                .with_keyframe(Keyframe::new(4).with_prop("start_position", PropValue::Int(12))),
        );
        let parent = stage.attach_clip(stage.root(), "parent", Clip::new(timeline)).unwrap();

        let frames: Vec<u32> = (0..5)
            .map(|_| {
                stage.tick(None);
                stage.clip(child_id).unwrap().current_frame()
            })
            .collect();
        assert_eq!(frames, vec![0, 0, 0, 0, 12]);
        assert_eq!(stage.clip(parent).unwrap().current_frame(), 4);
    }

    #[test]
    fn test_reintroduced_child_clip_restarts() {
        let mut stage = Stage::new();
        let child_id = stage.add_clip("child", Clip::new(Timeline::new(20)));

        let mut timeline = Timeline::new(6);
        timeline.add_tween(
            Tween::motion(VisualTarget::clip(child_id))
                .with_keyframe(Keyframe::new(0))
                .with_keyframe(Keyframe::new(2).passive())
                .with_keyframe(Keyframe::new(4)),
        );
        stage.attach_clip(stage.root(), "parent", Clip::new(timeline)).unwrap();

        let frames: Vec<Option<u32>> = (0..6)
            .map(|_| {
                stage.tick(None);
                stage.clip(child_id).unwrap().raw_position()
            })
            .collect();
        // Shown at 0-1, hidden at 2-3 (not ticked), back and restarted at 4
        assert_eq!(frames, vec![Some(0), Some(1), Some(1), Some(1), Some(0), Some(1)]);
    }
}
