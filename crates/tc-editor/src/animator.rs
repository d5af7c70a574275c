//! Entrance animation runner.
//!
//! At most one animation runs per node. Applying a new kind cancels the
//! running one and puts the node back at its resting pose first, so
//! animations never leave a permanent transform behind.

use crate::context::EditorContext;
use std::collections::HashMap;
use tc_core::animation::{AnimationHandle, AnimationKind, AnimationPlan, Pose};
use tc_core::id::NodeId;
use tc_core::model::SceneNode;
use tc_core::scene::SceneGraph;

#[derive(Debug, Clone)]
pub struct ActiveAnimation {
    pub handle: AnimationHandle,
    pub kind: AnimationKind,
    pub plan: AnimationPlan,
    /// Clock time of the first tick, once the host has ticked.
    started_ms: Option<f64>,
}

#[derive(Debug, Default)]
pub struct AnimationRunner {
    active: HashMap<NodeId, ActiveAnimation>,
    next_handle: u64,
}

impl AnimationRunner {
    pub fn get(&self, id: NodeId) -> Option<&ActiveAnimation> {
        self.active.get(&id)
    }

    pub fn is_running(&self, id: NodeId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn start(&mut self, id: NodeId, kind: AnimationKind, plan: AnimationPlan) -> AnimationHandle {
        self.next_handle += 1;
        let handle = AnimationHandle(self.next_handle);
        self.active.insert(
            id,
            ActiveAnimation {
                handle,
                kind,
                plan,
                started_ms: None,
            },
        );
        handle
    }

    /// Drop the animation of a node without touching the node.
    pub(crate) fn forget(&mut self, id: NodeId) -> Option<ActiveAnimation> {
        self.active.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }

    /// Put every animating node of `scene` back at its resting pose.
    pub(crate) fn write_rest_poses(&self, scene: &mut SceneGraph) {
        for (id, anim) in &self.active {
            if let Some(node) = scene.get_mut(*id) {
                write_pose(node, anim.plan.rest);
            }
        }
    }
}

fn pose_of(node: &SceneNode) -> Pose {
    Pose {
        x: node.x,
        y: node.y,
        scale_x: node.scale_x,
        scale_y: node.scale_y,
        opacity: node.opacity,
    }
}

fn write_pose(node: &mut SceneNode, pose: Pose) {
    node.x = pose.x;
    node.y = pose.y;
    node.scale_x = pose.scale_x;
    node.scale_y = pose.scale_y;
    node.opacity = pose.opacity;
}

impl EditorContext {
    /// Animate the selected node. See [`EditorContext::animate`].
    pub fn apply_animation(&mut self, kind: AnimationKind) -> Option<AnimationHandle> {
        let id = self.selection.node()?;
        self.animate(id, kind)
    }

    /// Start `kind` on a node, cancelling whatever ran before and resetting
    /// the node to its resting pose. [`AnimationKind::None`] only resets and
    /// returns `None`, as does a missing node.
    pub fn animate(&mut self, id: NodeId, kind: AnimationKind) -> Option<AnimationHandle> {
        let node = self.scene.get_mut(id)?;

        if let Some(previous) = self.animator.forget(id) {
            log::trace!("animation: cancel {} on {id}", previous.kind.as_str());
            write_pose(node, previous.plan.rest);
        }
        node.animation = None;
        if let Some((x, y)) = node.rest_position.take() {
            node.x = x;
            node.y = y;
        }
        self.needs_redraw = true;

        let rest = pose_of(node);
        let plan = kind.plan(rest, node.width)?;
        if kind.moves_node() {
            node.rest_position = Some((rest.x, rest.y));
        }
        let (pose, _) = plan.sample(0.0);
        write_pose(node, pose);

        let handle = self.animator.start(id, kind, plan);
        node.animation = Some(handle);
        log::debug!("animation: {} on {id}", kind.as_str());
        Some(handle)
    }

    /// Advance every running animation to `now_ms`. Returns whether any is
    /// still running afterwards.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.animator.active.is_empty() {
            return false;
        }
        let mut finished = Vec::new();
        for (id, anim) in self.animator.active.iter_mut() {
            let start = *anim.started_ms.get_or_insert(now_ms);
            let (pose, done) = anim.plan.sample(now_ms - start);
            if let Some(node) = self.scene.get_mut(*id) {
                log::trace!("animation: {id} {pose:?}");
                write_pose(node, pose);
                if done {
                    node.animation = None;
                    node.rest_position = None;
                }
            }
            if done {
                finished.push(*id);
            }
        }
        for id in finished {
            self.animator.active.remove(&id);
        }
        self.needs_redraw = true;
        !self.animator.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeMedia;
    use crate::selection::NullPanel;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use tc_core::config::EditorConfig;

    fn editor_with_heading() -> (EditorContext, NodeId) {
        let mut ed = EditorContext::new(
            EditorConfig::default(),
            Box::new(NullPanel),
            Rc::new(FakeMedia),
        );
        let id = ed.add_heading();
        (ed, id)
    }

    fn pose(ed: &EditorContext, id: NodeId) -> Pose {
        pose_of(ed.scene().get(id).unwrap())
    }

    #[test]
    fn slide_then_none_returns_home() {
        let (mut ed, id) = editor_with_heading();
        let home = pose(&ed, id);
        ed.animate(id, AnimationKind::SlideInLeft).unwrap();
        assert!(pose(&ed, id).x < 0.0);
        ed.tick(0.0);
        ed.tick(250.0);

        assert_eq!(ed.animate(id, AnimationKind::None), None);
        assert_eq!(pose(&ed, id), home);
        assert!(!ed.animator().is_running(id));
        assert_eq!(ed.scene().get(id).unwrap().rest_position, None);
    }

    #[test]
    fn zoom_finishes_at_rest() {
        let (mut ed, id) = editor_with_heading();
        let home = pose(&ed, id);
        ed.animate(id, AnimationKind::ZoomIn);
        assert_eq!(pose(&ed, id).scale_x, 0.1);
        assert!(ed.tick(1000.0));
        assert!(!ed.tick(1500.0));
        assert_eq!(pose(&ed, id), home);
        assert_eq!(ed.scene().get(id).unwrap().animation, None);
    }

    #[test]
    fn reapplying_replaces_running_animation() {
        let (mut ed, id) = editor_with_heading();
        let home = pose(&ed, id);
        let first = ed.animate(id, AnimationKind::FadeJiggle).unwrap();
        ed.tick(0.0);
        ed.tick(700.0);
        let second = ed.apply_animation(AnimationKind::ZoomIn).unwrap();
        assert_ne!(first, second);
        assert_eq!(ed.animator().len(), 1);
        assert_eq!(ed.animator().get(id).map(|a| a.plan.rest), Some(home));
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let (mut ed, _) = editor_with_heading();
        ed.deselect();
        assert_eq!(ed.apply_animation(AnimationKind::ZoomIn), None);
        assert_eq!(ed.animate(NodeId::intern("anim-ghost"), AnimationKind::ZoomIn), None);
        assert!(!ed.tick(10.0));
    }

    #[test]
    fn history_records_resting_pose_mid_animation() {
        let (mut ed, id) = editor_with_heading();
        let home = pose(&ed, id);
        ed.animate(id, AnimationKind::SlideInLeft);
        ed.tick(0.0);
        ed.tick(100.0);
        assert_ne!(pose(&ed, id), home);

        ed.add_body();
        assert!(ed.undo());
        assert!(ed.redo());
        assert_eq!(pose(&ed, id), home);
        assert!(!ed.tick(5000.0));
        assert_eq!(pose(&ed, id), home);
    }
}
