//! Hit testing: point → node lookup.
//!
//! Walks the layer front-to-back and tests the point in each node's local
//! space, so rotated and scaled nodes hit exactly. Children of composite
//! nodes do not listen on their own: a hit anywhere inside a media group
//! returns the group.

use crate::display::node_affine;
use kurbo::Point;
use tc_core::id::NodeId;
use tc_core::model::SceneNode;
use tc_core::scene::SceneGraph;

/// Find the topmost visible node at stage position (px, py).
/// Returns `None` if only empty stage is hit.
pub fn hit_test(scene: &SceneGraph, px: f32, py: f32) -> Option<NodeId> {
    scene
        .nodes()
        .rev()
        .find(|node| node.visible && contains_point(node, px, py))
        .map(|node| node.id)
}

/// Whether (px, py) lies inside the node's transformed box.
pub fn contains_point(node: &SceneNode, px: f32, py: f32) -> bool {
    let affine = node_affine(node);
    if affine.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = affine.inverse() * Point::new(px as f64, py as f64);
    local.x >= 0.0
        && local.y >= 0.0
        && local.x <= node.width as f64
        && local.y <= node.height as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::color::Color;
    use tc_core::model::{NodeKind, NodeRole, RectProps};

    fn rect(id: &str, x: f32, y: f32, w: f32, h: f32) -> SceneNode {
        SceneNode::new(
            NodeId::intern(id),
            NodeKind::Rect(RectProps::filled(Color::WHITE)),
        )
        .at(x, y)
        .sized(w, h)
    }

    #[test]
    fn topmost_wins() {
        let mut sg = SceneGraph::new();
        sg.add(rect("hit-bg", 0.0, 0.0, 300.0, 550.0).with_role(NodeRole::Background));
        sg.add(rect("hit-a", 10.0, 10.0, 100.0, 100.0));
        sg.add(rect("hit-b", 50.0, 50.0, 100.0, 100.0));

        assert_eq!(hit_test(&sg, 60.0, 60.0), Some(NodeId::intern("hit-b")));
        assert_eq!(hit_test(&sg, 20.0, 20.0), Some(NodeId::intern("hit-a")));
        assert_eq!(hit_test(&sg, 250.0, 500.0), Some(NodeId::intern("hit-bg")));
        assert_eq!(hit_test(&sg, 400.0, 10.0), None);
    }

    #[test]
    fn rotation_is_respected() {
        let mut sg = SceneGraph::new();
        let mut node = rect("hit-rot", 100.0, 100.0, 100.0, 10.0);
        node.rotation = 90.0;
        sg.add(node);
        // Rotated 90° clockwise about (100, 100): now spans x 90..100, y 100..200.
        assert_eq!(hit_test(&sg, 95.0, 150.0), Some(NodeId::intern("hit-rot")));
        assert_eq!(hit_test(&sg, 150.0, 105.0), None);
    }

    #[test]
    fn hidden_and_degenerate_nodes_never_hit() {
        let mut sg = SceneGraph::new();
        let mut hidden = rect("hit-hidden", 0.0, 0.0, 50.0, 50.0);
        hidden.visible = false;
        sg.add(hidden);
        let mut flat = rect("hit-flat", 0.0, 0.0, 50.0, 50.0);
        flat.scale_x = 0.0;
        sg.add(flat);
        assert_eq!(hit_test(&sg, 10.0, 10.0), None);
    }
}
