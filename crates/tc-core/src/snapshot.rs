//! Serialized scene snapshots backing the undo history.
//!
//! A snapshot is the MessagePack encoding of the ordered node tree. Runtime
//! state (selection handles, overlays, running animations) never enters it.

use crate::error::EditorError;
use crate::model::SceneNode;
use crate::scene::SceneGraph;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bumped whenever the encoded layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub node: SceneNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

/// The decoded form of a snapshot: top-level nodes back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub version: u32,
    pub nodes: Vec<SnapshotNode>,
}

impl SceneSnapshot {
    pub fn capture(scene: &SceneGraph) -> Self {
        let nodes = scene
            .layer()
            .iter()
            .map(|&idx| capture_node(scene, idx))
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            nodes,
        }
    }

    /// Build a fresh scene graph from this snapshot.
    pub fn rebuild(&self) -> SceneGraph {
        let mut scene = SceneGraph::new();
        for entry in &self.nodes {
            let idx = scene.add(entry.node.clone());
            rebuild_children(&mut scene, idx, &entry.children);
        }
        scene
    }

    /// Every node in the snapshot, depth first.
    pub fn walk(&self) -> Vec<&SceneNode> {
        fn visit<'a>(entries: &'a [SnapshotNode], out: &mut Vec<&'a SceneNode>) {
            for e in entries {
                out.push(&e.node);
                visit(&e.children, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.nodes, &mut out);
        out
    }
}

fn capture_node(scene: &SceneGraph, idx: NodeIndex) -> SnapshotNode {
    SnapshotNode {
        node: scene.node(idx).clone(),
        children: scene
            .children(idx)
            .iter()
            .map(|&c| capture_node(scene, c))
            .collect(),
    }
}

fn rebuild_children(scene: &mut SceneGraph, parent: NodeIndex, children: &[SnapshotNode]) {
    for child in children {
        let idx = scene.add_child(parent, child.node.clone());
        rebuild_children(scene, idx, &child.children);
    }
}

/// One immutable history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<[u8]>);

impl Snapshot {
    pub fn encode(scene: &SceneGraph) -> Result<Self, EditorError> {
        let snap = SceneSnapshot::capture(scene);
        let bytes =
            rmp_serde::to_vec_named(&snap).map_err(|e| EditorError::Snapshot(e.to_string()))?;
        Ok(Snapshot(bytes.into()))
    }

    pub fn decode(&self) -> Result<SceneSnapshot, EditorError> {
        let snap: SceneSnapshot =
            rmp_serde::from_slice(&self.0).map_err(|e| EditorError::Snapshot(e.to_string()))?;
        if snap.version != SNAPSHOT_VERSION {
            return Err(EditorError::Snapshot(format!(
                "unsupported snapshot version {}",
                snap.version
            )));
        }
        Ok(snap)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
