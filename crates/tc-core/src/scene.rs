use crate::id::NodeId;
use crate::model::{NodeRole, SceneNode};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// The live scene: a z-ordered layer of top-level nodes, each of which may
/// own an ordered list of children (media group parts).
///
/// Edges go from parent → child. The layer order is back-to-front, so the
/// last entry is drawn on top and hit first.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    /// The underlying directed graph.
    pub graph: StableDiGraph<SceneNode, ()>,

    /// Index from NodeId → NodeIndex for fast lookup.
    id_index: HashMap<NodeId, NodeIndex>,

    /// Top-level nodes, back to front.
    layer: Vec<NodeIndex>,

    /// Children of composite nodes, back to front.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.is_empty()
    }

    /// Add a node on top of the layer. Returns the new node's index.
    pub fn add(&mut self, node: SceneNode) -> NodeIndex {
        let idx = self.insert_node(node);
        self.layer.push(idx);
        idx
    }

    /// Add a node at z-position `pos` (clamped to the layer length).
    pub fn insert_at(&mut self, pos: usize, node: SceneNode) -> NodeIndex {
        let idx = self.insert_node(node);
        let pos = pos.min(self.layer.len());
        self.layer.insert(pos, idx);
        idx
    }

    /// Add a node as the topmost child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let idx = self.insert_node(node);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        idx
    }

    fn insert_node(&mut self, node: SceneNode) -> NodeIndex {
        let id = node.id;
        if let Some(stale) = self.id_index.get(&id).copied() {
            log::warn!("scene: replacing duplicate id {id}");
            self.remove_index(stale);
        }
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        idx
    }

    /// Remove a node and its whole subtree. Returns the removed node.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let idx = self.index_of(id)?;
        self.remove_index(idx)
    }

    fn remove_index(&mut self, idx: NodeIndex) -> Option<SceneNode> {
        if let Some(children) = self.child_order.remove(&idx) {
            for child in children {
                self.remove_index(child);
            }
        }
        match self.parent(idx) {
            Some(parent) => {
                if let Some(order) = self.child_order.get_mut(&parent) {
                    order.retain(|&c| c != idx);
                }
            }
            None => self.layer.retain(|&i| i != idx),
        }
        let removed = self.graph.remove_node(idx);
        if let Some(node) = &removed {
            self.id_index.remove(&node.id);
        }
        removed
    }

    /// Drop every node. Returns the top-level nodes back to front.
    pub fn clear(&mut self) -> Vec<SceneNode> {
        let layer = std::mem::take(&mut self.layer);
        let drained = layer
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect();
        self.graph.clear();
        self.id_index.clear();
        self.child_order.clear();
        drained
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Look up a node mutably by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &SceneNode {
        &self.graph[idx]
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Children of a node, back to front.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map_or(&[], Vec::as_slice)
    }

    /// Top-level node indices, back to front.
    pub fn layer(&self) -> &[NodeIndex] {
        &self.layer
    }

    /// Top-level nodes, back to front.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &SceneNode> + '_ {
        self.layer.iter().map(|&idx| &self.graph[idx])
    }

    /// Top-level ids, back to front.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes().map(|n| n.id).collect()
    }

    /// Ids of every selectable node, back to front.
    pub fn editable_ids(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.is_editable())
            .map(|n| n.id)
            .collect()
    }

    pub fn background(&self) -> Option<NodeId> {
        self.nodes().find(|n| n.is_background()).map(|n| n.id)
    }

    /// Position of a top-level node in the layer (0 = back).
    pub fn z_index(&self, id: NodeId) -> Option<usize> {
        let idx = self.index_of(id)?;
        self.layer.iter().position(|&i| i == idx)
    }

    /// A fresh id with the given prefix not used in this scene.
    pub fn fresh_id(&self, prefix: &str) -> NodeId {
        loop {
            let id = NodeId::generate(prefix);
            if !self.contains(id) {
                return id;
            }
        }
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    /// Lowest z-position an editable node may take: background nodes stay
    /// underneath everything.
    fn floor(&self) -> usize {
        self.nodes()
            .take_while(|n| n.role == NodeRole::Background)
            .count()
    }

    /// Move a node to the bottom of the layer, below any background.
    pub fn pin_to_bottom(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.z_index(id) else {
            return false;
        };
        if pos == 0 {
            return false;
        }
        self.move_in_layer(pos, 0)
    }

    /// Move a node one step forward in z-order. Returns true if the z-order
    /// changed.
    pub fn bring_forward(&mut self, id: NodeId) -> bool {
        match self.z_index(id) {
            Some(pos) if pos + 1 < self.layer.len() => self.move_in_layer(pos, pos + 1),
            _ => false,
        }
    }

    /// Move a node one step backward in z-order. Returns true if the z-order
    /// changed.
    pub fn send_backward(&mut self, id: NodeId) -> bool {
        let floor = self.floor();
        match self.z_index(id) {
            Some(pos) if pos > floor => self.move_in_layer(pos, pos - 1),
            _ => false,
        }
    }

    /// Move a node to the top of the layer.
    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        let last = self.layer.len().saturating_sub(1);
        match self.z_index(id) {
            Some(pos) if pos < last => self.move_in_layer(pos, last),
            _ => false,
        }
    }

    /// Move a node to the back of the layer, just above the background.
    pub fn send_to_back(&mut self, id: NodeId) -> bool {
        let floor = self.floor();
        match self.z_index(id) {
            Some(pos) if pos > floor => self.move_in_layer(pos, floor),
            _ => false,
        }
    }

    fn move_in_layer(&mut self, from: usize, to: usize) -> bool {
        let idx = self.layer.remove(from);
        self.layer.insert(to, idx);
        true
    }
}
