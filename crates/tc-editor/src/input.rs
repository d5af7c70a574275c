//! Pointer and keyboard input.
//!
//! Hosts translate their events into [`InputEvent`]s in stage coordinates.
//! What a node reacts to is its [`InteractionProfile`], derived from the
//! node's variant and role.

use crate::context::EditorContext;
use crate::shortcuts::ShortcutMap;
use tc_core::id::NodeId;
use tc_core::model::{AttrChange, NodeKind, NodeRole, SceneNode};
use tc_render::hit::hit_test;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    DoubleClick { x: f32, y: f32 },
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y } => Some((*x, *y)),
            Self::Key { .. } => None,
        }
    }
}

/// Listeners attached to a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionProfile {
    pub click_select: bool,
    pub double_click_edit: bool,
    pub drag: bool,
    pub transform: bool,
}

impl InteractionProfile {
    pub const NONE: InteractionProfile = InteractionProfile {
        click_select: false,
        double_click_edit: false,
        drag: false,
        transform: false,
    };

    pub fn for_node(node: &SceneNode) -> Self {
        if node.role != NodeRole::Editable {
            return Self::NONE;
        }
        let base = InteractionProfile {
            click_select: true,
            double_click_edit: false,
            drag: node.draggable,
            transform: true,
        };
        match &node.kind {
            NodeKind::Text(_) => InteractionProfile {
                double_click_edit: true,
                ..base
            },
            NodeKind::Image(_) | NodeKind::Rect(_) | NodeKind::MediaGroup(_) => base,
        }
    }
}

/// A node drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub node: NodeId,
    pub last_x: f32,
    pub last_y: f32,
    pub moved: bool,
}

impl EditorContext {
    /// Dispatch one input event. Returns whether it was consumed. Input is
    /// ignored while a history restore is running.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if !self.is_interactive() {
            return false;
        }
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::DoubleClick { x, y } => self.double_click(x, y),
            InputEvent::Key { key, modifiers } => self.key_down(&key, modifiers),
        }
    }

    fn profile_at(&self, x: f32, y: f32) -> Option<(NodeId, InteractionProfile)> {
        let id = hit_test(&self.scene, x, y)?;
        Some((id, self.profile(id).unwrap_or(InteractionProfile::NONE)))
    }

    /// Select whatever editable node is under (x, y), or deselect.
    pub fn click(&mut self, x: f32, y: f32) -> Option<NodeId> {
        match self.profile_at(x, y) {
            Some((id, profile)) if profile.click_select => {
                self.select(id);
                Some(id)
            }
            _ => {
                self.deselect();
                None
            }
        }
    }

    fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if self.text_edit.is_some() {
            self.commit_text_edit();
        }
        let Some(id) = self.click(x, y) else {
            return false;
        };
        if self.profile(id).is_some_and(|p| p.drag) {
            self.begin_gesture();
            self.drag = Some(DragState {
                node: id,
                last_x: x,
                last_y: y,
                moved: false,
            });
        }
        true
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some(mut drag) = self.drag else {
            return false;
        };
        let Some((nx, ny)) = self.scene.get(drag.node).map(|n| (n.x, n.y)) else {
            self.abandon_drag();
            return false;
        };
        let (dx, dy) = (x - drag.last_x, y - drag.last_y);
        self.apply_to(drag.node, AttrChange::Position(nx + dx, ny + dy));
        drag.last_x = x;
        drag.last_y = y;
        drag.moved = true;
        self.drag = Some(drag);
        true
    }

    fn pointer_up(&mut self) -> bool {
        match self.abandon_drag() {
            Some(drag) => {
                if drag.moved {
                    log::debug!("drag: {} moved", drag.node);
                }
                true
            }
            None => false,
        }
    }

    /// End the drag in progress, closing its gesture.
    pub(crate) fn abandon_drag(&mut self) -> Option<DragState> {
        let drag = self.drag.take()?;
        self.end_gesture();
        Some(drag)
    }

    fn double_click(&mut self, x: f32, y: f32) -> bool {
        match self.profile_at(x, y) {
            Some((id, profile)) if profile.double_click_edit => {
                self.begin_text_edit(id).is_some()
            }
            _ => false,
        }
    }

    fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        if self.text_edit.is_some() {
            return self.text_edit_key(key, modifiers.shift);
        }
        match ShortcutMap::resolve(key, modifiers) {
            Some(action) => self.run_shortcut(action),
            None => false,
        }
    }
}
