//! In-place text editing.
//!
//! While a session is open the edited node is hidden and the host shows a
//! text box at the node's screen position, styled with the node's metrics.
//! The draft is written back on commit (Enter without Shift, or blur).

use crate::context::EditorContext;
use tc_core::color::Color;
use tc_core::id::NodeId;
use tc_core::model::{AttrChange, TextAlign};

#[derive(Debug, Clone, PartialEq)]
pub struct TextEditSession {
    pub node: NodeId,
    pub original: String,
    pub draft: String,
    /// Screen position and width of the edit box.
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_family: String,
    pub line_height: f32,
    pub align: TextAlign,
    pub fill: Color,
}

impl EditorContext {
    pub fn text_edit(&self) -> Option<&TextEditSession> {
        self.text_edit.as_ref()
    }

    /// Open an edit session on a text node. Commits any open session first.
    pub fn begin_text_edit(&mut self, id: NodeId) -> Option<&TextEditSession> {
        if self.text_edit.is_some() {
            self.commit_text_edit();
        }
        let node = self.scene.get(id).filter(|n| n.is_editable())?;
        let text = node.as_text()?;
        let zoom = self.zoom;
        let (cx, cy) = self.container_offset;
        let session = TextEditSession {
            node: id,
            original: text.content.clone(),
            draft: text.content.clone(),
            left: cx + node.x * zoom,
            top: cy + node.y * zoom,
            width: node.width * node.scale_x * zoom,
            font_size: text.font_size * node.scale_y * zoom,
            font_family: text.font_family.clone(),
            line_height: text.line_height,
            align: text.align,
            fill: text.fill,
        };

        if let Some(node) = self.scene.get_mut(id) {
            node.visible = false;
        }
        self.deselect();
        log::debug!("text edit: open on {id}");
        self.text_edit = Some(session);
        self.text_edit.as_ref()
    }

    pub fn update_text_draft(&mut self, draft: &str) {
        if let Some(session) = &mut self.text_edit {
            session.draft = draft.to_string();
        }
    }

    /// Route a key press to the open session. Enter without Shift commits;
    /// returns whether the key was consumed.
    pub fn text_edit_key(&mut self, key: &str, shift: bool) -> bool {
        if self.text_edit.is_none() {
            return false;
        }
        if key == "Enter" && !shift {
            self.commit_text_edit();
            return true;
        }
        false
    }

    /// Write the draft back, show the node and record history.
    pub fn commit_text_edit(&mut self) -> Option<NodeId> {
        let session = self.text_edit.take()?;
        let id = session.node;
        let node = self.scene.get_mut(id)?;
        node.visible = true;
        if session.draft != session.original {
            node.apply(AttrChange::Content(session.draft));
            node.refresh_text_metrics();
        }
        self.needs_redraw = true;
        self.commit();
        log::debug!("text edit: commit on {id}");
        Some(id)
    }

    /// Close the session without touching the content.
    pub fn cancel_text_edit(&mut self) {
        if let Some(session) = self.text_edit.take() {
            if let Some(node) = self.scene.get_mut(session.node) {
                node.visible = true;
            }
            self.needs_redraw = true;
        }
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

    fn editor() -> (EditorContext, NodeId) {
        let mut ed = EditorContext::new(
            EditorConfig::default(),
            Box::new(NullPanel),
            Rc::new(FakeMedia),
        );
        let id = ed.add_heading();
        (ed, id)
    }

    #[test]
    fn edit_hides_node_and_enter_commits() {
        let (mut ed, id) = editor();
        ed.set_container_offset(100.0, 40.0);
        let before = ed.history().len();

        let session = ed.begin_text_edit(id).unwrap();
        assert_eq!((session.left, session.top), (150.0, 190.0));
        assert!(!ed.scene().get(id).unwrap().visible);
        assert_eq!(ed.selected(), None);

        ed.update_text_draft("Big Sale");
        assert!(!ed.text_edit_key("Enter", true));
        assert!(ed.text_edit_key("Enter", false));

        let node = ed.scene().get(id).unwrap();
        assert!(node.visible);
        assert_eq!(node.as_text().unwrap().content, "Big Sale");
        assert_eq!(ed.history().len(), before + 1);
        assert!(ed.text_edit().is_none());
    }

    #[test]
    fn only_text_nodes_open_sessions() {
        let (mut ed, _) = editor();
        let rect = ed.add_rect(0.0, 0.0, 10.0, 10.0, Color::BLACK);
        assert!(ed.begin_text_edit(rect).is_none());
        assert!(!ed.text_edit_key("Enter", false));
    }

    #[test]
    fn cancel_restores_visibility() {
        let (mut ed, id) = editor();
        ed.begin_text_edit(id);
        ed.update_text_draft("discarded");
        ed.cancel_text_edit();
        let node = ed.scene().get(id).unwrap();
        assert!(node.visible);
        assert_eq!(node.as_text().unwrap().content, "Click to Edit Headline");
    }
}
