//! The editor context: the one object that owns the live scene and every
//! piece of editor state around it.
//!
//! Hosts hold it as a [`SharedEditor`] so async loaders can re-borrow it
//! between suspension points. No borrow is ever held across an `.await`.

use crate::animator::AnimationRunner;
use crate::history::HistoryStore;
use crate::input::{DragState, InteractionProfile};
use crate::media::{MediaBackend, MediaOverlay, MediaRegistry};
use crate::selection::{PanelDescription, PropertyPanel, Selection};
use crate::text_edit::TextEditSession;
use futures::future::AbortHandle;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tc_core::color::Color;
use tc_core::config::EditorConfig;
use tc_core::geometry::{Viewport, fit_contain, fit_shrink};
use tc_core::id::NodeId;
use tc_core::model::{
    AttrChange, AttrValue, BitmapInfo, EMOJI_FONT_FAMILY, ImageProps, NodeKind, RectProps,
    SceneNode, TextAlign, TextProps,
};
use tc_core::scene::SceneGraph;
use tc_core::snapshot::Snapshot;
use tc_render::display::{DisplayList, build_display_list};
use tc_render::hit::hit_test;

pub type SharedEditor = Rc<RefCell<EditorContext>>;

pub const WELCOME_TEXT: &str = "Welcome to Twin Clouds Editor!";
pub const HEADING_TEXT: &str = "Click to Edit Headline";
pub const BODY_TEXT: &str = "Add supporting text here...";

/// Notifications for the host, drained with [`EditorContext::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    TemplateLoaded {
        key: String,
        inserted: usize,
        failed: usize,
    },
    ResourceFailed {
        source_ref: String,
        reason: String,
    },
    SelectionChanged(Option<NodeId>),
    PlaybackChanged {
        id: NodeId,
        playing: bool,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
}

pub struct EditorContext {
    pub(crate) config: EditorConfig,
    pub(crate) scene: SceneGraph,
    pub(crate) stage: Viewport,
    pub(crate) zoom: f32,
    pub(crate) background: Color,
    pub(crate) selection: Selection,
    /// Node the transform handles are attached to.
    pub(crate) handles: Option<NodeId>,
    pub(crate) history: HistoryStore,
    pub(crate) media: MediaRegistry,
    pub(crate) media_backend: Rc<dyn MediaBackend>,
    pub(crate) animator: AnimationRunner,
    pub(crate) overlay: MediaOverlay,
    /// Interaction listeners per node, re-derived on every restore.
    pub(crate) profiles: HashMap<NodeId, InteractionProfile>,
    /// Decoded bitmaps by source reference.
    pub(crate) bitmaps: HashMap<String, BitmapInfo>,
    pub(crate) panel: Box<dyn PropertyPanel>,
    /// Screen position of the canvas container's top-left corner.
    pub(crate) container_offset: (f32, f32),
    pub(crate) needs_redraw: bool,
    /// Set while a history restore is rebuilding the scene.
    pub(crate) restoring: bool,
    pub(crate) events: VecDeque<EditorEvent>,
    /// Cancellation token of the template load in flight.
    pub(crate) pending_load: Option<AbortHandle>,
    pub(crate) drag: Option<DragState>,
    pub(crate) text_edit: Option<TextEditSession>,
    pub(crate) welcome: Option<NodeId>,
}

impl EditorContext {
    /// A fresh editor showing the welcome text, recorded as the first
    /// history entry.
    pub fn new(
        config: EditorConfig,
        panel: Box<dyn PropertyPanel>,
        media_backend: Rc<dyn MediaBackend>,
    ) -> Self {
        let stage = config.stage();
        let mut ctx = Self {
            stage,
            zoom: 1.0,
            background: config.default_background,
            scene: SceneGraph::new(),
            selection: Selection::Unselected,
            handles: None,
            history: HistoryStore::new(config.history_cap),
            media: MediaRegistry::default(),
            media_backend,
            animator: AnimationRunner::default(),
            overlay: MediaOverlay::hidden(config.overlay_width, config.overlay_height),
            profiles: HashMap::new(),
            bitmaps: HashMap::new(),
            panel,
            container_offset: (0.0, 0.0),
            needs_redraw: true,
            restoring: false,
            events: VecDeque::new(),
            pending_load: None,
            drag: None,
            text_edit: None,
            welcome: None,
            config,
        };

        let welcome = ctx.add_text(WELCOME_TEXT, 30.0, Color::WHITE, 30.0, 100.0, TextAlign::Left);
        ctx.welcome = Some(welcome);
        ctx.commit();
        ctx.describe_selection();
        ctx
    }

    pub fn into_shared(self) -> SharedEditor {
        Rc::new(RefCell::new(self))
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn stage(&self) -> Viewport {
        self.stage
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection.node()
    }

    pub fn handles(&self) -> Option<NodeId> {
        self.handles
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn media(&self) -> &MediaRegistry {
        &self.media
    }

    pub fn overlay(&self) -> &MediaOverlay {
        &self.overlay
    }

    pub fn animator(&self) -> &AnimationRunner {
        &self.animator
    }

    pub fn bitmap(&self, source: &str) -> Option<&BitmapInfo> {
        self.bitmaps.get(source)
    }

    pub fn profile(&self, id: NodeId) -> Option<InteractionProfile> {
        self.profiles.get(&id).copied()
    }

    pub fn welcome(&self) -> Option<NodeId> {
        self.welcome.filter(|id| self.scene.contains(*id))
    }

    /// Whether input may mutate the scene right now.
    pub fn is_interactive(&self) -> bool {
        !self.restoring
    }

    pub fn display_list(&self) -> DisplayList {
        build_display_list(&self.scene, self.stage, self.background, self.handles)
    }

    /// Consume the pending redraw request. Scenes with live video frames
    /// always want the next frame.
    pub fn take_redraw(&mut self) -> bool {
        let live = self.media.has_video();
        std::mem::take(&mut self.needs_redraw) || live
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn push_event(&mut self, event: EditorEvent) {
        self.events.push_back(event);
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Record the live scene as one history entry. Nodes mid-animation are
    /// recorded at their resting pose. Inside a gesture this only marks the
    /// gesture dirty.
    pub fn commit(&mut self) {
        if self.restoring {
            return;
        }
        if self.history.in_batch() {
            self.history.mark_dirty();
            return;
        }
        let encoded = if self.animator.is_empty() {
            Snapshot::encode(&self.scene)
        } else {
            let mut resting = self.scene.clone();
            self.animator.write_rest_poses(&mut resting);
            Snapshot::encode(&resting)
        };
        match encoded {
            Ok(snapshot) => {
                self.history.record(snapshot);
                self.push_event(EditorEvent::HistoryChanged {
                    can_undo: self.history.can_undo(),
                    can_redo: self.history.can_redo(),
                });
            }
            Err(e) => log::warn!("history: {e}"),
        }
    }

    /// Start a continuous interaction: edits apply live, history waits for
    /// the matching [`EditorContext::end_gesture`].
    pub fn begin_gesture(&mut self) {
        self.history.begin_batch();
    }

    pub fn end_gesture(&mut self) {
        if self.history.end_batch() {
            self.commit();
        }
    }

    pub fn undo(&mut self) -> bool {
        if self.restoring {
            return false;
        }
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.restoring {
            return false;
        }
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    /// Replace the whole live scene with a snapshot. Media and animations of
    /// the discarded nodes are released first, then listeners and media
    /// elements are re-bound for the rebuilt nodes.
    fn restore(&mut self, snapshot: &Snapshot) {
        let decoded = match snapshot.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("history: cannot restore: {e}");
                return;
            }
        };
        self.restoring = true;
        self.text_edit = None;
        self.drag = None;
        self.history.reset_batch();
        self.release_all();
        self.scene = decoded.rebuild();
        self.rebind();
        self.deselect();
        self.restoring = false;
        log::debug!("history: restored {} nodes", self.scene.len());
        self.push_event(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    /// Re-attach interaction profiles and fresh (paused) media elements.
    fn rebind(&mut self) {
        self.profiles.clear();
        let nodes: Vec<SceneNode> = self.scene.nodes().cloned().collect();
        for node in &nodes {
            self.profiles
                .insert(node.id, InteractionProfile::for_node(node));
            if let NodeKind::MediaGroup(m) = &node.kind {
                let element = self.media_backend.create_element(m.media_type, &m.source);
                self.media.insert(node.id, m.media_type, element);
            }
        }
    }

    // ─── Scene mutation ──────────────────────────────────────────────────

    /// Insert a node on top of the layer. Does not record history.
    pub(crate) fn insert(&mut self, node: SceneNode) -> NodeId {
        let id = node.id;
        log::debug!("scene: add {} {id}", node.kind.variant_name());
        self.profiles.insert(id, InteractionProfile::for_node(&node));
        self.scene.add(node);
        self.needs_redraw = true;
        id
    }

    /// Detach a node, releasing its media element and animation and any
    /// handle pointing at it.
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<SceneNode> {
        if self.drag.is_some_and(|d| d.node == id) {
            self.abandon_drag();
        }
        if self.media.release(id) {
            log::debug!("media: released element of {id}");
        }
        self.animator.forget(id);
        if self.handles == Some(id) {
            self.handles = None;
        }
        self.profiles.remove(&id);
        let removed = self.scene.remove(id);
        if removed.is_some() {
            log::debug!("scene: remove {id}");
            self.needs_redraw = true;
        }
        removed
    }

    fn release_all(&mut self) {
        self.media.release_all();
        self.animator.clear();
        self.handles = None;
        self.overlay.hide();
    }

    /// Drop every node, releasing media and animations.
    pub(crate) fn clear_scene(&mut self) {
        self.release_all();
        self.scene.clear();
        self.profiles.clear();
        self.selection = Selection::Unselected;
        self.needs_redraw = true;
    }

    pub(crate) fn remove_welcome(&mut self) {
        if let Some(id) = self.welcome.take() {
            self.remove_node(id);
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select an editable node. Anything else deselects.
    pub fn select(&mut self, id: NodeId) -> bool {
        let editable = self.scene.get(id).is_some_and(|n| n.is_editable());
        if !editable {
            self.deselect();
            return false;
        }
        self.selection = Selection::Selected(id);
        self.handles = Some(id);
        self.describe_selection();
        self.update_overlay();
        self.needs_redraw = true;
        self.push_event(EditorEvent::SelectionChanged(Some(id)));
        true
    }

    pub fn deselect(&mut self) {
        let was = self.selection.node();
        self.selection = Selection::Unselected;
        self.handles = None;
        self.overlay.hide();
        self.describe_selection();
        self.panel.clear_active_controls();
        self.needs_redraw = true;
        if was.is_some() {
            self.push_event(EditorEvent::SelectionChanged(None));
        }
    }

    /// Push the current selection to the property panel.
    pub(crate) fn describe_selection(&mut self) {
        let description = match self.selection.node().and_then(|id| self.scene.get(id)) {
            Some(node) => PanelDescription::for_node(node),
            None => PanelDescription::canvas(self.background, self.stage),
        };
        self.panel.describe(&description);
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.node() else {
            return false;
        };
        self.remove_node(id);
        self.deselect();
        self.commit();
        true
    }

    /// Clone the selection offset by the configured amount, then deselect.
    pub fn duplicate_selected(&mut self) -> Option<NodeId> {
        let id = self.selection.node()?;
        let idx = self.scene.index_of(id)?;
        let offset = self.config.duplicate_offset;
        let copy = self.scene.node(idx).duplicate(offset, offset);
        let children: Vec<SceneNode> = self
            .scene
            .children(idx)
            .iter()
            .map(|&c| {
                let part = self.scene.node(c);
                let mut dup = part.duplicate(0.0, 0.0);
                dup.role = part.role;
                dup.draggable = part.draggable;
                dup
            })
            .collect();

        let copy_id = copy.id;
        if let NodeKind::MediaGroup(m) = &copy.kind {
            let element = self.media_backend.create_element(m.media_type, &m.source);
            self.media.insert(copy_id, m.media_type, element);
        }
        self.insert(copy);
        if let Some(parent) = self.scene.index_of(copy_id) {
            for child in children {
                self.scene.add_child(parent, child);
            }
        }
        self.deselect();
        self.commit();
        Some(copy_id)
    }

    // ─── Attribute edits ─────────────────────────────────────────────────

    /// Apply an edit to a node without recording history.
    pub fn apply_to(&mut self, id: NodeId, change: AttrChange) -> Option<AttrValue> {
        let geometric = matches!(
            change,
            AttrChange::Position(..)
                | AttrChange::Size(..)
                | AttrChange::Rotation(_)
                | AttrChange::Scale(..)
        );
        let value = self.scene.get_mut(id)?.apply(change)?;
        self.history.mark_dirty();
        self.needs_redraw = true;
        if self.selection.is_selected(id) {
            self.describe_selection();
            if geometric {
                self.update_overlay();
            }
        }
        Some(value)
    }

    /// Live edit of the selection (slider input). History waits for a
    /// commit or the end of the surrounding gesture.
    pub fn preview_attr(&mut self, change: AttrChange) -> Option<AttrValue> {
        let id = self.selection.node()?;
        self.apply_to(id, change)
    }

    /// Committed edit of the selection.
    pub fn set_attr(&mut self, change: AttrChange) -> Option<AttrValue> {
        let value = self.preview_attr(change)?;
        self.commit();
        Some(value)
    }

    fn selected_text(&self) -> Option<&TextProps> {
        self.selection
            .node()
            .and_then(|id| self.scene.get(id))
            .and_then(SceneNode::as_text)
    }

    pub fn toggle_bold(&mut self) -> Option<AttrValue> {
        let style = self.selected_text()?.font_style.toggled_bold();
        self.set_attr(AttrChange::FontStyle(style))
    }

    pub fn toggle_italic(&mut self) -> Option<AttrValue> {
        let style = self.selected_text()?.font_style.toggled_italic();
        self.set_attr(AttrChange::FontStyle(style))
    }

    pub fn increase_font_size(&mut self) -> Option<AttrValue> {
        let size = self.selected_text()?.font_size + 2.0;
        self.set_attr(AttrChange::FontSize(size))
    }

    pub fn toggle_shadow(&mut self, on: bool) -> Option<AttrValue> {
        self.set_attr(AttrChange::Shadow(on))
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    fn reorder(&mut self, op: fn(&mut SceneGraph, NodeId) -> bool) -> bool {
        let Some(id) = self.selection.node() else {
            return false;
        };
        if !op(&mut self.scene, id) {
            return false;
        }
        self.needs_redraw = true;
        self.commit();
        true
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.reorder(SceneGraph::bring_to_front)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.reorder(SceneGraph::send_to_back)
    }

    pub fn bring_forward(&mut self) -> bool {
        self.reorder(SceneGraph::bring_forward)
    }

    pub fn send_backward(&mut self) -> bool {
        self.reorder(SceneGraph::send_backward)
    }

    // ─── Content adding ──────────────────────────────────────────────────

    /// Add a word-wrapped text node. Does not record or select.
    pub fn add_text(
        &mut self,
        content: &str,
        font_size: f32,
        fill: Color,
        x: f32,
        y: f32,
        align: TextAlign,
    ) -> NodeId {
        let mut props = TextProps::new(content, font_size, fill);
        props.align = align;
        props.wrap_width = Some((self.stage.width - 100.0).max(1.0));
        let id = self.scene.fresh_id("text");
        let mut node = SceneNode::new(id, NodeKind::Text(props)).at(x, y);
        node.refresh_text_metrics();
        self.insert(node)
    }

    fn add_text_preset(&mut self, content: &str, font_size: f32) -> NodeId {
        let id = self.add_text(content, font_size, Color::WHITE, 50.0, 150.0, TextAlign::Left);
        self.commit();
        self.select(id);
        id
    }

    pub fn add_heading(&mut self) -> NodeId {
        self.add_text_preset(HEADING_TEXT, 36.0)
    }

    pub fn add_body(&mut self) -> NodeId {
        self.add_text_preset(BODY_TEXT, 18.0)
    }

    pub fn add_emoji(&mut self, emoji: &str) -> NodeId {
        let size = 100.0;
        let mut props = TextProps::new(emoji, size, Color::WHITE);
        props.font_family = EMOJI_FONT_FAMILY.to_string();
        let id = self.scene.fresh_id("text");
        let mut node = SceneNode::new(id, NodeKind::Text(props)).at(
            self.stage.width / 2.0 - size / 2.0,
            self.stage.height / 2.0 - size / 2.0,
        );
        node.refresh_text_metrics();
        self.insert(node);
        self.commit();
        self.select(id);
        id
    }

    /// Add a rectangle behind every other editable node.
    pub fn add_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Color) -> NodeId {
        let id = self.scene.fresh_id("rect");
        let node = SceneNode::new(id, NodeKind::Rect(RectProps::filled(fill)))
            .at(x, y)
            .sized(width, height);
        self.insert(node);
        self.scene.send_to_back(id);
        self.commit();
        id
    }

    fn image_node(&mut self, bitmap: &BitmapInfo, width: f32, height: f32) -> SceneNode {
        self.bitmaps.insert(bitmap.source.clone(), bitmap.clone());
        let (x, y) = self.stage.centered(width, height);
        let id = self.scene.fresh_id("image");
        SceneNode::new(
            id,
            NodeKind::Image(ImageProps {
                source: bitmap.source.clone(),
                fill_pattern: None,
            }),
        )
        .at(x, y)
        .sized(width, height)
    }

    /// Add an uploaded image, shrunk to fit the configured share of the
    /// stage and centred.
    pub fn add_image(&mut self, bitmap: &BitmapInfo) -> NodeId {
        let ratio = self.config.image_fit_ratio;
        let (w, h) = fit_shrink(
            bitmap.width,
            bitmap.height,
            self.stage.width * ratio,
            self.stage.height * ratio,
        );
        let node = self.image_node(bitmap, w, h);
        let id = self.insert(node);
        self.remove_welcome();
        self.commit();
        id
    }

    /// Add a single-image template: fitted to the stage, centred, selected.
    pub fn add_template_image(&mut self, bitmap: &BitmapInfo) -> NodeId {
        let (w, h) = fit_contain(
            bitmap.width,
            bitmap.height,
            self.stage.width,
            self.stage.height,
        );
        let node = self.image_node(bitmap, w, h);
        let id = self.insert(node);
        self.remove_welcome();
        self.select(id);
        self.commit();
        id
    }

    /// Drop an image at stage position (x, y). Placeholders take it as
    /// their fill; anywhere else it becomes a new image.
    pub fn drop_image(&mut self, bitmap: &BitmapInfo, x: f32, y: f32) -> NodeId {
        if let Some(target) = hit_test(&self.scene, x, y).filter(NodeId::is_drop_placeholder) {
            self.bitmaps.insert(bitmap.source.clone(), bitmap.clone());
            if let Some(node) = self.scene.get_mut(target) {
                match &mut node.kind {
                    NodeKind::Rect(r) => r.fill_pattern = Some(bitmap.source.clone()),
                    NodeKind::Image(img) => img.fill_pattern = Some(bitmap.source.clone()),
                    _ => return self.add_image(bitmap),
                }
                log::debug!("scene: {target} filled with {}", bitmap.source);
                self.needs_redraw = true;
                self.commit();
                return target;
            }
        }
        self.add_image(bitmap)
    }

    // ─── Stage ───────────────────────────────────────────────────────────

    pub fn resize_stage(&mut self, width: f32, height: f32) {
        self.stage = Viewport::new(width, height);
        self.needs_redraw = true;
        if self.selection.node().is_none() {
            self.describe_selection();
        }
        self.update_overlay();
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.zoom = (self.zoom * self.config.zoom_step_in).min(self.config.zoom_max);
        self.update_overlay();
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.zoom = (self.zoom * self.config.zoom_step_out).max(self.config.zoom_min);
        self.update_overlay();
        self.zoom
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
        self.needs_redraw = true;
        if self.selection.node().is_none() {
            self.describe_selection();
        }
    }

    pub fn set_container_offset(&mut self, left: f32, top: f32) {
        self.container_offset = (left, top);
        self.update_overlay();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeMedia;
    use crate::selection::NullPanel;
    use pretty_assertions::assert_eq;

    fn editor() -> EditorContext {
        EditorContext::new(
            EditorConfig::default(),
            Box::new(NullPanel),
            Rc::new(FakeMedia::default()),
        )
    }

    #[test]
    fn fresh_editor_has_welcome_and_one_entry() {
        let ed = editor();
        assert_eq!(ed.scene().len(), 1);
        assert!(ed.welcome().is_some());
        assert_eq!(ed.history().len(), 1);
        assert!(!ed.history().can_undo());
    }

    #[test]
    fn only_editable_nodes_select() {
        let mut ed = editor();
        let bg = SceneNode::new(
            NodeId::intern("ctx-bg"),
            NodeKind::Rect(RectProps::filled(Color::BLACK)),
        )
        .with_role(tc_core::model::NodeRole::Background);
        ed.insert(bg);
        assert!(!ed.select(NodeId::intern("ctx-bg")));
        assert_eq!(ed.selected(), None);
        assert!(!ed.select(NodeId::intern("ctx-missing")));
    }

    #[test]
    fn structural_no_ops_do_nothing() {
        let mut ed = editor();
        let entries = ed.history().len();
        assert!(!ed.delete_selected());
        assert_eq!(ed.duplicate_selected(), None);
        assert_eq!(ed.set_attr(AttrChange::Opacity(0.2)), None);
        assert!(!ed.bring_to_front());
        assert_eq!(ed.history().len(), entries);
    }

    #[test]
    fn rect_goes_behind_text() {
        let mut ed = editor();
        let heading = ed.add_heading();
        let rect = ed.add_rect(0.0, 0.0, 10.0, 10.0, Color::WHITE);
        assert_eq!(ed.scene().z_index(rect), Some(0));
        assert!(ed.scene().z_index(heading) > ed.scene().z_index(rect));
    }

    #[test]
    fn duplicate_offsets_and_deselects() {
        let mut ed = editor();
        let id = ed.add_body();
        let copy = ed.duplicate_selected().unwrap();
        let (a, b) = (ed.scene().get(id).unwrap(), ed.scene().get(copy).unwrap());
        assert_eq!((b.x - a.x, b.y - a.y), (20.0, 20.0));
        assert_eq!(ed.selected(), None);
    }

    #[test]
    fn toolbar_toggles_commit_once_each() {
        let mut ed = editor();
        ed.add_heading();
        let before = ed.history().len();
        ed.toggle_bold();
        ed.toggle_italic();
        assert_eq!(
            ed.increase_font_size(),
            Some(AttrValue::Number(38.0))
        );
        assert_eq!(ed.history().len(), before + 3);
        assert_eq!(
            ed.selected_text().map(|t| t.font_style),
            Some(tc_core::model::FontStyle::BoldItalic)
        );
    }

    #[test]
    fn gesture_records_once() {
        let mut ed = editor();
        ed.add_heading();
        let before = ed.history().len();
        ed.begin_gesture();
        for v in [0.9, 0.7, 0.5] {
            ed.preview_attr(AttrChange::Opacity(v));
        }
        ed.end_gesture();
        assert_eq!(ed.history().len(), before + 1);

        ed.begin_gesture();
        ed.end_gesture();
        assert_eq!(ed.history().len(), before + 1);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut ed = editor();
        for _ in 0..20 {
            ed.zoom_in();
        }
        assert_eq!(ed.zoom(), 2.0);
        for _ in 0..40 {
            ed.zoom_out();
        }
        assert_eq!(ed.zoom(), 0.5);
    }

    #[test]
    fn uploaded_image_is_shrunk_and_centred() {
        let mut ed = editor();
        let id = ed.add_image(&BitmapInfo {
            source: "upload.png".into(),
            width: 1200.0,
            height: 600.0,
        });
        let node = ed.scene().get(id).unwrap();
        assert_eq!((node.width, node.height), (240.0, 120.0));
        assert_eq!((node.x, node.y), (30.0, 215.0));
        assert_eq!(ed.welcome(), None);
    }
}
