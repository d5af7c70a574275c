//! Media binding: audio and video nodes backed by host media elements.
//!
//! The scene only stores the media *source*; the playing element lives in
//! the [`MediaRegistry`] keyed by node id. Removing a node releases its
//! element (pause, drop the source, reload) so nothing keeps playing or
//! downloading behind a deleted node.

use crate::context::{EditorContext, EditorEvent, SharedEditor};
use futures::future::LocalBoxFuture;
use std::any::Any;
use std::collections::HashMap;
use tc_core::color::Color;
use tc_core::error::EditorError;
use tc_core::geometry::{Bounds, fit_contain};
use tc_core::id::NodeId;
use tc_core::model::{
    MediaProps, MediaType, NodeKind, NodeRole, RectProps, SceneNode, TextAlign, TextProps,
};

pub const AUDIO_ICON: &str = "🎵";
pub const AUDIO_PROXY_SIZE: f32 = 60.0;

/// A host media element (HTML `<audio>`/`<video>` in the browser).
pub trait MediaElement {
    /// Start playback. Autoplay policies may refuse.
    fn play(&mut self) -> Result<(), EditorError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn set_looping(&mut self, looping: bool);
    fn set_muted(&mut self, muted: bool);
    /// Detach the source so the host stops fetching it.
    fn clear_source(&mut self);
    /// Reload the element after a source change.
    fn load(&mut self);
    /// Intrinsic frame size, once metadata is known. Audio has none.
    fn intrinsic_size(&self) -> Option<(f32, f32)>;
    /// Access to the concrete element, for hosts that draw video frames.
    fn as_any(&self) -> &dyn Any;
}

/// Creates media elements for the editor.
pub trait MediaBackend {
    /// A paused audio element for `source`.
    fn create_audio(&self, source: &str) -> Box<dyn MediaElement>;

    /// A paused video element for `source`. Metadata may still be loading.
    fn create_video(&self, source: &str) -> Box<dyn MediaElement>;

    /// A video element that resolves once its metadata (frame size) loaded.
    fn load_video(
        &self,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<Box<dyn MediaElement>, EditorError>>;

    fn create_element(&self, media_type: MediaType, source: &str) -> Box<dyn MediaElement> {
        match media_type {
            MediaType::Audio => self.create_audio(source),
            MediaType::Video => self.create_video(source),
        }
    }
}

struct MediaSlot {
    media_type: MediaType,
    element: Box<dyn MediaElement>,
}

/// Live media elements by node id.
#[derive(Default)]
pub struct MediaRegistry {
    slots: HashMap<NodeId, MediaSlot>,
}

impl MediaRegistry {
    /// Bind an element to a node, releasing any element it replaces.
    pub fn insert(&mut self, id: NodeId, media_type: MediaType, element: Box<dyn MediaElement>) {
        if let Some(mut old) = self.slots.insert(id, MediaSlot { media_type, element }) {
            release_element(old.element.as_mut());
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&dyn MediaElement> {
        self.slots.get(&id).map(|s| s.element.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut (dyn MediaElement + 'static)> {
        self.slots.get_mut(&id).map(|s| s.element.as_mut())
    }

    pub fn is_playing(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| !e.is_paused())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether any video element is bound. Video frames need continuous
    /// redraw.
    pub fn has_video(&self) -> bool {
        self.slots
            .values()
            .any(|s| s.media_type == MediaType::Video)
    }

    /// Pause and unload the element bound to `id`. Returns false when the
    /// node had none.
    pub fn release(&mut self, id: NodeId) -> bool {
        match self.slots.remove(&id) {
            Some(mut slot) => {
                release_element(slot.element.as_mut());
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        for (_, mut slot) in self.slots.drain() {
            release_element(slot.element.as_mut());
        }
    }
}

fn release_element(element: &mut dyn MediaElement) {
    element.pause();
    element.clear_source();
    element.load();
}

// ─── Floating playback overlay ───────────────────────────────────────────

/// Screen-space play/pause control shown over a selected media node.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaOverlay {
    pub visible: bool,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub playing: bool,
}

impl MediaOverlay {
    pub fn hidden(width: f32, height: f32) -> Self {
        Self {
            visible: false,
            left: 0.0,
            top: 0.0,
            width,
            height,
            playing: false,
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Centre the overlay on `rect` (stage coordinates). Non-finite boxes
    /// hide it.
    pub fn place(&mut self, rect: &Bounds, zoom: f32, container: (f32, f32), playing: bool) {
        if !rect.is_finite() {
            self.hide();
            return;
        }
        let (cx, cy) = rect.center();
        self.left = container.0 + cx * zoom - self.width / 2.0;
        self.top = container.1 + cy * zoom - self.height / 2.0;
        self.playing = playing;
        self.visible = true;
    }
}

impl EditorContext {
    /// Reposition or hide the playback overlay for the current selection.
    pub(crate) fn update_overlay(&mut self) {
        let target = self
            .selection
            .node()
            .and_then(|id| self.scene.get(id))
            .filter(|n| n.is_media());
        match target {
            Some(node) => {
                let playing = self.media.is_playing(node.id);
                self.overlay
                    .place(&node.client_rect(), self.zoom, self.container_offset, playing);
            }
            None => self.overlay.hide(),
        }
    }

    /// Add an audio proxy: a small labelled box near the bottom-left corner
    /// bound to a looping audio element. Playback is attempted right away.
    pub fn add_audio(&mut self, source: &str) -> NodeId {
        let size = AUDIO_PROXY_SIZE;
        let backdrop = Color::rgb8(0x4A, 0x4A, 0x4A);
        let id = self.scene.fresh_id("media");
        let group = SceneNode::new(
            id,
            NodeKind::MediaGroup(MediaProps {
                media_type: MediaType::Audio,
                source: source.to_string(),
                backdrop,
            }),
        )
        .at(20.0, self.stage.height - size - 20.0)
        .sized(size, size);

        let mut plate = RectProps::filled(backdrop);
        plate.corner_radius = 8.0;
        let plate = SceneNode::new(NodeId::generate("media_bg"), NodeKind::Rect(plate))
            .sized(size, size)
            .with_role(NodeRole::Structural);

        let mut icon = TextProps::new(AUDIO_ICON, 30.0, Color::WHITE);
        icon.align = TextAlign::Center;
        icon.wrap_width = Some(size);
        let icon = SceneNode::new(NodeId::generate("media_icon"), NodeKind::Text(icon))
            .sized(size, size)
            .with_role(NodeRole::Structural);

        let mut element = self.media_backend.create_audio(source);
        element.set_looping(true);
        self.media.insert(id, MediaType::Audio, element);

        self.insert(group);
        if let Some(parent) = self.scene.index_of(id) {
            self.scene.add_child(parent, plate);
            self.scene.add_child(parent, icon);
        }
        self.commit();
        self.select(id);
        self.play(id);
        id
    }

    /// Bind an already-loaded video element as a node fitted to the stage.
    pub fn add_loaded_video(&mut self, source: &str, mut element: Box<dyn MediaElement>) -> NodeId {
        let (vw, vh) = element.intrinsic_size().unwrap_or((self.stage.width, self.stage.height));
        let (w, h) = fit_contain(vw, vh, self.stage.width, self.stage.height);
        let (x, y) = self.stage.centered(w, h);
        let id = self.scene.fresh_id("media");
        let node = SceneNode::new(
            id,
            NodeKind::MediaGroup(MediaProps {
                media_type: MediaType::Video,
                source: source.to_string(),
                backdrop: Color::BLACK,
            }),
        )
        .at(x, y)
        .sized(w, h);

        element.set_muted(true);
        element.set_looping(true);
        self.media.insert(id, MediaType::Video, element);
        self.insert(node);
        self.commit();
        self.play(id);
        self.select(id);
        id
    }

    fn play(&mut self, id: NodeId) -> bool {
        let Some(element) = self.media.get_mut(id) else {
            return false;
        };
        match element.play() {
            Ok(()) => {
                let playing = !element.is_paused();
                if self.selection.is_selected(id) {
                    self.overlay.playing = playing;
                }
                self.push_event(EditorEvent::PlaybackChanged { id, playing });
                playing
            }
            Err(e) => {
                log::warn!("media: {id}: {e}");
                false
            }
        }
    }

    /// Play or pause the selected media node. Returns the new playing state.
    pub fn toggle_playback(&mut self) -> Option<bool> {
        let id = self.selection.node()?;
        let element = self.media.get_mut(id)?;
        if element.is_paused() {
            if let Err(e) = element.play() {
                log::warn!("media: {id}: {e}");
            }
        } else {
            element.pause();
        }
        let playing = !element.is_paused();
        self.overlay.playing = playing;
        self.push_event(EditorEvent::PlaybackChanged { id, playing });
        Some(playing)
    }

    /// Bring the overlay in line with the selected element. The host may
    /// refuse playback after `play` returned, pausing the element behind
    /// the editor's back. Returns true when the overlay changed.
    pub fn sync_playback(&mut self) -> bool {
        let Some(id) = self.selection.node().filter(|id| self.media.contains(*id)) else {
            return false;
        };
        let playing = self.media.is_playing(id);
        if !self.overlay.visible || self.overlay.playing == playing {
            return false;
        }
        log::debug!("media: {id} playback now {playing}");
        self.overlay.playing = playing;
        self.push_event(EditorEvent::PlaybackChanged { id, playing });
        true
    }
}

/// Load a video and add it once its frame size is known.
pub async fn add_video(editor: SharedEditor, source: String) -> Result<NodeId, EditorError> {
    let pending = editor.borrow().media_backend.load_video(&source);
    match pending.await {
        Ok(element) => Ok(editor.borrow_mut().add_loaded_video(&source, element)),
        Err(e) => {
            log::warn!("media: {e}");
            editor.borrow_mut().push_event(EditorEvent::ResourceFailed {
                source_ref: source,
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeMedia;
    use super::*;
    use crate::selection::NullPanel;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use tc_core::config::EditorConfig;

    fn editor() -> EditorContext {
        EditorContext::new(
            EditorConfig::default(),
            Box::new(NullPanel),
            Rc::new(FakeMedia),
        )
    }

    #[test]
    fn audio_proxy_sits_bottom_left_and_plays() {
        let mut ed = editor();
        let id = ed.add_audio("song.mp3");
        let node = ed.scene().get(id).unwrap();
        assert_eq!((node.x, node.y), (20.0, 470.0));
        assert_eq!(ed.selected(), Some(id));
        assert!(ed.media().is_playing(id));
        let idx = ed.scene().index_of(id).unwrap();
        assert_eq!(ed.scene().children(idx).len(), 2);
        assert!(ed.overlay().visible);
    }

    #[test]
    fn toggle_flips_playback() {
        let mut ed = editor();
        ed.add_audio("song.mp3");
        assert_eq!(ed.toggle_playback(), Some(false));
        assert_eq!(ed.toggle_playback(), Some(true));
        ed.deselect();
        assert_eq!(ed.toggle_playback(), None);
        assert!(!ed.overlay().visible);
    }

    #[test]
    fn loaded_video_is_fitted_and_muted() {
        let mut ed = editor();
        let element = FakeMedia.create_video("clip.mp4");
        let id = ed.add_loaded_video("clip.mp4", element);
        let node = ed.scene().get(id).unwrap();
        assert_eq!((node.width, node.height), (300.0, 168.75));
        assert!(ed.media().has_video());
        assert!(ed.take_redraw());
    }

    #[test]
    fn refused_play_shows_paused() {
        let mut ed = editor();
        let element = Box::new(testing::FakeElement {
            paused: true,
            size: Some((640.0, 360.0)),
            refuse: true,
            ..Default::default()
        });
        let id = ed.add_loaded_video("clip.mp4", element);
        assert!(!ed.media().is_playing(id));
        assert!(ed.overlay().visible);
        assert!(!ed.overlay().playing);
        assert_eq!(ed.toggle_playback(), Some(false));
        assert!(!ed.overlay().playing);
    }

    #[test]
    fn late_refusal_resyncs_overlay() {
        let mut ed = editor();
        let id = ed.add_audio("song.mp3");
        assert!(ed.overlay().playing);
        assert!(!ed.sync_playback());

        // The host pauses the element after the play request settled.
        ed.media.get_mut(id).unwrap().pause();
        ed.drain_events();
        assert!(ed.sync_playback());
        assert!(!ed.overlay().playing);
        assert_eq!(
            ed.drain_events(),
            vec![EditorEvent::PlaybackChanged { id, playing: false }]
        );
        assert!(!ed.sync_playback());
    }

    #[test]
    fn elements_are_per_node_and_dropped_on_release() {
        let mut ed = editor();
        let a = ed.add_audio("song.mp3");
        let b = ed.add_audio("song.mp3");
        let concrete = |ed: &EditorContext, id| {
            ed.media()
                .get(id)
                .and_then(|e| e.as_any().downcast_ref::<testing::FakeElement>())
                .map(|e| e.paused)
        };
        assert_eq!(concrete(&ed, a), Some(false));
        assert_eq!(concrete(&ed, b), Some(false));

        ed.toggle_playback();
        assert_eq!(concrete(&ed, a), Some(false));
        assert_eq!(concrete(&ed, b), Some(true));

        ed.remove_node(a);
        assert_eq!(concrete(&ed, a), None);
        assert_eq!(concrete(&ed, b), Some(true));
    }

    #[test]
    fn overlay_follows_zoom_and_container() {
        let mut overlay = MediaOverlay::hidden(110.0, 50.0);
        overlay.place(&Bounds::new(0.0, 0.0, 100.0, 100.0), 2.0, (10.0, 20.0), true);
        assert!(overlay.visible);
        assert_eq!((overlay.left, overlay.top), (55.0, 95.0));

        overlay.place(&Bounds::new(f32::NAN, 0.0, 1.0, 1.0), 1.0, (0.0, 0.0), false);
        assert!(!overlay.visible);
    }
}
