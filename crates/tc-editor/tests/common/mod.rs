//! Test doubles for the editor's external collaborators.

#![allow(dead_code)]

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tc_core::config::EditorConfig;
use tc_core::error::EditorError;
use tc_core::model::BitmapInfo;
use tc_editor::{
    EditorContext, ImageDecoder, MediaBackend, MediaElement, PanelDescription, PropertyPanel,
    Rasterizer,
};
use tc_render::DisplayList;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─── Media ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ElementState {
    pub source: Option<String>,
    pub paused: bool,
    pub looping: bool,
    pub muted: bool,
    pub loads: usize,
}

pub type SharedState = Rc<RefCell<ElementState>>;

struct RecordingElement {
    state: SharedState,
    size: Option<(f32, f32)>,
}

impl MediaElement for RecordingElement {
    fn play(&mut self) -> Result<(), EditorError> {
        self.state.borrow_mut().paused = false;
        Ok(())
    }
    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }
    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }
    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }
    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }
    fn clear_source(&mut self) {
        self.state.borrow_mut().source = None;
    }
    fn load(&mut self) {
        self.state.borrow_mut().loads += 1;
    }
    fn intrinsic_size(&self) -> Option<(f32, f32)> {
        self.size
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Media backend that keeps a handle on every element it hands out.
#[derive(Default)]
pub struct RecordingMedia {
    pub created: RefCell<Vec<SharedState>>,
}

impl RecordingMedia {
    fn element(&self, source: &str, size: Option<(f32, f32)>) -> Box<dyn MediaElement> {
        let state = Rc::new(RefCell::new(ElementState {
            source: Some(source.to_string()),
            paused: true,
            ..ElementState::default()
        }));
        self.created.borrow_mut().push(state.clone());
        Box::new(RecordingElement { state, size })
    }

    pub fn element_state(&self, n: usize) -> ElementState {
        self.created.borrow()[n].borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.created.borrow().len()
    }
}

impl MediaBackend for RecordingMedia {
    fn create_audio(&self, source: &str) -> Box<dyn MediaElement> {
        self.element(source, None)
    }

    fn create_video(&self, source: &str) -> Box<dyn MediaElement> {
        self.element(source, Some((1920.0, 1080.0)))
    }

    fn load_video(
        &self,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<Box<dyn MediaElement>, EditorError>> {
        let element = self.element(source, Some((1920.0, 1080.0)));
        async move { Ok(element) }.boxed_local()
    }
}

// ─── Panel ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct PanelLog {
    pub descriptions: Vec<PanelDescription>,
    pub clears: usize,
}

pub struct RecordingPanel(pub Rc<RefCell<PanelLog>>);

impl PropertyPanel for RecordingPanel {
    fn describe(&mut self, description: &PanelDescription) {
        self.0.borrow_mut().descriptions.push(description.clone());
    }

    fn clear_active_controls(&mut self) {
        self.0.borrow_mut().clears += 1;
    }
}

// ─── Rasterizer ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingRasterizer {
    pub frames: Vec<(DisplayList, f32)>,
}

impl Rasterizer for RecordingRasterizer {
    fn rasterize(&mut self, list: &DisplayList, scale: f32) -> Result<Vec<u8>, EditorError> {
        self.frames.push((list.clone(), scale));
        Ok(b"\x89PNG".to_vec())
    }
}

// ─── Decoder ─────────────────────────────────────────────────────────────

pub type Gate = oneshot::Sender<Result<BitmapInfo, EditorError>>;

/// Decoder whose results are released by the test, in any order.
#[derive(Default)]
pub struct GatedDecoder {
    gates: RefCell<HashMap<String, oneshot::Receiver<Result<BitmapInfo, EditorError>>>>,
}

impl GatedDecoder {
    pub fn gate(&self, source: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(source.to_string(), rx);
        tx
    }
}

impl ImageDecoder for GatedDecoder {
    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<BitmapInfo, EditorError>> {
        let gate = self.gates.borrow_mut().remove(source);
        let source = source.to_string();
        async move {
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(EditorError::resource_load(&source, "cancelled"))),
                None => Err(EditorError::resource_load(&source, "not found")),
            }
        }
        .boxed_local()
    }
}

pub fn bitmap(source: &str, width: f32, height: f32) -> BitmapInfo {
    BitmapInfo {
        source: source.to_string(),
        width,
        height,
    }
}

// ─── Editor ──────────────────────────────────────────────────────────────

pub struct Harness {
    pub editor: EditorContext,
    pub media: Rc<RecordingMedia>,
    pub panel: Rc<RefCell<PanelLog>>,
}

pub fn harness() -> Harness {
    init_logger();
    let media = Rc::new(RecordingMedia::default());
    let panel = Rc::new(RefCell::new(PanelLog::default()));
    let editor = EditorContext::new(
        EditorConfig::default(),
        Box::new(RecordingPanel(panel.clone())),
        media.clone(),
    );
    Harness {
        editor,
        media,
        panel,
    }
}
