//! WASM bridge for Twin Clouds: exposes the editor engine to the page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the stage
//! `<canvas>`, the property panel and the file inputs; everything else
//! lives behind [`EditorCanvas`].

mod panel;
mod render2d;
mod web;

use std::collections::HashMap;
use std::rc::Rc;
use tc_core::color::parse_css_color;
use tc_core::config::EditorConfig;
use tc_core::error::EditorError;
use tc_core::id::NodeId;
use tc_core::model::MediaType;
use tc_core::template::Template;
use tc_editor::{
    EditorContext, ImageDecoder, InputEvent, Modifiers, Rasterizer, SharedEditor, loader,
};
use tc_render::DisplayList;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

pub use panel::{describe_json, parse_attr};
pub use web::{WebImageDecoder, WebMediaBackend, WebMediaElement, init_logging, init_panic_hook};

/// The page-facing editor controller.
///
/// Async operations return promises that resolve once the editor has
/// applied their result; the editor stays usable while they are pending.
#[wasm_bindgen]
pub struct EditorCanvas {
    editor: SharedEditor,
    decoder: Rc<WebImageDecoder>,
}

#[wasm_bindgen]
impl EditorCanvas {
    /// Create the editor. `config_json` may be partial or empty; invalid
    /// JSON falls back to the defaults. `on_panel` receives property-panel
    /// descriptions as JSON strings; it runs while the editor is borrowed
    /// and must not call back into this object synchronously.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, on_panel: Option<js_sys::Function>) -> Self {
        init_panic_hook();
        init_logging(log::Level::Info);

        let config = match config_json.as_deref().map(EditorConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("{e}; using default configuration");
                EditorConfig::default()
            }
            None => EditorConfig::default(),
        };
        let editor = EditorContext::new(
            config,
            Box::new(panel::JsPanel::new(on_panel)),
            Rc::new(WebMediaBackend),
        )
        .into_shared();

        Self {
            editor,
            decoder: Rc::new(WebImageDecoder::default()),
        }
    }

    /// Advance animations and repaint if anything changed. Returns `true`
    /// when a frame was painted.
    pub fn render(&self, ctx: &CanvasRenderingContext2d, time_ms: f64) -> bool {
        let mut ed = self.editor.borrow_mut();
        ed.tick(time_ms);
        ed.sync_playback();
        if !ed.take_redraw() {
            return false;
        }
        let list = ed.display_list();
        let videos = video_elements(&ed);
        drop(ed);
        let images = self.decoder.images();
        let video = |id: NodeId| videos.get(&id).cloned();
        let assets = render2d::Assets {
            images: &images,
            video: &video,
        };
        render2d::paint(ctx, &list, &assets, 1.0);
        true
    }

    pub fn stage_width(&self) -> f32 {
        self.editor.borrow().stage().width
    }

    pub fn stage_height(&self) -> f32 {
        self.editor.borrow().stage().height
    }

    pub fn resize_stage(&self, width: f32, height: f32) {
        self.editor.borrow_mut().resize_stage(width, height);
    }

    pub fn zoom_in(&self) -> f32 {
        self.editor.borrow_mut().zoom_in()
    }

    pub fn zoom_out(&self) -> f32 {
        self.editor.borrow_mut().zoom_out()
    }

    /// Page offset of the stage container, for placing overlays.
    pub fn set_container_offset(&self, left: f32, top: f32) {
        self.editor.borrow_mut().set_container_offset(left, top);
    }

    /// Returns `false` if `css` is not a color.
    pub fn set_background(&self, css: &str) -> bool {
        match parse_css_color(css) {
            Ok(color) => {
                self.editor.borrow_mut().set_background(color);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_pointer_down(&self, x: f32, y: f32) -> bool {
        self.input(InputEvent::PointerDown { x, y })
    }

    pub fn handle_pointer_move(&self, x: f32, y: f32) -> bool {
        self.input(InputEvent::PointerMove { x, y })
    }

    pub fn handle_pointer_up(&self, x: f32, y: f32) -> bool {
        self.input(InputEvent::PointerUp { x, y })
    }

    pub fn handle_double_click(&self, x: f32, y: f32) -> bool {
        self.input(InputEvent::DoubleClick { x, y })
    }

    /// Returns `true` if the key was consumed (caller should
    /// `preventDefault`).
    pub fn handle_key(&self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.input(InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                ctrl,
                shift,
                alt,
                meta,
            },
        })
    }

    // ─── Selection & history ─────────────────────────────────────────────

    /// Id of the selected node, or `""`.
    pub fn selected_id(&self) -> String {
        self.editor
            .borrow()
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn deselect(&self) {
        self.editor.borrow_mut().deselect();
    }

    pub fn undo(&self) -> bool {
        self.editor.borrow_mut().undo()
    }

    pub fn redo(&self) -> bool {
        self.editor.borrow_mut().redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.borrow().history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.borrow().history().can_redo()
    }

    pub fn delete_selected(&self) -> bool {
        self.editor.borrow_mut().delete_selected()
    }

    pub fn duplicate_selected(&self) -> bool {
        self.editor.borrow_mut().duplicate_selected().is_some()
    }

    // ─── Property panel ──────────────────────────────────────────────────

    /// Live preview while a panel control is dragged. Call
    /// [`begin_gesture`](Self::begin_gesture) first and
    /// [`end_gesture`](Self::end_gesture) on release.
    pub fn preview_prop(&self, key: &str, value: &str) -> bool {
        let Some(change) = parse_attr(key, value) else {
            return false;
        };
        self.editor.borrow_mut().preview_attr(change).is_some()
    }

    /// Apply a panel change and record it.
    pub fn set_prop(&self, key: &str, value: &str) -> bool {
        let Some(change) = parse_attr(key, value) else {
            log::debug!("ignored panel change {key}={value}");
            return false;
        };
        self.editor.borrow_mut().set_attr(change).is_some()
    }

    pub fn begin_gesture(&self) {
        self.editor.borrow_mut().begin_gesture();
    }

    pub fn end_gesture(&self) {
        self.editor.borrow_mut().end_gesture();
    }

    pub fn toggle_bold(&self) -> bool {
        self.editor.borrow_mut().toggle_bold().is_some()
    }

    pub fn toggle_italic(&self) -> bool {
        self.editor.borrow_mut().toggle_italic().is_some()
    }

    pub fn increase_font_size(&self) -> bool {
        self.editor.borrow_mut().increase_font_size().is_some()
    }

    pub fn toggle_shadow(&self, on: bool) -> bool {
        self.editor.borrow_mut().toggle_shadow(on).is_some()
    }

    pub fn bring_to_front(&self) -> bool {
        self.editor.borrow_mut().bring_to_front()
    }

    pub fn send_to_back(&self) -> bool {
        self.editor.borrow_mut().send_to_back()
    }

    pub fn bring_forward(&self) -> bool {
        self.editor.borrow_mut().bring_forward()
    }

    pub fn send_backward(&self) -> bool {
        self.editor.borrow_mut().send_backward()
    }

    // ─── Content ─────────────────────────────────────────────────────────

    pub fn add_heading(&self) -> String {
        self.editor.borrow_mut().add_heading().as_str().to_string()
    }

    pub fn add_body(&self) -> String {
        self.editor.borrow_mut().add_body().as_str().to_string()
    }

    pub fn add_emoji(&self, emoji: &str) -> String {
        self.editor.borrow_mut().add_emoji(emoji).as_str().to_string()
    }

    pub fn add_rect(&self, x: f32, y: f32, width: f32, height: f32, fill: &str) -> String {
        let fill = parse_css_color(fill).unwrap_or_else(|e| {
            log::warn!("{e}");
            EditorConfig::default().default_background
        });
        self.editor
            .borrow_mut()
            .add_rect(x, y, width, height, fill)
            .as_str()
            .to_string()
    }

    pub fn add_audio(&self, source: &str) -> String {
        self.editor.borrow_mut().add_audio(source).as_str().to_string()
    }

    /// Resolves with the new node id once the video's metadata is loaded.
    pub fn add_video(&self, source: String) -> js_sys::Promise {
        let editor = self.editor.clone();
        promise(async move { tc_editor::add_video(editor, source).await.map(id_value) })
    }

    /// Resolves with `true` if playback is now running, `false` if paused,
    /// `undefined` if the selection is not media.
    pub fn toggle_playback(&self) -> JsValue {
        self.editor
            .borrow_mut()
            .toggle_playback()
            .map(JsValue::from_bool)
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// `{visible, left, top, width, height, playing}` for the play/pause
    /// button.
    pub fn overlay_json(&self) -> String {
        let ed = self.editor.borrow();
        let o = ed.overlay();
        serde_json::json!({
            "visible": o.visible,
            "left": o.left,
            "top": o.top,
            "width": o.width,
            "height": o.height,
            "playing": o.playing,
        })
        .to_string()
    }

    /// Returns `false` for an unknown effect name or no selection.
    pub fn apply_animation(&self, kind: &str) -> bool {
        let Ok(kind) = kind.parse() else {
            log::warn!("unknown animation `{kind}`");
            return false;
        };
        self.editor.borrow_mut().apply_animation(kind).is_some()
    }

    // ─── Templates & images ──────────────────────────────────────────────

    /// JSON array of the built-in template keys.
    pub fn template_keys(&self) -> String {
        serde_json::to_string(&Template::builtin_keys().collect::<Vec<_>>())
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Resolves with `{inserted, failed, aborted}`.
    pub fn load_template(&self, key: String) -> js_sys::Promise {
        let (editor, decoder) = self.loader_parts();
        promise(async move {
            let report = loader::load_builtin(editor, decoder, key).await?;
            Ok(report_value(&report))
        })
    }

    /// Load a template given as JSON (same schema as the built-ins).
    pub fn load_template_json(&self, json: &str) -> js_sys::Promise {
        let (editor, decoder) = self.loader_parts();
        let template = Template::from_json(json);
        promise(async move {
            let report = loader::load_template(editor, decoder, template?).await?;
            Ok(report_value(&report))
        })
    }

    pub fn load_image_template(&self, url: String) -> js_sys::Promise {
        let (editor, decoder) = self.loader_parts();
        promise(async move {
            loader::load_image_template(editor, decoder, url)
                .await
                .map(id_value)
        })
    }

    /// `source` is typically an object URL for the picked file.
    pub fn upload_image(&self, source: String) -> js_sys::Promise {
        let (editor, decoder) = self.loader_parts();
        promise(async move { loader::upload_image(editor, decoder, source).await.map(id_value) })
    }

    /// Drop at stage coordinates (x, y). Fills a drop placeholder under the
    /// point, otherwise adds a new image.
    pub fn drop_image(&self, source: String, x: f32, y: f32) -> js_sys::Promise {
        let (editor, decoder) = self.loader_parts();
        promise(async move {
            loader::drop_image(editor, decoder, source, x, y)
                .await
                .map(id_value)
        })
    }

    // ─── Text editing ────────────────────────────────────────────────────

    /// The open in-place text editor as JSON, or `""` when none is open.
    pub fn text_edit_json(&self) -> String {
        let ed = self.editor.borrow();
        let Some(s) = ed.text_edit() else {
            return String::new();
        };
        serde_json::json!({
            "id": s.node.as_str(),
            "draft": s.draft,
            "left": s.left,
            "top": s.top,
            "width": s.width,
            "fontSize": s.font_size,
            "fontFamily": s.font_family,
            "lineHeight": s.line_height,
            "align": s.align.as_str(),
            "fill": s.fill.to_hex(),
        })
        .to_string()
    }

    pub fn update_text_draft(&self, draft: &str) {
        self.editor.borrow_mut().update_text_draft(draft);
    }

    pub fn commit_text_edit(&self) -> bool {
        self.editor.borrow_mut().commit_text_edit().is_some()
    }

    pub fn cancel_text_edit(&self) {
        self.editor.borrow_mut().cancel_text_edit();
    }

    // ─── Export & events ─────────────────────────────────────────────────

    /// Render the design without handles at the export scale and return
    /// the PNG bytes.
    pub fn export_png(&self) -> Result<js_sys::Uint8Array, JsValue> {
        let mut ed = self.editor.borrow_mut();
        let videos = video_elements(&ed);
        let images = self.decoder.images();
        let video = |id: NodeId| videos.get(&id).cloned();
        let mut raster = CanvasRasterizer {
            assets: render2d::Assets {
                images: &images,
                video: &video,
            },
        };
        let image = ed.export(&mut raster).map_err(error_value)?;
        Ok(js_sys::Uint8Array::from(image.bytes.as_slice()))
    }

    pub fn export_file_name(&self) -> String {
        self.editor.borrow().config().export_file_name.clone()
    }

    /// Editor events since the last call, as a JSON array.
    pub fn drain_events_json(&self) -> String {
        let events = self.editor.borrow_mut().drain_events();
        let values: Vec<serde_json::Value> = events.iter().map(event_value).collect();
        serde_json::Value::Array(values).to_string()
    }
}

impl EditorCanvas {
    fn input(&self, event: InputEvent) -> bool {
        self.editor.borrow_mut().handle_input(event)
    }

    fn loader_parts(&self) -> (SharedEditor, Rc<dyn ImageDecoder>) {
        (self.editor.clone(), self.decoder.clone())
    }
}

// ─── Export ──────────────────────────────────────────────────────────────

struct CanvasRasterizer<'a> {
    assets: render2d::Assets<'a>,
}

impl Rasterizer for CanvasRasterizer<'_> {
    fn rasterize(&mut self, list: &DisplayList, scale: f32) -> Result<Vec<u8>, EditorError> {
        let js = |e: JsValue| EditorError::Export(web::js_reason(&e));
        let window = web_sys::window().ok_or_else(|| EditorError::Export("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| EditorError::Export("no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(js)?
            .dyn_into()
            .map_err(|_| EditorError::Export("not a canvas".into()))?;
        canvas.set_width((list.width * scale).round() as u32);
        canvas.set_height((list.height * scale).round() as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(js)?
            .ok_or_else(|| EditorError::Export("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| EditorError::Export("2d context unavailable".into()))?;

        render2d::paint(&ctx, list, &self.assets, scale as f64);

        let url = canvas.to_data_url_with_type(tc_editor::export::PNG_MIME).map_err(js)?;
        let encoded = url
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| EditorError::Export("malformed data URL".into()))?;
        let binary = window.atob(encoded).map_err(js)?;
        Ok(binary.chars().map(|c| c as u8).collect())
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Video elements for every bound video node, keyed by node id.
fn video_elements(ed: &EditorContext) -> HashMap<NodeId, HtmlVideoElement> {
    ed.scene()
        .nodes()
        .filter(|node| node.media_type() == Some(MediaType::Video))
        .filter_map(|node| {
            let element = ed.media().get(node.id)?.as_any().downcast_ref::<WebMediaElement>()?;
            Some((node.id, element.video()?.clone()))
        })
        .collect()
}

fn promise(
    fut: impl Future<Output = Result<JsValue, EditorError>> + 'static,
) -> js_sys::Promise {
    wasm_bindgen_futures::future_to_promise(async move { fut.await.map_err(error_value) })
}

fn error_value(e: EditorError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn id_value(id: NodeId) -> JsValue {
    JsValue::from_str(id.as_str())
}

fn report_value(report: &loader::LoadReport) -> JsValue {
    let json = serde_json::json!({
        "inserted": report.inserted,
        "failed": report.failed,
        "aborted": report.aborted,
    });
    JsValue::from_str(&json.to_string())
}

fn event_value(event: &tc_editor::EditorEvent) -> serde_json::Value {
    use tc_editor::EditorEvent as E;
    match event {
        E::TemplateLoaded {
            key,
            inserted,
            failed,
        } => serde_json::json!({"type": "templateLoaded", "key": key, "inserted": inserted, "failed": failed}),
        E::ResourceFailed { source_ref, reason } => {
            serde_json::json!({"type": "resourceFailed", "source": source_ref, "reason": reason})
        }
        E::SelectionChanged(id) => {
            serde_json::json!({"type": "selectionChanged", "id": id.map(|id| id.as_str())})
        }
        E::PlaybackChanged { id, playing } => {
            serde_json::json!({"type": "playbackChanged", "id": id.as_str(), "playing": playing})
        }
        E::HistoryChanged { can_undo, can_redo } => {
            serde_json::json!({"type": "historyChanged", "canUndo": can_undo, "canRedo": can_redo})
        }
    }
}
