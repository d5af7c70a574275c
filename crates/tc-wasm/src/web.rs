//! Browser implementations of the editor's platform seams: media elements,
//! image decoding and console setup.

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use gloo::events::EventListener;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tc_core::error::EditorError;
use tc_core::model::BitmapInfo;
use tc_editor::{ImageDecoder, MediaBackend, MediaElement};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{EventTarget, HtmlAudioElement, HtmlImageElement, HtmlMediaElement, HtmlVideoElement};

/// Best-effort human-readable text for a thrown JS value.
pub(crate) fn js_reason(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

/// Resolves with `true` on `ok_event`, `false` on `error`. The listeners
/// are attached before this returns, so callers set `src` afterwards.
fn settle(target: &EventTarget, ok_event: &'static str) -> impl Future<Output = bool> + use<> {
    let (tx, rx) = oneshot::channel();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let on_ok = {
        let tx = tx.clone();
        EventListener::once(target, ok_event, move |_| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(true);
            }
        })
    };
    let on_err = EventListener::once(target, "error", move |_| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(false);
        }
    });
    async move {
        let ok = rx.await.unwrap_or(false);
        drop((on_ok, on_err));
        ok
    }
}

// ─── Media ───────────────────────────────────────────────────────────────

/// An `<audio>`/`<video>` element. `None` when the document refused to
/// create one; every call is then a no-op.
pub struct WebMediaElement {
    element: Option<HtmlMediaElement>,
}

impl WebMediaElement {
    fn new(element: Option<HtmlMediaElement>) -> Self {
        Self { element }
    }

    /// The underlying `<video>`, for painting its current frame.
    pub fn video(&self) -> Option<&HtmlVideoElement> {
        self.element.as_ref()?.dyn_ref::<HtmlVideoElement>()
    }
}

impl MediaElement for WebMediaElement {
    fn play(&mut self) -> Result<(), EditorError> {
        let Some(el) = &self.element else {
            return Err(EditorError::playback("no media element"));
        };
        let promise = el.play().map_err(|e| EditorError::playback(js_reason(&e)))?;
        let el = el.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("playback of `{}` rejected: {}", el.src(), js_reason(&e));
                // Keep `paused` truthful so the overlay resyncs.
                let _ = el.pause();
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(el) = &self.element
            && let Err(e) = el.pause()
        {
            log::warn!("pause failed: {}", js_reason(&e));
        }
    }

    fn is_paused(&self) -> bool {
        self.element.as_ref().is_none_or(|el| el.paused())
    }

    fn set_looping(&mut self, looping: bool) {
        if let Some(el) = &self.element {
            el.set_loop(looping);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        if let Some(el) = &self.element {
            el.set_muted(muted);
        }
    }

    fn clear_source(&mut self) {
        if let Some(el) = &self.element {
            let _ = el.remove_attribute("src");
        }
    }

    fn load(&mut self) {
        if let Some(el) = &self.element {
            el.load();
        }
    }

    fn intrinsic_size(&self) -> Option<(f32, f32)> {
        let video = self.video()?;
        let (w, h) = (video.video_width(), video.video_height());
        (w > 0 && h > 0).then_some((w as f32, h as f32))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates `<audio>`/`<video>` elements. The editor's media registry owns
/// them; the painter reaches video frames through [`WebMediaElement::video`].
#[derive(Default)]
pub struct WebMediaBackend;

impl WebMediaBackend {
    fn video_element(&self, source: &str, preload: bool) -> Result<HtmlVideoElement, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        video.set_cross_origin(Some("anonymous"));
        video.set_attribute("playsinline", "")?;
        if !preload {
            video.set_src(source);
        }
        Ok(video)
    }
}

impl MediaBackend for WebMediaBackend {
    fn create_audio(&self, source: &str) -> Box<dyn MediaElement> {
        let element = match HtmlAudioElement::new_with_src(source) {
            Ok(audio) => Some(audio.unchecked_into::<HtmlMediaElement>()),
            Err(e) => {
                log::error!("audio `{source}`: {}", js_reason(&e));
                None
            }
        };
        Box::new(WebMediaElement::new(element))
    }

    fn create_video(&self, source: &str) -> Box<dyn MediaElement> {
        let element = match self.video_element(source, false) {
            Ok(video) => Some(video.unchecked_into::<HtmlMediaElement>()),
            Err(e) => {
                log::error!("video `{source}`: {}", js_reason(&e));
                None
            }
        };
        Box::new(WebMediaElement::new(element))
    }

    fn load_video(
        &self,
        source: &str,
    ) -> LocalBoxFuture<'static, Result<Box<dyn MediaElement>, EditorError>> {
        let source = source.to_string();
        let video = match self.video_element(&source, true) {
            Ok(video) => video,
            Err(e) => {
                let err = EditorError::resource_load(&source, js_reason(&e));
                return futures::future::ready(Err(err)).boxed_local();
            }
        };
        let loaded = settle(&video, "loadedmetadata");
        video.set_src(&source);
        async move {
            if loaded.await {
                let element = video.unchecked_into::<HtmlMediaElement>();
                Ok(Box::new(WebMediaElement::new(Some(element))) as Box<dyn MediaElement>)
            } else {
                Err(EditorError::resource_load(&source, "video metadata failed to load"))
            }
        }
        .boxed_local()
    }
}

// ─── Images ──────────────────────────────────────────────────────────────

/// Decodes images through `<img>` elements and keeps them for painting.
#[derive(Default)]
pub struct WebImageDecoder {
    images: Rc<RefCell<HashMap<String, HtmlImageElement>>>,
}

impl WebImageDecoder {
    pub(crate) fn images(&self) -> std::cell::Ref<'_, HashMap<String, HtmlImageElement>> {
        self.images.borrow()
    }
}

impl ImageDecoder for WebImageDecoder {
    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<BitmapInfo, EditorError>> {
        let source = source.to_string();
        let cache = self.images.clone();
        async move {
            let img = HtmlImageElement::new()
                .map_err(|e| EditorError::resource_load(&source, js_reason(&e)))?;
            img.set_cross_origin(Some("anonymous"));
            let loaded = settle(&img, "load");
            img.set_src(&source);
            if !loaded.await {
                return Err(EditorError::resource_load(&source, "image failed to decode"));
            }
            let bitmap = BitmapInfo {
                source: source.clone(),
                width: img.natural_width() as f32,
                height: img.natural_height() as f32,
            };
            cache.borrow_mut().insert(source, img);
            Ok(bitmap)
        }
        .boxed_local()
    }
}

// ─── Console ─────────────────────────────────────────────────────────────

/// Route `log` records to the browser console. Later calls keep the first
/// logger.
pub fn init_logging(level: log::Level) {
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}

/// Print Rust panics to the browser console instead of a bare
/// `unreachable` trap.
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
