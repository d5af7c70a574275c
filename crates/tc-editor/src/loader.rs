//! Asynchronous template and image loading.
//!
//! A template load clears the scene, inserts non-image nodes right away,
//! then decodes every image concurrently and inserts each one as it
//! resolves. History is recorded once, after every decode has settled.
//! A failed decode drops only its own node.

use crate::context::{EditorEvent, SharedEditor};
use futures::future::{AbortHandle, Abortable, LocalBoxFuture};
use futures::{FutureExt, StreamExt};
use futures::stream::FuturesUnordered;
use std::rc::Rc;
use tc_core::error::EditorError;
use tc_core::id::NodeId;
use tc_core::model::BitmapInfo;
use tc_core::template::{NodeDescriptor, Template};

/// Turns a source reference (URL, data URL) into a decoded bitmap.
pub trait ImageDecoder {
    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<BitmapInfo, EditorError>>;
}

/// Outcome of one template load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    pub failed: usize,
    /// A newer load started before this one finished.
    pub aborted: bool,
}

/// Load a template into the editor, replacing the current scene.
///
/// Starting a new load aborts the one in flight; the aborted load returns
/// a report with `aborted` set and records nothing.
pub async fn load_template(
    editor: SharedEditor,
    decoder: Rc<dyn ImageDecoder>,
    template: Template,
) -> Result<LoadReport, EditorError> {
    let (abort, registration) = AbortHandle::new_pair();
    let (images, others) = template.partition();
    let images: Vec<NodeDescriptor> = images.into_iter().cloned().collect();
    let mut report = LoadReport::default();

    {
        let mut ed = editor.borrow_mut();
        if let Some(previous) = ed.pending_load.replace(abort.clone()) {
            log::debug!("template: aborting previous load");
            previous.abort();
        }
        log::debug!(
            "template: loading {} ({} images, {} other nodes)",
            template.key,
            images.len(),
            others.len()
        );
        ed.deselect();
        ed.clear_scene();
        ed.welcome = None;

        for desc in others {
            match desc.build() {
                Ok(node) => {
                    let id = node.id;
                    let background = node.is_background();
                    ed.insert(node);
                    if background {
                        ed.scene.pin_to_bottom(id);
                    }
                    report.inserted += 1;
                }
                Err(e) => {
                    log::warn!("template {}: {e}", template.key);
                    report.failed += 1;
                }
            }
        }
    }

    let mut pending: FuturesUnordered<_> = images
        .into_iter()
        .map(|desc| {
            let decoded = match desc.source() {
                Some(source) => decoder.decode(source),
                None => {
                    let err = EditorError::resource_load("", "image descriptor without src");
                    futures::future::ready(Err(err)).boxed_local()
                }
            };
            async move { (desc, decoded.await) }
        })
        .collect();

    let barrier = async {
        while let Some((desc, decoded)) = pending.next().await {
            let mut ed = editor.borrow_mut();
            match decoded {
                Ok(bitmap) => {
                    let node = desc.build_image(&bitmap);
                    let id = node.id;
                    let background = node.is_background();
                    ed.bitmaps.insert(bitmap.source.clone(), bitmap);
                    ed.insert(node);
                    if background {
                        ed.scene.pin_to_bottom(id);
                    }
                    report.inserted += 1;
                }
                Err(e) => {
                    log::warn!("template {}: {e}", template.key);
                    if let EditorError::ResourceLoad { source_ref, reason } = &e {
                        ed.push_event(EditorEvent::ResourceFailed {
                            source_ref: source_ref.clone(),
                            reason: reason.clone(),
                        });
                    }
                    report.failed += 1;
                }
            }
        }
    };

    if Abortable::new(barrier, registration).await.is_err() {
        log::debug!("template: {} aborted", template.key);
        report.aborted = true;
        return Ok(report);
    }

    let mut ed = editor.borrow_mut();
    ed.pending_load = None;
    ed.needs_redraw = true;
    ed.commit();
    let first = ed
        .scene
        .nodes()
        .find(|n| n.is_editable())
        .map(|n| n.id);
    if let Some(id) = first {
        ed.select(id);
    }
    log::info!(
        "template: {} loaded ({} inserted, {} failed)",
        template.key,
        report.inserted,
        report.failed
    );
    ed.push_event(EditorEvent::TemplateLoaded {
        key: template.key.clone(),
        inserted: report.inserted,
        failed: report.failed,
    });
    Ok(report)
}

/// Load one of the built-in templates by key.
pub async fn load_builtin(
    editor: SharedEditor,
    decoder: Rc<dyn ImageDecoder>,
    key: String,
) -> Result<LoadReport, EditorError> {
    let template = Template::builtin(&key)?;
    load_template(editor, decoder, template).await
}

async fn decode_reported(
    editor: &SharedEditor,
    decoder: &dyn ImageDecoder,
    source: &str,
) -> Result<BitmapInfo, EditorError> {
    let decoded = decoder.decode(source).await;
    if let Err(e) = &decoded {
        log::warn!("image: {e}");
        editor.borrow_mut().push_event(EditorEvent::ResourceFailed {
            source_ref: source.to_string(),
            reason: e.to_string(),
        });
    }
    decoded
}

/// Decode an uploaded image and add it, shrunk to fit the stage.
pub async fn upload_image(
    editor: SharedEditor,
    decoder: Rc<dyn ImageDecoder>,
    source: String,
) -> Result<NodeId, EditorError> {
    let bitmap = decode_reported(&editor, decoder.as_ref(), &source).await?;
    Ok(editor.borrow_mut().add_image(&bitmap))
}

/// Decode a dropped image and place it at stage position (x, y).
pub async fn drop_image(
    editor: SharedEditor,
    decoder: Rc<dyn ImageDecoder>,
    source: String,
    x: f32,
    y: f32,
) -> Result<NodeId, EditorError> {
    let bitmap = decode_reported(&editor, decoder.as_ref(), &source).await?;
    Ok(editor.borrow_mut().drop_image(&bitmap, x, y))
}

/// Decode an image and add it as a single-image template.
pub async fn load_image_template(
    editor: SharedEditor,
    decoder: Rc<dyn ImageDecoder>,
    url: String,
) -> Result<NodeId, EditorError> {
    let bitmap = decode_reported(&editor, decoder.as_ref(), &url).await?;
    Ok(editor.borrow_mut().add_template_image(&bitmap))
}
