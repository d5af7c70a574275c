//! Raster export.
//!
//! Transform handles are detached for the duration of the export and put
//! back afterwards, whether or not the rasterizer succeeded.

use crate::context::EditorContext;
use tc_core::error::EditorError;
use tc_render::display::DisplayList;

pub const PNG_MIME: &str = "image/png";

/// Encodes a display list to image bytes at a pixel ratio.
pub trait Rasterizer {
    fn rasterize(&mut self, list: &DisplayList, scale: f32) -> Result<Vec<u8>, EditorError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EditorContext {
    /// Rasterize the stage at the configured export scale.
    pub fn export(&mut self, rasterizer: &mut dyn Rasterizer) -> Result<ExportedImage, EditorError> {
        let handles = self.handles.take();
        let list = self.display_list();
        let scale = self.config.export_scale;
        let encoded = rasterizer.rasterize(&list, scale);
        self.handles = handles;
        self.needs_redraw = true;

        let bytes = encoded?;
        let image = ExportedImage {
            file_name: self.config.export_file_name.clone(),
            mime: PNG_MIME,
            width: (list.width * scale).round() as u32,
            height: (list.height * scale).round() as u32,
            bytes,
        };
        log::info!(
            "export: {} {}x{} ({} bytes)",
            image.file_name,
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(image)
    }
}
