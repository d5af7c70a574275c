use crate::color::Color;
use crate::error::EditorError;
use crate::geometry::Viewport;
use serde::{Deserialize, Serialize};

/// Editor configuration. Every field has a default, so hosts can pass a
/// partial JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub stage_width: f32,
    pub stage_height: f32,
    pub history_cap: usize,
    pub export_scale: f32,
    pub export_file_name: String,
    pub duplicate_offset: f32,
    pub overlay_width: f32,
    pub overlay_height: f32,
    /// Fraction of the stage an uploaded image may occupy.
    pub image_fit_ratio: f32,
    pub default_background: Color,
    pub zoom_step_in: f32,
    pub zoom_step_out: f32,
    pub zoom_max: f32,
    pub zoom_min: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            stage_width: 300.0,
            stage_height: 550.0,
            history_cap: 50,
            export_scale: 3.0,
            export_file_name: "twin-clouds-design.png".to_string(),
            duplicate_offset: 20.0,
            overlay_width: 110.0,
            overlay_height: 50.0,
            image_fit_ratio: 0.8,
            default_background: Color::rgb8(0x33, 0x33, 0x33),
            zoom_step_in: 1.1,
            zoom_step_out: 0.9,
            zoom_max: 2.0,
            zoom_min: 0.5,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))
    }

    pub fn stage(&self) -> Viewport {
        Viewport::new(self.stage_width, self.stage_height)
    }
}
