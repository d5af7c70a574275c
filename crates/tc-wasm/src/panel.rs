//! JSON protocol between the editor and the HTML property panel.

use serde_json::{Map, Value, json};
use tc_core::color::parse_css_color;
use tc_core::model::{AttrChange, FontStyle, TextAlign};
use tc_editor::{PanelDescription, PropertyPanel};

/// Panel that forwards descriptions to a JS callback as JSON strings.
/// The callback receives `null` when active controls must be cleared.
pub struct JsPanel {
    callback: Option<js_sys::Function>,
}

impl JsPanel {
    pub fn new(callback: Option<js_sys::Function>) -> Self {
        Self { callback }
    }

    fn send(&self, payload: wasm_bindgen::JsValue) {
        if let Some(cb) = &self.callback
            && let Err(e) = cb.call1(&wasm_bindgen::JsValue::NULL, &payload)
        {
            log::warn!("panel callback threw: {}", crate::web::js_reason(&e));
        }
    }
}

impl PropertyPanel for JsPanel {
    fn describe(&mut self, description: &PanelDescription) {
        let json = describe_json(description).to_string();
        self.send(wasm_bindgen::JsValue::from_str(&json));
    }

    fn clear_active_controls(&mut self) {
        self.send(wasm_bindgen::JsValue::NULL);
    }
}

pub fn describe_json(description: &PanelDescription) -> Value {
    match description {
        PanelDescription::Canvas {
            background,
            width,
            height,
        } => json!({
            "kind": "canvas",
            "background": background.to_hex(),
            "width": width,
            "height": height,
        }),
        PanelDescription::Node {
            id,
            variant,
            common,
            text,
            media,
        } => {
            let mut props = Map::new();
            props.insert("kind".into(), "node".into());
            props.insert("id".into(), id.as_str().into());
            props.insert("variant".into(), (*variant).into());
            props.insert("opacity".into(), json!(common.opacity));
            props.insert(
                "shadow".into(),
                json!({
                    "enabled": common.shadow.enabled,
                    "color": common.shadow.color.to_hex(),
                    "offsetX": common.shadow.offset_x,
                    "offsetY": common.shadow.offset_y,
                }),
            );
            if let Some(t) = text {
                props.insert(
                    "text".into(),
                    json!({
                        "fontFamily": t.font_family,
                        "fontSize": t.font_size,
                        "fill": t.fill.to_hex(),
                        "align": t.align.as_str(),
                        "lineHeight": t.line_height,
                        "letterSpacing": t.letter_spacing,
                        "strokeColor": t.stroke_color.to_hex(),
                        "strokeWidth": t.stroke_width,
                        "bold": t.bold,
                        "italic": t.italic,
                    }),
                );
            }
            if let Some(m) = media {
                props.insert("media".into(), m.as_str().into());
            }
            Value::Object(props)
        }
    }
}

/// Parse one panel control change. Unknown keys and malformed values give
/// `None`.
pub fn parse_attr(key: &str, value: &str) -> Option<AttrChange> {
    let number = || value.trim().parse::<f32>().ok().filter(|n| n.is_finite());
    let color = || parse_css_color(value).ok();
    Some(match key {
        "opacity" => AttrChange::Opacity(number()?),
        "fill" => AttrChange::Fill(color()?),
        "fontFamily" => AttrChange::FontFamily(value.to_string()),
        "fontSize" => AttrChange::FontSize(number()?),
        "align" => AttrChange::Align(value.parse::<TextAlign>().ok()?),
        "lineHeight" => AttrChange::LineHeight(number()?),
        "letterSpacing" => AttrChange::LetterSpacing(number()?),
        "strokeColor" => AttrChange::StrokeColor(color()?),
        "strokeWidth" => AttrChange::StrokeWidth(number()?),
        "fontStyle" => AttrChange::FontStyle(value.parse::<FontStyle>().ok()?),
        "shadow" => AttrChange::Shadow(value == "true"),
        "shadowColor" => AttrChange::ShadowColor(color()?),
        "shadowBlur" => AttrChange::ShadowBlur(number()?),
        "shadowOffsetX" => AttrChange::ShadowOffsetX(number()?),
        "shadowOffsetY" => AttrChange::ShadowOffsetY(number()?),
        "rotation" => AttrChange::Rotation(number()?),
        "cornerRadius" => AttrChange::CornerRadius(number()?),
        "content" => AttrChange::Content(value.to_string()),
        _ => return None,
    })
}
