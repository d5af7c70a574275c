//! Declarative templates: ordered node descriptors expanded into scene nodes.

use crate::color::{Color, parse_css_color};
use crate::error::EditorError;
use crate::id::NodeId;
use crate::model::{
    BitmapInfo, FontStyle, ImageProps, NodeKind, NodeRole, RectProps, SceneNode, TextAlign,
    TextProps,
};
use serde::{Deserialize, Serialize};

const BUILTIN: &[(&str, &str)] = &[
    ("carousel1", include_str!("../templates/carousel1.json")),
    ("carousel2", include_str!("../templates/carousel2.json")),
    ("carousel3", include_str!("../templates/carousel3.json")),
    ("carousel4", include_str!("../templates/carousel4.json")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[serde(alias = "Text")]
    Text,
    #[serde(alias = "Image")]
    Image,
    #[serde(alias = "Rect")]
    Rect,
}

/// Attribute bag of a descriptor. Everything is optional; missing values
/// fall back to the node defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeAttributes {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub opacity: Option<f32>,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub fill: Option<String>,
    pub align: Option<TextAlign>,
    pub line_height: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub font_style: Option<FontStyle>,
    pub corner_radius: Option<f32>,
    pub src: Option<String>,
    pub draggable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub variant: Variant,
    #[serde(default)]
    pub attributes: NodeAttributes,
    #[serde(default)]
    pub is_background: bool,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<NodeDescriptor>,
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(|e| EditorError::Template(e.to_string()))
    }

    /// One of the templates shipped with the editor.
    pub fn builtin(key: &str) -> Result<Self, EditorError> {
        let (_, json) = BUILTIN
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or_else(|| EditorError::Template(format!("template \"{key}\" not found")))?;
        Self::from_json(json)
    }

    pub fn builtin_keys() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(k, _)| *k)
    }

    /// Split into (image descriptors, everything else), each in document order.
    pub fn partition(&self) -> (Vec<&NodeDescriptor>, Vec<&NodeDescriptor>) {
        self.nodes.iter().partition(|d| d.variant == Variant::Image)
    }
}

fn color_attr(value: Option<&str>, fallback: Color) -> Result<Color, EditorError> {
    value.map_or(Ok(fallback), parse_css_color)
}

impl NodeDescriptor {
    /// Source reference to decode, for image descriptors.
    pub fn source(&self) -> Option<&str> {
        match self.variant {
            Variant::Image => self.attributes.src.as_deref(),
            _ => None,
        }
    }

    fn node_id(&self, prefix: &str) -> NodeId {
        match &self.id {
            Some(id) => NodeId::intern(id),
            None => NodeId::generate(prefix),
        }
    }

    fn finish(&self, mut node: SceneNode) -> SceneNode {
        let a = &self.attributes;
        node.x = a.x.unwrap_or(0.0);
        node.y = a.y.unwrap_or(0.0);
        node.rotation = a.rotation.unwrap_or(0.0);
        node.opacity = a.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
        node.draggable = a.draggable.unwrap_or(true);
        if self.is_background {
            node.with_role(NodeRole::Background)
        } else {
            node
        }
    }

    /// Build a non-image node. Image descriptors need a decoded bitmap and go
    /// through [`NodeDescriptor::build_image`].
    pub fn build(&self) -> Result<SceneNode, EditorError> {
        let a = &self.attributes;
        let node = match self.variant {
            Variant::Text => {
                let mut props = TextProps::new(
                    a.text.clone().unwrap_or_default(),
                    a.font_size.unwrap_or(18.0),
                    color_attr(a.fill.as_deref(), Color::BLACK)?,
                );
                if let Some(family) = &a.font_family {
                    props.font_family = family.clone();
                }
                props.align = a.align.unwrap_or_default();
                props.line_height = a.line_height.unwrap_or(props.line_height);
                props.letter_spacing = a.letter_spacing.unwrap_or(0.0);
                props.stroke = a.stroke.as_deref().map(parse_css_color).transpose()?;
                props.stroke_width = a.stroke_width.unwrap_or(0.0);
                props.font_style = a.font_style.unwrap_or_default();
                props.wrap_width = a.width;
                let (w, h) = props.estimate_size();
                SceneNode::new(self.node_id("text"), NodeKind::Text(props)).sized(w, h)
            }
            Variant::Rect => {
                let props = RectProps {
                    fill: color_attr(a.fill.as_deref(), Color::BLACK)?,
                    corner_radius: a.corner_radius.unwrap_or(0.0),
                    stroke: a.stroke.as_deref().map(parse_css_color).transpose()?,
                    stroke_width: a.stroke_width.unwrap_or(0.0),
                    fill_pattern: None,
                };
                SceneNode::new(self.node_id("rect"), NodeKind::Rect(props))
                    .sized(a.width.unwrap_or(0.0), a.height.unwrap_or(0.0))
            }
            Variant::Image => {
                return Err(EditorError::Template(
                    "image descriptors are built from a decoded bitmap".into(),
                ));
            }
        };
        Ok(self.finish(node))
    }

    /// Build an image node from its decoded bitmap. Declared size wins over
    /// the bitmap's natural size.
    pub fn build_image(&self, bitmap: &BitmapInfo) -> SceneNode {
        let a = &self.attributes;
        let kind = NodeKind::Image(ImageProps {
            source: bitmap.source.clone(),
            fill_pattern: None,
        });
        let node = SceneNode::new(self.node_id("image"), kind).sized(
            a.width.unwrap_or(bitmap.width),
            a.height.unwrap_or(bitmap.height),
        );
        self.finish(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_parse() {
        for key in Template::builtin_keys() {
            let t = Template::builtin(key).unwrap();
            assert_eq!(t.key, key);
            let (images, others) = t.partition();
            assert_eq!(images.len(), 1);
            assert!(images[0].is_background);
            for d in others {
                d.build().unwrap();
            }
        }
    }

    #[test]
    fn unknown_template_is_an_error() {
        assert!(matches!(
            Template::builtin("carousel9"),
            Err(EditorError::Template(_))
        ));
    }

    #[test]
    fn rect_descriptor_builds_rounded_rect() {
        let t = Template::builtin("carousel4").unwrap();
        let rect = t
            .nodes
            .iter()
            .find(|d| d.variant == Variant::Rect)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(rect.id.as_str(), "cta_rect");
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (40.0, 150.0, 180.0, 50.0));
        match rect.kind {
            NodeKind::Rect(r) => {
                assert_eq!(r.corner_radius, 8.0);
                assert_eq!(r.fill.to_hex(), "#FFB531");
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn image_uses_declared_size_over_bitmap() {
        let t = Template::builtin("carousel1").unwrap();
        let (images, _) = t.partition();
        let bitmap = BitmapInfo {
            source: "assets/templates/carousel1.jpg".into(),
            width: 1080.0,
            height: 1920.0,
        };
        let node = images[0].build_image(&bitmap);
        assert_eq!((node.width, node.height), (300.0, 550.0));
        assert!(node.is_background());
        assert!(!node.draggable);
    }

    #[test]
    fn bad_color_is_rejected() {
        let json = r##"{"key":"x","nodes":[{"variant":"text","attributes":{"fill":"#GG0000"}}]}"##;
        let t = Template::from_json(json).unwrap();
        assert!(matches!(t.nodes[0].build(), Err(EditorError::Color(_))));
    }
}
