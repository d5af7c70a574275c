//! Selection state and the property-panel protocol.
//!
//! The editor describes the current selection to the panel on every change;
//! the panel renders variant-appropriate controls and sends edits back as
//! `AttrChange`s.

use tc_core::color::Color;
use tc_core::geometry::Viewport;
use tc_core::id::NodeId;
use tc_core::model::{FontStyle, MediaType, NodeKind, SceneNode, TextAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(NodeId),
}

impl Selection {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(self, id: NodeId) -> bool {
        self == Selection::Selected(id)
    }
}

// ─── Panel descriptions ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowControls {
    pub enabled: bool,
    pub color: Color,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextControls {
    pub font_family: String,
    pub font_size: f32,
    pub fill: Color,
    pub align: TextAlign,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonControls {
    pub opacity: f32,
    pub shadow: ShadowControls,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelDescription {
    /// Nothing selected: scene-level properties.
    Canvas {
        background: Color,
        width: f32,
        height: f32,
    },
    Node {
        id: NodeId,
        variant: &'static str,
        common: CommonControls,
        text: Option<TextControls>,
        media: Option<MediaType>,
    },
}

impl PanelDescription {
    pub fn canvas(background: Color, stage: Viewport) -> Self {
        PanelDescription::Canvas {
            background,
            width: stage.width,
            height: stage.height,
        }
    }

    /// Describe a node. Missing values show the editor defaults: shadow
    /// offset 5/5, stroke `#000000`.
    pub fn for_node(node: &SceneNode) -> Self {
        let shadow = if node.shadow.enabled {
            ShadowControls {
                enabled: true,
                color: node.shadow.color,
                offset_x: node.shadow.offset_x,
                offset_y: node.shadow.offset_y,
            }
        } else {
            ShadowControls {
                enabled: false,
                color: Color::BLACK,
                offset_x: 5.0,
                offset_y: 5.0,
            }
        };

        let text = match &node.kind {
            NodeKind::Text(t) => Some(TextControls {
                font_family: t.font_family.clone(),
                font_size: t.font_size,
                fill: t.fill,
                align: t.align,
                line_height: t.line_height,
                letter_spacing: t.letter_spacing,
                stroke_color: t.stroke.unwrap_or(Color::BLACK),
                stroke_width: t.stroke_width,
                bold: t.font_style.is_bold(),
                italic: t.font_style.is_italic(),
            }),
            _ => None,
        };

        PanelDescription::Node {
            id: node.id,
            variant: node.kind.variant_name(),
            common: CommonControls {
                opacity: node.opacity,
                shadow,
            },
            text,
            media: node.media_type(),
        }
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            PanelDescription::Canvas { .. } => None,
            PanelDescription::Node { id, .. } => Some(*id),
        }
    }
}

/// Host-side property panel and toolbar.
pub trait PropertyPanel {
    /// Render controls for the current selection.
    fn describe(&mut self, description: &PanelDescription);

    /// Drop any "active" styling on toolbar buttons.
    fn clear_active_controls(&mut self) {}
}

/// Panel that ignores everything, for headless use.
#[derive(Debug, Default)]
pub struct NullPanel;

impl PropertyPanel for NullPanel {
    fn describe(&mut self, _description: &PanelDescription) {}
}
