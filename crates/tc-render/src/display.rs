//! Scene → display list.
//!
//! The display list is the renderer boundary: an ordered, fully resolved list
//! of draw items (back to front) that any painter can consume without
//! touching the scene graph. Transform handles, when attached, are the last
//! item.

use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;
use tc_core::NodeIndex;
use tc_core::color::Color;
use tc_core::geometry::{Bounds, Viewport};
use tc_core::id::NodeId;
use tc_core::model::{MediaType, NodeKind, SceneNode, Shadow, TextAlign};
use tc_core::scene::SceneGraph;

/// Side length of a transform-handle anchor square.
pub const ANCHOR_SIZE: f64 = 10.0;

pub const HANDLE_STROKE: Color = Color::rgba(0.0, 161.0 / 255.0, 1.0, 1.0);

#[derive(Debug, Clone, PartialEq)]
pub enum DrawShape {
    Rect {
        width: f32,
        height: f32,
        fill: Color,
        corner_radius: f32,
        stroke: Option<(Color, f32)>,
        pattern: Option<String>,
    },
    Text {
        content: String,
        /// CSS font shorthand, e.g. `"italic bold 24px Anton"`.
        font: String,
        font_size: f32,
        fill: Color,
        align: TextAlign,
        line_height: f32,
        letter_spacing: f32,
        stroke: Option<(Color, f32)>,
        width: f32,
    },
    Image {
        source: String,
        width: f32,
        height: f32,
    },
    /// Current frame of the video element bound to `node`.
    VideoFrame {
        width: f32,
        height: f32,
        backdrop: Color,
    },
    /// Transform handles around `bounds` (stage coordinates).
    Handles { bounds: Bounds },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    /// Local → stage transform.
    pub transform: Affine,
    /// Effective opacity (parent opacity folded in).
    pub opacity: f32,
    pub shadow: Option<Shadow>,
    pub shape: DrawShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub items: Vec<DrawItem>,
}

impl DisplayList {
    pub fn has_handles(&self) -> bool {
        self.items
            .iter()
            .any(|i| matches!(i.shape, DrawShape::Handles { .. }))
    }

    /// Whether any item needs a redraw every frame (video frames).
    pub fn is_live(&self) -> bool {
        self.items
            .iter()
            .any(|i| matches!(i.shape, DrawShape::VideoFrame { .. }))
    }

    pub fn item(&self, id: NodeId) -> Option<&DrawItem> {
        self.items.iter().find(|i| i.node == id)
    }
}

/// Local → parent transform of a node: translate, rotate, then scale.
pub fn node_affine(node: &SceneNode) -> Affine {
    Affine::translate((node.x as f64, node.y as f64))
        * Affine::rotate((node.rotation as f64).to_radians())
        * Affine::scale_non_uniform(node.scale_x as f64, node.scale_y as f64)
}

/// Build the display list for the current scene. `handles` is the node the
/// transform handles are attached to, if any.
pub fn build_display_list(
    scene: &SceneGraph,
    stage: Viewport,
    background: Color,
    handles: Option<NodeId>,
) -> DisplayList {
    let mut items = Vec::with_capacity(scene.len() + 1);
    for &idx in scene.layer() {
        push_node(scene, idx, Affine::IDENTITY, 1.0, &mut items);
    }

    if let Some(target) = handles.and_then(|id| scene.get(id))
        && target.visible
    {
        items.push(DrawItem {
            node: target.id,
            transform: Affine::IDENTITY,
            opacity: 1.0,
            shadow: None,
            shape: DrawShape::Handles {
                bounds: target.client_rect(),
            },
        });
    }

    DisplayList {
        width: stage.width,
        height: stage.height,
        background,
        items,
    }
}

fn push_node(
    scene: &SceneGraph,
    idx: NodeIndex,
    parent: Affine,
    parent_opacity: f32,
    out: &mut Vec<DrawItem>,
) {
    let node = scene.node(idx);
    if !node.visible {
        return;
    }
    let transform = parent * node_affine(node);
    let opacity = parent_opacity * node.opacity;
    let shadow = node.shadow.is_visible().then_some(node.shadow);

    let shape = match &node.kind {
        NodeKind::Rect(r) => Some(DrawShape::Rect {
            width: node.width,
            height: node.height,
            fill: r.fill,
            corner_radius: r.corner_radius,
            stroke: r.stroke.map(|c| (c, r.stroke_width)),
            pattern: r.fill_pattern.clone(),
        }),
        NodeKind::Text(t) => Some(DrawShape::Text {
            content: t.content.clone(),
            font: format!(
                "{}{}px {}",
                t.font_style.css_prefix(),
                t.font_size,
                t.font_family
            ),
            font_size: t.font_size,
            fill: t.fill,
            align: t.align,
            line_height: t.line_height,
            letter_spacing: t.letter_spacing,
            stroke: t
                .stroke
                .filter(|_| t.stroke_width > 0.0)
                .map(|c| (c, t.stroke_width)),
            width: node.width,
        }),
        NodeKind::Image(img) => Some(DrawShape::Image {
            source: img.fill_pattern.clone().unwrap_or_else(|| img.source.clone()),
            width: node.width,
            height: node.height,
        }),
        NodeKind::MediaGroup(m) => match m.media_type {
            MediaType::Video => Some(DrawShape::VideoFrame {
                width: node.width,
                height: node.height,
                backdrop: m.backdrop,
            }),
            // Audio proxies are drawn entirely by their children.
            MediaType::Audio => None,
        },
    };

    if let Some(shape) = shape {
        out.push(DrawItem {
            node: node.id,
            transform,
            opacity,
            shadow,
            shape,
        });
    }

    for &child in scene.children(idx) {
        push_node(scene, child, transform, opacity, out);
    }
}

/// Anchor squares for transform handles around `bounds`: corners and edge
/// midpoints, plus the rotater above the top edge.
pub fn handle_anchors(bounds: &Bounds) -> SmallVec<[Rect; 9]> {
    let (x0, y0) = (bounds.x as f64, bounds.y as f64);
    let (x1, y1) = (x0 + bounds.width as f64, y0 + bounds.height as f64);
    let (mx, my) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let half = ANCHOR_SIZE / 2.0;
    [
        (x0, y0),
        (mx, y0),
        (x1, y0),
        (x1, my),
        (x1, y1),
        (mx, y1),
        (x0, y1),
        (x0, my),
        (mx, y0 - 50.0),
    ]
    .into_iter()
    .map(|(cx, cy)| Rect::from_center_size(Point::new(cx, cy), (half * 2.0, half * 2.0)))
    .collect()
}
