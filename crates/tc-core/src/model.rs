//! Scene node data model.
//!
//! A scene is a flat, z-ordered layer of typed nodes. Only media groups have
//! children (the backdrop and icon of an audio proxy). Every variant-specific
//! field lives inside its `NodeKind` payload, so reaching it always goes
//! through a `match`.

use crate::animation::AnimationHandle;
use crate::color::Color;
use crate::geometry::Bounds;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const EMOJI_FONT_FAMILY: &str = "Segoe UI Emoji, Apple Color Emoji, sans-serif";

// ─── Text styling ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

impl FromStr for TextAlign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(TextAlign::Left),
            "center" => Ok(TextAlign::Center),
            "right" => Ok(TextAlign::Right),
            _ => Err(()),
        }
    }
}

/// Font style as the composition of the bold and italic toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "bold")]
    Bold,
    #[serde(rename = "italic")]
    Italic,
    #[serde(rename = "bold italic")]
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Normal,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    pub fn toggled_bold(self) -> Self {
        Self::from_flags(!self.is_bold(), self.is_italic())
    }

    pub fn toggled_italic(self) -> Self {
        Self::from_flags(self.is_bold(), !self.is_italic())
    }

    /// CSS `font` prefix, e.g. `"italic bold "`; empty for normal.
    pub fn css_prefix(self) -> &'static str {
        match self {
            FontStyle::Normal => "",
            FontStyle::Bold => "bold ",
            FontStyle::Italic => "italic ",
            FontStyle::BoldItalic => "italic bold ",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
            FontStyle::BoldItalic => "bold italic",
        }
    }
}

impl FromStr for FontStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bold = s.contains("bold");
        let italic = s.contains("italic");
        if !bold && !italic && s.trim() != "normal" {
            return Err(());
        }
        Ok(Self::from_flags(bold, italic))
    }
}

// ─── Shadow ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub enabled: bool,
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub opacity: f32,
}

impl Shadow {
    /// What the shadow toggle switches on.
    pub fn preset() -> Self {
        Self {
            enabled: true,
            color: Color::BLACK,
            blur: 10.0,
            offset_x: 5.0,
            offset_y: 5.0,
            opacity: 0.5,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            blur: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.enabled && self.opacity > 0.0
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Self::disabled()
    }
}

// ─── Variant payloads ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub fill: Color,
    pub align: TextAlign,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    pub font_style: FontStyle,
    /// Word-wrap width; `None` sizes the box to the content.
    pub wrap_width: Option<f32>,
}

impl TextProps {
    pub fn new(content: impl Into<String>, font_size: f32, fill: Color) -> Self {
        Self {
            content: content.into(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size,
            fill,
            align: TextAlign::Left,
            line_height: DEFAULT_LINE_HEIGHT,
            letter_spacing: 0.0,
            stroke: None,
            stroke_width: 0.0,
            font_style: FontStyle::Normal,
            wrap_width: None,
        }
    }

    /// Approximate box size without a font context. Hosts with real text
    /// metrics overwrite the node size after measuring.
    pub fn estimate_size(&self) -> (f32, f32) {
        let advance = self.font_size * 0.6 + self.letter_spacing;
        let longest = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as f32;
        let natural_width = longest * advance;
        let width = self.wrap_width.unwrap_or(natural_width);

        let mut lines = 0usize;
        for line in self.content.split('\n') {
            let chars = line.chars().count() as f32 * advance;
            lines += match self.wrap_width {
                Some(w) if w > 0.0 && chars > w => (chars / w).ceil() as usize,
                _ => 1,
            };
        }
        let height = lines.max(1) as f32 * self.font_size * self.line_height;
        (width, height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    /// Bitmap source reference (URL or data URL).
    pub source: String,
    /// Bitmap painted as a pattern fill instead of `source`, set when an
    /// image is dropped onto a placeholder.
    pub fill_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectProps {
    pub fill: Color,
    pub corner_radius: f32,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    /// Bitmap painted as a pattern fill (drop onto a placeholder).
    pub fill_pattern: Option<String>,
}

impl RectProps {
    pub fn filled(fill: Color) -> Self {
        Self {
            fill,
            corner_radius: 0.0,
            stroke: None,
            stroke_width: 0.0,
            fill_pattern: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
        }
    }
}

/// A media proxy. The HTML element itself is owned by the editor's media
/// registry under this node's id; only the source reference is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProps {
    pub media_type: MediaType,
    pub source: String,
    /// Fallback fill drawn behind video frames.
    pub backdrop: Color,
}

/// The node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Text(TextProps),
    Image(ImageProps),
    Rect(RectProps),
    MediaGroup(MediaProps),
}

impl NodeKind {
    pub fn variant_name(&self) -> &'static str {
        match self {
            NodeKind::Text(_) => "text",
            NodeKind::Image(_) => "image",
            NodeKind::Rect(_) => "rect",
            NodeKind::MediaGroup(_) => "media",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            NodeKind::Text(_) => "text",
            NodeKind::Image(_) => "image",
            NodeKind::Rect(_) => "rect",
            NodeKind::MediaGroup(m) => m.media_type.as_str(),
        }
    }
}

/// What a node is for. Only `Editable` nodes are selectable, draggable or
/// deletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeRole {
    #[default]
    Editable,
    /// The template backdrop, pinned to the lowest z-order.
    Background,
    /// Parts of a composite node (media group backdrop and icon).
    Structural,
}

// ─── Attribute edits ─────────────────────────────────────────────────────

/// One attribute edit coming from the property panel, a toolbar, or a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrChange {
    Opacity(f32),
    Fill(Color),
    FontFamily(String),
    FontSize(f32),
    Align(TextAlign),
    LineHeight(f32),
    LetterSpacing(f32),
    StrokeColor(Color),
    StrokeWidth(f32),
    FontStyle(FontStyle),
    Shadow(bool),
    ShadowColor(Color),
    ShadowBlur(f32),
    ShadowOffsetX(f32),
    ShadowOffsetY(f32),
    Position(f32, f32),
    Size(f32, f32),
    Rotation(f32),
    Scale(f32, f32),
    Content(String),
    CornerRadius(f32),
}

/// The effective value after an edit was applied (clamped, normalized).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f32),
    Pair(f32, f32),
    Color(Color),
    Text(String),
    Align(TextAlign),
    FontStyle(FontStyle),
    Flag(bool),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{n}"),
            AttrValue::Pair(a, b) => write!(f, "{a},{b}"),
            AttrValue::Color(c) => write!(f, "{c}"),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Align(a) => f.write_str(a.as_str()),
            AttrValue::FontStyle(s) => f.write_str(s.as_str()),
            AttrValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

// ─── Scene node ──────────────────────────────────────────────────────────

/// Decoded bitmap dimensions handed over by an image decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapInfo {
    pub source: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, clockwise, about `(x, y)`.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub opacity: f32,
    pub draggable: bool,
    /// Cleared while the node is being edited in place.
    pub visible: bool,
    pub role: NodeRole,
    pub shadow: Shadow,

    /// Running entrance animation, if any.
    #[serde(skip)]
    pub animation: Option<AnimationHandle>,
    /// Position saved by a position-based animation.
    #[serde(skip)]
    pub rest_position: Option<(f32, f32)>,
}

impl SceneNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            draggable: true,
            visible: true,
            role: NodeRole::Editable,
            shadow: Shadow::default(),
            animation: None,
            rest_position: None,
        }
    }

    /// A new node with a generated id.
    pub fn create(kind: NodeKind) -> Self {
        let id = NodeId::generate(kind.id_prefix());
        Self::new(id, kind)
    }

    pub fn text(props: TextProps) -> Self {
        let (w, h) = props.estimate_size();
        Self::create(NodeKind::Text(props)).sized(w, h)
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self.draggable = role == NodeRole::Editable && self.draggable;
        self
    }

    pub fn is_editable(&self) -> bool {
        self.role == NodeRole::Editable
    }

    pub fn is_background(&self) -> bool {
        self.role == NodeRole::Background
    }

    pub fn is_media(&self) -> bool {
        matches!(self.kind, NodeKind::MediaGroup(_))
    }

    pub fn media_type(&self) -> Option<MediaType> {
        match &self.kind {
            NodeKind::MediaGroup(m) => Some(m.media_type),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Rendered bounding box in canvas coordinates.
    pub fn client_rect(&self) -> Bounds {
        Bounds::transformed(
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation,
            self.scale_x,
            self.scale_y,
        )
    }

    /// Deep copy with a fresh id, offset by `(dx, dy)`. Runtime state
    /// (animation handle, saved rest position) is not carried over.
    pub fn duplicate(&self, dx: f32, dy: f32) -> Self {
        let mut copy = self.clone();
        copy.id = self.id.derived();
        copy.x += dx;
        copy.y += dy;
        copy.role = NodeRole::Editable;
        copy.draggable = true;
        copy.visible = true;
        copy.animation = None;
        copy.rest_position = None;
        copy
    }

    /// Recompute the box of a text node from its metrics.
    pub fn refresh_text_metrics(&mut self) {
        if let NodeKind::Text(t) = &self.kind {
            let (w, h) = t.estimate_size();
            self.width = w;
            self.height = h;
        }
    }

    /// Apply one attribute edit. Returns the effective value, or `None` when
    /// the edit does not apply to this variant.
    pub fn apply(&mut self, change: AttrChange) -> Option<AttrValue> {
        let value = match change {
            AttrChange::Opacity(v) => {
                self.opacity = v.clamp(0.0, 1.0);
                AttrValue::Number(self.opacity)
            }
            AttrChange::Position(x, y) => {
                self.x = x;
                self.y = y;
                AttrValue::Pair(x, y)
            }
            AttrChange::Size(w, h) => {
                self.width = w.max(0.0);
                self.height = h.max(0.0);
                if let NodeKind::Text(t) = &mut self.kind {
                    t.wrap_width = Some(self.width);
                }
                AttrValue::Pair(self.width, self.height)
            }
            AttrChange::Rotation(deg) => {
                self.rotation = deg.rem_euclid(360.0);
                AttrValue::Number(self.rotation)
            }
            AttrChange::Scale(sx, sy) => {
                self.scale_x = sx;
                self.scale_y = sy;
                AttrValue::Pair(sx, sy)
            }
            AttrChange::Shadow(on) => {
                self.shadow = if on { Shadow::preset() } else { Shadow::disabled() };
                AttrValue::Flag(on)
            }
            AttrChange::ShadowColor(c) => {
                self.shadow.color = c;
                AttrValue::Color(c)
            }
            AttrChange::ShadowBlur(b) => {
                self.shadow.blur = b.max(0.0);
                AttrValue::Number(self.shadow.blur)
            }
            AttrChange::ShadowOffsetX(dx) => {
                self.shadow.offset_x = dx;
                AttrValue::Number(dx)
            }
            AttrChange::ShadowOffsetY(dy) => {
                self.shadow.offset_y = dy;
                AttrValue::Number(dy)
            }
            change => return self.apply_variant(change),
        };
        Some(value)
    }

    fn apply_variant(&mut self, change: AttrChange) -> Option<AttrValue> {
        let value = match (&mut self.kind, change) {
            (NodeKind::Text(t), AttrChange::Fill(c)) => {
                t.fill = c;
                AttrValue::Color(c)
            }
            (NodeKind::Rect(r), AttrChange::Fill(c)) => {
                r.fill = c;
                AttrValue::Color(c)
            }
            (NodeKind::Text(t), AttrChange::FontFamily(f)) => {
                t.font_family = f.clone();
                AttrValue::Text(f)
            }
            (NodeKind::Text(t), AttrChange::FontSize(s)) => {
                t.font_size = s.max(1.0);
                AttrValue::Number(t.font_size)
            }
            (NodeKind::Text(t), AttrChange::Align(a)) => {
                t.align = a;
                AttrValue::Align(a)
            }
            (NodeKind::Text(t), AttrChange::LineHeight(lh)) => {
                t.line_height = lh.max(0.0);
                AttrValue::Number(t.line_height)
            }
            (NodeKind::Text(t), AttrChange::LetterSpacing(ls)) => {
                t.letter_spacing = ls;
                AttrValue::Number(ls)
            }
            (NodeKind::Text(t), AttrChange::StrokeColor(c)) => {
                t.stroke = Some(c);
                AttrValue::Color(c)
            }
            (NodeKind::Rect(r), AttrChange::StrokeColor(c)) => {
                r.stroke = Some(c);
                AttrValue::Color(c)
            }
            (NodeKind::Text(t), AttrChange::StrokeWidth(w)) => {
                t.stroke_width = w.max(0.0);
                AttrValue::Number(t.stroke_width)
            }
            (NodeKind::Rect(r), AttrChange::StrokeWidth(w)) => {
                r.stroke_width = w.max(0.0);
                AttrValue::Number(r.stroke_width)
            }
            (NodeKind::Text(t), AttrChange::FontStyle(s)) => {
                t.font_style = s;
                AttrValue::FontStyle(s)
            }
            (NodeKind::Text(t), AttrChange::Content(s)) => {
                t.content = s.clone();
                AttrValue::Text(s)
            }
            (NodeKind::Rect(r), AttrChange::CornerRadius(radius)) => {
                r.corner_radius = radius.max(0.0);
                AttrValue::Number(r.corner_radius)
            }
            _ => return None,
        };
        self.refresh_text_metrics();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> SceneNode {
        SceneNode::text(TextProps::new("Hello", 18.0, Color::WHITE)).at(50.0, 150.0)
    }

    #[test]
    fn setters_return_effective_values() {
        let mut node = hello();
        assert_eq!(node.apply(AttrChange::Opacity(1.7)), Some(AttrValue::Number(1.0)));
        assert_eq!(node.apply(AttrChange::Opacity(-0.2)), Some(AttrValue::Number(0.0)));
        assert_eq!(
            node.apply(AttrChange::StrokeWidth(-4.0)),
            Some(AttrValue::Number(0.0))
        );
        assert_eq!(
            node.apply(AttrChange::Rotation(-90.0)),
            Some(AttrValue::Number(270.0))
        );
    }

    #[test]
    fn variant_mismatch_is_a_no_op() {
        let mut rect = SceneNode::create(NodeKind::Rect(RectProps::filled(Color::BLACK)));
        let before = rect.clone();
        assert_eq!(rect.apply(AttrChange::FontFamily("Anton".into())), None);
        assert_eq!(rect.apply(AttrChange::Content("nope".into())), None);
        assert_eq!(rect, before);
    }

    #[test]
    fn font_style_toggles_compose() {
        let s = FontStyle::Normal.toggled_bold();
        assert_eq!(s, FontStyle::Bold);
        let s = s.toggled_italic();
        assert_eq!(s, FontStyle::BoldItalic);
        let s = s.toggled_bold();
        assert_eq!(s, FontStyle::Italic);
        assert_eq!(s.toggled_italic(), FontStyle::Normal);
        assert_eq!("italic bold".parse::<FontStyle>(), Ok(FontStyle::BoldItalic));
    }

    #[test]
    fn shadow_toggle_uses_preset() {
        let mut node = hello();
        node.apply(AttrChange::Shadow(true));
        assert_eq!(node.shadow, Shadow::preset());
        node.apply(AttrChange::Shadow(false));
        assert!(!node.shadow.is_visible());
        assert_eq!(node.shadow.offset_x, 0.0);
    }

    #[test]
    fn duplicate_gets_fresh_identity_and_offset() {
        let mut node = hello();
        node.apply(AttrChange::Fill(Color::rgb8(255, 181, 49)));
        node.animation = Some(AnimationHandle(7));
        node.rest_position = Some((1.0, 2.0));

        let copy = node.duplicate(20.0, 20.0);
        assert_ne!(copy.id, node.id);
        assert_eq!((copy.x, copy.y), (70.0, 170.0));
        assert_eq!(copy.kind, node.kind);
        assert_eq!(copy.animation, None);
        assert_eq!(copy.rest_position, None);
    }

    #[test]
    fn text_box_grows_with_content() {
        let mut node = hello();
        let (_, one_line) = (node.width, node.height);
        node.apply(AttrChange::Content("Hello\nWorld".into()));
        assert!((node.height - one_line * 2.0).abs() < 1e-3);
    }
}
