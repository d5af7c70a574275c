//! Display list → Vello drawing commands.
//!
//! Emits fills, strokes and blurred shadows. Text glyphs and bitmaps need a
//! font context and decoded pixels the painter does not own; they are left
//! to the host and only traced here.

use crate::display::{DisplayList, DrawItem, DrawShape, HANDLE_STROKE, handle_anchors};
use kurbo::{Affine, Rect, RoundedRect, Stroke};
use peniko::{Color, Fill};
use tc_core::color::Color as RgbaColor;
use tc_core::model::Shadow;
use vello::Scene;

/// Paint the whole display list into `scene`, scaled by `scale` (the export
/// pixel ratio, 1.0 on screen).
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_display_list(scene: &mut Scene, list: &DisplayList, scale: f64) {
    let root = Affine::scale(scale);
    let stage = Rect::new(0.0, 0.0, list.width as f64, list.height as f64);
    scene.fill(Fill::NonZero, root, to_peniko(list.background, 1.0), None, &stage);

    for item in &list.items {
        paint_item(scene, root, item);
    }
}

fn paint_item(scene: &mut Scene, root: Affine, item: &DrawItem) {
    let transform = root * item.transform;
    match &item.shape {
        DrawShape::Rect {
            width,
            height,
            fill,
            corner_radius,
            stroke,
            pattern,
        } => {
            let shape = local_rect(*width, *height).to_rounded_rect(*corner_radius as f64);
            if let Some(shadow) = &item.shadow {
                paint_shadow(scene, transform, &shape, shadow, item.opacity);
            }
            if let Some(src) = pattern {
                log::trace!("PATTERN {} ← {src}", item.node);
            }
            scene.fill(
                Fill::NonZero,
                transform,
                to_peniko(*fill, item.opacity),
                None,
                &shape,
            );
            if let Some((color, width)) = stroke.filter(|(_, w)| *w > 0.0) {
                scene.stroke(
                    &Stroke::new(width as f64),
                    transform,
                    to_peniko(color, item.opacity),
                    None,
                    &shape,
                );
            }
        }

        DrawShape::Text { content, font, .. } => {
            if let Some(shadow) = &item.shadow {
                log::trace!("TEXT SHADOW {} blur {}", item.node, shadow.blur);
            }
            log::trace!("TEXT {} {content:?} ({font})", item.node);
        }

        DrawShape::Image {
            source,
            width,
            height,
        } => {
            let shape = local_rect(*width, *height).to_rounded_rect(0.0);
            if let Some(shadow) = &item.shadow {
                paint_shadow(scene, transform, &shape, shadow, item.opacity);
            }
            log::trace!("IMAGE {} ← {source}", item.node);
        }

        DrawShape::VideoFrame {
            width,
            height,
            backdrop,
        } => {
            let shape = local_rect(*width, *height);
            scene.fill(
                Fill::NonZero,
                transform,
                to_peniko(*backdrop, item.opacity),
                None,
                &shape,
            );
        }

        DrawShape::Handles { bounds } => {
            let outline = Rect::new(
                bounds.x as f64,
                bounds.y as f64,
                (bounds.x + bounds.width) as f64,
                (bounds.y + bounds.height) as f64,
            );
            let stroke = Stroke::new(1.0);
            let color = to_peniko(HANDLE_STROKE, 1.0);
            scene.stroke(&stroke, transform, color, None, &outline);
            for anchor in handle_anchors(bounds) {
                scene.fill(Fill::NonZero, transform, Color::WHITE, None, &anchor);
                scene.stroke(&stroke, transform, color, None, &anchor);
            }
        }
    }
}

fn paint_shadow(
    scene: &mut Scene,
    transform: Affine,
    shape: &RoundedRect,
    shadow: &Shadow,
    opacity: f32,
) {
    let offset = Affine::translate((shadow.offset_x as f64, shadow.offset_y as f64));
    let color = to_peniko(shadow.color, shadow.opacity * opacity);
    let radius = shape.radii().top_left;
    scene.draw_blurred_rounded_rect(
        transform * offset,
        shape.rect(),
        color,
        radius,
        (shadow.blur / 2.0) as f64,
    );
}

fn local_rect(width: f32, height: f32) -> Rect {
    Rect::new(0.0, 0.0, width as f64, height as f64)
}

fn to_peniko(color: RgbaColor, opacity: f32) -> Color {
    let [r, g, b, a] = color.with_alpha_scaled(opacity).to_rgba8();
    Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opacity_scales_alpha() {
        let c = to_peniko(RgbaColor::rgb8(255, 0, 0), 0.5);
        let rgba = c.to_rgba8();
        assert_eq!((rgba.r, rgba.g, rgba.b, rgba.a), (255, 0, 0, 128));
    }

    #[test]
    fn painting_an_empty_list_only_fills_stage() {
        let list = DisplayList {
            width: 300.0,
            height: 550.0,
            background: RgbaColor::BLACK,
            items: Vec::new(),
        };
        let mut scene = Scene::new();
        paint_display_list(&mut scene, &list, 3.0);
        assert!(!scene.encoding().is_empty());
    }
}
