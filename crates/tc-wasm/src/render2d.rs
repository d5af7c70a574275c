//! Canvas 2D painter for the display list.
//!
//! Used for the on-screen stage and for PNG export. Decoded bitmaps and
//! video elements live on the JS side; the painter looks them up through
//! [`Assets`] and falls back to a flat fill while they are missing.

use std::collections::HashMap;
use tc_core::id::NodeId;
use tc_core::model::{Shadow, TextAlign};
use tc_render::display::{HANDLE_STROKE, handle_anchors};
use tc_render::{Affine, DisplayList, DrawItem, DrawShape};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, HtmlVideoElement};

const MISSING_FILL: &str = "#555555";

/// Browser-side resources the display list refers to.
pub struct Assets<'a> {
    pub images: &'a HashMap<String, HtmlImageElement>,
    pub video: &'a dyn Fn(NodeId) -> Option<HtmlVideoElement>,
}

/// Paint `list` scaled by `scale` (1.0 on screen, the export ratio for PNG).
pub fn paint(ctx: &CanvasRenderingContext2d, list: &DisplayList, assets: &Assets<'_>, scale: f64) {
    let _ = ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, list.width as f64, list.height as f64);
    ctx.set_fill_style_str(&list.background.to_css());
    ctx.fill_rect(0.0, 0.0, list.width as f64, list.height as f64);

    for item in &list.items {
        ctx.save();
        paint_item(ctx, item, assets, scale);
        ctx.restore();
    }
}

fn paint_item(ctx: &CanvasRenderingContext2d, item: &DrawItem, assets: &Assets<'_>, scale: f64) {
    if let DrawShape::Handles { bounds } = &item.shape {
        let _ = ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
        paint_handles(ctx, bounds);
        return;
    }

    let [a, b, c, d, e, f] = (Affine::scale(scale) * item.transform).as_coeffs();
    let _ = ctx.set_transform(a, b, c, d, e, f);
    ctx.set_global_alpha(item.opacity as f64);
    if let Some(shadow) = &item.shadow {
        apply_shadow(ctx, shadow, scale);
    }

    match &item.shape {
        DrawShape::Rect {
            width,
            height,
            fill,
            corner_radius,
            stroke,
            pattern,
        } => {
            let (w, h) = (*width as f64, *height as f64);
            rounded_rect_path(ctx, 0.0, 0.0, w, h, *corner_radius as f64);
            match pattern.as_deref().and_then(|src| assets.images.get(src)) {
                Some(img) => {
                    ctx.set_fill_style_str(&fill.to_css());
                    ctx.fill();
                    clear_shadow(ctx);
                    ctx.clip();
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w, h);
                }
                None => {
                    ctx.set_fill_style_str(&fill.to_css());
                    ctx.fill();
                    clear_shadow(ctx);
                }
            }
            if let Some((color, width)) = stroke.filter(|(_, w)| *w > 0.0) {
                rounded_rect_path(ctx, 0.0, 0.0, w, h, *corner_radius as f64);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(width as f64);
                ctx.stroke();
            }
        }
        DrawShape::Text {
            content,
            font,
            font_size,
            fill,
            align,
            line_height,
            letter_spacing,
            stroke,
            width,
        } => {
            ctx.set_font(font);
            ctx.set_text_baseline("top");
            let width = *width as f64;
            let measure = |s: &str| {
                ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0)
                    + *letter_spacing as f64 * s.chars().count() as f64
            };
            let lines = wrap_lines(content, width, measure);
            let advance = *font_size as f64 * *line_height as f64;
            for (i, line) in lines.iter().enumerate() {
                let y = i as f64 * advance;
                let x = match align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => (width - measure(line)) / 2.0,
                    TextAlign::Right => width - measure(line),
                };
                draw_spaced(ctx, line, x, y, *letter_spacing as f64, |s, x, y| {
                    ctx.set_fill_style_str(&fill.to_css());
                    let _ = ctx.fill_text(s, x, y);
                });
                if let Some((color, w)) = stroke.filter(|(_, w)| *w > 0.0) {
                    clear_shadow(ctx);
                    draw_spaced(ctx, line, x, y, *letter_spacing as f64, |s, x, y| {
                        ctx.set_stroke_style_str(&color.to_css());
                        ctx.set_line_width(w as f64);
                        let _ = ctx.stroke_text(s, x, y);
                    });
                }
            }
        }
        DrawShape::Image {
            source,
            width,
            height,
        } => {
            let (w, h) = (*width as f64, *height as f64);
            match assets.images.get(source) {
                Some(img) => {
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w, h);
                }
                None => {
                    ctx.set_fill_style_str(MISSING_FILL);
                    ctx.fill_rect(0.0, 0.0, w, h);
                }
            }
        }
        DrawShape::VideoFrame {
            width,
            height,
            backdrop,
        } => {
            let (w, h) = (*width as f64, *height as f64);
            ctx.set_fill_style_str(&backdrop.to_css());
            ctx.fill_rect(0.0, 0.0, w, h);
            clear_shadow(ctx);
            if let Some(video) = (assets.video)(item.node) {
                let _ = ctx.draw_image_with_html_video_element_and_dw_and_dh(&video, 0.0, 0.0, w, h);
            }
        }
        DrawShape::Handles { .. } => {}
    }
}

fn paint_handles(ctx: &CanvasRenderingContext2d, bounds: &tc_core::geometry::Bounds) {
    let stroke = HANDLE_STROKE.to_css();
    ctx.set_stroke_style_str(&stroke);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(
        bounds.x as f64,
        bounds.y as f64,
        bounds.width as f64,
        bounds.height as f64,
    );
    ctx.set_fill_style_str("#FFFFFF");
    for anchor in handle_anchors(bounds) {
        ctx.fill_rect(anchor.x0, anchor.y0, anchor.width(), anchor.height());
        ctx.stroke_rect(anchor.x0, anchor.y0, anchor.width(), anchor.height());
    }
}

/// Draw `line` at (x, y), glyph by glyph when letter spacing is set.
fn draw_spaced(
    ctx: &CanvasRenderingContext2d,
    line: &str,
    x: f64,
    y: f64,
    spacing: f64,
    mut draw: impl FnMut(&str, f64, f64),
) {
    if spacing == 0.0 {
        draw(line, x, y);
        return;
    }
    let mut cursor = x;
    let mut buf = [0u8; 4];
    for ch in line.chars() {
        let glyph = ch.encode_utf8(&mut buf);
        draw(glyph, cursor, y);
        cursor += ctx.measure_text(glyph).map(|m| m.width()).unwrap_or(0.0) + spacing;
    }
}

/// Greedy word wrap. Explicit newlines always break; a single word wider
/// than `width` gets a line of its own.
pub(crate) fn wrap_lines(content: &str, width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && measure(&candidate) > width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.max(0.0).min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

/// Canvas shadows ignore the current transform, so offsets and blur are
/// scaled by hand.
fn apply_shadow(ctx: &CanvasRenderingContext2d, shadow: &Shadow, scale: f64) {
    ctx.set_shadow_blur(shadow.blur as f64 * scale);
    ctx.set_shadow_offset_x(shadow.offset_x as f64 * scale);
    ctx.set_shadow_offset_y(shadow.offset_y as f64 * scale);
    ctx.set_shadow_color(&shadow.color.with_alpha_scaled(shadow.opacity).to_css());
}

fn clear_shadow(ctx: &CanvasRenderingContext2d) {
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(0.0);
    ctx.set_shadow_color("transparent");
}
