//! Stage geometry: bounding boxes, the stage viewport, and fit helpers.

use serde::{Deserialize, Serialize};

/// Size of the stage (the device mockup surface) in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top-left corner that centres a `w × h` box on the stage.
    pub fn centered(&self, w: f32, h: f32) -> (f32, f32) {
        (self.width / 2.0 - w / 2.0, self.height / 2.0 - h / 2.0)
    }
}

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box of a `width × height` box placed at `(x, y)`, scaled and
    /// then rotated (degrees, clockwise) about that origin.
    pub fn transformed(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Self {
        let w = width * scale_x;
        let h = height * scale_y;
        if rotation == 0.0 {
            return Self::new(x + w.min(0.0), y + h.min(0.0), w.abs(), h.abs());
        }
        let (sin, cos) = rotation.to_radians().sin_cos();
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(cx, cy): (f32, f32)| {
            (x + cx * cos - cy * sin, y + cx * sin + cy * cos)
        });
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for (px, py) in corners {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Scale `width × height` to fit inside `max_w × max_h`, preserving aspect
/// ratio. Content smaller than the box is scaled up.
pub fn fit_contain(width: f32, height: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    if width <= 0.0 || height <= 0.0 {
        return (width.max(0.0), height.max(0.0));
    }
    let ratio = (max_w / width).min(max_h / height);
    (width * ratio, height * ratio)
}

/// Like [`fit_contain`] but never enlarges content that already fits.
pub fn fit_shrink(width: f32, height: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    if width > max_w || height > max_h {
        fit_contain(width, height, max_w, max_h)
    } else {
        (width, height)
    }
}
