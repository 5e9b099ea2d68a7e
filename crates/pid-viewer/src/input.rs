//! Input event abstraction for the viewer.
//!
//! Pointer coordinates are in viewport pixels, relative to the top-left of
//! the viewer element. `Viewport` maps them into the root SVG user space
//! (where the pan/zoom transform lives) the way the browser lays out an
//! `<svg viewBox>` with the default `xMidYMid meet`.

use pid_core::model::ViewBox;
use pid_core::{Point, Vec2};

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Platform command key (⌘ on macOS, Ctrl elsewhere).
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A platform-agnostic viewer input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// Pointer left the viewer element.
    PointerLeave,
    /// Completed click (down and up without a pan in between).
    Click { x: f64, y: f64 },
    /// Wheel notch; negative `delta_y` zooms in.
    Wheel { x: f64, y: f64, delta_y: f64 },
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Click { x, y }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            Self::PointerLeave | Self::Key { .. } => None,
        }
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────

/// Pixel size of the viewer element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Uniform pixels-per-user-unit and the letterbox offset in pixels.
    fn fit(&self, vb: &ViewBox) -> (f64, Vec2) {
        if !self.is_valid() || !vb.is_valid() {
            return (1.0, Vec2::ZERO);
        }
        let scale = (self.width / vb.width).min(self.height / vb.height);
        let offset = Vec2::new(
            (self.width - vb.width * scale) / 2.0,
            (self.height - vb.height * scale) / 2.0,
        );
        (scale, offset)
    }

    /// Viewport pixel → root user-space point.
    pub fn to_user(&self, vb: &ViewBox, pixel: Point) -> Point {
        let (scale, offset) = self.fit(vb);
        Point::new(
            vb.min_x + (pixel.x - offset.x) / scale,
            vb.min_y + (pixel.y - offset.y) / scale,
        )
    }

    /// A pixel distance expressed in user units.
    pub fn to_user_length(&self, vb: &ViewBox, pixels: f64) -> f64 {
        pixels / self.fit(vb).0
    }

    /// Centre of the element, in pixels.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_aspect_is_a_pure_scale() {
        let vp = Viewport::new(500.0, 375.0);
        let p = vp.to_user(&ViewBox::DEFAULT, Point::new(250.0, 100.0));
        assert_eq!(p, Point::new(500.0, 200.0));
        assert_eq!(vp.to_user_length(&ViewBox::DEFAULT, 40.0), 80.0);
    }

    #[test]
    fn letterboxing_is_centered() {
        // 1000x750 box in a 2000x750 element: scale 1, 500px bars on each side.
        let vp = Viewport::new(2000.0, 750.0);
        assert_eq!(vp.to_user(&ViewBox::DEFAULT, Point::new(500.0, 0.0)), Point::ORIGIN);
        assert_eq!(
            vp.to_user(&ViewBox::DEFAULT, vp.center()),
            Point::new(500.0, 375.0)
        );
    }

    #[test]
    fn view_box_origin_is_respected() {
        let vb = ViewBox::new(-50.0, 10.0, 100.0, 100.0);
        let vp = Viewport::new(100.0, 100.0);
        assert_eq!(vp.to_user(&vb, Point::new(0.0, 0.0)), Point::new(-50.0, 10.0));
    }

    #[test]
    fn degenerate_viewport_maps_one_to_one() {
        let vp = Viewport::new(0.0, 0.0);
        assert_eq!(vp.to_user(&ViewBox::DEFAULT, Point::new(3.0, 4.0)), Point::new(3.0, 4.0));
    }
}
