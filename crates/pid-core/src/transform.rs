//! Pan/zoom transform between scene and viewport coordinates.
//!
//! `viewport = scene * scale + translate`. The scale is always kept inside
//! `ScaleLimits`; every constructor and operation re-clamps.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

// ─── Limits ──────────────────────────────────────────────────────────────

/// Inclusive bounds on the zoom scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl ScaleLimits {
    pub const DEFAULT: ScaleLimits = ScaleLimits { min: 0.1, max: 10.0 };

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    /// `min <= max`, both finite and positive.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── View transform ──────────────────────────────────────────────────────

/// The viewer's current pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn translate(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// Scene point → viewport point.
    pub fn to_viewport(&self, scene: Point) -> Point {
        Point::new(
            scene.x * self.scale + self.translate_x,
            scene.y * self.scale + self.translate_y,
        )
    }

    /// Viewport point → scene point.
    pub fn to_scene(&self, viewport: Point) -> Point {
        Point::new(
            (viewport.x - self.translate_x) / self.scale,
            (viewport.y - self.translate_y) / self.scale,
        )
    }

    /// Multiply the scale by `factor` (clamped), keeping the scene point
    /// under `pivot` fixed on screen.
    ///
    /// A non-finite or non-positive factor leaves the transform unchanged.
    #[must_use]
    pub fn zoomed(&self, factor: f64, pivot: Point, limits: ScaleLimits) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("ignoring zoom factor {factor}");
            return *self;
        }
        let scale = limits.clamp(self.scale * factor);
        // Scene point under the pivot, from the pre-zoom transform.
        let anchor = self.to_scene(pivot);
        Self {
            scale,
            translate_x: pivot.x - anchor.x * scale,
            translate_y: pivot.y - anchor.y * scale,
        }
    }

    /// Replace the translation, keeping the scale.
    #[must_use]
    pub fn with_translate(&self, translate: Vec2) -> Self {
        Self {
            translate_x: translate.x,
            translate_y: translate.y,
            ..*self
        }
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translate()) * Affine::scale(self.scale)
    }

    /// The SVG `transform` attribute value applied to the diagram group.
    pub fn to_svg_attribute(&self) -> String {
        format!(
            "translate({} {}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn zoom_keeps_pivot_fixed() {
        let start = ViewTransform {
            scale: 1.3,
            translate_x: -40.0,
            translate_y: 25.0,
        };
        let pivot = Point::new(320.0, 180.0);
        for factor in [1.1, 1.0 / 1.1, 2.0, 0.5] {
            let under = start.to_scene(pivot);
            let next = start.zoomed(factor, pivot, ScaleLimits::DEFAULT);
            assert!(close(next.to_viewport(under), pivot), "factor {factor}");
        }
    }

    #[test]
    fn zoom_clamps() {
        let mut t = ViewTransform::IDENTITY;
        for _ in 0..100 {
            t = t.zoomed(1.7, Point::new(10.0, 10.0), ScaleLimits::DEFAULT);
            assert!(t.scale <= 10.0);
        }
        assert_eq!(t.scale, 10.0);
        for _ in 0..100 {
            t = t.zoomed(0.3, Point::new(10.0, 10.0), ScaleLimits::DEFAULT);
            assert!(t.scale >= 0.1);
        }
        assert_eq!(t.scale, 0.1);
    }

    #[test]
    fn zoom_roundtrip_restores_scale() {
        let t = ViewTransform::IDENTITY;
        let pivot = Point::new(50.0, 70.0);
        let back = t
            .zoomed(1.2, pivot, ScaleLimits::DEFAULT)
            .zoomed(1.0 / 1.2, pivot, ScaleLimits::DEFAULT);
        assert!((back.scale - 1.0).abs() < EPS);
        assert!(back.translate_x.abs() < EPS);
        assert!(back.translate_y.abs() < EPS);
    }

    #[test]
    fn bad_factor_is_ignored() {
        let t = ViewTransform::IDENTITY;
        assert_eq!(t.zoomed(0.0, Point::ORIGIN, ScaleLimits::DEFAULT), t);
        assert_eq!(t.zoomed(f64::NAN, Point::ORIGIN, ScaleLimits::DEFAULT), t);
    }

    #[test]
    fn affine_matches_manual_mapping() {
        let t = ViewTransform {
            scale: 2.0,
            translate_x: 5.0,
            translate_y: -3.0,
        };
        let p = Point::new(7.0, 11.0);
        assert!(close(t.to_affine() * p, t.to_viewport(p)));
        assert_eq!(t.to_svg_attribute(), "translate(5 -3) scale(2)");
    }
}
