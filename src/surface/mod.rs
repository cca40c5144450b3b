//! Drawing surface contract.
//!
//! [`DrawSurface`] is the immediate-mode 2D canvas the player draws onto. It
//! carries a current affine transform, a global alpha and a blend mode, and
//! blits sub-rectangles of image handles through that state.
//!
//! Submodules:
//! - [`recording`] – headless surface that records every call
//! - `raylib` – windowed backend (feature `raylib`)

use std::sync::Arc;

pub use glam::{Affine2, Vec2};

#[cfg(feature = "raylib")]
pub mod raylib;
pub mod recording;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when both sides are strictly positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Compositing rule used when a part is blitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Source-over alpha blending.
    #[default]
    Normal,
    /// Source and destination colors are added.
    Additive,
}

impl BlendMode {
    /// Map a blend index from an exported frame table.
    ///
    /// Indices 0..=3 map to {Normal, Normal, Additive, Normal}; anything
    /// outside the table draws as [`BlendMode::Normal`].
    pub fn from_index(index: i64) -> Self {
        match index {
            2 => BlendMode::Additive,
            _ => BlendMode::Normal,
        }
    }

    /// Name of the equivalent HTML canvas composite operation.
    pub fn composite_operation(&self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            BlendMode::Additive => "lighter",
        }
    }
}

/// Build a transform from canvas-style `setTransform(a, b, c, d, e, f)` arguments.
pub fn canvas_transform(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Affine2 {
    Affine2::from_cols(Vec2::new(a, b), Vec2::new(c, d), Vec2::new(e, f))
}

/// Immediate-mode 2D drawing surface.
///
/// Implementors only have to store the transform; the relative operations
/// compose onto it by default, each one applied in the local space of the
/// previous ones.
pub trait DrawSurface {
    /// Image handle type this surface can blit.
    type Image;

    /// Current transform.
    fn transform(&self) -> Affine2;

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine2);

    /// Compose a rotation (radians, clockwise on a y-down surface).
    fn rotate(&mut self, radians: f32) {
        let t = self.transform() * Affine2::from_angle(radians);
        self.set_transform(t);
    }

    /// Compose a per-axis scale.
    fn scale(&mut self, sx: f32, sy: f32) {
        let t = self.transform() * Affine2::from_scale(Vec2::new(sx, sy));
        self.set_transform(t);
    }

    /// Compose a translation.
    fn translate(&mut self, tx: f32, ty: f32) {
        let t = self.transform() * Affine2::from_translation(Vec2::new(tx, ty));
        self.set_transform(t);
    }

    /// Set the opacity applied to subsequent blits, in `[0, 1]`.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Set the compositing rule applied to subsequent blits.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Blit `src` of `image` into `dst`, scaling as needed, through the
    /// current transform.
    fn draw_image(&mut self, image: &Arc<Self::Image>, src: Rect, dst: Rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_blend_from_index() {
        assert_eq!(BlendMode::from_index(0), BlendMode::Normal);
        assert_eq!(BlendMode::from_index(1), BlendMode::Normal);
        assert_eq!(BlendMode::from_index(2), BlendMode::Additive);
        assert_eq!(BlendMode::from_index(3), BlendMode::Normal);
        assert_eq!(BlendMode::from_index(-1), BlendMode::Normal);
        assert_eq!(BlendMode::from_index(42), BlendMode::Normal);
    }

    #[test]
    fn test_composite_operation_names() {
        assert_eq!(BlendMode::Normal.composite_operation(), "source-over");
        assert_eq!(BlendMode::Additive.composite_operation(), "lighter");
    }

    #[test]
    fn test_rect_has_area() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).has_area());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).has_area());
        assert!(!Rect::new(0.0, 0.0, 4.0, -2.0).has_area());
    }

    #[test]
    fn test_canvas_transform_layout() {
        let t = canvas_transform(2.0, 0.0, 0.0, 3.0, 10.0, 20.0);
        assert!(approx_eq(t.transform_point2(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 23.0)));
    }

    #[test]
    fn test_relative_ops_compose_in_local_space() {
        let mut s = RecordingSurface::<()>::new();
        s.set_transform(canvas_transform(1.0, 0.0, 0.0, 1.0, 100.0, 0.0));
        s.rotate(std::f32::consts::FRAC_PI_2);
        s.translate(10.0, 0.0);
        // the translation happens along the rotated x axis
        let p = s.transform().transform_point2(Vec2::ZERO);
        assert!(approx_eq(p, Vec2::new(100.0, 10.0)));
    }

    #[test]
    fn test_scale_then_translate_scales_translation() {
        let mut s = RecordingSurface::<()>::new();
        s.scale(2.0, 3.0);
        s.translate(1.0, 1.0);
        let p = s.transform().transform_point2(Vec2::ZERO);
        assert!(approx_eq(p, Vec2::new(2.0, 3.0)));
    }
}
