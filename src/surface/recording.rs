//! Headless surface that records draw calls.
//!
//! [`RecordingSurface`] keeps the same transform/alpha/blend state a real
//! canvas would and appends one [`DrawOp`] per call. Blits are recorded with
//! the state they were issued under, so a test or a dump can inspect where a
//! part actually lands without rasterizing anything.

use std::sync::Arc;

use super::{Affine2, BlendMode, DrawSurface, Rect};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp<I> {
    SetTransform(Affine2),
    Rotate(f32),
    Scale(f32, f32),
    Translate(f32, f32),
    SetGlobalAlpha(f32),
    SetBlendMode(BlendMode),
    DrawImage {
        image: Arc<I>,
        src: Rect,
        dst: Rect,
        /// Transform in effect when the blit was issued.
        transform: Affine2,
        alpha: f32,
        blend: BlendMode,
    },
}

impl<I> DrawOp<I> {
    pub fn is_draw(&self) -> bool {
        matches!(self, DrawOp::DrawImage { .. })
    }
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface<I> {
    ops: Vec<DrawOp<I>>,
    transform: Affine2,
    alpha: f32,
    blend: BlendMode,
}

impl<I> Default for RecordingSurface<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> RecordingSurface<I> {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::Normal,
        }
    }

    /// All calls recorded so far, in issue order.
    pub fn ops(&self) -> &[DrawOp<I>] {
        &self.ops
    }

    /// Drain the recorded calls, keeping the current state.
    pub fn take_ops(&mut self) -> Vec<DrawOp<I>> {
        std::mem::take(&mut self.ops)
    }

    /// Recorded blits only.
    pub fn draws(&self) -> impl Iterator<Item = &DrawOp<I>> {
        self.ops.iter().filter(|op| op.is_draw())
    }

    pub fn global_alpha(&self) -> f32 {
        self.alpha
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }
}

impl<I> DrawSurface for RecordingSurface<I> {
    type Image = I;

    fn transform(&self) -> Affine2 {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
        self.ops.push(DrawOp::SetTransform(transform));
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform * Affine2::from_scale(glam::Vec2::new(sx, sy));
        self.ops.push(DrawOp::Scale(sx, sy));
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.transform = self.transform * Affine2::from_translation(glam::Vec2::new(tx, ty));
        self.ops.push(DrawOp::Translate(tx, ty));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.ops.push(DrawOp::SetGlobalAlpha(alpha));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.ops.push(DrawOp::SetBlendMode(mode));
    }

    fn draw_image(&mut self, image: &Arc<I>, src: Rect, dst: Rect) {
        self.ops.push(DrawOp::DrawImage {
            image: Arc::clone(image),
            src,
            dst,
            transform: self.transform,
            alpha: self.alpha,
            blend: self.blend,
        });
    }
}
