//! Windowed drawing backend.
//!
//! Images arrive from the loader thread as encoded bytes. [`TextureCache`]
//! turns them into GPU textures on the main thread once per frame, and
//! [`RaylibSurface`] blits them through rlgl's matrix stack so the surface
//! transform applies unchanged.
//!
//! Everything here holds GPU resources and must stay on the thread that
//! created the window.

use std::sync::Arc;

use log::{debug, warn};
use raylib::ffi;
use raylib::prelude::*;
use rustc_hash::FxHashMap;

use super::{Affine2, BlendMode, DrawSurface, Rect};
use crate::resources::imageloader::ImageBytes;

struct CachedTexture {
    /// Keeps the key pointer alive while the texture exists.
    _source: Arc<ImageBytes>,
    texture: Option<Texture2D>,
}

/// GPU textures keyed by the image handle they were uploaded from.
#[derive(Default)]
pub struct TextureCache {
    map: FxHashMap<usize, CachedTexture>,
}

fn key(image: &Arc<ImageBytes>) -> usize {
    Arc::as_ptr(image) as usize
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload every image not seen yet and drop textures whose image is no
    /// longer in `images`.
    ///
    /// Decode failures are logged once and leave the image undrawable.
    pub fn sync(&mut self, rl: &mut RaylibHandle, th: &RaylibThread, images: &[Arc<ImageBytes>]) {
        self.map
            .retain(|k, _| images.iter().any(|image| key(image) == *k));

        for image in images {
            let k = key(image);
            if self.map.contains_key(&k) {
                continue;
            }
            let texture = match Self::upload(rl, th, image) {
                Ok(texture) => {
                    debug!("Uploaded texture for {}", image.path);
                    Some(texture)
                }
                Err(e) => {
                    warn!("Failed to upload {}: {}", image.path, e);
                    None
                }
            };
            self.map.insert(
                k,
                CachedTexture {
                    _source: Arc::clone(image),
                    texture,
                },
            );
        }
    }

    fn upload(
        rl: &mut RaylibHandle,
        th: &RaylibThread,
        image: &ImageBytes,
    ) -> Result<Texture2D, String> {
        let ext = image
            .extension()
            .ok_or_else(|| "missing file extension".to_string())?;
        let decoded = Image::load_image_from_mem(&ext, &image.bytes)
            .map_err(|e| format!("decode failed: {}", e))?;
        rl.load_texture_from_image(th, &decoded)
            .map_err(|e| format!("texture upload failed: {}", e))
    }

    pub fn get(&self, image: &Arc<ImageBytes>) -> Option<&Texture2D> {
        self.map
            .get(&key(image))
            .and_then(|cached| cached.texture.as_ref())
    }
}

fn raylib_blend(mode: BlendMode) -> i32 {
    match mode {
        BlendMode::Normal => ffi::BlendMode::BLEND_ALPHA as i32,
        BlendMode::Additive => ffi::BlendMode::BLEND_ADDITIVE as i32,
    }
}

/// Column-major 4x4 form of a 2D affine transform, as rlgl expects it.
fn to_gl_matrix(t: Affine2) -> [f32; 16] {
    let m = t.matrix2;
    let o = t.translation;
    [
        m.x_axis.x, m.x_axis.y, 0.0, 0.0, //
        m.y_axis.x, m.y_axis.y, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        o.x, o.y, 0.0, 1.0,
    ]
}

/// [`DrawSurface`] over a raylib draw handle.
pub struct RaylibSurface<'a, D: RaylibDraw> {
    d: &'a mut D,
    textures: &'a TextureCache,
    transform: Affine2,
    alpha: f32,
    blend: BlendMode,
}

impl<'a, D: RaylibDraw> RaylibSurface<'a, D> {
    pub fn new(d: &'a mut D, textures: &'a TextureCache) -> Self {
        // Flipped parts have mirrored winding.
        unsafe { ffi::rlDisableBackfaceCulling() };
        Self {
            d,
            textures,
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::Normal,
        }
    }
}

impl<D: RaylibDraw> DrawSurface for RaylibSurface<'_, D> {
    type Image = ImageBytes;

    fn transform(&self) -> Affine2 {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.transform = transform;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn draw_image(&mut self, image: &Arc<ImageBytes>, src: Rect, dst: Rect) {
        let Some(texture) = self.textures.get(image) else {
            return;
        };
        let matrix = to_gl_matrix(self.transform);
        let tint = Color::new(255, 255, 255, (self.alpha * 255.0).round() as u8);

        unsafe {
            ffi::BeginBlendMode(raylib_blend(self.blend));
            ffi::rlPushMatrix();
            ffi::rlMultMatrixf(matrix.as_ptr());
        }
        self.d.draw_texture_pro(
            texture,
            Rectangle::new(src.x, src.y, src.width, src.height),
            Rectangle::new(dst.x, dst.y, dst.width, dst.height),
            Vector2::zero(),
            0.0,
            tint,
        );
        unsafe {
            ffi::rlPopMatrix();
            ffi::EndBlendMode();
        }
    }
}
