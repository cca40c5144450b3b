//! Animation: a frame table bound to its images.
//!
//! [`Animation`] is immutable once built and is shared between sprites
//! through an `Arc`. Besides the table accessors it owns the frame
//! composition routine, [`Animation::compose_frame`], which turns one frame's
//! records into surface calls and updates the caller's [`PartState`]s.
//!
//! # Composition order
//!
//! For every record of the frame, in list order:
//!
//! 1. look up the record's image
//! 2. apply the vertex offset (if any) to the size and the destination
//! 3. add the sprite placement to the destination
//! 4. when the source rectangle has an area: set blend mode and alpha, then
//!    `set_transform(scale, 0, 0, scale, x * scale, y * scale)`,
//!    `rotate(-angle)`, `scale(sx, sy)`,
//!    `translate(-ox + w / 2, -oy + h / 2)`, `scale(flip_h, flip_v)` and blit
//!    the source rectangle centered on the resulting origin
//! 5. store the destination in the part's [`PartState`], whether or not
//!    anything was drawn

use std::sync::Arc;

use glam::Vec2;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::partstate::PartState;
use crate::resources::animationdata::AnimationData;
use crate::resources::imageloader::ImageLoader;
use crate::resources::imageset::ImageSet;
use crate::surface::{DrawSurface, Rect, canvas_transform};

/// Sprite-level placement passed to [`Animation::compose_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    /// Accepted for API compatibility; has no effect on composition yet.
    pub flip_h: bool,
    /// Accepted for API compatibility; has no effect on composition yet.
    pub flip_v: bool,
    /// Uniform surface scale applied to the whole sprite.
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            flip_h: false,
            flip_v: false,
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// Frame table plus the images its records refer to.
pub struct Animation<L: ImageLoader> {
    data: AnimationData,
    images: Arc<ImageSet<L>>,
    parts_map: FxHashMap<String, usize>,
}

impl<L: ImageLoader> Animation<L> {
    /// Bind a table to its images and index the part names.
    ///
    /// When a name appears twice the later index wins; a warning is logged.
    pub fn new(data: AnimationData, images: Arc<ImageSet<L>>) -> Self {
        let mut parts_map = FxHashMap::default();
        for (index, name) in data.parts().iter().enumerate() {
            if let Some(previous) = parts_map.insert(name.clone(), index) {
                warn!(
                    "Duplicate part name '{}': index {} replaces {}",
                    name, index, previous
                );
            }
        }
        Self {
            data,
            images,
            parts_map,
        }
    }

    pub fn frame_rate(&self) -> f64 {
        self.data.frame_rate()
    }

    pub fn frame_count(&self) -> usize {
        self.data.frame_count()
    }

    pub fn parts(&self) -> &[String] {
        self.data.parts()
    }

    pub fn parts_map(&self) -> &FxHashMap<String, usize> {
        &self.parts_map
    }

    pub fn part_index(&self, name: &str) -> Option<usize> {
        self.parts_map.get(name).copied()
    }


    pub fn image_set(&self) -> &Arc<ImageSet<L>> {
        &self.images
    }

    /// Draw every part of `frame_no` and record where each part landed.
    ///
    /// An out-of-range frame draws nothing. Records whose part index has no
    /// state slot are drawn but not recorded.
    pub fn compose_frame<S>(
        &self,
        surface: &mut S,
        frame_no: usize,
        placement: Placement,
        part_states: &mut [PartState],
    ) where
        S: DrawSurface<Image = L::Image>,
    {
        let Some(records) = self.data.frame(frame_no) else {
            debug!(
                "compose_frame: frame {} out of range (count {})",
                frame_no,
                self.frame_count()
            );
            return;
        };
        let scale = placement.scale;

        for record in records {
            let image = self.images.get_image(record.image_index);

            let offset = record.vertex_offset();
            let width = record.src.width - offset.x;
            let height = record.src.height - offset.y;
            let dest = record.dst + offset + Vec2::new(placement.x, placement.y);

            if record.src.has_area() {
                let origin = record.origin();
                let flip = record.flip_signs();

                surface.set_blend_mode(record.blend_mode());
                surface.set_global_alpha(record.alpha());
                surface.set_transform(canvas_transform(
                    scale,
                    0.0,
                    0.0,
                    scale,
                    dest.x * scale,
                    dest.y * scale,
                ));
                surface.rotate(-record.angle);
                surface.scale(record.scale.x, record.scale.y);
                surface.translate(-origin.x + width / 2.0, -origin.y + height / 2.0);
                surface.scale(flip.x, flip.y);

                if let Some(image) = image {
                    surface.draw_image(
                        &image,
                        record.src,
                        Rect::new(-width / 2.0, -height / 2.0, width, height),
                    );
                }
            }

            match part_states.get_mut(record.part_index) {
                Some(state) => {
                    state.x = dest.x;
                    state.y = dest.y;
                }
                None => debug!("compose_frame: no state for part {}", record.part_index),
            }
        }
    }
}
