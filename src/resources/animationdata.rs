//! Pre-baked animation tables.
//!
//! An [`AnimationData`] is the validated per-frame table an
//! [`Animation`](crate::resources::animation::Animation) plays: a frame rate,
//! the part-name list, and for every frame the ordered list of
//! [`FrameRecord`]s placing each visible part.
//!
//! Exporters write each record as a positional row of numbers where trailing
//! fields may be omitted:
//!
//! | index | field | default |
//! |---|---|---|
//! | 0 | part index | required |
//! | 1 | image index | required |
//! | 2–5 | source x, y, w, h | required |
//! | 6–7 | destination x, y | required |
//! | 8 | angle (radians) | required |
//! | 9–10 | scale x, y | required |
//! | 11–12 | origin x, y | 0 |
//! | 13–14 | flip h, v (non-zero = set) | unset |
//! | 15 | alpha | 1.0 |
//! | 16 | blend index, *or* vertex offset x | 0 |
//! | 17 | vertex offset y ([`RecordLayout::VertexOffset`] only) | 0 |
//!
//! What follows index 15 depends on the exporter. The choice is made once per
//! table with [`RecordLayout`]; a table never mixes both.

use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AnimationError;
use crate::surface::{BlendMode, Rect};

const REQUIRED_FIELDS: usize = 11;
const IDX_ORIGIN_X: usize = 11;
const IDX_ORIGIN_Y: usize = 12;
const IDX_FLIP_H: usize = 13;
const IDX_FLIP_V: usize = 14;
const IDX_ALPHA: usize = 15;
const IDX_BLEND: usize = 16;
const IDX_VERTEX_X: usize = 16;
const IDX_VERTEX_Y: usize = 17;

/// Which trailing fields a table carries after alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordLayout {
    /// Field 16 is a blend index.
    #[default]
    Blend,
    /// Fields 16/17 shift the top-left vertex.
    VertexOffset,
}

impl FromStr for RecordLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blend" => Ok(RecordLayout::Blend),
            "vertex" | "vertex-offset" | "vertex_offset" => Ok(RecordLayout::VertexOffset),
            other => Err(format!("unknown record layout '{}'", other)),
        }
    }
}

impl std::fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordLayout::Blend => write!(f, "blend"),
            RecordLayout::VertexOffset => write!(f, "vertex"),
        }
    }
}

/// Layout-specific trailing data of a record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PartEffect {
    /// Nothing after alpha.
    #[default]
    None,
    Blend(BlendMode),
    /// Top-left vertex shift; moves the destination and shrinks the size by
    /// the same amount.
    VertexOffset(Vec2),
}

impl PartEffect {
    fn fits(&self, layout: RecordLayout) -> bool {
        matches!(
            (self, layout),
            (PartEffect::None, _)
                | (PartEffect::Blend(_), RecordLayout::Blend)
                | (PartEffect::VertexOffset(_), RecordLayout::VertexOffset)
        )
    }
}

/// Placement of one part in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub part_index: usize,
    pub image_index: usize,
    pub src: Rect,
    pub dst: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    pub scale: Vec2,
    /// Pivot offset from the rectangle center.
    pub origin: Option<Vec2>,
    pub flip_h: Option<bool>,
    pub flip_v: Option<bool>,
    pub alpha: Option<f32>,
    pub effect: PartEffect,
}

impl FrameRecord {
    /// Record with only the required fields set.
    pub fn new(
        part_index: usize,
        image_index: usize,
        src: Rect,
        dst: Vec2,
        angle: f32,
        scale: Vec2,
    ) -> Self {
        Self {
            part_index,
            image_index,
            src,
            dst,
            angle,
            scale,
            origin: None,
            flip_h: None,
            flip_v: None,
            alpha: None,
            effect: PartEffect::None,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_flip(mut self, flip_h: bool, flip_v: bool) -> Self {
        self.flip_h = Some(flip_h);
        self.flip_v = Some(flip_v);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_blend(mut self, mode: BlendMode) -> Self {
        self.effect = PartEffect::Blend(mode);
        self
    }

    pub fn with_vertex_offset(mut self, offset: Vec2) -> Self {
        self.effect = PartEffect::VertexOffset(offset);
        self
    }

    pub fn origin(&self) -> Vec2 {
        self.origin.unwrap_or(Vec2::ZERO)
    }

    /// `(-1 | 1, -1 | 1)` mirror factors.
    pub fn flip_signs(&self) -> Vec2 {
        let sign = |flag: Option<bool>| if flag.unwrap_or(false) { -1.0 } else { 1.0 };
        Vec2::new(sign(self.flip_h), sign(self.flip_v))
    }

    pub fn alpha(&self) -> f32 {
        self.alpha.unwrap_or(1.0)
    }

    pub fn blend_mode(&self) -> BlendMode {
        match self.effect {
            PartEffect::Blend(mode) => mode,
            _ => BlendMode::Normal,
        }
    }

    pub fn vertex_offset(&self) -> Vec2 {
        match self.effect {
            PartEffect::VertexOffset(offset) => offset,
            _ => Vec2::ZERO,
        }
    }

    /// Decode one positional row using `layout` for the trailing fields.
    pub fn from_fields(fields: &[f64], layout: RecordLayout) -> Result<Self, String> {
        if fields.len() < REQUIRED_FIELDS {
            return Err(format!(
                "expected at least {} fields, found {}",
                REQUIRED_FIELDS,
                fields.len()
            ));
        }
        if let Some(pos) = fields.iter().position(|v| !v.is_finite()) {
            return Err(format!("field {} is not a finite number", pos));
        }
        let index = |pos: usize| -> Result<usize, String> {
            let v = fields[pos];
            if v < 0.0 || v.fract() != 0.0 {
                return Err(format!("field {} must be a non-negative integer, found {}", pos, v));
            }
            Ok(v as usize)
        };
        let get = |pos: usize| fields.get(pos).map(|v| *v as f32);

        let mut record = FrameRecord::new(
            index(0)?,
            index(1)?,
            Rect::new(fields[2] as f32, fields[3] as f32, fields[4] as f32, fields[5] as f32),
            Vec2::new(fields[6] as f32, fields[7] as f32),
            fields[8] as f32,
            Vec2::new(fields[9] as f32, fields[10] as f32),
        );

        record.origin = get(IDX_ORIGIN_X).map(|x| Vec2::new(x, get(IDX_ORIGIN_Y).unwrap_or(0.0)));
        record.flip_h = get(IDX_FLIP_H).map(|v| v != 0.0);
        record.flip_v = get(IDX_FLIP_V).map(|v| v != 0.0);
        record.alpha = get(IDX_ALPHA);
        record.effect = match layout {
            RecordLayout::Blend => match fields.get(IDX_BLEND) {
                Some(v) => PartEffect::Blend(BlendMode::from_index(*v as i64)),
                None => PartEffect::None,
            },
            RecordLayout::VertexOffset => match get(IDX_VERTEX_X) {
                Some(x) => PartEffect::VertexOffset(Vec2::new(x, get(IDX_VERTEX_Y).unwrap_or(0.0))),
                None => PartEffect::None,
            },
        };
        Ok(record)
    }
}

/// Validated frame table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationData {
    frame_rate: f64,
    parts: Vec<String>,
    frames: Vec<Vec<FrameRecord>>,
    layout: RecordLayout,
}

impl AnimationData {
    /// Validate and wrap a frame table.
    ///
    /// Checks the frame rate, that there is at least one frame, that every
    /// record refers to a listed part, and that no record carries trailing
    /// data of the other layout.
    pub fn new(
        frame_rate: f64,
        parts: Vec<String>,
        frames: Vec<Vec<FrameRecord>>,
        layout: RecordLayout,
    ) -> Result<Self, AnimationError> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(AnimationError::InvalidFrameRate(frame_rate));
        }
        if frames.is_empty() {
            return Err(AnimationError::EmptyFrames);
        }
        for (frame, records) in frames.iter().enumerate() {
            for (record, r) in records.iter().enumerate() {
                if r.part_index >= parts.len() {
                    return Err(AnimationError::PartIndexOutOfRange {
                        frame,
                        part_index: r.part_index,
                        part_count: parts.len(),
                    });
                }
                if !r.effect.fits(layout) {
                    return Err(AnimationError::MixedLayouts { frame, record });
                }
            }
        }
        Ok(Self {
            frame_rate,
            parts,
            frames,
            layout,
        })
    }

    /// Decode positional rows (`rows[frame][record][field]`) and validate.
    pub fn from_rows(
        frame_rate: f64,
        parts: Vec<String>,
        rows: &[Vec<Vec<f64>>],
        layout: RecordLayout,
    ) -> Result<Self, AnimationError> {
        let mut frames = Vec::with_capacity(rows.len());
        for (frame, frame_rows) in rows.iter().enumerate() {
            let mut records = Vec::with_capacity(frame_rows.len());
            for (record, fields) in frame_rows.iter().enumerate() {
                let r = FrameRecord::from_fields(fields, layout).map_err(|reason| {
                    AnimationError::InvalidRecord {
                        frame,
                        record,
                        reason,
                    }
                })?;
                records.push(r);
            }
            frames.push(records);
        }
        Self::new(frame_rate, parts, frames, layout)
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn frames(&self) -> &[Vec<FrameRecord>] {
        &self.frames
    }

    pub fn frame(&self, frame_no: usize) -> Option<&[FrameRecord]> {
        self.frames.get(frame_no).map(Vec::as_slice)
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }
}

#[derive(Deserialize)]
struct RawAnimation {
    fps: f64,
    parts: Vec<String>,
    ssa: Vec<Vec<Vec<f64>>>,
}

/// An exported animation document: the table plus its image list.
///
/// Accepts the exporter's JSON shape
///
/// ```json
/// { "girl_images": ["girl.png"],
///   "name": "girl",
///   "animation": { "fps": 30, "parts": ["body"], "ssa": [[[0,0,0,0,64,64,0,0,0,1,1]]] } }
/// ```
///
/// as well as a bare `{ "fps", "parts", "ssa" }` object.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDocument {
    pub name: Option<String>,
    pub data: AnimationData,
    /// Image file names, relative to the image root.
    pub images: Vec<String>,
}

impl AnimationDocument {
    pub fn from_json_str(json: &str, layout: RecordLayout) -> Result<Self, AnimationError> {
        let value: Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or(AnimationError::MissingField("animation"))?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let raw: RawAnimation = match object.get("animation") {
            Some(animation) => serde_json::from_value(animation.clone())?,
            None => serde_json::from_value(value.clone())?,
        };

        // "images", "<name>_images", or any "*_images" list
        let images_key = name.as_ref().map(|n| format!("{}_images", n));
        let images_value = object
            .get("images")
            .or_else(|| images_key.as_ref().and_then(|k| object.get(k)))
            .or_else(|| {
                object
                    .iter()
                    .find(|(k, _)| k.ends_with("_images"))
                    .map(|(_, v)| v)
            });
        let images: Vec<String> = match images_value {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Vec::new(),
        };

        let data = AnimationData::from_rows(raw.fps, raw.parts, &raw.ssa, layout)?;
        debug!(
            "Parsed animation {:?}: {} frames, {} parts, {} images",
            name,
            data.frame_count(),
            data.parts().len(),
            images.len()
        );
        Ok(Self { name, data, images })
    }

    pub fn from_json_file(
        path: impl AsRef<Path>,
        layout: RecordLayout,
    ) -> Result<Self, AnimationError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json, layout)
    }
}
