//! Parsed SWF document, as produced by an external SWF reader.
//!
//! Only the tags the converter looks at are modelled in detail; everything
//! else deserializes into [`Tag::Other`] and is skipped.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Character id that marks a bitmap fill without a bitmap.
pub const NO_BITMAP: u16 = u16::MAX;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub header: Header,
    pub tags: Vec<Tag>,
}

impl Document {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Header {
    pub frame_rate: f32,
    pub frame_count: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tag {
    DefineShape(Shape),
    DefineShape2(Shape),
    DefineShape3(Shape),
    DefineShape4(Shape),
    DefineSprite(Sprite),
    DefineBitsLossless(Lossless),
    DefineBitsLossless2(Lossless),
    /// Any of the JPEG bitmap tags.
    DefineBitsJpeg(CharacterRef),
    PlaceObject(PlaceObject),
    RemoveObject(RemoveObject),
    FrameLabel(FrameLabel),
    ShowFrame,
    SymbolClass(SymbolClass),
    DefineSceneAndFrameLabelData(SceneAndFrameLabelData),
    #[serde(other)]
    Other,
}

/// Which DefineShape tag a shape came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Shape1,
    Shape2,
    Shape3,
    Shape4,
}

impl Tag {
    pub fn as_shape(&self) -> Option<(ShapeKind, &Shape)> {
        match self {
            Tag::DefineShape(s) => Some((ShapeKind::Shape1, s)),
            Tag::DefineShape2(s) => Some((ShapeKind::Shape2, s)),
            Tag::DefineShape3(s) => Some((ShapeKind::Shape3, s)),
            Tag::DefineShape4(s) => Some((ShapeKind::Shape4, s)),
            _ => None,
        }
    }

    /// Character id of a bitmap definition tag.
    pub fn bitmap_id(&self) -> Option<u16> {
        match self {
            Tag::DefineBitsLossless(b) | Tag::DefineBitsLossless2(b) => Some(b.id),
            Tag::DefineBitsJpeg(c) => Some(c.id),
            _ => None,
        }
    }

    pub fn is_show_frame(&self) -> bool {
        matches!(self, Tag::ShowFrame)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CharacterRef {
    pub id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub id: u16,
    #[serde(default)]
    pub fill_styles: Vec<FillStyle>,
    #[serde(default)]
    pub records: Vec<ShapeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillStyle {
    Solid { color: [u8; 4] },
    LinearGradient(GradientFill),
    RadialGradient(GradientFill),
    FocalGradient(GradientFill),
    Bitmap(BitmapFill),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradientFill {
    #[serde(default)]
    pub matrix: Matrix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitmapFill {
    pub bitmap_id: u16,
    #[serde(default)]
    pub matrix: Matrix,
    #[serde(default)]
    pub repeating: bool,
    #[serde(default)]
    pub smoothed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRecord {
    StyleChange(StyleChange),
    /// Straight and curved edges; their geometry is irrelevant here.
    #[serde(other)]
    Edge,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleChange {
    /// Present when the record carries a new style list.
    #[serde(default)]
    pub new_fill_styles: Option<Vec<FillStyle>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprite {
    pub id: u16,
    #[serde(default)]
    pub frame_count: u16,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Lossless bitmap: zlib-compressed pixel rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lossless {
    pub id: u16,
    /// 3 = colour-mapped, 4 = 15-bit RGB, 5 = 32-bit.
    #[serde(default = "default_lossless_format")]
    pub format: u8,
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

fn default_lossless_format() -> u8 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceObject {
    /// 1 = PlaceObject, 2 = PlaceObject2, 3 = PlaceObject3.
    #[serde(default = "default_place_version")]
    pub version: u8,
    pub depth: u16,
    #[serde(default)]
    pub character_id: Option<u16>,
    /// Modifies the object already at `depth`.
    #[serde(default, rename = "move")]
    pub is_move: bool,
    #[serde(default)]
    pub matrix: Option<Matrix>,
    #[serde(default)]
    pub color_transform: Option<ColorTransform>,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_place_version() -> u8 {
    2
}

impl PlaceObject {
    pub fn has_character(&self) -> bool {
        self.character_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RemoveObject {
    pub depth: u16,
    #[serde(default)]
    pub character_id: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameLabel {
    pub name: String,
    #[serde(default)]
    pub anchor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolClass {
    pub symbols: Vec<SymbolLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolLink {
    pub id: u16,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneAndFrameLabelData {
    #[serde(default)]
    pub scenes: Vec<FrameLabelEntry>,
    #[serde(default)]
    pub labels: Vec<FrameLabelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameLabelEntry {
    pub frame: u32,
    pub label: String,
}

/// SWF transform. Linear terms are plain floats, translation is in twips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotate_skew0: f64,
    #[serde(default)]
    pub rotate_skew1: f64,
    #[serde(default)]
    pub translate_x: i32,
    #[serde(default)]
    pub translate_y: i32,
}

fn one() -> f64 {
    1.0
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        scale_x: 1.0,
        scale_y: 1.0,
        rotate_skew0: 0.0,
        rotate_skew1: 0.0,
        translate_x: 0,
        translate_y: 0,
    };

    pub fn translate(x: i32, y: i32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::IDENTITY
        }
    }
}

/// Colour transform terms in 8.8 fixed point (256 = 1.0), ordered R, G, B, A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorTransform {
    #[serde(default)]
    pub mult: Option<[i16; 4]>,
    #[serde(default)]
    pub add: Option<[i16; 4]>,
}
