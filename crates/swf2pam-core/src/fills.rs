use crate::atlas::AtlasPacker;
use crate::bitmap;
use crate::config::ConvertConfig;
use crate::document::{FillStyle, Shape, ShapeKind, ShapeRecord, Tag, NO_BITMAP};
use crate::error::{PamError, Result};
use crate::model::{AtlasPlacement, ImageInfo};
use crate::symbols::SymbolIndex;
use crate::transform::{MatrixUnits, to_affine};
use crate::writer::PamWriter;
use image::RgbaImage;
use kurbo::Affine;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Fixed-point scale of image record matrices (20 twips * 65536).
const IMAGE_MATRIX_SCALE: f64 = 1_310_720.0;

/// One bitmap fill as written to the image table of the PAM header.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Generated image name, e.g. `anim_100x100`.
    pub name: String,
    /// Resource id, e.g. `IMAGE_ZOMBIE_ANIM_ANIM_100X100`.
    pub resource_id: String,
    pub bitmap_id: u16,
    pub placement: AtlasPlacement,
    /// Final pixel size of the image.
    pub size: (u32, u32),
    /// `None` while image rescaling is active; written as -1,-1.
    pub original_size: Option<(i16, i16)>,
    /// Fill transform in pixels, already multiplied by the art scale.
    pub transform: Affine,
    /// Fill translation in twips, as found in the document.
    pub translate: (i32, i32),
    /// Art scale factor the transform was multiplied by, if any.
    pub scale: Option<f32>,
}

impl ImageRecord {
    /// `<image name>|<resource id>`.
    pub fn identifier(&self) -> String {
        format!("{}|{}", self.name, self.resource_id)
    }

    pub fn write(&self, w: &mut PamWriter) -> Result<()> {
        w.write_string(&self.identifier())?;
        let (ow, oh) = self.original_size.unwrap_or((-1, -1));
        w.write_i16(ow)?;
        w.write_i16(oh)?;
        let div = self.scale.map_or(1.0, |s| s as f64);
        let [a, b, c, d, _, _] = self.transform.as_coeffs();
        for term in [a, b, c, d] {
            w.write_i32(((term / div) * IMAGE_MATRIX_SCALE) as i32)?;
        }
        w.write_i16(self.translate.0 as i16)?;
        w.write_i16(self.translate.1 as i16)?;
        Ok(())
    }
}

/// A decoded bitmap queued for export as its own PNG.
#[derive(Debug)]
pub struct ExportImage {
    pub name: String,
    pub rgba: RgbaImage,
}

/// Reject content the PAM format cannot represent.
pub fn verify_supported(tags: &[Tag]) -> Result<()> {
    for tag in tags {
        match tag {
            Tag::PlaceObject(p) if p.version != 2 => {
                return Err(PamError::FormatRestriction(format!(
                    "instance at depth {} uses PlaceObject{}; filters are not supported by PopAnims",
                    p.depth, p.version
                )));
            }
            Tag::DefineSprite(sprite) => verify_supported(&sprite.tags)?,
            Tag::DefineBitsJpeg(c) => {
                return Err(PamError::FormatRestriction(format!(
                    "bitmap {} is stored as JPEG; store it as PNG instead",
                    c.id
                )));
            }
            _ => {}
        }
        if let Some((kind, shape)) = tag.as_shape() {
            if kind != ShapeKind::Shape1 {
                return Err(PamError::FormatRestriction(format!(
                    "shape {} contains vectors or combined bitmaps ({kind:?}); only cached bitmap shapes are supported",
                    shape.id
                )));
            }
        }
    }
    Ok(())
}

/// Resolves bitmap fills of shapes to atlas placements and image records.
///
/// Each bitmap is decoded and packed the first time a fill references it;
/// later references reuse the memoized `ImageInfo`.
pub struct FillResolver<'c> {
    cfg: &'c ConvertConfig,
    doc_name: String,
    top_folder: String,
    atlas: AtlasPacker,
    images: HashMap<u16, ImageInfo>,
    name_pool: HashSet<String>,
    records: Vec<ImageRecord>,
    shape_images: HashMap<u16, usize>,
    exports: Vec<ExportImage>,
}

impl<'c> FillResolver<'c> {
    pub fn new(cfg: &'c ConvertConfig, doc_name: impl Into<String>) -> Self {
        Self {
            cfg,
            doc_name: doc_name.into(),
            top_folder: top_level_folder(&cfg.res_base_path).to_string(),
            atlas: AtlasPacker::new(cfg.page_size),
            images: HashMap::new(),
            name_pool: HashSet::new(),
            records: Vec::new(),
            shape_images: HashMap::new(),
            exports: Vec::new(),
        }
    }

    /// Resolve every bitmap fill of `shape`, including fills introduced by
    /// style-change records. Returns the range of new image records.
    pub fn resolve_shape(
        &mut self,
        symbols: &SymbolIndex<'_>,
        shape: &Shape,
    ) -> Result<std::ops::Range<usize>> {
        let start = self.records.len();
        self.resolve_fill_styles(symbols, shape.id, &shape.fill_styles)?;
        for record in &shape.records {
            if let ShapeRecord::StyleChange(change) = record {
                if let Some(styles) = &change.new_fill_styles {
                    self.resolve_fill_styles(symbols, shape.id, styles)?;
                }
            }
        }
        Ok(start..self.records.len())
    }

    fn resolve_fill_styles(
        &mut self,
        symbols: &SymbolIndex<'_>,
        shape_id: u16,
        styles: &[FillStyle],
    ) -> Result<()> {
        for style in styles {
            let fill = match style {
                FillStyle::Solid { .. } => continue,
                FillStyle::Bitmap(fill) => fill,
                _ => {
                    return Err(PamError::FormatRestriction(format!(
                        "shape {shape_id} uses a gradient fill; only flat and bitmap fills are supported"
                    )));
                }
            };
            if fill.bitmap_id == NO_BITMAP {
                continue;
            }

            let info = self.resolve_bitmap(symbols, fill.bitmap_id)?.clone();
            let placement = *self.atlas.placement(fill.bitmap_id).ok_or_else(|| {
                PamError::InvalidData(format!("bitmap {} has no atlas placement", fill.bitmap_id))
            })?;

            let mut transform = to_affine(&fill.matrix, MatrixUnits::Twips);
            let scale = self.cfg.scale_images.then_some(self.cfg.image_scale_factor);
            if let Some(s) = scale {
                transform = transform * Affine::scale(s as f64);
            }
            let original_size = if scale.is_some() {
                None
            } else {
                Some((info.width as i16, info.height as i16))
            };

            let resource_id = self.resource_name(&info.name);
            let index = self.records.len();
            self.shape_images.entry(shape_id).or_insert(index);
            self.records.push(ImageRecord {
                name: info.name.clone(),
                resource_id,
                bitmap_id: fill.bitmap_id,
                placement,
                size: (info.width, info.height),
                original_size,
                transform,
                translate: (fill.matrix.translate_x, fill.matrix.translate_y),
                scale,
            });
        }
        Ok(())
    }

    /// Decode and pack a bitmap on first use; return its memoized info.
    pub fn resolve_bitmap(&mut self, symbols: &SymbolIndex<'_>, bitmap_id: u16) -> Result<&ImageInfo> {
        if !self.images.contains_key(&bitmap_id) {
            let tag = symbols.bitmap(bitmap_id).ok_or_else(|| {
                PamError::InvalidData(format!("fill references unknown bitmap {bitmap_id}"))
            })?;
            let mut rgba = bitmap::decode(tag)?;
            if self.cfg.scale_images {
                rgba = bitmap::rescale(&rgba, self.cfg.image_scale_factor);
            }
            let placement = self.atlas.insert(bitmap_id, &rgba)?;

            let (mut width, mut height) = rgba.dimensions();
            if self.cfg.scale_images {
                let f = self.cfg.image_scale_factor;
                width = bitmap::scaled_dimension(width as f32 * f);
                height = bitmap::scaled_dimension(height as f32 * f);
            }
            let name = self.create_image_name(width, height);
            debug!(bitmap_id, %name, page = placement.page, "packed bitmap");

            if self.cfg.export_images {
                self.exports.push(ExportImage {
                    name: name.clone(),
                    rgba,
                });
            }
            self.images.insert(bitmap_id, ImageInfo { width, height, name });
        }
        self.images
            .get(&bitmap_id)
            .ok_or_else(|| PamError::InvalidData(format!("bitmap {bitmap_id} was not decoded")))
    }

    fn create_image_name(&mut self, width: u32, height: u32) -> String {
        let mut name = format!("{}_{}x{}", self.doc_name, width, height);
        let mut iter = 2;
        while self.name_pool.contains(&name) {
            name = format!("{}_{}x{}_{}", self.doc_name, width, height, iter);
            iter += 1;
        }
        self.name_pool.insert(name.clone());
        name
    }

    /// `IMAGE_<TOPFOLDER>_<DOC>_<IMAGE>`, upper-cased.
    pub fn resource_name(&self, image_name: &str) -> String {
        format!("IMAGE_{}_{}_{}", self.top_folder, self.doc_name, image_name).to_uppercase()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Shape id to image record index, for every shape with a bitmap fill.
    pub fn shape_images(&self) -> &HashMap<u16, usize> {
        &self.shape_images
    }

    pub fn into_parts(self) -> (Vec<ImageRecord>, AtlasPacker, Vec<ExportImage>) {
        (self.records, self.atlas, self.exports)
    }
}

/// Last component of a `/` or `\` separated path.
pub fn top_level_folder(path: &str) -> &str {
    path.split(['/', '\\'])
        .filter(|p| !p.is_empty())
        .next_back()
        .unwrap_or("")
}
