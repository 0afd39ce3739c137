use crate::actions::ActionTable;
use crate::atlas::OutputPage;
use crate::config::ConvertConfig;
use crate::document::{Document, Sprite, Tag};
use crate::error::Result;
use crate::fills::{ExportImage, FillResolver, ImageRecord, verify_supported};
use crate::model::{AtlasStats, Page};
use crate::resources::{build_document, generator_for};
use crate::symbols::SymbolIndex;
use crate::timeline::{Timeline, TimelineEncoder};
use crate::writer::{PamWriter, u16_field};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

pub const PAM_MAGIC: u32 = 0xBAF0_1954;
pub const PAM_VERSION: i32 = 6;
/// Animation rect written to every file; the game ignores it.
const DEFAULT_ANIM_RECT: [i16; 4] = [0, 0, 7800, 7800];

/// Everything a conversion produces, still in memory.
#[derive(Debug)]
pub struct ConvertOutput {
    /// The complete PAM stream.
    pub pam: Vec<u8>,
    pub pages: Vec<OutputPage>,
    pub images: Vec<ImageRecord>,
    /// Resource metadata document.
    pub resources: serde_json::Value,
    /// Resource document path, relative to the output directory.
    pub resource_file: PathBuf,
    /// Page PNG paths in page order, relative to the output directory.
    pub page_files: Vec<PathBuf>,
    /// Decoded bitmaps queued for per-image export.
    pub exports: Vec<ExportImage>,
    pub stats: AtlasStats,
    /// Number of timelines written, the main timeline included.
    pub timelines: usize,
}

impl ConvertOutput {
    /// Write the atlas pages and the resource document under `out_dir`.
    pub fn write_resources(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.pages.len() + 1);
        for (page, rel) in self.pages.iter().zip(&self.page_files) {
            let path = out_dir.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            page.rgba.save(&path)?;
            written.push(path);
        }
        let path = out_dir.join(&self.resource_file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&self.resources)?)?;
        written.push(path);
        Ok(written)
    }
}

/// Convert a parsed document into a PAM stream plus its atlas pages and
/// resource metadata.
///
/// `doc_name` is the input file stem; it names images and resources.
/// Without `actions`, stop frames of the main timeline are inferred from
/// the end frames of its animation labels.
#[instrument(skip_all, fields(doc = doc_name))]
pub fn convert(
    doc: &Document,
    doc_name: &str,
    cfg: &ConvertConfig,
    actions: Option<&ActionTable>,
) -> Result<ConvertOutput> {
    cfg.validate()?;
    let start = Instant::now();
    verify_supported(&doc.tags)?;
    let symbols = SymbolIndex::build(doc);

    let mut w = PamWriter::new();
    w.write_u32(PAM_MAGIC)?;
    w.write_i32(PAM_VERSION)?;
    w.write_u8(doc.header.frame_rate as u8)?;
    for v in DEFAULT_ANIM_RECT {
        w.write_i16(v)?;
    }

    let image_count_pos = w.position();
    w.write_u16(0)?;
    let mut fills = FillResolver::new(cfg, doc_name);
    for tag in &doc.tags {
        if let Some((_, shape)) = tag.as_shape() {
            let range = fills.resolve_shape(&symbols, shape)?;
            for record in &fills.records()[range] {
                record.write(&mut w)?;
            }
        }
    }
    let image_count = fills.records().len();
    w.patch_u16(image_count_pos, u16_field(image_count, "image count")?)?;
    debug!(
        images = image_count,
        bitmaps = symbols.bitmap_count(),
        "wrote image records"
    );

    let sprites: Vec<&Sprite> = doc
        .tags
        .iter()
        .filter_map(|t| match t {
            Tag::DefineSprite(s) => Some(s),
            _ => None,
        })
        .collect();
    w.write_u16(u16_field(sprites.len(), "sprite count")?)?;

    let mut encoder = TimelineEncoder::new(&symbols, fills.shape_images(), actions);
    for sprite in &sprites {
        encoder.encode(
            &mut w,
            Timeline::Sprite(sprite.id),
            doc.header.frame_rate,
            &sprite.tags,
        )?;
    }
    let has_main = doc.tags.iter().any(Tag::is_show_frame);
    w.write_bool(has_main)?;
    if has_main {
        encoder.encode(&mut w, Timeline::Main, doc.header.frame_rate, &doc.tags)?;
    }
    let timelines = encoder.sprites_encoded();

    let (images, atlas, exports) = fills.into_parts();
    let pages = atlas.finish();
    let page_records: Vec<Page> = pages.iter().map(|p| p.page.clone()).collect();
    let generator = generator_for(cfg, doc_name);
    let resources = build_document(generator.as_ref(), &page_records, &images);
    let page_files = page_records
        .iter()
        .map(|p| generator.page_image_path(p.id))
        .collect();
    let stats = AtlasStats::from_pages(&page_records);

    info!(
        pages = stats.num_pages,
        images = images.len(),
        timelines,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "converted document"
    );

    Ok(ConvertOutput {
        pam: w.into_inner(),
        pages,
        images,
        resources,
        resource_file: generator.document_path(),
        page_files,
        exports,
        stats,
        timelines,
    })
}
