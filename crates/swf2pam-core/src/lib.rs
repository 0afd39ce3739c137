//! Core library for converting parsed SWF documents into PopAnim (PAM) files.
//!
//! - Timelines: frame-by-frame display list diffs encoded as bit-packed records
//! - Bitmaps: lossless tags decoded, optionally rescaled, packed into shared atlas pages (MaxRects)
//! - Resources: SEN or SPC JSON metadata describing the pages and images
//!
//! Quick example:
//! ```ignore
//! use swf2pam_core::{ConvertConfig, Document, convert};
//! # fn main() -> anyhow::Result<()> {
//! let doc = Document::load("zombie.json".as_ref())?;
//! let cfg = ConvertConfig::builder().res_base_path("zombie").res_group_name("ZombieGroup").build();
//! let out = convert(&doc, "zombie", &cfg, None)?;
//! std::fs::write("zombie.pam", &out.pam)?;
//! out.write_resources("output".as_ref())?;
//! # Ok(()) }
//! ```

pub mod actions;
pub mod atlas;
pub mod bitmap;
pub mod compositing;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod fills;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod resources;
pub mod symbols;
pub mod timeline;
pub mod transform;
pub mod writer;

pub use actions::{ActionTable, PaCommand};
pub use config::*;
pub use document::Document;
pub use error::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `swf2pam_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::actions::{ActionTable, PaCommand};
    pub use crate::atlas::{AtlasPacker, OutputPage};
    pub use crate::config::{ConvertConfig, ConvertConfigBuilder, ResourceFormat};
    pub use crate::document::{Document, Matrix, Tag};
    pub use crate::fills::{FillResolver, ImageRecord};
    pub use crate::model::{AtlasPlacement, AtlasStats, ImageInfo, Page, Rect};
    pub use crate::resources::{ResourceGenerator, generator_for};
    pub use crate::timeline::{FrameFlags, MoveFlags, Timeline, TimelineEncoder};
    pub use crate::writer::PamWriter;
    pub use crate::{ConvertOutput, convert};
}
