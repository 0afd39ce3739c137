//! Resource metadata for the game's resource system: one entry per atlas
//! page, each listing the images packed on it.

use crate::config::{ConvertConfig, ResourceFormat};
use crate::fills::ImageRecord;
use crate::model::{Page, Rect};
use serde_json::{Map, Value, json};
use std::path::PathBuf;

/// Builds the JSON layout of one resource format.
pub trait ResourceGenerator {
    fn format(&self) -> ResourceFormat;
    /// Resource id of an atlas page, e.g. `ATLASIMAGE_ATLAS_GROUP_00`.
    fn atlas_id(&self, page: usize) -> String;
    /// Atlas path without extension, relative to the format directory.
    fn atlas_path(&self, page: usize) -> String;
    fn page_entry(&self, page: &Page, images: Map<String, Value>) -> Value;
    fn image_entry(&self, image_name: &str, rect: &Rect) -> Value;
    fn document(&self, atlases: Map<String, Value>) -> Value;
    /// Where the document goes, relative to the output directory.
    fn document_path(&self) -> PathBuf;

    /// Where a page PNG goes, relative to the output directory.
    fn page_image_path(&self, page: usize) -> PathBuf {
        PathBuf::from(self.format().dir_name()).join(format!("{}.png", self.atlas_path(page)))
    }
}

/// Naming shared by both layouts.
#[derive(Debug, Clone)]
struct ResourceNames {
    group: String,
    res_base_path: String,
    doc_name: String,
}

impl ResourceNames {
    fn new(cfg: &ConvertConfig, doc_name: &str) -> Self {
        Self {
            group: cfg.res_group_name.clone(),
            res_base_path: cfg.res_base_path.clone(),
            doc_name: doc_name.to_string(),
        }
    }

    fn group_upper(&self) -> String {
        self.group.to_uppercase()
    }
}

pub struct SenResources {
    names: ResourceNames,
}

impl ResourceGenerator for SenResources {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Sen
    }

    fn atlas_id(&self, page: usize) -> String {
        format!("ATLASIMAGE_ATLAS_{}_{:02}", self.names.group_upper(), page)
    }

    fn atlas_path(&self, page: usize) -> String {
        format!("atlases/{}_{:02}", self.names.group_upper(), page)
    }

    fn page_entry(&self, page: &Page, images: Map<String, Value>) -> Value {
        json!({
            "type": "Image",
            "path": self.atlas_path(page.id),
            "dimension": { "width": page.width, "height": page.height },
            "data": images,
        })
    }

    fn image_entry(&self, image_name: &str, rect: &Rect) -> Value {
        json!({
            "type": "Image",
            "path": format!("images/full/{}/{}/{}", self.names.res_base_path, self.names.doc_name, image_name),
            "default": { "ax": rect.x, "ay": rect.y, "aw": rect.w, "ah": rect.h, "x": 0, "y": 0 },
        })
    }

    fn document(&self, atlases: Map<String, Value>) -> Value {
        json!({ "type": "1536", "packet": atlases })
    }

    fn document_path(&self) -> PathBuf {
        PathBuf::from("SEN")
            .join("atlases")
            .join(format!("{}.json", self.names.group))
    }
}

pub struct SpcResources {
    names: ResourceNames,
}

impl ResourceGenerator for SpcResources {
    fn format(&self) -> ResourceFormat {
        ResourceFormat::Spc
    }

    fn atlas_id(&self, page: usize) -> String {
        format!("ATLASIMAGE_ATLAS_{}_1536_{:02}", self.names.group_upper(), page)
    }

    fn atlas_path(&self, page: usize) -> String {
        format!("atlases/{}_1536_{:02}", self.names.group_upper(), page)
    }

    fn page_entry(&self, page: &Page, images: Map<String, Value>) -> Value {
        json!({
            "Type": "Image",
            "Path": split_path(&self.atlas_path(page.id)),
            "AtlasInfo": { "Size": [page.width, page.height], "Image": images },
        })
    }

    fn image_entry(&self, image_name: &str, rect: &Rect) -> Value {
        let path = format!(
            "images/1536/full/{}/{}/{}",
            self.names.res_base_path, self.names.doc_name, image_name
        );
        json!({
            "Type": "Image",
            "Path": split_path(&path),
            "ImageInfo": [rect.x, rect.y, rect.w, rect.h, 0, 0],
        })
    }

    fn document(&self, atlases: Map<String, Value>) -> Value {
        json!({ "Category": [1536, null], "Res": atlases })
    }

    fn document_path(&self) -> PathBuf {
        let group = &self.names.group;
        PathBuf::from("SPC")
            .join("Include")
            .join(group)
            .join("Include")
            .join(format!("{group}_1536.json"))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

pub fn generator_for(cfg: &ConvertConfig, doc_name: &str) -> Box<dyn ResourceGenerator> {
    let names = ResourceNames::new(cfg, doc_name);
    match cfg.resource_format {
        ResourceFormat::Sen => Box::new(SenResources { names }),
        ResourceFormat::Spc => Box::new(SpcResources { names }),
    }
}

/// Assemble the resource document: each page lists the images placed on it,
/// keyed by resource id. A bitmap referenced by several fills appears once.
pub fn build_document(generator: &dyn ResourceGenerator, pages: &[Page], records: &[ImageRecord]) -> Value {
    let mut atlases = Map::new();
    for page in pages {
        let mut images = Map::new();
        for record in records.iter().filter(|r| r.placement.page == page.id) {
            images
                .entry(record.resource_id.clone())
                .or_insert_with(|| generator.image_entry(&record.name, &record.placement.rect));
        }
        atlases.insert(generator.atlas_id(page.id), generator.page_entry(page, images));
    }
    generator.document(atlases)
}
