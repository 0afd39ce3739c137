use crate::document::{Document, Tag};
use std::collections::{HashMap, HashSet};

/// Read-only lookups gathered in one pass over the document: symbol names,
/// sprite ids, bitmap definitions and the last frame of every animation label.
pub struct SymbolIndex<'a> {
    names: HashMap<u16, String>,
    sprite_ids: HashSet<u16>,
    bitmaps: HashMap<u16, &'a Tag>,
    bitmap_count: usize,
    label_end_frames: HashMap<String, u32>,
}

impl<'a> SymbolIndex<'a> {
    pub fn build(doc: &'a Document) -> Self {
        let mut names: HashMap<u16, String> = HashMap::new();
        if let Some(links) = doc.tags.iter().find_map(|t| match t {
            Tag::SymbolClass(sc) => Some(&sc.symbols),
            _ => None,
        }) {
            for link in links {
                names.entry(link.id).or_insert_with(|| link.name.clone());
            }
        }

        let mut sprite_ids = HashSet::new();
        let mut bitmaps = HashMap::new();
        let mut bitmap_count = 0;
        for tag in &doc.tags {
            if let Some((_, shape)) = tag.as_shape() {
                names
                    .entry(shape.id)
                    .or_insert_with(|| format!("shape_{}", shape.id));
            }
            if let Tag::DefineSprite(sprite) = tag {
                sprite_ids.insert(sprite.id);
            }
            if let Some(id) = tag.bitmap_id() {
                bitmap_count += 1;
                bitmaps.entry(id).or_insert(tag);
            }
        }

        let mut label_end_frames = HashMap::new();
        if let Some(data) = doc.tags.iter().find_map(|t| match t {
            Tag::DefineSceneAndFrameLabelData(d) => Some(d),
            _ => None,
        }) {
            let last_frame = (doc.header.frame_count as u32).saturating_sub(1);
            for (i, entry) in data.labels.iter().enumerate() {
                let end = match data.labels.get(i + 1) {
                    Some(next) => next.frame.saturating_sub(1),
                    None => last_frame,
                };
                label_end_frames.entry(entry.label.clone()).or_insert(end);
            }
        }

        Self {
            names,
            sprite_ids,
            bitmaps,
            bitmap_count,
            label_end_frames,
        }
    }

    pub fn name(&self, id: u16) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn is_sprite(&self, id: u16) -> bool {
        self.sprite_ids.contains(&id)
    }

    pub fn bitmap(&self, id: u16) -> Option<&'a Tag> {
        self.bitmaps.get(&id).copied()
    }

    /// Number of bitmap definition tags in the document.
    pub fn bitmap_count(&self) -> usize {
        self.bitmap_count
    }

    /// Last frame index (0-based) covered by the animation `label`.
    pub fn label_end_frame(&self, label: &str) -> Option<u32> {
        self.label_end_frames.get(label).copied()
    }
}
