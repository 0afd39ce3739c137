use crate::compositing::{PAGE_BACKGROUND, blit_rgba, resize_canvas};
use crate::error::{PamError, Result};
use crate::model::{AtlasPlacement, AtlasStats, Page};
use crate::packer::{Packer, maxrects::MaxRectsPacker};
use image::RgbaImage;
use std::collections::HashMap;
use tracing::debug;

/// Output RGBA page and its logical page record.
#[derive(Debug)]
pub struct OutputPage {
    pub page: Page,
    pub rgba: RgbaImage,
}

/// Packs bitmaps into fixed-size pages, rolling over to a new page when the
/// current one is full.
///
/// Every bitmap id is placed at most once. Placements never move; a flushed
/// page is trimmed, rasterized and kept in `pages()`.
pub struct AtlasPacker {
    page_size: u32,
    packer: MaxRectsPacker,
    canvas: RgbaImage,
    page_index: usize,
    current: Vec<AtlasPlacement>,
    placements: HashMap<u16, AtlasPlacement>,
    pages: Vec<OutputPage>,
}

impl AtlasPacker {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            packer: MaxRectsPacker::new(page_size, page_size),
            canvas: RgbaImage::from_pixel(page_size, page_size, PAGE_BACKGROUND),
            page_index: 0,
            current: Vec::new(),
            placements: HashMap::new(),
            pages: Vec::new(),
        }
    }

    /// Index of the page new placements go to.
    pub fn current_page(&self) -> usize {
        self.page_index
    }

    pub fn placement(&self, bitmap_id: u16) -> Option<&AtlasPlacement> {
        self.placements.get(&bitmap_id)
    }

    /// Pages flushed so far.
    pub fn pages(&self) -> &[OutputPage] {
        &self.pages
    }

    /// Try to place `image` on the current page.
    ///
    /// Returns `Ok(None)` when the page is full; the caller is expected to
    /// `flush_page` and retry. A bitmap that was already placed returns its
    /// existing placement.
    pub fn try_insert(&mut self, bitmap_id: u16, image: &RgbaImage) -> Result<Option<AtlasPlacement>> {
        if let Some(existing) = self.placements.get(&bitmap_id) {
            return Ok(Some(*existing));
        }
        let (w, h) = image.dimensions();
        if w > self.page_size || h > self.page_size || w == 0 || h == 0 {
            return Err(PamError::OutOfSpace {
                width: w,
                height: h,
            });
        }
        let Some(rect) = self.packer.insert(w, h) else {
            return Ok(None);
        };
        blit_rgba(image, &mut self.canvas, rect.x, rect.y)?;
        let placement = AtlasPlacement {
            bitmap_id,
            page: self.page_index,
            rect,
        };
        self.current.push(placement);
        self.placements.insert(bitmap_id, placement);
        Ok(Some(placement))
    }

    /// Place `image`, flushing the current page first if it has no room.
    pub fn insert(&mut self, bitmap_id: u16, image: &RgbaImage) -> Result<AtlasPlacement> {
        if let Some(p) = self.try_insert(bitmap_id, image)? {
            return Ok(p);
        }
        self.flush_page();
        self.try_insert(bitmap_id, image)?.ok_or(PamError::OutOfSpace {
            width: image.width(),
            height: image.height(),
        })
    }

    /// Rasterize the current page trimmed to its used area and start a fresh
    /// one. An empty page is not emitted and does not consume an index.
    pub fn flush_page(&mut self) {
        if self.packer.used_count() == 0 {
            return;
        }
        let (bw, bh) = self.packer.used_bounds();
        let width = page_dimension(bw);
        let height = page_dimension(bh);
        let rgba = resize_canvas(&self.canvas, width, height);
        debug!(
            page = self.page_index,
            width,
            height,
            images = self.current.len(),
            "flushed atlas page"
        );
        self.pages.push(OutputPage {
            page: Page {
                id: self.page_index,
                width,
                height,
                placements: std::mem::take(&mut self.current),
            },
            rgba,
        });
        self.packer.reset();
        self.canvas = RgbaImage::from_pixel(self.page_size, self.page_size, PAGE_BACKGROUND);
        self.page_index += 1;
    }

    /// Flush the last page and return every page in index order.
    pub fn finish(mut self) -> Vec<OutputPage> {
        self.flush_page();
        self.pages
    }

    pub fn stats(&self) -> AtlasStats {
        let pages: Vec<Page> = self.pages.iter().map(|p| p.page.clone()).collect();
        AtlasStats::from_pages(&pages)
    }
}

/// Final page edge for a used extent of `v` pixels: `v` itself when it is a
/// power of two, otherwise the closest multiple of the neighbouring powers
/// of two above it.
pub fn page_dimension(v: u32) -> u32 {
    if v <= 1 {
        return 1;
    }
    if v.is_power_of_two() {
        return v;
    }
    let upper = v.next_power_of_two();
    let lower = upper >> 1;
    let next_of_lower = (v / lower + 1) * lower;
    let next_of_upper = (v / upper + 1) * upper;
    next_of_lower.min(next_of_upper)
}
