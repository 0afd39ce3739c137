use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right_ex(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom_ex(&self) -> u32 {
        self.y + self.h
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right_ex() <= self.right_ex() && r.bottom_ex() <= self.bottom_ex()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right_ex()
            || r.x >= self.right_ex()
            || self.y >= r.bottom_ex()
            || r.y >= self.bottom_ex())
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
}

/// Where a bitmap landed: page index plus the rectangle inside that page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasPlacement {
    /// SWF character id of the bitmap.
    pub bitmap_id: u16,
    pub page: usize,
    pub rect: Rect,
}

/// A flushed atlas page (logical record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub placements: Vec<AtlasPlacement>,
}

/// Final size and generated name of a decoded bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// `<doc>_<w>x<h>` with a `_<n>` suffix when the plain name is taken.
    pub name: String,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtlasStats {
    pub num_pages: usize,
    pub num_placements: usize,
    /// Sum of width * height over all flushed pages.
    pub total_page_area: u64,
    /// Sum of width * height over all placements.
    pub used_area: u64,
    /// used_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl AtlasStats {
    pub fn from_pages(pages: &[Page]) -> Self {
        let mut num_placements = 0;
        let mut total_page_area = 0u64;
        let mut used_area = 0u64;
        for page in pages {
            total_page_area += (page.width as u64) * (page.height as u64);
            for p in &page.placements {
                num_placements += 1;
                used_area += p.rect.area();
            }
        }
        let occupancy = if total_page_area > 0 {
            used_area as f64 / total_page_area as f64
        } else {
            0.0
        };
        Self {
            num_pages: pages.len(),
            num_placements,
            total_page_area,
            used_area,
            occupancy,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Images: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_pages,
            self.num_placements,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_area,
        )
    }
}
