use crate::model::Rect;

pub mod maxrects;

/// A packer places rectangles into a single fixed-size page.
///
/// Implementations must ensure no overlaps. `insert` returns `None` when the
/// rectangle cannot be placed on the current page; the caller decides whether
/// to start a new page.
pub trait Packer {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn insert(&mut self, w: u32, h: u32) -> Option<Rect>;
    /// Smallest `(width, height)` from the origin covering every used rectangle.
    fn used_bounds(&self) -> (u32, u32);
    fn used_count(&self) -> usize;
    /// Drop all placements and start over with an empty page.
    fn reset(&mut self);
}
