use super::Packer;
use crate::model::Rect;

/// MaxRects free-list packer with the best-area-fit heuristic.
///
/// Free rectangles are kept in a stable order, so among equally good
/// candidates the first one found wins.
pub struct MaxRectsPacker {
    width: u32,
    height: u32,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            free: vec![Rect::new(0, 0, width, height)],
            used: Vec::new(),
        }
    }

    fn place_rect(&mut self, node: &Rect) {
        // split all free rectangles that intersect with node
        let mut new_free: Vec<Rect> = Vec::new();
        for fr in self.free.iter() {
            if !fr.intersects(node) {
                new_free.push(*fr);
                continue;
            }
            let fr_x2 = fr.right_ex();
            let fr_y2 = fr.bottom_ex();

            let ix1 = fr.x.max(node.x);
            let iy1 = fr.y.max(node.y);
            let ix2 = fr_x2.min(node.right_ex());
            let iy2 = fr_y2.min(node.bottom_ex());

            // above
            if iy1 > fr.y {
                new_free.push(Rect::new(fr.x, fr.y, fr.w, iy1 - fr.y));
            }
            // below
            if iy2 < fr_y2 {
                new_free.push(Rect::new(fr.x, iy2, fr.w, fr_y2 - iy2));
            }
            // left
            if ix1 > fr.x {
                new_free.push(Rect::new(fr.x, fr.y, ix1 - fr.x, fr.h));
            }
            // right
            if ix2 < fr_x2 {
                new_free.push(Rect::new(ix2, fr.y, fr_x2 - ix2, fr.h));
            }
        }

        self.free = new_free;
        self.prune_free_list();
        self.used.push(*node);
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let a = self.free[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let b = self.free[j];
                if b.contains(&a) {
                    remove_i = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn find_position(&self, w: u32, h: u32) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }
        let wanted = (w as u64) * (h as u64);
        let mut best: Option<(u64, Rect)> = None;
        for fr in &self.free {
            if fr.w < w || fr.h < h {
                continue;
            }
            let area_fit = fr.area() - wanted;
            // perfect fit early-out
            if area_fit == 0 {
                return Some(Rect::new(fr.x, fr.y, w, h));
            }
            if best.is_none_or(|(score, _)| area_fit < score) {
                best = Some((area_fit, Rect::new(fr.x, fr.y, w, h)));
            }
        }
        best.map(|(_, r)| r)
    }
}

impl Packer for MaxRectsPacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.find_position(w, h).is_some()
    }

    fn insert(&mut self, w: u32, h: u32) -> Option<Rect> {
        let place = self.find_position(w, h)?;
        self.place_rect(&place);
        Some(place)
    }

    fn used_bounds(&self) -> (u32, u32) {
        self.used.iter().fold((0, 0), |(w, h), r| {
            (w.max(r.right_ex()), h.max(r.bottom_ex()))
        })
    }

    fn used_count(&self) -> usize {
        self.used.len()
    }

    fn reset(&mut self) {
        self.free = vec![Rect::new(0, 0, self.width, self.height)];
        self.used.clear();
    }
}
