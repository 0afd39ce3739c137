use crate::error::{PamError, Result};
use image::{Rgba, RgbaImage};

/// Fill colour of a fresh atlas canvas: white with zero alpha.
pub const PAGE_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Copy `src` into `canvas` with its top-left corner at (dx, dy).
///
/// The whole source must land inside the canvas; anything else is a caller
/// bug and is reported as `OutOfBounds` without touching the canvas.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) -> Result<()> {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let fits = dx.checked_add(sw).is_some_and(|r| r <= cw)
        && dy.checked_add(sh).is_some_and(|b| b <= ch);
    if !fits {
        return Err(PamError::OutOfBounds {
            x: dx,
            y: dy,
            w: sw,
            h: sh,
            page_w: cw,
            page_h: ch,
        });
    }
    for (x, y, px) in src.enumerate_pixels() {
        canvas.put_pixel(dx + x, dy + y, *px);
    }
    Ok(())
}

/// Resize the canvas to `w` x `h`, keeping the top-left content.
/// Area outside the original canvas is filled with `PAGE_BACKGROUND`.
pub fn resize_canvas(canvas: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(w, h, PAGE_BACKGROUND);
    let cw = canvas.width().min(w);
    let ch = canvas.height().min(h);
    for y in 0..ch {
        for x in 0..cw {
            out.put_pixel(x, y, *canvas.get_pixel(x, y));
        }
    }
    out
}
