use crate::document::{Lossless, Tag};
use crate::error::{PamError, Result};
use flate2::read::ZlibDecoder;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::io::Read;

/// Lossless bitmap format code for 32 bits per pixel.
const FORMAT_ARGB32: u8 = 5;

/// Decode a bitmap definition tag into straight-alpha RGBA pixels.
pub fn decode(tag: &Tag) -> Result<RgbaImage> {
    match tag {
        Tag::DefineBitsLossless2(b) => decode_lossless(b, true),
        Tag::DefineBitsLossless(b) => decode_lossless(b, false),
        Tag::DefineBitsJpeg(c) => Err(PamError::FormatRestriction(format!(
            "bitmap {} is stored as JPEG; store it as PNG instead",
            c.id
        ))),
        _ => Err(PamError::InvalidData("tag is not a bitmap definition".into())),
    }
}

fn decode_lossless(bitmap: &Lossless, with_alpha: bool) -> Result<RgbaImage> {
    if bitmap.format != FORMAT_ARGB32 {
        return Err(PamError::InvalidData(format!(
            "bitmap {} uses lossless format {}; only 32-bit bitmaps are supported",
            bitmap.id, bitmap.format
        )));
    }
    let width = bitmap.width as u32;
    let height = bitmap.height as u32;
    let data = decompress_zlib(&bitmap.data)?;
    let needed = (width as usize) * (height as usize) * 4;
    if data.len() < needed {
        return Err(PamError::InvalidData(format!(
            "bitmap {} has {} bytes of pixel data, expected {}",
            bitmap.id,
            data.len(),
            needed
        )));
    }

    let mut img = RgbaImage::new(width, height);
    for (i, (_, _, px)) in img.enumerate_pixels_mut().enumerate() {
        let s = &data[i * 4..i * 4 + 4];
        *px = if with_alpha {
            unpremultiply(s[0], s[1], s[2], s[3])
        } else {
            Rgba([s[1], s[2], s[3], 255])
        };
    }
    Ok(img)
}

/// Decompress a zlib stream.
pub fn decompress_zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| PamError::InvalidData(format!("zlib: {e}")))?;
    Ok(output)
}

/// Convert one premultiplied ARGB pixel to straight RGBA.
pub fn unpremultiply(a: u8, r: u8, g: u8, b: u8) -> Rgba<u8> {
    if a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let un = |c: u8| ((c as u32 * 255) / a as u32).min(255) as u8;
    Rgba([un(r), un(g), un(b), a])
}

/// Resize for art scaling: each side becomes `pam_round(side / factor)`.
pub fn rescale(img: &RgbaImage, factor: f32) -> RgbaImage {
    let w = scaled_dimension(img.width() as f32 / factor);
    let h = scaled_dimension(img.height() as f32 / factor);
    imageops::resize(img, w, h, FilterType::CatmullRom)
}

pub fn scaled_dimension(v: f32) -> u32 {
    pam_round(v).max(1) as u32
}

/// Rounding used by the PAM toolchain: round up only when the fractional
/// part is strictly above 0.5625.
pub fn pam_round(number: f32) -> i32 {
    let tenths = (number - number.trunc()) * 10.0;
    if tenths > 5.625 {
        number.ceil() as i32
    } else {
        number.floor() as i32
    }
}
