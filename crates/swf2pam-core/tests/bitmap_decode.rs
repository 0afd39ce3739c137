mod common;

use common::zlib;
use image::Rgba;
use swf2pam_core::bitmap::{decode, pam_round, rescale, scaled_dimension, unpremultiply};
use swf2pam_core::document::{CharacterRef, Lossless, Tag};
use swf2pam_core::error::PamError;

fn lossless(format: u8, w: u16, h: u16, raw: &[u8]) -> Lossless {
    Lossless {
        id: 7,
        format,
        width: w,
        height: h,
        data: zlib(raw),
    }
}

#[test]
fn pam_round_threshold() {
    assert_eq!(pam_round(10.0), 10);
    assert_eq!(pam_round(10.5), 10);
    assert_eq!(pam_round(10.56), 10);
    assert_eq!(pam_round(10.5625), 10);
    assert_eq!(pam_round(10.57), 11);
    assert_eq!(pam_round(10.9), 11);
    assert_eq!(pam_round(128.0), 128);
}

#[test]
fn scaled_dimension_never_collapses_to_zero() {
    assert_eq!(scaled_dimension(0.2), 1);
    assert_eq!(scaled_dimension(100.0), 100);
}

#[test]
fn unpremultiply_divides_by_alpha() {
    assert_eq!(unpremultiply(0, 10, 20, 30), Rgba([0, 0, 0, 0]));
    assert_eq!(unpremultiply(255, 10, 20, 30), Rgba([10, 20, 30, 255]));
    assert_eq!(unpremultiply(128, 64, 32, 0), Rgba([127, 63, 0, 128]));
    // channel above alpha clamps instead of wrapping
    assert_eq!(unpremultiply(100, 200, 0, 0), Rgba([255, 0, 0, 100]));
}

#[test]
fn lossless2_decodes_premultiplied_argb() {
    let raw = [
        128, 64, 32, 0, // half transparent
        0, 99, 99, 99, // fully transparent
        255, 1, 2, 3, //
        255, 4, 5, 6,
    ];
    let img = decode(&Tag::DefineBitsLossless2(lossless(5, 2, 2, &raw))).expect("decode");
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(*img.get_pixel(0, 0), Rgba([127, 63, 0, 128]));
    assert_eq!(*img.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(*img.get_pixel(0, 1), Rgba([1, 2, 3, 255]));
    assert_eq!(*img.get_pixel(1, 1), Rgba([4, 5, 6, 255]));
}

#[test]
fn lossless_without_alpha_is_opaque() {
    let raw = [0, 10, 20, 30];
    let img = decode(&Tag::DefineBitsLossless(lossless(5, 1, 1, &raw))).expect("decode");
    assert_eq!(*img.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
}

#[test]
fn unsupported_bitmaps_are_rejected() {
    let err = decode(&Tag::DefineBitsLossless2(lossless(3, 1, 1, &[0, 0, 0, 0]))).unwrap_err();
    assert!(matches!(err, PamError::InvalidData(_)));

    let err = decode(&Tag::DefineBitsLossless2(lossless(5, 4, 4, &[0; 8]))).unwrap_err();
    assert!(matches!(err, PamError::InvalidData(_)));

    let err = decode(&Tag::DefineBitsJpeg(CharacterRef { id: 3 })).unwrap_err();
    assert!(matches!(err, PamError::FormatRestriction(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn corrupt_zlib_is_invalid_data() {
    let bad = Lossless {
        id: 1,
        format: 5,
        width: 1,
        height: 1,
        data: vec![1, 2, 3, 4],
    };
    let err = decode(&Tag::DefineBitsLossless2(bad)).unwrap_err();
    assert!(matches!(err, PamError::InvalidData(_)));
}

#[test]
fn rescale_divides_by_factor() {
    let img = image::RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255]));
    let up = rescale(&img, 0.78125);
    assert_eq!(up.dimensions(), (128, 64));
    let down = rescale(&img, 2.0);
    assert_eq!(down.dimensions(), (50, 25));
}
