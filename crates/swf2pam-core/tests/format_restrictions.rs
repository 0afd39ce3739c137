mod common;

use common::*;
use serde_json::json;
use swf2pam_core::prelude::*;
use swf2pam_core::{PamError, ResourceFormat};

fn run(tags: Vec<serde_json::Value>) -> Result<ConvertOutput, PamError> {
    let cfg = ConvertConfig::builder().res_base_path("zombie").build();
    convert(&document(1, tags), "bad", &cfg, None)
}

fn assert_restricted(tags: Vec<serde_json::Value>) {
    match run(tags) {
        Err(e @ PamError::FormatRestriction(_)) => assert_eq!(e.exit_code(), 2),
        Err(other) => panic!("expected a format restriction, got {other}"),
        Ok(_) => panic!("expected a format restriction"),
    }
}

#[test]
fn filtered_instances_are_rejected() {
    assert_restricted(vec![
        lossless2(1, 2, 2),
        bitmap_shape(2, 1),
        json!({ "type": "place_object", "version": 3, "depth": 1, "character_id": 2 }),
        show_frame(),
    ]);
}

#[test]
fn filters_inside_sprites_are_rejected() {
    assert_restricted(vec![
        symbols(&[(10, "fx")]),
        lossless2(1, 2, 2),
        bitmap_shape(2, 1),
        sprite(
            10,
            vec![json!({ "type": "place_object", "version": 3, "depth": 1, "character_id": 2 }), show_frame()],
        ),
    ]);
}

#[test]
fn vector_shapes_are_rejected() {
    assert_restricted(vec![json!({ "type": "define_shape3", "id": 4 })]);
}

#[test]
fn jpeg_bitmaps_are_rejected() {
    assert_restricted(vec![json!({ "type": "define_bits_jpeg", "id": 4 })]);
}

#[test]
fn gradient_fills_are_rejected() {
    assert_restricted(vec![json!({
        "type": "define_shape",
        "id": 4,
        "fill_styles": [ { "kind": "linear_gradient" } ],
    })]);
}

#[test]
fn gradient_in_style_change_is_rejected() {
    assert_restricted(vec![json!({
        "type": "define_shape",
        "id": 4,
        "records": [ { "kind": "style_change", "new_fill_styles": [ { "kind": "radial_gradient" } ] } ],
    })]);
}

#[test]
fn unnamed_sprites_are_rejected() {
    assert_restricted(vec![
        lossless2(1, 2, 2),
        bitmap_shape(2, 1),
        sprite(10, vec![place(1, 2), show_frame()]),
    ]);
}

#[test]
fn solid_fills_are_ignored() {
    let out = run(vec![json!({
        "type": "define_shape",
        "id": 4,
        "fill_styles": [ { "kind": "solid", "color": [255, 0, 0, 255] },
                         { "kind": "bitmap", "bitmap_id": 65535 } ],
    })])
    .expect("convert");
    assert!(out.images.is_empty());
    assert!(out.pages.is_empty());
}

#[test]
fn inconsistent_timelines_are_invalid_data() {
    let removed_twice = run(vec![json!({ "type": "remove_object", "depth": 3 }), show_frame()]);
    assert!(matches!(removed_twice, Err(PamError::InvalidData(_))));

    let move_on_empty = run(vec![
        json!({ "type": "place_object", "depth": 3, "move": true, "matrix": {} }),
        show_frame(),
    ]);
    assert!(matches!(move_on_empty, Err(PamError::InvalidData(_))));

    let unknown_bitmap = run(vec![bitmap_shape(2, 99)]);
    assert!(matches!(unknown_bitmap, Err(PamError::InvalidData(_))));

    let not_a_bitmap_shape = run(vec![place(1, 50), show_frame()]);
    assert!(matches!(not_a_bitmap_shape, Err(PamError::InvalidData(e)) if e.contains("50")));
}

#[test]
fn config_validation() {
    let bad_scale = ConvertConfig::builder().image_scale_factor(0.0).build();
    assert!(matches!(bad_scale.validate(), Err(PamError::InvalidConfig(_))));

    let empty_page = ConvertConfig::builder().res_base_path("zombie").page_size(0).build();
    assert!(matches!(empty_page.validate(), Err(PamError::InvalidConfig(_))));

    // rejected before any page canvas is allocated
    let huge_page = ConvertConfig::builder().res_base_path("zombie").page_size(1 << 20).build();
    let err = convert(&document(0, vec![]), "x", &huge_page, None).unwrap_err();
    assert!(matches!(err, PamError::InvalidConfig(_)));
    assert_eq!(err.exit_code(), 5);

    let bad_group = ConvertConfig::builder().res_base_path("zombie").res_group_name("  ").build();
    let err = convert(&document(0, vec![]), "x", &bad_group, None).unwrap_err();
    assert_eq!(err.exit_code(), 5);

    // resource ids would read IMAGE__<DOC>_...
    assert!(matches!(ConvertConfig::default().validate(), Err(PamError::InvalidConfig(_))));

    let max_page = ConvertConfig::builder()
        .res_base_path("zombie")
        .page_size(swf2pam_core::DEFAULT_PAGE_SIZE)
        .build();
    assert!(max_page.validate().is_ok());
    assert_eq!("SPC".parse::<ResourceFormat>(), Ok(ResourceFormat::Spc));
    assert!("xml".parse::<ResourceFormat>().is_err());
}
