//! Conversions between SWF matrices and the fixed-point forms PAM stores.

use crate::document::Matrix;
use kurbo::Affine;

pub const TWIPS_PER_PIXEL: f64 = 20.0;

/// Tolerance of the pure-rotation test.
pub const ROTATION_TOLERANCE: f64 = 0.01;

/// Units the linear scale terms of a matrix are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixUnits {
    /// Scale terms are still in twips (bitmap fill matrices).
    Twips,
    /// Scale terms are already plain ratios.
    Pixels,
}

/// SWF matrix as a standard affine transform in pixels.
///
/// Skew terms and translation are always divided by 20; scale terms only
/// when they are still in twips.
pub fn to_affine(m: &Matrix, units: MatrixUnits) -> Affine {
    let scale_div = match units {
        MatrixUnits::Twips => TWIPS_PER_PIXEL,
        MatrixUnits::Pixels => 1.0,
    };
    Affine::new([
        m.scale_x / scale_div,
        m.rotate_skew0 / TWIPS_PER_PIXEL,
        m.rotate_skew1 / TWIPS_PER_PIXEL,
        m.scale_y / scale_div,
        m.translate_x as f64 / TWIPS_PER_PIXEL,
        m.translate_y as f64 / TWIPS_PER_PIXEL,
    ])
}

/// True when the linear part is a pure rotation: unit-length, mutually
/// orthogonal axes and a determinant of +1. Reflections are rejected.
pub fn is_rotation(m: &Matrix) -> bool {
    let (a, b, c, d) = (m.scale_x, m.rotate_skew1, m.rotate_skew0, m.scale_y);
    let orthonormal = ((a * a + b * b) - 1.0).abs() < ROTATION_TOLERANCE
        && ((c * c + d * d) - 1.0).abs() < ROTATION_TOLERANCE
        && (a * c + b * d).abs() < ROTATION_TOLERANCE;
    let det = linear_part(m).determinant();
    orthonormal && (det - 1.0).abs() < ROTATION_TOLERANCE
}

/// Rotation angle of the matrix in radians, ignoring axis scale.
pub fn rotation_angle(m: &Matrix) -> f64 {
    let [a, _, c, ..] = linear_part(m).as_coeffs();
    c.atan2(a)
}

/// Angle as stored in a move record: negated radians times 1000.
pub fn encode_rotation(m: &Matrix) -> i16 {
    (-rotation_angle(m) * 1000.0) as i16
}

/// Inverse of `encode_rotation`: the unit rotation matrix for a stored angle.
pub fn decode_rotation(stored: i16) -> Matrix {
    let angle = -(stored as f64) / 1000.0;
    let (sin, cos) = angle.sin_cos();
    Matrix {
        scale_x: cos,
        scale_y: cos,
        rotate_skew0: -sin,
        rotate_skew1: sin,
        translate_x: 0,
        translate_y: 0,
    }
}

/// 16.16 fixed point.
pub fn fixed_16_16(v: f64) -> i32 {
    (v * 65536.0) as i32
}

/// Affine terms of a move record in write order: scaleX, skew1, skew0, scaleY.
pub fn affine_terms(m: &Matrix) -> [i32; 4] {
    [
        fixed_16_16(m.scale_x),
        fixed_16_16(m.rotate_skew1),
        fixed_16_16(m.rotate_skew0),
        fixed_16_16(m.scale_y),
    ]
}

fn linear_part(m: &Matrix) -> Affine {
    Affine::new([m.scale_x, m.rotate_skew0, m.rotate_skew1, m.scale_y, 0.0, 0.0])
}
