//! Small geometric helpers used by path resampling and gadget placement
//!
//! Triangle solving runs in double precision: bends close to a straight line
//! produce tiny sines whose ratio is meaningless in `f32`.

use glam::{DVec3, Mat3, Quat, Vec3};
use thiserror::Error;

/// Lengths below this are treated as zero
pub const LENGTH_EPSILON: f64 = 1e-9;

/// Geometry errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Degenerate triangle: {0}")]
    DegenerateTriangle(String),
}

/// Bend angle in degrees between two consecutive polyline directions.
///
/// Returns `180 - angle(from, to)`, so a straight continuation is 180 and a
/// full reversal is 0. Zero-length vectors count as a raw angle of 0.
pub fn angle_between(from: DVec3, to: DVec3) -> f64 {
    let denom = (from.length_squared() * to.length_squared()).sqrt();
    let raw = if denom < LENGTH_EPSILON * LENGTH_EPSILON {
        0.0
    } else {
        (from.dot(to) / denom).clamp(-1.0, 1.0).acos().to_degrees()
    };
    180.0 - raw
}

/// Solve for side `c` of a triangle given sides `a`, `b` and the angle
/// opposite `a` (degrees), using the law of sines.
pub fn third_side_ssa(side_a: f64, side_b: f64, angle_a: f64) -> Result<f64, GeometryError> {
    if !(side_a > 0.0) || !side_b.is_finite() || !angle_a.is_finite() {
        return Err(GeometryError::DegenerateTriangle(format!(
            "a = {side_a}, b = {side_b}, angle = {angle_a}"
        )));
    }

    let sin_a = angle_a.to_radians().sin();
    let ratio = side_b * sin_a / side_a;
    if !(-1.0..=1.0).contains(&ratio) {
        return Err(GeometryError::DegenerateTriangle(format!(
            "asin argument {ratio} out of range"
        )));
    }

    let angle_b = ratio.asin().to_degrees();
    let angle_c = angle_a + angle_b;
    let side_c = angle_c.to_radians().sin() * side_a / sin_a;

    if side_c.is_finite() {
        Ok(side_c)
    } else {
        Err(GeometryError::DegenerateTriangle(format!(
            "sin({angle_a}) is zero"
        )))
    }
}

/// Rotation that points local +Z along `forward`, keeping +Y up where possible
pub fn look_rotation(forward: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };

    // Looking straight up or down: fall back to +Z as the reference up
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = up.cross(forward).normalize();
    let up = forward.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}
