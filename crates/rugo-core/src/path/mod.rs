//! Freehand path capture and resampling
//!
//! A drawn stroke arrives as an irregular, densely sampled polyline. Before
//! gadgets can be placed along it, the stroke is resampled into points that
//! sit on the input polyline with a uniform straight-line gap between
//! consecutive points.

mod capture;
mod guide;

pub use capture::{CaptureSettings, CaptureState, PathCapture, PathCompleteCallback};
pub use guide::PathGuide;

use glam::{DVec3, Vec3};

use crate::geometry::{LENGTH_EPSILON, angle_between, third_side_ssa};

/// Below this sine a bend is treated as a straight line (or a full reversal)
const COLLINEAR_SINE: f64 = 1e-6;

/// Fraction of the spacing forgiven when counting whole steps in a segment
const STEP_TOLERANCE: f64 = 1e-6;

/// Fraction of the spacing within which a point counts as sitting on the end vertex
const END_TOLERANCE: f64 = 1e-4;

/// Result of resampling a polyline
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledPath {
    /// Evenly spaced points, starting at the first input point
    pub points: Vec<Vec3>,
    /// Straight-line distance from the last point to the end of the stroke
    pub leftover: f32,
}

/// Resample `path` into points spaced `spacing` apart.
///
/// See [`resample_path`] for the exact placement rules.
pub fn resample(path: &[Vec3], spacing: f32) -> Vec<Vec3> {
    resample_path(path, spacing).points
}

/// Resample `path` into points spaced `spacing` apart, reporting the leftover.
///
/// - The first output point is the first input point.
/// - Every following point lies on the input polyline, exactly `spacing`
///   away from its predecessor. Across a bend the distance is measured as a
///   straight line, solved with the law of sines.
/// - The stroke's last increment is never closed with a point: the path ends
///   just short of its final vertex and the straight-line remainder, in
///   `(0, spacing]`, is reported as `leftover`.
/// - A vertex exactly `spacing` away from the previous point receives a point.
/// - Zero-length segments and bends with no valid crossing are skipped.
pub fn resample_path(path: &[Vec3], spacing: f32) -> ResampledPath {
    let Some(&first) = path.first() else {
        return ResampledPath {
            points: Vec::new(),
            leftover: 0.0,
        };
    };

    if path.len() == 1 {
        return ResampledPath {
            points: vec![first],
            leftover: 0.0,
        };
    }

    if !(spacing > 0.0) || !spacing.is_finite() {
        tracing::warn!(spacing, "Cannot resample with a non-positive spacing");
        return ResampledPath {
            points: path.to_vec(),
            leftover: 0.0,
        };
    }

    let spacing = f64::from(spacing);
    let mut points = vec![first.as_dvec3()];
    let mut cursor = first.as_dvec3();
    // Unfilled length at the end of the last segment walked
    let mut remainder = 0.0_f64;
    let snap = spacing * STEP_TOLERANCE;

    for pair in path.windows(2) {
        let start = pair[0].as_dvec3();
        let end = pair[1].as_dvec3();
        let segment = end - start;
        let length = segment.length();

        if length <= LENGTH_EPSILON {
            tracing::debug!(?start, "Skipping zero-length segment");
            continue;
        }
        let direction = segment / length;

        let travelled = if remainder <= snap || cursor.distance(start) <= snap {
            cursor = start;
            0.0
        } else {
            if cursor.distance(end) < spacing - snap {
                // No point fits before the segment ends; carry on from the same cursor
                continue;
            }

            let offset = match bend_offset(cursor, start, segment, spacing) {
                Some(offset) if (0.0..=length + snap).contains(&offset) => offset.min(length),
                Some(offset) => {
                    tracing::debug!(offset, length, "Bend crossing falls outside its segment");
                    continue;
                }
                None => continue,
            };

            cursor = start + direction * offset;
            points.push(cursor);
            offset
        };

        let remaining = length - travelled;
        let count = (remaining / spacing + STEP_TOLERANCE).floor() as usize;
        for _ in 0..count {
            cursor += direction * spacing;
            points.push(cursor);
        }
        remainder = (remaining - count as f64 * spacing).max(0.0);
    }

    // Never finish on the final vertex itself
    let last_vertex = path[path.len() - 1].as_dvec3();
    if points.len() > 1
        && let Some(&last) = points.last()
        && last.distance(last_vertex) <= spacing * END_TOLERANCE
    {
        points.pop();
    }
    let leftover = points
        .last()
        .map_or(0.0, |last| last.distance(last_vertex));

    ResampledPath {
        points: points.iter().map(|p| p.as_vec3()).collect(),
        leftover: leftover as f32,
    }
}

/// Distance from `vertex` along `segment` to the point exactly `spacing`
/// away from `cursor`, where `cursor` trails the vertex by less than `spacing`.
fn bend_offset(cursor: DVec3, vertex: DVec3, segment: DVec3, spacing: f64) -> Option<f64> {
    let angle = angle_between(vertex - cursor, segment);
    let side_b = vertex.distance(cursor);

    if angle.to_radians().sin().abs() < COLLINEAR_SINE {
        // Law of sines degenerates; the triangle collapses onto the line
        return Some(spacing + side_b * angle.to_radians().cos());
    }

    match third_side_ssa(spacing, side_b, angle) {
        Ok(side_c) => Some(side_c),
        Err(e) => {
            tracing::debug!(%e, "Skipping segment with degenerate bend");
            None
        }
    }
}
