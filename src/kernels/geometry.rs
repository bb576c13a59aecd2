//! Vector helpers shared by the kernels

use crate::dump::{BoxDims, Vec3};

/// Component-wise `a - b`
#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Squared Euclidean norm
#[inline]
pub fn norm2(v: Vec3) -> f64 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

/// Fold a separation vector into the nearest periodic image.
///
/// Axes with a non-positive box length are left untouched.
#[inline]
pub fn minimum_image(delta: Vec3, box_dims: &BoxDims) -> Vec3 {
    let mut out = delta;
    for (d, &length) in out.iter_mut().zip(box_dims.lengths.iter()) {
        if length > 0.0 {
            *d -= (*d / length).round() * length;
        }
    }
    out
}

/// Squared minimum-image distance between two points
#[inline]
pub fn min_image_dist2(a: Vec3, b: Vec3, box_dims: &BoxDims) -> f64 {
    norm2(minimum_image(sub(a, b), box_dims))
}
