use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};
use rand::Rng;

/// Added to every pairwise distance so coincident agents never divide by zero
pub const EPSILON: f32 = 1e-6;

#[inline]
pub fn norm(v: ArrayView1<f32>) -> f32 {
    v.dot(&v).sqrt()
}

/// Scales `v` down to at most unit length, in place.
///
/// A zero vector stays zero, anything no longer than 1 is left untouched and
/// longer vectors keep their direction with norm exactly 1. Unlike plain
/// normalisation this lets forces that nearly cancel out stay small.
pub fn clamp_norm(mut v: ArrayViewMut1<f32>) {
    let n = norm(v.view());
    if n > 1. {
        v /= n;
    }
}

/// [`clamp_norm`] applied to every row
pub fn clamp_norm_rows(forces: &mut Array2<f32>) {
    forces.rows_mut().into_iter().for_each(clamp_norm);
}

/// Normalises `v` in place, returns false and leaves it as is when it has no length
pub fn try_normalize(mut v: ArrayViewMut1<f32>) -> bool {
    let n = norm(v.view());
    if n > 0. && n.is_finite() {
        v /= n;
        true
    } else {
        false
    }
}

/// cos of the angle between `a` and `b`, 0 when either has no length
pub fn cosine_similarity(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    let denominator = norm(a) * norm(b);
    if denominator > 0. {
        a.dot(&b) / denominator
    } else {
        0.
    }
}

/// Wraps `x` into `[0, bound)`, an agent leaving one edge re-enters at the other
#[inline]
pub fn wrap(x: f32, bound: f32) -> f32 {
    let res = x.rem_euclid(bound);
    // tiny negative values can round up onto the bound itself
    if res >= bound {
        0.
    } else {
        res
    }
}

/// Heading angle in radians within the plane of the first two dimensions
#[inline]
pub fn heading(velocity: ArrayView1<f32>) -> f32 {
    velocity[1].atan2(velocity[0])
}

/// Uniformly distributed direction in `dimension` dimensions.
///
/// Rejection samples the unit ball so the direction is not biased towards the
/// corners of the cube.
pub fn random_unit_vector<R: Rng>(rng: &mut R, dimension: usize) -> Array1<f32> {
    loop {
        let mut candidate = Array1::from_shape_fn(dimension, |_| rng.gen::<f32>() * 2. - 1.);
        let n = norm(candidate.view());
        if n > 1e-3 && n <= 1. {
            candidate /= n;
            return candidate;
        }
    }
}
