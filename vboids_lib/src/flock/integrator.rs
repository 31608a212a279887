use ndarray::{Array1, Array2, Zip};

use crate::math_helpers::{try_normalize, wrap};

/// Advances a flock snapshot by `dt`.
///
/// Agents always travel at `speed`, the acceleration only turns them:
/// `v' = normalize(v + a·dt·√speed)` and `p' = wrap(p + v'·dt·speed)`.
pub fn integrate(
    positions: &mut Array2<f32>,
    velocities: &mut Array2<f32>,
    acceleration: &Array2<f32>,
    dt: f32,
    speed: f32,
    wrap_bounds: &Array1<f32>,
) {
    let mut next = velocities.to_owned();
    next.scaled_add(dt * speed.sqrt(), acceleration);

    Zip::from(next.rows_mut())
        .and(velocities.rows())
        .for_each(|mut v, previous| {
            if try_normalize(v.view_mut()) {
                return;
            }
            // cancelled out, keep going the way we were going
            v.assign(&previous);
            if !try_normalize(v.view_mut()) {
                v.fill(0.);
                v[0] = 1.;
            }
        });

    positions.scaled_add(dt * speed, &next);
    wrap_positions(positions, wrap_bounds);

    *velocities = next;
}

/// Toroidal boundary, every column wrapped into `[0, bound)`
pub fn wrap_positions(positions: &mut Array2<f32>, wrap_bounds: &Array1<f32>) {
    for mut row in positions.rows_mut() {
        Zip::from(&mut row)
            .and(wrap_bounds)
            .for_each(|x, &bound| *x = wrap(*x, bound));
    }
}
