use ndarray::{Array2, ArrayView2, ArrayView3, Axis, Zip};

use super::{geometry::Geometry, visibility::SeeMask};
use crate::math_helpers::clamp_norm_rows;

/// Average of `effect[[i, j, ..]]` over the j selected by row i of `mask`.
///
/// `effect` is N×N×D or anything broadcasting to it, such as 1×N×D.
/// `mask` may carry weights, the average is then weighted by them. Rows with
/// nothing in their neighbourhood average to the zero vector.
pub fn average_effect(effect: ArrayView3<f32>, mask: ArrayView2<f32>) -> Array2<f32> {
    let counts = mask.sum_axis(Axis(1));
    let weighted = &effect * &mask.insert_axis(Axis(2));
    let mut sums = weighted.sum_axis(Axis(1));

    Zip::from(sums.rows_mut())
        .and(&counts)
        .for_each(|mut sum, &count| {
            if count > 0. {
                sum /= count;
            } else {
                sum.fill(0.);
            }
        });

    sums
}

/// Short range repulsion, never vision gated so threats from behind count too.
///
/// Each neighbour closer than `separation_radius` pushes straight away with
/// `|dist - separation_radius|²`, which is strongest for the nearest agents and
/// fades out to nothing at the radius. The average is norm clamped like the
/// other two rules, so it competes with them instead of saturating the blend.
pub fn separation(geometry: &Geometry, mask: &SeeMask, separation_radius: f32) -> Array2<f32> {
    // -(delta / dist) * |dist - r|², folded into one scale per pair and left
    // at zero outside the mask
    let scale = Zip::from(&geometry.dists)
        .and(&mask.is_neighbour)
        .map_collect(|&dist, &weight| {
            if weight > 0. {
                -(dist - separation_radius).abs().powi(2) / dist
            } else {
                0.
            }
        });
    let repulsion = &geometry.deltas * &scale.insert_axis(Axis(2));

    let mut res = average_effect(repulsion.view(), mask.is_neighbour.view());
    clamp_norm_rows(&mut res);
    res
}

/// Steers towards the centre of the neighbourhood, norm clamped.
pub fn cohesion(geometry: &Geometry, mask: &SeeMask, use_vision: bool) -> Array2<f32> {
    let effect_mask = mask.effect_mask(use_vision);
    let mut res = average_effect(geometry.deltas.view(), effect_mask.view());
    clamp_norm_rows(&mut res);
    res
}

/// Steers towards the average heading of the neighbourhood, norm clamped.
pub fn alignment(velocities: ArrayView2<f32>, mask: &SeeMask, use_vision: bool) -> Array2<f32> {
    let effect_mask = mask.effect_mask(use_vision);
    // (1, N, D), every row i looks at the same velocities[j]
    let effect = velocities.insert_axis(Axis(0));

    let mut res = average_effect(effect, effect_mask.view());
    clamp_norm_rows(&mut res);
    res
}

/// Separation at full strength, cohesion and alignment sharing the rest, clamped to unit norm
pub fn blend(
    separation: &Array2<f32>,
    cohesion: &Array2<f32>,
    alignment: &Array2<f32>,
    cohesion_factor: f32,
    alignment_factor: f32,
) -> Array2<f32> {
    let mut acceleration = separation.to_owned();
    acceleration.scaled_add(cohesion_factor, cohesion);
    acceleration.scaled_add(alignment_factor, alignment);
    clamp_norm_rows(&mut acceleration);
    acceleration
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{arr2, Array1, Array2, Array3};
    use rstest::rstest;

    use super::*;
    use crate::math_helpers::norm;

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    fn masks(positions: &Array2<f32>, velocities: &Array2<f32>, radius: f32) -> (Geometry, SeeMask) {
        let geometry = Geometry::new(positions.view());
        let n = positions.nrows();
        let mask = SeeMask::new(velocities.view(), &geometry, radius, Array1::ones(n).view());
        (geometry, mask)
    }

    #[test]
    fn average_effect_without_neighbours_is_zero() {
        let effect = Array3::from_elem((3, 3, 2), 7_f32);
        let mask = Array2::<f32>::zeros((3, 3));

        let res = average_effect(effect.view(), mask.view());

        assert_eq!(res, Array2::<f32>::zeros((3, 2)));
        assert!(res.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn average_effect_is_weighted() {
        let mut effect = Array3::<f32>::zeros((2, 2, 2));
        effect[[0, 0, 0]] = 100.;
        effect[[0, 1, 0]] = 4.;
        let mask = arr2(&[[0_f32, 0.5], [0., 0.]]);

        let res = average_effect(effect.view(), mask.view());

        // the diagonal entry is masked out, the weight cancels for a single neighbour
        assert_eqf32!(res[[0, 0]], 4.);
        assert_eqf32!(res[[0, 1]], 0.);
    }

    #[test]
    fn separation_points_away_from_intruder() {
        let positions = arr2(&[[100_f32, 100.], [103., 104.]]);
        let velocities = arr2(&[[1_f32, 0.], [-1., 0.]]);
        let (geometry, mask) = masks(&positions, &velocities, 10.);

        let res = separation(&geometry, &mask, 10.);

        // 5 apart, |5 - 10|² = 25 along the unit vector (0.6, 0.8), clamped to 1
        assert_eqf32!(res[[0, 0]], -0.6);
        assert_eqf32!(res[[0, 1]], -0.8);
        assert_eqf32!(res[[1, 0]], 0.6);
        assert_eqf32!(res[[1, 1]], 0.8);
    }

    #[test]
    fn separation_weakens_towards_radius() {
        // 9.5 apart with radius 10, |9.5 - 10|² = 0.25 stays below the clamp
        let positions = arr2(&[[0_f32, 0.], [9.5, 0.]]);
        let velocities = arr2(&[[1_f32, 0.], [1., 0.]]);
        let (geometry, mask) = masks(&positions, &velocities, 10.);

        let res = separation(&geometry, &mask, 10.);

        assert_eqf32!(res[[0, 0]], -0.25);
        assert_eqf32!(res[[1, 0]], 0.25);
    }

    #[test]
    fn separation_ignores_vision() {
        // agent 1 is behind agent 0
        let positions = arr2(&[[10_f32, 0.], [8., 0.]]);
        let velocities = arr2(&[[1_f32, 0.], [1., 0.]]);
        let (geometry, mask) = masks(&positions, &velocities, 5.);
        assert!(!mask.can_see[[0, 1]]);

        let res = separation(&geometry, &mask, 5.);

        assert!(res[[0, 0]] > 0.);
    }

    #[test]
    fn cohesion_points_to_centroid_direction() {
        let positions = arr2(&[[0_f32, 0.], [0.6, 0.], [0., 0.8]]);
        let velocities = Array2::from_elem((3, 2), 0.5_f32);
        let (geometry, mask) = masks(&positions, &velocities, 10.);

        let res = cohesion(&geometry, &mask, false);

        // centroid of the two others relative to agent 0 is (0.3, 0.4), shorter than 1
        assert_eqf32!(res[[0, 0]], 0.3);
        assert_eqf32!(res[[0, 1]], 0.4);
        for row in res.rows() {
            assert!(norm(row) <= 1. + 1e-5);
        }
    }

    #[test]
    fn cohesion_with_vision_skips_agents_behind() {
        let positions = arr2(&[[0_f32, 0.], [5., 0.], [-5., 0.]]);
        let velocities = arr2(&[[1_f32, 0.], [1., 0.], [1., 0.]]);
        let (geometry, mask) = masks(&positions, &velocities, 20.);

        let blind = cohesion(&geometry, &mask, false);
        let seeing = cohesion(&geometry, &mask, true);

        // without vision the two neighbours cancel out
        assert_eqf32!(norm(blind.row(0)), 0.);
        assert_eqf32!(seeing[[0, 0]], 1.);
        assert_eqf32!(seeing[[0, 1]], 0.);
        // the leading agent sees nobody
        assert_eq!(seeing.row(1).to_vec(), vec![0_f32, 0.]);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn alignment_averages_neighbour_headings(#[case] use_vision: bool) {
        let positions = arr2(&[[0_f32, 0.], [1., 1.], [1., -1.]]);
        let velocities = arr2(&[[1_f32, 0.], [0., 1.], [0., -1.]]);
        let (_, mask) = masks(&positions, &velocities, 10.);

        let res = alignment(velocities.view(), &mask, use_vision);

        // opposite headings of 1 and 2 cancel, no NaN from the zero vector
        assert_eqf32!(res[[0, 0]], 0.);
        assert_eqf32!(res[[0, 1]], 0.);
    }

    #[test]
    fn alignment_with_vision_follows_agents_in_front() {
        let positions = arr2(&[[0_f32, 0.], [5., 0.], [-5., 0.]]);
        let velocities = arr2(&[[1_f32, 0.], [0., 1.], [1., 0.]]);
        let (_, mask) = masks(&positions, &velocities, 20.);

        let blind = alignment(velocities.view(), &mask, false);
        let seeing = alignment(velocities.view(), &mask, true);

        // only agent 1 is ahead of agent 0
        assert_eqf32!(seeing[[0, 0]], 0.);
        assert_eqf32!(seeing[[0, 1]], 1.);
        assert_eqf32!(blind[[0, 0]], 0.5);
        assert_eqf32!(blind[[0, 1]], 0.5);
        assert_ne!(seeing.row(0), blind.row(0));
    }

    #[test]
    fn alignment_matches_shared_heading() {
        let positions = arr2(&[[0_f32, 0., 0.], [1., 0., 0.], [0., 1., 0.]]);
        let velocities = arr2(&[[0_f32, 0., 1.], [0., 0., 1.], [0., 0., 1.]]);
        let (_, mask) = masks(&positions, &velocities, 10.);

        let res = alignment(velocities.view(), &mask, false);

        for row in res.rows() {
            assert_eqf32!(row[2], 1.);
        }
    }

    #[test]
    fn blend_clamps_and_weights() {
        let separation = arr2(&[[0_f32, 0.], [3., 0.]]);
        let cohesion = arr2(&[[1_f32, 0.], [0., 1.]]);
        let alignment = arr2(&[[0_f32, 1.], [0., 0.]]);

        let res = blend(&separation, &cohesion, &alignment, 0.25, 0.75);

        assert_eqf32!(res[[0, 0]], 0.25);
        assert_eqf32!(res[[0, 1]], 0.75);
        assert_eqf32!(norm(res.row(1)), 1.);
        assert!(res[[1, 0]] > res[[1, 1]]);
    }
}
