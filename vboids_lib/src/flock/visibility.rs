use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};

use super::geometry::Geometry;
use crate::math_helpers::cosine_similarity;

/// Pairwise perception of a flock snapshot for one radius.
///
/// Row i describes what agent i perceives. Diagonals are always zero/false,
/// an agent is never its own neighbour and never sees itself.
#[derive(Debug, Clone)]
pub struct SeeMask {
    /// `weights[i] * weights[j]` for pairs closer than the radius, 0 otherwise
    pub is_neighbour: Array2<f32>,
    /// j lies in the forward half-space of i's velocity
    pub can_see: Array2<bool>,
}

impl SeeMask {
    pub fn new(
        velocities: ArrayView2<f32>,
        geometry: &Geometry,
        radius: f32,
        weights: ArrayView1<f32>,
    ) -> Self {
        let is_neighbour = Zip::indexed(&geometry.dists).map_collect(|(i, j), &dist| {
            if i != j && dist < radius {
                weights[i] * weights[j]
            } else {
                0.
            }
        });

        // 180° vision, without it colliding flocks tend to merge instead of
        // keeping some collective momentum
        let can_see = Zip::indexed(geometry.deltas.lanes(Axis(2))).map_collect(|(i, j), delta| {
            i != j && cosine_similarity(delta, velocities.row(i)) > 0.
        });

        SeeMask {
            is_neighbour,
            can_see,
        }
    }

    /// Mask the rules average over, optionally restricted to what each agent can see.
    pub fn effect_mask(&self, use_vision: bool) -> Array2<f32> {
        if use_vision {
            Zip::from(&self.is_neighbour)
                .and(&self.can_see)
                .map_collect(|&weight, &seen| if seen { weight } else { 0. })
        } else {
            self.is_neighbour.to_owned()
        }
    }
}

/// Number of agents each row of `mask` takes into account
pub fn neighbour_counts(mask: &Array2<f32>) -> Vec<usize> {
    mask.rows()
        .into_iter()
        .map(|row| row.iter().filter(|&&w| w > 0.).count())
        .collect()
}

/// Scales weights so the heaviest agent has weight 1.
///
/// All zero weights are left alone, nobody can be seen in that flock.
pub fn normalize_weights(weights: ArrayView1<f32>) -> Array1<f32> {
    let max = weights.fold(0_f32, |acc, &w| acc.max(w));
    if max > 0. {
        &weights / max
    } else {
        weights.to_owned()
    }
}
