use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::math_helpers::EPSILON;

/// All-pairs geometry of a flock snapshot.
///
/// `deltas[[i, j, ..]]` points from agent i towards agent j, `dists[[i, j]]` is its
/// length plus [`EPSILON`]. Both are dense, there is no spatial partitioning.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// N×N×D
    pub deltas: Array3<f32>,
    /// N×N
    pub dists: Array2<f32>,
}

impl Geometry {
    pub fn new(positions: ArrayView2<f32>) -> Self {
        let (n, d) = positions.dim();

        // p[j] - p[i], built by broadcasting the (1, N, D) rows against the (N, 1, D) rows
        let deltas = &positions.insert_axis(Axis(0)) - &positions.insert_axis(Axis(1));
        debug_assert_eq!(deltas.dim(), (n, n, d));

        let dists = deltas.map_axis(Axis(2), |delta| delta.dot(&delta).sqrt() + EPSILON);

        Geometry { deltas, dists }
    }

    pub fn len(&self) -> usize {
        self.dists.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
