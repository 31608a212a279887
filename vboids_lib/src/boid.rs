use ndarray::ArrayView1;

use crate::math_helpers::heading;

/// Everything observers may want about an agent that the physics does not need.
///
/// Overwritten every step, never read back by the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoidMetadata {
    pub id: usize,
    /// agents taken into account by cohesion and alignment
    pub n_neighbours: usize,
    /// agents inside the separation radius
    pub n_crowding: usize,
}

impl BoidMetadata {
    pub fn new(id: usize) -> Self {
        let mut default: BoidMetadata = Default::default();
        default.id = id;
        default
    }
}

impl Default for BoidMetadata {
    fn default() -> Self {
        Self {
            id: std::usize::MAX,
            n_neighbours: 0,
            n_crowding: 0,
        }
    }
}

/// A single agent, borrowed as one row of the flock's matrices.
///
/// Agents are not stored individually, this only exists for callers that
/// want to walk the flock one agent at a time (rendering, sampling).
#[derive(Debug, Clone, Copy)]
pub struct Boid<'a> {
    // sequential id starting from 0, the row index
    pub id: usize,
    pub position: ArrayView1<'a, f32>,
    pub velocity: ArrayView1<'a, f32>,
    pub weight: f32,
}

impl<'a> Boid<'a> {
    /// Heading angle within the first two dimensions, what a renderer rotates by
    pub fn heading(&self) -> f32 {
        heading(self.velocity)
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::arr1;

    use super::{Boid, BoidMetadata};

    #[test]
    fn heading_follows_velocity() {
        let position = arr1(&[3_f32, 4., 5.]);
        let velocity = arr1(&[0_f32, -1., 0.]);
        let boid = Boid {
            id: 0,
            position: position.view(),
            velocity: velocity.view(),
            weight: 1.,
        };

        assert_relative_eq!(boid.heading(), -std::f32::consts::FRAC_PI_2);
        assert_eq!(boid.x(), 3.);
        assert_eq!(boid.y(), 4.);
    }

    #[test]
    fn metadata_defaults() {
        let metadata = BoidMetadata::new(7);

        assert_eq!(metadata.id, 7);
        assert_eq!(metadata.n_neighbours, 0);
        assert_eq!(BoidMetadata::default().id, std::usize::MAX);
    }
}
