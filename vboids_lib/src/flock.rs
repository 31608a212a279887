use std::f32::consts::PI;

use log::{debug, info, warn};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::boid::{Boid, BoidMetadata};
use crate::error::{FlockError, Result};
use crate::math_helpers::{heading, random_unit_vector, wrap};
use crate::options::{InitiationStrategy, RunOptions};

use self::geometry::Geometry;
use self::integrator::{integrate, wrap_positions};
use self::visibility::{neighbour_counts, normalize_weights, SeeMask};

pub mod geometry;
pub mod integrator;
pub mod rules;
pub mod visibility;

/// Everything the rules produced for one snapshot, one row per agent.
#[derive(Debug, Clone)]
pub struct Steering {
    pub separation: Array2<f32>,
    pub cohesion: Array2<f32>,
    pub alignment: Array2<f32>,
    /// blended and clamped, what the integrator consumes
    pub acceleration: Array2<f32>,
    pub n_neighbours: Vec<usize>,
    pub n_crowding: Vec<usize>,
}

/// The whole population as a columnar batch.
///
/// Agents are row indices into `positions` and `velocities`, every tick is
/// computed from one consistent snapshot of both matrices and then written
/// back in place.
pub struct Flock {
    /// N×D
    positions: Array2<f32>,
    /// N×D, unit rows once stepped
    velocities: Array2<f32>,
    /// N, raw as set by the caller, normalised when the masks are built
    weights: Array1<f32>,
    /// D
    wrap_bounds: Array1<f32>,
    metadata: Vec<BoidMetadata>,
    options: RunOptions,
    rng: Xoshiro256PlusPlus,
}

impl Flock {
    /// Two dimensional flock of `run_options.init_boids` agents
    pub fn new(run_options: RunOptions) -> Result<Self> {
        Flock::initialize(run_options.init_boids, 2, run_options)
    }

    pub fn initialize(n: usize, dimension: usize, run_options: RunOptions) -> Result<Self> {
        run_options.validate(dimension)?;

        let mut rng = match run_options.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::seed_from_u64(rand::thread_rng().gen()),
        };

        let (positions, velocities) = get_boids(n, dimension, &run_options, &mut rng);

        info!(
            "initialised flock of {n} boids in {dimension} dimensions, strategy {:?}",
            run_options.initiation_strat
        );

        Ok(Flock {
            positions,
            velocities,
            weights: Array1::ones(n),
            wrap_bounds: run_options.bounds.for_dimension(dimension),
            metadata: (0..n).map(BoidMetadata::new).collect(),
            options: run_options,
            rng,
        })
    }

    /// Advances every agent by `dt` from the same snapshot.
    ///
    /// Never fails, a negative or non finite `dt` is treated as 0.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0. {
            dt
        } else {
            warn!("ignoring invalid time step {dt}, stepping by 0");
            0.
        };

        let steering = self.steer();

        integrate(
            &mut self.positions,
            &mut self.velocities,
            &steering.acceleration,
            dt,
            self.options.speed,
            &self.wrap_bounds,
        );

        for (id, metadata) in self.metadata.iter_mut().enumerate() {
            metadata.id = id;
            metadata.n_neighbours = steering.n_neighbours[id];
            metadata.n_crowding = steering.n_crowding[id];
        }

        debug!("stepped {} boids by {dt}", self.len());
    }

    /// Evaluates the three rules on the current snapshot without moving anyone.
    pub fn steer(&self) -> Steering {
        let weights = normalize_weights(self.weights.view());
        let geometry = Geometry::new(self.positions.view());
        let use_vision = self.options.use_vision;

        let separation_mask = SeeMask::new(
            self.velocities.view(),
            &geometry,
            self.options.separation_radius,
            weights.view(),
        );
        let separation =
            rules::separation(&geometry, &separation_mask, self.options.separation_radius);

        // cohesion and alignment share one neighbourhood
        let neighbourhood_mask = SeeMask::new(
            self.velocities.view(),
            &geometry,
            self.options.neighbourhood_radius,
            weights.view(),
        );
        let cohesion = rules::cohesion(&geometry, &neighbourhood_mask, use_vision);
        let alignment = rules::alignment(self.velocities.view(), &neighbourhood_mask, use_vision);

        let acceleration = rules::blend(
            &separation,
            &cohesion,
            &alignment,
            self.options.cohesion_factor(),
            self.options.alignment_factor(),
        );

        Steering {
            separation,
            cohesion,
            alignment,
            acceleration,
            n_neighbours: neighbour_counts(&neighbourhood_mask.effect_mask(use_vision)),
            n_crowding: neighbour_counts(&separation_mask.is_neighbour),
        }
    }

    /// Blended acceleration for the current snapshot
    pub fn acceleration(&self) -> Array2<f32> {
        self.steer().acceleration
    }

    /// Swaps in new options, checked against this flock's dimension.
    pub fn reconfigure(&mut self, run_options: RunOptions) -> Result<()> {
        run_options.validate(self.dimension())?;
        self.wrap_bounds = run_options.bounds.for_dimension(self.dimension());
        self.options = run_options;
        Ok(())
    }

    /// Replaces every position, wrapping them into the box so a zero step moves nobody.
    pub fn set_positions(&mut self, positions: Array2<f32>) -> Result<()> {
        self.check_shape(positions.shape())?;
        let mut positions = positions;
        wrap_positions(&mut positions, &self.wrap_bounds);
        self.positions = positions;
        Ok(())
    }

    pub fn set_velocities(&mut self, velocities: Array2<f32>) -> Result<()> {
        self.check_shape(velocities.shape())?;
        self.velocities = velocities;
        Ok(())
    }

    /// Sets how strongly each agent is perceived, zero makes it invisible.
    pub fn set_weights(&mut self, weights: Array1<f32>) -> Result<()> {
        if weights.len() != self.len() {
            return Err(FlockError::Shape {
                expected: vec![self.len()],
                found: weights.shape().to_vec(),
            });
        }

        if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.) {
            return Err(FlockError::Weights(bad));
        }

        self.weights = weights;
        Ok(())
    }

    /// Appends an agent with unit weight, returns its id.
    ///
    /// The position is wrapped into the box.
    pub fn insert_boid(&mut self, position: ArrayView1<f32>, velocity: ArrayView1<f32>) -> Result<usize> {
        let dimension = self.dimension();
        for found in [position.len(), velocity.len()] {
            if found != dimension {
                return Err(FlockError::Shape {
                    expected: vec![dimension],
                    found: vec![found],
                });
            }
        }

        let position = Zip::from(&position)
            .and(&self.wrap_bounds)
            .map_collect(|&x, &bound| wrap(x, bound));

        let shape_err = |_| FlockError::Shape {
            expected: vec![dimension],
            found: vec![dimension],
        };
        self.positions.push_row(position.view()).map_err(shape_err)?;
        self.velocities.push_row(velocity).map_err(shape_err)?;
        self.weights = self.weights.iter().copied().chain(std::iter::once(1.)).collect();

        let id = self.metadata.len();
        self.metadata.push(BoidMetadata::new(id));

        Ok(id)
    }

    /// Inserts an agent placed by the initiation strategy
    pub fn insert(&mut self) -> Result<usize> {
        let (position, velocity) = get_boid(self.dimension(), &self.options, &mut self.rng);
        self.insert_boid(position.view(), velocity.view())
    }

    /// Removes the most recently added agent, returns its id
    pub fn delete_last(&mut self) -> Option<usize> {
        let n = self.len();
        if n == 0 {
            return None;
        }

        self.positions = self.positions.slice(s![..n - 1, ..]).to_owned();
        self.velocities = self.velocities.slice(s![..n - 1, ..]).to_owned();
        self.weights = self.weights.slice(s![..n - 1]).to_owned();
        self.metadata.pop();

        Some(n - 1)
    }

    /// Re-places every agent with the initiation strategy, keeping the population size
    pub fn restart(&mut self) {
        let (positions, velocities) =
            get_boids(self.len(), self.dimension(), &self.options, &mut self.rng);
        self.positions = positions;
        self.velocities = velocities;
        self.weights = Array1::ones(self.len());
        self.metadata = (0..self.len()).map(BoidMetadata::new).collect();
    }

    pub fn positions(&self) -> ArrayView2<f32> {
        self.positions.view()
    }

    pub fn velocities(&self) -> ArrayView2<f32> {
        self.velocities.view()
    }

    pub fn weights(&self) -> ArrayView1<f32> {
        self.weights.view()
    }

    /// Heading angle of every agent within the first two dimensions
    pub fn headings(&self) -> Array1<f32> {
        self.velocities.map_axis(Axis(1), heading)
    }

    pub fn metadata(&self) -> &[BoidMetadata] {
        &self.metadata
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn dimension(&self) -> usize {
        self.wrap_bounds.len()
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walks the flock one agent at a time
    pub fn view(&self) -> impl Iterator<Item = Boid<'_>> + '_ {
        self.positions
            .outer_iter()
            .zip(self.velocities.outer_iter())
            .zip(self.weights.iter())
            .enumerate()
            .map(|(id, ((position, velocity), &weight))| Boid {
                id,
                position,
                velocity,
                weight,
            })
    }

    fn check_shape(&self, found: &[usize]) -> Result<()> {
        let expected = [self.len(), self.dimension()];
        if found == expected {
            Ok(())
        } else {
            Err(FlockError::Shape {
                expected: expected.to_vec(),
                found: found.to_vec(),
            })
        }
    }
}

fn get_boids<R: Rng>(
    n: usize,
    dimension: usize,
    run_options: &RunOptions,
    rng: &mut R,
) -> (Array2<f32>, Array2<f32>) {
    let mut positions = Array2::zeros((n, dimension));
    let mut velocities = Array2::zeros((n, dimension));

    for (mut position, mut velocity) in positions.outer_iter_mut().zip(velocities.outer_iter_mut()) {
        let (p, v) = get_boid(dimension, run_options, rng);
        position.assign(&p);
        velocity.assign(&v);
    }

    (positions, velocities)
}

fn get_boid<R: Rng>(dimension: usize, run_options: &RunOptions, rng: &mut R) -> (Array1<f32>, Array1<f32>) {
    let bounds = &run_options.bounds;

    match run_options.initiation_strat {
        InitiationStrategy::RandomRandom => {
            // x_d in [0, bound_d)
            let position = Array1::from_shape_fn(dimension, |d| {
                wrap(rng.gen::<f32>() * bounds.bound(d), bounds.bound(d))
            });
            let velocity = random_unit_vector(rng, dimension);

            (position, velocity)
        }
        InitiationStrategy::CircleCircumferenceIn => {
            let r = 0.45 * bounds.width.min(bounds.height);

            let init_pos: f32 = rng.gen::<f32>() / 3. + 2. / 3.;
            let angle = rng.gen::<f32>() * 2. * PI;

            let mut position = bounds.centre(dimension);
            position[0] += r * init_pos * angle.cos();
            position[1] += r * init_pos * angle.sin();

            // straight at the centre
            let mut velocity = Array1::zeros(dimension);
            velocity[0] = -angle.cos();
            velocity[1] = -angle.sin();

            (position, velocity)
        }
    }
}
