use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{FlockError, Result};

/// Lowest dimension the rules are defined for, headings need two axes.
pub const MIN_DIMENSION: usize = 2;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub init_boids: usize,
    pub initiation_strat: InitiationStrategy,
    /// fixes the initiation rng stream, `None` draws a fresh seed
    pub seed: Option<u64>,

    /// distance travelled per unit of time
    pub speed: f32,
    /// cohesion and alignment consider agents closer than this
    pub neighbourhood_radius: f32,
    /// separation considers agents closer than this, repulsion vanishes at it
    pub separation_radius: f32,
    /// in [0, 1], alignment takes the complement
    cohesion_factor: f32,
    /// restricts cohesion and alignment to the forward half-space
    pub use_vision: bool,

    pub bounds: WrapBounds,

    pub sample_rate: u64,
    pub save_options: SaveOptions,
}

impl RunOptions {
    pub fn cohesion_factor(&self) -> f32 {
        self.cohesion_factor
    }

    /// Derived, always `1 - cohesion_factor`.
    pub fn alignment_factor(&self) -> f32 {
        1. - self.cohesion_factor
    }

    /// Sets the cohesion factor, rejecting anything outside [0, 1] instead of clamping it.
    pub fn set_cohesion_factor(&mut self, cohesion_factor: f32) -> Result<()> {
        validate_cohesion_factor(cohesion_factor)?;
        self.cohesion_factor = cohesion_factor;
        Ok(())
    }

    pub fn with_cohesion_factor(mut self, cohesion_factor: f32) -> Result<Self> {
        self.set_cohesion_factor(cohesion_factor)?;
        Ok(self)
    }

    /// Checks everything a flock of the given dimension relies on
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if dimension < MIN_DIMENSION {
            return Err(FlockError::Dimension(dimension));
        }

        validate_cohesion_factor(self.cohesion_factor)?;

        if !self.speed.is_finite() || self.speed < 0. {
            return Err(FlockError::Speed(self.speed));
        }

        for (name, value) in [
            ("neighbourhood", self.neighbourhood_radius),
            ("separation", self.separation_radius),
        ] {
            if !value.is_finite() || value < 0. {
                return Err(FlockError::Radius { name, value });
            }
        }

        self.bounds.validate(dimension)
    }
}

fn validate_cohesion_factor(cohesion_factor: f32) -> Result<()> {
    // NaN fails the range check too
    if (0. ..=1.).contains(&cohesion_factor) {
        Ok(())
    } else {
        Err(FlockError::CohesionFactor(cohesion_factor))
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        let init_boids = 256;
        let init_width = 1200.;
        let init_height = 800.;

        let speed = 100.;
        let neighbourhood_radius = 80.;
        let separation_radius = 20.;
        let cohesion_factor = 0.5;
        let use_vision = true;

        let sample_rate = 1_u64;

        RunOptions {
            init_boids,
            initiation_strat: InitiationStrategy::RandomRandom,
            // initiation_strat: InitiationStrategy::CircleCircumferenceIn,
            seed: None,
            speed,
            neighbourhood_radius,
            separation_radius,
            cohesion_factor,
            use_vision,
            bounds: self::get_wrap_bounds(init_width, init_height),
            sample_rate,
            save_options: SaveOptions {
                save_locations: false,
                save_locations_path: Some("./".to_owned()),
                save_locations_timestamp: true,
            },
        }
    }
}

/// Wrap box, the space along dimension d is `[0, bound_d)`
pub fn get_wrap_bounds(init_width: f32, init_height: f32) -> WrapBounds {
    WrapBounds {
        width: init_width,
        height: init_height,
        extent: init_height,
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct WrapBounds {
    /// dimension 0
    pub width: f32,
    /// dimension 1
    pub height: f32,
    /// every dimension past the first two
    pub extent: f32,
}

impl WrapBounds {
    pub fn new(width: f32, height: f32, extent: f32) -> WrapBounds {
        WrapBounds {
            width,
            height,
            extent,
        }
    }

    /// Upper bound of every dimension, in order
    pub fn for_dimension(&self, dimension: usize) -> Array1<f32> {
        Array1::from_shape_fn(dimension, |d| self.bound(d))
    }

    pub fn bound(&self, d: usize) -> f32 {
        match d {
            0 => self.width,
            1 => self.height,
            _ => self.extent,
        }
    }

    /// Centre of the box for the given dimension
    pub fn centre(&self, dimension: usize) -> Array1<f32> {
        self.for_dimension(dimension) / 2.
    }

    fn validate(&self, dimension: usize) -> Result<()> {
        let checked = [
            ("width", self.width),
            ("height", self.height),
            ("extent", self.extent),
        ];

        // the extent only matters once there is a third axis
        let used = if dimension > 2 { 3 } else { 2 };

        for (name, value) in checked.into_iter().take(used) {
            if !value.is_finite() || value <= 0. {
                return Err(FlockError::Bounds { name, value });
            }
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "RandomRandom"}
pub enum InitiationStrategy {
    /// on a circle around the centre, heading inwards
    CircleCircumferenceIn,
    /// uniform position in the box, uniform heading
    RandomRandom,
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub save_locations: bool,
    pub save_locations_path: Option<String>,
    pub save_locations_timestamp: bool,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{get_wrap_bounds, RunOptions, WrapBounds};
    use crate::error::FlockError;

    #[rstest]
    #[case(0.)]
    #[case(0.25)]
    #[case(1.)]
    fn accepts_cohesion_factor_in_range(#[case] factor: f32) {
        let options = RunOptions::default().with_cohesion_factor(factor).unwrap();

        assert_eq!(options.cohesion_factor(), factor);
        assert_eq!(options.alignment_factor(), 1. - factor);
        assert!(options.validate(2).is_ok());
    }

    #[rstest]
    #[case(1.5)]
    #[case(-0.1)]
    #[case(f32::NAN)]
    fn rejects_cohesion_factor_out_of_range(#[case] factor: f32) {
        let mut options = RunOptions::default();
        let before = options.cohesion_factor();

        let err = options.set_cohesion_factor(factor).unwrap_err();

        assert!(matches!(err, FlockError::CohesionFactor(_)));
        assert!(err.is_configuration());
        // never silently clamped
        assert_eq!(options.cohesion_factor(), before);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn rejects_low_dimension(#[case] dimension: usize) {
        let err = RunOptions::default().validate(dimension).unwrap_err();

        assert!(matches!(err, FlockError::Dimension(d) if d == dimension));
    }

    #[test]
    fn rejects_negative_speed_and_radius() {
        let mut options = RunOptions::default();
        options.speed = -1.;
        assert!(matches!(options.validate(2), Err(FlockError::Speed(_))));

        let mut options = RunOptions::default();
        options.separation_radius = f32::INFINITY;
        assert!(matches!(
            options.validate(2),
            Err(FlockError::Radius { name: "separation", .. })
        ));
    }

    #[test]
    fn extent_is_only_checked_past_two_dimensions() {
        let mut options = RunOptions::default();
        options.bounds = WrapBounds::new(100., 100., 0.);

        assert!(options.validate(2).is_ok());
        assert!(matches!(
            options.validate(3),
            Err(FlockError::Bounds { name: "extent", .. })
        ));
    }

    #[test]
    fn bounds_per_dimension() {
        let bounds = WrapBounds::new(300., 200., 50.);

        assert_eq!(bounds.for_dimension(4).to_vec(), vec![300_f32, 200., 50., 50.]);
        assert_eq!(bounds.centre(2).to_vec(), vec![150_f32, 100.]);
        assert_eq!(get_wrap_bounds(70., 40.).extent, 40.);
    }
}
