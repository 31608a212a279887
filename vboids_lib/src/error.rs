use thiserror::Error;

/// Everything that can go wrong in the library.
///
/// Only configuration, malformed caller input and trajectory export can fail.
/// Once a [`crate::flock::Flock`] exists, stepping it never does.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error("cohesion factor must be in [0, 1] but got {0}")]
    CohesionFactor(f32),

    #[error("dimension must be at least 2 but got {0}")]
    Dimension(usize),

    #[error("speed must be finite and non-negative but got {0}")]
    Speed(f32),

    #[error("{name} radius must be finite and non-negative but got {value}")]
    Radius { name: &'static str, value: f32 },

    #[error("wrap bound {name} must be finite and positive but got {value}")]
    Bounds { name: &'static str, value: f32 },

    #[error("expected shape {expected:?} but got {found:?}")]
    Shape {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("weights must be finite and non-negative, offending value {0}")]
    Weights(f32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl FlockError {
    /// true for the kinds raised while validating [`crate::options::RunOptions`]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FlockError::CohesionFactor(_)
                | FlockError::Dimension(_)
                | FlockError::Speed(_)
                | FlockError::Radius { .. }
                | FlockError::Bounds { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FlockError>;
