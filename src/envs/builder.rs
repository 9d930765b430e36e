use super::Environment;
use thiserror::Error;

/// Build an environment instance.
pub trait BuildEnv {
    type Environment: Environment;

    /// Build an environment instance.
    ///
    /// # Args
    /// * `seed` - Seed for pseudo-randomness used by the environment,
    ///     such as sampling initial states.
    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError>;
}

/// Error building an environment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildEnvError {
    #[error("grid dimensions must be nonzero (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },
    #[error("{what} square {square} is outside the {num_squares}-square grid")]
    SquareOutOfGrid {
        what: &'static str,
        square: usize,
        num_squares: usize,
    },
    #[error("random walk needs at least 3 states (got {0})")]
    ChainTooShort(usize),
    #[error("tile coding needs at least one tiling and one tile per dimension")]
    EmptyTiling,
}
