//! Reinforcement learning environments
mod builder;
mod gridworld;
mod mountain_car;
mod objects;
mod random_walk;
#[cfg(test)]
pub mod testing;

pub use builder::{BuildEnv, BuildEnvError};
pub use gridworld::{Gridworld, GridworldConfig, Move};
pub use mountain_car::{MountainCar, MountainCarConfig};
pub use objects::{ObjectGridworld, ObjectGridworldConfig, ObjectKind, RewardObject};
pub use random_walk::{RandomWalk, RandomWalkConfig};

use crate::error::RLError;
use crate::state::State;

/// A reinforcement learning environment with internal state.
///
/// Driven by [`RLGlue`](crate::simulation::RLGlue):
/// `init` once per experiment, then `start` at the beginning of each episode followed by
/// `step` until a step reports a terminal transition.
pub trait Environment {
    /// Reset the environment layout to its initial configuration.
    ///
    /// Calling `init` twice in a row has the same effect as calling it once.
    fn init(&mut self);

    /// Begin an episode.
    ///
    /// # Returns
    /// The initial state observation.
    fn start(&mut self) -> State;

    /// Take a step in the environment.
    ///
    /// # Returns
    /// * `reward`: The reward for this transition.
    /// * `state`: An observation of the resulting state.
    /// * `terminal`: Whether this step ends the episode.
    ///
    /// # Errors
    /// [`RLError::OutOfRange`] if `action` is not in `0 .. num_actions()`.
    fn step(&mut self, action: usize) -> Result<(f64, State, bool), RLError>;

    /// Number of actions; valid actions are `0 .. num_actions()`.
    fn num_actions(&self) -> usize;

    /// Number of states (or features) that observations index into.
    fn num_states(&self) -> usize;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn init(&mut self) {
        E::init(self)
    }
    fn start(&mut self) -> State {
        E::start(self)
    }
    fn step(&mut self, action: usize) -> Result<(f64, State, bool), RLError> {
        E::step(self, action)
    }
    fn num_actions(&self) -> usize {
        E::num_actions(self)
    }
    fn num_states(&self) -> usize {
        E::num_states(self)
    }
}
