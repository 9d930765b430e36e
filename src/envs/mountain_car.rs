//! Mountain car environment
use super::{BuildEnv, BuildEnvError, Environment};
use crate::error::RLError;
use crate::features::TileCoder;
use crate::state::{State, Tiles};
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Minimum car position (the left wall).
pub const MIN_POSITION: f64 = -1.2;
/// Goal position. Reaching it ends the episode.
pub const MAX_POSITION: f64 = 0.5;
/// Maximum absolute velocity.
pub const MAX_VELOCITY: f64 = 0.07;

/// Acceleration effect of each action.
const ACTION_EFFECTS: [f64; 3] = [-1.0, 0.0, 1.0];

/// Configuration for [`MountainCar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainCarConfig {
    /// Number of offset tilings over (velocity, position).
    pub num_tilings: usize,
    /// Tiles per tiling along the (velocity, position) dimensions.
    pub num_tiles: [usize; 2],
}

impl Default for MountainCarConfig {
    fn default() -> Self {
        Self {
            num_tilings: 32,
            num_tiles: [2, 2],
        }
    }
}

impl BuildEnv for MountainCarConfig {
    type Environment = MountainCar;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError> {
        if self.num_tilings == 0 || self.num_tiles.contains(&0) {
            return Err(BuildEnvError::EmptyTiling);
        }
        Ok(MountainCar {
            tile_coder: TileCoder::new(
                self.num_tilings,
                &[-MAX_VELOCITY, MIN_POSITION],
                &[MAX_VELOCITY, MAX_POSITION],
                &self.num_tiles,
            ),
            velocity: 0.0,
            position: -0.5,
            rng: Prng::seed_from_u64(seed),
        })
    }
}

/// Mountain Car Environment
///
/// An underpowered car in a valley must rock back and forth to build enough momentum to
/// reach the goal at the top of the right hill.
///
/// * Actions: 0 = full throttle reverse, 1 = zero throttle, 2 = full throttle forward.
/// * Reward: -1 on every step.
/// * Observations: the active tiles of a tile coding of (velocity, position).
///
/// As described in "Reinforcement Learning: An Introduction" by Sutton and Barto (2018),
/// Example 10.1.
#[derive(Debug, Clone, PartialEq)]
pub struct MountainCar {
    tile_coder: TileCoder,
    velocity: f64,
    position: f64,
    rng: Prng,
}

impl MountainCar {
    pub const fn position(&self) -> f64 {
        self.position
    }

    pub const fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Place the car at an arbitrary point, clamped to the valid bounds.
    pub fn set_state(&mut self, velocity: f64, position: f64) {
        self.velocity = velocity.clamp(-MAX_VELOCITY, MAX_VELOCITY);
        self.position = position.clamp(MIN_POSITION, MAX_POSITION);
    }

    pub const fn tile_coder(&self) -> &TileCoder {
        &self.tile_coder
    }

    /// Tile coding of an arbitrary (velocity, position) point.
    pub fn features(&mut self, velocity: f64, position: f64) -> Tiles {
        self.tile_coder.tiles(&[velocity, position])
    }

    fn observe(&mut self) -> State {
        State::Features(self.features(self.velocity, self.position))
    }

    /// Physical update for one step, returning whether the goal was reached.
    fn update(&mut self, action_effect: f64) -> bool {
        self.velocity += 0.001 * action_effect - 0.0025 * (3.0 * self.position).cos();
        self.velocity = self.velocity.clamp(-MAX_VELOCITY, MAX_VELOCITY);
        self.position += self.velocity;
        self.position = self.position.clamp(MIN_POSITION, MAX_POSITION);
        if self.position <= MIN_POSITION {
            self.velocity = 0.0;
        }
        self.position >= MAX_POSITION
    }
}

impl Environment for MountainCar {
    fn init(&mut self) {
        self.tile_coder.reset();
    }

    fn start(&mut self) -> State {
        self.velocity = 0.0;
        self.position = Uniform::new(-0.6, -0.4).sample(&mut self.rng);
        self.observe()
    }

    fn step(&mut self, action: usize) -> Result<(f64, State, bool), RLError> {
        let effect = *ACTION_EFFECTS.get(action).ok_or(RLError::OutOfRange {
            what: "action",
            index: action,
            bound: ACTION_EFFECTS.len(),
        })?;
        let terminal = self.update(effect);
        Ok((-1.0, self.observe(), terminal))
    }

    fn num_actions(&self) -> usize {
        ACTION_EFFECTS.len()
    }

    fn num_states(&self) -> usize {
        self.tile_coder.size()
    }
}
