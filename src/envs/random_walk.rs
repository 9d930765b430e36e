//! Random walk environment
use super::{BuildEnv, BuildEnvError, Environment};
use crate::error::RLError;
use crate::state::State;
use serde::{Deserialize, Serialize};

/// Configuration for a [`RandomWalk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomWalkConfig {
    pub num_states: usize,
    /// Number of actions. The first moves left, the last moves right, any others stay put.
    pub num_actions: usize,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            num_states: 10,
            num_actions: 2,
        }
    }
}

impl RandomWalkConfig {
    pub const fn new(num_states: usize) -> Self {
        Self {
            num_states,
            num_actions: 2,
        }
    }
}

impl BuildEnv for RandomWalkConfig {
    type Environment = RandomWalk;

    fn build_env(&self, _seed: u64) -> Result<Self::Environment, BuildEnvError> {
        if self.num_states < 3 {
            return Err(BuildEnvError::ChainTooShort(self.num_states));
        }
        Ok(RandomWalk {
            num_states: self.num_states,
            num_actions: self.num_actions.max(2),
            state: None,
        })
    }
}

/// Random Walk Environment
///
/// A chain of `num_states` states starting in the middle.
/// Reaching the left end gives reward -1 and the right end +1, both ending the episode.
/// All other steps give reward 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomWalk {
    num_states: usize,
    num_actions: usize,
    /// Current state; `None` outside of an episode.
    state: Option<usize>,
}

impl RandomWalk {
    pub const fn current_state(&self) -> Option<usize> {
        self.state
    }
}

impl Environment for RandomWalk {
    fn init(&mut self) {
        self.state = None;
    }

    fn start(&mut self) -> State {
        let start = self.num_states / 2;
        self.state = Some(start);
        State::Index(start)
    }

    fn step(&mut self, action: usize) -> Result<(f64, State, bool), RLError> {
        RLError::check_index("action", action, self.num_actions)?;
        let mut state = self.state.ok_or(RLError::NoEpisode)?;
        if action == 0 {
            state -= 1;
        } else if action == self.num_actions - 1 {
            state += 1;
        }

        if state == 0 {
            self.state = None;
            Ok((-1.0, State::Terminal, true))
        } else if state == self.num_states - 1 {
            self.state = None;
            Ok((1.0, State::Terminal, true))
        } else {
            self.state = Some(state);
            Ok((0.0, State::Index(state), false))
        }
    }

    fn num_actions(&self) -> usize {
        self.num_actions
    }

    fn num_states(&self) -> usize {
        self.num_states
    }
}
