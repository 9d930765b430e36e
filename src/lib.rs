//! Reinforcement learning toolkit: agent-environment glue, tabular and tile-coded
//! temporal-difference agents, and classic control environments.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::for_kv_map)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)]
pub mod agents;
pub mod envs;
mod error;
pub mod features;
pub mod logging;
pub mod simulation;
mod state;

pub use agents::{
    ActionValues, ActorMode, Agent, AgentDef, BuildAgent, LearningAgent, SetActorMode,
};
pub use envs::{BuildEnv, Environment};
pub use error::RLError;
pub use simulation::RLGlue;
pub use state::{State, Tiles};

/// Pseudo-random number generator used by agents and environments.
pub type Prng = rand_chacha::ChaCha8Rng;
