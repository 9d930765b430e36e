//! Reinforcement learning agents
mod builder;
pub mod dyna;
mod error;
pub mod policy;
mod q_lambda;
mod sarsa;
mod sarsa_lambda;
mod table;
mod tabular;
#[cfg(test)]
pub mod testing;

pub use builder::{AgentDef, BuildAgent, TdParams};
pub use dyna::{DynaAgent, DynaAgentConfig, Prediction, Successor, WorldModel};
pub use error::BuildAgentError;
pub use q_lambda::QLambdaAgent;
pub use sarsa::SarsaAgent;
pub use sarsa_lambda::SarsaLambdaAgent;
pub use table::{ActionValueTable, CHANGE_THRESHOLD};
pub use tabular::OneStepQAgent;

use crate::error::RLError;
use crate::state::State;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::any;
use std::collections::BTreeSet;

/// A learning agent driven one step at a time.
///
/// `start` begins an episode, `step` continues it, and `end` finishes it on a terminal
/// transition. Each returns an error if a state or stored action is out of range or if
/// called without an episode in progress.
pub trait Agent {
    /// Reset all learned state to the configured initial values.
    fn init(&mut self);

    /// Begin an episode in `state` and choose the first action.
    fn start(&mut self, state: &State) -> Result<usize, RLError>;

    /// Observe the result of the last action and choose the next one.
    fn step(&mut self, reward: f64, state: &State) -> Result<usize, RLError>;

    /// Observe the final reward of an episode that reached a terminal state.
    fn end(&mut self, reward: f64) -> Result<(), RLError>;

    /// The agent's learned model of the environment.
    fn world_model(&self) -> Result<&WorldModel, RLError> {
        Err(RLError::NotSupported {
            operation: "world model",
            agent: any::type_name::<Self>(),
        })
    }

    /// Mutable access to the agent's learned model of the environment.
    fn world_model_mut(&mut self) -> Result<&mut WorldModel, RLError> {
        Err(RLError::NotSupported {
            operation: "world model",
            agent: any::type_name::<Self>(),
        })
    }
}

impl<T: Agent + ?Sized> Agent for Box<T> {
    fn init(&mut self) {
        T::init(self)
    }
    fn start(&mut self, state: &State) -> Result<usize, RLError> {
        T::start(self, state)
    }
    fn step(&mut self, reward: f64, state: &State) -> Result<usize, RLError> {
        T::step(self, reward, state)
    }
    fn end(&mut self, reward: f64) -> Result<(), RLError> {
        T::end(self, reward)
    }
    fn world_model(&self) -> Result<&WorldModel, RLError> {
        T::world_model(self)
    }
    fn world_model_mut(&mut self) -> Result<&mut WorldModel, RLError> {
        T::world_model_mut(self)
    }
}

/// Read access to an agent's learned action values.
pub trait ActionValues {
    /// Learned value of each action in `state`.
    fn action_values(&self, state: &State) -> Result<Array1<f64>, RLError>;

    /// Greedy value of `state`; zero for the terminal state.
    fn state_value(&self, state: &State) -> Result<f64, RLError>;

    /// States whose values changed since the last call.
    fn take_changed_states(&mut self) -> BTreeSet<usize>;
}

impl<T: ActionValues + ?Sized> ActionValues for Box<T> {
    fn action_values(&self, state: &State) -> Result<Array1<f64>, RLError> {
        T::action_values(self, state)
    }
    fn state_value(&self, state: &State) -> Result<f64, RLError> {
        T::state_value(self, state)
    }
    fn take_changed_states(&mut self) -> BTreeSet<usize> {
        T::take_changed_states(self)
    }
}

/// Agent actor mode
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorMode {
    /// Explore and learn from every step.
    Training,
    /// Act greedily without learning.
    Release,
}

impl Default for ActorMode {
    fn default() -> Self {
        Self::Training
    }
}

/// Switch an agent between training and release behaviour.
pub trait SetActorMode {
    fn set_actor_mode(&mut self, mode: ActorMode);
}

impl<T: SetActorMode + ?Sized> SetActorMode for Box<T> {
    fn set_actor_mode(&mut self, mode: ActorMode) {
        T::set_actor_mode(self, mode)
    }
}

/// A cloneable, object-safe learning agent with readable action values.
pub trait LearningAgent: Agent + ActionValues + SetActorMode {
    fn boxed_clone(&self) -> Box<dyn LearningAgent>;
}

impl<T> LearningAgent for T
where
    T: Agent + ActionValues + SetActorMode + Clone + 'static,
{
    fn boxed_clone(&self) -> Box<dyn LearningAgent> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn LearningAgent> {
    fn clone(&self) -> Self {
        (**self).boxed_clone()
    }
}
