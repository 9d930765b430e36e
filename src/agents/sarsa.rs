//! Sarsa agent
use super::builder::TdParams;
use super::tabular::TabularCore;
use super::{ActionValueTable, ActionValues, ActorMode, Agent, BuildAgentError, SetActorMode};
use crate::error::RLError;
use crate::state::State;
use ndarray::Array1;
use std::collections::BTreeSet;

/// An epsilon-greedy one-step Sarsa agent.
///
/// Chooses the next action first and then updates
/// `Q[s,a] += alpha * (r + gamma * Q[s',a'] - Q[s,a])`.
#[derive(Debug, Clone, PartialEq)]
pub struct SarsaAgent {
    pub params: TdParams,
    core: TabularCore,
}

impl SarsaAgent {
    pub fn new(
        num_states: usize,
        num_actions: usize,
        params: TdParams,
        seed: u64,
    ) -> Result<Self, BuildAgentError> {
        Ok(Self {
            core: TabularCore::new(num_states, num_actions, &params, seed)?,
            params,
        })
    }

    pub const fn table(&self) -> &ActionValueTable {
        &self.core.table
    }
}

impl Agent for SarsaAgent {
    fn init(&mut self) {
        self.core.init(self.params.initial_value);
    }

    fn start(&mut self, state: &State) -> Result<usize, RLError> {
        self.core.table.check_state(state)?;
        Ok(self.core.act(state, self.params.epsilon))
    }

    fn step(&mut self, reward: f64, state: &State) -> Result<usize, RLError> {
        self.core.table.check_state(state)?;
        let (prev_state, prev_action) = self.core.take_last()?;
        let action = self.core.act(state, self.params.epsilon);
        if self.core.is_training() {
            let next_value = self.core.table.value(state, action);
            self.core
                .update(&prev_state, prev_action, reward, next_value, &self.params);
        }
        Ok(action)
    }

    fn end(&mut self, reward: f64) -> Result<(), RLError> {
        let (prev_state, prev_action) = self.core.take_last()?;
        if self.core.is_training() {
            self.core
                .update(&prev_state, prev_action, reward, 0.0, &self.params);
        }
        Ok(())
    }
}

impl ActionValues for SarsaAgent {
    fn action_values(&self, state: &State) -> Result<Array1<f64>, RLError> {
        self.core.action_values(state)
    }

    fn state_value(&self, state: &State) -> Result<f64, RLError> {
        self.core.state_value(state)
    }

    fn take_changed_states(&mut self) -> BTreeSet<usize> {
        self.core.table.take_changed_states()
    }
}

impl SetActorMode for SarsaAgent {
    fn set_actor_mode(&mut self, mode: ActorMode) {
        self.core.mode = mode;
    }
}
