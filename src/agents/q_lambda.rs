//! Watkins' Q(λ) agent
use super::builder::TdParams;
use super::tabular::TabularCore;
use super::{ActionValueTable, ActionValues, ActorMode, Agent, BuildAgentError, SetActorMode};
use crate::error::RLError;
use crate::state::State;
use ndarray::{Array1, Array2};
use std::collections::BTreeSet;

/// An epsilon-greedy Watkins' Q(λ) agent.
///
/// On each transition:
/// ```text
/// z <- gamma * lambda * z    if Q[s,a] == max_b Q[s,b]
/// z <- 0                     otherwise
/// z[s,a] += 1
/// Q += alpha * (r + gamma * max_a' Q[s',a'] - Q[s,a]) * z
/// ```
/// The greedy test compares values, so any action tied with the maximum keeps the traces.
/// The next action is chosen after the update.
#[derive(Debug, Clone, PartialEq)]
pub struct QLambdaAgent {
    pub params: TdParams,
    core: TabularCore,
    traces: Array2<f64>,
}

impl QLambdaAgent {
    pub fn new(
        num_states: usize,
        num_actions: usize,
        params: TdParams,
        seed: u64,
    ) -> Result<Self, BuildAgentError> {
        Ok(Self {
            core: TabularCore::new(num_states, num_actions, &params, seed)?,
            traces: Array2::zeros((num_states, num_actions)),
            params,
        })
    }

    pub const fn table(&self) -> &ActionValueTable {
        &self.core.table
    }

    /// Eligibility traces, shaped like the value table.
    pub const fn traces(&self) -> &Array2<f64> {
        &self.traces
    }

    #[allow(clippy::float_cmp)]
    fn learn(&mut self, state: &State, action: usize, reward: f64, next_value: f64) {
        let value = self.core.table.value(state, action);
        if value == self.core.table.state_value(state) {
            self.traces *= self.params.gamma * self.params.lambda;
        } else {
            self.traces.fill(0.0);
        }
        for &row in state.rows() {
            self.traces[(row, action)] += 1.0;
        }
        let target = reward + self.params.gamma * next_value;
        let delta = target - value;
        self.core
            .table
            .add_traces(self.params.alpha * delta, &self.traces);
    }
}

impl Agent for QLambdaAgent {
    fn init(&mut self) {
        self.core.init(self.params.initial_value);
        self.traces.fill(0.0);
    }

    fn start(&mut self, state: &State) -> Result<usize, RLError> {
        self.core.table.check_state(state)?;
        Ok(self.core.act(state, self.params.epsilon))
    }

    fn step(&mut self, reward: f64, state: &State) -> Result<usize, RLError> {
        self.core.table.check_state(state)?;
        let (prev_state, prev_action) = self.core.take_last()?;
        if self.core.is_training() {
            let next_value = self.core.table.state_value(state);
            self.learn(&prev_state, prev_action, reward, next_value);
        }
        Ok(self.core.act(state, self.params.epsilon))
    }

    fn end(&mut self, reward: f64) -> Result<(), RLError> {
        let (prev_state, prev_action) = self.core.take_last()?;
        if self.core.is_training() {
            self.learn(&prev_state, prev_action, reward, 0.0);
        }
        Ok(())
    }
}

impl ActionValues for QLambdaAgent {
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

impl SetActorMode for QLambdaAgent {
    fn set_actor_mode(&mut self, mode: ActorMode) {
        self.core.mode = mode;
    }
}
