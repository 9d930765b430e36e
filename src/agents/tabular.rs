//! Tabular agents
use super::builder::{check_space, TdParams};
use super::policy::epsilon_greedy;
use super::{ActionValueTable, ActionValues, ActorMode, Agent, BuildAgentError, SetActorMode};
use crate::error::RLError;
use crate::state::State;
use crate::Prng;
use ndarray::Array1;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Value table, policy randomness and episode position shared by the temporal difference agents.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TabularCore {
    pub table: ActionValueTable,
    pub mode: ActorMode,
    pub rng: Prng,
    /// State and chosen action of the previous step; `None` outside of an episode.
    pub last: Option<(State, usize)>,
}

impl TabularCore {
    pub fn new(
        num_states: usize,
        num_actions: usize,
        params: &TdParams,
        seed: u64,
    ) -> Result<Self, BuildAgentError> {
        check_space(num_states, num_actions)?;
        params.validate()?;
        Ok(Self {
            table: ActionValueTable::new(num_states, num_actions, params.initial_value),
            mode: ActorMode::Training,
            rng: Prng::seed_from_u64(seed),
            last: None,
        })
    }

    pub fn init(&mut self, initial_value: f64) {
        self.table.reset(initial_value);
        self.last = None;
    }

    pub fn is_training(&self) -> bool {
        self.mode == ActorMode::Training
    }

    /// Choose an action epsilon-greedily. Greedy in release mode.
    pub fn choose(&mut self, state: &State, epsilon: f64) -> usize {
        let epsilon = match self.mode {
            ActorMode::Training => epsilon,
            ActorMode::Release => 0.0,
        };
        epsilon_greedy(self.table.action_values(state).view(), epsilon, &mut self.rng)
    }

    /// Choose an action and remember it as the action taken in `state`.
    pub fn act(&mut self, state: &State, epsilon: f64) -> usize {
        let action = self.choose(state, epsilon);
        self.last = Some((state.clone(), action));
        action
    }

    pub fn take_last(&mut self) -> Result<(State, usize), RLError> {
        self.last.take().ok_or(RLError::NoEpisode)
    }

    /// One-step temporal difference update towards `reward + gamma * next_value`.
    pub fn update(
        &mut self,
        state: &State,
        action: usize,
        reward: f64,
        next_value: f64,
        params: &TdParams,
    ) {
        let target = reward + params.gamma * next_value;
        let delta = target - self.table.value(state, action);
        self.table.add(state, action, params.alpha * delta);
    }

    pub fn action_values(&self, state: &State) -> Result<Array1<f64>, RLError> {
        self.table.check_state(state)?;
        Ok(self.table.action_values(state))
    }

    pub fn state_value(&self, state: &State) -> Result<f64, RLError> {
        self.table.check_state(state)?;
        Ok(self.table.state_value(state))
    }
}

/// An epsilon-greedy one-step Q learning agent.
///
/// Updates `Q[s,a] += alpha * (r + gamma * max_a' Q[s',a'] - Q[s,a])` after each step
/// and then chooses the next action from the updated values.
/// Works with both indexed and tile-coded states.
#[derive(Debug, Clone, PartialEq)]
pub struct OneStepQAgent {
    pub params: TdParams,
    core: TabularCore,
}

impl OneStepQAgent {
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

impl Agent for OneStepQAgent {
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
        if self.core.is_training() {
            let next_value = self.core.table.state_value(state);
            self.core
                .update(&prev_state, prev_action, reward, next_value, &self.params);
        }
        Ok(self.core.act(state, self.params.epsilon))
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

impl ActionValues for OneStepQAgent {
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

impl SetActorMode for OneStepQAgent {
    fn set_actor_mode(&mut self, mode: ActorMode) {
        self.core.mode = mode;
    }
}
