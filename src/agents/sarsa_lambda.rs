//! Sarsa(λ) agent
use super::builder::TdParams;
use super::tabular::TabularCore;
use super::{ActionValueTable, ActionValues, ActorMode, Agent, BuildAgentError, SetActorMode};
use crate::error::RLError;
use crate::state::State;
use ndarray::{Array1, Array2};
use std::collections::BTreeSet;

/// An epsilon-greedy Sarsa(λ) agent with accumulating eligibility traces.
///
/// On each transition:
/// ```text
/// z <- gamma * lambda * z
/// z[s,a] += 1
/// Q += alpha * (r + gamma * Q[s',a'] - Q[s,a]) * z
/// ```
/// Traces persist across episodes and are only cleared by `init`.
#[derive(Debug, Clone, PartialEq)]
pub struct SarsaLambdaAgent {
    pub params: TdParams,
    core: TabularCore,
    traces: Array2<f64>,
}

impl SarsaLambdaAgent {
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

    fn learn(&mut self, state: &State, action: usize, reward: f64, next_value: f64) {
        self.traces *= self.params.gamma * self.params.lambda;
        for &row in state.rows() {
            self.traces[(row, action)] += 1.0;
        }
        let delta =
            reward + self.params.gamma * next_value - self.core.table.value(state, action);
        self.core
            .table
            .add_traces(self.params.alpha * delta, &self.traces);
    }
}

impl Agent for SarsaLambdaAgent {
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
        let action = self.core.act(state, self.params.epsilon);
        if self.core.is_training() {
            let next_value = self.core.table.value(state, action);
            self.learn(&prev_state, prev_action, reward, next_value);
        }
        Ok(action)
    }

    fn end(&mut self, reward: f64) -> Result<(), RLError> {
        let (prev_state, prev_action) = self.core.take_last()?;
        if self.core.is_training() {
            self.learn(&prev_state, prev_action, reward, 0.0);
        }
        Ok(())
    }
}

impl ActionValues for SarsaLambdaAgent {
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

impl SetActorMode for SarsaLambdaAgent {
    fn set_actor_mode(&mut self, mode: ActorMode) {
        self.core.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{testing, SarsaAgent};
    use super::*;
    use rstest::{fixture, rstest};

    fn params(epsilon: f64, lambda: f64) -> TdParams {
        TdParams {
            alpha: 0.5,
            gamma: 0.9,
            epsilon,
            lambda,
            initial_value: 0.0,
        }
    }

    #[fixture]
    fn agent() -> SarsaLambdaAgent {
        let mut agent = SarsaLambdaAgent::new(4, 2, params(0.0, 0.8), 0).unwrap();
        agent.init();
        agent
    }

    #[fixture]
    fn trajectory() -> Vec<(f64, State)> {
        vec![
            (0.0, State::Index(1)),
            (0.0, State::Index(2)),
            (1.0, State::Terminal),
        ]
    }

    #[test]
    fn learns_chain() {
        let params = TdParams {
            alpha: 0.1,
            ..params(0.1, 0.8)
        };
        let agent = SarsaLambdaAgent::new(5, 2, params, 0).unwrap();
        testing::learns_chain(agent, 300);
    }

    #[rstest]
    fn traces_propagate_reward(agent: SarsaLambdaAgent, trajectory: Vec<(f64, State)>) {
        let mut agent = agent;
        let actions = testing::replay(&mut agent, &State::Index(0), &trajectory);
        let q = agent.table().values();
        assert!((q[(2, actions[2])] - 0.5).abs() < 1e-12);
        assert!((q[(1, actions[1])] - 0.5 * 0.72).abs() < 1e-12);
        assert!((q[(0, actions[0])] - 0.5 * 0.72 * 0.72).abs() < 1e-12);
        assert_eq!(agent.take_changed_states(), BTreeSet::from([0, 1, 2]));
    }

    #[rstest]
    fn init_resets_traces(agent: SarsaLambdaAgent, trajectory: Vec<(f64, State)>) {
        let mut agent = agent;
        testing::replay(&mut agent, &State::Index(0), &trajectory);
        assert!(agent.traces().iter().any(|&z| z != 0.0));
        agent.init();
        assert!(agent.traces().iter().all(|&z| z == 0.0));
        assert!(agent.table().values().iter().all(|&v| v == 0.0));
    }

    #[rstest]
    fn traces_carry_across_episodes(agent: SarsaLambdaAgent, trajectory: Vec<(f64, State)>) {
        let mut agent = agent;
        let actions = testing::replay(&mut agent, &State::Index(0), &trajectory);
        agent.start(&State::Index(3)).unwrap();
        assert!(agent.traces()[(2, actions[2])] > 0.0);
    }

    #[rstest]
    fn zero_lambda_matches_sarsa(trajectory: Vec<(f64, State)>) {
        let mut lambda_agent = SarsaLambdaAgent::new(4, 2, params(0.3, 0.0), 5).unwrap();
        let mut sarsa_agent = SarsaAgent::new(4, 2, params(0.3, 0.0), 5).unwrap();
        lambda_agent.init();
        sarsa_agent.init();
        for _ in 0..20 {
            let a = testing::replay(&mut lambda_agent, &State::Index(0), &trajectory);
            let b = testing::replay(&mut sarsa_agent, &State::Index(0), &trajectory);
            assert_eq!(a, b);
        }
        assert_eq!(lambda_agent.table(), sarsa_agent.table());
    }

    #[rstest]
    fn release_mode_does_not_learn(agent: SarsaLambdaAgent, trajectory: Vec<(f64, State)>) {
        let mut agent = agent;
        agent.set_actor_mode(ActorMode::Release);
        testing::replay(&mut agent, &State::Index(0), &trajectory);
        assert!(agent.traces().iter().all(|&z| z == 0.0));
        assert!(agent.table().values().iter().all(|&v| v == 0.0));
    }
}
