//! Dyna-Q: one-step Q learning with planning from a learned model.
mod model;
mod planning;

pub use model::{Prediction, Successor, WorldModel};

use super::builder::{check_param, check_space, TdParams};
use super::tabular::TabularCore;
use super::{
    ActionValueTable, ActionValues, ActorMode, Agent, BuildAgent, BuildAgentError, SetActorMode,
};
use crate::error::RLError;
use crate::state::State;
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum random draws per planning step, as a multiple of the number of planning steps.
const PLANNING_TRIES_FACTOR: usize = 10;

/// Configuration of a [`DynaAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynaAgentConfig {
    /// Step size.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Probability of taking a random action.
    pub epsilon: f64,
    /// Value of every table entry after `init`.
    pub initial_value: f64,
    /// Weight of the `sqrt(time since last tried)` bonus added to planned rewards.
    pub exploration_bonus: f64,
    /// Number of simulated updates after each real step.
    pub num_planning_steps: usize,
}

impl Default for DynaAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.05,
            initial_value: 0.1,
            exploration_bonus: 0.0,
            num_planning_steps: 20,
        }
    }
}

impl DynaAgentConfig {
    /// The temporal difference parameters of the direct and planned updates.
    pub const fn td_params(&self) -> TdParams {
        TdParams {
            alpha: self.alpha,
            gamma: self.gamma,
            epsilon: self.epsilon,
            lambda: 0.0,
            initial_value: self.initial_value,
        }
    }
}

impl BuildAgent for DynaAgentConfig {
    type Agent = DynaAgent;

    fn build_agent(
        &self,
        num_states: usize,
        num_actions: usize,
        seed: u64,
    ) -> Result<Self::Agent, BuildAgentError> {
        check_space(num_states, num_actions)?;
        check_param(
            "exploration_bonus",
            self.exploration_bonus,
            self.exploration_bonus >= 0.0 && self.exploration_bonus.is_finite(),
            "[0, inf)",
        )?;
        Ok(DynaAgent {
            params: *self,
            core: TabularCore::new(num_states, num_actions, &self.td_params(), seed)?,
            model: WorldModel::new(num_states, num_actions),
            saved_values: None,
        })
    }
}

/// A one-step Dyna-Q agent for indexed states.
///
/// Each real transition makes a one-step Q learning update, is recorded in the
/// [`WorldModel`], and is followed by `num_planning_steps` simulated updates on random
/// state-action pairs drawn from the model. Pairs the model does not know or predicts to
/// stay in place are skipped. Each planning step makes at most
/// `10 * num_planning_steps` draws.
///
/// The next action is chosen after planning.
/// With zero planning steps the agent behaves exactly like [`OneStepQAgent`](super::OneStepQAgent).
#[derive(Debug, Clone, PartialEq)]
pub struct DynaAgent {
    pub params: DynaAgentConfig,
    core: TabularCore,
    model: WorldModel,
    saved_values: Option<Array2<f64>>,
}

impl DynaAgent {
    pub const fn table(&self) -> &ActionValueTable {
        &self.core.table
    }

    pub const fn model(&self) -> &WorldModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut WorldModel {
        &mut self.model
    }

    fn square(state: &State) -> Result<usize, RLError> {
        state.index().ok_or(RLError::NotSupported {
            operation: "learning from non-indexed states",
            agent: "DynaAgent",
        })
    }

    /// One-step Q update of `(state, action)` towards `reward + gamma * V(successor)`.
    fn q_learn(&mut self, state: usize, action: usize, successor: Successor, reward: f64) {
        let next_value = match successor {
            Successor::Continue(next) => self.core.table.state_value(&State::Index(next)),
            Successor::Terminate => 0.0,
        };
        let td_params = self.params.td_params();
        self.core
            .update(&State::Index(state), action, reward, next_value, &td_params);
    }

    /// Reward of a planned transition including the exploration bonus.
    fn explore_reward(&self, state: usize, action: usize, reward: f64) -> Result<f64, RLError> {
        if self.params.exploration_bonus == 0.0 {
            return Ok(reward);
        }
        #[allow(clippy::cast_precision_loss)]
        let elapsed = self.model.elapsed(state, action)? as f64;
        Ok(reward + self.params.exploration_bonus * elapsed.sqrt())
    }

    /// Make `num_planning_steps` simulated updates from the model.
    fn plan(&mut self) -> Result<(), RLError> {
        let num_steps = self.params.num_planning_steps;
        let num_states = self.model.num_states();
        let num_actions = self.model.num_actions();
        for _ in 0..num_steps {
            for _ in 0..PLANNING_TRIES_FACTOR * num_steps {
                let state = self.core.rng.gen_range(0..num_states);
                let action = self.core.rng.gen_range(0..num_actions);
                match self.model.predict(state, action)? {
                    Some(Prediction { successor, reward })
                        if successor != Successor::Continue(state) =>
                    {
                        let reward = self.explore_reward(state, action, reward)?;
                        self.q_learn(state, action, successor, reward);
                        break;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Learn from a real transition: direct update, model update, then planning.
    fn learn(
        &mut self,
        state: usize,
        action: usize,
        successor: Successor,
        reward: f64,
    ) -> Result<(), RLError> {
        self.q_learn(state, action, successor, reward);
        self.model.learn(state, action, successor, reward)?;
        self.plan()
    }
}

impl Agent for DynaAgent {
    fn init(&mut self) {
        self.core.init(self.params.initial_value);
        self.core.table.mark_all_changed();
        self.model.reset();
    }

    fn start(&mut self, state: &State) -> Result<usize, RLError> {
        self.core.table.check_state(state)?;
        Self::square(state)?;
        Ok(self.core.act(state, self.params.epsilon))
    }

    fn step(&mut self, reward: f64, state: &State) -> Result<usize, RLError> {
        self.core.table.check_state(state)?;
        let successor = Successor::from_state(state)?;
        let (prev_state, prev_action) = self.core.take_last()?;
        if self.core.is_training() {
            self.learn(Self::square(&prev_state)?, prev_action, successor, reward)?;
        }
        Ok(self.core.act(state, self.params.epsilon))
    }

    fn end(&mut self, reward: f64) -> Result<(), RLError> {
        let (prev_state, prev_action) = self.core.take_last()?;
        if self.core.is_training() {
            self.learn(
                Self::square(&prev_state)?,
                prev_action,
                Successor::Terminate,
                reward,
            )?;
        }
        Ok(())
    }

    fn world_model(&self) -> Result<&WorldModel, RLError> {
        Ok(&self.model)
    }

    fn world_model_mut(&mut self) -> Result<&mut WorldModel, RLError> {
        Ok(&mut self.model)
    }
}

impl ActionValues for DynaAgent {
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

impl SetActorMode for DynaAgent {
    fn set_actor_mode(&mut self, mode: ActorMode) {
        self.core.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{testing, OneStepQAgent};
    use super::*;
    use rstest::{fixture, rstest};
    use smallvec::smallvec;

    fn config(num_planning_steps: usize) -> DynaAgentConfig {
        DynaAgentConfig {
            epsilon: 0.2,
            num_planning_steps,
            ..DynaAgentConfig::default()
        }
    }

    fn build(config: DynaAgentConfig) -> DynaAgent {
        let mut agent = config.build_agent(4, 2, 0).unwrap();
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
        let config = DynaAgentConfig {
            epsilon: 0.1,
            num_planning_steps: 5,
            ..DynaAgentConfig::default()
        };
        testing::learns_chain(config.build_agent(5, 2, 0).unwrap(), 100);
    }

    #[rstest]
    fn no_planning_matches_one_step(trajectory: Vec<(f64, State)>) {
        let config = config(0);
        let mut dyna = config.build_agent(4, 2, 7).unwrap();
        let mut one_step = OneStepQAgent::new(4, 2, config.td_params(), 7).unwrap();
        dyna.init();
        one_step.init();
        let detour = vec![
            (0.0, State::Index(3)),
            (-1.0, State::Index(3)),
            (0.0, State::Index(2)),
            (1.0, State::Terminal),
        ];
        for i in 0..30 {
            let steps = if i % 2 == 0 { &trajectory } else { &detour };
            let a = testing::replay(&mut dyna, &State::Index(0), steps);
            let b = testing::replay(&mut one_step, &State::Index(0), steps);
            assert_eq!(a, b);
            assert_eq!(dyna.table().values(), one_step.table().values());
        }
    }

    #[rstest]
    fn planning_propagates_reward(trajectory: Vec<(f64, State)>) {
        let config = DynaAgentConfig {
            initial_value: 0.0,
            ..config(50)
        };
        let mut planner = build(config);
        let mut direct = build(DynaAgentConfig {
            num_planning_steps: 0,
            ..config
        });
        let a = testing::replay(&mut planner, &State::Index(0), &trajectory);
        let b = testing::replay(&mut direct, &State::Index(0), &trajectory);
        assert_eq!(direct.table().values()[(0, b[0])], 0.0);
        assert!(planner.table().values()[(0, a[0])] > 0.0);
    }

    #[rstest]
    fn model_records_transitions(trajectory: Vec<(f64, State)>) {
        let mut agent = build(config(5));
        let actions = testing::replay(&mut agent, &State::Index(0), &trajectory);
        let model = agent.world_model().unwrap();
        assert_eq!(
            model.predict(0, actions[0]).unwrap(),
            Some(Prediction::new(Successor::Continue(1), 0.0))
        );
        assert_eq!(
            model.predict(2, actions[2]).unwrap(),
            Some(Prediction::new(Successor::Terminate, 1.0))
        );
        assert_eq!(model.time(), 3);
    }

    #[test]
    fn init_marks_all_changed() {
        let mut agent = build(config(5));
        assert_eq!(agent.take_changed_states(), (0..4).collect::<BTreeSet<_>>());
        assert!(agent.take_changed_states().is_empty());
    }

    #[rstest]
    fn init_resets_model(trajectory: Vec<(f64, State)>) {
        let mut agent = build(config(5));
        testing::replay(&mut agent, &State::Index(0), &trajectory);
        agent.init();
        assert_eq!(agent.model().time(), 0);
        assert!(agent.table().values().iter().all(|&v| v == 0.1));
    }

    #[test]
    fn feature_states_not_supported() {
        let mut agent = build(config(5));
        assert!(matches!(
            agent.start(&State::Features(smallvec![0, 1])),
            Err(RLError::NotSupported { .. })
        ));
        agent.start(&State::Index(0)).unwrap();
        assert!(matches!(
            agent.step(0.0, &State::Features(smallvec![0, 1])),
            Err(RLError::NotSupported { .. })
        ));
    }

    #[test]
    fn other_agents_have_no_model() {
        let agent = OneStepQAgent::new(4, 2, TdParams::default(), 0).unwrap();
        assert!(matches!(
            agent.world_model(),
            Err(RLError::NotSupported { .. })
        ));
    }

    #[test]
    fn exploration_bonus_raises_stale_values() {
        let config = DynaAgentConfig {
            initial_value: 0.0,
            exploration_bonus: 0.1,
            ..config(10)
        };
        let mut agent = build(config);
        // A known transition that is then left untried for many steps
        agent.model_mut().learn(0, 0, Successor::Continue(1), 0.0).unwrap();
        for _ in 0..50 {
            agent.model_mut().learn(3, 1, Successor::Continue(3), 0.0).unwrap();
        }
        agent.start(&State::Index(3)).unwrap();
        agent.step(0.0, &State::Index(3)).unwrap();
        assert!(agent.table().values()[(0, 0)] > 0.0);
    }

    #[test]
    fn release_mode_does_not_plan() {
        let mut agent = build(config(10));
        agent.take_changed_states();
        agent.set_actor_mode(ActorMode::Release);
        agent.start(&State::Index(0)).unwrap();
        agent.step(0.0, &State::Index(1)).unwrap();
        agent.end(1.0).unwrap();
        assert_eq!(agent.model().time(), 0);
        assert!(agent.take_changed_states().is_empty());
    }

    #[test]
    fn invalid_bonus() {
        let config = DynaAgentConfig {
            exploration_bonus: -1.0,
            ..DynaAgentConfig::default()
        };
        assert!(config.build_agent(4, 2, 0).is_err());
    }

    #[test]
    fn partial_json_config() {
        let config: DynaAgentConfig =
            serde_json::from_str(r#"{"num_planning_steps": 5}"#).unwrap();
        assert_eq!(config.num_planning_steps, 5);
        assert_eq!(config.initial_value, 0.1);
    }
}
