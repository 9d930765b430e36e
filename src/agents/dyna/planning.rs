//! Model-based sweeps over the whole value table.
use super::{DynaAgent, Prediction, Successor};
use crate::agents::CHANGE_THRESHOLD;
use crate::error::RLError;
use crate::state::State;
use log::debug;
use ndarray::Array1;

impl DynaAgent {
    /// Save a copy of the action values for [`DynaAgent::restore_q`].
    pub fn save_q(&mut self) {
        self.saved_values = Some(self.core.table.values().clone());
    }

    /// Restore the action values saved by [`DynaAgent::save_q`].
    ///
    /// Returns whether a saved copy existed. Every state counts as changed.
    pub fn restore_q(&mut self) -> Result<bool, RLError> {
        match &self.saved_values {
            Some(values) => {
                self.core.table.set_values(values.clone())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Repeat in-place one-step Q updates of every known state-action pair in the model
    /// until no value changes by more than [`CHANGE_THRESHOLD`] in a sweep.
    ///
    /// Stops after `max_sweeps` sweeps and returns the number of sweeps made.
    pub fn asynchronous_value_iteration(&mut self, max_sweeps: usize) -> Result<usize, RLError> {
        let num_states = self.model.num_states();
        let num_actions = self.model.num_actions();
        for sweep in 1..=max_sweeps {
            let mut max_change: f64 = 0.0;
            for state in 0..num_states {
                for action in 0..num_actions {
                    if let Some(Prediction { successor, reward }) =
                        self.model.predict(state, action)?
                    {
                        let before = self.core.table.values()[(state, action)];
                        self.q_learn(state, action, successor, reward);
                        let after = self.core.table.values()[(state, action)];
                        max_change = max_change.max((after - before).abs());
                    }
                }
            }
            if max_change <= CHANGE_THRESHOLD {
                debug!("value iteration converged after {} sweeps", sweep);
                return Ok(sweep);
            }
        }
        Ok(max_sweeps)
    }

    /// One synchronous sweep of full backups `Q[s,a] = r + gamma * V(s')` through the model,
    /// where `V` is taken from the values before the sweep. Unknown pairs are left unchanged.
    pub fn value_iteration_sweep(&mut self) -> Result<(), RLError> {
        let num_states = self.model.num_states();
        let num_actions = self.model.num_actions();
        let state_values: Array1<f64> = (0..num_states)
            .map(|state| self.core.table.state_value(&State::Index(state)))
            .collect();
        for state in 0..num_states {
            for action in 0..num_actions {
                if let Some(Prediction { successor, reward }) = self.model.predict(state, action)? {
                    let next_value = match successor {
                        Successor::Continue(next) => state_values[next],
                        Successor::Terminate => 0.0,
                    };
                    let target = reward + self.params.gamma * next_value;
                    let delta = target - self.core.table.values()[(state, action)];
                    self.core.table.add(&State::Index(state), action, delta);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::DynaAgentConfig;
    use super::*;
    use crate::agents::{ActionValues, Agent, BuildAgent};
    use crate::envs::{Gridworld, GridworldConfig, Move};
    use rstest::{fixture, rstest};

    /// Agent with an accurate model of a 4x1 corridor with the goal on the right.
    #[fixture]
    fn agent() -> DynaAgent {
        let grid = Gridworld::new(GridworldConfig::new(4, 1, 0, 3)).unwrap();
        let config = DynaAgentConfig {
            initial_value: 0.0,
            ..DynaAgentConfig::default()
        };
        let mut agent = config.build_agent(4, 4, 0).unwrap();
        agent.init();
        agent.model_mut().setup_accurate_model(&grid).unwrap();
        agent.take_changed_states();
        agent
    }

    #[rstest]
    fn value_iteration_converges(agent: DynaAgent) {
        let mut agent = agent;
        let sweeps = agent.asynchronous_value_iteration(1000).unwrap();
        assert!(sweeps < 1000);
        let right = Move::Right.action();
        let q = agent.table().values();
        assert!((q[(2, right)] - 1.0).abs() < 1e-3);
        assert!((q[(1, right)] - 0.9).abs() < 1e-3);
        assert!((q[(0, right)] - 0.81).abs() < 1e-3);
        assert!(agent.take_changed_states().contains(&0));
    }

    #[rstest]
    fn value_iteration_sweep_backs_up_one_step(agent: DynaAgent) {
        let mut agent = agent;
        let right = Move::Right.action();
        agent.value_iteration_sweep().unwrap();
        assert_eq!(agent.table().values()[(2, right)], 1.0);
        assert_eq!(agent.table().values()[(1, right)], 0.0);
        agent.value_iteration_sweep().unwrap();
        assert!((agent.table().values()[(1, right)] - 0.9).abs() < 1e-12);
        assert_eq!(agent.table().values()[(0, right)], 0.0);
    }

    #[rstest]
    fn save_and_restore_q(agent: DynaAgent) {
        let mut agent = agent;
        assert!(!agent.restore_q().unwrap());
        agent.save_q();
        agent.value_iteration_sweep().unwrap();
        assert!(agent.state_value(&State::Index(2)).unwrap() > 0.0);
        assert!(agent.restore_q().unwrap());
        assert_eq!(agent.state_value(&State::Index(2)).unwrap(), 0.0);
    }

    #[rstest]
    fn null_model_sweep_changes_nothing(agent: DynaAgent) {
        let mut agent = agent;
        agent.model_mut().setup_null_model();
        assert_eq!(agent.asynchronous_value_iteration(10).unwrap(), 1);
        assert!(agent.table().values().iter().all(|&v| v == 0.0));
    }
}
