//! Deterministic tabular world model
use crate::envs::{Environment, Gridworld};
use crate::error::RLError;
use crate::state::State;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Where a transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Successor {
    /// The episode continues in this state.
    Continue(usize),
    /// The episode terminates.
    Terminate,
}

impl Successor {
    /// The successor for an observed next state. Only indexed states are supported.
    pub fn from_state(state: &State) -> Result<Self, RLError> {
        match state {
            State::Index(i) => Ok(Self::Continue(*i)),
            State::Terminal => Ok(Self::Terminate),
            State::Features(_) => Err(RLError::NotSupported {
                operation: "world model of feature states",
                agent: "DynaAgent",
            }),
        }
    }

    pub const fn to_state(self) -> State {
        match self {
            Self::Continue(i) => State::Index(i),
            Self::Terminate => State::Terminal,
        }
    }
}

/// Predicted outcome of taking an action in a state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub successor: Successor,
    pub reward: f64,
}

impl Prediction {
    pub const fn new(successor: Successor, reward: f64) -> Self {
        Self { successor, reward }
    }
}

/// A deterministic model storing the last observed outcome of every state-action pair.
///
/// Starts out as the stay model: every action leaves the state unchanged with reward 0.
/// An entry of `None` means the outcome is unknown.
///
/// The model also keeps a clock that advances on each [`WorldModel::learn`]
/// and the time at which each pair was last tried.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldModel {
    predictions: Array2<Option<Prediction>>,
    saved: Option<Array2<Option<Prediction>>>,
    last_tried: Array2<u64>,
    time: u64,
}

impl WorldModel {
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        Self {
            predictions: stay_model(num_states, num_actions),
            saved: None,
            last_tried: Array2::zeros((num_states, num_actions)),
            time: 0,
        }
    }

    pub fn num_states(&self) -> usize {
        self.predictions.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.predictions.ncols()
    }

    /// Number of transitions learned since the last reset.
    pub const fn time(&self) -> u64 {
        self.time
    }

    /// Return to the stay model, resetting the clock and discarding any saved model.
    pub fn reset(&mut self) {
        self.predictions = stay_model(self.num_states(), self.num_actions());
        self.saved = None;
        self.last_tried.fill(0);
        self.time = 0;
    }

    fn check(&self, state: usize, action: usize) -> Result<(), RLError> {
        RLError::check_index("state", state, self.num_states())?;
        RLError::check_index("action", action, self.num_actions())
    }

    pub fn predict(&self, state: usize, action: usize) -> Result<Option<Prediction>, RLError> {
        self.check(state, action)?;
        Ok(self.predictions[(state, action)])
    }

    /// Overwrite the prediction for a state-action pair without advancing the clock.
    pub fn set_prediction(
        &mut self,
        state: usize,
        action: usize,
        prediction: Option<Prediction>,
    ) -> Result<(), RLError> {
        self.check(state, action)?;
        if let Some(Prediction {
            successor: Successor::Continue(next),
            ..
        }) = prediction
        {
            RLError::check_index("state", next, self.num_states())?;
        }
        self.predictions[(state, action)] = prediction;
        Ok(())
    }

    /// Record an observed transition.
    pub fn learn(
        &mut self,
        state: usize,
        action: usize,
        successor: Successor,
        reward: f64,
    ) -> Result<(), RLError> {
        self.set_prediction(state, action, Some(Prediction::new(successor, reward)))?;
        self.time += 1;
        self.last_tried[(state, action)] = self.time;
        Ok(())
    }

    /// Clock time at which the pair was last learned; 0 if never.
    pub fn last_tried(&self, state: usize, action: usize) -> Result<u64, RLError> {
        self.check(state, action)?;
        Ok(self.last_tried[(state, action)])
    }

    /// Clock ticks since the pair was last learned.
    pub fn elapsed(&self, state: usize, action: usize) -> Result<u64, RLError> {
        Ok(self.time.saturating_sub(self.last_tried(state, action)?))
    }

    /// Save a copy of the predictions for [`WorldModel::restore`].
    pub fn save(&mut self) {
        self.saved = Some(self.predictions.clone());
    }

    /// Restore the last saved predictions. Returns whether a saved copy existed.
    pub fn restore(&mut self) -> bool {
        match &self.saved {
            Some(saved) => {
                self.predictions.assign(saved);
                true
            }
            None => false,
        }
    }

    /// Save the current model and replace it with the stay model.
    pub fn setup_stay_model(&mut self) {
        self.save();
        self.predictions = stay_model(self.num_states(), self.num_actions());
    }

    /// Save the current model and replace it with one that knows nothing.
    pub fn setup_null_model(&mut self) {
        self.save();
        self.predictions.fill(None);
    }

    fn check_grid(&self, grid: &Gridworld) -> Result<(), RLError> {
        if grid.num_squares() != self.num_states() {
            return Err(RLError::OutOfRange {
                what: "gridworld square count",
                index: grid.num_squares(),
                bound: self.num_states(),
            });
        }
        if grid.num_actions() != self.num_actions() {
            return Err(RLError::OutOfRange {
                what: "gridworld action count",
                index: grid.num_actions(),
                bound: self.num_actions(),
            });
        }
        Ok(())
    }

    /// Save the current model and replace it with an open grid:
    /// every move reaches the neighboring square with reward 0.
    pub fn setup_empty_grid_model(&mut self, grid: &Gridworld) -> Result<(), RLError> {
        self.check_grid(grid)?;
        self.save();
        for ((state, action), prediction) in self.predictions.indexed_iter_mut() {
            let next = grid.neighboring_square(state, action)?;
            *prediction = Some(Prediction::new(Successor::Continue(next), 0.0));
        }
        Ok(())
    }

    /// Save the current model and replace it with the true gridworld dynamics.
    pub fn setup_accurate_model(&mut self, grid: &Gridworld) -> Result<(), RLError> {
        self.check_grid(grid)?;
        self.save();
        for ((state, action), prediction) in self.predictions.indexed_iter_mut() {
            *prediction = Some(grid_prediction(grid, state, action)?);
        }
        Ok(())
    }

    /// Set every transition that enters the goal to terminate with reward 1.
    /// Other predictions are unchanged.
    pub fn reveal_goal_location(&mut self, grid: &Gridworld) -> Result<(), RLError> {
        self.check_grid(grid)?;
        for ((state, action), prediction) in self.predictions.indexed_iter_mut() {
            if grid.next_state(state, action)?.is_terminal() {
                *prediction = Some(Prediction::new(Successor::Terminate, 1.0));
            }
        }
        Ok(())
    }
}

fn stay_model(num_states: usize, num_actions: usize) -> Array2<Option<Prediction>> {
    Array2::from_shape_fn((num_states, num_actions), |(state, _)| {
        Some(Prediction::new(Successor::Continue(state), 0.0))
    })
}

fn grid_prediction(grid: &Gridworld, square: usize, action: usize) -> Result<Prediction, RLError> {
    Ok(match grid.next_state(square, action)? {
        State::Index(next) => Prediction::new(Successor::Continue(next), 0.0),
        _ => Prediction::new(Successor::Terminate, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::{GridworldConfig, Move};
    use rstest::{fixture, rstest};

    /// 3x1 corridor with the goal on the right.
    #[fixture]
    fn corridor() -> Gridworld {
        Gridworld::new(GridworldConfig::new(3, 1, 0, 2)).unwrap()
    }

    fn stay(state: usize) -> Option<Prediction> {
        Some(Prediction::new(Successor::Continue(state), 0.0))
    }

    #[test]
    fn starts_as_stay_model() {
        let model = WorldModel::new(3, 2);
        for s in 0..3 {
            for a in 0..2 {
                assert_eq!(model.predict(s, a).unwrap(), stay(s));
            }
        }
        assert_eq!(model.time(), 0);
    }

    #[test]
    fn learn_overwrites_and_ticks() {
        let mut model = WorldModel::new(3, 2);
        model.learn(0, 1, Successor::Continue(2), 0.5).unwrap();
        model.learn(2, 0, Successor::Terminate, 1.0).unwrap();
        model.learn(0, 1, Successor::Continue(1), -0.5).unwrap();
        assert_eq!(
            model.predict(0, 1).unwrap(),
            Some(Prediction::new(Successor::Continue(1), -0.5))
        );
        assert_eq!(model.time(), 3);
        assert_eq!(model.last_tried(0, 1).unwrap(), 3);
        assert_eq!(model.last_tried(2, 0).unwrap(), 2);
        assert_eq!(model.elapsed(2, 0).unwrap(), 1);
        assert_eq!(model.elapsed(1, 1).unwrap(), 3);
    }

    #[test]
    fn learn_out_of_range() {
        let mut model = WorldModel::new(3, 2);
        assert!(model.learn(3, 0, Successor::Terminate, 0.0).is_err());
        assert!(model.learn(0, 2, Successor::Terminate, 0.0).is_err());
        assert!(model.learn(0, 0, Successor::Continue(3), 0.0).is_err());
        assert_eq!(model.time(), 0);
    }

    #[test]
    fn null_model_and_restore() {
        let mut model = WorldModel::new(2, 2);
        model.learn(0, 0, Successor::Continue(1), 1.0).unwrap();
        model.setup_null_model();
        assert_eq!(model.predict(0, 0).unwrap(), None);
        assert!(model.restore());
        assert_eq!(
            model.predict(0, 0).unwrap(),
            Some(Prediction::new(Successor::Continue(1), 1.0))
        );
    }

    #[test]
    fn restore_without_save() {
        let mut model = WorldModel::new(2, 2);
        assert!(!model.restore());
        assert_eq!(model.predict(1, 1).unwrap(), stay(1));
    }

    #[test]
    fn reset_returns_to_stay_model() {
        let mut model = WorldModel::new(2, 2);
        model.learn(0, 0, Successor::Terminate, 1.0).unwrap();
        model.save();
        model.reset();
        assert_eq!(model.predict(0, 0).unwrap(), stay(0));
        assert_eq!(model.time(), 0);
        assert_eq!(model.last_tried(0, 0).unwrap(), 0);
        assert!(!model.restore());
    }

    #[rstest]
    fn empty_grid_model_ignores_walls(corridor: Gridworld) {
        let mut model = WorldModel::new(3, 4);
        model.setup_empty_grid_model(&corridor).unwrap();
        // Wraps through the border wall
        assert_eq!(
            model.predict(0, Move::Left.action()).unwrap(),
            Some(Prediction::new(Successor::Continue(2), 0.0))
        );
        assert_eq!(
            model.predict(1, Move::Right.action()).unwrap(),
            Some(Prediction::new(Successor::Continue(2), 0.0))
        );
        assert!(model.restore());
        assert_eq!(model.predict(0, Move::Left.action()).unwrap(), stay(0));
    }

    #[rstest]
    fn accurate_model(corridor: Gridworld) {
        let mut model = WorldModel::new(3, 4);
        model.setup_accurate_model(&corridor).unwrap();
        assert_eq!(model.predict(0, Move::Left.action()).unwrap(), stay(0));
        assert_eq!(
            model.predict(0, Move::Right.action()).unwrap(),
            Some(Prediction::new(Successor::Continue(1), 0.0))
        );
        assert_eq!(
            model.predict(1, Move::Right.action()).unwrap(),
            Some(Prediction::new(Successor::Terminate, 1.0))
        );
    }

    #[rstest]
    fn reveal_goal(corridor: Gridworld) {
        let mut model = WorldModel::new(3, 4);
        model.setup_null_model();
        model.reveal_goal_location(&corridor).unwrap();
        assert_eq!(
            model.predict(1, Move::Right.action()).unwrap(),
            Some(Prediction::new(Successor::Terminate, 1.0))
        );
        assert_eq!(model.predict(0, Move::Right.action()).unwrap(), None);
    }

    #[rstest]
    fn grid_size_mismatch(corridor: Gridworld) {
        let mut model = WorldModel::new(4, 4);
        assert!(model.setup_accurate_model(&corridor).is_err());
        let mut model = WorldModel::new(3, 2);
        assert!(model.setup_empty_grid_model(&corridor).is_err());
    }

    #[test]
    fn successor_from_state() {
        assert_eq!(
            Successor::from_state(&State::Index(3)),
            Ok(Successor::Continue(3))
        );
        assert_eq!(
            Successor::from_state(&State::Terminal),
            Ok(Successor::Terminate)
        );
        assert!(Successor::from_state(&State::Features(Default::default())).is_err());
        assert_eq!(Successor::Continue(2).to_state(), State::Index(2));
    }
}
