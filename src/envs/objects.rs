//! Gridworld with reward objects.
use super::{BuildEnv, BuildEnvError, Environment, Gridworld, GridworldConfig};
use crate::error::RLError;
use crate::state::State;
use serde::{Deserialize, Serialize};

/// Lifetime of a reward object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Gives its reward on every visit.
    Permanent,
    /// Gives its reward on the first visit and is then removed.
    Consumable,
}

/// A reward placed on a gridworld square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardObject {
    pub kind: ObjectKind,
    pub value: f64,
}

/// Configuration for an [`ObjectGridworld`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectGridworldConfig {
    #[serde(flatten)]
    pub grid: GridworldConfig,
    /// Objects placed at `init`, as `(square, object)`.
    pub objects: Vec<(usize, RewardObject)>,
}

impl BuildEnv for ObjectGridworldConfig {
    type Environment = ObjectGridworld;

    fn build_env(&self, seed: u64) -> Result<Self::Environment, BuildEnvError> {
        let num_squares = self.grid.width * self.grid.height;
        if let Some(&(square, _)) = self.objects.iter().find(|(s, _)| *s >= num_squares) {
            return Err(BuildEnvError::SquareOutOfGrid {
                what: "object",
                square,
                num_squares,
            });
        }
        let grid = self.grid.build_env(seed)?;
        let mut env = ObjectGridworld {
            objects: vec![None; grid.num_squares()],
            grid,
            initial_objects: self.objects.clone(),
        };
        env.reset_objects();
        Ok(env)
    }
}

/// A [`Gridworld`] with optional reward objects on its squares.
///
/// Entering a square with an object adds the object value to the step reward.
/// Reaching the goal still gives reward 1 and ignores any object there.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGridworld {
    grid: Gridworld,
    objects: Vec<Option<RewardObject>>,
    initial_objects: Vec<(usize, RewardObject)>,
}

impl ObjectGridworld {
    /// The underlying gridworld, for topology queries and layout edits.
    pub const fn grid(&self) -> &Gridworld {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Gridworld {
        &mut self.grid
    }

    fn reset_objects(&mut self) {
        self.objects.iter_mut().for_each(|o| *o = None);
        for &(square, object) in &self.initial_objects {
            self.objects[square] = Some(object);
        }
    }

    /// Place an object on a square, replacing any existing one.
    pub fn add_object(&mut self, square: usize, value: f64, kind: ObjectKind) -> Result<(), RLError> {
        RLError::check_index("square", square, self.objects.len())?;
        self.objects[square] = Some(RewardObject { kind, value });
        Ok(())
    }

    /// Remove and return the object on a square.
    pub fn remove_object(&mut self, square: usize) -> Result<Option<RewardObject>, RLError> {
        RLError::check_index("square", square, self.objects.len())?;
        Ok(self.objects[square].take())
    }

    pub fn object_at(&self, square: usize) -> Result<Option<RewardObject>, RLError> {
        RLError::check_index("square", square, self.objects.len())?;
        Ok(self.objects[square])
    }
}

impl Environment for ObjectGridworld {
    fn init(&mut self) {
        self.grid.init();
        self.reset_objects();
    }

    fn start(&mut self) -> State {
        self.grid.start()
    }

    fn step(&mut self, action: usize) -> Result<(f64, State, bool), RLError> {
        let state = self.grid.advance(action)?;
        let square = match state.index() {
            Some(square) => square,
            None => return Ok((1.0, state, true)),
        };
        let reward = match self.objects[square] {
            Some(RewardObject {
                kind: ObjectKind::Consumable,
                value,
            }) => {
                self.objects[square] = None;
                value
            }
            Some(RewardObject {
                kind: ObjectKind::Permanent,
                value,
            }) => value,
            None => 0.0,
        };
        Ok((reward, state, false))
    }

    fn num_actions(&self) -> usize {
        self.grid.num_actions()
    }

    fn num_states(&self) -> usize {
        self.grid.num_states()
    }
}
