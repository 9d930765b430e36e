//! Gridworld environment
use super::{BuildEnv, BuildEnvError, Environment};
use crate::error::RLError;
use crate::state::State;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Gridworld`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridworldConfig {
    pub width: usize,
    pub height: usize,
    pub start_square: usize,
    pub goal_square: usize,
    /// Squares that cannot be entered.
    pub barriers: Vec<usize>,
    /// Walls in addition to the border walls. A listed border wall is removed instead.
    pub walls: Vec<(usize, Move)>,
}

impl Default for GridworldConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 6,
            start_square: 0,
            goal_square: 47,
            barriers: Vec::new(),
            walls: Vec::new(),
        }
    }
}

impl GridworldConfig {
    pub fn new(width: usize, height: usize, start_square: usize, goal_square: usize) -> Self {
        Self {
            width,
            height,
            start_square,
            goal_square,
            ..Self::default()
        }
    }

    pub(super) fn validate(&self) -> Result<(), BuildEnvError> {
        if self.width == 0 || self.height == 0 {
            return Err(BuildEnvError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        let num_squares = self.width * self.height;
        let check = |what, square| {
            if square < num_squares {
                Ok(())
            } else {
                Err(BuildEnvError::SquareOutOfGrid {
                    what,
                    square,
                    num_squares,
                })
            }
        };
        check("start", self.start_square)?;
        check("goal", self.goal_square)?;
        for &square in &self.barriers {
            check("barrier", square)?;
        }
        for &(square, _) in &self.walls {
            check("wall", square)?;
        }
        Ok(())
    }
}

impl BuildEnv for GridworldConfig {
    type Environment = Gridworld;

    fn build_env(&self, _seed: u64) -> Result<Self::Environment, BuildEnvError> {
        self.validate()?;
        Ok(Gridworld::new_unchecked(self.clone()))
    }
}

/// Gridworld move; the action with index `m as usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Move {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The move for an action index.
    pub fn from_action(action: usize) -> Result<Self, RLError> {
        Self::ALL.get(action).copied().ok_or(RLError::OutOfRange {
            what: "action",
            index: action,
            bound: Self::ALL.len(),
        })
    }

    pub const fn action(self) -> usize {
        self as usize
    }

    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Gridworld Environment
///
/// A `width` x `height` grid of squares numbered row by row from the top left.
/// There are 4 actions (see [`Move`]). Without walls, moves wrap around the grid edges.
///
/// * A wall is a (square, move) pair that leaves the agent in place.
///     Walls start out on every border edge.
/// * A barrier is a square that cannot be entered; moving into it leaves the agent in place.
/// * Entering the goal square ends the episode with reward 1. All other steps give reward 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gridworld {
    config: GridworldConfig,
    walls: Vec<[bool; 4]>,
    barriers: Vec<bool>,
    /// Current square; `None` outside of an episode.
    square: Option<usize>,
}

impl Gridworld {
    /// Create a gridworld from a configuration.
    pub fn new(config: GridworldConfig) -> Result<Self, BuildEnvError> {
        config.validate()?;
        Ok(Self::new_unchecked(config))
    }

    fn new_unchecked(config: GridworldConfig) -> Self {
        let mut gridworld = Self {
            walls: Vec::new(),
            barriers: Vec::new(),
            square: None,
            config,
        };
        gridworld.reset_layout();
        gridworld
    }

    /// Restore walls and barriers to the configured layout.
    fn reset_layout(&mut self) {
        let (width, height) = (self.width(), self.height());
        self.walls = vec![[false; 4]; self.num_squares()];
        self.barriers = vec![false; self.num_squares()];
        for v in 0..height {
            let (left, right) = (self.square_from_hv(0, v), self.square_from_hv(width - 1, v));
            self.walls[left][Move::Left.action()] = true;
            self.walls[right][Move::Right.action()] = true;
        }
        for h in 0..width {
            let (top, bottom) = (self.square_from_hv(h, 0), self.square_from_hv(h, height - 1));
            self.walls[top][Move::Up.action()] = true;
            self.walls[bottom][Move::Down.action()] = true;
        }
        for &square in &self.config.barriers {
            self.barriers[square] = true;
        }
        for &(square, m) in &self.config.walls {
            let wall = &mut self.walls[square][m.action()];
            *wall = !*wall;
        }
    }

    pub const fn width(&self) -> usize {
        self.config.width
    }

    pub const fn height(&self) -> usize {
        self.config.height
    }

    pub const fn num_squares(&self) -> usize {
        self.config.width * self.config.height
    }

    pub const fn start_square(&self) -> usize {
        self.config.start_square
    }

    pub const fn goal_square(&self) -> usize {
        self.config.goal_square
    }

    /// The square the agent currently occupies, if an episode is in progress.
    pub const fn current_square(&self) -> Option<usize> {
        self.square
    }

    fn check_square(&self, square: usize) -> Result<(), RLError> {
        RLError::check_index("square", square, self.num_squares())
    }

    pub fn set_start_square(&mut self, square: usize) -> Result<(), RLError> {
        self.check_square(square)?;
        self.config.start_square = square;
        Ok(())
    }

    pub fn set_goal_square(&mut self, square: usize) -> Result<(), RLError> {
        self.check_square(square)?;
        self.config.goal_square = square;
        Ok(())
    }

    /// Horizontal (column) coordinate of a square.
    pub const fn square_h(&self, square: usize) -> usize {
        square % self.config.width
    }

    /// Vertical (row) coordinate of a square.
    pub const fn square_v(&self, square: usize) -> usize {
        square / self.config.width
    }

    pub const fn square_from_hv(&self, h: usize, v: usize) -> usize {
        v * self.config.width + h
    }

    /// The square reached from `square` by `action`, ignoring walls and barriers.
    ///
    /// Wraps around at the grid edges.
    pub fn neighboring_square(&self, square: usize, action: usize) -> Result<usize, RLError> {
        self.check_square(square)?;
        let (width, height) = (self.width(), self.height());
        let h = self.square_h(square);
        let v = self.square_v(square);
        Ok(match Move::from_action(action)? {
            Move::Up => self.square_from_hv(h, (v + height - 1) % height),
            Move::Down => self.square_from_hv(h, (v + 1) % height),
            Move::Left => self.square_from_hv((h + width - 1) % width, v),
            Move::Right => self.square_from_hv((h + 1) % width, v),
        })
    }

    /// The neighbors of a square in [`Move::ALL`] order.
    pub fn neighboring_squares(&self, square: usize) -> Result<[usize; 4], RLError> {
        let mut squares = [0; 4];
        for (action, neighbor) in squares.iter_mut().enumerate() {
            *neighbor = self.neighboring_square(square, action)?;
        }
        Ok(squares)
    }

    /// The state that results from taking `action` in `square`.
    ///
    /// A wall on `(square, action)` or a barrier on the destination leaves the agent in
    /// `square`. Entering the goal gives [`State::Terminal`].
    pub fn next_state(&self, square: usize, action: usize) -> Result<State, RLError> {
        self.check_square(square)?;
        if self.walls[square][Move::from_action(action)?.action()] {
            return Ok(State::Index(square));
        }
        let proposed = self.neighboring_square(square, action)?;
        Ok(if self.barriers[proposed] {
            State::Index(square)
        } else if proposed == self.goal_square() {
            State::Terminal
        } else {
            State::Index(proposed)
        })
    }

    pub fn is_wall(&self, square: usize, action: usize) -> Result<bool, RLError> {
        self.check_square(square)?;
        Ok(self.walls[square][Move::from_action(action)?.action()])
    }

    pub fn is_barrier(&self, square: usize) -> Result<bool, RLError> {
        self.check_square(square)?;
        Ok(self.barriers[square])
    }

    /// Add or remove the wall on `(square, action)`.
    ///
    /// Only affects this layout; [`Environment::init`] restores the configured walls.
    pub fn toggle_wall(&mut self, square: usize, action: usize) -> Result<(), RLError> {
        self.check_square(square)?;
        let wall = &mut self.walls[square][Move::from_action(action)?.action()];
        *wall = !*wall;
        Ok(())
    }

    /// Add or remove a barrier on `square`.
    ///
    /// Only affects this layout; [`Environment::init`] restores the configured barriers.
    pub fn toggle_barrier(&mut self, square: usize) -> Result<(), RLError> {
        self.check_square(square)?;
        self.barriers[square] = !self.barriers[square];
        Ok(())
    }

    /// Move from the current square, returning the resulting state.
    pub(super) fn advance(&mut self, action: usize) -> Result<State, RLError> {
        let square = self.square.ok_or(RLError::NoEpisode)?;
        let state = self.next_state(square, action)?;
        self.square = state.index();
        Ok(state)
    }
}

impl Environment for Gridworld {
    fn init(&mut self) {
        self.square = None;
        self.reset_layout();
    }

    fn start(&mut self) -> State {
        self.square = Some(self.start_square());
        State::Index(self.start_square())
    }

    fn step(&mut self, action: usize) -> Result<(f64, State, bool), RLError> {
        let state = self.advance(action)?;
        let terminal = state.is_terminal();
        let reward = if terminal { 1.0 } else { 0.0 };
        Ok((reward, state, terminal))
    }

    fn num_actions(&self) -> usize {
        Move::ALL.len()
    }

    fn num_states(&self) -> usize {
        self.num_squares()
    }
}
