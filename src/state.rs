//! Environment states as seen by agents.
use crate::error::RLError;
use smallvec::SmallVec;
use std::fmt;

/// Active tile indices of a tile-coded observation.
///
/// Holds exactly one index per tiling.
pub type Tiles = SmallVec<[usize; 32]>;

/// A state observation passed from an environment to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum State {
    /// A discrete state, such as a gridworld square, in `0 .. num_states`.
    Index(usize),
    /// A sparse binary feature vector given by its active indices in `0 .. num_states`.
    Features(Tiles),
    /// The terminal state. Has no entry in any value table.
    Terminal,
}

impl State {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// The discrete index of this state, if it has one.
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Rows of a `[num_states, num_actions]` table that this state reads from.
    ///
    /// Empty for the terminal state.
    pub fn rows(&self) -> &[usize] {
        match self {
            Self::Index(i) => std::slice::from_ref(i),
            Self::Features(tiles) => tiles,
            Self::Terminal => &[],
        }
    }

    /// Check that every row of this state is in `0 .. num_states`.
    pub fn check(&self, num_states: usize) -> Result<(), RLError> {
        self.rows()
            .iter()
            .try_for_each(|&row| RLError::check_index("state", row, num_states))
    }
}

impl From<usize> for State {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Tiles> for State {
    fn from(tiles: Tiles) -> Self {
        Self::Features(tiles)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Features(tiles) => write!(f, "{:?}", tiles.as_slice()),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn terminal_has_no_rows() {
        assert!(State::Terminal.rows().is_empty());
        assert!(State::Terminal.is_terminal());
    }

    #[test]
    fn index_rows() {
        assert_eq!(State::Index(7).rows(), &[7]);
        assert_eq!(State::Index(7).index(), Some(7));
    }

    #[test]
    fn features_rows() {
        let state = State::Features(smallvec![1, 4, 9]);
        assert_eq!(state.rows(), &[1, 4, 9]);
        assert_eq!(state.index(), None);
    }

    #[test]
    fn check_rejects_large_feature() {
        let state = State::Features(smallvec![1, 12]);
        assert!(state.check(10).is_err());
        assert!(state.check(13).is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(State::Index(3).to_string(), "3");
        assert_eq!(State::Terminal.to_string(), "terminal");
    }
}
