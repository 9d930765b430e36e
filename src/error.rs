//! Error type
use crate::agents::BuildAgentError;
use crate::envs::BuildEnvError;
use thiserror::Error;

/// Error from the RL toolkit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RLError {
    /// An action, square, or state index outside of its valid range.
    ///
    /// Callers are expected never to construct such an index;
    /// this signals a violated calling contract rather than a runtime condition.
    #[error("{what} index {index} out of range 0..{bound}")]
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },
    /// The agent (or the state representation it was given) does not define this operation.
    #[error("{operation} is not supported by {agent}")]
    NotSupported {
        operation: &'static str,
        agent: &'static str,
    },
    /// A step was requested while no action is held, either before `rl_start` or after the
    /// episode reached a terminal state.
    #[error("no episode in progress")]
    NoEpisode,
    #[error("error building agent")]
    BuildAgent(#[from] BuildAgentError),
    #[error("error building environment")]
    BuildEnv(#[from] BuildEnvError),
}

impl RLError {
    /// Check that `index` is in `0..bound`.
    pub const fn check_index(what: &'static str, index: usize, bound: usize) -> Result<(), Self> {
        if index < bound {
            Ok(())
        } else {
            Err(Self::OutOfRange { what, index, bound })
        }
    }
}
