//! Agent errors
use thiserror::Error;

/// Error building an agent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildAgentError {
    #[error("agent requires at least one state and one action, got {num_states} states and {num_actions} actions")]
    EmptySpace {
        num_states: usize,
        num_actions: usize,
    },
    #[error("parameter {name} = {value} is outside of {range}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        range: &'static str,
    },
    #[error("unknown agent name {0:?}")]
    UnknownAgent(String),
}
