use super::{
    BuildAgentError, DynaAgentConfig, LearningAgent, OneStepQAgent, QLambdaAgent,
    SarsaAgent, SarsaLambdaAgent,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build an agent instance.
pub trait BuildAgent {
    type Agent;

    /// Build an agent for an environment.
    ///
    /// # Args
    /// * `num_states` - Number of rows of the value table: squares for discrete environments,
    ///                  feature indices for tile-coded ones.
    /// * `num_actions` - Number of actions.
    /// * `seed` - Seed for the agent's random state.
    fn build_agent(
        &self,
        num_states: usize,
        num_actions: usize,
        seed: u64,
    ) -> Result<Self::Agent, BuildAgentError>;
}

/// Temporal difference learning parameters shared by all agents.
///
/// Fields are public and may be changed between steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TdParams {
    /// Step size.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Probability of taking a random action.
    pub epsilon: f64,
    /// Eligibility trace decay. Unused by one-step agents.
    pub lambda: f64,
    /// Value of every table entry after `init`.
    pub initial_value: f64,
}

impl Default for TdParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.05,
            lambda: 0.8,
            initial_value: 0.0,
        }
    }
}

impl TdParams {
    pub fn validate(&self) -> Result<(), BuildAgentError> {
        check_param("alpha", self.alpha, self.alpha > 0.0, "(0, inf)")?;
        check_unit("gamma", self.gamma)?;
        check_unit("epsilon", self.epsilon)?;
        check_unit("lambda", self.lambda)?;
        check_param(
            "initial_value",
            self.initial_value,
            self.initial_value.is_finite(),
            "(-inf, inf)",
        )
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), BuildAgentError> {
    check_param(name, value, (0.0..=1.0).contains(&value), "[0, 1]")
}

pub(super) fn check_param(
    name: &'static str,
    value: f64,
    valid: bool,
    range: &'static str,
) -> Result<(), BuildAgentError> {
    if valid {
        Ok(())
    } else {
        Err(BuildAgentError::InvalidParameter { name, value, range })
    }
}

pub(super) const fn check_space(
    num_states: usize,
    num_actions: usize,
) -> Result<(), BuildAgentError> {
    if num_states == 0 || num_actions == 0 {
        Err(BuildAgentError::EmptySpace {
            num_states,
            num_actions,
        })
    } else {
        Ok(())
    }
}

/// Agent definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentDef {
    /// One-step Q learning
    OneStepQ(TdParams),
    /// Sarsa with one-step bootstrapping
    Sarsa(TdParams),
    /// Sarsa(λ) with accumulating traces
    SarsaLambda(TdParams),
    /// Watkins' Q(λ)
    QLambda(TdParams),
    /// One-step Dyna-Q with a learned deterministic model
    Dyna(DynaAgentConfig),
}

impl Default for AgentDef {
    fn default() -> Self {
        Self::OneStepQ(TdParams::default())
    }
}

impl AgentDef {
    /// Short name of the agent type, as accepted by [`AgentDef::from_str`].
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OneStepQ(_) => "onestepq",
            Self::Sarsa(_) => "sarsa",
            Self::SarsaLambda(_) => "sarsalambdatraces",
            Self::QLambda(_) => "qlambdareplace",
            Self::Dyna(_) => "onestepdyna",
        }
    }

    /// Shared learning parameters.
    pub const fn params(&self) -> TdParams {
        match self {
            Self::OneStepQ(params)
            | Self::Sarsa(params)
            | Self::SarsaLambda(params)
            | Self::QLambda(params) => *params,
            Self::Dyna(config) => config.td_params(),
        }
    }
}

impl fmt::Display for AgentDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AgentDef {
    type Err = BuildAgentError;

    /// Parse an agent name into a definition with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onestepq" => Ok(Self::OneStepQ(TdParams::default())),
            "sarsa" => Ok(Self::Sarsa(TdParams::default())),
            "sarsalambdatraces" => Ok(Self::SarsaLambda(TdParams::default())),
            "qlambdareplace" => Ok(Self::QLambda(TdParams::default())),
            "onestepdyna" => Ok(Self::Dyna(DynaAgentConfig::default())),
            _ => Err(BuildAgentError::UnknownAgent(s.into())),
        }
    }
}

impl BuildAgent for AgentDef {
    type Agent = Box<dyn LearningAgent>;

    fn build_agent(
        &self,
        num_states: usize,
        num_actions: usize,
        seed: u64,
    ) -> Result<Self::Agent, BuildAgentError> {
        let agent: Self::Agent = match self {
            Self::OneStepQ(params) => Box::new(OneStepQAgent::new(
                num_states,
                num_actions,
                *params,
                seed,
            )?),
            Self::Sarsa(params) => {
                Box::new(SarsaAgent::new(num_states, num_actions, *params, seed)?)
            }
            Self::SarsaLambda(params) => Box::new(SarsaLambdaAgent::new(
                num_states,
                num_actions,
                *params,
                seed,
            )?),
            Self::QLambda(params) => Box::new(QLambdaAgent::new(
                num_states,
                num_actions,
                *params,
                seed,
            )?),
            Self::Dyna(config) => Box::new(config.build_agent(num_states, num_actions, seed)?),
        };
        Ok(agent)
    }
}
