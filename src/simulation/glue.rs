//! Agent-environment interaction loop.
use super::{EpisodeSummary, StepsSummary};
use crate::agents::Agent;
use crate::envs::Environment;
use crate::error::RLError;
use crate::logging::{Event, Loggable, Logger};
use crate::state::State;
use log::{debug, info, warn};
use std::mem;

/// Interaction phase of an [`RLGlue`] session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created but `rl_init` has not been called.
    Uninitialized,
    /// Initialized; no episode has started.
    Ready,
    /// An episode is in progress.
    InEpisode,
    /// The last episode reached a terminal state.
    EpisodeEnd,
}

/// Result of a single [`RLGlue::rl_step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub reward: f64,
    /// Observation of the state reached by the step.
    pub state: State,
    /// The next action chosen by the agent. `None` on terminal steps.
    pub action: Option<usize>,
    pub terminal: bool,
}

/// Drives one agent and one environment through episodes.
///
/// The environment always steps first; the agent then sees the resulting transition through
/// exactly one call to `step` or `end`.
///
/// `total_reward` accumulates across episodes until the next `rl_init`.
#[derive(Debug)]
pub struct RLGlue<E, A, L = ()> {
    env: E,
    agent: A,
    logger: L,
    phase: Phase,

    total_reward: f64,
    last_action: Option<usize>,
    num_steps: u64,
    num_episodes: u64,
    num_ep_steps: u64,
    episode_reward: f64,
}

impl<E, A> RLGlue<E, A>
where
    E: Environment,
    A: Agent,
{
    pub const fn new(env: E, agent: A) -> Self {
        Self::with_logger(env, agent, ())
    }
}

impl<E, A, L> RLGlue<E, A, L>
where
    E: Environment,
    A: Agent,
    L: Logger,
{
    pub const fn with_logger(env: E, agent: A, logger: L) -> Self {
        Self {
            env,
            agent,
            logger,
            phase: Phase::Uninitialized,
            total_reward: 0.0,
            last_action: None,
            num_steps: 0,
            num_episodes: 0,
            num_ep_steps: 0,
            episode_reward: 0.0,
        }
    }

    /// Reset all counters and initialize the agent and the environment.
    pub fn rl_init(&mut self) {
        self.total_reward = 0.0;
        self.last_action = None;
        self.num_steps = 0;
        self.num_episodes = 0;
        self.num_ep_steps = 0;
        self.episode_reward = 0.0;

        self.agent.init();
        self.env.init();
        self.phase = Phase::Ready;
    }

    /// Start an episode.
    ///
    /// Initializes the session first if `rl_init` has never been called.
    ///
    /// # Returns
    /// The initial state and the agent's first action.
    pub fn rl_start(&mut self) -> Result<(State, usize), RLError> {
        if self.phase == Phase::Uninitialized {
            self.rl_init();
        }
        self.num_ep_steps = 0;
        self.episode_reward = 0.0;

        let state = self.env.start();
        let action = self.agent.start(&state)?;
        self.last_action = Some(action);
        self.phase = Phase::InEpisode;
        Ok((state, action))
    }

    /// Apply the held action to the environment and pass the transition to the agent.
    ///
    /// # Errors
    /// [`RLError::NoEpisode`] if no action is held:
    /// before the first `rl_start` or after a terminal step.
    pub fn rl_step(&mut self) -> Result<StepOutcome, RLError> {
        let action = self.last_action.ok_or(RLError::NoEpisode)?;
        let (reward, state, terminal) = self.env.step(action)?;

        self.total_reward += reward;
        self.episode_reward += reward;
        self.num_ep_steps += 1;
        self.num_steps += 1;
        self.log(Event::Step, "reward", reward.into());
        let num_actions = self.env.num_actions();
        self.log(
            Event::Step,
            "action",
            Loggable::IndexSample {
                value: action,
                size: num_actions,
            },
        );
        self.logger.done(Event::Step);

        let next_action = if terminal {
            self.last_action = None;
            self.num_episodes += 1;
            self.phase = Phase::EpisodeEnd;
            self.agent.end(reward)?;
            self.end_episode();
            None
        } else {
            let next_action = self.agent.step(reward, &state)?;
            self.last_action = Some(next_action);
            Some(next_action)
        };

        Ok(StepOutcome {
            reward,
            state,
            action: next_action,
            terminal,
        })
    }

    /// Run an episode until it terminates or `max_steps` steps have been taken.
    ///
    /// A `max_steps` of 0 places no limit on the episode length.
    ///
    /// # Returns
    /// Whether the episode reached a terminal state.
    pub fn rl_episode(&mut self, max_steps: u64) -> Result<bool, RLError> {
        self.rl_start()?;
        let mut terminal = false;
        while !terminal && (max_steps == 0 || self.num_ep_steps < max_steps) {
            terminal = self.rl_step()?.terminal;
        }
        Ok(terminal)
    }

    /// Run `num_episodes` episodes, each limited to `max_steps` steps (0 for no limit).
    pub fn rl_episodes(
        &mut self,
        num_episodes: usize,
        max_steps: u64,
    ) -> Result<Vec<EpisodeSummary>, RLError> {
        (0..num_episodes)
            .map(|_| {
                self.rl_episode(max_steps)?;
                Ok(self.episode_summary())
            })
            .collect()
    }

    /// Start an episode in the environment only, for driving it with manual actions.
    pub fn rl_env_start(&mut self) -> State {
        self.total_reward = 0.0;
        self.episode_reward = 0.0;
        self.num_ep_steps = 1;
        self.last_action = None;
        self.phase = Phase::InEpisode;
        self.env.start()
    }

    /// Step the environment only, without consulting the agent.
    pub fn rl_env_step(&mut self, action: usize) -> Result<(f64, State, bool), RLError> {
        let (reward, state, terminal) = self.env.step(action)?;
        self.total_reward += reward;
        self.episode_reward += reward;
        if terminal {
            self.num_episodes += 1;
            self.phase = Phase::EpisodeEnd;
        } else {
            self.num_ep_steps += 1;
        }
        self.num_steps += 1;
        Ok((reward, state, terminal))
    }

    /// Install a different agent, returning the previous one.
    ///
    /// An episode in progress is abandoned; the new agent starts at the next `rl_start`.
    pub fn replace_agent(&mut self, agent: A) -> A {
        info!("replacing agent after {} episodes", self.num_episodes);
        if self.phase == Phase::InEpisode {
            self.phase = Phase::Ready;
        }
        self.last_action = None;
        mem::replace(&mut self.agent, agent)
    }

    fn end_episode(&mut self) {
        debug!(
            "episode {} done: {} steps, reward {}",
            self.num_episodes, self.num_ep_steps, self.episode_reward
        );
        #[allow(clippy::cast_precision_loss)]
        let length = self.num_ep_steps as f64;
        self.log(Event::Episode, "length", length.into());
        self.log(Event::Episode, "reward", self.episode_reward.into());
        self.logger.done(Event::Episode);
    }

    fn log(&mut self, event: Event, name: &str, value: Loggable) {
        if let Err(err) = self.logger.log(event, name, value) {
            warn!("{}", err);
        }
    }
}

impl<E, A, L> RLGlue<E, A, L> {
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Sum of rewards since the last `rl_init` (or `rl_env_start`).
    pub const fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// The action to be applied by the next `rl_step`, if any.
    pub const fn last_action(&self) -> Option<usize> {
        self.last_action
    }

    pub const fn num_steps(&self) -> u64 {
        self.num_steps
    }

    pub const fn num_episodes(&self) -> u64 {
        self.num_episodes
    }

    /// Number of steps in the current (or most recent) episode.
    pub const fn num_ep_steps(&self) -> u64 {
        self.num_ep_steps
    }

    pub const fn summary(&self) -> StepsSummary {
        StepsSummary {
            num_steps: self.num_steps,
            num_episodes: self.num_episodes,
            total_reward: self.total_reward,
        }
    }

    /// Summary of the current (or most recent) episode.
    pub fn episode_summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            steps: self.num_ep_steps,
            reward: self.episode_reward,
            terminated: self.phase == Phase::EpisodeEnd,
        }
    }

    pub const fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    pub const fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn logger_mut(&mut self) -> &mut L {
        &mut self.logger
    }
}
