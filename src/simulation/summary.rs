use std::fmt;

/// Basic summary statistics of simulation steps.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct StepsSummary {
    pub num_steps: u64,
    pub num_episodes: u64,
    pub total_reward: f64,
}

impl fmt::Display for StepsSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "num_steps: {}", self.num_steps)?;
        writeln!(f, "num_episodes: {}", self.num_episodes)?;
        writeln!(
            f,
            "step_reward_mean: {}",
            self.total_reward / self.num_steps as f64
        )?;
        writeln!(
            f,
            "ep_reward_mean:   {}",
            self.total_reward / self.num_episodes as f64
        )?;
        writeln!(
            f,
            "ep_length_mean:   {}",
            self.num_steps as f64 / self.num_episodes as f64
        )?;
        Ok(())
    }
}

/// Outcome of a single episode run by [`RLGlue::rl_episode`](super::RLGlue::rl_episode).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Number of environment steps taken.
    pub steps: u64,
    /// Sum of rewards received.
    pub reward: f64,
    /// Whether the episode reached a terminal state within its step budget.
    pub terminated: bool,
}

impl fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} steps, {} reward", self.steps, self.reward)?;
        if !self.terminated {
            write!(f, " (truncated)")?;
        }
        Ok(())
    }
}
