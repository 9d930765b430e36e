//! Simulating agent-environment interaction
mod glue;
mod summary;

pub use glue::{Phase, RLGlue, StepOutcome};
pub use summary::{EpisodeSummary, StepsSummary};
