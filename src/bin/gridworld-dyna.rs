use rltoolkit::agents::{BuildAgent, DynaAgentConfig};
use rltoolkit::envs::{BuildEnv, GridworldConfig};
use rltoolkit::logging::CLILogger;
use rltoolkit::{Environment, RLError, RLGlue};
use std::time::Duration;

fn main() -> Result<(), RLError> {
    let env = GridworldConfig::default().build_env(0)?;
    let agent = DynaAgentConfig::default().build_agent(env.num_states(), env.num_actions(), 0)?;
    let logger = CLILogger::new(Duration::from_millis(200));

    let mut glue = RLGlue::with_logger(env, agent, logger);
    glue.rl_init();
    for (i, episode) in glue.rl_episodes(50, 0)?.into_iter().enumerate() {
        println!("episode {:>3}: {}", i + 1, episode);
    }
    Ok(())
}
