use rltoolkit::agents::{QLambdaAgent, TdParams};
use rltoolkit::envs::{BuildEnv, MountainCarConfig};
use rltoolkit::{Environment, RLError, RLGlue};

/// Episodes are cut off after this many steps.
const MAX_STEPS: u64 = 10_000;

fn main() -> Result<(), RLError> {
    let config = MountainCarConfig::default();
    let env = config.build_env(0)?;
    #[allow(clippy::cast_precision_loss)]
    let params = TdParams {
        alpha: 0.5 / config.num_tilings as f64,
        gamma: 1.0,
        epsilon: 0.0,
        lambda: 0.9,
        initial_value: 0.0,
    };
    let agent = QLambdaAgent::new(env.num_states(), env.num_actions(), params, 0)?;

    let mut glue = RLGlue::new(env, agent);
    glue.rl_init();
    for (i, episode) in glue.rl_episodes(100, MAX_STEPS)?.into_iter().enumerate() {
        println!("episode {:>3}: {}", i + 1, episode);
    }
    Ok(())
}
