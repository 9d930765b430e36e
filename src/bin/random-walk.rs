use rltoolkit::agents::{QLambdaAgent, TdParams};
use rltoolkit::envs::{BuildEnv, RandomWalkConfig};
use rltoolkit::{Environment, RLError, RLGlue};

fn main() -> Result<(), RLError> {
    let env = RandomWalkConfig::new(10).build_env(0)?;
    let params = TdParams {
        alpha: 0.1,
        gamma: 0.9,
        epsilon: 0.1,
        ..TdParams::default()
    };
    let agent = QLambdaAgent::new(env.num_states(), env.num_actions(), params, 0)?;

    let mut glue = RLGlue::new(env, agent);
    glue.rl_init();
    for episode in glue.rl_episodes(30, 0)? {
        println!(
            "Episode took {} steps, received {} reward",
            episode.steps, episode.reward
        );
    }
    print!("{}", glue.summary());
    Ok(())
}
