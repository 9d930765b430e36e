//! Benchmark `Agent::step` for the tabular agents.
use criterion::{
    criterion_group, criterion_main, measurement::Measurement, BenchmarkGroup, Criterion,
};
use rltoolkit::agents::{AgentDef, BuildAgent, DynaAgentConfig, TdParams};
use rltoolkit::envs::{BuildEnv, GridworldConfig, MountainCarConfig};
use rltoolkit::{Agent, Environment};

/// Benchmark agent steps (including learning) while the agent explores an environment.
fn benchmark_agent_step<M, E, AC>(group: &mut BenchmarkGroup<M>, name: &str, env: E, config: &AC)
where
    M: Measurement,
    E: Environment,
    AC: BuildAgent,
    AC::Agent: Agent,
{
    let mut env = env;
    let mut agent = config
        .build_agent(env.num_states(), env.num_actions(), 0)
        .unwrap();
    env.init();
    agent.init();
    let mut action = agent.start(&env.start()).unwrap();
    group.bench_function(name, |b| {
        b.iter(|| {
            let (reward, state, terminal) = env.step(action).unwrap();
            // Restarting is part of the measurement but only happens once per episode.
            action = if terminal {
                agent.end(reward).unwrap();
                agent.start(&env.start()).unwrap()
            } else {
                agent.step(reward, &state).unwrap()
            };
        })
    });
}

fn bench_gridworld(c: &mut Criterion) {
    let mut group = c.benchmark_group("gridworld_step");
    let grid = || GridworldConfig::default().build_env(0).unwrap();
    let params = TdParams::default();
    benchmark_agent_step(&mut group, "onestepq", grid(), &AgentDef::OneStepQ(params));
    benchmark_agent_step(&mut group, "sarsa", grid(), &AgentDef::Sarsa(params));
    benchmark_agent_step(&mut group, "sarsa_lambda", grid(), &AgentDef::SarsaLambda(params));
    benchmark_agent_step(&mut group, "q_lambda", grid(), &AgentDef::QLambda(params));
    benchmark_agent_step(&mut group, "dyna", grid(), &DynaAgentConfig::default());
}

fn bench_mountain_car(c: &mut Criterion) {
    let mut group = c.benchmark_group("mountain_car_step");
    let car = || MountainCarConfig::default().build_env(0).unwrap();
    let params = TdParams {
        alpha: 0.5 / 32.0,
        gamma: 1.0,
        epsilon: 0.0,
        ..TdParams::default()
    };
    benchmark_agent_step(&mut group, "q_lambda", car(), &AgentDef::QLambda(params));
    benchmark_agent_step(&mut group, "sarsa_lambda", car(), &AgentDef::SarsaLambda(params));
}

criterion_group!(benches, bench_gridworld, bench_mountain_car);
criterion_main!(benches);
