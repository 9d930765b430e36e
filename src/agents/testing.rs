//! Agent testing utilities
use super::{ActionValues, ActorMode, Agent, SetActorMode};
use crate::envs::{BuildEnv, Environment, RandomWalkConfig};
use crate::state::State;

/// Feed an agent a fixed trajectory and return the actions it chose.
///
/// `steps` holds `(reward, next_state)` pairs in order.
/// A terminal next state ends the episode with a call to `end`.
pub fn replay<A: Agent + ?Sized>(agent: &mut A, start: &State, steps: &[(f64, State)]) -> Vec<usize> {
    let mut actions = vec![agent.start(start).unwrap()];
    for (reward, state) in steps {
        if state.is_terminal() {
            agent.end(*reward).unwrap();
            break;
        }
        actions.push(agent.step(*reward, state).unwrap());
    }
    actions
}

/// Check that the agent learns to walk right along a 5-state random walk.
///
/// The left end gives -1 and the right end +1.
/// After training the greedy action in every interior state must be "right",
/// and in release mode the agent must walk straight to the right end.
pub fn learns_chain<A>(mut agent: A, num_episodes: usize)
where
    A: Agent + ActionValues + SetActorMode,
{
    let mut env = RandomWalkConfig::new(5).build_env(0).unwrap();
    env.init();
    agent.init();

    for _ in 0..num_episodes {
        let mut action = agent.start(&env.start()).unwrap();
        for _ in 0..1000 {
            let (reward, state, terminal) = env.step(action).unwrap();
            if terminal {
                agent.end(reward).unwrap();
                break;
            }
            action = agent.step(reward, &state).unwrap();
        }
    }

    for square in 1..4 {
        let values = agent.action_values(&State::Index(square)).unwrap();
        assert!(
            values[1] > values[0],
            "state {} prefers left: {}",
            square,
            values
        );
    }

    agent.set_actor_mode(ActorMode::Release);
    let mut action = agent.start(&env.start()).unwrap();
    for _ in 0..2 {
        assert_eq!(action, 1);
        let (reward, state, terminal) = env.step(action).unwrap();
        if terminal {
            assert_eq!(reward, 1.0);
            return;
        }
        action = agent.step(reward, &state).unwrap();
    }
    panic!("release mode did not reach the right end");
}
