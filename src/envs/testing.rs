//! Environment testing utilities
use super::Environment;
use crate::Prng;
use rand::{Rng, SeedableRng};

/// Run an environment with uniform random actions and check that invariants are satisfied.
///
/// * `init` may be repeated without changing behaviour.
/// * Every observation indexes within `0 .. num_states()`.
/// * Every valid action produces a step, restarting after terminal steps.
pub fn run_random<E: Environment>(mut env: E, num_steps: u64, seed: u64) {
    let mut rng = Prng::seed_from_u64(seed);
    env.init();
    env.init();
    let num_states = env.num_states();
    let num_actions = env.num_actions();
    assert!(num_actions > 0);

    let state = env.start();
    assert!(state.check(num_states).is_ok());
    assert!(!state.is_terminal());

    for _ in 0..num_steps {
        let action = rng.gen_range(0..num_actions);
        let (reward, state, terminal) = env.step(action).unwrap();
        assert!(reward.is_finite());
        assert!(state.check(num_states).is_ok());
        if state.is_terminal() {
            assert!(terminal);
        }
        if terminal {
            let state = env.start();
            assert!(!state.is_terminal());
        }
    }
    assert!(env.step(num_actions).is_err());
}
