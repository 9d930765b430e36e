//! Action selection.
use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use rand::seq::SliceRandom;
use rand::Rng;

/// Select an action epsilon-greedily.
///
/// With probability `epsilon` an action is chosen uniformly at random,
/// otherwise a [`greedy`] action is chosen.
/// Always draws one uniform sample first so that the random stream does not depend on `epsilon`.
pub fn epsilon_greedy<R: Rng + ?Sized>(values: ArrayView1<f64>, epsilon: f64, rng: &mut R) -> usize {
    if rng.gen::<f64>() < epsilon {
        rng.gen_range(0..values.len())
    } else {
        greedy(values, rng)
    }
}

/// An action with maximal value, breaking ties uniformly at random.
///
/// If the values cannot be ordered (some are NaN) every action is treated as maximal.
pub fn greedy<R: Rng + ?Sized>(values: ArrayView1<f64>, rng: &mut R) -> usize {
    let maximizers: Vec<usize> = match values.max() {
        Ok(&max) => values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == max)
            .map(|(i, _)| i)
            .collect(),
        Err(_) => (0..values.len()).collect(),
    };
    *maximizers.choose(rng).expect("Empty action space")
}
