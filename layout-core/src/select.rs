//! Annealed stochastic point selection.
//!
//! The next point to optimize is sampled from a softmax over per-point
//! losses divided by the current annealing temperature. High
//! temperature flattens the distribution toward uniform (broad
//! exploration); as the temperature anneals down the distribution
//! sharpens toward the highest-loss point (greedy refinement).

use crate::types::PointId;
use rand::Rng;

/// Numerically stable softmax.
///
/// The maximum is subtracted before exponentiating, so arbitrarily
/// large finite inputs cannot overflow. If the exponentials underflow
/// to a zero sum, the result falls back to a uniform distribution
/// rather than dividing by zero; in all cases the output sums to 1.
///
/// ### Parameters
/// - `values` - Finite scores; must be non-empty.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    assert!(!values.is_empty(), "softmax over empty input");

    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum > 0.0 {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![1.0 / values.len() as f32; values.len()]
    }
}

/// Samples the index of the next point to optimize.
///
/// Softmaxes `losses[i] / temperature` and draws one index from the
/// resulting categorical distribution by inverse-CDF sampling. Equal
/// losses (including all-zero) give every point the same probability.
///
/// The temperature floor of 1.0 is the optimization loop's
/// responsibility; this function uses whatever it is given.
///
/// ### Parameters
/// - `losses` - Per-point losses, one entry per point; must be non-empty.
/// - `temperature` - Current annealing temperature (≥ 1.0 in practice).
/// - `rng` - Random number generator for the categorical draw.
///
/// ### Returns
/// The sampled point index, always `< losses.len()`.
pub fn choose(losses: &[f32], temperature: f32, rng: &mut impl Rng) -> PointId {
    let scaled: Vec<f32> = losses.iter().map(|l| l / temperature).collect();
    let probabilities = softmax(&scaled);

    let draw: f32 = rng.random();
    let mut cumulative = 0.0;
    for (id, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if draw < cumulative {
            return id;
        }
    }

    // Floating-point rounding can leave the CDF a hair short of 1.0.
    losses.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sums_to_one(probabilities: &[f32]) {
        let sum: f32 = probabilities.iter().sum();
        assert!(
            (sum - 1.0).abs() < 1e-5,
            "probabilities sum to {sum}, expected 1.0"
        );
    }

    #[test]
    fn softmax_sums_to_one() {
        assert_sums_to_one(&softmax(&[1.0, 2.0, 3.0]));
        assert_sums_to_one(&softmax(&[0.0]));
        assert_sums_to_one(&softmax(&[-5.0, 100.0, 3.5, 0.0]));
    }

    #[test]
    fn softmax_is_uniform_for_equal_inputs() {
        for values in [vec![0.0, 0.0, 0.0, 0.0], vec![7.5, 7.5, 7.5, 7.5]] {
            let probabilities = softmax(&values);
            assert_sums_to_one(&probabilities);
            for p in &probabilities {
                assert!((p - 0.25).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn softmax_survives_extreme_magnitudes() {
        // Without the max subtraction these would overflow to inf.
        let probabilities = softmax(&[1e4, 1e4 + 1.0]);
        assert_sums_to_one(&probabilities);
        assert!(probabilities.iter().all(|p| p.is_finite()));
        assert!(probabilities[1] > probabilities[0]);
    }

    #[test]
    fn softmax_favors_larger_values() {
        let probabilities = softmax(&[1.0, 3.0, 2.0]);
        assert!(probabilities[1] > probabilities[2]);
        assert!(probabilities[2] > probabilities[0]);
    }

    #[test]
    fn choose_returns_a_valid_index() {
        let mut rng = rand::rng();
        let losses = [0.5, 4.0, 1.5];

        for _ in 0..100 {
            let id = choose(&losses, 10.0, &mut rng);
            assert!(id < losses.len());
        }
    }

    #[test]
    fn choose_handles_all_zero_losses() {
        let mut rng = rand::rng();
        let losses = [0.0, 0.0, 0.0];

        // Degenerate input must fall back to uniform sampling, not
        // panic or loop forever; over many draws every index shows up.
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[choose(&losses, 1.0, &mut rng)] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn choose_at_low_temperature_prefers_the_highest_loss() {
        let mut rng = rand::rng();
        // At the temperature floor the gap of 50 makes the softmax
        // effectively a one-hot on index 1.
        let losses = [0.0, 50.0, 10.0];

        let mut highest = 0;
        for _ in 0..200 {
            if choose(&losses, 1.0, &mut rng) == 1 {
                highest += 1;
            }
        }
        assert_eq!(highest, 200);
    }

    #[test]
    fn choose_single_point_is_always_that_point() {
        let mut rng = rand::rng();
        assert_eq!(choose(&[0.0], 500.0, &mut rng), 0);
    }
}
