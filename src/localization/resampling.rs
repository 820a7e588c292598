//! Weight normalization and resampling strategies
//!
//! Two strategies satisfy the [`Resampler`] contract:
//! - [`Multinomial`]: independent inverse-CDF (roulette wheel) draws
//! - [`Systematic`]: one random offset, N evenly spaced pointers (low variance)

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::common::Resampler;

use super::noise::NoiseModel;
use super::particle::Particle;

/// Normalize weights in place so they sum to 1.
///
/// If the total is zero or not finite, every weight is replaced by `1/N`.
/// Returns `true` when that uniform fallback was used.
pub fn normalize_weights(weights: &mut [f64]) -> bool {
    if weights.is_empty() {
        return false;
    }
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        for w in weights.iter_mut() {
            *w /= total;
        }
        false
    } else {
        let uniform = 1.0 / weights.len() as f64;
        weights.iter_mut().for_each(|w| *w = uniform);
        true
    }
}

/// Effective number of particles, `1 / sum(w^2)`, for normalized weights
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let sum_w2: f64 = weights.iter().map(|w| w * w).sum();
    if sum_w2 > 0.0 {
        1.0 / sum_w2
    } else {
        0.0
    }
}

fn cumulative(weights: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .scan(0.0, |acc, &w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

/// Inverse-CDF selection, one independent uniform threshold per draw
#[derive(Debug, Clone, Copy, Default)]
pub struct Multinomial;

impl Resampler for Multinomial {
    fn select<R: Rng + ?Sized>(&self, weights: &[f64], rng: &mut R) -> Vec<usize> {
        let n = weights.len();
        if n == 0 {
            return Vec::new();
        }
        let cum = cumulative(weights);
        (0..n)
            .map(|_| {
                let threshold: f64 = rng.gen();
                // first index whose cumulative weight exceeds the threshold
                let idx = cum.partition_point(|&c| c <= threshold);
                idx.min(n - 1)
            })
            .collect()
    }
}

/// Low variance resampling
#[derive(Debug, Clone, Copy, Default)]
pub struct Systematic;

impl Resampler for Systematic {
    fn select<R: Rng + ?Sized>(&self, weights: &[f64], rng: &mut R) -> Vec<usize> {
        let n = weights.len();
        if n == 0 {
            return Vec::new();
        }
        let cum = cumulative(weights);
        let step = 1.0 / n as f64;
        let mut r = Uniform::new(0.0, step).sample(rng);

        let mut j = 0;
        let mut indices = Vec::with_capacity(n);
        for _ in 0..n {
            while r >= cum[j] && j < n - 1 {
                j += 1;
            }
            indices.push(j);
            r += step;
        }
        indices
    }
}

/// Resampling strategy selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplingStrategy {
    Multinomial,
    Systematic,
}

impl Default for ResamplingStrategy {
    fn default() -> Self {
        ResamplingStrategy::Multinomial
    }
}

impl Resampler for ResamplingStrategy {
    fn select<R: Rng + ?Sized>(&self, weights: &[f64], rng: &mut R) -> Vec<usize> {
        match self {
            ResamplingStrategy::Multinomial => Multinomial.select(weights, rng),
            ResamplingStrategy::Systematic => Systematic.select(weights, rng),
        }
    }
}

/// Outcome of one resampling pass
#[derive(Debug, Clone)]
pub struct Resampled {
    pub particles: Vec<Particle>,
    /// Normalized weights of the generation that was resampled
    pub weights: Vec<f64>,
    pub uniform_fallback: bool,
}

/// Draw a new generation of the same size from `particles`.
///
/// Each survivor keeps its parent's pose and normalized weight and gets a
/// fresh noise sample from `noise`.
pub fn resample<S, R>(particles: &[Particle], strategy: &S, noise: &NoiseModel, rng: &mut R) -> Resampled
where
    S: Resampler,
    R: Rng + ?Sized,
{
    let mut weights: Vec<f64> = particles.iter().map(|p| p.weight).collect();
    let uniform_fallback = normalize_weights(&mut weights);

    let next = strategy
        .select(&weights, rng)
        .into_iter()
        .map(|i| {
            let mut child = particles[i].offspring(noise.sample(rng));
            child.weight = weights[i];
            child
        })
        .collect();

    Resampled { particles: next, weights, uniform_fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pose2D;
    use crate::localization::noise::{NoiseConfig, NoiseSample, NoiseSpec};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particles(weights: &[f64]) -> Vec<Particle> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Particle::new(Pose2D::new(i as f64, 0.0, 0.0), w, NoiseSample::zero()))
            .collect()
    }

    #[test]
    fn test_normalize_sums_to_one() {
        let mut w = vec![0.1, 3.0, 2.5, 0.0, 7.25];
        assert!(!normalize_weights(&mut w));
        assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-9);

        let mut tiny = vec![1e-300, 3e-300, 2e-300];
        assert!(!normalize_weights(&mut tiny));
        assert_abs_diff_eq!(tiny.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_zero_and_nan_fall_back_to_uniform() {
        let mut zero = vec![0.0; 4];
        assert!(normalize_weights(&mut zero));
        assert_eq!(zero, vec![0.25; 4]);

        let mut nan = vec![0.5, f64::NAN, 0.1];
        assert!(normalize_weights(&mut nan));
        assert!(nan.iter().all(|&w| (w - 1.0 / 3.0).abs() < 1e-12));

        let mut inf = vec![f64::INFINITY, 1.0];
        assert!(normalize_weights(&mut inf));
        assert_eq!(inf, vec![0.5, 0.5]);
    }

    #[test]
    fn test_effective_sample_size() {
        assert_abs_diff_eq!(effective_sample_size(&[0.25; 4]), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(effective_sample_size(&[1.0, 0.0, 0.0]), 1.0, epsilon = 1e-12);
        assert_eq!(effective_sample_size(&[]), 0.0);
    }

    #[test]
    fn test_strategies_return_n_indices() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [1usize, 2, 5, 100] {
            let mut w: Vec<f64> = (0..n).map(|i| (i + 1) as f64).collect();
            normalize_weights(&mut w);
            for strategy in [ResamplingStrategy::Multinomial, ResamplingStrategy::Systematic] {
                let idx = strategy.select(&w, &mut rng);
                assert_eq!(idx.len(), n);
                assert!(idx.iter().all(|&i| i < n));
            }
        }
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let mut rng = StdRng::seed_from_u64(11);
        let w = vec![0.0, 0.5, 0.0, 0.5, 0.0];
        for _ in 0..50 {
            for &i in &Multinomial.select(&w, &mut rng) {
                assert!(i == 1 || i == 3);
            }
            for &i in &Systematic.select(&w, &mut rng) {
                assert!(i == 1 || i == 3);
            }
        }
    }

    #[test]
    fn test_selection_frequency_tracks_weight() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = vec![0.1, 0.2, 0.7];
        let mut counts = [0usize; 3];
        let rounds = 2000;
        for _ in 0..rounds {
            for i in Multinomial.select(&w, &mut rng) {
                counts[i] += 1;
            }
        }
        let total = (rounds * w.len()) as f64;
        for (c, &p) in counts.iter().zip(w.iter()) {
            assert!((*c as f64 / total - p).abs() < 0.02, "{:?}", counts);
        }
    }

    #[test]
    fn test_systematic_is_proportional() {
        let mut rng = StdRng::seed_from_u64(5);
        // evenly spaced pointers give an exact split for these weights
        let mut four = Systematic.select(&[0.5, 0.25, 0.25, 0.0], &mut rng);
        four.sort_unstable();
        assert_eq!(four, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_round_off_defaults_to_last() {
        // cumulative sum tops out below any threshold near 1
        let mut rng = StdRng::seed_from_u64(1);
        let w = vec![0.0, 0.0, 1e-20];
        let idx = Multinomial.select(&w, &mut rng);
        assert_eq!(idx, vec![2, 2, 2]);
    }

    #[test]
    fn test_resample_copies_pose_and_refreshes_noise() {
        let mut rng = StdRng::seed_from_u64(9);
        let noise = NoiseModel::new(NoiseConfig {
            linear: NoiseSpec::uniform(1.0, 2.0),
            ..NoiseConfig::noiseless()
        })
        .unwrap();
        let input = particles(&[0.0, 0.0, 4.0, 0.0]);
        let out = resample(&input, &ResamplingStrategy::Multinomial, &noise, &mut rng);

        assert_eq!(out.particles.len(), 4);
        assert!(!out.uniform_fallback);
        for p in &out.particles {
            assert_eq!(p.pose.x, 2.0);
            assert_eq!(p.weight, 1.0);
            assert!(p.noise.linear >= 1.0 && p.noise.linear <= 2.0);
        }
    }

    #[test]
    fn test_resample_degenerate_weights() {
        let mut rng = StdRng::seed_from_u64(13);
        let input = particles(&[0.0; 6]);
        let out = resample(&input, &ResamplingStrategy::Systematic, &NoiseModel::noiseless(), &mut rng);
        assert_eq!(out.particles.len(), 6);
        assert!(out.uniform_fallback);
        assert!(out.weights.iter().all(|&w| (w - 1.0 / 6.0).abs() < 1e-12));
    }
}
