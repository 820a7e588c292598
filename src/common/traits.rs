//! Common traits defining the pluggable seams of the filter

use rand::Rng;

/// Trait for resampling strategies
///
/// Given a normalized weight vector, return exactly `weights.len()` indices
/// into it. The expected number of times index `i` is selected must equal
/// `weights.len() * weights[i]`.
pub trait Resampler {
    /// Select indices of the particles that survive into the next generation
    fn select<R: Rng + ?Sized>(&self, weights: &[f64], rng: &mut R) -> Vec<usize>;
}

/// Trait for anything that can produce a pose estimate from its belief
pub trait PoseEstimator {
    /// Get current pose estimate
    fn estimate(&self) -> crate::common::Pose2D;
}
