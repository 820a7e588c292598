//! Landmark range observation and likelihood weighting
//!
//! Observations are ordered range vectors, one entry per landmark, plus the
//! heading of the observer. A particle's importance weight is the product of
//! a Gaussian density per landmark range and one for the heading, evaluated
//! against the agent's reference observation.

use std::f64::consts::PI;

use itertools::Itertools;

use crate::common::{Landmarks, Pose2D};

/// Gaussian probability density N(mean, sigma) evaluated at x
pub fn gaussian_pdf(mean: f64, sigma: f64, x: f64) -> f64 {
    let coeff = 1.0 / (2.0 * PI * sigma.powi(2)).sqrt();
    coeff * (-(x - mean).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Natural log of [`gaussian_pdf`]
pub fn log_gaussian_pdf(mean: f64, sigma: f64, x: f64) -> f64 {
    -(x - mean).powi(2) / (2.0 * sigma.powi(2)) - 0.5 * (2.0 * PI * sigma.powi(2)).ln()
}

/// Ranges to every landmark, in landmark order, as seen from one pose
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub ranges: Vec<f64>,
    pub heading: f64,
}

/// Range sensor against a fixed landmark set
#[derive(Debug, Clone)]
pub struct ObservationModel {
    landmarks: Landmarks,
}

impl ObservationModel {
    pub fn new(landmarks: Landmarks) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    /// Euclidean range to each landmark plus `measurement_noise`
    pub fn observe(&self, pose: &Pose2D, measurement_noise: f64) -> Observation {
        let origin = pose.position();
        let ranges = self
            .landmarks
            .iter()
            .map(|lm| origin.distance(lm) + measurement_noise)
            .collect();
        Observation { ranges, heading: pose.heading() }
    }
}

/// Gaussian likelihood of a predicted observation given the reference one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodModel {
    pub distance_sigma: f64,
    pub heading_sigma: f64,
}

impl LikelihoodModel {
    pub fn new(distance_sigma: f64, heading_sigma: f64) -> Self {
        Self { distance_sigma, heading_sigma }
    }

    /// Sum of per-term log densities.
    ///
    /// The heading term compares raw canonical headings, matching the
    /// direct-product weight.
    pub fn log_likelihood(&self, predicted: &Observation, reference: &Observation) -> f64 {
        let ranges: f64 = reference
            .ranges
            .iter()
            .zip_eq(predicted.ranges.iter())
            .map(|(&r, &p)| log_gaussian_pdf(r, self.distance_sigma, p))
            .sum();
        ranges + log_gaussian_pdf(reference.heading, self.heading_sigma, predicted.heading)
    }

    /// Importance weight; may underflow to 0 when every term is tiny
    pub fn weight(&self, predicted: &Observation, reference: &Observation) -> f64 {
        self.log_likelihood(predicted, reference).exp()
    }

    /// Largest weight attainable with `n_landmarks` landmarks
    pub fn peak_weight(&self, n_landmarks: usize) -> f64 {
        gaussian_pdf(0.0, self.distance_sigma, 0.0).powi(n_landmarks as i32)
            * gaussian_pdf(0.0, self.heading_sigma, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn landmarks() -> Landmarks {
        Landmarks::from_xy(&[(20.0, 30.0), (50.0, 50.0), (80.0, 20.0)])
    }

    #[test]
    fn test_gaussian_pdf_peak() {
        let sigma = 2.0;
        assert_relative_eq!(gaussian_pdf(0.0, sigma, 0.0), 1.0 / (2.0 * PI * 4.0).sqrt());
        assert!(gaussian_pdf(0.0, sigma, 1.0) < gaussian_pdf(0.0, sigma, 0.0));
        assert_relative_eq!(gaussian_pdf(3.0, sigma, 4.0), gaussian_pdf(3.0, sigma, 2.0));
    }

    #[test]
    fn test_log_pdf_matches_pdf() {
        for &(m, s, x) in &[(0.0, 1.0, 0.5), (10.0, 3.0, 4.0), (-2.0, 0.5, -2.2)] {
            assert_relative_eq!(log_gaussian_pdf(m, s, x).exp(), gaussian_pdf(m, s, x), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_observe_ordered_ranges() {
        let model = ObservationModel::new(landmarks());
        let obs = model.observe(&Pose2D::new(50.0, 50.0, 0.0), 0.0);
        assert_eq!(obs.ranges.len(), 3);
        assert_abs_diff_eq!(obs.ranges[0], (30.0_f64.powi(2) + 20.0_f64.powi(2)).sqrt(), epsilon = 1e-12);
        assert_eq!(obs.ranges[1], 0.0);
        assert_abs_diff_eq!(obs.ranges[2], (30.0_f64.powi(2) + 30.0_f64.powi(2)).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_measurement_noise_added_to_every_range() {
        let model = ObservationModel::new(landmarks());
        let pose = Pose2D::new(10.0, 10.0, 1.0);
        let clean = model.observe(&pose, 0.0);
        let noisy = model.observe(&pose, 1.5);
        for (c, n) in clean.ranges.iter().zip(noisy.ranges.iter()) {
            assert_abs_diff_eq!(n - c, 1.5, epsilon = 1e-12);
        }
        assert_eq!(noisy.heading, 1.0);
    }

    #[test]
    fn test_peak_likelihood() {
        let model = ObservationModel::new(landmarks());
        let likelihood = LikelihoodModel::new(3.0, 0.5);
        let obs = model.observe(&Pose2D::new(40.0, 60.0, 0.7), 0.0);

        let w = likelihood.weight(&obs, &obs);
        let expected = gaussian_pdf(0.0, 3.0, 0.0).powi(3) * gaussian_pdf(0.0, 0.5, 0.0);
        assert_relative_eq!(w, expected, max_relative = 1e-12);
        assert_relative_eq!(likelihood.peak_weight(3), expected, max_relative = 1e-12);

        let other = model.observe(&Pose2D::new(41.0, 60.0, 0.7), 0.0);
        assert!(likelihood.weight(&other, &obs) < w);
    }

    #[test]
    fn test_weight_matches_direct_product() {
        let model = ObservationModel::new(landmarks());
        let likelihood = LikelihoodModel::new(5.0, 1.0);
        let reference = model.observe(&Pose2D::new(50.0, 50.0, 0.0), 0.0);
        let predicted = model.observe(&Pose2D::new(53.0, 47.0, 0.2), 0.5);

        let mut direct = 1.0;
        for (r, p) in reference.ranges.iter().zip(predicted.ranges.iter()) {
            direct *= gaussian_pdf(*r, 5.0, *p);
        }
        direct *= gaussian_pdf(reference.heading, 1.0, predicted.heading);

        assert_relative_eq!(likelihood.weight(&predicted, &reference), direct, max_relative = 1e-9);
    }

    #[test]
    fn test_tiny_sigma_underflows_to_zero() {
        let model = ObservationModel::new(landmarks());
        let likelihood = LikelihoodModel::new(1e-9, 1.0);
        let reference = model.observe(&Pose2D::new(50.0, 50.0, 0.0), 0.0);
        let predicted = model.observe(&Pose2D::new(60.0, 50.0, 0.0), 0.0);
        let w = likelihood.weight(&predicted, &reference);
        assert_eq!(w, 0.0);
        assert!(w.is_finite());
    }
}
