//! Noise model shared by the agent and every particle
//!
//! Each tick draws one [`NoiseSample`] per pose: a linear offset added to the
//! translated position, an angular offset perturbing the heading used for
//! translation, and a measurement offset added to every landmark range.

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::common::{LocalizationError, LocalizationResult};

/// Distribution of one noise channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum NoiseSpec {
    /// Uniform over the closed interval `[min, max]`; `min == max` is a constant
    Uniform { min: f64, max: f64 },
    /// Normal with the given mean and standard deviation
    Gaussian { mean: f64, std_dev: f64 },
}

impl NoiseSpec {
    /// Zero-width interval at 0
    pub fn none() -> Self {
        NoiseSpec::Uniform { min: 0.0, max: 0.0 }
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        NoiseSpec::Uniform { min, max }
    }

    pub fn gaussian(mean: f64, std_dev: f64) -> Self {
        NoiseSpec::Gaussian { mean, std_dev }
    }

    fn validate(&self, name: &str) -> LocalizationResult<()> {
        match *self {
            NoiseSpec::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(LocalizationError::InvalidParameter(format!(
                        "{} noise range must be finite, got [{}, {}]",
                        name, min, max
                    )));
                }
                if min > max {
                    return Err(LocalizationError::InvalidParameter(format!(
                        "{} noise range is inverted: [{}, {}]",
                        name, min, max
                    )));
                }
                if !(max - min).is_finite() {
                    return Err(LocalizationError::InvalidParameter(format!(
                        "{} noise range is too wide to sample: [{}, {}]",
                        name, min, max
                    )));
                }
            }
            NoiseSpec::Gaussian { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(LocalizationError::InvalidParameter(format!(
                        "{} noise must have finite mean and non-negative std_dev, got N({}, {})",
                        name, mean, std_dev
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for NoiseSpec {
    fn default() -> Self {
        NoiseSpec::none()
    }
}

/// Ready-to-sample form of a validated [`NoiseSpec`]
#[derive(Debug, Clone, Copy)]
enum Sampler {
    Constant(f64),
    Uniform(Uniform<f64>),
    Normal(Normal<f64>),
}

impl Sampler {
    fn build(dist: &NoiseSpec, name: &str) -> LocalizationResult<Self> {
        dist.validate(name)?;
        Ok(match *dist {
            NoiseSpec::Uniform { min, max } if min == max => Sampler::Constant(min),
            NoiseSpec::Uniform { min, max } => Sampler::Uniform(Uniform::new_inclusive(min, max)),
            NoiseSpec::Gaussian { mean, std_dev } if std_dev == 0.0 => Sampler::Constant(mean),
            NoiseSpec::Gaussian { mean, std_dev } => Sampler::Normal(
                Normal::new(mean, std_dev)
                    .map_err(|e| LocalizationError::InvalidParameter(format!("{} noise: {}", name, e)))?,
            ),
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Constant(v) => *v,
            Sampler::Uniform(u) => u.sample(rng),
            Sampler::Normal(n) => n.sample(rng),
        }
    }
}

/// Per-tick noise triple carried by a pose hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseSample {
    /// Added to both x and y after translation
    pub linear: f64,
    /// Added to the heading used for translation only
    pub angular: f64,
    /// Added to every landmark range
    pub measurement: f64,
}

impl NoiseSample {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Configured noise for the three channels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub linear: NoiseSpec,
    pub angular: NoiseSpec,
    pub measurement: NoiseSpec,
}

impl NoiseConfig {
    /// All channels fixed at zero
    pub fn noiseless() -> Self {
        Self::default()
    }

    /// Check all three channels without building a model
    pub fn validate(&self) -> LocalizationResult<()> {
        self.linear.validate("linear")?;
        self.angular.validate("angular")?;
        self.measurement.validate("measurement")
    }
}

/// Samples [`NoiseSample`]s from a validated [`NoiseConfig`]
#[derive(Debug, Clone)]
pub struct NoiseModel {
    config: NoiseConfig,
    linear: Sampler,
    angular: Sampler,
    measurement: Sampler,
}

impl NoiseModel {
    pub fn new(config: NoiseConfig) -> LocalizationResult<Self> {
        Ok(Self {
            linear: Sampler::build(&config.linear, "linear")?,
            angular: Sampler::build(&config.angular, "angular")?,
            measurement: Sampler::build(&config.measurement, "measurement")?,
            config,
        })
    }

    /// Model that always yields zero noise
    pub fn noiseless() -> Self {
        Self {
            config: NoiseConfig::noiseless(),
            linear: Sampler::Constant(0.0),
            angular: Sampler::Constant(0.0),
            measurement: Sampler::Constant(0.0),
        }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Draw a fresh noise triple
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NoiseSample {
        NoiseSample {
            linear: self.linear.sample(rng),
            angular: self.angular.sample(rng),
            measurement: self.measurement.sample(rng),
        }
    }
}
