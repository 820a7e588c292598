//! Filter configuration loaded from YAML
//!
//! Every option is scoped to one filter instance. Defaults are 100 particles
//! in a 500x500 world with five seeded landmarks.

use std::f64::consts::PI;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::common::{Landmarks, LocalizationError, LocalizationResult, Point2D, Pose2D, WorldBounds};
use crate::localization::noise::{NoiseConfig, NoiseSpec};
use crate::localization::resampling::ResamplingStrategy;

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Zero-width range
    pub fn constant(value: f64) -> Self {
        Self { min: value, max: value }
    }

    fn validate(&self, name: &str) -> LocalizationResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(LocalizationError::InvalidParameter(format!(
                "{} must be a finite range with min <= max, got [{}, {}]",
                name, self.min, self.max
            )));
        }
        if !(self.max - self.min).is_finite() {
            return Err(LocalizationError::InvalidParameter(format!(
                "{} is too wide to sample, got [{}, {}]",
                name, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Uniform draw from the closed interval
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Where the landmark set comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LandmarkSource {
    /// Explicit ordered list of `[x, y]` points
    Fixed { points: Vec<[f64; 2]> },
    /// `count` points drawn uniformly over the world from `seed`
    Generated { count: usize, seed: u64 },
}

impl LandmarkSource {
    pub fn fixed(points: &[(f64, f64)]) -> Self {
        LandmarkSource::Fixed {
            points: points.iter().map(|&(x, y)| [x, y]).collect(),
        }
    }

    /// Build the landmark set for the given world
    pub fn build(&self, world: &WorldBounds) -> Landmarks {
        match self {
            LandmarkSource::Fixed { points } => {
                Landmarks::from_points(points.iter().map(|&p| Point2D::from(p)).collect())
            }
            LandmarkSource::Generated { count, seed } => {
                generate_landmarks(*count, world.width, world.height, *seed)
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            LandmarkSource::Fixed { points } => points.len(),
            LandmarkSource::Generated { count, .. } => *count,
        }
    }
}

impl Default for LandmarkSource {
    fn default() -> Self {
        LandmarkSource::Generated { count: 5, seed: 45 }
    }
}

/// Generate `n` landmarks uniformly over `[0, width] x [0, height]`.
///
/// The same seed always yields the same ordered set.
pub fn generate_landmarks(n: usize, width: f64, height: f64, seed: u64) -> Landmarks {
    let mut rng = StdRng::seed_from_u64(seed);
    let points = (0..n)
        .map(|_| {
            let x = Range::new(0.0, width).sample(&mut rng);
            let y = Range::new(0.0, height).sample(&mut rng);
            Point2D::new(x, y)
        })
        .collect();
    Landmarks::from_points(points)
}

/// Random-walk control ranges used when no external controls are supplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub distance: Range,
    /// Radians per tick
    pub rotation: Range,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            distance: Range::new(0.0, 10.0),
            rotation: Range::new(-PI / 8.0, PI / 8.0),
        }
    }
}

/// Full particle filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Population size, fixed for the filter's lifetime
    pub particle_count: usize,
    pub world: WorldBounds,
    pub landmarks: LandmarkSource,
    /// Range tolerance of the likelihood
    pub distance_sigma: f64,
    /// Heading tolerance of the likelihood (radians)
    pub heading_sigma: f64,
    pub noise: NoiseConfig,
    /// Interval particle headings are drawn from at initialization
    pub initial_heading: Range,
    pub controls: ControlConfig,
    pub agent_start: Pose2D,
    pub resampling: ResamplingStrategy,
    /// Live mode cadence
    pub tick_interval_ms: u64,
    /// Number of ticks in diagnostic mode
    pub diagnostic_ticks: usize,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            world: WorldBounds::default(),
            landmarks: LandmarkSource::default(),
            distance_sigma: 3.0,
            heading_sigma: 3.0,
            noise: NoiseConfig {
                linear: NoiseSpec::uniform(-1.0, 1.0),
                angular: NoiseSpec::uniform(-0.05, 0.05),
                measurement: NoiseSpec::uniform(-1.0, 1.0),
            },
            initial_heading: Range::new(-PI, PI),
            controls: ControlConfig::default(),
            agent_start: Pose2D::new(250.0, 250.0, 0.0),
            resampling: ResamplingStrategy::default(),
            tick_interval_ms: 100,
            diagnostic_ticks: 50,
            seed: None,
        }
    }
}

impl FilterConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> LocalizationResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> LocalizationResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| LocalizationError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> LocalizationResult<String> {
        serde_yaml::to_string(self).map_err(|e| LocalizationError::Config(e.to_string()))
    }

    /// Check every option before a filter is built from it
    pub fn validate(&self) -> LocalizationResult<()> {
        if self.particle_count == 0 {
            return Err(LocalizationError::InvalidParticleCount(self.particle_count));
        }
        if self.landmarks.len() == 0 {
            return Err(LocalizationError::EmptyLandmarks);
        }
        if let LandmarkSource::Fixed { points } = &self.landmarks {
            if points.iter().flatten().any(|v| !v.is_finite()) {
                return Err(LocalizationError::InvalidParameter(
                    "landmark coordinates must be finite".to_string(),
                ));
            }
        }
        let world = &self.world;
        if !(world.width.is_finite() && world.height.is_finite() && world.width > 0.0 && world.height > 0.0) {
            return Err(LocalizationError::InvalidParameter(format!(
                "world must have positive finite size, got {} x {}",
                world.width, world.height
            )));
        }
        for (name, sigma) in [("distance_sigma", self.distance_sigma), ("heading_sigma", self.heading_sigma)] {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(LocalizationError::InvalidParameter(format!(
                    "{} must be positive and finite, got {}",
                    name, sigma
                )));
            }
        }
        self.noise.validate()?;
        self.initial_heading.validate("initial_heading")?;
        self.controls.distance.validate("controls.distance")?;
        self.controls.rotation.validate("controls.rotation")?;
        let start = &self.agent_start;
        if !(start.x.is_finite() && start.y.is_finite() && start.heading().is_finite()) {
            return Err(LocalizationError::InvalidParameter("agent_start must be finite".to_string()));
        }
        Ok(())
    }

    /// Landmark set described by this configuration
    pub fn build_landmarks(&self) -> Landmarks {
        self.landmarks.build(&self.world)
    }
}
