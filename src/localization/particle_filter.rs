//! Monte Carlo Localization against known landmarks
//!
//! The filter owns the true agent pose, the particle population and the
//! landmark set. One [`ParticleFilter::tick`] moves the agent and every
//! particle with the same control, weights each particle by how well its
//! landmark ranges and heading match the agent's, and replaces the population
//! with a resampled generation of the same size.

use std::fmt::{self, Debug};
use std::sync::Arc;

use log::{debug, info, warn};
use nalgebra::{Matrix3, Vector3};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{
    canonicalize_angle, ControlInput, Landmarks, LocalizationResult, Pose2D, PoseEstimator, Resampler,
};
use crate::config::{FilterConfig, Range};

use super::controls::RandomWalk;
use super::diagnostics::{Divergence, DivergenceSeries};
use super::motion_model::MotionModel;
use super::noise::NoiseModel;
use super::observation_model::{LikelihoodModel, ObservationModel};
use super::particle::Particle;
use super::resampling::{effective_sample_size, normalize_weights, resample};

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// 1-based index of the tick just completed
    pub tick: u64,
    /// Effective sample size of the weighted generation, before resampling
    pub effective_sample_size: f64,
    /// Largest normalized weight before resampling
    pub max_weight: f64,
    /// Weights summed to zero or a non-finite value and were reset to uniform
    pub uniform_fallback: bool,
}

/// Owned point-in-time copy of the filter state
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefSnapshot {
    pub tick: u64,
    pub agent: Pose2D,
    pub particles: Vec<Particle>,
}

impl BeliefSnapshot {
    /// Unweighted mean pose of the snapshot's particles
    pub fn mean_pose(&self) -> Pose2D {
        mean_pose(self.particles.iter().map(|p| (&p.pose, 1.0)))
    }
}

/// Particle filter orchestrator
pub struct ParticleFilter {
    config: FilterConfig,
    agent: Pose2D,
    particles: Vec<Particle>,
    motion: MotionModel,
    observation: ObservationModel,
    likelihood: LikelihoodModel,
    noise: NoiseModel,
    rng: StdRng,
    tick: u64,
}

impl Debug for ParticleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleFilter")
            .field("tick", &self.tick)
            .field("agent", &self.agent)
            .field("particle_count", &self.particles.len())
            .field("landmarks", &self.observation.landmarks().len())
            .field("resampling", &self.config.resampling)
            .finish()
    }
}

impl ParticleFilter {
    /// Build a filter from a validated configuration.
    ///
    /// Particles start uniformly over the world with headings drawn from
    /// `initial_heading`, and each gets its first noise sample.
    pub fn new(config: FilterConfig) -> LocalizationResult<Self> {
        config.validate()?;
        let landmarks = config.build_landmarks();
        let noise = NoiseModel::new(config.noise)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut pf = Self {
            agent: config.agent_start,
            particles: Vec::with_capacity(config.particle_count),
            motion: MotionModel::new(config.world),
            observation: ObservationModel::new(landmarks),
            likelihood: LikelihoodModel::new(config.distance_sigma, config.heading_sigma),
            noise,
            rng,
            tick: 0,
            config,
        };
        pf.particles = pf.create_particles();

        info!(
            "Particle filter ready: {} particles, {} landmarks, world {}x{}, {:?} resampling",
            pf.particles.len(),
            pf.observation.landmarks().len(),
            pf.config.world.width,
            pf.config.world.height,
            pf.config.resampling
        );
        Ok(pf)
    }

    fn create_particles(&mut self) -> Vec<Particle> {
        let n = self.config.particle_count;
        let x_range = Range::new(0.0, self.config.world.width);
        let y_range = Range::new(0.0, self.config.world.height);
        let heading_range = self.config.initial_heading;
        let weight = 1.0 / n as f64;

        (0..n)
            .map(|_| {
                let x = x_range.sample(&mut self.rng);
                let y = y_range.sample(&mut self.rng);
                let heading = heading_range.sample(&mut self.rng);
                let noise = self.noise.sample(&mut self.rng);
                Particle::new(Pose2D::new(x, y, heading), weight, noise)
            })
            .collect()
    }

    /// One predict-weight-resample cycle with the configured strategy
    pub fn tick(&mut self, control: ControlInput) -> TickReport {
        let strategy = self.config.resampling;
        self.tick_with(control, &strategy)
    }

    /// One predict-weight-resample cycle with an explicit resampler
    pub fn tick_with<S: Resampler>(&mut self, control: ControlInput, resampler: &S) -> TickReport {
        self.tick += 1;

        // Predict
        let agent_noise = self.noise.sample(&mut self.rng);
        self.agent = self.motion.apply(&self.agent, &control, &agent_noise);
        for particle in &mut self.particles {
            particle.pose = self.motion.apply(&particle.pose, &control, &particle.noise);
        }

        // Weight
        let reference = self.observation.observe(&self.agent, agent_noise.measurement);
        for particle in &mut self.particles {
            let predicted = self.observation.observe(&particle.pose, particle.noise.measurement);
            particle.weight = self.likelihood.weight(&predicted, &reference);
        }

        // Resample
        let resampled = resample(&self.particles, resampler, &self.noise, &mut self.rng);
        debug_assert_eq!(resampled.particles.len(), self.particles.len());
        self.particles = resampled.particles;

        let report = TickReport {
            tick: self.tick,
            effective_sample_size: effective_sample_size(&resampled.weights),
            max_weight: resampled.weights.iter().copied().fold(0.0, f64::max),
            uniform_fallback: resampled.uniform_fallback,
        };
        if report.uniform_fallback {
            debug!("tick {}: weights degenerate, resampled from uniform", self.tick);
        }
        debug!(
            "tick {}: agent ({:.2}, {:.2}, {:.3}) n_eff {:.1}",
            self.tick,
            self.agent.x,
            self.agent.y,
            self.agent.heading(),
            report.effective_sample_size
        );
        report
    }

    /// Run exactly `diagnostic_ticks` ticks, recording the divergence
    /// between the mean pose and the true pose after each one.
    ///
    /// Stops early only if `controls` runs out.
    pub fn run_diagnostic<I>(&mut self, controls: I) -> DivergenceSeries
    where
        I: IntoIterator<Item = ControlInput>,
    {
        let k = self.config.diagnostic_ticks;
        info!("Diagnostic run: {} ticks", k);

        let mut series = DivergenceSeries::with_capacity(k);
        for control in controls.into_iter().take(k) {
            self.tick(control);
            series.push(self.divergence());
        }
        if series.len() < k {
            warn!("Control source ended after {} of {} diagnostic ticks", series.len(), k);
        }
        if let Some(last) = series.last() {
            info!(
                "Diagnostic run done: final |dx| {:.3}, |dy| {:.3}, |dheading| {:.4}",
                last.dx, last.dy, last.dheading
            );
        }
        series
    }

    /// Random walk over the configured control ranges, seeded from this
    /// filter's RNG so seeded filters stay reproducible
    pub fn random_walk(&mut self) -> RandomWalk {
        RandomWalk::new(self.config.controls, self.rng.gen())
    }

    /// Divergence of the current mean pose from the true pose
    pub fn divergence(&self) -> Divergence {
        Divergence::between(self.tick, &self.mean_pose(), &self.agent)
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn agent(&self) -> &Pose2D {
        &self.agent
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn landmarks(&self) -> &Landmarks {
        self.observation.landmarks()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Owned copy of the current belief and agent pose
    pub fn snapshot(&self) -> Arc<BeliefSnapshot> {
        Arc::new(BeliefSnapshot {
            tick: self.tick,
            agent: self.agent,
            particles: self.particles.clone(),
        })
    }

    /// Unweighted mean pose; heading is the circular mean
    pub fn mean_pose(&self) -> Pose2D {
        mean_pose(self.particles.iter().map(|p| (&p.pose, 1.0)))
    }

    /// Weight-averaged mean pose
    pub fn weighted_mean_pose(&self) -> Pose2D {
        let weights = self.normalized_weights();
        mean_pose(self.particles.iter().zip(weights).map(|(p, w)| (&p.pose, w)))
    }

    /// Population covariance of (x, y, heading) about the mean pose
    pub fn covariance(&self) -> Matrix3<f64> {
        let mean = self.mean_pose();
        let n = self.particles.len() as f64;
        let mut cov = Matrix3::zeros();
        for particle in &self.particles {
            let d = Vector3::new(
                particle.pose.x - mean.x,
                particle.pose.y - mean.y,
                canonicalize_angle(particle.pose.heading() - mean.heading()),
            );
            cov += d * d.transpose();
        }
        cov / n
    }

    /// Effective sample size of the current weights
    pub fn effective_sample_size(&self) -> f64 {
        effective_sample_size(&self.normalized_weights())
    }

    /// Highest-weight particle
    pub fn best_particle(&self) -> Option<&Particle> {
        self.particles.iter().max_by_key(|p| OrderedFloat(p.weight))
    }

    fn normalized_weights(&self) -> Vec<f64> {
        let mut weights: Vec<f64> = self.particles.iter().map(|p| p.weight).collect();
        normalize_weights(&mut weights);
        weights
    }
}

impl PoseEstimator for ParticleFilter {
    fn estimate(&self) -> Pose2D {
        self.mean_pose()
    }
}

fn mean_pose<'a, I>(poses: I) -> Pose2D
where
    I: Iterator<Item = (&'a Pose2D, f64)>,
{
    let (mut sx, mut sy, mut ss, mut sc, mut sw) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (pose, w) in poses {
        sx += w * pose.x;
        sy += w * pose.y;
        ss += w * pose.heading().sin();
        sc += w * pose.heading().cos();
        sw += w;
    }
    if sw <= 0.0 {
        return Pose2D::origin();
    }
    Pose2D::new(sx / sw, sy / sw, ss.atan2(sc))
}
