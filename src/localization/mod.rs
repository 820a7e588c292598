// Localization module: Monte Carlo Localization against known landmarks

pub mod controls;
pub mod diagnostics;
pub mod live;
pub mod motion_model;
pub mod noise;
pub mod observation_model;
pub mod particle;
pub mod particle_filter;
pub mod resampling;

// Re-exports
pub use controls::RandomWalk;
pub use diagnostics::{AxisSummary, Divergence, DivergenceSeries};
pub use live::{LiveHandle, SharedBelief};
pub use motion_model::MotionModel;
pub use noise::{NoiseConfig, NoiseModel, NoiseSample, NoiseSpec};
pub use observation_model::{gaussian_pdf, LikelihoodModel, Observation, ObservationModel};
pub use particle::Particle;
pub use particle_filter::{BeliefSnapshot, ParticleFilter, TickReport};
pub use resampling::{normalize_weights, resample, Multinomial, ResamplingStrategy, Systematic};
