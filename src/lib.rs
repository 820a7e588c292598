//! landmark_mcl - Monte Carlo Localization against known landmarks
//!
//! A particle filter that tracks an agent moving in a bounded 2D world using
//! range observations to a fixed set of landmarks plus a heading reading.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod localization;

// Re-export common types for convenience
pub use common::{ControlInput, Landmarks, Point2D, Pose2D, WorldBounds};
pub use common::{PoseEstimator, Resampler};
pub use common::{LocalizationError, LocalizationResult};
pub use config::{generate_landmarks, FilterConfig, LandmarkSource, Range};
pub use localization::{BeliefSnapshot, ParticleFilter, ResamplingStrategy, TickReport};
