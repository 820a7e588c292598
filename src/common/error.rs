//! Error types for landmark_mcl

use thiserror::Error;

/// Main error type for localization
///
/// Only construction and configuration paths produce these. A running filter
/// recovers from numeric degeneracy on its own and never returns an error
/// from a tick.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Particle population must be non-empty
    #[error("Invalid particle count: {0} (must be > 0)")]
    InvalidParticleCount(usize),
    /// Landmark set must be non-empty
    #[error("Landmark set is empty")]
    EmptyLandmarks,
    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for localization operations
pub type LocalizationResult<T> = Result<T, LocalizationError>;
