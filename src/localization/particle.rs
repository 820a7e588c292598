//! Weighted pose hypothesis

use std::fmt::{self, Display};

use crate::common::Pose2D;

use super::noise::NoiseSample;

/// A single particle: pose, importance weight, and the noise it carries
/// through the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pose: Pose2D,
    pub weight: f64,
    pub noise: NoiseSample,
}

impl Particle {
    pub fn new(pose: Pose2D, weight: f64, noise: NoiseSample) -> Self {
        Self { pose, weight, noise }
    }

    /// Offspring of this particle: same pose and weight, new noise
    pub fn offspring(&self, noise: NoiseSample) -> Self {
        Self { pose: self.pose, weight: self.weight, noise }
    }
}

impl Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.1} deg) w={:.3e}",
            self.pose.x,
            self.pose.y,
            self.pose.heading_degrees(),
            self.weight
        )
    }
}
