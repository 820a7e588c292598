//! Translate-then-rotate motion model
//!
//! The same function advances the true agent and every particle, each with
//! its own [`NoiseSample`]. Positions are clamped into the world rectangle.

use crate::common::{canonicalize_angle, ControlInput, Pose2D, WorldBounds};

use super::noise::NoiseSample;

/// Motion model bound to a world rectangle
#[derive(Debug, Clone, Copy)]
pub struct MotionModel {
    world: WorldBounds,
}

impl MotionModel {
    pub fn new(world: WorldBounds) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &WorldBounds {
        &self.world
    }

    /// Advance `pose` by `control`, perturbed by `noise`.
    ///
    /// Translation follows the noise-perturbed heading; the rotation is
    /// applied to the stored heading.
    pub fn apply(&self, pose: &Pose2D, control: &ControlInput, noise: &NoiseSample) -> Pose2D {
        let travel_heading = canonicalize_angle(pose.heading() + noise.angular);

        let x = pose.x + control.distance * travel_heading.cos() + noise.linear;
        let y = pose.y + control.distance * travel_heading.sin() + noise.linear;
        let (x, y) = self.world.clamp(x, y);

        Pose2D::new(x, y, pose.heading() + control.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn model() -> MotionModel {
        MotionModel::new(WorldBounds::new(100.0, 100.0))
    }

    #[test]
    fn test_zero_noise_forward() {
        let pose = Pose2D::new(10.0, 20.0, 0.3);
        let moved = model().apply(&pose, &ControlInput::forward(5.0), &NoiseSample::zero());
        assert_eq!(moved.x, 10.0 + 5.0 * 0.3_f64.cos());
        assert_eq!(moved.y, 20.0 + 5.0 * 0.3_f64.sin());
        assert_eq!(moved.heading(), 0.3);
    }

    #[test]
    fn test_rotation_applies_after_translation() {
        let pose = Pose2D::new(50.0, 50.0, 0.0);
        let moved = model().apply(&pose, &ControlInput::new(2.0, PI / 2.0), &NoiseSample::zero());
        assert_abs_diff_eq!(moved.x, 52.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moved.y, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moved.heading(), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angular_noise_only_affects_translation() {
        let pose = Pose2D::new(50.0, 50.0, 0.0);
        let noise = NoiseSample { linear: 0.0, angular: PI / 2.0, measurement: 0.0 };
        let moved = model().apply(&pose, &ControlInput::forward(3.0), &noise);
        assert_abs_diff_eq!(moved.x, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moved.y, 53.0, epsilon = 1e-12);
        assert_eq!(moved.heading(), 0.0);
    }

    #[test]
    fn test_linear_noise_added_to_both_axes() {
        let pose = Pose2D::new(50.0, 50.0, 0.0);
        let noise = NoiseSample { linear: 0.5, angular: 0.0, measurement: 0.0 };
        let moved = model().apply(&pose, &ControlInput::forward(1.0), &noise);
        assert_abs_diff_eq!(moved.x, 51.5, epsilon = 1e-12);
        assert_abs_diff_eq!(moved.y, 50.5, epsilon = 1e-12);
    }

    #[test]
    fn test_clamped_at_bounds() {
        let pose = Pose2D::new(99.0, 1.0, -PI / 4.0);
        let moved = model().apply(&pose, &ControlInput::forward(10.0), &NoiseSample::zero());
        assert_eq!(moved.x, 100.0);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn test_heading_wraps() {
        let pose = Pose2D::new(50.0, 50.0, PI - 0.1);
        let moved = model().apply(&pose, &ControlInput::new(0.0, 0.3), &NoiseSample::zero());
        assert!(moved.heading() > -PI && moved.heading() <= PI);
        assert_abs_diff_eq!(moved.heading(), -PI + 0.2, epsilon = 1e-9);
    }
}
