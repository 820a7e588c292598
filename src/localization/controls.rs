//! Control sources for the run modes
//!
//! Any `Iterator<Item = ControlInput>` drives the filter; [`RandomWalk`] is
//! the endless one used when nothing external supplies controls.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::ControlInput;
use crate::config::ControlConfig;

/// Endless random walk drawing distance and rotation uniformly from the
/// configured ranges
#[derive(Debug, Clone)]
pub struct RandomWalk {
    config: ControlConfig,
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(config: ControlConfig, seed: u64) -> Self {
        Self { config, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy(config: ControlConfig) -> Self {
        Self { config, rng: StdRng::from_entropy() }
    }
}

impl Iterator for RandomWalk {
    type Item = ControlInput;

    fn next(&mut self) -> Option<ControlInput> {
        let distance = self.config.distance.sample(&mut self.rng);
        let rotation = self.config.rotation.sample(&mut self.rng);
        Some(ControlInput::new(distance, rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Range;

    #[test]
    fn test_random_walk_in_range() {
        let config = ControlConfig {
            distance: Range::new(1.0, 3.0),
            rotation: Range::new(-0.2, 0.2),
        };
        for c in RandomWalk::new(config, 4).take(100) {
            assert!(c.distance >= 1.0 && c.distance <= 3.0);
            assert!(c.rotation >= -0.2 && c.rotation <= 0.2);
        }
    }

    #[test]
    fn test_random_walk_seeded() {
        let config = ControlConfig::default();
        let a: Vec<_> = RandomWalk::new(config, 8).take(5).collect();
        let b: Vec<_> = RandomWalk::new(config, 8).take(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_range_is_scripted() {
        let config = ControlConfig {
            distance: Range::constant(2.0),
            rotation: Range::constant(0.0),
        };
        assert!(RandomWalk::from_entropy(config).take(3).all(|c| c == ControlInput::forward(2.0)));
    }
}
