//! Divergence between the belief's mean pose and the true agent pose

use crate::common::{angle_difference, Pose2D};

/// Per-axis absolute error after one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divergence {
    pub tick: u64,
    pub dx: f64,
    pub dy: f64,
    /// Shortest angular distance, radians
    pub dheading: f64,
}

impl Divergence {
    pub fn between(tick: u64, estimate: &Pose2D, truth: &Pose2D) -> Self {
        Self {
            tick,
            dx: (estimate.x - truth.x).abs(),
            dy: (estimate.y - truth.y).abs(),
            dheading: angle_difference(estimate.heading(), truth.heading()),
        }
    }

    /// Euclidean position error
    pub fn position_error(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Summary of one axis over a run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisSummary {
    pub mean: f64,
    pub max: f64,
}

impl AxisSummary {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (n, sum, max) = values.fold((0usize, 0.0, 0.0_f64), |(n, sum, max), v| (n + 1, sum + v, max.max(v)));
        if n == 0 {
            return Self::default();
        }
        Self { mean: sum / n as f64, max }
    }
}

/// Time series recorded by diagnostic mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivergenceSeries {
    records: Vec<Divergence>,
}

impl DivergenceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { records: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, d: Divergence) {
        self.records.push(d);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Divergence] {
        &self.records
    }

    pub fn last(&self) -> Option<&Divergence> {
        self.records.last()
    }

    pub fn ticks(&self) -> Vec<f64> {
        self.records.iter().map(|d| d.tick as f64).collect()
    }

    pub fn dx(&self) -> Vec<f64> {
        self.records.iter().map(|d| d.dx).collect()
    }

    pub fn dy(&self) -> Vec<f64> {
        self.records.iter().map(|d| d.dy).collect()
    }

    pub fn dheading(&self) -> Vec<f64> {
        self.records.iter().map(|d| d.dheading).collect()
    }

    pub fn summary_x(&self) -> AxisSummary {
        AxisSummary::of(self.records.iter().map(|d| d.dx))
    }

    pub fn summary_y(&self) -> AxisSummary {
        AxisSummary::of(self.records.iter().map(|d| d.dy))
    }

    pub fn summary_heading(&self) -> AxisSummary {
        AxisSummary::of(self.records.iter().map(|d| d.dheading))
    }
}
