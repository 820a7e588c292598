//! Common types used throughout landmark_mcl

use std::f64::consts::PI;

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Reduce any angle to the canonical interval (-pi, pi].
///
/// Uses euclidean remainder so negative inputs wrap instead of truncating.
pub fn canonicalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// Absolute shortest angular distance between two headings, in [0, pi].
pub fn angle_difference(a: f64, b: f64) -> f64 {
    canonicalize_angle(a - b).abs()
}

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(xy: [f64; 2]) -> Self {
        Self { x: xy[0], y: xy[1] }
    }
}

/// 2D pose (position + heading)
///
/// Heading is in radians, counter-clockwise positive, and is kept in
/// (-pi, pi] by every constructor and mutator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseRecord", into = "PoseRecord")]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    heading: f64,
}

/// Serialized form of a pose; deserializing goes through `Pose2D::new`.
#[derive(Serialize, Deserialize)]
struct PoseRecord {
    x: f64,
    y: f64,
    heading: f64,
}

impl From<PoseRecord> for Pose2D {
    fn from(r: PoseRecord) -> Self {
        Pose2D::new(r.x, r.y, r.heading)
    }
}

impl From<Pose2D> for PoseRecord {
    fn from(p: Pose2D) -> Self {
        PoseRecord { x: p.x, y: p.y, heading: p.heading }
    }
}

impl Pose2D {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading: canonicalize_angle(heading) }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, heading: 0.0 }
    }

    /// Build a pose from a heading given in degrees
    pub fn from_degrees(x: f64, y: f64, heading_deg: f64) -> Self {
        Self::new(x, y, heading_deg.to_radians())
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees()
    }

    pub fn set_heading(&mut self, heading: f64) {
        self.heading = canonicalize_angle(heading);
    }

    /// Copy of this pose with a different heading
    pub fn with_heading(&self, heading: f64) -> Self {
        Self::new(self.x, self.y, heading)
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.heading)
    }
}

impl From<Vector3<f64>> for Pose2D {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Control input applied once per tick
///
/// `distance` is travelled along the current heading, then `rotation`
/// (radians, counter-clockwise positive) is added to the heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    pub distance: f64,
    pub rotation: f64,
}

impl ControlInput {
    pub fn new(distance: f64, rotation: f64) -> Self {
        Self { distance, rotation }
    }

    pub fn zero() -> Self {
        Self { distance: 0.0, rotation: 0.0 }
    }

    /// Build a control whose rotation is given in degrees
    pub fn from_degrees(distance: f64, rotation_deg: f64) -> Self {
        Self { distance, rotation: rotation_deg.to_radians() }
    }

    /// Pure forward motion
    pub fn forward(distance: f64) -> Self {
        Self { distance, rotation: 0.0 }
    }
}

/// Rectangular world `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp a position into the world rectangle
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self { width: 500.0, height: 500.0 }
    }
}

/// Ordered, immutable set of known landmarks
///
/// Range measurements are reported in the same order as the landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    points: Vec<Point2D>,
}

impl Landmarks {
    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    pub fn from_xy(xy: &[(f64, f64)]) -> Self {
        Self {
            points: xy.iter().map(|&p| Point2D::from(p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2D> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point2D] {
        &self.points
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

impl<'a> IntoIterator for &'a Landmarks {
    type Item = &'a Point2D;
    type IntoIter = std::slice::Iter<'a, Point2D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
