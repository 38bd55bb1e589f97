//! Points, strokes and the small pieces of planar geometry shared by the simplifier and the fitter.

use approx::AbsDiffEq;
use nalgebra::Vector2;
use std::ops::{Deref, DerefMut};

/// A single sample of a stroke.
pub type Point2D = Vector2<f64>;

/// Compares two points component wise, allowing each coordinate to differ by up to `epsilon`.
pub fn approx_eq(a: &Point2D, b: &Point2D, epsilon: f64) -> bool {
    a.abs_diff_eq(b, epsilon)
}

/// Ordered list of points in the order they were drawn.
///
/// Consecutive duplicates are kept as they are.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PointSequence(pub Vec<Point2D>);

impl PointSequence {
    /// Creates an empty sequence
    pub fn new() -> Self {
        PointSequence(Vec::new())
    }

    /// Builds a sequence from `(x, y)` pairs
    pub fn from_xy<I: IntoIterator<Item = (f64, f64)>>(coordinates: I) -> Self {
        coordinates
            .into_iter()
            .map(|(x, y)| Point2D::new(x, y))
            .collect()
    }

    /// Checks whether both sequences have the same length and pairwise [`approx_eq`] points.
    pub fn approx_eq(&self, other: &[Point2D], epsilon: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| approx_eq(a, b, epsilon))
    }

    /// Sum of the distances between consecutive points
    pub fn length(&self) -> f64 {
        self.windows(2).map(|pair| (pair[1] - pair[0]).norm()).sum()
    }
}

impl Deref for PointSequence {
    type Target = Vec<Point2D>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for PointSequence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Point2D>> for PointSequence {
    fn from(points: Vec<Point2D>) -> Self {
        PointSequence(points)
    }
}
impl From<&[Point2D]> for PointSequence {
    fn from(points: &[Point2D]) -> Self {
        PointSequence(points.to_vec())
    }
}
impl From<PointSequence> for Vec<Point2D> {
    fn from(points: PointSequence) -> Self {
        points.0
    }
}
impl FromIterator<Point2D> for PointSequence {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        PointSequence(iter.into_iter().collect())
    }
}
impl IntoIterator for PointSequence {
    type Item = Point2D;
    type IntoIter = std::vec::IntoIter<Point2D>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
impl<'a> IntoIterator for &'a PointSequence {
    type Item = &'a Point2D;
    type IntoIter = std::slice::Iter<'a, Point2D>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Distance from `point` to the infinite line through `start` and `end`.
///
/// If `start` and `end` coincide, there is no line and the plain distance to `start` is returned.
pub fn perpendicular_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    let direction = end - start;
    let length = direction.norm();
    if length <= f64::EPSILON {
        return (point - start).norm();
    }

    // |cross(direction, point - start)| is the parallelogram's area
    let offset = point - start;
    (direction.x * offset.y - direction.y * offset.x).abs() / length
}

/// Normalizes `vector` or returns `None` if it is too short (or not finite) to have a direction.
pub fn unit_vector(vector: &Vector2<f64>) -> Option<Vector2<f64>> {
    if vector.iter().all(|c| c.is_finite()) {
        vector.try_normalize(f64::EPSILON)
    } else {
        None
    }
}

/// Rotates `vector` by 90 degrees counter clock wise
pub fn perpendicular(vector: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-vector.y, vector.x)
}

/// Chord-length parameterizes a set of points.
///
/// Each point gets the distance travelled along the polyline up to it, divided by the total
/// length, so the first point maps to `0` and the last one to `1`.
/// Returns `None` if all points coincide.
pub fn chord_parameters(points: &[Point2D]) -> Option<Vec<f64>> {
    let mut parameters = Vec::with_capacity(points.len());
    let mut total = 0.0;

    parameters.push(total);
    for pair in points.windows(2) {
        total += (pair[1] - pair[0]).norm();
        parameters.push(total);
    }

    if !(total > 0.0) {
        return None;
    }
    for u in parameters.iter_mut() {
        *u /= total;
    }
    // Rounding might leave the last value slightly off
    if let Some(last) = parameters.last_mut() {
        *last = 1.0;
    }
    Some(parameters)
}
