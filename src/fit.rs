//! Fits chains of cubic bezier segments to a stroke.
//!
//! Algorithm from Philip J. Schneider, "An Algorithm for Automatically Fitting Digitized Curves",
//! Graphics Gems:
//!
//! 1. Assign every point a parameter by its chord length.
//! 2. Solve for the two control points by least squares, keeping the end points and the
//!    directions of the end tangents fixed.
//! 3. Measure the distance between every point and the curve.
//! 4. If the fit is close, move the parameters towards the closest points and try again.
//! 5. Otherwise split at the worst point and fit both halves, joined by a shared tangent.

use log::{debug, trace};
use nalgebra::{Matrix2, Vector2};
use std::ops::Deref;

use crate::bezier::BezierSegment;
use crate::bounding_box::BoundingBox;
use crate::error::{check_non_negative, FitError, Result};
use crate::point::{chord_parameters, perpendicular, unit_vector, Point2D};

/// Maximum number of re-parameterizations to perform when trying to improve a fit
const MAX_ITERATIONS: usize = 4;

/// How far out of the error bounds a fit can be (as a ratio of the maximum error) and still get improved
const FIT_ATTEMPT_RATIO: f64 = 4.0;

/// Relative size below which the least-squares system counts as singular
const SINGULAR_EPSILON: f64 = 1.0e-12;

/// Tangent magnitudes below this fraction of the chord are rejected
const ALPHA_EPSILON: f64 = 1.0e-6;

/// Relative length below which the two neighbours of a split point count as coincident
const CENTER_TANGENT_EPSILON: f64 = 1.0e-9;

/// Chain of cubic segments where each segment starts exactly where the previous one ends.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FittedCurve(pub Vec<BezierSegment>);

impl FittedCurve {
    /// The segments in drawing order
    pub fn segments(&self) -> &[BezierSegment] {
        &self.0
    }

    /// Start of the first segment
    pub fn start_point(&self) -> Option<Point2D> {
        self.0.first().map(BezierSegment::start_point)
    }

    /// End of the last segment
    pub fn end_point(&self) -> Option<Point2D> {
        self.0.last().map(BezierSegment::end_point)
    }

    /// Checks that consecutive segments share their end points exactly
    pub fn is_continuous(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[0].end_point() == pair[1].start_point())
    }

    /// Box around all segments' points
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.0
            .iter()
            .map(BezierSegment::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// Distance between `point` and the closest point on any of the segments.
    ///
    /// Each segment is scanned coarsely and every local minimum of the scan is refined,
    /// so unlike [`BezierSegment::distance_to`] no parameter estimate is needed.
    pub fn distance_to(&self, point: &Point2D) -> f64 {
        self.0
            .iter()
            .map(|segment| scan_distance(segment, point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest [`distance_to`](FittedCurve::distance_to) over all `points`
    pub fn max_distance(&self, points: &[Point2D]) -> f64 {
        points
            .iter()
            .map(|point| self.distance_to(point))
            .fold(0.0, f64::max)
    }
}

impl Deref for FittedCurve {
    type Target = Vec<BezierSegment>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for FittedCurve {
    type Item = BezierSegment;
    type IntoIter = std::vec::IntoIter<BezierSegment>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Smallest distance between `point` and `segment` reached from any local minimum of a coarse scan
fn scan_distance(segment: &BezierSegment, point: &Point2D) -> f64 {
    const SCAN_STEPS: usize = 32;

    let mut distances = [0.0; SCAN_STEPS + 1];
    for (i, distance) in distances.iter_mut().enumerate() {
        *distance = (segment.point_at(i as f64 / SCAN_STEPS as f64) - point).norm_squared();
    }

    // A loop can bring several parts of the segment close to the point
    let mut best = f64::INFINITY;
    for i in 0..=SCAN_STEPS {
        let falling = i == 0 || distances[i] <= distances[i - 1];
        let rising = i == SCAN_STEPS || distances[i] <= distances[i + 1];
        if falling && rising {
            best = best.min(segment.distance_to(point, i as f64 / SCAN_STEPS as f64));
        }
    }
    best
}

/// Fits a chain of cubic bezier segments to `points`, so that no point is further than `max_error`
/// away from the chain.
///
/// The tangents at both ends are estimated from the first and last few points.
pub fn fit_curve(points: &[Point2D], max_error: f64) -> Result<FittedCurve> {
    fit_curve_with_tangents(points, max_error, None, None)
}

/// Same as [`fit_curve`] but lets the caller choose the tangents at the ends.
///
/// Both tangents point in the direction of travel: `start_tangent` away from the first point,
/// `end_tangent` into the last one. Their length doesn't matter. Missing tangents, or ones
/// without a direction, are estimated from the points.
///
/// Fails with [`FitError::InvalidArgument`] for fewer than two points, non-finite coordinates
/// or a negative `max_error`.
pub fn fit_curve_with_tangents(
    points: &[Point2D],
    max_error: f64,
    start_tangent: Option<Vector2<f64>>,
    end_tangent: Option<Vector2<f64>>,
) -> Result<FittedCurve> {
    if points.len() < 2 {
        return Err(FitError::InvalidArgument(format!(
            "at least 2 points are needed to fit a curve, got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
        return Err(FitError::InvalidArgument(format!(
            "point {} has a non-finite coordinate",
            i
        )));
    }
    check_non_negative("max_error", max_error)?;

    let first = points[0];
    if points.iter().all(|p| *p == first) {
        debug!("all {} points coincide, fitting a single point", points.len());
        return Ok(FittedCurve(vec![BezierSegment::degenerate(first)]));
    }

    // Internally the end tangent points back into the curve
    let start = start_tangent
        .and_then(|t| unit_vector(&t))
        .or_else(|| estimate_end_tangent(points.iter()))
        .unwrap_or_else(Vector2::x);
    let end = end_tangent
        .and_then(|t| unit_vector(&t))
        .map(|t| -t)
        .or_else(|| estimate_end_tangent(points.iter().rev()))
        .unwrap_or_else(|| -Vector2::x());

    let mut segments = Vec::new();
    fit_cubic(points, &start, &end, max_error, &mut segments);

    debug!(
        "fitted {} points with {} segments (max error {})",
        points.len(),
        segments.len(),
        max_error
    );
    Ok(FittedCurve(segments))
}

/// Fits a chain of segments to a range of points, appending them to `segments`.
///
/// `start_tangent` points away from the first point, `end_tangent` away from the last one
/// (back into the curve). Both are unit vectors.
fn fit_cubic(
    points: &[Point2D],
    start_tangent: &Vector2<f64>,
    end_tangent: &Vector2<f64>,
    max_error: f64,
    segments: &mut Vec<BezierSegment>,
) {
    let len = points.len();
    if len <= 2 {
        segments.push(fit_two_points(&points[0], &points[len - 1], start_tangent, end_tangent));
        return;
    }

    // Find the initial set of chords (estimates for where the t values for each of the points are)
    let mut parameters = match chord_parameters(points) {
        Some(parameters) => parameters,
        None => {
            segments.push(BezierSegment::degenerate(points[0]));
            return;
        }
    };

    // Use the least-squares method to fit against the initial set of chords
    let mut curve = generate_bezier(points, &parameters, start_tangent, end_tangent);
    let (mut error, mut split) = max_error_for_curve(points, &parameters, &curve);

    // Try iterating to improve the fit if we're not too far out
    if error > max_error && error <= max_error * FIT_ATTEMPT_RATIO {
        for iteration in 0..MAX_ITERATIONS {
            parameters = reparameterize(points, &parameters, &curve);
            curve = generate_bezier(points, &parameters, start_tangent, end_tangent);
            (error, split) = max_error_for_curve(points, &parameters, &curve);

            trace!(
                "re-parameterization {} over {} points: error {}",
                iteration + 1,
                len,
                error
            );
            if error <= max_error {
                break;
            }
        }
    }

    if error <= max_error {
        segments.push(curve);
        return;
    }

    if len == 3 {
        // Nothing left to improve on: pass through the middle point
        trace!("splitting 3 points at the middle one (error {})", error);
        let center = center_tangent(&points[0], &points[1], &points[2]);
        segments.push(fit_two_points(&points[0], &points[1], start_tangent, &center));
        segments.push(fit_two_points(&points[1], &points[2], &-center, end_tangent));
        return;
    }

    if split == 0 || split >= len - 1 {
        split = middle_index(&parameters);
    }
    trace!("splitting {} points at {} (error {})", len, split, error);

    let center = center_tangent(&points[split - 1], &points[split], &points[split + 1]);
    fit_cubic(&points[..=split], start_tangent, &center, max_error, segments);
    fit_cubic(&points[split..], &-center, end_tangent, max_error, segments);
}

/// Generates a bezier curve using the least-squares method
///
/// Only the distances of the control points along the fixed tangents are solved for.
/// If that fails, the control points are placed a third of the chord along the tangents instead.
fn generate_bezier(
    points: &[Point2D],
    parameters: &[f64],
    start_tangent: &Vector2<f64>,
    end_tangent: &Vector2<f64>,
) -> BezierSegment {
    let first = points[0];
    let last = points[points.len() - 1];

    // Create the 'C' and 'X' matrices
    let mut c = Matrix2::<f64>::zeros();
    let mut x = Vector2::<f64>::zeros();

    for (point, &u) in points.iter().zip(parameters.iter()) {
        let [b0, b1, b2, b3] = bernstein(u);
        let a1 = start_tangent * b1;
        let a2 = end_tangent * b2;

        c[(0, 0)] += a1.dot(&a1);
        c[(0, 1)] += a1.dot(&a2);
        c[(1, 1)] += a2.dot(&a2);

        let tmp = point - (first * (b0 + b1) + last * (b2 + b3));
        x[0] += a1.dot(&tmp);
        x[1] += a2.dot(&tmp);
    }
    c[(1, 0)] = c[(0, 1)];

    let alphas = if c.determinant().abs() > SINGULAR_EPSILON * c[(0, 0)] * c[(1, 1)] {
        c.try_inverse().map(|inverse| inverse * x)
    } else {
        None
    };

    let chord = (last - first).norm();
    let epsilon = ALPHA_EPSILON * chord;
    match alphas {
        Some(alpha)
            if alpha[0] >= epsilon && alpha[1] >= epsilon && alpha.iter().all(|a| a.is_finite()) =>
        {
            // The control points are positioned an alpha distance out along the tangent vectors
            BezierSegment::from_points(
                first,
                first + start_tangent * alpha[0],
                last + end_tangent * alpha[1],
                last,
            )
        }
        _ => {
            // Much less accurate means of estimating a curve
            let distance = chord / 3.0;
            BezierSegment::from_points(
                first,
                first + start_tangent * distance,
                last + end_tangent * distance,
                last,
            )
        }
    }
}

/// Connects two points with their control points a third of the chord out along the tangents
fn fit_two_points(
    first: &Point2D,
    last: &Point2D,
    start_tangent: &Vector2<f64>,
    end_tangent: &Vector2<f64>,
) -> BezierSegment {
    let distance = (last - first).norm() / 3.0;
    BezierSegment::from_points(
        *first,
        first + start_tangent * distance,
        last + end_tangent * distance,
        *last,
    )
}

/// The four cubic bernstein polynomials evaluated at `u`
fn bernstein(u: f64) -> [f64; 4] {
    let inv = 1.0 - u;
    [
        inv * inv * inv,
        3.0 * u * inv * inv,
        3.0 * u * u * inv,
        u * u * u,
    ]
}

/// Computes the maximum error for a curve fit against a given set of points
///
/// The parameters are the estimated t-values of the points and seed the closest point search.
/// Returns the maximum distance and the (lowest) index of the point with that distance.
fn max_error_for_curve(points: &[Point2D], parameters: &[f64], curve: &BezierSegment) -> (f64, usize) {
    let mut biggest_error_squared = 0.0;
    let mut biggest_error_offset = 0;

    for (i, (point, &u)) in points.iter().zip(parameters.iter()).enumerate() {
        let t = curve.nearest_parameter(point, u);
        let error_squared = (curve.point_at(t) - point).norm_squared();
        if error_squared > biggest_error_squared {
            biggest_error_squared = error_squared;
            biggest_error_offset = i;
        }
    }

    (biggest_error_squared.sqrt(), biggest_error_offset)
}

/// Applies the newton-raphson method in order to improve the t values of a curve
fn reparameterize(points: &[Point2D], parameters: &[f64], curve: &BezierSegment) -> Vec<f64> {
    points
        .iter()
        .zip(parameters.iter())
        .map(|(point, &u)| curve.newton_step(point, u))
        .collect()
}

/// Index of the point whose parameter is closest to `0.5`, never the first or last one
fn middle_index(parameters: &[f64]) -> usize {
    let last = parameters.len() - 1;
    let mut index = 1;
    for i in 2..last {
        if (parameters[i] - 0.5).abs() < (parameters[index] - 0.5).abs() {
            index = i;
        }
    }
    index
}

/// Estimates the unit tangent at the first point yielded by `points`, pointing towards the rest.
///
/// Uses the derivative of the parabola through the first three distinct points, parameterized
/// by chord length. With only two distinct points the direction between them is used.
/// Returns `None` if all points coincide.
fn estimate_end_tangent<'a, I>(mut points: I) -> Option<Vector2<f64>>
where
    I: Iterator<Item = &'a Point2D>,
{
    let p0 = *points.next()?;
    let p1 = *points.find(|p| **p != p0)?;
    let chord = p1 - p0;

    let p2 = match points.find(|p| **p != p1) {
        Some(p2) => *p2,
        None => return unit_vector(&chord),
    };

    // One sided second order difference for unevenly spaced samples
    let h1 = chord.norm();
    let h2 = (p2 - p1).norm();
    let derivative = p0 * (-(2.0 * h1 + h2) / (h1 * (h1 + h2)))
        + p1 * ((h1 + h2) / (h1 * h2))
        - p2 * (h1 / (h2 * (h1 + h2)));

    unit_vector(&derivative).or_else(|| unit_vector(&chord))
}

/// Estimates the tangent at `at`, pointing back towards `before`.
///
/// If the stroke turns around at `at`, the neighbours give no direction and a normal of the
/// incoming direction is used instead.
fn center_tangent(before: &Point2D, at: &Point2D, after: &Point2D) -> Vector2<f64> {
    let scale = (at - before).norm().max((after - at).norm());
    let direction = before - after;
    if direction.norm() > CENTER_TANGENT_EPSILON * scale {
        if let Some(tangent) = unit_vector(&direction) {
            return tangent;
        }
    }

    unit_vector(&perpendicular(&(at - before)))
        .or_else(|| unit_vector(&perpendicular(&(after - at))))
        .unwrap_or_else(Vector2::x)
}
