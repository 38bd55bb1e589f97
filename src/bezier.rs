//! A wrapper around [`nalgebra::Matrix`] interpreting it as a bezier curve,
//! and the cubic [`BezierSegment`] every fitted curve is made of.

use nalgebra::allocator::Allocator;
use nalgebra::dimension::{Const, Dim, DimDiff, DimName, DimSub, U1, U2, U4};
use nalgebra::storage::RawStorage;
use nalgebra::{
    DefaultAllocator, Matrix, Matrix2x4, OMatrix, OVector, Owned, RealField, Scalar, Storage,
    Vector2,
};
use std::fmt;

use crate::bounding_box::BoundingBox;
use crate::polynomial::Polynomial;
use crate::point::Point2D;

/// Number of newton steps used when searching for the closest point on a segment
const NEAREST_POINT_ITERATIONS: usize = 4;

/// Wrapper around [`nalgebra::Matrix`] interpreting it as a bezier curve.
///
/// The curve's control points are stored as the matrix' columns.
#[derive(Clone, Copy)]
pub struct BezierCurve<T, R, C, S>(pub Matrix<T, R, C, S>);

/// Wrapper around [`nalgebra::OMatrix`] interpreting it as a bezier curve.
pub type OBezierCurve<T, R, C> = BezierCurve<T, R, C, Owned<T, R, C>>;

/// A planar cubic bezier curve.
///
/// The columns are `P0, P1, P2, P3`: the curve starts in `P0`, ends in `P3` and
/// is pulled towards the two control points `P1` and `P2`.
pub type BezierSegment = OBezierCurve<f64, U2, U4>;

impl<T: RealField, R: Dim, C: Dim, S: Storage<T, R, C>> BezierCurve<T, R, C, S> {
    /// Get the curves degree
    ///
    /// For example a cubic curve has degree 3 and 4 control points
    pub fn degree(&self) -> usize {
        self.0.ncols() - 1
    }
}

impl<T: RealField, R: Dim, C: Dim, S: Storage<T, R, C>> BezierCurve<T, R, C, S>
where
    // Column arithemtic required in each step
    DefaultAllocator: Allocator<T, R, U1>,

    // Buffer to store intermediate steps in
    DefaultAllocator: Allocator<T, R, C>,
{
    /// Get the point on the curve at position `t`.
    ///
    /// This method uses de castlejau's algorithm.
    pub fn castlejau_eval(&self, t: T) -> OVector<T, R> {
        let t_inv = T::one() - t.clone();
        let ncols = self.0.ncols();

        let mut points = (&mut self.0.clone_owned(), &mut self.0.clone_owned());
        for step in 0..ncols {
            let (input, output) = points;
            for i in 1..(ncols - step) {
                let column = &input.column(i - 1) * t_inv.clone() + &input.column(i) * t.clone();
                output.set_column(i - 1, &column);
            }
            points = (output, input);
        }

        points.1.column(0).clone_owned()
    }
}

impl<T: RealField, R: Dim, C: Dim, S: Storage<T, R, C>> BezierCurve<T, R, C, S>
where
    C: DimSub<U1>,
    DefaultAllocator: Allocator<T, R, DimDiff<C, U1>>, // polynomial
    DefaultAllocator: Allocator<T, DimDiff<C, U1>, DimDiff<C, U1>>, // bernstein basis
    DefaultAllocator: Allocator<T, R, U1>,             // column difference
{
    /// Computes the curve's derivative as a polynomial
    ///
    /// The derivative of a bezier curve is the curve of degree one less over the differences
    /// of consecutive control points, scaled by the degree.
    pub fn derivative(&self) -> Polynomial<T, R, DimDiff<C, U1>, Owned<T, R, DimDiff<C, U1>>> {
        let (rows, cols) = self.0.shape_generic();
        let cols = cols.sub(Const::<1>);
        let mut polynomial = Matrix::zeros_generic(rows, cols);

        for (i, b) in bernstein_polynomials::<T, _>(cols).row_iter().enumerate() {
            let p = (self.0.column(i + 1) - self.0.column(i)) * b;
            polynomial += p;
        }

        let degree = cols.value();
        let degree = {
            let mut k = T::zero();
            for _ in 0..degree {
                k += T::one();
            }
            k
        };
        polynomial *= degree;

        Polynomial(polynomial)
    }

    /// Computes the curve's tangent vector at `t`
    ///
    /// If you need a lot of them at once, it is far more efficent to call
    /// [`derivative`] once yourself and evaluate it multiple times,
    /// as this function would recompute the derivative for every vector.
    ///
    /// *The resulting vector is not normalized!*
    ///
    /// [`derivative`]: BezierCurve::derivative
    pub fn tangent(&self, t: T) -> OVector<T, R>
    where
        R: DimName,
    {
        self.derivative().evaluate(t)
    }
}

/// Computes the bernstein polynomial basis for a given degree
pub fn bernstein_polynomials<T: RealField, C: Dim>(cols: C) -> OMatrix<T, C, C>
where
    DefaultAllocator: Allocator<T, C, C>,
{
    // Each row is a different berstein polynomial
    let mut polynomials = OMatrix::zeros_generic(cols, cols);

    // Fill matrix with pascal triangle of shape:
    //    ...
    //   1 3 3 1
    //     1 2 1
    //       1 1
    //         1
    for n in 0..cols.value() {
        let m = cols.value() - 1 - n;
        polynomials[(m, cols.value() - 1)] = T::one();
        polynomials[(m, m)] = T::one();
        for i in 1..n {
            let j = cols.value() - 1 - i;
            polynomials[(m, j)] =
                polynomials[(m + 1, j + 1)].clone() + polynomials[(m + 1, j)].clone();
        }
    }

    // Scale every row by the entries is the top row
    // (First and last row can be skipped, since their coeff is always 1)
    for i in 1..(cols.value() - 1) {
        let coeff = polynomials[(0, i)].clone();
        let mut row = polynomials.row_mut(i);
        row *= coeff;
    }

    // Apply minus sign in checkerboard pattern
    for i in 0..cols.value() {
        for j in i..cols.value() {
            if (j + i) % 2 == 1 {
                polynomials[(i, j)] *= -T::one();
            }
        }
    }

    polynomials
}

impl BezierSegment {
    /// Constructs a cubic segment from its start point, its two control points and its end point
    pub fn from_points(start: Point2D, cp1: Point2D, cp2: Point2D, end: Point2D) -> Self {
        BezierCurve(Matrix2x4::from_columns(&[start, cp1, cp2, end]))
    }

    /// A straight segment whose control points sit at a third and two thirds of the way
    pub fn line(start: Point2D, end: Point2D) -> Self {
        let third = (end - start) / 3.0;
        BezierSegment::from_points(start, start + third, end - third, end)
    }

    /// A segment collapsed into a single point
    pub fn degenerate(point: Point2D) -> Self {
        BezierSegment::from_points(point, point, point, point)
    }

    /// The on-curve point at `t = 0`
    pub fn start_point(&self) -> Point2D {
        self.0.column(0).into_owned()
    }

    /// The on-curve point at `t = 1`
    pub fn end_point(&self) -> Point2D {
        self.0.column(3).into_owned()
    }

    /// The two off-curve control points `P1` and `P2`
    pub fn control_points(&self) -> (Point2D, Point2D) {
        (self.0.column(1).into_owned(), self.0.column(2).into_owned())
    }

    /// All four points in order `P0, P1, P2, P3`
    pub fn points(&self) -> [Point2D; 4] {
        let (cp1, cp2) = self.control_points();
        [self.start_point(), cp1, cp2, self.end_point()]
    }

    /// Checks whether all four points are identical
    pub fn is_degenerate(&self) -> bool {
        let start = self.start_point();
        self.0.column_iter().all(|column| column == start)
    }

    /// Checks whether the control points lie on the chord between start and end point
    pub fn is_straight(&self, epsilon: f64) -> bool {
        let (start, end) = (self.start_point(), self.end_point());
        let (cp1, cp2) = self.control_points();
        crate::point::perpendicular_distance(&cp1, &start, &end) <= epsilon
            && crate::point::perpendicular_distance(&cp2, &start, &end) <= epsilon
    }

    /// Evaluates the segment at `t`
    pub fn point_at(&self, t: f64) -> Point2D {
        self.castlejau_eval(t)
    }

    /// Evaluates the segment's first derivative at `t`
    pub fn first_derivative_at(&self, t: f64) -> Vector2<f64> {
        self.tangent(t)
    }

    /// Evaluates the segment's second derivative at `t`
    pub fn second_derivative_at(&self, t: f64) -> Vector2<f64> {
        self.derivative().derive().evaluate(t)
    }

    /// Box around all four points, which also contains the whole segment
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::from_point(self.start_point());
        for column in self.0.column_iter().skip(1) {
            bb.include(&column.into_owned());
        }
        bb
    }

    /// Performs a single newton-raphson step improving `t` as the parameter of the point on the
    /// segment closest to `point`.
    ///
    /// The root of `(Q(t) - P) · Q'(t)` is the parameter with minimal distance.
    /// If the step can't be computed, `t` is returned unchanged.
    pub fn newton_step(&self, point: &Point2D, t: f64) -> f64 {
        let first = self.derivative();
        let second = first.derive();

        let offset = self.castlejau_eval(t) - point;
        let d1 = first.evaluate(t);
        let d2 = second.evaluate(t);

        let numerator = offset.dot(&d1);
        let denominator = d1.dot(&d1) + offset.dot(&d2);

        let next = t - numerator / denominator;
        if denominator.abs() <= f64::EPSILON || !next.is_finite() {
            t
        } else {
            num::clamp(next, 0.0, 1.0)
        }
    }

    /// Searches the parameter of the point on the segment closest to `point`, starting at `estimate`.
    ///
    /// Runs a few newton steps and stops as soon as one doesn't bring the curve any closer,
    /// so the result is never worse than the (clamped) estimate.
    pub fn nearest_parameter(&self, point: &Point2D, estimate: f64) -> f64 {
        let mut t = if estimate.is_finite() {
            num::clamp(estimate, 0.0, 1.0)
        } else {
            0.0
        };
        let mut best = (self.castlejau_eval(t) - point).norm_squared();

        for _ in 0..NEAREST_POINT_ITERATIONS {
            let next = self.newton_step(point, t);
            let distance = (self.castlejau_eval(next) - point).norm_squared();
            if !(distance < best) {
                break;
            }
            t = next;
            best = distance;
        }

        t
    }

    /// Distance between `point` and the closest point on the segment found from `estimate`.
    ///
    /// The search is local, so this may overestimate the true distance but never underestimates it.
    pub fn distance_to(&self, point: &Point2D, estimate: f64) -> f64 {
        let t = self.nearest_parameter(point, estimate);
        (self.castlejau_eval(t) - point).norm()
    }
}

impl<T, R, C, S: fmt::Debug> fmt::Debug for BezierCurve<T, R, C, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        formatter
            .debug_tuple("BezierCurve")
            .field(&self.0.data)
            .finish()
    }
}

impl<T: Scalar, R: Dim, R2: Dim, C: Dim, C2: Dim, S, S2> PartialEq<BezierCurve<T, R2, C2, S2>>
    for BezierCurve<T, R, C, S>
where
    S: RawStorage<T, R, C>,
    S2: RawStorage<T, R2, C2>,
{
    #[inline]
    fn eq(&self, rhs: &BezierCurve<T, R2, C2, S2>) -> bool {
        self.0 == rhs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn s_curve() -> BezierSegment {
        BezierSegment::from_points(
            Vector2::new(50.0, 0.0),
            Vector2::new(200.0, 33.0),
            Vector2::new(0.0, 66.0),
            Vector2::new(50.0, 100.0),
        )
    }

    #[test]
    fn endpoints() {
        let curve = s_curve();
        assert_eq!(curve.degree(), 3);
        assert_eq!(curve.point_at(0.0), Vector2::new(50.0, 0.0));
        assert_eq!(curve.point_at(1.0), Vector2::new(50.0, 100.0));
        assert_eq!(curve.start_point(), Vector2::new(50.0, 0.0));
        assert_eq!(curve.end_point(), Vector2::new(50.0, 100.0));
        assert_eq!(
            curve.control_points(),
            (Vector2::new(200.0, 33.0), Vector2::new(0.0, 66.0))
        );
    }

    #[test]
    fn castlejau_matches_bernstein_form() {
        let curve = s_curve();
        let [p0, p1, p2, p3] = curve.points();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let s = 1.0 - t;
            let expected = p0 * (s * s * s) + p1 * (3.0 * s * s * t) + p2 * (3.0 * s * t * t) + p3 * (t * t * t);
            assert_relative_eq!(curve.castlejau_eval(t), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn tangent_at_endpoints() {
        let curve = s_curve();
        // A cubic's tangent at the ends is three times the first/last leg of the control polygon
        assert_relative_eq!(curve.tangent(0.0), Vector2::new(450.0, 99.0), epsilon = 1e-9);
        assert_relative_eq!(curve.tangent(1.0), Vector2::new(150.0, 102.0), epsilon = 1e-9);
        assert_eq!(curve.first_derivative_at(0.5), curve.tangent(0.5));
    }

    #[test]
    fn second_derivative_of_line_vanishes() {
        let line = BezierSegment::line(Vector2::new(0.0, 0.0), Vector2::new(3.0, 3.0));
        assert_relative_eq!(line.second_derivative_at(0.3), Vector2::zeros(), epsilon = 1e-9);
        assert!(line.is_straight(1e-12));
        assert!(!s_curve().is_straight(1.0));
    }

    #[test]
    fn nearest_point_recovers_parameter() {
        let curve = s_curve();
        for i in 1..10 {
            let actual_t = i as f64 / 10.0;
            let point = curve.point_at(actual_t);
            // Start a little bit off to give newton something to do
            let found_t = curve.nearest_parameter(&point, actual_t + 0.03);
            assert!((found_t - actual_t).abs() < 1e-4, "{} vs {}", found_t, actual_t);
            assert!(curve.distance_to(&point, actual_t + 0.03) < 1e-3);
        }
    }

    #[test]
    fn nearest_point_off_the_curve() {
        let line = BezierSegment::line(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0));
        let t = line.nearest_parameter(&Vector2::new(4.0, 2.0), 0.5);
        assert_relative_eq!(t, 0.4, epsilon = 1e-9);
        assert_relative_eq!(line.distance_to(&Vector2::new(4.0, 2.0), 0.5), 2.0, epsilon = 1e-9);

        // Beyond the end the parameter is clamped
        let t = line.nearest_parameter(&Vector2::new(12.0, 0.0), 0.9);
        assert_relative_eq!(t, 1.0);
    }

    #[test]
    fn nearest_point_on_degenerate_segment() {
        let point = BezierSegment::degenerate(Vector2::new(5.0, 5.0));
        assert!(point.is_degenerate());
        let t = point.nearest_parameter(&Vector2::new(6.0, 5.0), 0.5);
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(point.distance_to(&Vector2::new(6.0, 5.0), 0.5), 1.0);
    }

    #[test]
    fn bounding_box_contains_curve() {
        let curve = s_curve();
        let bb = curve.bounding_box();
        for i in 0..=20 {
            assert!(bb.contains(&curve.point_at(i as f64 / 20.0)));
        }
    }
}
