//! Draw a curve in a svg

use crate::bezier::BezierSegment;
use crate::draw::DrawCurve;
use crate::point::Point2D;
use std::fmt::Write;
use std::marker::PhantomData;

/// Helper trait implemented by [`Absolute`] and [`Relative`] to choose
/// how the coordinates are interpreted in the svg's path.
///
/// This toggles between upper and lower case letters for the path commands
/// and whether coordinates are written as they are or as offsets from the current point.
pub trait CoordRepr {
    /// Character to use for the MoveTo command
    const M: &'static str;

    /// Character to use for the LineTo command
    const L: &'static str;

    /// Character to use for the Cubic Bezier Curve command
    const C: &'static str;

    /// Whether coordinates are offsets from the current point
    const RELATIVE: bool;
}

/// Interpret the svg path's coordinates as absolute.
pub struct Absolute;
impl CoordRepr for Absolute {
    const M: &'static str = "M";
    const L: &'static str = "L";
    const C: &'static str = "C";
    const RELATIVE: bool = false;
}

/// Interpret the svg path's coordinates as relative.
pub struct Relative;
impl CoordRepr for Relative {
    const M: &'static str = "m";
    const L: &'static str = "l";
    const C: &'static str = "c";
    const RELATIVE: bool = true;
}

/// This type wraps a mutable String reference and implements [`DrawCurve`] on it.
/// The [`DrawCurve::add_curve`] writes the curve to the string
/// using the path commands used in a svg `<path>`'s d attribute
///
/// A segment starting where the previous one ended continues the current sub path.
///
/// ```
/// use fitcurves::draw::DrawCurve;
/// use fitcurves::draw::svg::SVGAbsolutePath;
/// use fitcurves::{BezierSegment, Point2D};
///
/// let curve = BezierSegment::from_points(
///     Point2D::new(0.0, 0.0),
///     Point2D::new(1.0, 2.0),
///     Point2D::new(3.0, 2.0),
///     Point2D::new(4.0, 0.0),
/// );
/// let mut d = String::new();
/// SVGAbsolutePath::from(&mut d).add_curve(&curve);
/// assert_eq!(d, "M 0,0 C 1,2 3,2 4,0");
/// ```
pub struct SVGPath<'s, R: CoordRepr> {
    path: &'s mut String,
    current: Option<Point2D>,
    repr: PhantomData<R>,
}

/// Wrapper for writing a curve to a svg's path using absolute coordinates
pub type SVGAbsolutePath<'s> = SVGPath<'s, Absolute>;

/// Wrapper for writing a curve to a svg's path using relative coordinates
pub type SVGRelativePath<'s> = SVGPath<'s, Relative>;

impl<'s, R: CoordRepr> From<&'s mut String> for SVGPath<'s, R> {
    fn from(path: &'s mut String) -> Self {
        SVGPath {
            path,
            current: None,
            repr: PhantomData,
        }
    }
}

impl<'s, R: CoordRepr> SVGPath<'s, R> {
    fn command(&mut self, command: &str) {
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        self.path.push_str(command);
    }

    /// Writes `point` relative to `origin` if the coordinates are relative
    fn point(&mut self, point: &Point2D, origin: &Point2D) {
        let point = if R::RELATIVE { point - origin } else { *point };
        let _ = write!(self.path, " {},{}", point.x, point.y);
    }

    fn move_to(&mut self, point: &Point2D) {
        if self.current.as_ref() == Some(point) {
            return;
        }
        // A leading relative move is relative to the origin
        let origin = self.current.unwrap_or_else(Point2D::zeros);
        self.command(R::M);
        self.point(point, &origin);
        self.current = Some(*point);
    }
}

impl<'s, R: CoordRepr> DrawCurve for SVGPath<'s, R> {
    fn add_curve(&mut self, curve: &BezierSegment) {
        let [start, cp1, cp2, end] = curve.points();
        self.move_to(&start);
        self.command(R::C);
        self.point(&cp1, &start);
        self.point(&cp2, &start);
        self.point(&end, &start);
        self.current = Some(end);
    }

    fn add_polyline(&mut self, points: &[Point2D]) {
        let mut points = points.iter();
        let mut previous = match points.next() {
            Some(first) => *first,
            None => return,
        };
        self.move_to(&previous);
        for point in points {
            self.command(R::L);
            self.point(point, &previous);
            previous = *point;
        }
        self.current = Some(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::FittedCurve;

    fn chain() -> FittedCurve {
        FittedCurve(vec![
            BezierSegment::from_points(
                Point2D::new(1.0, 1.0),
                Point2D::new(1.0, 2.0),
                Point2D::new(3.0, 2.0),
                Point2D::new(4.0, 0.0),
            ),
            BezierSegment::line(Point2D::new(4.0, 0.0), Point2D::new(10.0, 0.0)),
        ])
    }

    #[test]
    fn absolute_chain_is_one_sub_path() {
        let mut d = String::new();
        SVGAbsolutePath::from(&mut d).add_fitted_curve(&chain());
        assert_eq!(d, "M 1,1 C 1,2 3,2 4,0 C 6,0 8,0 10,0");
    }

    #[test]
    fn relative_chain() {
        let mut d = String::new();
        SVGRelativePath::from(&mut d).add_fitted_curve(&chain());
        assert_eq!(d, "m 1,1 c 0,1 2,1 3,-1 c 2,0 4,0 6,0");
    }

    #[test]
    fn disjoint_curves_move() {
        let mut d = String::new();
        let mut path = SVGRelativePath::from(&mut d);
        path.add_curve(&BezierSegment::line(Point2D::new(0.0, 0.0), Point2D::new(3.0, 0.0)));
        path.add_curve(&BezierSegment::line(Point2D::new(5.0, 1.0), Point2D::new(5.0, 4.0)));
        assert_eq!(d, "m 0,0 c 1,0 2,0 3,0 m 2,1 c 0,1 0,2 0,3");
    }

    #[test]
    fn polylines() {
        let points = [
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(2.0, 5.0),
        ];

        let mut d = String::new();
        SVGAbsolutePath::from(&mut d).add_polyline(&points);
        assert_eq!(d, "M 0,0 L 2,1 L 2,5");

        let mut d = String::new();
        SVGRelativePath::from(&mut d).add_polyline(&points);
        assert_eq!(d, "m 0,0 l 2,1 l 0,4");

        let mut d = String::new();
        SVGAbsolutePath::from(&mut d).add_polyline(&[]);
        assert!(d.is_empty());
    }
}
