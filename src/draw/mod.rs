//! Defines and implements the helper method [`DrawCurve::add_curve`] on various drawing contexts.
//!
//! Only the path data is produced here.
//! Stroking, filling and displaying the result is up to the caller.
use crate::bezier::BezierSegment;
use crate::fit::FittedCurve;
use crate::point::Point2D;

/// Draw fitted curves and strokes on different "drawing contexts" with ease.
///
/// Use different crate features to implement different contexts:
/// - `draw-svg` to draw curves using svg paths
pub trait DrawCurve {
    /// Add a single cubic segment to the drawing context.
    ///
    /// What this actually means depends on the context.
    /// But generally this just prepares the curve to be drawn instead of actually drawing it.
    fn add_curve(&mut self, curve: &BezierSegment);

    /// Add a straight polyline through `points`.
    fn add_polyline(&mut self, points: &[Point2D]);

    /// Add every segment of a fitted curve, in order.
    fn add_fitted_curve(&mut self, curve: &FittedCurve) {
        for segment in curve.segments() {
            self.add_curve(segment);
        }
    }
}

#[cfg(feature = "draw-svg")]
pub mod svg;
