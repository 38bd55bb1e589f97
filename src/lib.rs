#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod bezier;
pub mod bounding_box;
pub mod draw;
pub mod error;
pub mod fit;
pub mod pipeline;
pub mod point;
pub mod polynomial;
pub mod simplify;

pub use crate::bezier::{BezierCurve, BezierSegment};
pub use crate::error::FitError;
pub use crate::fit::{fit_curve, fit_curve_with_tangents, FittedCurve};
pub use crate::pipeline::{Composition, GeometryPipeline, PipelineConfig, PipelineOutput};
pub use crate::point::{Point2D, PointSequence};
pub use crate::simplify::douglas_peucker;
