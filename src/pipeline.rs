//! Runs the simplifier and the curve fitter on a stroke, as configured.
//!
//! ```
//! use fitcurves::pipeline::{GeometryPipeline, PipelineConfig};
//! use fitcurves::PointSequence;
//!
//! let stroke = PointSequence::from_xy((0..50).map(|i| {
//!     let x = i as f64;
//!     (x, (x / 8.0).sin() * 20.0)
//! }));
//!
//! let output = GeometryPipeline::new(PipelineConfig::default()).run(&stroke)?;
//! let simplified = output.simplified.unwrap();
//! let curve = output.curve.unwrap();
//! assert!(simplified.len() < stroke.len());
//! assert!(curve.max_distance(&simplified) <= 4.0 + 1e-6);
//! # Ok::<(), fitcurves::FitError>(())
//! ```

use log::debug;

use crate::error::{check_non_negative, Result};
use crate::fit::{fit_curve, FittedCurve};
use crate::point::{Point2D, PointSequence};
use crate::simplify::douglas_peucker;

/// How the two stages are combined when both are enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Composition {
    /// The fitter works on the simplified points
    #[default]
    SimplifyThenFit,
    /// Both stages work on the raw stroke
    Independent,
}

/// Everything that controls a single run of the [`GeometryPipeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Whether to simplify the stroke with Douglas-Peucker
    pub enable_douglas_peucker: bool,
    /// Largest distance a dropped point may have from the simplified polyline
    pub tolerance: f64,

    /// Whether to fit cubic bezier segments to the stroke
    pub enable_schneider: bool,
    /// Largest distance a point may have from the fitted curve
    pub max_error: f64,

    /// What the fitter gets to see when both stages are enabled
    pub composition: Composition,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enable_douglas_peucker: true,
            tolerance: 2.0,
            enable_schneider: true,
            max_error: 4.0,
            composition: Composition::SimplifyThenFit,
        }
    }
}

impl PipelineConfig {
    /// Checks the parameters of all enabled stages.
    ///
    /// Parameters of disabled stages are ignored.
    pub fn validate(&self) -> Result<()> {
        if self.enable_douglas_peucker {
            check_non_negative("tolerance", self.tolerance)?;
        }
        if self.enable_schneider {
            check_non_negative("max_error", self.max_error)?;
        }
        Ok(())
    }
}

/// Geometry produced by one run. A stage that is disabled leaves its field `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineOutput {
    /// The stroke after Douglas-Peucker
    pub simplified: Option<PointSequence>,
    /// The fitted bezier chain
    pub curve: Option<FittedCurve>,
}

/// Applies the enabled stages of a [`PipelineConfig`] to strokes.
///
/// The pipeline holds no state besides its configuration, so a single one
/// can be shared between threads and reused for any number of strokes.
#[derive(Clone, Debug, Default)]
pub struct GeometryPipeline {
    config: PipelineConfig,
}

impl GeometryPipeline {
    /// Creates a pipeline running with `config`
    pub fn new(config: PipelineConfig) -> Self {
        GeometryPipeline { config }
    }

    /// The configuration every run uses
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs all enabled stages on `stroke`.
    ///
    /// Fails if the configuration is invalid or the fitter gets fewer than two points.
    pub fn run(&self, stroke: &[Point2D]) -> Result<PipelineOutput> {
        let config = &self.config;
        config.validate()?;

        let simplified = if config.enable_douglas_peucker {
            let simplified = douglas_peucker(stroke, config.tolerance)?;
            debug!(
                "simplified stroke from {} to {} points",
                stroke.len(),
                simplified.len()
            );
            Some(simplified)
        } else {
            None
        };

        let curve = if config.enable_schneider {
            let points = match (&simplified, config.composition) {
                (Some(simplified), Composition::SimplifyThenFit) => simplified.as_slice(),
                _ => stroke,
            };
            let curve = fit_curve(points, config.max_error).map_err(|err| {
                debug!("rejected stroke of {} points: {}", points.len(), err);
                err
            })?;
            Some(curve)
        } else {
            None
        };

        Ok(PipelineOutput { simplified, curve })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FitError;

    fn wave() -> PointSequence {
        (0..80)
            .map(|i| {
                let x = i as f64 * 2.0;
                Point2D::new(x, (x / 15.0).sin() * 30.0)
            })
            .collect()
    }

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert!(config.enable_douglas_peucker);
        assert!(config.enable_schneider);
        assert_eq!(config.tolerance, 2.0);
        assert_eq!(config.max_error, 4.0);
        assert_eq!(config.composition, Composition::SimplifyThenFit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nothing_enabled() {
        let pipeline = GeometryPipeline::new(PipelineConfig {
            enable_douglas_peucker: false,
            enable_schneider: false,
            ..Default::default()
        });
        assert_eq!(pipeline.run(&wave()).unwrap(), PipelineOutput::default());
    }

    #[test]
    fn simplify_only() {
        let stroke = wave();
        let pipeline = GeometryPipeline::new(PipelineConfig {
            enable_schneider: false,
            ..Default::default()
        });
        let output = pipeline.run(&stroke).unwrap();
        assert_eq!(
            output.simplified,
            Some(douglas_peucker(&stroke, 2.0).unwrap())
        );
        assert!(output.curve.is_none());
    }

    #[test]
    fn fit_only() {
        let stroke = wave();
        let pipeline = GeometryPipeline::new(PipelineConfig {
            enable_douglas_peucker: false,
            max_error: 0.5,
            ..Default::default()
        });
        let output = pipeline.run(&stroke).unwrap();
        assert!(output.simplified.is_none());
        let curve = output.curve.unwrap();
        assert_eq!(curve, fit_curve(&stroke, 0.5).unwrap());
        assert!(curve.max_distance(&stroke) <= 0.5 + 1e-6);
    }

    #[test]
    fn fit_after_simplify() {
        let stroke = wave();
        let output = GeometryPipeline::default().run(&stroke).unwrap();
        let simplified = output.simplified.unwrap();
        let curve = output.curve.unwrap();
        assert_eq!(curve, fit_curve(&simplified, 4.0).unwrap());
        assert_eq!(curve.start_point(), Some(stroke[0]));
        assert_eq!(curve.end_point(), stroke.last().copied());
    }

    #[test]
    fn independent_stages() {
        let stroke = wave();
        let output = GeometryPipeline::new(PipelineConfig {
            composition: Composition::Independent,
            ..Default::default()
        })
        .run(&stroke)
        .unwrap();
        assert_eq!(output.simplified, Some(douglas_peucker(&stroke, 2.0).unwrap()));
        assert_eq!(output.curve, Some(fit_curve(&stroke, 4.0).unwrap()));
    }

    #[test]
    fn invalid_configuration() {
        let stroke = wave();
        let config = PipelineConfig {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            GeometryPipeline::new(config).run(&stroke),
            Err(FitError::InvalidArgument(_))
        ));

        // Only enabled stages are checked
        let config = PipelineConfig {
            enable_douglas_peucker: false,
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = PipelineConfig {
            max_error: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn stroke_too_short_to_fit() {
        let stroke = PointSequence::from_xy([(1.0, 1.0)]);
        assert!(GeometryPipeline::default().run(&stroke).is_err());

        let pipeline = GeometryPipeline::new(PipelineConfig {
            enable_schneider: false,
            ..Default::default()
        });
        assert_eq!(pipeline.run(&stroke).unwrap().simplified, Some(stroke));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_from_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "tolerance": 1.5, "composition": "independent" }"#).unwrap();
        assert_eq!(
            config,
            PipelineConfig {
                tolerance: 1.5,
                composition: Composition::Independent,
                ..Default::default()
            }
        );

        let json = serde_json::to_string(&PipelineConfig::default()).unwrap();
        assert_eq!(serde_json::from_str::<PipelineConfig>(&json).unwrap(), PipelineConfig::default());
    }
}
