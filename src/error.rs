//! Errors reported by the simplifier, the curve fitter and the pipeline.

use thiserror::Error;

/// Errors that can occur while simplifying or fitting a stroke.
///
/// Only malformed input is reported.
/// Numerical trouble in the middle of a fit is handled by fallbacks and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FitError {
    /// The caller passed a negative tolerance, too few points or similar.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Shorthand used throughout the crate.
pub type Result<T, E = FitError> = std::result::Result<T, E>;

/// Rejects negative or non-finite parameters like tolerances and error bounds.
pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FitError::InvalidArgument(format!(
            "{} must be a finite number >= 0, got {}",
            name, value
        )))
    }
}
