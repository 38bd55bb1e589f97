//! Path simplification with the
//! [Ramer–Douglas–Peucker algorithm](https://en.wikipedia.org/wiki/Ramer%E2%80%93Douglas%E2%80%93Peucker_algorithm)
//!
//! The stroke is reduced to a subsequence of its own points.
//! Every point that gets dropped lies within `tolerance` of the line through
//! the two retained points around it.

use log::debug;
use smallvec::SmallVec;

use crate::error::{check_non_negative, Result};
use crate::point::{perpendicular_distance, Point2D, PointSequence};

/// Simplifies `points` so that no dropped point is further than `tolerance` away from the
/// line between its retained neighbours.
///
/// The first and last point are always retained and sequences of two or fewer points are
/// returned unchanged.
/// Fails with [`FitError::InvalidArgument`](crate::FitError::InvalidArgument) if `tolerance`
/// is negative or not a number.
pub fn douglas_peucker(points: &[Point2D], tolerance: f64) -> Result<PointSequence> {
    let indices = simplified_indices(points, tolerance)?;
    Ok(indices.into_iter().map(|i| points[i]).collect())
}

/// Same as [`douglas_peucker`] but returns the indices of the retained points in ascending order.
pub fn simplified_indices(points: &[Point2D], tolerance: f64) -> Result<Vec<usize>> {
    check_non_negative("tolerance", tolerance)?;

    let len = points.len();
    if len <= 2 {
        return Ok((0..len).collect());
    }

    let mut keep = vec![false; len];
    keep[0] = true;
    keep[len - 1] = true;

    // Ranges still to be checked, both ends are already kept
    let mut ranges: SmallVec<[(usize, usize); 32]> = SmallVec::new();
    ranges.push((0, len - 1));

    while let Some((first, last)) = ranges.pop() {
        if last - first < 2 {
            continue;
        }

        let (split, distance) = furthest_point(points, first, last);
        if distance > tolerance {
            keep[split] = true;
            ranges.push((split, last));
            ranges.push((first, split));
        }
    }

    let indices: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(i, _)| i)
        .collect();
    debug!(
        "douglas-peucker kept {} of {} points (tolerance {})",
        indices.len(),
        len,
        tolerance
    );
    Ok(indices)
}

/// Finds the point strictly between `first` and `last` which is furthest from their line.
///
/// Ties are resolved in favour of the lowest index.
fn furthest_point(points: &[Point2D], first: usize, last: usize) -> (usize, f64) {
    let (start, end) = (&points[first], &points[last]);

    let mut split = first + 1;
    let mut max_distance = perpendicular_distance(&points[split], start, end);
    for i in (first + 2)..last {
        let distance = perpendicular_distance(&points[i], start, end);
        if distance > max_distance {
            max_distance = distance;
            split = i;
        }
    }
    (split, max_distance)
}
