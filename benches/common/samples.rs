use fitcurves::{Point2D, PointSequence};
use once_cell::sync::Lazy;

/// Densely sampled strokes, roughly what a mouse or pen delivers
pub static STROKES: Lazy<Vec<PointSequence>> = Lazy::new(|| {
    vec![
        // Spiral
        (0..400)
            .map(|i| {
                let angle = i as f64 * 0.05;
                let radius = 10.0 + i as f64 * 0.5;
                Point2D::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect(),
        // Handwriting like loops
        (0..600)
            .map(|i| {
                let t = i as f64 * 0.02;
                Point2D::new(t * 20.0 + 15.0 * (3.0 * t).cos(), 40.0 * (3.0 * t).sin())
            })
            .collect(),
        // Zigzag with sharp corners
        (0..300)
            .map(|i| {
                let y = (i % 40) as f64;
                Point2D::new(i as f64, (if y < 20.0 { y } else { 40.0 - y }) * 5.0)
            })
            .collect(),
    ]
});
