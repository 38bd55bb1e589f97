use crate::common::samples::STROKES;
use criterion::{black_box, Criterion};
use fitcurves::{douglas_peucker, fit_curve, GeometryPipeline, PipelineConfig};

pub fn simplify(c: &mut Criterion) {
    c.bench_function("douglas_peucker", |b| {
        b.iter(|| {
            for stroke in STROKES.iter() {
                let _ = black_box(douglas_peucker(stroke, 1.0));
            }
        })
    });
}

pub fn fit(c: &mut Criterion) {
    c.bench_function("fit_curve", |b| {
        b.iter(|| {
            for stroke in STROKES.iter() {
                let _ = black_box(fit_curve(stroke, 1.0));
            }
        })
    });
}

pub fn pipeline(c: &mut Criterion) {
    let pipeline = GeometryPipeline::new(PipelineConfig::default());
    c.bench_function("pipeline", |b| {
        b.iter(|| {
            for stroke in STROKES.iter() {
                let _ = black_box(pipeline.run(stroke));
            }
        })
    });
}

pub fn all(c: &mut Criterion) {
    simplify(c);
    fit(c);
    pipeline(c);
}
