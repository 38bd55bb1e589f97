use clap::{Parser, ValueEnum};
use fitcurves::bounding_box::BoundingBox;
use fitcurves::draw::svg::SVGAbsolutePath;
use fitcurves::draw::DrawCurve;
use fitcurves::{Composition, GeometryPipeline, PipelineConfig, PipelineOutput, PointSequence};
use log::{error, info};
use serde_json::json;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fitcurves",
    about = "Simplify freehand strokes and fit cubic bezier curves to them"
)]
struct Cli {
    /// JSON file with the stroke as an array of [x, y] pairs (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON file with a pipeline configuration, flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the Douglas-Peucker simplification
    #[arg(long)]
    no_douglas_peucker: bool,

    /// Skip the curve fitting
    #[arg(long)]
    no_schneider: bool,

    /// Douglas-Peucker tolerance
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Maximum distance between the stroke and the fitted curve
    #[arg(short, long)]
    error: Option<f64>,

    /// Fit the raw stroke instead of the simplified one
    #[arg(long)]
    independent: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Svg,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => PipelineConfig::default(),
        };

        if self.no_douglas_peucker {
            config.enable_douglas_peucker = false;
        }
        if self.no_schneider {
            config.enable_schneider = false;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_error) = self.error {
            config.max_error = max_error;
        }
        if self.independent {
            config.composition = Composition::Independent;
        }
        Ok(config)
    }

    fn stroke(&self) -> Result<PointSequence, Box<dyn std::error::Error>> {
        let text = match &self.input {
            Some(path) => fs::read_to_string(path)?,
            None => io::read_to_string(io::stdin())?,
        };
        Ok(serde_json::from_str(&text)?)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    let stroke = cli.stroke()?;

    let output = GeometryPipeline::new(config).run(&stroke).map_err(|err| {
        error!("ignoring stroke of {} points: {}", stroke.len(), err);
        err
    })?;

    if let Some(curve) = &output.curve {
        info!(
            "{} segments, largest distance to the stroke {}",
            curve.len(),
            curve.max_distance(&stroke)
        );
    }

    match cli.format {
        Format::Json => println!("{}", to_json(&output)),
        Format::Svg => println!("{}", to_svg(&stroke, &output)),
    }
    Ok(())
}

fn to_json(output: &PipelineOutput) -> serde_json::Value {
    let simplified = output
        .simplified
        .as_ref()
        .map(|points| points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>());
    let segments = output.curve.as_ref().map(|curve| {
        curve
            .iter()
            .map(|segment| segment.points().map(|p| [p.x, p.y]))
            .collect::<Vec<_>>()
    });
    json!({
        "simplified": simplified,
        "segments": segments,
    })
}

fn to_svg(stroke: &PointSequence, output: &PipelineOutput) -> String {
    const MARGIN: f64 = 10.0;

    let mut bb = BoundingBox::from_iter(stroke.iter().copied())
        .unwrap_or_else(|| BoundingBox::from_point(Default::default()));
    if let Some(curve_box) = output.curve.as_ref().and_then(|curve| curve.bounding_box()) {
        bb = bb.union(&curve_box);
    }

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        bb.min.x - MARGIN,
        bb.min.y - MARGIN,
        bb.width() + 2.0 * MARGIN,
        bb.height() + 2.0 * MARGIN
    );

    let mut d = String::new();
    SVGAbsolutePath::from(&mut d).add_polyline(stroke);
    svg += &format!(r#"<path d="{}" fill="none" stroke="lightgray"/>"#, d);

    if let Some(simplified) = &output.simplified {
        let mut d = String::new();
        SVGAbsolutePath::from(&mut d).add_polyline(simplified);
        svg += &format!(r#"<path d="{}" fill="none" stroke="blue"/>"#, d);
    }
    if let Some(curve) = &output.curve {
        let mut d = String::new();
        SVGAbsolutePath::from(&mut d).add_fitted_curve(curve);
        svg += &format!(r#"<path d="{}" fill="none" stroke="red"/>"#, d);
    }

    svg += "</svg>";
    svg
}
