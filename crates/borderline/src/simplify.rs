//! `borderline simplify`: re-simplify an existing FeatureCollection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use borderline_export::{parse_feature_collection, resimplify, to_geojson_string};
use borderline_pipeline::{PipelineConfig, Tolerance};

#[derive(Args)]
pub struct SimplifyArgs {
    /// GeoJSON FeatureCollection to read.
    input: PathBuf,

    /// Where to write the simplified collection. May equal `input`.
    output: PathBuf,

    /// Douglas-Peucker tolerance, in coordinate units.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SIMPLIFY_TOLERANCE)]
    tolerance: f64,
}

pub fn run(args: &SimplifyArgs) -> Result<()> {
    let tolerance = Tolerance::new(args.tolerance)?;

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut collection = parse_feature_collection(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let summary = resimplify(&mut collection, tolerance)
        .with_context(|| format!("simplifying {}", args.input.display()))?;
    log::info!(
        "simplified {} rings in {} features: {} -> {} vertices ({} skipped features, {} degenerate rings)",
        summary.rings,
        summary.features,
        summary.input_vertices,
        summary.output_vertices,
        summary.skipped_features,
        summary.degenerate_rings,
    );

    std::fs::write(&args.output, to_geojson_string(&collection)?)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
