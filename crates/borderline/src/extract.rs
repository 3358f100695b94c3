//! `borderline extract`: OSM XML in, GeoJSON out.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};

use borderline_export::{GeometryKind, to_feature_collection, to_geojson_string};
use borderline_osm::{AreaFilter, load_or_extract, read_tables};
use borderline_pipeline::{PipelineConfig, RunSummary, process_areas};

#[derive(Args)]
pub struct ExtractArgs {
    /// Path to the input `.osm` XML extract.
    #[arg(long)]
    src: PathBuf,

    /// Path to write the GeoJSON FeatureCollection to.
    #[arg(long)]
    dst: PathBuf,

    /// Cache the extracted tables here and reuse them while the source
    /// file is unchanged.
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Endpoint matching distance used when no endpoints match exactly.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_STITCH_TOLERANCE)]
    stitch_tolerance: f64,

    /// Douglas-Peucker tolerance, in coordinate units.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SIMPLIFY_TOLERANCE)]
    simplify_tolerance: f64,

    /// Keep only relations with this `admin_level`.
    #[arg(long)]
    admin_level: Option<u8>,

    /// Keep only `boundary=administrative` relations.
    #[arg(long)]
    administrative_only: bool,

    /// How each area's rings are written.
    #[arg(long, value_enum, default_value_t = Geometry::Polygon)]
    geometry: Geometry,

    /// Fail if any area has segments that could not be closed.
    ///
    /// The output file is still written.
    #[arg(long)]
    strict: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, `--stitch-tolerance` and `--simplify-tolerance` are
    /// ignored. Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the run summary as JSON instead of a human-readable report.
    #[arg(long)]
    diagnostics_json: bool,
}

/// Geometry layout selection.
#[derive(Clone, Copy, ValueEnum)]
enum Geometry {
    /// A Polygon for a single shell with its holes, else a MultiPolygon.
    Polygon,
    /// Always a MultiPolygon, one polygon per shell.
    MultiPolygon,
}

impl From<Geometry> for GeometryKind {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Polygon => Self::Polygon,
            Geometry::MultiPolygon => Self::MultiPolygon,
        }
    }
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual tolerance flags are ignored.
fn config_from_args(args: &ExtractArgs) -> Result<PipelineConfig> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).context("parsing --config-json");
    }
    Ok(PipelineConfig {
        stitch_tolerance: args.stitch_tolerance,
        simplify_tolerance: args.simplify_tolerance,
    })
}

pub fn run(args: &ExtractArgs) -> Result<()> {
    let config = config_from_args(args)?;
    config.validate().context("invalid pipeline config")?;
    log::info!("config: {config:?}");

    let tables = match &args.cache {
        Some(cache) => load_or_extract(&args.src, cache),
        None => read_tables(&args.src),
    }
    .with_context(|| format!("reading {}", args.src.display()))?;

    let filter = AreaFilter {
        admin_level: args.admin_level,
        administrative_only: args.administrative_only,
    };
    let areas = tables.areas(&filter);
    log::info!("processing {} areas", areas.len());

    let results = process_areas(areas, &config)?;
    let summary = RunSummary::from_results(&results);

    let collection = to_feature_collection(&results, args.geometry.into());
    let text = to_geojson_string(&collection)?;
    std::fs::write(&args.dst, text)
        .with_context(|| format!("writing {}", args.dst.display()))?;
    log::info!(
        "wrote {} features to {}",
        collection.features.len(),
        args.dst.display()
    );

    if args.diagnostics_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.report());
    }

    if args.strict && summary.incomplete_areas > 0 {
        bail!(
            "{} area(s) have segments that could not be closed",
            summary.incomplete_areas
        );
    }
    Ok(())
}
