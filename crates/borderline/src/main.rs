//! borderline: turn OSM boundary relations into simplified GeoJSON polygons.
//!
//! Two subcommands:
//!
//! - `extract` reads an `.osm` XML extract, stitches each boundary
//!   relation's ways into closed rings, simplifies them and writes a
//!   GeoJSON `FeatureCollection` with one feature per relation.
//! - `simplify` re-simplifies a `FeatureCollection` written earlier.
//!
//! # Usage
//!
//! ```text
//! borderline extract --src country.osm --dst country.geojson --cache country.cache
//! borderline simplify country.geojson coarse.geojson --tolerance 0.5
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for per-area
//! details.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod extract;
mod simplify;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};

/// Stitch administrative boundary ways into closed, simplified polygons.
#[derive(Parser)]
#[command(name = "borderline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract boundary relations from OSM XML and write them as GeoJSON.
    Extract(extract::ExtractArgs),
    /// Re-simplify the polygons of an existing GeoJSON FeatureCollection.
    Simplify(simplify::SimplifyArgs),
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Extract(args) => extract::run(args),
        Command::Simplify(args) => simplify::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
