//! Command-line front end for `pom-metadata`.
//!
//! Reads one pom.xml and prints the extracted metadata as JSON, together with
//! the effective (inheritance-resolved) coordinate of the module.

use anyhow::{Context, Result};
use clap::Parser;
use pom_metadata::{Coordinate, Extractor, ExtractorConfig, ProjectMetadata};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pom-inspect",
    version,
    about = "Extract review metadata from a Maven pom.xml"
)]
struct Cli {
    /// Path to the pom.xml to inspect.
    pom: PathBuf,

    /// JSON file overriding plugin and property names.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Log extraction details to stderr (same as `RUST_LOG=debug`).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    effective_coordinate: Option<Coordinate>,
    #[serde(flatten)]
    metadata: &'a ProjectMetadata,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => ExtractorConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    let extractor = Extractor::new(config)?;
    tracing::debug!("extractor configuration: {:?}", extractor.config());
    let metadata = extractor
        .extract_path(&cli.pom)
        .with_context(|| format!("failed to extract metadata from {}", cli.pom.display()))?;

    let effective_coordinate = match metadata.effective_coordinate() {
        Ok(gav) => Some(gav),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    };

    let report = Report {
        effective_coordinate,
        metadata: &metadata,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
