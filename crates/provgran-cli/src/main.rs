//! provgran
//!
//! Loads a provenance document and writes one snapshot per granularity level,
//! either by importance-driven pairwise merging (`generalize`) or by the
//! change-type hierarchy (`granularities`).

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use provgran_core::EngineConfig;
use provgran_graph::snapshot::strip_extension;
use provgran_graph::{FileSnapshotWriter, ProvGraph, RdfFormat, SnapshotNaming, ThreadView};
use provgran_observability::tracing_setup;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatChoice {
    Turtle,
    Ntriples,
}

impl From<FormatChoice> for RdfFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Turtle => RdfFormat::Turtle,
            FormatChoice::Ntriples => RdfFormat::NTriples,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "provgran")]
#[command(about = "Coarsen PROV-O provenance graphs level by level", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge the least important activity into a neighbour until one is left.
    Generalize(RunArgs),
    /// Merge along the change-type hierarchy, flat then up, per type.
    Granularities(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Provenance document: Turtle (.ttl, .n3) or N-Triples (.nt). RDF/XML
    /// and JSON-LD are not read.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Base path for the level snapshots. Defaults to the input without its
    /// extension.
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Snapshot format.
    #[arg(long, value_enum, default_value_t = FormatChoice::Turtle)]
    format: FormatChoice,

    /// Engine configuration JSON (tags, weights, change hierarchy).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write process, data and process-and-data thread views.
    #[arg(long)]
    threads: bool,

    /// Recompute structural tags before reducing.
    #[arg(long)]
    structural_tags: bool,

    /// Write the per-level report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn prepare(args: &RunArgs, naming: SnapshotNaming) -> anyhow::Result<(ProvGraph, FileSnapshotWriter)> {
    let config = load_config(args.config.as_deref())?;
    let mut graph = ProvGraph::load(config, &args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let inferred = graph.infer_was_informed_by_links();
    if args.structural_tags {
        graph.add_structural_tags();
    }
    info!(
        input = %args.input.display(),
        triples = graph.len(),
        activities = graph.activities().len(),
        inferred,
        "Graph loaded"
    );

    let base = args
        .out
        .clone()
        .unwrap_or_else(|| strip_extension(&args.input));
    let mut writer = FileSnapshotWriter::new(base, naming, args.format.into());
    if args.threads {
        writer = writer.with_views(ThreadView::ALL);
    }
    Ok((graph, writer))
}

fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> anyhow::Result<()> {
    if let Some(path) = path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_setup::init_tracing();

    match Cli::parse().command {
        Command::Generalize(args) => {
            let (mut graph, mut writer) = prepare(&args, SnapshotNaming::Dash)?;
            let report = graph.generalize(&mut writer).context("Generalization failed")?;
            write_report(args.report.as_deref(), &report)?;
            println!(
                "Wrote {} levels ({} files) after {} merges",
                report.levels.len(),
                writer.written().len(),
                report.merges.len()
            );
        }
        Command::Granularities(args) => {
            let (mut graph, mut writer) = prepare(&args, SnapshotNaming::Log)?;
            let report = graph
                .serialize_granularities(&mut writer)
                .context("Granularity reduction failed")?;
            write_report(args.report.as_deref(), &report)?;
            println!(
                "Wrote {} levels ({} files), {} branch points kept",
                report.levels.len(),
                writer.written().len(),
                report.branches.len()
            );
        }
    }
    Ok(())
}
