//! Wirecrate CLI - wire extraction from LiDAR point tables
//!
//! Provides subcommands for:
//! - `run`: separate wires, fit catenaries and export results per dataset
//! - `separate`: write per-point wire labels only
//! - `synth`: generate a synthetic multi-wire point table

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};

use wirecrate_algorithms::{
    extract_wires, separate, AxisChoice, CatenaryFitOptions, CurveFitParams, PipelineConfig,
    SeparationParams,
};
use wirecrate_core::Bounded;
use wirecrate_io::{export_report, read_point_cloud, write_labeled_points, XyzCsvWriteOptions, XyzCsvWriter};

mod synth;

#[derive(Parser, Debug)]
#[command(name = "wirecrate")]
#[command(about = "Separate power-line wires in LiDAR point clouds and fit catenary curves", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Separate, fit and export every input dataset
    Run(RunArgs),
    /// Label points with wire ids and write them to a table
    Separate(SeparateArgs),
    /// Generate a synthetic multi-wire point table
    Synth(synth::SynthArgs),
}

#[derive(Args, Debug, Clone)]
struct SeparationOpts {
    /// DBSCAN neighbourhood radius along the clustering axis
    #[arg(long, default_value = "0.1")]
    eps: f64,

    /// Minimum neighbourhood size for a core point
    #[arg(long, default_value = "5")]
    min_samples: usize,

    /// Principal axis to cluster on: 0, 1, 2 or auto
    #[arg(long, default_value = "1", value_parser = parse_axis)]
    axis: AxisChoice,

    /// Per-dataset axis override, e.g. `--axis-for medium=2` (repeatable)
    #[arg(long = "axis-for", value_parser = parse_axis_override)]
    axis_for: Vec<(String, AxisChoice)>,
}

impl SeparationOpts {
    /// Separation parameters for the dataset called `name`
    fn params_for(&self, name: &str) -> SeparationParams {
        let axis = self
            .axis_for
            .iter()
            .rev()
            .find(|(dataset, _)| dataset == name)
            .map(|(_, axis)| *axis)
            .unwrap_or(self.axis);

        SeparationParams::default()
            .with_eps(self.eps)
            .with_min_samples(self.min_samples)
            .with_axis(axis)
    }
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input point tables (.csv, .xyz or .txt)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    separation: SeparationOpts,

    /// Curve samples per wire
    #[arg(long, default_value = "300")]
    samples: usize,

    /// Seed for the catenary parameter c
    #[arg(long, default_value = "10.0")]
    initial_c: f64,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Fit wires on a single thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct SeparateArgs {
    /// Input point table
    input: PathBuf,

    /// Output CSV with an added wire column
    output: PathBuf,

    #[command(flatten)]
    separation: SeparationOpts,
}

fn parse_axis(value: &str) -> std::result::Result<AxisChoice, String> {
    match value.trim().to_lowercase().as_str() {
        "auto" => Ok(AxisChoice::Auto),
        other => match other.parse::<usize>() {
            Ok(axis) if axis <= 2 => Ok(AxisChoice::Fixed(axis)),
            _ => Err(format!("expected 0, 1, 2 or auto, got '{value}'")),
        },
    }
}

fn parse_axis_override(value: &str) -> std::result::Result<(String, AxisChoice), String> {
    let (name, axis) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AXIS, got '{value}'"))?;
    if name.is_empty() {
        return Err(format!("missing dataset name in '{value}'"));
    }
    Ok((name.to_string(), parse_axis(axis)?))
}

/// Dataset name used for output files and axis overrides: the file stem
fn dataset_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a dataset name from {}", path.display()))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: &RunArgs) -> Result<()> {
    // Every input must exist before any work starts
    for input in &args.inputs {
        if !input.exists() {
            bail!("File missing: {}", input.display());
        }
    }

    let fitting = CurveFitParams::default()
        .with_samples(args.samples)
        .with_parallel(!args.sequential)
        .with_fit_options(CatenaryFitOptions::default().with_initial_c(args.initial_c));

    for input in &args.inputs {
        let name = dataset_name(input)?;
        let cloud = read_point_cloud(input)
            .with_context(|| format!("Failed to load {}", input.display()))?;
        let (min, max) = cloud.bounding_box();
        info!(
            "Loaded {} points from {} (extent {:?} to {:?})",
            cloud.len(),
            input.display(),
            min.coords.as_slice(),
            max.coords.as_slice()
        );

        let config = PipelineConfig::default()
            .with_separation(args.separation.params_for(&name))
            .with_fitting(fitting.clone());
        let extraction = extract_wires(&cloud, &config)
            .with_context(|| format!("Wire extraction failed for {name}"))?;

        let paths = export_report(&args.output, &name, &cloud, &extraction.labels, &extraction.report)
            .with_context(|| format!("Failed to export results to {}", args.output.display()))?;

        println!(
            "{name}: {} wires ({} clusters, {} noise points, {} skipped) -> {}",
            extraction.wire_count(),
            extraction.cluster_count(),
            extraction.noise_count(),
            extraction.report.skipped.len(),
            paths.params.display()
        );
    }

    Ok(())
}

fn separate_only(args: &SeparateArgs) -> Result<()> {
    let name = dataset_name(&args.input)?;
    let cloud = read_point_cloud(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let labels = separate(&cloud, &args.separation.params_for(&name))
        .with_context(|| format!("Wire separation failed for {name}"))?;

    write_labeled_points(&args.output, &cloud, &labels)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let clusters = wirecrate_core::group_by_wire(&labels).len();
    println!(
        "{name}: {clusters} clusters, {} noise points -> {}",
        wirecrate_core::noise_count(&labels),
        args.output.display()
    );
    Ok(())
}

fn synthesize(args: &synth::SynthArgs) -> Result<()> {
    let (cloud, labels) = synth::generate(args)?;
    let options = XyzCsvWriteOptions::for_path(&args.output);

    let written = if args.labels {
        XyzCsvWriter::write_labeled_points(&cloud, &labels, &args.output, &options)
    } else {
        XyzCsvWriter::write_point_cloud(&cloud, &args.output, &options)
    };
    written.with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Wrote {} points to {}", cloud.len(), args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Run(args) => run(args),
        Commands::Separate(args) => separate_only(args),
        Commands::Synth(args) => synthesize(args),
    }
}
