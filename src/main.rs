// ElwSleuth - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (platform config.toml or --config)
// 3. Logging initialisation (debug mode support)
// 4. Input discovery, the analysis run, and report output

use clap::{Parser, ValueEnum};
use elwsleuth::app::{pipeline, report};
use elwsleuth::core::discovery::{self, DiscoveryConfig};
use elwsleuth::core::export;
use elwsleuth::core::filter::ScanFilter;
use elwsleuth::core::model::AnalysisReport;
use elwsleuth::core::parser::{MalformedPolicy, ParseConfig};
use elwsleuth::platform::config::{self, AppConfig, PlatformPaths};
use elwsleuth::util::{self, constants};
use elwsleuth::util::error::{ExportError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// ElwSleuth - Earth-like world finder for Elite Dangerous journals.
///
/// Reads journal files (or directories of them), keeps first-discovery
/// Earth-like and rocky body scans, and ranks them by Earth Similarity Index.
#[derive(Parser, Debug)]
#[command(name = "ElwSleuth", version, about)]
struct Cli {
    /// Journal files or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Only count scans inside the contest window.
    #[arg(long)]
    contest: bool,

    /// Skip malformed journal lines instead of aborting.
    #[arg(long = "skip-malformed")]
    skip_malformed: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Use this config file instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (app_config, config_warnings) = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&PlatformPaths::resolve().config_dir),
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());
    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "ElwSleuth starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let discovery_config = DiscoveryConfig {
        max_depth: app_config.max_depth,
        max_files: app_config.max_files,
        include_patterns: app_config.include_patterns.clone(),
    };
    let (files, discovery_warnings) = discovery::expand_inputs(&cli.inputs, &discovery_config)?;
    for warning in &discovery_warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    let pipeline_config = pipeline_config(cli, &app_config);
    let report = pipeline::run_files(&files, &pipeline_config, |status| {
        tracing::debug!(status = %status, "Pipeline status");
        eprintln!("{status}");
    })?;

    write_report(&report, cli.format, cli.output.as_deref())
}

/// Merge CLI flags over the loaded configuration.
fn pipeline_config(cli: &Cli, app_config: &AppConfig) -> pipeline::PipelineConfig {
    let filter = if cli.contest || app_config.contest_enabled {
        ScanFilter::with_contest(app_config.contest_window)
    } else {
        ScanFilter::default()
    };
    let malformed = if cli.skip_malformed {
        MalformedPolicy::Skip
    } else {
        app_config.malformed
    };

    pipeline::PipelineConfig {
        parse: ParseConfig {
            filter,
            malformed,
            ..Default::default()
        },
        large_file_threshold: app_config.large_file_threshold,
        worker_threads: app_config.worker_threads,
    }
}

fn write_report(
    report: &AnalysisReport,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let label = output.unwrap_or_else(|| Path::new("<stdout>"));
    let io_err = |e: io::Error| ExportError::Io {
        path: label.to_path_buf(),
        source: e,
    };

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(io_err)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match format {
        OutputFormat::Text => report::render_text(report, &mut writer).map_err(io_err)?,
        OutputFormat::Csv => {
            let rows = export::export_detail_csv(&report.bodies, &mut writer, label)?;
            tracing::info!(rows, path = %label.display(), "CSV written");
        }
        OutputFormat::Json => {
            let bodies = export::export_json(report, &mut writer, label)?;
            tracing::info!(bodies, path = %label.display(), "JSON written");
        }
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}
