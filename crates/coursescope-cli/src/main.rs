use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coursescope_audit::{AuditExtractor, AuditParsingConfigBuilder, AuditReport, SummaryOutcome};
use coursescope_catalog::CatalogDatabase;
use coursescope_core::config_file::{self, Settings};

mod output;

use output::ColorMode;

/// CourseScope - Read degree-audit PDFs and check them against a course catalog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a degree-audit PDF and list completed and in-progress courses
    Parse {
        /// Path to the audit PDF
        file_path: PathBuf,

        /// Reconcile against this major's requirements
        #[arg(long)]
        major_id: Option<i64>,

        /// Path to the course catalog database
        #[arg(long)]
        db: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Create an empty course catalog database
    InitDb {
        /// Path of the SQLite file to create
        path: PathBuf,
    },
}

/// Catalog file used when no flag, env var or config entry names one.
const DEFAULT_DB_PATH: &str = "uic_courses.db";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let settings = config_file::resolve(&config_file::load_config());

    match cli.command {
        Command::Parse {
            file_path,
            major_id,
            db,
            json,
            no_color,
        } => {
            let db_path = db
                .or_else(|| settings.db_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
            parse(&file_path, major_id, &db_path, &settings, json, ColorMode(!no_color))
        }
        Command::InitDb { path } => init_db(&path),
    }
}

fn parse(
    file_path: &Path,
    major_id: Option<i64>,
    db_path: &Path,
    settings: &Settings,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let mut builder =
        AuditParsingConfigBuilder::new().track_planned_and_needed(settings.track_planned_and_needed);
    for pattern in &settings.extra_ignore_patterns {
        builder = builder.add_ignore_pattern(pattern.clone());
    }
    let config = builder
        .build()
        .context("invalid ignore pattern in [parsing] config")?;

    let bytes = std::fs::read(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let chain = coursescope_ingest::default_chain();
    let parsed = AuditExtractor::with_config(config)
        .parse_pdf(&bytes, &chain)
        .with_context(|| format!("failed to parse {}", file_path.display()))?;

    let summary = match major_id {
        None => SummaryOutcome::NotRequested,
        Some(id) => match CatalogDatabase::open(db_path) {
            Ok(catalog) => coursescope_audit::summarize_for_major(&parsed, Some(id), &catalog),
            Err(e) => {
                tracing::warn!(path = %db_path.display(), error = %e, "catalog unavailable");
                SummaryOutcome::Failed {
                    error: format!("Failed to compute remaining requirements: {e}"),
                }
            }
        },
    };
    let report = AuditReport { parsed, summary };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.display().to_string());
        output::print_parsed(&mut out, &name, &report.parsed, color)?;
        output::print_summary(&mut out, &report.summary, color)?;
    }
    Ok(())
}

fn init_db(path: &Path) -> anyhow::Result<()> {
    CatalogDatabase::create(path)
        .with_context(|| format!("failed to create catalog at {}", path.display()))?;
    println!("Initialized course catalog at {}", path.display());
    Ok(())
}
