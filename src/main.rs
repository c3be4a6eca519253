//! md-orphan: find markdown files no entry point links to, and report
//! broken, ambiguous, and broken-anchor links along the way.

mod anchors;
mod config;
mod crawler;
mod discover;
mod error;
mod exclude;
mod paths;
mod report;
mod resolver;
mod scanner;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::config::Config;
use crate::crawler::Crawler;
use crate::error::Error;
use crate::report::Report;

/// Exit status when configuration or usage is wrong (matches clap's own).
const EXIT_CONFIG_ERROR: u8 = 2;

/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "md-orphan",
    version,
    about = "Find markdown files unreachable from entry points and report broken links"
)]
struct Cli {
    /// Config file to use instead of `.md-orphan.toml` in the crawl root.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Markdown files the crawl starts from. The first one's directory is the crawl root.
    #[arg(required = true, value_name = "ENTRY_POINTS")]
    entry_points: Vec<PathBuf>,
    /// Paths to skip, relative to the crawl root. Repeatable; values may be comma-separated.
    #[arg(long, value_name = "PATTERNS")]
    exclude: Vec<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Don't check link fragments against target headings.
    #[arg(long)]
    no_anchors: bool,
    /// Confirm clean runs and log crawl progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// Report formats.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Pretty-printed JSON object.
    Json,
    /// Plain text sections.
    Text,
}

/// Canonicalize every entry point.
///
/// # Errors
///
/// Returns `Error::NoEntryPoints` for an empty list, or `Error::EntryNotFound`
/// for the first entry that does not exist.
fn canonical_entries(entries: &[PathBuf]) -> Result<Vec<PathBuf>, Error> {
    if entries.is_empty() {
        return Err(Error::NoEntryPoints);
    }
    return entries
        .iter()
        .map(|entry| {
            return paths::canonicalize(entry).ok_or_else(|| return Error::EntryNotFound { path: entry.clone() });
        })
        .collect();
}

/// Send `tracing` events to stderr. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Parse arguments and run; configuration errors exit with status 2.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    return match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            report::print_error(&e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        },
    };
}

/// Load config, discover documents, crawl from the entry points, print the report.
/// Exits with failure when any orphan or link issue is found.
///
/// # Errors
///
/// Returns configuration errors: missing entry points, a missing or
/// malformed config file, or an invalid exclude pattern. Also
/// `Error::Json` if the JSON report cannot be serialized.
fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let entries = canonical_entries(&cli.entry_points)?;
    let root = entries
        .first()
        .map(|entry| return paths::parent_dir(entry))
        .ok_or(Error::NoEntryPoints)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(&root)?,
    };
    config.extend_exclude(&cli.exclude);
    if cli.no_anchors {
        config.disable_anchors();
    }
    let exclude = config.exclude_matcher()?;

    let discovered = discover::discover(&root, &exclude);
    if discovered.is_empty() {
        tracing::warn!(root = %root.display(), "no markdown files found under crawl root");
    }
    tracing::info!(
        root = %root.display(),
        discovered = discovered.len(),
        excluding = !exclude.is_empty(),
        "starting crawl"
    );

    let outcome = Crawler::new(&root, &discovered)
        .check_anchors(config.anchors_enabled())
        .run(&entries);
    let report = Report::new(&root, &entries, &discovered, outcome);

    match cli.format {
        Format::Json => println!("{}", report.render_json()?),
        Format::Text => print!("{}", report.render_text(cli.verbose)),
    }

    if report.is_clean() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::FAILURE);
}
