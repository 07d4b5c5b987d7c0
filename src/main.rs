//! tk-stemmingen main entry point
//!
//! This is the command-line interface for harvesting Tweede Kamer votings.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tk_stemmingen::config::{load_config_with_hash, Config};
use tk_stemmingen::crawler::{CrawlOptions, CrawlRequest, Crawler};
use tk_stemmingen::dates::{DateRange, DATE_KEY_FORMAT};
use tk_stemmingen::extract::CommandExtractor;
use tk_stemmingen::output::{
    ledger_statistics, print_crawl_stats, print_ledger_statistics, RecordWriter,
};
use tk_stemmingen::source::TweedeKamerSource;
use tk_stemmingen::state::{open_ledgers, ProgressStore, PROGRESS_FILE};
use tk_stemmingen::storage::Loader;
use tracing_subscriber::EnvFilter;

/// tk-stemmingen: harvests roll-call votes of the Tweede Kamer
///
/// Votings are written as one directory of CSV tables each. Progress and
/// quarantined failures are kept in two ledgers so any run can be
/// interrupted and resumed.
#[derive(Parser, Debug)]
#[command(name = "tk-stemmingen")]
#[command(version)]
#[command(about = "Harvests Tweede Kamer voting results", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest votings between two dates
    Run(RunArgs),

    /// Reconstruct the progress ledger from the output tree
    RebuildProgress {
        /// Output tree to read (defaults to the configured data-dir)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Show ledger statistics and exit
    Stats,

    /// Load the output tree into SQLite
    Load {
        /// Output tree to load (defaults to the configured data-dir)
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Database file (defaults to the configured database-path)
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// First date to harvest (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    from: NaiveDate,

    /// Last date to harvest (YYYY-MM-DD, defaults to today)
    #[arg(value_parser = parse_date)]
    to: Option<NaiveDate>,

    /// Output tree (defaults to the configured data-dir)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Reprocess votings already marked complete
    #[arg(long)]
    full_refresh: bool,

    /// Whitespace-separated voting ids to restrict the run to
    #[arg(long, value_name = "IDS")]
    select: Option<String>,

    /// Abort on the first failing motion instead of quarantining it
    #[arg(long)]
    strict: bool,

    /// Reprocess selected votings even when already complete
    #[arg(long)]
    selection_forces_refresh: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = dispatch(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => handle_run(config, args).await,
        Command::RebuildProgress { output_dir } => handle_rebuild(&config, output_dir),
        Command::Stats => handle_stats(&config),
        Command::Load { data_dir, database } => handle_load(&config, data_dir, database),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tk_stemmingen=info,warn"),
            1 => EnvFilter::new("tk_stemmingen=debug,info"),
            _ => EnvFilter::new("tk_stemmingen=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, DATE_KEY_FORMAT)
        .map_err(|e| format!("expected a date as YYYY-MM-DD: {}", e))
}

fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given; using defaults");
            Ok(Config::default())
        }
    }
}

/// Handles the `run` command: harvests votings for a date range
async fn handle_run(mut config: Config, args: RunArgs) -> anyhow::Result<()> {
    config.behaviour.strict_nested |= args.strict;
    config.behaviour.selection_forces_refresh |= args.selection_forces_refresh;

    let data_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.output.data_dir));
    let state_dir = PathBuf::from(&config.output.state_dir);

    let (progress, errors) = open_ledgers(&state_dir).context("failed to open ledgers")?;
    let source = TweedeKamerSource::new(&config)?;
    let writer = RecordWriter::new(data_dir);
    tracing::info!("Harvesting {} into {}", source.base(), writer.root().display());
    tracing::info!(
        "Ledgers: {} and {}",
        progress.path().display(),
        errors.path().display()
    );
    let extractor = CommandExtractor::from_config(&config.extractor);
    let options = CrawlOptions::from_config(&config.behaviour);

    let request = CrawlRequest {
        range: DateRange::until_today(args.from, args.to),
        selection: args.select.as_deref().map(CrawlRequest::parse_selection),
        full_refresh: args.full_refresh,
    };
    if let Some(selection) = &request.selection {
        tracing::info!("Restricted to {} selected votings", selection.len());
    }

    let mut crawler = Crawler::new(
        source,
        extractor,
        writer,
        progress,
        errors,
        options,
    );
    let stats = crawler.run(&request).await.context("harvest aborted")?;

    print_crawl_stats(&stats);
    Ok(())
}

/// Handles the `rebuild-progress` command
fn handle_rebuild(config: &Config, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let data_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.output.data_dir));
    let path = Path::new(&config.output.state_dir).join(PROGRESS_FILE);

    let progress = ProgressStore::rebuild(&path, &data_dir)
        .with_context(|| format!("failed to rebuild {}", path.display()))?;

    println!(
        "✓ Rebuilt {}: {} votings over {} dates",
        path.display(),
        progress.len(),
        progress.dates().len()
    );
    Ok(())
}

/// Handles the `stats` command: summarizes both ledgers
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let (progress, errors) =
        open_ledgers(Path::new(&config.output.state_dir)).context("failed to open ledgers")?;
    println!(
        "Ledgers: {} and {}\n",
        progress.path().display(),
        errors.path().display()
    );
    let stats = ledger_statistics(&progress, &errors);
    print_ledger_statistics(&stats, &errors);

    Ok(())
}

/// Handles the `load` command: loads the output tree into SQLite
fn handle_load(
    config: &Config,
    data_dir: Option<PathBuf>,
    database: Option<PathBuf>,
) -> anyhow::Result<()> {
    let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.output.data_dir));
    let database = database.unwrap_or_else(|| PathBuf::from(&config.output.database_path));

    let mut loader = Loader::open(&database)
        .with_context(|| format!("failed to open {}", database.display()))?;
    let summary = loader
        .load_tree(&data_dir)
        .with_context(|| format!("failed to load {}", data_dir.display()))?;

    println!("=== Load Summary ===\n");
    println!("  Database: {}", database.display());
    println!("  Items loaded: {}", summary.items);
    println!("  Items skipped: {}", summary.skipped);
    println!("  Votings: {}", summary.votings);
    println!("  Motions: {}", summary.motions);
    println!("  Sponsors: {}", summary.sponsors);
    println!("  Vote details: {}", summary.details);

    Ok(())
}
