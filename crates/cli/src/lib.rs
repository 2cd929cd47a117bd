use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod analyze;
mod lookup;
mod report;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "pervasive")]
#[command(about = "Discover URL patterns that stay popular month after month", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build patterns from monthly crawl snapshots
    Analyze(AnalyzeArgs),

    /// Check URLs against a patterns file
    Match(MatchArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct AnalyzeArgs {
    /// Directory holding one `YYYY-MM.json` snapshot per month
    #[arg(long)]
    pub(crate) data_dir: PathBuf,

    /// Current month (defaults to the newest snapshot in --data-dir)
    #[arg(long)]
    pub(crate) current: Option<String>,

    /// Number of months to track, ending at the current month
    #[arg(long)]
    pub(crate) months: Option<usize>,

    /// TOML config file (overrides PERVASIVE_CONFIG)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Where to write the patterns
    #[arg(long, short = 'o', default_value = "patterns.txt")]
    pub(crate) output: PathBuf,

    /// Minimum monthly occurrences for a pattern to be kept
    #[arg(long)]
    pub(crate) threshold: Option<u64>,

    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct MatchArgs {
    /// Patterns file, one pattern per line
    #[arg(long)]
    pub(crate) patterns: PathBuf,

    /// URLs to check
    #[arg(required = true)]
    pub(crate) urls: Vec<String>,

    /// Output JSON instead of tab-separated lines
    #[arg(long)]
    pub(crate) json: bool,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout carries JSON, keep it free of anything else
    let json_output = match &cli.command {
        Commands::Analyze(args) => args.json,
        Commands::Match(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Analyze(args) => analyze::run(args),
        Commands::Match(args) => lookup::run(args),
    }
}
