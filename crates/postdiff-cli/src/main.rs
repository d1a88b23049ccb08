//! postdiff CLI
//!
//! Command-line interface for seeding a store and reporting index column
//! posting diffs

use clap::{Parser, Subcommand, ValueEnum};
use postdiff_core::logging_facility::{init, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "postdiff")]
#[command(about = "postdiff - Posting diff reports", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(
        long,
        global = true,
        value_enum,
        env = "POSTDIFF_LOG_FORMAT",
        default_value = "dev"
    )]
    log_format: LogFormat,

    /// Store database path
    #[arg(
        long,
        global = true,
        env = "POSTDIFF_DB",
        default_value = ".postdiff/store.db"
    )]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable
    Dev,
    /// JSON lines
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Report the posting diff of an index column
    IndexColumnDiff(commands::index_column_diff::IndexColumnDiffArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Dev => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Seed(args) => commands::seed::execute(args, &cli.db),
        Commands::IndexColumnDiff(args) => commands::index_column_diff::execute(args, &cli.db),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
