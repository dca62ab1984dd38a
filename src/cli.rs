use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::ReportFormat;

#[derive(Parser)]
#[command(name = "racewatch")]
#[command(about = "Watches a race calendar page and mails what changed")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/racewatch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress at info level
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    /// Log everything at debug level
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the table, compare with the latest snapshot, mail and archive
    Run(RunArgs),

    /// Fetch the table and print it
    Fetch(FetchArgs),

    /// Compare two archived snapshots
    Diff(DiffArgs),

    /// List archived snapshots, newest first
    List,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Print the report instead of mailing it and leave the snapshots alone
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct FetchArgs {
    /// Output as JSON instead of tab separated text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Older snapshot file
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Newer snapshot file
    #[arg(long)]
    pub to: Option<PathBuf>,

    /// Report format (defaults to the configured one)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Output the raw diff as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
