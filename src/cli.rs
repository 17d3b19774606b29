use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    aggregate::{GroupOrder, TimeBucket},
    validate::RowPolicy,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize sales ledgers and summarize them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a starter configuration for the classic ledger layout
    Init(InitArgs),
    /// Normalize a ledger and print KPIs and grouped series
    Summarize(SummarizeArgs),
    /// Normalize a ledger and write the clean rows as CSV
    Clean(CleanArgs),
    /// List rows that fail normalization (exits non-zero when any do)
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Destination configuration file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Ledger path recorded in the configuration
    #[arg(long = "source", default_value = "dados.csv")]
    pub source: PathBuf,
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Options shared by every command that runs the pipeline.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// YAML configuration describing the source and schema
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Ledger to read instead of the configured source_path ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Character encoding of the ledger (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Row validation policy, overriding the configuration
    #[arg(long = "policy", value_enum)]
    pub policy: Option<RowPolicy>,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub run: RunArgs,
    /// Number of categories kept in each ranking (0 means all)
    #[arg(long = "top-n")]
    pub top_n: Option<usize>,
    /// Width of the time buckets
    #[arg(long = "bucket", value_enum)]
    pub bucket: Option<TimeBucket>,
    /// Ordering of the per-category totals
    #[arg(long = "order", value_enum)]
    pub order: Option<GroupOrder>,
    /// Include the row-level date/amount series
    #[arg(long)]
    pub timeline: bool,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub run: RunArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// YAML configuration describing the source and schema
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Ledger to read instead of the configured source_path ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Character encoding of the ledger (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}
