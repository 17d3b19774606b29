pub mod aggregate;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod locale;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod table;
pub mod validate;
pub mod verify;

use std::{env, io::Write, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, OutputFormat},
    config::PipelineConfig,
    pipeline::SummaryOptions,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_ledger", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => handle_init(&args),
        Commands::Summarize(args) => handle_summarize(&args),
        Commands::Clean(args) => export::execute(&args),
        Commands::Verify(args) => verify::execute(&args),
    }
}

fn handle_init(args: &cli::InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "Config file {:?} already exists (use --force to overwrite)",
            args.output
        );
    }
    PipelineConfig::template(&args.source)
        .save(&args.output)
        .with_context(|| format!("Writing config to {:?}", args.output))?;
    info!("Config template written to {:?}", args.output);
    Ok(())
}

fn handle_summarize(args: &cli::SummarizeArgs) -> Result<()> {
    let mut config = load_config(&args.run)?;
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(bucket) = args.bucket {
        config.time_bucket = bucket;
    }
    if let Some(order) = args.order {
        config.group_order = order;
    }
    let run = pipeline::run(&config)?;
    let mut options = SummaryOptions::from_config(&config);
    options.include_timeline = args.timeline;
    let report = pipeline::summarize(&run, &config, &options)?;

    let mut writer = io_utils::open_text_writer(args.output.as_deref())?;
    match args.format {
        OutputFormat::Table => writer.write_all(table::render_report(&report).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &report).context("Writing JSON report")?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    info!(
        "Summarized {} row(s) from {:?} ({} dropped)",
        report.rows_kept, report.source, report.rows_dropped
    );
    Ok(())
}

/// Loads the configuration and applies the command line overrides shared by
/// every pipeline command.
pub(crate) fn load_config(args: &cli::RunArgs) -> Result<PipelineConfig> {
    let mut config = load_config_with_input(
        &args.config,
        args.input.as_deref(),
        args.input_encoding.as_deref(),
    )?;
    if let Some(policy) = args.policy {
        config.row_policy = policy;
    }
    Ok(config)
}

pub(crate) fn load_config_with_input(
    path: &Path,
    input: Option<&Path>,
    encoding: Option<&str>,
) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(path)
        .with_context(|| format!("Loading config from {path:?}"))?;
    if let Some(input) = input {
        config.source_path = input.to_path_buf();
    }
    if let Some(encoding) = encoding {
        config.encoding = Some(encoding.to_string());
    }
    debug!("Resolved config: {config:?}");
    Ok(config)
}
