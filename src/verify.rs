use anyhow::{Result, anyhow};
use log::info;

use crate::{cli::VerifyArgs, io_utils, pipeline, table, validate::RowPolicy};

/// Runs the pipeline leniently and reports every row that would be dropped.
pub fn execute(args: &VerifyArgs) -> Result<()> {
    let config = crate::load_config_with_input(
        &args.config,
        args.input.as_deref(),
        args.input_encoding.as_deref(),
    )?;
    let encoding = io_utils::resolve_encoding(config.encoding.as_deref())?;
    let run = pipeline::ingest(
        &config.source_path,
        encoding,
        &config.schema,
        RowPolicy::Lenient,
    )?;
    if run.dropped.is_empty() {
        info!(
            "✓ {:?}: all {} row(s) normalize cleanly",
            run.source, run.rows_read
        );
        return Ok(());
    }
    print!("{}", table::render_dropped(&run.dropped));
    Err(anyhow!(
        "{} of {} row(s) in {:?} failed normalization",
        run.dropped_count(),
        run.rows_read,
        run.source
    ))
}
