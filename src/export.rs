use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{cli::CleanArgs, data::CleanTable, io_utils, pipeline};

pub fn execute(args: &CleanArgs) -> Result<()> {
    let config = crate::load_config(&args.run)?;
    let run = pipeline::run(&config)?;
    let mut writer = io_utils::open_csv_writer(args.output.as_deref())?;
    write_clean_table(&run.table, &mut writer)?;
    writer.flush().context("Flushing clean output")?;
    info!(
        "Wrote {} clean row(s) to {} ({} dropped)",
        run.table.len(),
        describe_output(args.output.as_deref()),
        run.dropped_count()
    );
    Ok(())
}

/// Writes the clean table with a leading `row` column holding the source row
/// number, followed by one column per schema field named after the field.
pub fn write_clean_table<W: Write>(table: &CleanTable, writer: &mut csv::Writer<W>) -> Result<()> {
    let mut header = Vec::with_capacity(table.schema().fields().len() + 1);
    header.push("row".to_string());
    header.extend(table.schema().fields().iter().map(|f| f.name.clone()));
    writer
        .write_record(&header)
        .context("Writing clean header")?;
    for record in table.records() {
        let mut cells = Vec::with_capacity(header.len());
        cells.push(record.row().to_string());
        cells.extend(record.values().iter().map(|v| v.as_display()));
        writer
            .write_record(&cells)
            .with_context(|| format!("Writing clean row {}", record.row()))?;
    }
    Ok(())
}

fn describe_output(path: Option<&Path>) -> String {
    match path {
        Some(p) if !io_utils::is_dash(p) => format!("{p:?}"),
        _ => "stdout".to_string(),
    }
}
