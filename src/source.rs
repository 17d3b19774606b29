//! Source reader: turns a delimited ledger into a [`RawTable`].
//!
//! The delimiter is chosen by ordered trial over
//! [`io_utils::CANDIDATE_DELIMITERS`]. A candidate is accepted when the text
//! parses without a structural error and the header has more than one column.
//! No other sniffing is attempted.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    error::{PipelineError, PipelineResult},
    io_utils,
};

/// One data row. Cells that are empty after trimming are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    cells: Vec<Option<String>>,
}

impl RawRecord {
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).and_then(|cell| cell.as_deref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RawTable {
    path: PathBuf,
    delimiter: u8,
    headers: Vec<String>,
    records: Vec<RawRecord>,
}

impl RawTable {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the first column whose trimmed header equals `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let wanted = header.trim();
        self.headers.iter().position(|h| h.trim() == wanted)
    }

    pub fn cell(&self, record: &RawRecord, header: &str) -> Option<String> {
        self.column_index(header)
            .and_then(|idx| record.get(idx))
            .map(str::to_string)
    }
}

pub fn read_raw_table(path: &Path, encoding: &'static Encoding) -> PipelineResult<RawTable> {
    let bytes =
        io_utils::read_source_bytes(path).map_err(|source| PipelineError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    let text = io_utils::decode_bytes(&bytes, encoding).ok_or_else(|| {
        PipelineError::SourceMalformed {
            path: path.to_path_buf(),
            reason: format!("content is not valid {}", encoding.name()),
        }
    })?;
    let table = parse_raw_table(&text, path)?;
    info!(
        "Read {} row(s) from {:?} using delimiter '{}'",
        table.len(),
        path,
        io_utils::printable_delimiter(table.delimiter)
    );
    Ok(table)
}

/// Parses already-decoded text. `path` is only used to label errors.
pub fn parse_raw_table(text: &str, path: &Path) -> PipelineResult<RawTable> {
    let mut failures = Vec::with_capacity(io_utils::CANDIDATE_DELIMITERS.len());
    for delimiter in io_utils::CANDIDATE_DELIMITERS {
        match parse_with_delimiter(text, delimiter) {
            Ok((headers, records)) => {
                if records.is_empty() {
                    return Err(PipelineError::SourceMalformed {
                        path: path.to_path_buf(),
                        reason: "table has a header but no data rows".to_string(),
                    });
                }
                return Ok(RawTable {
                    path: path.to_path_buf(),
                    delimiter,
                    headers,
                    records,
                });
            }
            Err(reason) => {
                debug!(
                    "Delimiter '{}' rejected for {:?}: {}",
                    io_utils::printable_delimiter(delimiter),
                    path,
                    reason
                );
                failures.push(format!(
                    "'{}': {reason}",
                    io_utils::printable_delimiter(delimiter)
                ));
            }
        }
    }
    Err(PipelineError::SourceMalformed {
        path: path.to_path_buf(),
        reason: format!("no candidate delimiter fits ({})", failures.join("; ")),
    })
}

fn parse_with_delimiter(
    text: &str,
    delimiter: u8,
) -> Result<(Vec<String>, Vec<RawRecord>), String> {
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter);
    let headers = reader
        .headers()
        .map_err(|err| err.to_string())?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.len() <= 1 {
        return Err(format!("header has {} column(s)", headers.len()));
    }
    let mut records = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| format!("row {}: {err}", row_idx + 1))?;
        let cells = record
            .iter()
            .map(|cell| {
                let trimmed = cell.trim();
                (!trimmed.is_empty()).then(|| cell.to_string())
            })
            .collect();
        records.push(RawRecord { cells });
    }
    Ok((headers, records))
}
