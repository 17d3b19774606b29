//! Error taxonomy for the ingestion pipeline.
//!
//! Setup failures (`SourceUnavailable`, `SourceMalformed`, `MissingColumn`)
//! abort a run before any record is normalized. Cell-level failures surface as
//! [`NormalizationError`] and never leave the row validator on their own: they
//! either become [`PipelineError::InvalidRow`] (strict policy) or a dropped row
//! (lenient policy).

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::FieldKind;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source {path:?} is unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Source {path:?} is malformed: {reason}")]
    SourceMalformed { path: PathBuf, reason: String },
    #[error("Source {path:?} has no column '{header}'")]
    MissingColumn { path: PathBuf, header: String },
    #[error(
        "Source {path:?} row {row}: field '{field}' (column '{header}') has invalid value '{raw_value}': {reason}"
    )]
    InvalidRow {
        path: PathBuf,
        row: usize,
        field: String,
        header: String,
        raw_value: String,
        reason: NormalizationFailure,
    },
}

/// A single cell that could not be converted to its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read '{raw}' as {kind}: {failure}")]
pub struct NormalizationError {
    pub kind: FieldKind,
    pub raw: String,
    pub failure: NormalizationFailure,
}

impl NormalizationError {
    pub fn new(kind: FieldKind, raw: impl Into<String>, failure: NormalizationFailure) -> Self {
        Self {
            kind,
            raw: raw.into(),
            failure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NormalizationFailure {
    #[error("value is empty")]
    Empty,
    #[error("no accepted day-first date pattern matches")]
    UnrecognizedDate,
    #[error("amount contains non-numeric characters")]
    NonNumericAmount,
    #[error("amount is out of range")]
    AmountOutOfRange,
}
