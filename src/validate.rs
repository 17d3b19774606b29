//! Row validator: applies the configured [`RowPolicy`] to normalization
//! outcomes and produces the [`CleanTable`].
//!
//! Only schema fields are normalized; any other raw column is ignored. Under
//! [`RowPolicy::Strict`] the first failing cell aborts the run. Under
//! [`RowPolicy::Lenient`] the row is left out and recorded as a
//! [`DroppedRow`], so `clean rows + dropped rows == raw rows` always holds.

use clap::ValueEnum;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    data::{CleanRecord, CleanTable, Value},
    error::{NormalizationError, NormalizationFailure, PipelineError, PipelineResult},
    normalize::normalize_cell,
    schema::{BoundSchema, FieldSpec, Schema},
    source::{RawRecord, RawTable},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum RowPolicy {
    #[default]
    Strict,
    Lenient,
}

/// A row excluded under the lenient policy, located by its first failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub row: usize,
    pub field: String,
    pub header: String,
    pub raw_value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: CleanTable,
    pub dropped: Vec<DroppedRow>,
}

impl Cleaned {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

pub fn clean_table(
    raw: &RawTable,
    schema: &Schema,
    bound: &BoundSchema,
    policy: RowPolicy,
) -> PipelineResult<Cleaned> {
    let mut records = Vec::with_capacity(raw.len());
    let mut dropped = Vec::new();

    for (row_idx, record) in raw.records().iter().enumerate() {
        let row = row_idx + 1;
        match normalize_record(record, schema, bound) {
            Ok(values) => records.push(CleanRecord::new(row, values)),
            Err((field, err)) => match policy {
                RowPolicy::Strict => {
                    return Err(PipelineError::InvalidRow {
                        path: raw.path().to_path_buf(),
                        row,
                        field: field.name.clone(),
                        header: field.header.clone(),
                        raw_value: err.raw,
                        reason: err.failure,
                    });
                }
                RowPolicy::Lenient => {
                    warn!(
                        "Dropping row {} of {:?}: field '{}' {}",
                        row,
                        raw.path(),
                        field.name,
                        err
                    );
                    dropped.push(DroppedRow {
                        row,
                        field: field.name.clone(),
                        header: field.header.clone(),
                        raw_value: err.raw,
                        reason: err.failure.to_string(),
                    });
                }
            },
        }
    }

    info!(
        "Normalized {} of {} row(s) from {:?} ({} dropped, {:?} policy)",
        records.len(),
        raw.len(),
        raw.path(),
        dropped.len(),
        policy
    );
    Ok(Cleaned {
        table: CleanTable::new(schema.clone(), records),
        dropped,
    })
}

fn normalize_record<'s>(
    record: &RawRecord,
    schema: &'s Schema,
    bound: &BoundSchema,
) -> Result<Vec<Value>, (&'s FieldSpec, NormalizationError)> {
    schema
        .fields()
        .iter()
        .enumerate()
        .map(|(field_idx, field)| {
            let Some(column) = bound.column(field_idx) else {
                return Err((
                    field,
                    NormalizationError::new(field.kind, "", NormalizationFailure::Empty),
                ));
            };
            normalize_cell(record.get(column), field.kind).map_err(|err| (field, err))
        })
        .collect()
}
