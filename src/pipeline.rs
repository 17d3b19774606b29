//! One pipeline run: read → bind → normalize/validate, then aggregate.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use encoding_rs::Encoding;
use serde::Serialize;

use crate::{
    aggregate::{self, BucketTotal, CategoryTotal, DatedAmount, GroupOrder, Kpis, TimeBucket},
    config::PipelineConfig,
    data::CleanTable,
    error::PipelineResult,
    io_utils,
    schema::Schema,
    source::{self, RawTable},
    validate::{self, DroppedRow, RowPolicy},
};

/// Output of the ingestion half of the pipeline. The raw table is gone by the
/// time this exists; only its size and delimiter are kept.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub source: PathBuf,
    pub delimiter: u8,
    pub rows_read: usize,
    pub table: CleanTable,
    pub dropped: Vec<DroppedRow>,
}

impl PipelineRun {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySeries {
    pub field: String,
    pub totals: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub field: String,
    pub bucket: TimeBucket,
    pub points: Vec<BucketTotal>,
}

/// Everything a downstream renderer needs: KPIs plus grouped series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub source: PathBuf,
    pub delimiter: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub amount_field: String,
    pub kpis: Kpis,
    pub by_category: Vec<CategorySeries>,
    pub top_n: Vec<CategorySeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_time: Option<TimeSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<DatedAmount>>,
    pub dropped: Vec<DroppedRow>,
}

pub fn run(config: &PipelineConfig) -> Result<PipelineRun> {
    let encoding = io_utils::resolve_encoding(config.encoding.as_deref())?;
    Ok(ingest(
        &config.source_path,
        encoding,
        &config.schema,
        config.row_policy,
    )?)
}

pub fn ingest(
    path: &Path,
    encoding: &'static Encoding,
    schema: &Schema,
    policy: RowPolicy,
) -> PipelineResult<PipelineRun> {
    let raw = source::read_raw_table(path, encoding)?;
    clean(raw, schema, policy)
}

/// Runs binding and validation over an already-read table, consuming it.
pub fn clean(raw: RawTable, schema: &Schema, policy: RowPolicy) -> PipelineResult<PipelineRun> {
    let bound = schema.bind(&raw)?;
    let cleaned = validate::clean_table(&raw, schema, &bound, policy)?;
    Ok(PipelineRun {
        source: raw.path().to_path_buf(),
        delimiter: raw.delimiter(),
        rows_read: raw.len(),
        table: cleaned.table,
        dropped: cleaned.dropped,
    })
}

pub struct SummaryOptions {
    pub top_n: usize,
    pub time_bucket: TimeBucket,
    pub group_order: GroupOrder,
    pub include_timeline: bool,
}

impl SummaryOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            top_n: config.top_n,
            time_bucket: config.time_bucket,
            group_order: config.group_order,
            include_timeline: false,
        }
    }
}

pub fn summarize(
    run: &PipelineRun,
    config: &PipelineConfig,
    options: &SummaryOptions,
) -> Result<AggregateResult> {
    let metrics = config.resolve_metrics()?;
    let table = &run.table;
    let amount = table
        .amount_field(&metrics.amount)
        .ok_or_else(|| anyhow!("Field '{}' is not a currency_amount field", metrics.amount))?;

    let mut by_category = Vec::with_capacity(metrics.group_by.len());
    let mut top_n = Vec::with_capacity(metrics.group_by.len());
    for name in &metrics.group_by {
        let category = table
            .category_field(name)
            .ok_or_else(|| anyhow!("Field '{name}' is not a category_text field"))?;
        by_category.push(CategorySeries {
            field: name.clone(),
            totals: aggregate::group_by_category(table, category, amount, options.group_order),
        });
        top_n.push(CategorySeries {
            field: name.clone(),
            totals: aggregate::top_n_by_category(table, category, amount, options.top_n),
        });
    }

    let date = match &metrics.date {
        Some(name) => Some((
            name,
            table
                .date_field(name)
                .ok_or_else(|| anyhow!("Field '{name}' is not a date field"))?,
        )),
        None => None,
    };
    let over_time = date.map(|(name, field)| TimeSeries {
        field: name.clone(),
        bucket: options.time_bucket,
        points: aggregate::time_series(table, field, amount, options.time_bucket),
    });
    let timeline = match date {
        Some((_, field)) if options.include_timeline => {
            Some(aggregate::timeline(table, field, amount))
        }
        _ => None,
    };

    Ok(AggregateResult {
        source: run.source.clone(),
        delimiter: io_utils::printable_delimiter(run.delimiter),
        rows_read: run.rows_read,
        rows_kept: table.len(),
        rows_dropped: run.dropped_count(),
        amount_field: metrics.amount,
        kpis: aggregate::kpis(table, amount),
        by_category,
        top_n,
        over_time,
        timeline,
        dropped: run.dropped.clone(),
    })
}
