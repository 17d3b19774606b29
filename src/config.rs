//! YAML run configuration: source, schema, policy and aggregate settings.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    aggregate::{GroupOrder, TimeBucket},
    schema::{FieldKind, Schema},
    validate::RowPolicy,
};

pub const DEFAULT_TOP_N: usize = 10;

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub source_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default)]
    pub row_policy: RowPolicy,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub time_bucket: TimeBucket,
    #[serde(default)]
    pub group_order: GroupOrder,
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "MetricFields::is_empty")]
    pub metrics: MetricFields,
}

/// Which schema fields feed the aggregates. Unset entries fall back to the
/// first field of the matching kind (or every category field for `group_by`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
}

impl MetricFields {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.date.is_none() && self.group_by.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetrics {
    pub amount: String,
    pub date: Option<String>,
    pub group_by: Vec<String>,
}

impl PipelineConfig {
    pub fn new(source_path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            source_path: source_path.into(),
            encoding: None,
            row_policy: RowPolicy::default(),
            top_n: DEFAULT_TOP_N,
            time_bucket: TimeBucket::default(),
            group_order: GroupOrder::default(),
            schema,
            metrics: MetricFields::default(),
        }
    }

    /// Starting point written by `init`: the classic ledger columns, lenient.
    pub fn template(source_path: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(source_path, Schema::ledger_template());
        config.row_policy = RowPolicy::Lenient;
        config
    }

    /// Loads and validates a config file. A relative `source_path` is resolved
    /// against the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let mut config: PipelineConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        if config.source_path.is_relative()
            && config.source_path != Path::new("-")
            && let Some(parent) = path.parent()
        {
            config.source_path = parent.join(&config.source_path);
        }
        config
            .validate()
            .with_context(|| format!("Validating config {path:?}"))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing config YAML")
    }

    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;
        self.resolve_metrics()?;
        Ok(())
    }

    pub fn resolve_metrics(&self) -> Result<ResolvedMetrics> {
        let amount = match &self.metrics.amount {
            Some(name) => self.require_kind(name, FieldKind::CurrencyAmount)?,
            None => self
                .schema
                .first_of_kind(FieldKind::CurrencyAmount)
                .map(|f| f.name.clone())
                .ok_or_else(|| anyhow!("Schema declares no currency_amount field"))?,
        };
        let date = match &self.metrics.date {
            Some(name) => Some(self.require_kind(name, FieldKind::Date)?),
            None => self
                .schema
                .first_of_kind(FieldKind::Date)
                .map(|f| f.name.clone()),
        };
        let group_by = match &self.metrics.group_by {
            Some(names) => names
                .iter()
                .map(|name| self.require_kind(name, FieldKind::CategoryText))
                .collect::<Result<Vec<_>>>()?,
            None => self
                .schema
                .fields_of_kind(FieldKind::CategoryText)
                .map(|f| f.name.clone())
                .collect(),
        };
        Ok(ResolvedMetrics {
            amount,
            date,
            group_by,
        })
    }

    fn require_kind(&self, name: &str, kind: FieldKind) -> Result<String> {
        let idx = self
            .schema
            .field_index(name)
            .ok_or_else(|| anyhow!("Metric field '{name}' is not declared in the schema"))?;
        let declared = self.schema.fields[idx].kind;
        ensure!(
            declared == kind,
            "Metric field '{name}' is declared as {declared} but {kind} is required"
        );
        Ok(name.to_string())
    }
}
