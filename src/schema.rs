//! Logical schema declaration and binding to raw headers.
//!
//! A [`Schema`] is supplied by configuration and never inferred. Each
//! [`FieldSpec`] gives a logical name, the exact raw header it reads from, and
//! the [`FieldKind`] that drives normalization. Declaration order matters: it
//! fixes the field order of every clean record and the order in which missing
//! columns and invalid cells are reported.

use std::{collections::HashSet, fmt};

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, PipelineResult},
    source::RawTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    CurrencyAmount,
    CategoryText,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Date => "date",
            FieldKind::CurrencyAmount => "currency_amount",
            FieldKind::CategoryText => "category_text",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub header: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, header: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            header: header.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    /// Column layout of the classic sales ledger export.
    pub fn ledger_template() -> Self {
        Self {
            fields: vec![
                FieldSpec::new("sale_date", "Data da Venda", FieldKind::Date),
                FieldSpec::new("sale_amount", "Valor", FieldKind::CurrencyAmount),
                FieldSpec::new("region", "Região", FieldKind::CategoryText),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.fields.is_empty(), "Schema declares no fields");
        let mut seen = HashSet::new();
        for field in &self.fields {
            ensure!(
                !field.name.trim().is_empty(),
                "Schema field names cannot be empty"
            );
            ensure!(
                !field.header.trim().is_empty(),
                "Schema field '{}' has an empty header",
                field.name
            );
            if !seen.insert(field.name.as_str()) {
                bail!("Schema declares field '{}' more than once", field.name);
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn first_of_kind(&self, kind: FieldKind) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    pub fn fields_of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.kind == kind)
    }

    /// Resolves every declared header against `table`. The first absent
    /// header, in declaration order, aborts binding.
    pub fn bind(&self, table: &RawTable) -> PipelineResult<BoundSchema> {
        let columns = self
            .fields
            .iter()
            .map(|field| {
                table
                    .column_index(&field.header)
                    .ok_or_else(|| PipelineError::MissingColumn {
                        path: table.path().to_path_buf(),
                        header: field.header.clone(),
                    })
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(BoundSchema { columns })
    }
}

/// Raw column position for each schema field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSchema {
    columns: Vec<usize>,
}

impl BoundSchema {
    pub fn column(&self, field_index: usize) -> Option<usize> {
        self.columns.get(field_index).copied()
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }
}
