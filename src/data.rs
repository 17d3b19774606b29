//! Typed values and the clean table the aggregator reads.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::schema::{FieldKind, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Date(NaiveDate),
    Amount(Decimal),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Date(_) => FieldKind::Date,
            Value::Amount(_) => FieldKind::CurrencyAmount,
            Value::Text(_) => FieldKind::CategoryText,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Amount(a) => a.normalize().to_string(),
            Value::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// One normalized row. `values` follows schema declaration order and holds a
/// value of the declared kind for every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRecord {
    row: usize,
    values: Vec<Value>,
}

impl CleanRecord {
    pub(crate) fn new(row: usize, values: Vec<Value>) -> Self {
        Self { row, values }
    }

    /// 1-based data row number in the source file.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn amount(&self, field: AmountField) -> Decimal {
        match self.values.get(field.0) {
            Some(Value::Amount(amount)) => *amount,
            _ => Decimal::ZERO,
        }
    }

    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        match self.values.get(field.0) {
            Some(Value::Date(date)) => Some(*date),
            _ => None,
        }
    }

    pub fn category(&self, field: CategoryField) -> &str {
        match self.values.get(field.0) {
            Some(Value::Text(text)) => text,
            _ => "",
        }
    }
}

/// Handle to a `currency_amount` field of a specific [`CleanTable`] layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountField(usize);

/// Handle to a `date` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateField(usize);

/// Handle to a `category_text` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryField(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTable {
    schema: Schema,
    records: Vec<CleanRecord>,
}

impl CleanTable {
    pub(crate) fn new(schema: Schema, records: Vec<CleanRecord>) -> Self {
        Self { schema, records }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[CleanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn amount_field(&self, name: &str) -> Option<AmountField> {
        self.field_of_kind(name, FieldKind::CurrencyAmount)
            .map(AmountField)
    }

    pub fn date_field(&self, name: &str) -> Option<DateField> {
        self.field_of_kind(name, FieldKind::Date).map(DateField)
    }

    pub fn category_field(&self, name: &str) -> Option<CategoryField> {
        self.field_of_kind(name, FieldKind::CategoryText)
            .map(CategoryField)
    }

    fn field_of_kind(&self, name: &str, kind: FieldKind) -> Option<usize> {
        self.schema
            .field_index(name)
            .filter(|idx| self.schema.fields[*idx].kind == kind)
    }
}
