//! KPI scalars and grouped series over a [`CleanTable`].
//!
//! Every function here is a pure function of the table it is given and
//! returns a fresh result. Empty tables produce zero KPIs and empty series.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};
use clap::ValueEnum;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::{AmountField, CategoryField, CleanTable, DateField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub sum: Decimal,
    pub count: usize,
    pub mean: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum GroupOrder {
    /// Largest total first; equal totals keep first-occurrence order.
    #[default]
    DescendingTotal,
    /// Order in which categories first appear in the table.
    FirstSeen,
    Alphabetical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum TimeBucket {
    Day,
    /// ISO week, keyed by its Monday.
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Day => "day",
            TimeBucket::Week => "week",
            TimeBucket::Month => "month",
            TimeBucket::Quarter => "quarter",
            TimeBucket::Year => "year",
        }
    }

    /// First calendar day of the bucket containing `date`.
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            TimeBucket::Day => date,
            TimeBucket::Week => date
                .checked_sub_days(Days::new(u64::from(
                    date.weekday().num_days_from_monday(),
                )))
                .unwrap_or(date),
            TimeBucket::Month => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
            TimeBucket::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
            TimeBucket::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketTotal {
    pub start: NaiveDate,
    pub total: Decimal,
}

/// One clean row projected onto a date and an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatedAmount {
    pub row: usize,
    pub date: NaiveDate,
    pub amount: Decimal,
}

pub fn kpis(table: &CleanTable, amount: AmountField) -> Kpis {
    let (sum, count) = table
        .records()
        .iter()
        .fold((Decimal::ZERO, 0usize), |(sum, count), record| {
            (sum + record.amount(amount), count + 1)
        });
    let mean = if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    };
    Kpis { sum, count, mean }
}

pub fn group_by_category(
    table: &CleanTable,
    category: CategoryField,
    amount: AmountField,
    order: GroupOrder,
) -> Vec<CategoryTotal> {
    let mut totals = first_seen_totals(table, category, amount);
    match order {
        GroupOrder::FirstSeen => {}
        GroupOrder::DescendingTotal => totals.sort_by(|a, b| b.total.cmp(&a.total)),
        GroupOrder::Alphabetical => totals.sort_by(|a, b| a.category.cmp(&b.category)),
    }
    totals
}

/// The `n` categories with the largest totals (`0` keeps every category),
/// returned smallest first.
///
/// Ties are resolved by first occurrence before truncating. The ascending
/// result order suits horizontal bar rankings, where the bottom bar is drawn
/// first; other consumers should re-sort as they need.
pub fn top_n_by_category(
    table: &CleanTable,
    category: CategoryField,
    amount: AmountField,
    n: usize,
) -> Vec<CategoryTotal> {
    let mut ranked = group_by_category(table, category, amount, GroupOrder::DescendingTotal);
    if n > 0 {
        ranked.truncate(n);
    }
    ranked.sort_by(|a, b| a.total.cmp(&b.total));
    ranked
}

/// Totals per bucket in ascending chronological order. Buckets without sales
/// are absent.
pub fn time_series(
    table: &CleanTable,
    date: DateField,
    amount: AmountField,
    bucket: TimeBucket,
) -> Vec<BucketTotal> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in table.records() {
        if let Some(day) = record.date(date) {
            *buckets
                .entry(bucket.start_of(day))
                .or_insert(Decimal::ZERO) += record.amount(amount);
        }
    }
    buckets
        .into_iter()
        .map(|(start, total)| BucketTotal { start, total })
        .collect()
}

/// Row-level sales ordered by date; rows sharing a date keep table order.
pub fn timeline(table: &CleanTable, date: DateField, amount: AmountField) -> Vec<DatedAmount> {
    table
        .records()
        .iter()
        .filter_map(|record| {
            record.date(date).map(|day| DatedAmount {
                row: record.row(),
                date: day,
                amount: record.amount(amount),
            })
        })
        .sorted_by_key(|point| point.date)
        .collect()
}

fn first_seen_totals(
    table: &CleanTable,
    category: CategoryField,
    amount: AmountField,
) -> Vec<CategoryTotal> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for record in table.records() {
        let key = record.category(category);
        let value = record.amount(amount);
        match positions.get(key) {
            Some(&idx) => totals[idx].total += value,
            None => {
                positions.insert(key, totals.len());
                totals.push(CategoryTotal {
                    category: key.to_string(),
                    total: value,
                });
            }
        }
    }
    totals
}
