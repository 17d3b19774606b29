//! Field normalizer: raw cell text to typed [`Value`]s under
//! [`PIPELINE_LOCALE`].
//!
//! Dates are always read day-first. `05/03/2024` is the 5th of March, and
//! `03/15/2024` is rejected because 15 is not a month. Years must have four
//! digits.
//!
//! Amounts drop the currency prefix first, then every thousands separator,
//! then turn the decimal comma into a point. A residue that is already plain
//! dot-decimal (single point, no comma, fraction not exactly three digits long)
//! is read as-is, so `1234.56` and `1.234,56` agree. `1.200` keeps the locale
//! reading of one thousand two hundred. Amounts beyond
//! `PIPELINE_LOCALE.max_amount_magnitude` in either direction are rejected.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{
    data::Value,
    error::{NormalizationError, NormalizationFailure},
    locale::PIPELINE_LOCALE,
    schema::FieldKind,
};

pub fn normalize_cell(raw: Option<&str>, kind: FieldKind) -> Result<Value, NormalizationError> {
    let text = raw.unwrap_or("");
    let result = match kind {
        FieldKind::Date => parse_day_first_date(text).map(Value::Date),
        FieldKind::CurrencyAmount => parse_currency_amount(text).map(Value::Amount),
        FieldKind::CategoryText => Ok(Value::Text(text.trim().to_string())),
    };
    result.map_err(|failure| NormalizationError::new(kind, text, failure))
}

pub fn parse_day_first_date(raw: &str) -> Result<NaiveDate, NormalizationFailure> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(NormalizationFailure::Empty);
    }
    let parsed = PIPELINE_LOCALE
        .date_formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            PIPELINE_LOCALE
                .datetime_formats
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or(NormalizationFailure::UnrecognizedDate)?;
    // chrono accepts short years for %Y; "15/03/24" must not become year 24.
    if parsed.year() < 1000 {
        return Err(NormalizationFailure::UnrecognizedDate);
    }
    Ok(parsed)
}

pub fn parse_currency_amount(raw: &str) -> Result<Decimal, NormalizationFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizationFailure::Empty);
    }
    let (outer_negative, rest) = split_sign(trimmed);
    let rest = rest.trim_start();
    let unprefixed = rest
        .strip_prefix(PIPELINE_LOCALE.currency_prefix)
        .unwrap_or(rest)
        .trim();
    let (inner_negative, digits) = split_sign(unprefixed);
    if outer_negative && inner_negative {
        return Err(NormalizationFailure::NonNumericAmount);
    }
    let mut canonical = if is_canonical_decimal(digits) {
        digits.to_string()
    } else {
        digits
            .replace(PIPELINE_LOCALE.thousands_separator, "")
            .replace(PIPELINE_LOCALE.decimal_separator, ".")
    };
    if !is_plain_number(&canonical) {
        return Err(NormalizationFailure::NonNumericAmount);
    }
    if canonical.starts_with('.') {
        canonical.insert(0, '0');
    }
    let amount =
        Decimal::from_str(&canonical).map_err(|_| NormalizationFailure::AmountOutOfRange)?;
    if amount > Decimal::from(PIPELINE_LOCALE.max_amount_magnitude) {
        return Err(NormalizationFailure::AmountOutOfRange);
    }
    Ok(if outer_negative || inner_negative {
        -amount
    } else {
        amount
    })
}

fn split_sign(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = value.strip_prefix('+') {
        (false, rest)
    } else {
        (false, value)
    }
}

fn is_canonical_decimal(value: &str) -> bool {
    if value.contains(PIPELINE_LOCALE.decimal_separator) {
        return false;
    }
    match value.split_once('.') {
        Some((whole, fraction)) => {
            !fraction.contains('.')
                && !fraction.is_empty()
                && fraction.len() != 3
                && whole.chars().all(|c| c.is_ascii_digit())
                && fraction.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

fn is_plain_number(value: &str) -> bool {
    let mut digits = 0usize;
    let mut points = 0usize;
    for c in value.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
