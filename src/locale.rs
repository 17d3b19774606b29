//! The fixed locale convention every ledger must follow.
//!
//! Ledgers are read as day-first dates with comma decimals and dot thousands
//! separators, optionally prefixed with the `R$` currency symbol. The pipeline
//! never detects the locale per file; callers whose exports use a different
//! convention must convert them before ingestion.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleConvention {
    /// Literal prefix stripped from amounts before separator handling.
    pub currency_prefix: &'static str,
    pub thousands_separator: char,
    pub decimal_separator: char,
    /// Date patterns tried in order. All are day-first or ISO year-first.
    pub date_formats: &'static [&'static str],
    /// Day-first date-time patterns whose time part is discarded.
    pub datetime_formats: &'static [&'static str],
    /// Largest accepted absolute amount. Far enough below `Decimal::MAX` that
    /// no table that fits in memory can overflow its sum.
    pub max_amount_magnitude: i64,
}

pub const PIPELINE_LOCALE: LocaleConvention = LocaleConvention {
    currency_prefix: "R$",
    thousands_separator: '.',
    decimal_separator: ',',
    date_formats: &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"],
    datetime_formats: &[
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d-%m-%Y %H:%M:%S",
        "%d-%m-%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ],
    max_amount_magnitude: 1_000_000_000_000_000,
};
