//! Plain-text rendering of an [`AggregateResult`] for terminal output.

use std::borrow::Cow;
use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::{aggregate::CategoryTotal, pipeline::AggregateResult, validate::DroppedRow};

const DISPLAY_SCALE: u32 = 4;

pub fn render_report(report: &AggregateResult) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Source: {} (delimiter '{}')",
        report.source.display(),
        report.delimiter
    );
    let _ = writeln!(
        output,
        "Rows: {} read, {} kept, {} dropped",
        report.rows_read, report.rows_kept, report.rows_dropped
    );

    let _ = writeln!(output);
    let kpi_rows = vec![
        vec!["sum".to_string(), amount(report.kpis.sum)],
        vec!["count".to_string(), report.kpis.count.to_string()],
        vec!["mean".to_string(), amount(report.kpis.mean)],
    ];
    output.push_str(&render_table(&["kpi", report.amount_field.as_str()], &kpi_rows));

    for series in &report.by_category {
        let _ = writeln!(output, "\nTotals by {}", series.field);
        output.push_str(&render_totals(&series.totals));
    }
    for series in &report.top_n {
        let _ = writeln!(
            output,
            "\nTop {} by {} (ascending)",
            series.totals.len(),
            series.field
        );
        output.push_str(&render_totals(&series.totals));
    }
    if let Some(over_time) = &report.over_time {
        let _ = writeln!(output, "\n{} by {}", over_time.field, over_time.bucket.as_str());
        let rows = over_time
            .points
            .iter()
            .map(|p| vec![p.start.format("%Y-%m-%d").to_string(), amount(p.total)])
            .collect::<Vec<_>>();
        output.push_str(&render_table(&["bucket_start", "total"], &rows));
    }
    if let Some(timeline) = &report.timeline {
        let _ = writeln!(output, "\nTimeline");
        let rows = timeline
            .iter()
            .map(|p| {
                vec![
                    p.row.to_string(),
                    p.date.format("%Y-%m-%d").to_string(),
                    amount(p.amount),
                ]
            })
            .collect::<Vec<_>>();
        output.push_str(&render_table(&["row", "date", "amount"], &rows));
    }
    output
}

pub fn render_dropped(dropped: &[DroppedRow]) -> String {
    let rows = dropped
        .iter()
        .map(|d| {
            vec![
                d.row.to_string(),
                d.field.clone(),
                d.header.clone(),
                d.raw_value.clone(),
                d.reason.clone(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&["row", "field", "column", "value", "reason"], &rows)
}

fn render_totals(totals: &[CategoryTotal]) -> String {
    let rows = totals
        .iter()
        .map(|t| vec![t.category.clone(), amount(t.total)])
        .collect::<Vec<_>>();
    render_table(&["category", "total"], &rows)
}

fn amount(value: Decimal) -> String {
    value.round_dp(DISPLAY_SCALE).normalize().to_string()
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
