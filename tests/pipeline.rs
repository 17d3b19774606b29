mod common;

use std::{path::Path, str::FromStr};

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;

use common::{SAMPLE_LEDGER, TestWorkspace};
use sales_ledger::{
    aggregate::{self, GroupOrder, TimeBucket},
    config::PipelineConfig,
    error::{NormalizationFailure, PipelineError},
    pipeline::{self, SummaryOptions},
    schema::{FieldKind, FieldSpec, Schema},
    source::parse_raw_table,
    validate::RowPolicy,
};

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

#[test]
fn lenient_run_drops_bad_row_and_totals_the_rest() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.sample();
    let config = PipelineConfig::load(&config_path).expect("load config");

    let run = pipeline::run(&config).expect("pipeline run");
    assert_eq!(run.rows_read, 3);
    assert_eq!(run.table.len(), 2);
    assert_eq!(run.dropped_count(), 1);
    assert_eq!(run.table.len() + run.dropped_count(), run.rows_read);
    assert_eq!(run.delimiter, b';');

    let report = pipeline::summarize(&run, &config, &SummaryOptions::from_config(&config))
        .expect("summarize");
    assert_eq!(report.kpis.sum, dec("1700.00"));
    assert_eq!(report.kpis.count, 2);
    assert_eq!(report.kpis.mean, dec("850"));

    let by_region = &report.by_category[0];
    assert_eq!(by_region.field, "region");
    let totals = by_region
        .totals
        .iter()
        .map(|t| (t.category.as_str(), t.total))
        .collect::<Vec<_>>();
    assert_eq!(totals, vec![("Sudeste", dec("1200.00")), ("Sul", dec("500.00"))]);

    let over_time = report.over_time.expect("time series");
    assert_eq!(over_time.bucket, TimeBucket::Month);
    assert_eq!(over_time.points.len(), 1);
    assert_eq!(
        over_time.points[0].start,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );
    assert_eq!(over_time.points[0].total, dec("1700"));
    assert!(report.timeline.is_none());
}

#[test]
fn strict_run_names_resource_row_and_value() {
    let workspace = TestWorkspace::new();
    let config_path = workspace.sample();
    let mut config = PipelineConfig::load(&config_path).expect("load config");
    config.row_policy = RowPolicy::Strict;

    let err = pipeline::run(&config).expect_err("strict run should fail");
    let pipeline_err = err
        .downcast_ref::<PipelineError>()
        .expect("pipeline error");
    match pipeline_err {
        PipelineError::InvalidRow {
            row,
            field,
            header,
            raw_value,
            ..
        } => {
            assert_eq!(*row, 3);
            assert_eq!(field, "sale_date");
            assert_eq!(header, "Data da Venda");
            assert_eq!(raw_value, "bad-date");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("vendas.csv"));
}

#[test]
fn missing_column_aborts_before_normalization() {
    let workspace = TestWorkspace::new();
    let ledger = workspace.write("vendas.csv", "Data;Valor;Região\n15/01/2024;1,00;Sul\n");
    let config = PipelineConfig::new(&ledger, Schema::ledger_template());

    let err = pipeline::run(&config).expect_err("missing column");
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::MissingColumn { header, path }) => {
            assert_eq!(header, "Data da Venda");
            assert_eq!(path, &ledger);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn comma_delimited_file_parses_via_fallback() {
    let workspace = TestWorkspace::new();
    let ledger = workspace.write(
        "sales.csv",
        "date,amount,region\n15/01/2024,500,Sul\n20/01/2024,1200.50,Sudeste\n",
    );
    let schema = Schema::new(vec![
        FieldSpec::new("sale_date", "date", FieldKind::Date),
        FieldSpec::new("sale_amount", "amount", FieldKind::CurrencyAmount),
        FieldSpec::new("region", "region", FieldKind::CategoryText),
    ])
    .expect("schema");
    let config = PipelineConfig::new(&ledger, schema);

    let run = pipeline::run(&config).expect("run");
    assert_eq!(run.delimiter, b',');
    let amount = run.table.amount_field("sale_amount").expect("amount field");
    assert_eq!(aggregate::kpis(&run.table, amount).sum, dec("1700.50"));
}

#[test]
fn latin1_ledgers_decode_with_configured_encoding() {
    let workspace = TestWorkspace::new();
    let (bytes, _, _) = WINDOWS_1252.encode(SAMPLE_LEDGER);
    let ledger = workspace.write_bytes("vendas.csv", &bytes);
    let mut config = PipelineConfig::new(&ledger, Schema::ledger_template());
    config.row_policy = RowPolicy::Lenient;

    let utf8_err = pipeline::run(&config).expect_err("invalid utf-8");
    assert!(matches!(
        utf8_err.downcast_ref::<PipelineError>(),
        Some(PipelineError::SourceMalformed { .. })
    ));

    config.encoding = Some("latin1".to_string());
    let run = pipeline::run(&config).expect("latin1 run");
    assert_eq!(run.table.len(), 2);
}

#[test]
fn missing_source_is_unavailable() {
    let workspace = TestWorkspace::new();
    let config = PipelineConfig::new(workspace.path().join("nope.csv"), Schema::ledger_template());
    let err = pipeline::run(&config).expect_err("missing source");
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::SourceUnavailable { .. })
    ));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn summary_options_control_rankings_buckets_and_timeline() {
    let text = "Data da Venda;Valor;Região\n\
        02/01/2024;10,00;A\n\
        09/01/2024;40,00;B\n\
        01/04/2024;30,00;C\n\
        05/04/2024;20,00;A\n";
    let raw = parse_raw_table(text, Path::new("ledger.csv")).expect("raw");
    let config = PipelineConfig::new("ledger.csv", Schema::ledger_template());
    let run = pipeline::clean(raw, &config.schema, RowPolicy::Strict).expect("clean");

    let options = SummaryOptions {
        top_n: 2,
        time_bucket: TimeBucket::Quarter,
        group_order: GroupOrder::Alphabetical,
        include_timeline: true,
    };
    let report = pipeline::summarize(&run, &config, &options).expect("summarize");

    let alphabetical = report.by_category[0]
        .totals
        .iter()
        .map(|t| t.category.as_str())
        .collect::<Vec<_>>();
    assert_eq!(alphabetical, vec!["A", "B", "C"]);

    // A and C tie at 30; A was seen first so it takes the second slot.
    let ranking = report.top_n[0]
        .totals
        .iter()
        .map(|t| t.category.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ranking, vec!["A", "B"]);

    let quarters = report
        .over_time
        .expect("time series")
        .points
        .iter()
        .map(|p| (p.start, p.total))
        .collect::<Vec<_>>();
    assert_eq!(
        quarters,
        vec![
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec("50")),
            (NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), dec("50")),
        ]
    );
    assert_eq!(report.timeline.expect("timeline").len(), 4);
}

#[test]
fn report_serializes_for_downstream_renderers() {
    let workspace = TestWorkspace::new();
    let config = PipelineConfig::load(&workspace.sample()).expect("config");
    let run = pipeline::run(&config).expect("run");
    let report =
        pipeline::summarize(&run, &config, &SummaryOptions::from_config(&config)).expect("report");

    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["rows_dropped"], 1);
    assert_eq!(json["kpis"]["count"], 2);
    assert_eq!(json["by_category"][0]["field"], "region");
    assert_eq!(json["over_time"]["bucket"], "month");
    assert_eq!(json["over_time"]["points"][0]["start"], "2024-01-01");
    assert_eq!(json["dropped"][0]["raw_value"], "bad-date");
    assert!(json.get("timeline").is_none());
}

#[test]
fn oversized_amounts_fail_the_row_instead_of_the_totals() {
    let text = "Data da Venda;Valor;Região\n\
        15/01/2024;50000000000000000000000000000;Sul\n\
        16/01/2024;50000000000000000000000000000;Sul\n";

    let raw = parse_raw_table(text, Path::new("ledger.csv")).expect("raw");
    let err = pipeline::clean(raw, &Schema::ledger_template(), RowPolicy::Strict)
        .expect_err("strict run rejects the amount");
    match err {
        PipelineError::InvalidRow {
            row,
            field,
            reason,
            ..
        } => {
            assert_eq!(row, 1);
            assert_eq!(field, "sale_amount");
            assert_eq!(reason, NormalizationFailure::AmountOutOfRange);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let raw = parse_raw_table(text, Path::new("ledger.csv")).expect("raw");
    let run = pipeline::clean(raw, &Schema::ledger_template(), RowPolicy::Lenient).expect("clean");
    assert!(run.table.is_empty());
    assert_eq!(run.dropped_count(), 2);
    let amount = run.table.amount_field("sale_amount").expect("amount field");
    assert_eq!(aggregate::kpis(&run.table, amount).sum, Decimal::ZERO);
}
