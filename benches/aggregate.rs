use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use sales_ledger::config::PipelineConfig;
use sales_ledger::pipeline::{self, SummaryOptions};
use sales_ledger::schema::Schema;
use sales_ledger::validate::RowPolicy;
use tempfile::TempDir;

fn generate_ledger(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("vendas.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(file, "Data da Venda;Valor;Região;Vendedor").expect("header");
    for i in 0..rows {
        let region = match i % 4 {
            0 => "Sul",
            1 => "Norte",
            2 => "Sudeste",
            _ => "Nordeste",
        };
        let day = (i % 28) + 1;
        let month = (i % 12) + 1;
        // every 50th row carries an unreadable date
        let date = if i % 50 == 49 {
            "sem data".to_string()
        } else {
            format!("{day:02}/{month:02}/2024")
        };
        writeln!(
            file,
            "{date};R$ {}.{:03},{:02};{region};vendedor{}",
            i % 90 + 1,
            i % 1000,
            i % 100,
            i % 17
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn bench_pipeline(c: &mut Criterion) {
    let (_dir, csv_path) = generate_ledger(50_000);
    let mut config = PipelineConfig::new(&csv_path, Schema::ledger_template());
    config.row_policy = RowPolicy::Lenient;

    c.bench_function("ingest_lenient", |b| {
        b.iter(|| {
            pipeline::ingest(&csv_path, UTF_8, &config.schema, RowPolicy::Lenient)
                .expect("ingest")
        })
    });

    let run = pipeline::run(&config).expect("pipeline run");
    let mut options = SummaryOptions::from_config(&config);
    options.include_timeline = true;
    c.bench_function("summarize", |b| {
        b.iter(|| pipeline::summarize(&run, &config, &options).expect("summarize"))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
