#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// The three-row ledger used across the end-to-end tests: two valid sales
/// and one row with an unreadable date.
pub const SAMPLE_LEDGER: &str = "Data da Venda;Valor;Região;Vendedor\n\
15/01/2024;R$ 500,00;Sul;Ana\n\
20/01/2024;1.200,00;Sudeste;Bruno\n\
bad-date;850,00;Sul;Ana\n";

pub const SAMPLE_CONFIG: &str = r#"source_path: vendas.csv
row_policy: lenient
schema:
  fields:
    - name: sale_date
      header: Data da Venda
      kind: date
    - name: sale_amount
      header: Valor
      kind: currency_amount
    - name: region
      header: Região
      kind: category_text
metrics:
  group_by: [region]
"#;

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Writes the sample ledger and config, returning the config path.
    pub fn sample(&self) -> PathBuf {
        self.write("vendas.csv", SAMPLE_LEDGER);
        self.write("ledger.yml", SAMPLE_CONFIG)
    }
}
