//! Export of the tidy tables figures are drawn from.

use std::{
    cell::RefCell,
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Serialize;

/// Receives an aggregated tidy table and puts it somewhere a plotting tool
/// can pick it up.
pub trait TableRenderer {
    /// Renders `rows` under `name`, returning where they went.
    fn render<T>(&self, name: &str, rows: &[T]) -> anyhow::Result<PathBuf>
    where
        T: Serialize;
}

/// Writes one CSV file per table into a directory.
///
/// Names that map to the same file stem (`A B` and `A_B`) get a numeric
/// suffix rather than overwriting each other.
#[derive(Debug, Clone)]
pub struct CsvTableRenderer {
    dir: PathBuf,
    /// Stems written so far.
    written: RefCell<BTreeSet<String>>,
}

impl CsvTableRenderer {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_owned(),
            written: RefCell::default(),
        }
    }

    fn claim_stem(&self, name: &str) -> String {
        let base = file_stem(name);
        let mut written = self.written.borrow_mut();
        let mut stem = base.clone();
        let mut n = 2;
        while !written.insert(stem.clone()) {
            tracing::warn!("Table name {name:?} collides with an earlier table");
            stem = format!("{base}_{n}");
            n += 1;
        }
        stem
    }
}

impl TableRenderer for CsvTableRenderer {
    fn render<T>(&self, name: &str, rows: &[T]) -> anyhow::Result<PathBuf>
    where
        T: Serialize,
    {
        let path = self.dir.join(format!("{}.csv", self.claim_stem(name)));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }
}

/// `name` with everything but ASCII letters, digits, `-` and `_` replaced by `_`.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
