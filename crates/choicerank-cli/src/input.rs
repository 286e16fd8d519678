//! CSV loading.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use choicerank_analysis::{
    dataset::Observation,
    trial_record::{ParticipantId, RawTrialRecord},
};

/// Rows of a CSV file keyed by header; the row index is the participant id.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    headers: Vec<String>,
    records: Vec<BTreeMap<String, String>>,
}

impl CsvTable {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let records = reader
            .deserialize()
            .enumerate()
            .map(|(i, record)| {
                record.with_context(|| {
                    format!("Failed to read CSV row {} of {}", i + 1, path.display())
                })
            })
            .collect::<anyhow::Result<Vec<BTreeMap<String, String>>>>()?;
        tracing::info!("Loaded {} rows from {}", records.len(), path.display());
        Ok(Self { headers, records })
    }

    /// Fails naming the first of `columns` missing from the header.
    pub fn require(&self, columns: &[&str]) -> anyhow::Result<()> {
        for column in columns {
            if !self.headers.iter().any(|h| h == column) {
                anyhow::bail!("Input has no column named {column:?}");
            }
        }
        Ok(())
    }

    /// One observation per row, every column as an attribute.
    ///
    /// `measures` columns are also parsed as numbers; empty or non-numeric
    /// cells are left out of the measures.
    pub fn observations(&self, measures: &[&str]) -> Vec<Observation> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut numeric = BTreeMap::new();
                for &column in measures {
                    let Some(cell) = record.get(column).map(String::as_str).map(str::trim) else {
                        continue;
                    };
                    if cell.is_empty() {
                        continue;
                    }
                    match cell.parse::<f64>() {
                        Ok(value) if value.is_finite() => {
                            numeric.insert(column.to_owned(), value);
                        }
                        _ => tracing::warn!("Row {i}: {column} is not a number: {cell:?}"),
                    }
                }
                Observation {
                    participant: ParticipantId(i),
                    attributes: record.clone(),
                    measures: numeric,
                }
            })
            .collect()
    }

    /// The literal fields of every row, ready for decoding.
    pub fn raw_trial_records(&self, design_map: &str, choices: &str) -> Vec<RawTrialRecord> {
        let cell = |record: &BTreeMap<String, String>, column: &str| {
            record.get(column).cloned().unwrap_or_default()
        };
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| RawTrialRecord {
                participant: ParticipantId(i),
                design_map: cell(record, design_map),
                choices: cell(record, choices),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn table(content: &str) -> CsvTable {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        CsvTable::read(file.path()).unwrap()
    }

    #[test]
    fn test_quoted_literal_fields_survive() {
        let table = table(
            "party,choices,back_config\n\
             Democrat,\"[[1, 0, [7, 3]]]\",\"[{'both': [3]}]\"\n",
        );
        table.require(&["party", "choices"]).unwrap();
        assert!(table.require(&["age"]).is_err());
        let raws = table.raw_trial_records("back_config", "choices");
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].choices, "[[1, 0, [7, 3]]]");
        assert_eq!(raws[0].design_map, "[{'both': [3]}]");
    }

    #[test]
    fn test_measures_skip_blank_and_non_numeric_cells() {
        let table = table("id,slider\na,12.5\nb,\nc,lots\n");
        let observations = table.observations(&["slider"]);
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].measure("slider"), Some(12.5));
        assert_eq!(observations[1].measure("slider"), None);
        assert_eq!(observations[2].measure("slider"), None);
        assert_eq!(observations[2].attribute("slider"), Some("lots"));
        assert_eq!(observations[2].participant, ParticipantId(2));
    }
}
