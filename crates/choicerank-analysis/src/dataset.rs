//! Participant observations with categorical attributes and numeric measures.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{classify::PreferenceRow, trial_record::ParticipantId};

/// One input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub participant: ParticipantId,
    /// Categorical columns (topic, affiliation, gender, ...).
    pub attributes: BTreeMap<String, String>,
    /// Numeric response columns.
    pub measures: BTreeMap<String, f64>,
}

impl Observation {
    #[must_use]
    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).map(String::as_str)
    }

    #[must_use]
    pub fn measure(&self, column: &str) -> Option<f64> {
        self.measures.get(column).copied()
    }
}

/// An equality condition on a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Condition {
    pub column: String,
    pub value: String,
}

impl Condition {
    #[must_use]
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    fn matches(&self, observation: &Observation) -> bool {
        observation.attribute(&self.column) == Some(self.value.as_str())
    }
}

/// Frequency table of two categorical columns, levels sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_levels: Vec<String>,
    pub col_levels: Vec<String>,
    /// `counts[i][j]` observations have row level `i` and column level `j`.
    pub counts: Vec<Vec<f64>>,
}

/// Renaming of columns and of categorical values.
///
/// `values` is keyed by the original column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relabeling {
    pub columns: BTreeMap<String, String>,
    pub values: BTreeMap<String, BTreeMap<String, String>>,
}

impl Relabeling {
    /// New name of `column`.
    #[must_use]
    pub fn column<'a>(&'a self, column: &'a str) -> &'a str {
        self.columns.get(column).map_or(column, String::as_str)
    }

    /// New spelling of `value` in the original column `column`.
    #[must_use]
    pub fn value<'a>(&'a self, column: &str, value: &'a str) -> &'a str {
        self.values
            .get(column)
            .and_then(|values| values.get(value))
            .map_or(value, String::as_str)
    }
}

/// The memory-resident dataset a comparison hierarchy runs over.
///
/// `rows` holds the classified preference rows of the ranking experiment and
/// is empty for experiments without ranked trials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    observations: Vec<Observation>,
    rows: Vec<PreferenceRow>,
}

impl Dataset {
    #[must_use]
    pub fn new(observations: Vec<Observation>, rows: Vec<PreferenceRow>) -> Self {
        Self { observations, rows }
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn rows(&self) -> &[PreferenceRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct non-empty values of `column`, sorted.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use choicerank_analysis::{
    ///     dataset::{Dataset, Observation},
    ///     trial_record::ParticipantId,
    /// };
    ///
    /// let observation = |id, topic: &str| Observation {
    ///     participant: ParticipantId(id),
    ///     attributes: BTreeMap::from([("Topic".to_owned(), topic.to_owned())]),
    ///     measures: BTreeMap::new(),
    /// };
    /// let data = Dataset::new(
    ///     vec![observation(0, "Trade"), observation(1, "Abortion"), observation(2, "Trade")],
    ///     vec![],
    /// );
    /// assert_eq!(data.levels("Topic"), ["Abortion", "Trade"]);
    /// ```
    #[must_use]
    pub fn levels(&self, column: &str) -> Vec<String> {
        self.observations
            .iter()
            .filter_map(|o| o.attribute(column))
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Observations matching every condition, with the preference rows of
    /// their participants.
    #[must_use]
    pub fn filter(&self, conditions: &[Condition]) -> Dataset {
        if conditions.is_empty() {
            return self.clone();
        }
        let observations = self
            .observations
            .iter()
            .filter(|o| conditions.iter().all(|c| c.matches(o)))
            .cloned()
            .collect::<Vec<_>>();
        let participants = observations
            .iter()
            .map(|o| o.participant)
            .collect::<BTreeSet<_>>();
        let rows = self
            .rows
            .iter()
            .filter(|r| participants.contains(&r.participant))
            .cloned()
            .collect();
        Dataset { observations, rows }
    }

    /// Values of `measure` for the observations whose `column` equals `level`.
    ///
    /// Observations without the measure are left out.
    #[must_use]
    pub fn measure_by_level(&self, measure: &str, column: &str, level: &str) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.attribute(column) == Some(level))
            .filter_map(|o| o.measure(measure))
            .collect()
    }

    /// Every value of `measure`, in input order.
    #[must_use]
    pub fn measure_values(&self, measure: &str) -> Vec<f64> {
        self.observations
            .iter()
            .filter_map(|o| o.measure(measure))
            .collect()
    }

    /// Counts of each (`row_column`, `col_column`) value pair.
    #[must_use]
    pub fn crosstab(&self, row_column: &str, col_column: &str) -> CrossTab {
        let row_levels = self.levels(row_column);
        let col_levels = self.levels(col_column);
        let mut counts = vec![vec![0.0; col_levels.len()]; row_levels.len()];
        for o in &self.observations {
            let (Some(r), Some(c)) = (o.attribute(row_column), o.attribute(col_column)) else {
                continue;
            };
            let (Ok(i), Ok(j)) = (
                row_levels.binary_search_by(|l| l.as_str().cmp(r)),
                col_levels.binary_search_by(|l| l.as_str().cmp(c)),
            ) else {
                continue;
            };
            counts[i][j] += 1.0;
        }
        CrossTab {
            row_levels,
            col_levels,
            counts,
        }
    }

    /// A new dataset with columns and values renamed.
    #[must_use]
    pub fn relabel(&self, relabeling: &Relabeling) -> Dataset {
        let observations = self
            .observations
            .iter()
            .map(|o| Observation {
                participant: o.participant,
                attributes: o
                    .attributes
                    .iter()
                    .map(|(column, value)| {
                        (
                            relabeling.column(column).to_owned(),
                            relabeling.value(column, value).to_owned(),
                        )
                    })
                    .collect(),
                measures: o
                    .measures
                    .iter()
                    .map(|(column, value)| (relabeling.column(column).to_owned(), *value))
                    .collect(),
            })
            .collect();
        Dataset {
            observations,
            rows: self.rows.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ChoiceType;

    fn observation(id: usize, pairs: &[(&str, &str)], slider: Option<f64>) -> Observation {
        Observation {
            participant: ParticipantId(id),
            attributes: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            measures: slider
                .map(|s| ("SLIDER".to_owned(), s))
                .into_iter()
                .collect(),
        }
    }

    fn sample() -> Dataset {
        let observations = vec![
            observation(0, &[("AFF", "d"), ("VOTE", "left")], Some(10.0)),
            observation(1, &[("AFF", "r"), ("VOTE", "right")], Some(80.0)),
            observation(2, &[("AFF", "d"), ("VOTE", "right")], None),
            observation(3, &[("AFF", ""), ("VOTE", "left")], Some(30.0)),
        ];
        let rows = (0..4)
            .map(|p| PreferenceRow {
                participant: ParticipantId(p),
                trial: 0,
                preference: 0,
                option: 1,
                choice_type: ChoiceType::Chosen,
            })
            .collect();
        Dataset::new(observations, rows)
    }

    #[test]
    fn test_levels_skip_missing_values() {
        assert_eq!(sample().levels("AFF"), ["d", "r"]);
        assert!(sample().levels("NOPE").is_empty());
    }

    #[test]
    fn test_filter_keeps_matching_participants_rows() {
        let data = sample().filter(&[Condition::new("AFF", "d")]);
        assert_eq!(data.len(), 2);
        let participants = data.rows().iter().map(|r| r.participant).collect::<Vec<_>>();
        assert_eq!(participants, [ParticipantId(0), ParticipantId(2)]);

        let data = sample().filter(&[Condition::new("AFF", "d"), Condition::new("VOTE", "left")]);
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_measure_by_level_skips_missing_measures() {
        let data = sample();
        assert_eq!(data.measure_by_level("SLIDER", "VOTE", "right"), [80.0]);
        assert_eq!(data.measure_by_level("SLIDER", "VOTE", "left"), [10.0, 30.0]);
        assert_eq!(data.measure_values("SLIDER"), [10.0, 80.0, 30.0]);
    }

    #[test]
    fn test_crosstab() {
        let table = sample().crosstab("AFF", "VOTE");
        assert_eq!(table.row_levels, ["d", "r"]);
        assert_eq!(table.col_levels, ["left", "right"]);
        assert_eq!(table.counts, vec![vec![1.0, 1.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_relabel_returns_new_dataset() {
        let relabeling = Relabeling {
            columns: BTreeMap::from([
                ("AFF".to_owned(), "Affiliation".to_owned()),
                ("SLIDER".to_owned(), "Agreement".to_owned()),
            ]),
            values: BTreeMap::from([(
                "AFF".to_owned(),
                BTreeMap::from([("d".to_owned(), "Democrat".to_owned())]),
            )]),
        };
        let original = sample();
        let relabeled = original.relabel(&relabeling);
        assert_eq!(relabeled.levels("Affiliation"), ["Democrat", "r"]);
        assert_eq!(relabeled.measure_values("Agreement"), [10.0, 80.0, 30.0]);
        // the input is untouched
        assert_eq!(original.levels("AFF"), ["d", "r"]);
        assert_eq!(relabeled.rows(), original.rows());
    }
}
