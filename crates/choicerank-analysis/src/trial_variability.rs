//! First-preference counts per trial, and a drift check over trials.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    battery::{self, ComparisonError, TestResult},
    classify::{ChoiceType, PreferenceRow},
};

/// How many participants ranked an option of each label first, per trial.
///
/// Every trial that appears in the input rows is present. A label never
/// ranked first in a trial has a count of zero there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FirstPreferenceTable {
    counts: BTreeMap<usize, [u32; 3]>,
}

/// One table row, for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirstPreferenceRow {
    pub trial: usize,
    #[serde(rename = "NotChosen")]
    pub not_chosen: u32,
    #[serde(rename = "Shared")]
    pub shared: u32,
    #[serde(rename = "Chosen")]
    pub chosen: u32,
}

impl FirstPreferenceTable {
    /// # Examples
    ///
    /// ```
    /// use choicerank_analysis::{
    ///     classify::{ChoiceType, PreferenceRow},
    ///     trial_record::ParticipantId,
    ///     trial_variability::FirstPreferenceTable,
    /// };
    ///
    /// let row = |participant, trial, preference, choice_type| PreferenceRow {
    ///     participant: ParticipantId(participant),
    ///     trial,
    ///     preference,
    ///     option: 0,
    ///     choice_type,
    /// };
    /// let rows = [
    ///     row(0, 0, 0, ChoiceType::Chosen),
    ///     row(0, 0, 1, ChoiceType::Shared),
    ///     row(1, 0, 0, ChoiceType::Chosen),
    ///     row(1, 1, 0, ChoiceType::Shared),
    /// ];
    /// let table = FirstPreferenceTable::from_rows(&rows);
    /// assert_eq!(table.counts(ChoiceType::Chosen), [2, 0]);
    /// assert_eq!(table.counts(ChoiceType::Shared), [0, 1]);
    /// ```
    #[must_use]
    pub fn from_rows(rows: &[PreferenceRow]) -> Self {
        let mut counts = BTreeMap::<usize, [u32; 3]>::new();
        for row in rows {
            let cell = counts.entry(row.trial).or_default();
            if row.preference == 0 {
                for (count, flag) in cell.iter_mut().zip(row.choice_type.indicator()) {
                    *count += u32::from(flag);
                }
            }
        }
        Self { counts }
    }

    #[must_use]
    pub fn trials(&self) -> Vec<usize> {
        self.counts.keys().copied().collect()
    }

    /// First-preference counts of `label`, in trial order.
    #[must_use]
    pub fn counts(&self, label: ChoiceType) -> Vec<u32> {
        self.counts.values().map(|c| c[label.index()]).collect()
    }

    /// OLS trend of `label`'s count against the trial index.
    #[expect(clippy::cast_precision_loss)]
    pub fn trend(&self, label: ChoiceType) -> Result<TestResult, ComparisonError> {
        let index = self.counts.keys().map(|&t| t as f64).collect::<Vec<_>>();
        let counts = self
            .counts(label)
            .into_iter()
            .map(f64::from)
            .collect::<Vec<_>>();
        battery::trend(&format!("{label} first preferences by trial"), &index, &counts)
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<FirstPreferenceRow> {
        self.counts
            .iter()
            .map(|(&trial, c)| FirstPreferenceRow {
                trial,
                not_chosen: c[ChoiceType::NotChosen.index()],
                shared: c[ChoiceType::Shared.index()],
                chosen: c[ChoiceType::Chosen.index()],
            })
            .collect()
    }
}
