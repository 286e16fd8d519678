//! Participant x label rank-sum tables.
//!
//! The rank sum of a label is the total of the 0-based rank positions the
//! participant gave to options of that label, over all trials. Lower sums mean
//! the label was preferred.

use std::{collections::BTreeMap, fmt};

use choicerank_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::{
    classify::{ChoiceType, PreferenceRow},
    trial_record::ParticipantId,
};

/// Rank sums of one participant, one field per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RankSums {
    pub not_chosen: f64,
    pub shared: f64,
    pub chosen: f64,
}

impl RankSums {
    #[must_use]
    pub fn get(&self, label: ChoiceType) -> f64 {
        match label {
            ChoiceType::NotChosen => self.not_chosen,
            ChoiceType::Shared => self.shared,
            ChoiceType::Chosen => self.chosen,
        }
    }

    fn get_mut(&mut self, label: ChoiceType) -> &mut f64 {
        match label {
            ChoiceType::NotChosen => &mut self.not_chosen,
            ChoiceType::Shared => &mut self.shared,
            ChoiceType::Chosen => &mut self.chosen,
        }
    }
}

/// A participant that never ranked an option of some label.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct AggregationError {
    pub participant: ParticipantId,
    pub missing: Vec<ChoiceType>,
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant {} has no ranked options labelled ", self.participant)?;
        for (i, label) in self.missing.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}

/// One table row, for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankSumRow {
    pub participant: ParticipantId,
    #[serde(rename = "NotChosen")]
    pub not_chosen: f64,
    #[serde(rename = "Shared")]
    pub shared: f64,
    #[serde(rename = "Chosen")]
    pub chosen: f64,
}

/// Rank sums keyed by participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankSumTable {
    rows: BTreeMap<ParticipantId, RankSums>,
}

impl RankSumTable {
    /// Aggregates preference rows, failing on the first participant (in
    /// participant order) that lacks a label.
    ///
    /// # Examples
    ///
    /// ```
    /// use choicerank_analysis::{
    ///     classify::{ChoiceType, PreferenceRow},
    ///     rank_sum::RankSumTable,
    ///     trial_record::ParticipantId,
    /// };
    ///
    /// let row = |trial, preference, choice_type| PreferenceRow {
    ///     participant: ParticipantId(0),
    ///     trial,
    ///     preference,
    ///     option: 0,
    ///     choice_type,
    /// };
    /// let rows = [
    ///     row(0, 0, ChoiceType::Chosen),
    ///     row(0, 1, ChoiceType::Shared),
    ///     row(0, 2, ChoiceType::NotChosen),
    ///     row(1, 0, ChoiceType::Shared),
    ///     row(1, 1, ChoiceType::Chosen),
    /// ];
    /// let table = RankSumTable::aggregate(&rows).unwrap();
    /// assert_eq!(table.column(ChoiceType::Chosen), vec![1.0]);
    /// assert_eq!(table.column(ChoiceType::Shared), vec![1.0]);
    /// assert_eq!(table.column(ChoiceType::NotChosen), vec![2.0]);
    ///
    /// // without the NotChosen row the participant is incomplete
    /// assert!(RankSumTable::aggregate(&rows[3..]).is_err());
    /// ```
    pub fn aggregate(rows: &[PreferenceRow]) -> Result<Self, AggregationError> {
        let (table, errors) = Self::aggregate_partial(rows);
        match errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(table),
        }
    }

    /// Aggregates preference rows, excluding incomplete participants.
    ///
    /// Every excluded participant is returned as an [`AggregationError`].
    #[must_use]
    pub fn aggregate_partial(rows: &[PreferenceRow]) -> (Self, Vec<AggregationError>) {
        let mut sums = BTreeMap::<ParticipantId, (RankSums, [bool; 3])>::new();
        for row in rows {
            let (entry, seen) = sums.entry(row.participant).or_default();
            #[expect(clippy::cast_precision_loss)]
            let preference = row.preference as f64;
            *entry.get_mut(row.choice_type) += preference;
            seen[row.choice_type.index()] = true;
        }

        let mut table = Self::default();
        let mut errors = vec![];
        for (participant, (entry, seen)) in sums {
            let missing = ChoiceType::ALL
                .into_iter()
                .filter(|label| !seen[label.index()])
                .collect::<Vec<_>>();
            if missing.is_empty() {
                table.rows.insert(participant, entry);
            } else {
                errors.push(AggregationError {
                    participant,
                    missing,
                });
            }
        }
        (table, errors)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, participant: ParticipantId) -> Option<&RankSums> {
        self.rows.get(&participant)
    }

    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.rows.keys().copied()
    }

    /// Rank sums of one label, in participant order.
    #[must_use]
    pub fn column(&self, label: ChoiceType) -> Vec<f64> {
        self.rows.values().map(|sums| sums.get(label)).collect()
    }

    /// Descriptive statistics of one label's column; `None` for an empty table.
    #[must_use]
    pub fn summary(&self, label: ChoiceType) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.column(label))
    }

    /// Flat rows for export, in participant order.
    #[must_use]
    pub fn to_rows(&self) -> Vec<RankSumRow> {
        self.rows
            .iter()
            .map(|(&participant, sums)| RankSumRow {
                participant,
                not_chosen: sums.not_chosen,
                shared: sums.shared,
                chosen: sums.chosen,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        participant: usize,
        trial: usize,
        preference: usize,
        label: ChoiceType,
    ) -> PreferenceRow {
        PreferenceRow {
            participant: ParticipantId(participant),
            trial,
            preference,
            option: 0,
            choice_type: label,
        }
    }

    fn complete_trial(
        participant: usize,
        trial: usize,
        order: [ChoiceType; 3],
    ) -> Vec<PreferenceRow> {
        order
            .into_iter()
            .enumerate()
            .map(|(preference, label)| row(participant, trial, preference, label))
            .collect()
    }

    #[test]
    fn test_complete_participants_form_n_by_3_table() {
        use ChoiceType::{Chosen, NotChosen, Shared};
        let mut rows = vec![];
        for p in 0..4 {
            rows.extend(complete_trial(p, 0, [Chosen, Shared, NotChosen]));
            rows.extend(complete_trial(p, 1, [Shared, Chosen, NotChosen]));
        }
        let table = RankSumTable::aggregate(&rows).unwrap();
        assert_eq!(table.len(), 4);
        for label in ChoiceType::ALL {
            assert_eq!(table.column(label).len(), 4);
        }
        let sums = table.get(ParticipantId(2)).unwrap();
        assert_eq!(sums.chosen, 1.0);
        assert_eq!(sums.shared, 1.0);
        assert_eq!(sums.not_chosen, 4.0);
    }

    #[test]
    fn test_missing_label_is_an_error() {
        use ChoiceType::{Chosen, NotChosen, Shared};
        let mut rows = complete_trial(0, 0, [Chosen, Shared, NotChosen]);
        rows.push(row(1, 0, 0, Chosen));
        rows.push(row(1, 0, 1, NotChosen));

        let err = RankSumTable::aggregate(&rows).unwrap_err();
        assert_eq!(err.participant, ParticipantId(1));
        assert_eq!(err.missing, vec![Shared]);
        assert_eq!(
            err.to_string(),
            "participant 1 has no ranked options labelled Shared"
        );
    }

    #[test]
    fn test_partial_aggregation_keeps_complete_participants() {
        use ChoiceType::{Chosen, NotChosen, Shared};
        let mut rows = complete_trial(0, 0, [Chosen, Shared, NotChosen]);
        rows.push(row(1, 0, 0, Chosen));
        rows.extend(complete_trial(2, 0, [NotChosen, Shared, Chosen]));

        let (table, errors) = RankSumTable::aggregate_partial(&rows);
        let participants = table.participants().collect::<Vec<_>>();
        assert_eq!(participants, vec![ParticipantId(0), ParticipantId(2)]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].missing, vec![NotChosen, Shared]);
        // zero is a legitimate rank sum when the label was always ranked first
        assert_eq!(table.column(Chosen), vec![0.0, 2.0]);
    }

    #[test]
    fn test_row_order_does_not_matter() {
        use ChoiceType::{Chosen, NotChosen, Shared};
        let mut rows = vec![];
        for p in [3, 1, 2] {
            rows.extend(complete_trial(p, 0, [Shared, NotChosen, Chosen]));
        }
        let forward = RankSumTable::aggregate(&rows).unwrap();
        rows.reverse();
        let backward = RankSumTable::aggregate(&rows).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.to_rows()[0].participant, ParticipantId(1));
    }

    #[test]
    fn test_summary() {
        use ChoiceType::{Chosen, NotChosen, Shared};
        let mut rows = vec![];
        rows.extend(complete_trial(0, 0, [Chosen, Shared, NotChosen]));
        rows.extend(complete_trial(1, 0, [Shared, Chosen, NotChosen]));
        rows.extend(complete_trial(2, 0, [NotChosen, Shared, Chosen]));
        let table = RankSumTable::aggregate(&rows).unwrap();
        let chosen = table.summary(Chosen).unwrap();
        assert_eq!(chosen.median, 1.0);
        assert!(RankSumTable::default().summary(Chosen).is_none());
    }
}
