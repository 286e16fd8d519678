//! Where in the ranking each label ends up.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::{ChoiceType, PreferenceRow};

/// Share of one label's rows that sit at one rank position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionRow {
    /// Ordinal rank position, `1st` being the most preferred.
    pub position: String,
    pub choice_type: ChoiceType,
    pub count: usize,
    /// `count` over the label's row total.
    pub proportion: f64,
    /// `sqrt(p (1 - p) / count)`, the cell's own count as `n`. Zero for an
    /// empty cell.
    pub standard_error: f64,
}

/// Counts and proportions of each label at each rank position.
///
/// Rows come in position order, labels in [`ChoiceType::ALL`] order within a
/// position. Labels that never occur are left out; positions where a present
/// label does not occur get a zero row.
///
/// # Examples
///
/// ```
/// use choicerank_analysis::{
///     classify::{ChoiceType, PreferenceRow},
///     proportions::choice_proportions,
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
///     row(1, 0, ChoiceType::Chosen),
///     row(1, 1, ChoiceType::Chosen),
/// ];
/// let table = choice_proportions(&rows);
/// let first_shared = &table[0];
/// assert_eq!(first_shared.position, "1st");
/// assert_eq!(first_shared.choice_type, ChoiceType::Shared);
/// assert_eq!(first_shared.count, 0);
/// assert!((table[1].proportion - 2.0 / 3.0).abs() < 1e-12);
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn choice_proportions(rows: &[PreferenceRow]) -> Vec<ProportionRow> {
    let mut counts = BTreeMap::<usize, [usize; 3]>::new();
    let mut totals = [0_usize; 3];
    for row in rows {
        counts.entry(row.preference).or_default()[row.choice_type.index()] += 1;
        totals[row.choice_type.index()] += 1;
    }

    let mut table = vec![];
    for (&position, cell) in &counts {
        for label in ChoiceType::ALL {
            let total = totals[label.index()];
            if total == 0 {
                continue;
            }
            let count = cell[label.index()];
            let p = count as f64 / total as f64;
            let standard_error = if count == 0 {
                0.0
            } else {
                (p * (1.0 - p) / count as f64).sqrt()
            };
            table.push(ProportionRow {
                position: ordinal(position + 1),
                choice_type: label,
                count,
                proportion: p,
                standard_error,
            });
        }
    }
    table
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
