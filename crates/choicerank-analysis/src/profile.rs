//! Who took part: counts, demographic shares and age.

use std::collections::BTreeMap;

use choicerank_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::dataset::Dataset;

/// Columns the profile is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileColumns<'a> {
    pub gender: &'a str,
    pub affiliation: &'a str,
    pub age: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeSummary {
    /// Participants with a numeric age.
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation; `NaN` for a single participant.
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantProfile {
    pub participants: usize,
    /// Share of each gender value, keyed (and so sorted) by value.
    pub gender: BTreeMap<String, f64>,
    pub affiliation: BTreeMap<String, f64>,
    /// `None` when no participant has a numeric age.
    pub age: Option<AgeSummary>,
}

impl ParticipantProfile {
    /// Profiles every observation of `data`.
    ///
    /// Shares are taken over the observations with a non-empty value in that
    /// column. The age is read as a numeric measure, or else parsed from the
    /// attribute; anything non-numeric is left out of the age summary.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use choicerank_analysis::{
    ///     dataset::{Dataset, Observation},
    ///     profile::{ParticipantProfile, ProfileColumns},
    ///     trial_record::ParticipantId,
    /// };
    ///
    /// let person = |id, gender: &str, age: &str| Observation {
    ///     participant: ParticipantId(id),
    ///     attributes: BTreeMap::from([
    ///         ("gender".to_owned(), gender.to_owned()),
    ///         ("age".to_owned(), age.to_owned()),
    ///     ]),
    ///     measures: BTreeMap::new(),
    /// };
    /// let data = Dataset::new(
    ///     vec![person(0, "f", "30"), person(1, "m", "40"), person(2, "f", "n/a")],
    ///     vec![],
    /// );
    /// let columns = ProfileColumns { gender: "gender", affiliation: "party", age: "age" };
    /// let profile = ParticipantProfile::new(&data, columns);
    /// assert_eq!(profile.participants, 3);
    /// assert!((profile.gender["f"] - 2.0 / 3.0).abs() < 1e-12);
    /// assert!(profile.affiliation.is_empty());
    /// assert_eq!(profile.age.unwrap().mean, 35.0);
    /// ```
    #[must_use]
    pub fn new(data: &Dataset, columns: ProfileColumns<'_>) -> Self {
        let ages = data.observations().iter().filter_map(|o| {
            o.measure(columns.age)
                .or_else(|| o.attribute(columns.age)?.trim().parse::<f64>().ok())
                .filter(|age| age.is_finite())
        });
        let age = DescriptiveStats::new(ages).map(|stats| AgeSummary {
            n: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
        });
        Self {
            participants: data.len(),
            gender: shares(data, columns.gender),
            affiliation: shares(data, columns.affiliation),
            age,
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn shares(data: &Dataset, column: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::<String, usize>::new();
    for value in data.observations().iter().filter_map(|o| o.attribute(column)) {
        if !value.is_empty() {
            *counts.entry(value.to_owned()).or_default() += 1;
        }
    }
    let total = counts.values().sum::<usize>();
    counts
        .into_iter()
        .map(|(value, count)| (value, count as f64 / total as f64))
        .collect()
}
