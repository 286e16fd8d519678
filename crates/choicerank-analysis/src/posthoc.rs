//! Checks run after the main group comparison.

use crate::{
    battery::{self, ComparisonError, NamedSample, TestResult},
    dataset::Dataset,
};

/// Chi-square test of whether `row_column` and `col_column` are associated.
pub fn association(
    data: &Dataset,
    row_column: &str,
    col_column: &str,
) -> Result<TestResult, ComparisonError> {
    let table = data.crosstab(row_column, col_column);
    tracing::debug!(?table, "cross tabulation of {row_column} by {col_column}");
    battery::association(&format!("{row_column} x {col_column}"), &table)
}

/// One-sample Wilcoxon test of `measure` against `midpoint`.
///
/// A significant result means responses lean to one side of the scale.
pub fn response_bias(
    data: &Dataset,
    measure: &str,
    midpoint: f64,
) -> Result<TestResult, ComparisonError> {
    let values = data.measure_values(measure);
    battery::compare_to_constant(NamedSample::new(measure, &values), midpoint)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use choicerank_stats::StatsError;

    use super::*;
    use crate::{battery::TestName, dataset::Observation, trial_record::ParticipantId};

    fn data() -> Dataset {
        let observations = (0..40)
            .map(|i| {
                let party = if i < 20 { "Democrat" } else { "Republican" };
                // democrats mostly saw left-wing opinions
                let vote = if (i < 20 && i % 5 != 0) || (i >= 20 && i % 5 == 0) {
                    "Left-wing"
                } else {
                    "Right-wing"
                };
                Observation {
                    participant: ParticipantId(i),
                    attributes: BTreeMap::from([
                        ("party".to_owned(), party.to_owned()),
                        ("vote".to_owned(), vote.to_owned()),
                    ]),
                    measures: BTreeMap::from([("slider".to_owned(), 50.0)]),
                }
            })
            .collect();
        Dataset::new(observations, vec![])
    }

    #[test]
    fn test_association_of_party_and_vote() {
        let result = association(&data(), "party", "vote").unwrap();
        assert_eq!(result.test, TestName::ChiSquare);
        assert_eq!(result.comparison, "party x vote");
        assert_eq!(result.ancillary("dof"), Some(1.0));
        assert_eq!(result.ancillary("yates"), Some(1.0));
        assert_eq!(result.ancillary("n"), Some(40.0));
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_response_bias_at_the_midpoint_is_degenerate() {
        let err = response_bias(&data(), "slider", 50.0).unwrap_err();
        assert!(matches!(err, ComparisonError::Stats(StatsError::Degenerate(_))));

        let result = response_bias(&data(), "slider", 40.0).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert!(result.p_value < 1e-6);
        assert_eq!(result.groups[0].median, 50.0);
        assert_eq!(result.groups[0].iqr, 0.0);
    }
}
