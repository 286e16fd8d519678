//! A uniform result type over the significance tests of `choicerank-stats`.
//!
//! Every test the analysis runs is reported as a [`TestResult`]: test name,
//! statistic, p-value, an optional effect size, named ancillary values and
//! median/IQR summaries of the compared groups.

use std::{collections::BTreeMap, fmt};

use choicerank_stats::{
    DegenerateInputError, StatsError,
    descriptive::DescriptiveStats,
    effect_size::common_language_effect_size,
    hypothesis::{
        chi_square_contingency, friedman, linear_trend, mann_whitney_u, wilcoxon_one_sample,
        wilcoxon_signed_rank,
    },
};
use serde::Serialize;

use crate::{dataset::CrossTab, rank_sum::AggregationError};

/// Which two-sample test [`compare`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TestKind {
    /// Independent groups: Mann-Whitney U with the common-language effect size.
    #[display("rank-sum")]
    RankSum,
    /// Paired groups: Wilcoxon signed-rank with derived z and r.
    #[display("signed-rank")]
    SignedRank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum TestName {
    #[display("Mann-Whitney U")]
    MannWhitneyU,
    #[display("Wilcoxon signed-rank")]
    WilcoxonSignedRank,
    #[display("Friedman")]
    Friedman,
    #[display("Chi-square")]
    ChiSquare,
    #[display("OLS trend")]
    LinearTrend,
}

/// Median and IQR of one compared group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub n: usize,
    pub median: f64,
    pub iqr: f64,
}

impl GroupSummary {
    /// `None` for an empty sample.
    #[must_use]
    pub fn new(name: &str, values: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::new(values.iter().copied())?;
        Some(Self {
            name: name.to_owned(),
            n: stats.count,
            median: stats.median,
            iqr: stats.iqr(),
        })
    }
}

/// A sample with the label it is reported under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedSample<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
}

impl<'a> NamedSample<'a> {
    #[must_use]
    pub fn new(name: &'a str, values: &'a [f64]) -> Self {
        Self { name, values }
    }

    /// Rejects NaN and infinite values, which have no rank.
    fn check_finite(&self) -> Result<(), StatsError> {
        if self.values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            let reason = format!("{} contains non-finite values", self.name);
            Err(DegenerateInputError::new(reason).into())
        }
    }
}

/// Outcome of one test at one comparison node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Label of the hierarchy node, empty until [`TestResult::at_node`] is called.
    pub node: String,
    pub test: TestName,
    /// What was compared, e.g. `Left-wing vs Right-wing`.
    pub comparison: String,
    pub statistic: f64,
    pub p_value: f64,
    pub effect_size: Option<f64>,
    pub ancillary: BTreeMap<String, f64>,
    pub groups: Vec<GroupSummary>,
}

impl TestResult {
    fn new(test: TestName, comparison: String, statistic: f64, p_value: f64) -> Self {
        Self {
            node: String::new(),
            test,
            comparison,
            statistic,
            p_value,
            effect_size: None,
            ancillary: BTreeMap::new(),
            groups: vec![],
        }
    }

    fn with(mut self, key: &str, value: f64) -> Self {
        self.ancillary.insert(key.to_owned(), value);
        self
    }

    fn with_groups(mut self, samples: &[NamedSample<'_>]) -> Self {
        self.groups = samples
            .iter()
            .filter_map(|s| GroupSummary::new(s.name, s.values))
            .collect();
        self
    }

    /// The same result attributed to the node labelled `node`.
    #[must_use]
    pub fn at_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    /// Ancillary value by name (`z`, `r`, `dof`, ...).
    #[must_use]
    pub fn ancillary(&self, key: &str) -> Option<f64> {
        self.ancillary.get(key).copied()
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.node.is_empty() {
            write!(f, "[{}] ", self.node)?;
        }
        write!(
            f,
            "{} ({}): statistic = {:.4}, p = {:.4}",
            self.test, self.comparison, self.statistic, self.p_value
        )?;
        if let Some(effect_size) = self.effect_size {
            write!(f, ", effect size = {effect_size:.4}")?;
        }
        for (key, value) in &self.ancillary {
            write!(f, ", {key} = {value:.4}")?;
        }
        for group in &self.groups {
            write!(
                f,
                "; {}: n = {}, median = {:.2}, IQR = {:.2}",
                group.name, group.n, group.median, group.iqr
            )?;
        }
        Ok(())
    }
}

/// Why a comparison produced no result.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ComparisonError {
    #[display("{_0}")]
    Stats(#[error(source)] StatsError),
    #[display("{_0}")]
    Aggregation(#[error(source)] AggregationError),
}

/// Compares two groups.
///
/// For [`TestKind::RankSum`] the effect size is the probability that a value
/// of `b` exceeds a value of `a`. For [`TestKind::SignedRank`] it is `r`.
///
/// # Examples
///
/// ```
/// use choicerank_analysis::battery::{NamedSample, TestKind, TestName, compare};
///
/// let left = [10.0, 20.0, 30.0];
/// let right = [40.0, 50.0, 60.0];
/// let result = compare(
///     NamedSample::new("Left-wing", &left),
///     NamedSample::new("Right-wing", &right),
///     TestKind::RankSum,
/// )
/// .unwrap();
/// assert_eq!(result.test, TestName::MannWhitneyU);
/// assert_eq!(result.statistic, 0.0);
/// assert_eq!(result.effect_size, Some(1.0));
/// assert_eq!(result.groups[1].median, 50.0);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn compare(
    a: NamedSample<'_>,
    b: NamedSample<'_>,
    kind: TestKind,
) -> Result<TestResult, ComparisonError> {
    a.check_finite()?;
    b.check_finite()?;
    let comparison = format!("{} vs {}", a.name, b.name);
    let result = match kind {
        TestKind::RankSum => {
            let test = mann_whitney_u(a.values, b.values)?;
            let effect_size =
                common_language_effect_size(a.values, b.values).map_err(StatsError::from)?;
            let mut result =
                TestResult::new(TestName::MannWhitneyU, comparison, test.u, test.p_value)
                    .with("n1", test.n1 as f64)
                    .with("n2", test.n2 as f64);
            if let Some(z) = test.z {
                result = result.with("z", z);
            }
            result.effect_size = Some(effect_size);
            result
        }
        TestKind::SignedRank => {
            let test = wilcoxon_signed_rank(a.values, b.values)?;
            let mut result = TestResult::new(
                TestName::WilcoxonSignedRank,
                comparison,
                test.statistic,
                test.p_value,
            )
            .with("z", test.z)
            .with("r", test.r)
            .with("n", test.n_pairs as f64);
            result.effect_size = Some(test.r);
            result
        }
    };
    Ok(result.with_groups(&[a, b]))
}

/// Friedman omnibus test of related samples.
#[expect(clippy::cast_precision_loss)]
pub fn compare_related(samples: &[NamedSample<'_>]) -> Result<TestResult, ComparisonError> {
    for sample in samples {
        sample.check_finite()?;
    }
    let values = samples.iter().map(|s| s.values).collect::<Vec<_>>();
    let test = friedman(&values)?;
    let comparison = samples.iter().map(|s| s.name).collect::<Vec<_>>().join(", ");
    let result = TestResult::new(TestName::Friedman, comparison, test.statistic, test.p_value)
        .with("dof", test.dof as f64)
        .with("n", test.n_blocks as f64)
        .with_groups(samples);
    Ok(result)
}

/// One-sample Wilcoxon test of `sample` against `center`.
#[expect(clippy::cast_precision_loss)]
pub fn compare_to_constant(
    sample: NamedSample<'_>,
    center: f64,
) -> Result<TestResult, ComparisonError> {
    sample.check_finite()?;
    let differences = sample.values.iter().map(|v| v - center).collect::<Vec<_>>();
    let test = wilcoxon_one_sample(&differences)?;
    let comparison = format!("{} vs {center}", sample.name);
    let mut result = TestResult::new(
        TestName::WilcoxonSignedRank,
        comparison,
        test.statistic,
        test.p_value,
    )
    .with("z", test.z)
    .with("r", test.r)
    .with("n", test.n_pairs as f64)
    .with_groups(&[sample]);
    result.effect_size = Some(test.r);
    Ok(result)
}

/// OLS trend of `outcome` against the ordinal `index`; the statistic is the
/// slope's t.
#[expect(clippy::cast_precision_loss)]
pub fn trend(name: &str, index: &[f64], outcome: &[f64]) -> Result<TestResult, ComparisonError> {
    let fit = linear_trend(index, outcome)?;
    let result = TestResult::new(TestName::LinearTrend, name.to_owned(), fit.t, fit.p_value)
        .with("slope", fit.slope)
        .with("slope_se", fit.slope_se)
        .with("intercept", fit.intercept)
        .with("r_squared", fit.r_squared)
        .with("n", fit.n as f64);
    Ok(result)
}

/// Chi-square test of independence on a cross tabulation.
#[expect(clippy::cast_precision_loss)]
pub fn association(name: &str, table: &CrossTab) -> Result<TestResult, ComparisonError> {
    let test = chi_square_contingency(&table.counts)?;
    let total = table.counts.iter().flatten().sum::<f64>();
    let result = TestResult::new(TestName::ChiSquare, name.to_owned(), test.statistic, test.p_value)
        .with("dof", test.dof as f64)
        .with("n", total)
        .with("yates", if test.yates_corrected { 1.0 } else { 0.0 });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use choicerank_stats::StatisticalPreconditionError;

    use super::*;

    #[test]
    fn test_rank_sum_uses_first_group_as_lesser() {
        let low = [1.0, 2.0, 3.0, 4.0];
        let high = [3.5, 5.0, 6.0, 7.0];
        let forward = compare(
            NamedSample::new("low", &low),
            NamedSample::new("high", &high),
            TestKind::RankSum,
        )
        .unwrap();
        let backward = compare(
            NamedSample::new("high", &high),
            NamedSample::new("low", &low),
            TestKind::RankSum,
        )
        .unwrap();
        // 15 of 16 pairs have high > low
        assert!((forward.effect_size.unwrap() - 15.0 / 16.0).abs() < 1e-12);
        assert!((backward.effect_size.unwrap() - 1.0 / 16.0).abs() < 1e-12);
        assert!((forward.p_value - backward.p_value).abs() < 1e-12);
        assert_eq!(forward.comparison, "low vs high");
        assert_eq!(forward.ancillary("n1"), Some(4.0));
    }

    #[test]
    fn test_signed_rank_reports_z_and_r() {
        let before = [10.0, 12.0, 9.0, 15.0, 11.0];
        let after = [9.0, 10.0, 6.0, 11.0, 6.0];
        let result = compare(
            NamedSample::new("before", &before),
            NamedSample::new("after", &after),
            TestKind::SignedRank,
        )
        .unwrap();
        assert_eq!(result.test, TestName::WilcoxonSignedRank);
        let z = result.ancillary("z").unwrap();
        let r = result.ancillary("r").unwrap();
        assert!(z < 0.0);
        assert!((r - z.abs() / 5.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(result.effect_size, Some(r));
        assert_eq!(result.groups.len(), 2);
    }

    #[test]
    fn test_errors_are_wrapped() {
        let err = compare(
            NamedSample::new("a", &[]),
            NamedSample::new("b", &[1.0]),
            TestKind::RankSum,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Stats(StatsError::Degenerate(DegenerateInputError { .. }))
        ));

        let samples = [NamedSample::new("a", &[1.0]), NamedSample::new("b", &[2.0])];
        let err = compare_related(&samples).unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Stats(StatsError::Precondition(StatisticalPreconditionError { .. }))
        ));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let err = compare(
            NamedSample::new("a", &[1.0, f64::NAN, 3.0]),
            NamedSample::new("b", &[4.0, 5.0, 6.0]),
            TestKind::RankSum,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ComparisonError::Stats(StatsError::Degenerate(DegenerateInputError { .. }))
        ));
        assert!(err.to_string().contains("a contains non-finite values"));

        let samples = [
            NamedSample::new("a", &[1.0, 2.0]),
            NamedSample::new("b", &[2.0, f64::INFINITY]),
            NamedSample::new("c", &[3.0, 1.0]),
        ];
        assert!(compare_related(&samples).is_err());
        let slider = [51.0, f64::NAN];
        assert!(compare_to_constant(NamedSample::new("slider", &slider), 50.0).is_err());
    }

    #[test]
    fn test_friedman_result_carries_dof() {
        let a = [1.0, 1.0, 2.0, 1.0];
        let b = [2.0, 3.0, 1.0, 2.0];
        let c = [3.0, 2.0, 3.0, 3.0];
        let samples = [
            NamedSample::new("a", &a),
            NamedSample::new("b", &b),
            NamedSample::new("c", &c),
        ];
        let result = compare_related(&samples).unwrap();
        assert_eq!(result.ancillary("dof"), Some(2.0));
        assert_eq!(result.ancillary("n"), Some(4.0));
        assert_eq!(result.comparison, "a, b, c");
    }

    #[test]
    fn test_compare_to_constant() {
        let slider = [51.0, 52.0, 53.0, 54.0, 55.0, 56.0];
        let result = compare_to_constant(NamedSample::new("slider", &slider), 50.0).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert!((result.p_value - 0.03125).abs() < 1e-12);
        assert_eq!(result.groups[0].median, 53.5);
    }

    #[test]
    fn test_display_mentions_node_and_groups() {
        let result = trend("Chosen", &[0.0, 1.0, 2.0, 3.0], &[2.0, 2.0, 3.0, 3.0])
            .unwrap()
            .at_node("Overall");
        let text = result.to_string();
        assert!(text.starts_with("[Overall] OLS trend (Chosen): statistic = "));
        assert!(text.contains("slope = 0.4000"));
    }
}
