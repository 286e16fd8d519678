//! Statistical analysis utilities for the choicerank project.
//!
//! This crate provides the numeric building blocks of the analysis pipeline:
//!
//! - **Descriptive statistics**: mean, median, quartiles, sample standard deviation
//! - **Percentiles**: linearly interpolated percentiles and interquartile range
//! - **Ranking**: average ranks with tie bookkeeping
//! - **Effect size**: the common-language effect size of two samples
//! - **Distributions**: normal, chi-square and Student t tail probabilities
//! - **Hypothesis tests**: Mann-Whitney U, Wilcoxon signed-rank, Friedman,
//!   chi-square contingency and an ordinary least squares trend test
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Interpolated percentiles and interquartile range
//! - [`rank`]: Tie-aware ranking
//! - [`effect_size`]: Common-language effect size
//! - [`distribution`]: Reference distributions for p-values
//! - [`hypothesis`]: Significance tests
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use choicerank_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.median, 3.0);
//! ```
//!
//! ## Comparing two independent samples
//!
//! ```
//! use choicerank_stats::{effect_size::common_language_effect_size, hypothesis::mann_whitney_u};
//!
//! let left = [1.0, 2.0, 3.0, 4.0];
//! let right = [5.0, 6.0, 7.0, 8.0];
//! let test = mann_whitney_u(&left, &right).unwrap();
//! assert_eq!(test.u, 0.0);
//! assert_eq!(common_language_effect_size(&left, &right).unwrap(), 1.0);
//! ```
//!
//! ## Testing related samples
//!
//! ```
//! use choicerank_stats::hypothesis::friedman;
//!
//! let a = [1.0, 2.0, 1.0, 1.0];
//! let b = [2.0, 3.0, 3.0, 2.0];
//! let c = [3.0, 1.0, 2.0, 3.0];
//! let test = friedman(&[&a, &b, &c]).unwrap();
//! assert_eq!(test.dof, 2);
//!
//! // mismatched lengths are rejected before anything is computed
//! assert!(friedman(&[&a, &b, &c[..3]]).is_err());
//! ```

pub mod descriptive;
pub mod distribution;
pub mod effect_size;
pub mod hypothesis;
pub mod percentiles;
pub mod rank;

/// Input that leaves a statistic undefined, such as two empty samples.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("degenerate input: {reason}")]
pub struct DegenerateInputError {
    pub reason: String,
}

impl DegenerateInputError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A test was invoked on data of the wrong shape (sample count, lengths, table dimensions).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("statistical precondition violated: {reason}")]
pub struct StatisticalPreconditionError {
    pub reason: String,
}

impl StatisticalPreconditionError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StatsError {
    #[display("{_0}")]
    Degenerate(#[error(source)] DegenerateInputError),
    #[display("{_0}")]
    Precondition(#[error(source)] StatisticalPreconditionError),
}
