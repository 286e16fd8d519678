//! Significance tests.
//!
//! Every test is a pure function over borrowed samples that returns a result
//! struct carrying its statistic, its p-value and any ancillary values, or a
//! [`StatsError`](crate::StatsError) when the input is degenerate or has the
//! wrong shape. All p-values are two-sided.

mod contingency;
mod friedman;
mod mann_whitney;
mod regression;
mod wilcoxon;

pub use self::{
    contingency::{ChiSquareContingency, chi_square_contingency},
    friedman::{Friedman, friedman},
    mann_whitney::{MannWhitneyU, PValueMethod, mann_whitney_u},
    regression::{LinearTrend, linear_trend},
    wilcoxon::{WilcoxonSignedRank, wilcoxon_one_sample, wilcoxon_signed_rank},
};
