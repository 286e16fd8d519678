use serde::Serialize;

use super::PValueMethod;
use crate::{
    DegenerateInputError, StatisticalPreconditionError, StatsError,
    distribution::{normal_ppf, normal_sf},
    rank::AverageRanks,
};

/// Largest number of non-zero differences for which the exact distribution is used.
const EXACT_MAX_NONZERO: usize = 50;

/// Wilcoxon signed-rank test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WilcoxonSignedRank {
    /// `T = min(W+, W-)`, the smaller of the positive and negative rank sums.
    pub statistic: f64,
    pub p_value: f64,
    /// z-score derived from the p-value, `Phi^-1(p / 2)` (never positive).
    pub z: f64,
    /// Effect size `|z| / sqrt(n_pairs)`.
    pub r: f64,
    pub method: PValueMethod,
    /// Number of pairs (or differences) supplied, zeros included.
    pub n_pairs: usize,
    /// Number of differences left after dropping zeros.
    pub n_nonzero: usize,
}

/// Wilcoxon signed-rank test of two related samples of equal length.
///
/// Differences are taken as `x - y`.
///
/// # Examples
///
/// ```
/// use choicerank_stats::hypothesis::wilcoxon_signed_rank;
///
/// let before = [10.0, 12.0, 9.0, 15.0, 11.0];
/// let after = [9.0, 10.0, 6.0, 11.0, 6.0];
/// let test = wilcoxon_signed_rank(&before, &after).unwrap();
/// assert_eq!(test.statistic, 0.0);
/// assert!((test.p_value - 0.0625).abs() < 1e-12);
///
/// assert!(wilcoxon_signed_rank(&before, &after[..4]).is_err());
/// ```
pub fn wilcoxon_signed_rank(x: &[f64], y: &[f64]) -> Result<WilcoxonSignedRank, StatsError> {
    if x.len() != y.len() {
        return Err(StatisticalPreconditionError::new(format!(
            "signed-rank test needs samples of equal length, got {} and {}",
            x.len(),
            y.len()
        ))
        .into());
    }
    let differences = x.iter().zip(y).map(|(a, b)| a - b).collect::<Vec<_>>();
    wilcoxon_one_sample(&differences)
}

/// Wilcoxon signed-rank test of differences against zero.
///
/// Zero differences are dropped before ranking. The exact null distribution
/// is used for at most 50 non-zero differences when no zeros were dropped and
/// no absolute differences are tied; otherwise the normal approximation with
/// tie correction is used.
///
/// # Examples
///
/// ```
/// use choicerank_stats::hypothesis::wilcoxon_one_sample;
///
/// let d = [
///     6.0, 8.0, 14.0, 16.0, 23.0, 24.0, 28.0, 29.0, 41.0, -48.0, 49.0, 56.0, 60.0, -67.0, 75.0,
/// ];
/// let test = wilcoxon_one_sample(&d).unwrap();
/// assert_eq!(test.statistic, 24.0);
/// assert!((test.p_value - 0.041_259_765_625).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn wilcoxon_one_sample(differences: &[f64]) -> Result<WilcoxonSignedRank, StatsError> {
    let n_pairs = differences.len();
    let nonzero = differences
        .iter()
        .copied()
        .filter(|d| *d != 0.0)
        .collect::<Vec<_>>();
    let n = nonzero.len();
    if n == 0 {
        return Err(DegenerateInputError::new(
            "signed-rank test needs at least one non-zero difference",
        )
        .into());
    }

    let magnitudes = nonzero.iter().map(|d| d.abs()).collect::<Vec<_>>();
    let ranked = AverageRanks::new(&magnitudes);
    let (mut w_plus, mut w_minus) = (0.0, 0.0);
    for (d, rank) in nonzero.iter().zip(&ranked.ranks) {
        if *d > 0.0 {
            w_plus += rank;
        } else {
            w_minus += rank;
        }
    }
    let statistic = f64::min(w_plus, w_minus);

    let exact = n <= EXACT_MAX_NONZERO && n == n_pairs && !ranked.has_ties();
    let (p_value, method) = if exact {
        (exact_p_value(statistic, n), PValueMethod::Exact)
    } else {
        let nf = n as f64;
        let mean = nf * (nf + 1.0) / 4.0;
        let variance = nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - ranked.tie_term() / 48.0;
        let p = if variance <= 0.0 {
            1.0
        } else {
            let z = (statistic - mean) / variance.sqrt();
            (2.0 * normal_sf(z.abs())).min(1.0)
        };
        (p, PValueMethod::Asymptotic)
    };

    let z = normal_ppf(p_value / 2.0);
    let r = z.abs() / (n_pairs as f64).sqrt();

    Ok(WilcoxonSignedRank {
        statistic,
        p_value,
        z,
        r,
        method,
        n_pairs,
        n_nonzero: n,
    })
}

/// Two-sided exact p-value `2 * P(W <= t)` for `n` untied non-zero differences.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
fn exact_p_value(t: f64, n: usize) -> f64 {
    let counts = signed_rank_distribution(n);
    let threshold = t.round() as usize;
    let lower = counts.iter().take(threshold + 1).sum::<f64>();
    (2.0 * lower / 2_f64.powi(n as i32)).min(1.0)
}

/// Number of sign assignments of ranks `1..=n` that produce each positive rank sum.
fn signed_rank_distribution(n: usize) -> Vec<f64> {
    let max = n * (n + 1) / 2;
    let mut counts = vec![0.0; max + 1];
    counts[0] = 1.0;
    for rank in 1..=n {
        for sum in (rank..=max).rev() {
            counts[sum] += counts[sum - rank];
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_is_symmetric() {
        let counts = signed_rank_distribution(5);
        assert_eq!(counts.len(), 16);
        assert_eq!(counts.iter().sum::<f64>(), 32.0);
        for s in 0..counts.len() {
            assert_eq!(counts[s], counts[counts.len() - 1 - s]);
        }
    }

    #[test]
    fn test_exact_reference_example() {
        let d = [
            6.0, 8.0, 14.0, 16.0, 23.0, 24.0, 28.0, 29.0, 41.0, -48.0, 49.0, 56.0, 60.0, -67.0,
            75.0,
        ];
        let test = wilcoxon_one_sample(&d).unwrap();
        assert_eq!(test.method, PValueMethod::Exact);
        assert_eq!(test.statistic, 24.0);
        assert!((test.p_value - 0.041_259_765_625).abs() < 1e-12);
        assert!(test.z < 0.0);
        assert!((test.z - normal_ppf(test.p_value / 2.0)).abs() < 1e-12);
        assert!((test.r - test.z.abs() / 15_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_ties_use_normal_approximation() {
        // |d| ranks: 1.5, 1.5, 3, 4, 5, 6; W- = 4
        let d = [1.0, 1.0, 2.0, -3.0, 4.0, 5.0];
        let test = wilcoxon_one_sample(&d).unwrap();
        assert_eq!(test.method, PValueMethod::Asymptotic);
        assert_eq!(test.statistic, 4.0);
        let variance: f64 = 6.0 * 7.0 * 13.0 / 24.0 - 6.0 / 48.0;
        let z = (4.0 - 10.5) / variance.sqrt();
        assert!((test.p_value - 2.0 * normal_sf(z.abs())).abs() < 1e-12);
    }

    #[test]
    fn test_zeros_are_dropped_but_counted_in_r() {
        let d = [0.0, 0.0, 1.0, 2.0, 3.0, -4.0];
        let test = wilcoxon_one_sample(&d).unwrap();
        assert_eq!(test.n_pairs, 6);
        assert_eq!(test.n_nonzero, 4);
        assert_eq!(test.method, PValueMethod::Asymptotic);
        assert_eq!(test.statistic, 4.0);
        assert!((test.r - test.z.abs() / 6_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_all_zero_differences_are_degenerate() {
        assert!(matches!(
            wilcoxon_signed_rank(&[1.0, 2.0], &[1.0, 2.0]),
            Err(StatsError::Degenerate(_))
        ));
    }

    #[test]
    fn test_length_mismatch_is_precondition_failure() {
        assert!(matches!(
            wilcoxon_signed_rank(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::Precondition(_))
        ));
    }

    #[test]
    fn test_symmetric_differences_are_not_significant() {
        let test = wilcoxon_one_sample(&[1.0, -2.0, 3.0, -4.0, 5.0, -6.0, 7.0, -8.0]).unwrap();
        assert!(test.p_value > 0.5);
        assert!(test.p_value <= 1.0);
    }
}
