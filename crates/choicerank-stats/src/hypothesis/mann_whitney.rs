use serde::Serialize;

use crate::{DegenerateInputError, StatsError, distribution::normal_sf, rank::AverageRanks};

/// Largest sample size for which the exact null distribution is used.
const EXACT_MAX_SAMPLE: usize = 8;

/// How the p-value of a rank test was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum PValueMethod {
    #[display("exact")]
    Exact,
    #[display("normal approximation")]
    Asymptotic,
}

/// Mann-Whitney U test of two independent samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MannWhitneyU {
    /// U statistic of the first sample: number of (x, y) pairs with `x > y`,
    /// ties counting one half.
    pub u: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Standardized statistic (continuity and tie corrected); `None` for exact tests.
    pub z: Option<f64>,
    pub method: PValueMethod,
    pub n1: usize,
    pub n2: usize,
}

/// Mann-Whitney U test (Wilcoxon rank-sum test) of two independent samples.
///
/// The exact null distribution is used when both samples have at most eight
/// values and there are no ties; otherwise the normal approximation with tie
/// and continuity corrections is used.
///
/// # Examples
///
/// ```
/// use choicerank_stats::hypothesis::{PValueMethod, mann_whitney_u};
///
/// let males = [19.0, 22.0, 16.0, 29.0, 24.0];
/// let females = [20.0, 11.0, 17.0, 12.0];
/// let test = mann_whitney_u(&males, &females).unwrap();
/// assert_eq!(test.u, 17.0);
/// assert_eq!(test.method, PValueMethod::Exact);
/// assert!((test.p_value - 0.111_111_111_111_111_1).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitneyU, StatsError> {
    if x.is_empty() || y.is_empty() {
        return Err(
            DegenerateInputError::new("Mann-Whitney U needs two non-empty samples").into(),
        );
    }

    let (n1, n2) = (x.len(), y.len());
    let pooled = x.iter().chain(y).copied().collect::<Vec<_>>();
    let ranked = AverageRanks::new(&pooled);
    let rank_sum_x = ranked.ranks[..n1].iter().sum::<f64>();

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let u1 = rank_sum_x - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;
    let u_max = u1.max(u2);

    let (p_value, z, method) =
        if n1 <= EXACT_MAX_SAMPLE && n2 <= EXACT_MAX_SAMPLE && !ranked.has_ties() {
            (exact_p_value(u_max, n1, n2), None, PValueMethod::Exact)
        } else {
            let n = n1f + n2f;
            let mean = n1f * n2f / 2.0;
            let variance = n1f * n2f / 12.0 * ((n + 1.0) - ranked.tie_term() / (n * (n - 1.0)));
            if variance <= 0.0 {
                // every value tied: no evidence either way
                (1.0, Some(0.0), PValueMethod::Asymptotic)
            } else {
                let z = (u_max - mean - 0.5) / variance.sqrt();
                ((2.0 * normal_sf(z)).clamp(0.0, 1.0), Some(z), PValueMethod::Asymptotic)
            }
        };

    Ok(MannWhitneyU {
        u: u1,
        p_value,
        z,
        method,
        n1,
        n2,
    })
}

/// Two-sided exact p-value `2 * P(U >= u_max)` under the null hypothesis.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn exact_p_value(u_max: f64, n1: usize, n2: usize) -> f64 {
    let counts = u_distribution(n1, n2);
    let total = counts.iter().sum::<f64>();
    let threshold = u_max.round() as usize;
    let upper = counts.iter().skip(threshold).sum::<f64>();
    (2.0 * upper / total).min(1.0)
}

/// Number of orderings of `n1 + n2` distinct values that produce each value of U.
///
/// Uses the recurrence `c(m, n, u) = c(m - 1, n, u - n) + c(m, n - 1, u)`.
fn u_distribution(n1: usize, n2: usize) -> Vec<f64> {
    // table[j] holds the distribution for (i, j) while sweeping i
    let mut table = (0..=n2).map(|_| vec![1.0]).collect::<Vec<Vec<f64>>>();
    for i in 1..=n1 {
        let mut next = vec![vec![1.0]];
        for j in 1..=n2 {
            let mut counts = vec![0.0; i * j + 1];
            // the largest of all values belongs to sample 1: it beats all j of sample 2
            for (u, &c) in table[j].iter().enumerate() {
                counts[u + j] += c;
            }
            // the largest value belongs to sample 2
            for (u, &c) in next[j - 1].iter().enumerate() {
                counts[u] += c;
            }
            next.push(counts);
        }
        table = next;
    }
    table.swap_remove(n2)
}
