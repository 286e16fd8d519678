use serde::Serialize;

use crate::{
    DegenerateInputError, StatisticalPreconditionError, StatsError, distribution::chi_square_sf,
    rank::AverageRanks,
};

/// Friedman test for k related samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Friedman {
    /// Tie-corrected chi-square statistic.
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Number of blocks (subjects), the common sample length.
    pub n_blocks: usize,
    /// Number of treatments (samples).
    pub k: usize,
}

/// Friedman rank test of `k >= 3` related samples.
///
/// `samples[j][i]` is the measurement of treatment `j` on block `i`. Values
/// are ranked within each block, ties sharing their average rank, and the
/// statistic is divided by the tie correction factor.
///
/// The sample count and lengths are checked before anything is computed.
#[expect(clippy::cast_precision_loss)]
pub fn friedman(samples: &[&[f64]]) -> Result<Friedman, StatsError> {
    let k = samples.len();
    if k < 3 {
        return Err(StatisticalPreconditionError::new(format!(
            "Friedman test needs at least 3 related samples, got {k}"
        ))
        .into());
    }
    let n = samples[0].len();
    if let Some(other) = samples.iter().find(|s| s.len() != n) {
        return Err(StatisticalPreconditionError::new(format!(
            "Friedman test needs samples of equal length, got {n} and {}",
            other.len()
        ))
        .into());
    }
    if n == 0 {
        return Err(DegenerateInputError::new("Friedman test needs at least one block").into());
    }

    let mut rank_sums = vec![0.0; k];
    let mut tie_term = 0.0;
    for block in 0..n {
        let values = samples.iter().map(|s| s[block]).collect::<Vec<_>>();
        let ranked = AverageRanks::new(&values);
        for (sum, rank) in rank_sums.iter_mut().zip(&ranked.ranks) {
            *sum += rank;
        }
        tie_term += ranked.tie_term();
    }

    let (nf, kf) = (n as f64, k as f64);
    let correction = 1.0 - tie_term / (kf * (kf * kf - 1.0) * nf);
    if correction <= 0.0 {
        return Err(
            DegenerateInputError::new("every block is fully tied, Friedman statistic undefined")
                .into(),
        );
    }
    let ssbn = rank_sums.iter().map(|r| r * r).sum::<f64>();
    let statistic = (12.0 / (nf * kf * (kf + 1.0)) * ssbn - 3.0 * nf * (kf + 1.0)) / correction;
    let dof = k - 1;

    Ok(Friedman {
        statistic,
        p_value: chi_square_sf(statistic, dof as f64),
        dof,
        n_blocks: n,
        k,
    })
}
