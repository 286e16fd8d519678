use serde::Serialize;

use crate::{StatisticalPreconditionError, StatsError, distribution::chi_square_sf};

/// Pearson chi-square test of independence on a contingency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareContingency {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    /// Expected counts under independence, same shape as the observed table.
    pub expected: Vec<Vec<f64>>,
    /// Whether the Yates continuity correction was applied (only for one degree of freedom).
    pub yates_corrected: bool,
}

/// Chi-square test of independence of the rows and columns of `observed`.
///
/// With one degree of freedom (a 2x2 table) each observed count is moved
/// toward its expected count by at most 0.5 before the statistic is computed.
///
/// # Examples
///
/// ```
/// use choicerank_stats::hypothesis::chi_square_contingency;
///
/// let table = vec![vec![20.0, 10.0, 10.0], vec![10.0, 20.0, 30.0]];
/// let test = chi_square_contingency(&table).unwrap();
/// assert_eq!(test.dof, 2);
/// assert!(test.p_value < 0.01);
/// ```
pub fn chi_square_contingency(observed: &[Vec<f64>]) -> Result<ChiSquareContingency, StatsError> {
    let rows = observed.len();
    let cols = observed.first().map_or(0, Vec::len);
    if rows < 2 || cols < 2 {
        return Err(StatisticalPreconditionError::new(format!(
            "contingency table needs at least 2 rows and 2 columns, got {rows}x{cols}"
        ))
        .into());
    }
    if observed.iter().any(|row| row.len() != cols) {
        return Err(
            StatisticalPreconditionError::new("contingency table rows differ in length").into(),
        );
    }

    let row_totals = observed
        .iter()
        .map(|row| row.iter().sum::<f64>())
        .collect::<Vec<_>>();
    let col_totals = (0..cols)
        .map(|j| observed.iter().map(|row| row[j]).sum::<f64>())
        .collect::<Vec<_>>();
    if row_totals.iter().chain(&col_totals).any(|t| *t <= 0.0) {
        return Err(StatisticalPreconditionError::new(
            "contingency table has an empty row or column",
        )
        .into());
    }
    let total = row_totals.iter().sum::<f64>();

    let expected = row_totals
        .iter()
        .map(|r| col_totals.iter().map(|c| r * c / total).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let dof = (rows - 1) * (cols - 1);
    let yates_corrected = dof == 1;

    let mut statistic = 0.0;
    for (obs_row, exp_row) in observed.iter().zip(&expected) {
        for (&obs, &exp) in obs_row.iter().zip(exp_row) {
            let mut diff = obs - exp;
            if yates_corrected {
                diff = diff.signum() * (diff.abs() - f64::min(0.5, diff.abs()));
            }
            statistic += diff * diff / exp;
        }
    }

    #[expect(clippy::cast_precision_loss)]
    let p_value = chi_square_sf(statistic, dof as f64);

    Ok(ChiSquareContingency {
        statistic,
        p_value,
        dof,
        expected,
        yates_corrected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_uses_yates_correction() {
        let table = vec![vec![10.0, 20.0], vec![30.0, 40.0]];
        let test = chi_square_contingency(&table).unwrap();
        assert!(test.yates_corrected);
        assert_eq!(test.dof, 1);
        assert_eq!(test.expected, vec![vec![12.0, 18.0], vec![28.0, 42.0]]);
        // every |obs - exp| is 2, shrunk to 1.5
        let expected = 2.25 * (1.0 / 12.0 + 1.0 / 18.0 + 1.0 / 28.0 + 1.0 / 42.0);
        assert!((test.statistic - expected).abs() < 1e-12);
        assert!((test.p_value - chi_square_sf(expected, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_small_differences_shrink_to_zero() {
        // |obs - exp| = 0.25 < 0.5
        let table = vec![vec![5.0, 5.0], vec![4.5, 5.5]];
        let test = chi_square_contingency(&table).unwrap();
        assert!(test.statistic.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_larger_table_is_uncorrected() {
        let table = vec![vec![20.0, 10.0, 10.0], vec![10.0, 20.0, 30.0]];
        let test = chi_square_contingency(&table).unwrap();
        assert!(!test.yates_corrected);
        // expected: row totals 40, 60; column totals 30, 30, 40; total 100
        let expected = [[12.0, 12.0, 16.0], [18.0, 18.0, 24.0]];
        let mut statistic = 0.0;
        for (obs_row, exp_row) in table.iter().zip(&expected) {
            for (o, e) in obs_row.iter().zip(exp_row) {
                statistic += (o - e) * (o - e) / e;
            }
        }
        assert!((test.statistic - statistic).abs() < 1e-12);
        // chi-square with 2 dof: sf(x) = exp(-x / 2)
        assert!((test.p_value - (-statistic / 2.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_tables() {
        assert!(matches!(
            chi_square_contingency(&[vec![1.0, 2.0]]),
            Err(StatsError::Precondition(_))
        ));
        assert!(matches!(
            chi_square_contingency(&[vec![1.0, 0.0], vec![2.0, 0.0]]),
            Err(StatsError::Precondition(_))
        ));
        assert!(matches!(
            chi_square_contingency(&[vec![1.0, 2.0], vec![2.0]]),
            Err(StatsError::Precondition(_))
        ));
    }
}
