use serde::Serialize;

use crate::{StatisticalPreconditionError, StatsError, distribution::student_t_two_sided};

/// Ordinary least squares fit `y = intercept + slope * x` with a t test on the slope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub slope_se: f64,
    pub intercept_se: f64,
    /// t statistic of the slope.
    pub t: f64,
    /// Two-sided p-value of the slope (Student t with `n - 2` degrees of freedom).
    pub p_value: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Fits a straight line of `y` against `x` by ordinary least squares.
///
/// Intended as a drift check: a significant slope means the outcome changes
/// with the ordinal index.
///
/// # Examples
///
/// ```
/// use choicerank_stats::hypothesis::linear_trend;
///
/// let trial = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let count = [2.0, 4.0, 5.0, 4.0, 5.0];
/// let fit = linear_trend(&trial, &count).unwrap();
/// assert!((fit.slope - 0.6).abs() < 1e-12);
/// assert!((fit.intercept - 2.2).abs() < 1e-12);
/// assert!(fit.p_value > 0.05);
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn linear_trend(x: &[f64], y: &[f64]) -> Result<LinearTrend, StatsError> {
    if x.len() != y.len() {
        return Err(StatisticalPreconditionError::new(format!(
            "regression needs paired observations, got {} and {} values",
            x.len(),
            y.len()
        ))
        .into());
    }
    let n = x.len();
    if n < 3 {
        return Err(StatisticalPreconditionError::new(format!(
            "regression needs at least 3 points, got {n}"
        ))
        .into());
    }

    let nf = n as f64;
    let x_mean = x.iter().sum::<f64>() / nf;
    let y_mean = y.iter().sum::<f64>() / nf;
    let sxx = x.iter().map(|xi| (xi - x_mean).powi(2)).sum::<f64>();
    if sxx <= 0.0 {
        return Err(
            StatisticalPreconditionError::new("regression index has zero variance").into(),
        );
    }
    let sxy = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>();
    let sst = y.iter().map(|yi| (yi - y_mean).powi(2)).sum::<f64>();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let sse = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - intercept - slope * xi).powi(2))
        .sum::<f64>();

    let dof = nf - 2.0;
    let residual_variance = sse / dof;
    let slope_se = (residual_variance / sxx).sqrt();
    let intercept_se = (residual_variance * (1.0 / nf + x_mean * x_mean / sxx)).sqrt();

    let (t, p_value) = if slope_se > 0.0 {
        let t = slope / slope_se;
        (t, student_t_two_sided(t, dof))
    } else if slope == 0.0 {
        (0.0, 1.0)
    } else {
        // perfect fit with a non-zero slope
        (slope.signum() * f64::INFINITY, 0.0)
    };
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

    Ok(LinearTrend {
        slope,
        intercept,
        slope_se,
        intercept_se,
        t,
        p_value,
        r_squared,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_fit() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = linear_trend(&x, &y).unwrap();
        // SSE = 2.4, SST = 6, Sxx = 10, s^2 = 0.8
        assert!((fit.r_squared - 0.6).abs() < 1e-12);
        assert!((fit.slope_se - 0.08_f64.sqrt()).abs() < 1e-12);
        assert!((fit.intercept_se - 0.88_f64.sqrt()).abs() < 1e-12);
        assert!((fit.t - 0.6 / 0.08_f64.sqrt()).abs() < 1e-9);
        assert!((fit.p_value - student_t_two_sided(fit.t, 3.0)).abs() < 1e-12);
        assert_eq!(fit.n, 5);
    }

    #[test]
    fn test_flat_outcome() {
        let fit = linear_trend(&[1.0, 2.0, 3.0, 4.0], &[3.0, 3.0, 3.0, 3.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.t, 0.0);
        assert_eq!(fit.p_value, 1.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_perfect_line() {
        let fit = linear_trend(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-6);
    }

    #[test]
    fn test_preconditions() {
        assert!(matches!(
            linear_trend(&[1.0, 2.0], &[1.0, 2.0]),
            Err(StatsError::Precondition(_))
        ));
        assert!(matches!(
            linear_trend(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::Precondition(_))
        ));
        assert!(matches!(
            linear_trend(&[1.0, 2.0, 3.0], &[1.0, 2.0]),
            Err(StatsError::Precondition(_))
        ));
    }
}
