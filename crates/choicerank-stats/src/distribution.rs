//! Reference distributions used to turn test statistics into p-values.
//!
//! Thin wrappers over [`statrs`] that fix the parameterization each test
//! needs. Parameters `statrs` rejects (a non-positive or NaN `dof`) yield
//! `NaN` rather than an error, so a degenerate test reports an unusable
//! p-value instead of aborting the analysis.

use statrs::distribution::{ChiSquared, ContinuousCDF as _, Normal, StudentsT};

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Standard normal cumulative distribution function.
///
/// # Examples
///
/// ```
/// use choicerank_stats::distribution::normal_cdf;
///
/// assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
/// assert!((normal_cdf(1.959_963_984_540_054) - 0.975).abs() < 1e-9);
/// ```
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    standard_normal().map_or(f64::NAN, |n| n.cdf(x))
}

/// Standard normal survival function `1 - cdf(x)`, accurate in the upper tail.
#[must_use]
pub fn normal_sf(x: f64) -> f64 {
    standard_normal().map_or(f64::NAN, |n| n.sf(x))
}

/// Standard normal quantile function (inverse CDF).
///
/// Returns `-inf`/`+inf` at 0 and 1, `NaN` outside.
///
/// # Examples
///
/// ```
/// use choicerank_stats::distribution::normal_ppf;
///
/// assert!((normal_ppf(0.025) + 1.959_963_984_540_054).abs() < 1e-9);
/// assert_eq!(normal_ppf(0.5), 0.0);
/// ```
#[must_use]
pub fn normal_ppf(p: f64) -> f64 {
    // statrs panics outside [0, 1]
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }
    standard_normal().map_or(f64::NAN, |n| n.inverse_cdf(p))
}

/// Survival function of the chi-square distribution with `dof` degrees of freedom.
///
/// # Examples
///
/// ```
/// use choicerank_stats::distribution::chi_square_sf;
///
/// // 3.841 is the 95th percentile of chi-square(1)
/// assert!((chi_square_sf(3.841_458_820_694_124, 1.0) - 0.05).abs() < 1e-9);
/// ```
#[must_use]
pub fn chi_square_sf(x: f64, dof: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    ChiSquared::new(dof).map_or(f64::NAN, |d| d.sf(x))
}

/// Two-sided tail probability `P(|T| >= |t|)` of Student's t with `dof` degrees of freedom.
///
/// # Examples
///
/// ```
/// use choicerank_stats::distribution::student_t_two_sided;
///
/// // 2.228 is the two-sided 5% critical value for 10 degrees of freedom
/// assert!((student_t_two_sided(2.228_138_851_986_273_5, 10.0) - 0.05).abs() < 1e-9);
/// ```
#[must_use]
pub fn student_t_two_sided(t: f64, dof: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    StudentsT::new(0.0, 1.0, dof).map_or(f64::NAN, |d| (2.0 * d.sf(t.abs())).min(1.0))
}
