//! Common-language effect size.
//!
//! The common-language effect size (CLES) of two samples is the probability
//! that a value drawn uniformly at random from `greater` exceeds a value drawn
//! uniformly at random from `lesser`.
//!
//! Ties contribute nothing to the numerator: only strictly-less pairs count.
//! Some textbook formulations credit ties with one half; this implementation
//! keeps the strict convention, so two identical samples score 0.0 rather
//! than 0.5.

use crate::DegenerateInputError;

/// Computes the common-language effect size of `greater` over `lesser`.
///
/// Both samples are sorted, then `greater` is swept in ascending order while a
/// cursor over `lesser` only ever moves forward, so the work after sorting is
/// linear in the combined sample size.
///
/// Boundary policy:
///
/// * both samples empty: [`DegenerateInputError`]
/// * `lesser` empty: `1.0`
/// * `greater` empty: `0.0`
///
/// # Examples
///
/// ```
/// use choicerank_stats::effect_size::common_language_effect_size;
///
/// let es = common_language_effect_size(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(es, 1.0);
///
/// let ties = common_language_effect_size(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(ties, 0.0);
///
/// assert!(common_language_effect_size(&[], &[]).is_err());
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn common_language_effect_size(
    lesser: &[f64],
    greater: &[f64],
) -> Result<f64, DegenerateInputError> {
    if lesser.is_empty() && greater.is_empty() {
        return Err(DegenerateInputError::new(
            "effect size needs at least one non-empty sample",
        ));
    }
    if lesser.is_empty() {
        return Ok(1.0);
    }
    if greater.is_empty() {
        return Ok(0.0);
    }

    let mut lesser = lesser.to_vec();
    let mut greater = greater.to_vec();
    lesser.sort_by(f64::total_cmp);
    greater.sort_by(f64::total_cmp);

    let mut numerator = 0_u64;
    let mut cursor = 0;
    for value in &greater {
        while cursor < lesser.len() && lesser[cursor] < *value {
            cursor += 1;
        }
        numerator += cursor as u64;
    }
    let denominator = lesser.len() as u64 * greater.len() as u64;

    Ok(numerator as f64 / denominator as f64)
}
