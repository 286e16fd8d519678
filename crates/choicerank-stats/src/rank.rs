//! Tie-aware ranking shared by the rank-based tests.

/// Ranks assigned to a sample, with tied values sharing their average rank.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageRanks {
    /// 1-based rank of each input value, in input order.
    pub ranks: Vec<f64>,
    /// Sizes of every group of tied values (groups of one are omitted).
    pub tie_groups: Vec<usize>,
}

impl AverageRanks {
    /// Ranks `values` in ascending order, averaging the ranks of ties.
    ///
    /// # Examples
    ///
    /// ```
    /// use choicerank_stats::rank::AverageRanks;
    ///
    /// let ranked = AverageRanks::new(&[10.0, 20.0, 10.0, 30.0]);
    /// assert_eq!(ranked.ranks, vec![1.5, 3.0, 1.5, 4.0]);
    /// assert_eq!(ranked.tie_groups, vec![2]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        let mut order = (0..values.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

        let mut ranks = vec![0.0; values.len()];
        let mut tie_groups = vec![];
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && values[order[end]] == values[order[start]] {
                end += 1;
            }
            // ranks start..end (0-based) map to (start + 1)..=end
            let average = (start + 1 + end) as f64 / 2.0;
            for &idx in &order[start..end] {
                ranks[idx] = average;
            }
            if end - start > 1 {
                tie_groups.push(end - start);
            }
            start = end;
        }

        Self { ranks, tie_groups }
    }

    /// Sum of `t^3 - t` over all tie groups, the usual tie-correction term.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn tie_term(&self) -> f64 {
        self.tie_groups
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }

    #[must_use]
    pub fn has_ties(&self) -> bool {
        !self.tie_groups.is_empty()
    }
}
