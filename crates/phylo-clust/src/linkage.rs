//! Linkage rules and the Lance–Williams distance update.

use serde::{Deserialize, Serialize};

/// Linkage rule used when two clusters merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// Minimum distance between any two members.
    Single,
    /// Maximum distance between any two members.
    Complete,
    /// Size-weighted mean of the member distances.
    Average,
    /// Ward's minimum-variance criterion.
    Ward,
}

/// Distance from the merge of clusters `a` and `b` to another cluster `k`,
/// given the pre-merge distances and cluster sizes.
pub(crate) fn update_distance(
    linkage: Linkage,
    d_ak: f64,
    d_bk: f64,
    d_ab: f64,
    size_a: usize,
    size_b: usize,
    size_k: usize,
) -> f64 {
    match linkage {
        Linkage::Single => d_ak.min(d_bk),
        Linkage::Complete => d_ak.max(d_bk),
        Linkage::Average => {
            let (na, nb) = (size_a as f64, size_b as f64);
            (na * d_ak + nb * d_bk) / (na + nb)
        }
        Linkage::Ward => {
            let (na, nb, nk) = (size_a as f64, size_b as f64, size_k as f64);
            let total = na + nb + nk;
            (((na + nk) * d_ak * d_ak + (nb + nk) * d_bk * d_bk - nk * d_ab * d_ab) / total)
                .max(0.0)
                .sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_complete_bracket_average() {
        let single = update_distance(Linkage::Single, 1.0, 3.0, 0.5, 1, 1, 1);
        let complete = update_distance(Linkage::Complete, 1.0, 3.0, 0.5, 1, 1, 1);
        let average = update_distance(Linkage::Average, 1.0, 3.0, 0.5, 1, 1, 1);
        assert_eq!(single, 1.0);
        assert_eq!(complete, 3.0);
        assert_eq!(average, 2.0);
        assert!(single <= average && average <= complete);
    }

    #[test]
    fn average_weights_by_cluster_size() {
        let updated = update_distance(Linkage::Average, 1.0, 4.0, 0.5, 3, 1, 1);
        assert!((updated - (3.0 * 1.0 + 1.0 * 4.0) / 4.0).abs() < 1e-12);
    }
}
