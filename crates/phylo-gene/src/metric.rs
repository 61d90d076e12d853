//! Distance metrics over composite gene vectors.

use serde::{Deserialize, Serialize};

use crate::space::ColumnInfo;

/// Metric applied between two composite rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Square root of the summed squared per-column differences.
    Euclidean,
    /// Sum of absolute per-column differences.
    Manhattan,
    /// One minus the cosine similarity of the two rows.
    Cosine,
}

/// Distance between two rows under the metric and column flags.
///
/// Columns carrying a cyclic period contribute the wrap-aware difference
/// `min(|a-b|, period-|a-b|)` under the difference-based metrics; callers
/// must reject cosine over cyclic columns before reaching this point.
pub(crate) fn pair_distance(metric: Metric, a: &[f64], b: &[f64], columns: &[ColumnInfo]) -> f64 {
    match metric {
        Metric::Euclidean => {
            let mut sum = 0.0;
            for (slot, info) in columns.iter().enumerate() {
                let diff = column_difference(a[slot], b[slot], info.cyclic);
                sum += diff * diff;
            }
            sum.sqrt()
        }
        Metric::Manhattan => columns
            .iter()
            .enumerate()
            .map(|(slot, info)| column_difference(a[slot], b[slot], info.cyclic))
            .sum(),
        Metric::Cosine => cosine_distance(a, b),
    }
}

fn column_difference(a: f64, b: f64, cyclic: Option<f64>) -> f64 {
    let linear = (a - b).abs();
    match cyclic {
        Some(period) => {
            let wrapped = linear % period;
            wrapped.min(period - wrapped)
        }
        None => linear,
    }
}

fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 && norm_b == 0.0 {
        return 0.0;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    1.0 - similarity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_columns(width: usize) -> Vec<ColumnInfo> {
        (0..width)
            .map(|component| ColumnInfo {
                gene_index: 0,
                gene: "test".to_string(),
                component,
                cyclic: None,
            })
            .collect()
    }

    #[test]
    fn cyclic_difference_wraps_around_the_period() {
        // 350 degrees and 10 degrees are 20 degrees apart, not 340.
        assert!((column_difference(350.0, 10.0, Some(360.0)) - 20.0).abs() < 1e-12);
        assert!((column_difference(350.0, 10.0, None) - 340.0).abs() < 1e-12);
    }

    #[test]
    fn euclidean_matches_hand_computation() {
        let columns = plain_columns(2);
        let distance = pair_distance(Metric::Euclidean, &[0.0, 0.0], &[3.0, 4.0], &columns);
        assert!((distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-12);
    }
}
