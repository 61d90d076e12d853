//! Pairwise distance matrices over the composite gene space.

use phylo_core::{ErrorInfo, PhyloError};
use serde::{Deserialize, Serialize};

use crate::equivalence::Equivalences;
use crate::metric::{pair_distance, Metric};
use crate::space::GeneSpace;

/// Dense symmetric distance matrix indexed by collection position.
///
/// Constructors establish symmetry and a zero diagonal; [`DistanceMatrix::validate`]
/// re-checks them and any violation is reported as an internal error, an
/// implementation bug, never repaired silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from full rows, validating the invariants.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PhyloError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for row in &rows {
            if row.len() != size {
                return Err(PhyloError::Configuration(
                    ErrorInfo::new("matrix-shape", "distance matrix rows must be square")
                        .with_context("size", size.to_string())
                        .with_context("row", row.len().to_string()),
                ));
            }
            values.extend(row.iter().copied());
        }
        let matrix = Self { size, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Number of structures indexed by the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between two collection positions.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Verifies symmetry, zero diagonal, and finite non-negative entries.
    pub fn validate(&self) -> Result<(), PhyloError> {
        for i in 0..self.size {
            if self.get(i, i) != 0.0 {
                return Err(PhyloError::Internal(
                    ErrorInfo::new("matrix-diagonal", "distance matrix diagonal is non-zero")
                        .with_context("index", i.to_string()),
                ));
            }
            for j in 0..self.size {
                let value = self.get(i, j);
                if !value.is_finite() || value < 0.0 {
                    return Err(PhyloError::Internal(
                        ErrorInfo::new("matrix-entry", "distance matrix entry is invalid")
                            .with_context("i", i.to_string())
                            .with_context("j", j.to_string())
                            .with_context("value", value.to_string()),
                    ));
                }
                if value != self.get(j, i) {
                    return Err(PhyloError::Internal(
                        ErrorInfo::new("matrix-asymmetry", "distance matrix is asymmetric")
                            .with_context("i", i.to_string())
                            .with_context("j", j.to_string()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Computes the pairwise distance matrix for a gene space.
///
/// When equivalences are supplied, `D[i][j]` is the minimum over the
/// identity and every applicable operator (global plus the sets of both
/// endpoints) applied to row `j` before comparison, so the
/// symmetry-aware distance never exceeds the plain one and the matrix
/// stays symmetric.
pub fn build_distances(
    space: &GeneSpace,
    metric: Metric,
    equivalences: Option<&Equivalences>,
) -> Result<DistanceMatrix, PhyloError> {
    if metric == Metric::Cosine {
        if let Some(column) = space.columns().iter().find(|column| column.cyclic.is_some()) {
            return Err(PhyloError::Configuration(
                ErrorInfo::new("cosine-cyclic", "cosine metric cannot honor cyclic columns")
                    .with_context("gene", column.gene.clone())
                    .with_hint("use a difference-based metric for angular genes"),
            ));
        }
    }
    if let Some(equivalences) = equivalences {
        equivalences.validate_width(space.width())?;
    }

    let size = space.len();
    let mut values = vec![0.0f64; size * size];
    for i in 0..size {
        for j in (i + 1)..size {
            let mut distance = pair_distance(metric, space.row(i), space.row(j), space.columns());
            if let Some(equivalences) = equivalences {
                for op in equivalences.ops_for_pair(i, j) {
                    let relabeled = op.apply(space.row(j));
                    let candidate =
                        pair_distance(metric, space.row(i), &relabeled, space.columns());
                    if candidate < distance {
                        distance = candidate;
                    }
                }
            }
            values[i * size + j] = distance;
            values[j * size + i] = distance;
        }
    }

    let matrix = DistanceMatrix { size, values };
    matrix.validate()?;
    Ok(matrix)
}
