//! Symmetry equivalence operators over composite vectors.
//!
//! Two structures can be "the same" under a relabeling of their sites
//! that is not reflected in raw descriptor order. Symmetry-detection
//! collaborators supply that knowledge as a set of column permutations of
//! the composite vector; the distance engine takes the minimum over the
//! identity plus every declared operator.

use phylo_core::{ErrorInfo, PhyloError};
use serde::{Deserialize, Serialize};

/// A single equivalence operator: a permutation of composite columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceOp {
    permutation: Vec<usize>,
}

impl EquivalenceOp {
    /// Creates an operator from a permutation vector.
    ///
    /// `permutation[k]` names the source column feeding output slot `k`;
    /// the vector must be a true permutation of `0..len`.
    pub fn new(permutation: Vec<usize>) -> Result<Self, PhyloError> {
        let mut seen = vec![false; permutation.len()];
        for &source in &permutation {
            if source >= permutation.len() || seen[source] {
                return Err(PhyloError::Configuration(
                    ErrorInfo::new("equivalence-permutation", "operator is not a permutation")
                        .with_context("width", permutation.len().to_string())
                        .with_context("entry", source.to_string()),
                ));
            }
            seen[source] = true;
        }
        Ok(Self { permutation })
    }

    /// The identity operator of the given width.
    pub fn identity(width: usize) -> Self {
        Self {
            permutation: (0..width).collect(),
        }
    }

    /// Number of columns the operator acts on.
    pub fn width(&self) -> usize {
        self.permutation.len()
    }

    /// Whether the operator maps every column to itself.
    pub fn is_identity(&self) -> bool {
        self.permutation.iter().enumerate().all(|(slot, &source)| slot == source)
    }

    /// Applies the operator to one composite row.
    pub fn apply(&self, row: &[f64]) -> Vec<f64> {
        self.permutation.iter().map(|&source| row[source]).collect()
    }
}

/// The equivalence sets declared for a collection.
///
/// Operators can be declared globally (every structure admits them) or
/// for individual structures. For a pair `(i, j)` the distance engine
/// minimizes over the identity, the global set, and the sets of both
/// endpoints, which keeps the resulting matrix symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Equivalences {
    global: Vec<EquivalenceOp>,
    per_structure: std::collections::BTreeMap<usize, Vec<EquivalenceOp>>,
}

impl Equivalences {
    /// Declares a set of operators valid for every structure.
    pub fn global(ops: Vec<EquivalenceOp>) -> Self {
        Self {
            global: ops,
            per_structure: std::collections::BTreeMap::new(),
        }
    }

    /// Declares additional operators for one structure index.
    pub fn with_structure_ops(mut self, index: usize, ops: Vec<EquivalenceOp>) -> Self {
        self.per_structure.insert(index, ops);
        self
    }

    /// Operators to consider for a structure pair, identity excluded.
    pub fn ops_for_pair(&self, i: usize, j: usize) -> impl Iterator<Item = &EquivalenceOp> {
        self.global
            .iter()
            .chain(self.per_structure.get(&i).into_iter().flatten())
            .chain(self.per_structure.get(&j).into_iter().flatten())
    }

    /// Validates that every declared operator acts on `width` columns.
    pub fn validate_width(&self, width: usize) -> Result<(), PhyloError> {
        let all = self
            .global
            .iter()
            .chain(self.per_structure.values().flatten());
        for op in all {
            if op.width() != width {
                return Err(PhyloError::Configuration(
                    ErrorInfo::new("equivalence-width", "operator width differs from gene space")
                        .with_context("operator", op.width().to_string())
                        .with_context("space", width.to_string()),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_columns_as_declared() {
        let op = EquivalenceOp::new(vec![1, 0, 2]).unwrap();
        assert_eq!(op.apply(&[10.0, 20.0, 30.0]), vec![20.0, 10.0, 30.0]);
        assert!(!op.is_identity());
    }

    #[test]
    fn rejects_repeated_entries() {
        assert!(EquivalenceOp::new(vec![0, 0, 1]).is_err());
        assert!(EquivalenceOp::new(vec![0, 3]).is_err());
    }

    #[test]
    fn identity_is_detected() {
        assert!(EquivalenceOp::identity(4).is_identity());
    }
}
