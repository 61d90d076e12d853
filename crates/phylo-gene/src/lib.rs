#![deny(missing_docs)]
#![doc = "Gene abstraction and distance engine: wraps property \
computations with normalization and weighting, assembles the composite \
feature matrix, and turns it into a pairwise distance matrix with \
wrap-aware cyclic columns and symmetry-equivalence minimization."]

/// Pairwise distance matrices over the composite space.
pub mod distance;
/// Symmetry equivalence operators.
pub mod equivalence;
/// Genes and normalization strategies.
pub mod gene;
/// Distance metrics over composite vectors.
pub mod metric;
/// Composite feature matrix assembly.
pub mod space;

pub use distance::{build_distances, DistanceMatrix};
pub use equivalence::{EquivalenceOp, Equivalences};
pub use gene::{genes_hash, Gene, Normalization};
pub use metric::Metric;
pub use space::{ColumnInfo, GeneSpace};
