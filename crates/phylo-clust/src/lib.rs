#![deny(missing_docs)]
#![doc = "Hierarchical clustering and mapping over structural distance \
matrices: agglomerative dendrogram construction with deterministic \
tie-breaking, flat cluster extraction, classical MDS embedding, and the \
end-to-end phylogeny report."]

/// Flat cluster extraction from a dendrogram.
pub mod cut;
/// Agglomerative dendrogram construction.
pub mod dendrogram;
/// Canonical hashing of phylogeny reports.
pub mod hash;
/// Linkage rules and the Lance–Williams update.
pub mod linkage;
/// Classical multidimensional scaling.
pub mod mds;
/// End-to-end analysis and its serializable report.
pub mod report;

pub use cut::ClusterAssignment;
pub use dendrogram::{agglomerate, Dendrogram, Merge};
pub use hash::hash_report;
pub use linkage::Linkage;
pub use mds::{embed, embed_gene_space};
pub use report::{phylogen, PhylogenOpts, PhylogenReport};
