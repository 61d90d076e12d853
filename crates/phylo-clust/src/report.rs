//! End-to-end phylogeny analysis and its serializable report.

use phylo_core::{Collection, PhyloError, RunProvenance, SchemaVersion};
use phylo_gene::{
    build_distances, genes_hash, ColumnInfo, DistanceMatrix, Equivalences, Gene, GeneSpace,
    Metric,
};
use phylo_props::{PropertyEngine, PropertyRegistry};
use serde::{Deserialize, Serialize};

use crate::cut::ClusterAssignment;
use crate::dendrogram::{agglomerate, Merge};
use crate::hash::hash_report;
use crate::linkage::Linkage;
use crate::mds::embed;

/// Options driving one phylogeny run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhylogenOpts {
    /// Metric over the composite gene vectors.
    pub metric: Metric,
    /// Linkage rule for the dendrogram.
    pub linkage: Linkage,
    /// Cut by target cluster count; exclusive with the threshold.
    pub n_clusters: Option<usize>,
    /// Cut by merge-distance threshold; exclusive with the count.
    pub distance_threshold: Option<f64>,
    /// Dimensions for the optional MDS embedding.
    pub embed_dims: Option<usize>,
    /// Master seed recorded in provenance.
    pub seed: u64,
}

impl Default for PhylogenOpts {
    fn default() -> Self {
        Self {
            metric: Metric::Euclidean,
            linkage: Linkage::Average,
            n_clusters: Some(2),
            distance_threshold: None,
            embed_dims: None,
            seed: 0,
        }
    }
}

/// Complete output of a phylogeny run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhylogenReport {
    /// Schema version of the report payload.
    pub schema_version: SchemaVersion,
    /// Provenance tying the report to its inputs.
    pub provenance: RunProvenance,
    /// Composite gene matrix, one row per structure.
    pub matrix: Vec<Vec<f64>>,
    /// Column provenance for the composite matrix.
    pub columns: Vec<ColumnInfo>,
    /// Pairwise distance matrix.
    pub distances: DistanceMatrix,
    /// Dendrogram merge list in merge order.
    pub merges: Vec<Merge>,
    /// Flat cluster assignment for the requested cut.
    pub assignment: ClusterAssignment,
    /// Optional low-dimensional coordinates per structure.
    pub coordinates: Option<Vec<Vec<f64>>>,
    /// Canonical content hash of the report.
    pub report_hash: String,
}

/// Runs the full pipeline: genes → distances → dendrogram → cut →
/// optional embedding.
///
/// The collection and gene list are never mutated; everything derived
/// from them is recomputed from scratch on every call.
pub fn phylogen(
    engine: &mut PropertyEngine,
    registry: &PropertyRegistry,
    collection: &Collection,
    genes: &[Gene],
    equivalences: Option<&Equivalences>,
    opts: &PhylogenOpts,
) -> Result<PhylogenReport, PhyloError> {
    let space = GeneSpace::build(engine, registry, collection, genes)?;
    let distances = build_distances(&space, opts.metric, equivalences)?;
    let dendrogram = agglomerate(&distances, opts.linkage)?;
    let assignment = dendrogram.cut(opts.n_clusters, opts.distance_threshold)?;
    let coordinates = match opts.embed_dims {
        Some(dims) => Some(embed(&distances, dims)?),
        None => None,
    };

    let provenance = RunProvenance::stamped(
        collection.content_hash()?,
        genes_hash(genes)?,
        opts.seed,
    );

    let mut report = PhylogenReport {
        schema_version: SchemaVersion::default(),
        provenance,
        matrix: space.rows().to_vec(),
        columns: space.columns().to_vec(),
        distances,
        merges: dendrogram.merges().to_vec(),
        assignment,
        coordinates,
        report_hash: String::new(),
    };
    report.report_hash = hash_report(&report)?;
    Ok(report)
}
