//! Flat cluster extraction from a dendrogram.

use phylo_core::{ErrorInfo, PhyloError};
use serde::{Deserialize, Serialize};

use crate::dendrogram::Dendrogram;

/// A flat partition of collection indices into clusters.
///
/// Cluster ids are assigned in order of first appearance when scanning
/// collection index order, so the structure at index 0 always belongs to
/// cluster 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// Cluster id per structure, in collection order.
    pub labels: Vec<usize>,
    /// Number of distinct clusters in the partition.
    pub n_clusters: usize,
}

impl Dendrogram {
    /// Extracts a flat partition at a chosen cut.
    ///
    /// Exactly one of `n_clusters` and `distance_threshold` must be
    /// given. `n_clusters` replays merges until that many clusters
    /// remain; `distance_threshold` replays merges whose distance does
    /// not exceed the threshold, so a threshold of zero separates
    /// everything except exact duplicates. The partition is a pure
    /// function of the tree and the cut parameter.
    pub fn cut(
        &self,
        n_clusters: Option<usize>,
        distance_threshold: Option<f64>,
    ) -> Result<ClusterAssignment, PhyloError> {
        let n = self.n_leaves();
        let applied = match (n_clusters, distance_threshold) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(PhyloError::Configuration(ErrorInfo::new(
                    "cut-parameters",
                    "exactly one of n_clusters and distance_threshold must be given",
                )));
            }
            (Some(k), None) => {
                if k < 1 || k > n {
                    return Err(PhyloError::Configuration(
                        ErrorInfo::new("cut-clusters", "requested cluster count is out of range")
                            .with_context("n_clusters", k.to_string())
                            .with_context("structures", n.to_string()),
                    ));
                }
                n - k
            }
            (None, Some(threshold)) => {
                if !threshold.is_finite() {
                    return Err(PhyloError::Configuration(ErrorInfo::new(
                        "cut-threshold",
                        "distance threshold must be finite",
                    )));
                }
                self.merges()
                    .iter()
                    .take_while(|merge| merge.distance <= threshold)
                    .count()
            }
        };

        // Replay the first `applied` merges over leaf membership lists.
        let capacity = n + applied;
        let mut members: Vec<Option<Vec<usize>>> = (0..capacity)
            .map(|id| if id < n { Some(vec![id]) } else { None })
            .collect();
        for (step, merge) in self.merges().iter().take(applied).enumerate() {
            let mut merged = members[merge.left].take().ok_or_else(|| {
                PhyloError::Internal(ErrorInfo::new(
                    "merge-replay",
                    "merge references an already-consumed cluster",
                ))
            })?;
            let mut right = members[merge.right].take().ok_or_else(|| {
                PhyloError::Internal(ErrorInfo::new(
                    "merge-replay",
                    "merge references an already-consumed cluster",
                ))
            })?;
            merged.append(&mut right);
            members[n + step] = Some(merged);
        }

        let mut owner = vec![usize::MAX; n];
        for (id, cluster) in members.iter().enumerate() {
            if let Some(cluster) = cluster {
                for &leaf in cluster {
                    owner[leaf] = id;
                }
            }
        }

        // Relabel in order of first appearance over collection indices.
        let mut labels = vec![0usize; n];
        let mut relabel: Vec<(usize, usize)> = Vec::new();
        for (leaf, &id) in owner.iter().enumerate() {
            let label = match relabel.iter().find(|(from, _)| *from == id) {
                Some(&(_, label)) => label,
                None => {
                    let label = relabel.len();
                    relabel.push((id, label));
                    label
                }
            };
            labels[leaf] = label;
        }

        Ok(ClusterAssignment {
            labels,
            n_clusters: relabel.len(),
        })
    }
}
