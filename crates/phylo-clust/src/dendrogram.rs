//! Agglomerative dendrogram construction over a distance matrix.

use phylo_core::{ErrorInfo, PhyloError};
use phylo_gene::DistanceMatrix;
use serde::{Deserialize, Serialize};

use crate::linkage::{update_distance, Linkage};

/// One binary merge in the dendrogram.
///
/// Identifiers follow the usual convention: leaves are `0..n` in
/// collection order, and the merge recorded at step `m` creates cluster
/// `n + m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Lower identifier of the two merged clusters.
    pub left: usize,
    /// Higher identifier of the two merged clusters.
    pub right: usize,
    /// Linkage distance at which the merge happened.
    pub distance: f64,
    /// Number of leaves in the merged cluster.
    pub size: usize,
}

/// A full merge tree over collection indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    n_leaves: usize,
    merges: Vec<Merge>,
}

#[derive(Debug, Clone)]
struct ActiveCluster {
    id: usize,
    size: usize,
    /// Lowest original collection index contained in the cluster; drives
    /// deterministic tie-breaking.
    min_member: usize,
}

impl Dendrogram {
    /// Number of leaves (structures) under the tree.
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// The merge list in merge order.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }
}

/// Builds a dendrogram by agglomerative hierarchical clustering.
///
/// When two candidate merges sit at exactly the same distance, the pair
/// whose lowest original collection indices compare lexicographically
/// lower merges first, so repeated runs reproduce the same tree.
pub fn agglomerate(matrix: &DistanceMatrix, linkage: Linkage) -> Result<Dendrogram, PhyloError> {
    let n = matrix.size();
    if n < 2 {
        return Err(PhyloError::Configuration(
            ErrorInfo::new("too-few-structures", "clustering needs at least two structures")
                .with_context("structures", n.to_string()),
        ));
    }

    let mut active: Vec<ActiveCluster> = (0..n)
        .map(|index| ActiveCluster {
            id: index,
            size: 1,
            min_member: index,
        })
        .collect();
    // Working copy of the pairwise distances, indexed by active slot.
    let mut dist: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| matrix.get(i, j)).collect())
        .collect();

    let mut merges = Vec::with_capacity(n - 1);
    for step in 0..n - 1 {
        let (slot_a, slot_b) = best_pair(&active, &dist)?;
        let d_ab = dist[slot_a][slot_b];
        let merged = ActiveCluster {
            id: n + step,
            size: active[slot_a].size + active[slot_b].size,
            min_member: active[slot_a].min_member.min(active[slot_b].min_member),
        };
        merges.push(Merge {
            left: active[slot_a].id.min(active[slot_b].id),
            right: active[slot_a].id.max(active[slot_b].id),
            distance: d_ab,
            size: merged.size,
        });

        // Fold cluster b into slot a, then drop slot b.
        for slot_k in 0..active.len() {
            if slot_k == slot_a || slot_k == slot_b {
                continue;
            }
            let updated = update_distance(
                linkage,
                dist[slot_a][slot_k],
                dist[slot_b][slot_k],
                d_ab,
                active[slot_a].size,
                active[slot_b].size,
                active[slot_k].size,
            );
            dist[slot_a][slot_k] = updated;
            dist[slot_k][slot_a] = updated;
        }
        dist[slot_a][slot_a] = 0.0;
        active[slot_a] = merged;

        active.swap_remove(slot_b);
        let last = dist.len() - 1;
        dist.swap(slot_b, last);
        dist.pop();
        for row in &mut dist {
            row.swap(slot_b, last);
            row.pop();
        }
    }

    Ok(Dendrogram {
        n_leaves: n,
        merges,
    })
}

fn best_pair(active: &[ActiveCluster], dist: &[Vec<f64>]) -> Result<(usize, usize), PhyloError> {
    let mut best: Option<(usize, usize, f64, (usize, usize))> = None;
    for slot_a in 0..active.len() {
        for slot_b in (slot_a + 1)..active.len() {
            let distance = dist[slot_a][slot_b];
            let low = active[slot_a].min_member.min(active[slot_b].min_member);
            let high = active[slot_a].min_member.max(active[slot_b].min_member);
            let key = (low, high);
            let better = match &best {
                None => true,
                Some((_, _, current, current_key)) => {
                    distance < *current || (distance == *current && key < *current_key)
                }
            };
            if better {
                best = Some((slot_a, slot_b, distance, key));
            }
        }
    }
    match best {
        Some((slot_a, slot_b, _, _)) => Ok((slot_a, slot_b)),
        None => Err(PhyloError::Internal(ErrorInfo::new(
            "no-candidate-merge",
            "agglomeration ran out of candidate pairs",
        ))),
    }
}
