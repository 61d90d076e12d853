//! Classical multidimensional scaling of a distance matrix.
//!
//! A lossy visualization aid: the embedding approximates relative
//! ordering and neighbourhood structure, it does not preserve absolute
//! distances. The computation is fully deterministic; no random
//! initialization is involved.

use nalgebra::{DMatrix, SymmetricEigen};
use phylo_core::{ErrorInfo, PhyloError};
use phylo_gene::{build_distances, DistanceMatrix, GeneSpace, Metric};

/// Embeds the distance matrix into `n_dims` coordinates per structure.
///
/// Classical MDS: double-center the squared distances, take the top
/// eigenpairs of the resulting Gram matrix, and scale eigenvectors by the
/// square roots of their (clamped non-negative) eigenvalues. Each axis is
/// oriented so its largest-magnitude component is positive, fixing the
/// sign freedom of eigenvectors.
pub fn embed(matrix: &DistanceMatrix, n_dims: usize) -> Result<Vec<Vec<f64>>, PhyloError> {
    let n = matrix.size();
    if n < 2 {
        return Err(PhyloError::Configuration(
            ErrorInfo::new("embed-size", "embedding needs at least two structures")
                .with_context("structures", n.to_string()),
        ));
    }
    if n_dims < 1 || n_dims >= n {
        return Err(PhyloError::Configuration(
            ErrorInfo::new("embed-dims", "embedding dimension is out of range")
                .with_context("n_dims", n_dims.to_string())
                .with_context("structures", n.to_string()),
        ));
    }

    let squared = DMatrix::<f64>::from_fn(n, n, |i, j| {
        let d = matrix.get(i, j);
        d * d
    });
    let row_means: Vec<f64> = (0..n).map(|i| squared.row(i).sum() / n as f64).collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;
    let gram = DMatrix::<f64>::from_fn(n, n, |i, j| {
        -0.5 * (squared[(i, j)] - row_means[i] - row_means[j] + grand_mean)
    });

    let eigen = SymmetricEigen::new(gram);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut coordinates = vec![vec![0.0f64; n_dims]; n];
    for (axis, &which) in order.iter().take(n_dims).enumerate() {
        let scale = eigen.eigenvalues[which].max(0.0).sqrt();
        let column = eigen.eigenvectors.column(which);
        let sign = axis_sign(column.iter().copied());
        for (row, component) in column.iter().enumerate() {
            coordinates[row][axis] = sign * scale * component;
        }
    }
    Ok(coordinates)
}

/// Embeds a gene space directly through Euclidean distances.
pub fn embed_gene_space(space: &GeneSpace, n_dims: usize) -> Result<Vec<Vec<f64>>, PhyloError> {
    let matrix = build_distances(space, Metric::Euclidean, None)?;
    embed(&matrix, n_dims)
}

fn axis_sign(components: impl Iterator<Item = f64>) -> f64 {
    let mut extreme = 0.0f64;
    for component in components {
        if component.abs() > extreme.abs() {
            extreme = component;
        }
    }
    if extreme < 0.0 {
        -1.0
    } else {
        1.0
    }
}
