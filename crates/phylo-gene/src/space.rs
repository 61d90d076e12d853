//! Composite feature matrix assembly from an ordered gene list.

use phylo_core::{Collection, ErrorInfo, PhyloError};
use phylo_props::{PropertyEngine, PropertyRegistry};
use serde::{Deserialize, Serialize};

use crate::gene::{normalize_column, Gene};

/// Provenance of a single composite-matrix column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Position of the owning gene in the registration order.
    pub gene_index: usize,
    /// Registry name of the property behind the column.
    pub gene: String,
    /// Component index within the gene's output vector.
    pub component: usize,
    /// Cyclic period inherited from the gene, if any.
    pub cyclic: Option<f64>,
}

/// The composite feature matrix: one row per structure, columns in gene
/// registration order.
///
/// Column layout is a deterministic function of the gene list; rebuilding
/// from an unchanged collection and gene list reproduces the matrix
/// bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSpace {
    rows: Vec<Vec<f64>>,
    columns: Vec<ColumnInfo>,
}

impl GeneSpace {
    /// Builds the composite matrix for a collection and gene list.
    ///
    /// Each gene is evaluated through the property engine, flattened to
    /// its declared arity, normalized with statistics computed once over
    /// the whole collection, then scaled by the gene weight. A structure
    /// for which the property is missing aborts the build: gene columns
    /// must be total.
    pub fn build(
        engine: &mut PropertyEngine,
        registry: &PropertyRegistry,
        collection: &Collection,
        genes: &[Gene],
    ) -> Result<GeneSpace, PhyloError> {
        if genes.is_empty() {
            return Err(PhyloError::Configuration(ErrorInfo::new(
                "no-genes",
                "gene space needs at least one gene",
            )));
        }
        let count = collection.len();
        let mut rows = vec![Vec::new(); count];
        let mut columns = Vec::new();

        for (gene_index, gene) in genes.iter().enumerate() {
            let spec = registry.get(&gene.property)?;
            let arity = spec.shape().arity().filter(|arity| *arity > 0).ok_or_else(|| {
                PhyloError::Configuration(
                    ErrorInfo::new("gene-arity", "gene wraps a property without numeric output")
                        .with_context("property", gene.property.clone()),
                )
            })?;
            if let Some(declared) = gene.arity {
                if declared != arity {
                    return Err(PhyloError::Configuration(
                        ErrorInfo::new("gene-arity", "gene arity differs from the declared shape")
                            .with_context("property", gene.property.clone())
                            .with_context("declared", declared.to_string())
                            .with_context("shape", arity.to_string()),
                    ));
                }
            }

            let slots = engine
                .apply(spec.as_ref(), collection, &gene.params)?
                .per_structure()?;
            let mut vectors = Vec::with_capacity(count);
            for (index, slot) in slots.into_iter().enumerate() {
                let value = slot.ok_or_else(|| {
                    PhyloError::Property(
                        ErrorInfo::new("gene-coverage", "gene value missing for a structure")
                            .with_context("property", gene.property.clone())
                            .with_context("structure", index.to_string())
                            .with_hint("genes require a value for every structure"),
                    )
                })?;
                // Numeric by the arity check above; length by the engine's
                // shape validation.
                vectors.push(value.flatten().unwrap_or_default());
            }

            for component in 0..arity {
                let mut column: Vec<f64> =
                    vectors.iter().map(|vector| vector[component]).collect();
                normalize_column(&mut column, gene.normalization);
                for (row, value) in rows.iter_mut().zip(column) {
                    row.push(gene.weight * value);
                }
                columns.push(ColumnInfo {
                    gene_index,
                    gene: gene.property.clone(),
                    component,
                    cyclic: gene.cyclic,
                });
            }
        }

        Ok(GeneSpace { rows, columns })
    }

    /// Number of structures (rows).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the space holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Composite width (columns).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// All rows in collection order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// The row for one structure.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    /// Column provenance in layout order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }
}
