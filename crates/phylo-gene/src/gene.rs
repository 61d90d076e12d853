//! Genes: weighted, normalized wrappers around property computations.

use phylo_core::{ErrorInfo, PhyloError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalization strategy applied to a gene's columns.
///
/// Statistics are computed over the whole collection being processed,
/// once per gene-space build, never per structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Pass raw values through unchanged.
    None,
    /// Rescale into `[0, 1]` using the column minimum and maximum.
    MinMax,
    /// Center on the column mean and divide by the population deviation.
    ZScore,
}

/// A descriptor wrapped with normalization and weighting metadata.
///
/// The gene's arity is fixed by the wrapped property's declared shape at
/// gene-space build time; only numeric shapes qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Registry name of the wrapped property.
    pub property: String,
    /// Parameter record forwarded to the property engine.
    pub params: Value,
    /// Scalar weight applied after normalization.
    pub weight: f64,
    /// Normalization strategy for every column of this gene.
    pub normalization: Normalization,
    /// Period marking the gene's columns as cyclic/angular quantities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cyclic: Option<f64>,
    /// Expected output arity, checked against the property's declared
    /// shape at gene-space build time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,
}

impl Gene {
    /// Creates a gene with null parameters and no cyclic period.
    pub fn new(
        property: impl Into<String>,
        weight: f64,
        normalization: Normalization,
    ) -> Result<Self, PhyloError> {
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(PhyloError::Configuration(
                ErrorInfo::new("gene-weight", "gene weight must be finite and non-negative")
                    .with_context("weight", weight.to_string()),
            ));
        }
        Ok(Self {
            property: property.into(),
            params: Value::Null,
            weight,
            normalization,
            cyclic: None,
            arity: None,
        })
    }

    /// Sets the parameter record forwarded to the property.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Flags the gene's columns as cyclic with the given period.
    pub fn with_cyclic(mut self, period: f64) -> Result<Self, PhyloError> {
        if !(period.is_finite() && period > 0.0) {
            return Err(PhyloError::Configuration(
                ErrorInfo::new("gene-period", "cyclic period must be finite and positive")
                    .with_context("period", period.to_string()),
            ));
        }
        self.cyclic = Some(period);
        Ok(self)
    }

    /// Declares the arity the gene expects from its property.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }
}

/// Normalizes one column in place using collection-level statistics.
///
/// Degenerate statistics (all values equal, zero deviation) map every
/// entry to 0.0 instead of dividing by zero.
pub(crate) fn normalize_column(values: &mut [f64], normalization: Normalization) {
    match normalization {
        Normalization::None => {}
        Normalization::MinMax => {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let span = max - min;
            if span == 0.0 {
                values.iter_mut().for_each(|value| *value = 0.0);
            } else {
                values.iter_mut().for_each(|value| *value = (*value - min) / span);
            }
        }
        Normalization::ZScore => {
            let count = values.len() as f64;
            let mean = values.iter().sum::<f64>() / count;
            let variance =
                values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
            let deviation = variance.sqrt();
            if deviation == 0.0 {
                values.iter_mut().for_each(|value| *value = 0.0);
            } else {
                values
                    .iter_mut()
                    .for_each(|value| *value = (*value - mean) / deviation);
            }
        }
    }
}

/// Canonical hash of an ordered gene list, for provenance records.
pub fn genes_hash(genes: &[Gene]) -> Result<String, PhyloError> {
    use sha2::{Digest, Sha256};
    let bytes = phylo_core::serde_io::to_canonical_json_bytes(&genes)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_minmax_maps_to_zero() {
        let mut values = vec![3.0, 3.0, 3.0];
        normalize_column(&mut values, Normalization::MinMax);
        assert_eq!(values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn degenerate_zscore_maps_to_zero() {
        let mut values = vec![-1.5, -1.5];
        normalize_column(&mut values, Normalization::ZScore);
        assert_eq!(values, vec![0.0, 0.0]);
    }

    #[test]
    fn minmax_spans_unit_interval() {
        let mut values = vec![2.0, 4.0, 6.0];
        normalize_column(&mut values, Normalization::MinMax);
        assert_eq!(values, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn negative_weight_is_rejected() {
        assert!(Gene::new("atom_count", -0.5, Normalization::None).is_err());
    }
}
