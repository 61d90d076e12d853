//! Merge rules collapsing per-structure results into one value.

use std::collections::BTreeMap;

use phylo_core::{ErrorInfo, PhyloError};

use crate::value::PropertyValue;

/// Reducer signature for caller-supplied merge rules.
pub type Reducer = fn(&[PropertyValue]) -> Result<PropertyValue, PhyloError>;

/// How an aggregate-only property collapses per-structure results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeRule {
    /// Stack numeric results into one vector, one slot group per structure.
    Stack,
    /// Chain vector results end to end.
    Concat,
    /// Component-wise arithmetic mean over equal-shape numeric results.
    Mean,
    /// Component-wise sum over equal-shape numeric results.
    Sum,
    /// Caller-supplied reducer.
    Custom(Reducer),
}

/// Applies a merge rule to an ordered, gap-free result sequence.
pub fn merge_values(rule: MergeRule, values: &[PropertyValue]) -> Result<PropertyValue, PhyloError> {
    if values.is_empty() {
        return Err(PhyloError::Property(ErrorInfo::new(
            "merge-empty",
            "no results available to merge",
        )));
    }
    match rule {
        MergeRule::Stack | MergeRule::Concat => {
            let mut flat = Vec::new();
            for value in values {
                let components = numeric_components(value)?;
                flat.extend(components);
            }
            Ok(PropertyValue::Vector(flat))
        }
        MergeRule::Mean => component_wise(values, |sum, count| sum / count),
        MergeRule::Sum => component_wise(values, |sum, _count| sum),
        MergeRule::Custom(reducer) => reducer(values),
    }
}

fn component_wise(
    values: &[PropertyValue],
    finish: fn(f64, f64) -> f64,
) -> Result<PropertyValue, PhyloError> {
    let first = numeric_components(&values[0])?;
    let width = first.len();
    let mut sums = vec![0.0f64; width];
    for value in values {
        let components = numeric_components(value)?;
        if components.len() != width {
            return Err(PhyloError::Property(
                ErrorInfo::new("merge-shape", "results differ in arity during merge")
                    .with_context("expected", width.to_string())
                    .with_context("got", components.len().to_string()),
            ));
        }
        for (slot, component) in components.into_iter().enumerate() {
            sums[slot] += component;
        }
    }
    let count = values.len() as f64;
    let merged: Vec<f64> = sums.into_iter().map(|sum| finish(sum, count)).collect();
    match &values[0] {
        PropertyValue::Scalar(_) => Ok(PropertyValue::Scalar(merged[0])),
        PropertyValue::Record(fields) => {
            let rebuilt: BTreeMap<String, f64> = fields
                .keys()
                .cloned()
                .zip(merged.iter().copied())
                .collect();
            Ok(PropertyValue::Record(rebuilt))
        }
        _ => Ok(PropertyValue::Vector(merged)),
    }
}

fn numeric_components(value: &PropertyValue) -> Result<Vec<f64>, PhyloError> {
    value.flatten().ok_or_else(|| {
        PhyloError::Property(ErrorInfo::new(
            "merge-symbolic",
            "symbolic results cannot be merged numerically",
        ))
    })
}
