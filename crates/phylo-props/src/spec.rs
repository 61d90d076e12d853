//! The property contract consumed from descriptor implementations.

use phylo_core::{PhyloError, Structure};
use serde_json::Value;

use crate::aggregate::MergeRule;
use crate::value::{PropertyValue, Shape};

/// A pure descriptor function with a declared result shape.
///
/// Implementations must be pure and side-effect free with respect to the
/// structure: calling `compute` twice on an unchanged structure with the
/// same parameters must return the same value. The engine relies on this
/// to cache results keyed by structural content.
pub trait PropertySpec: Send + Sync {
    /// Unique registry name of the property.
    fn name(&self) -> &str;

    /// Declared result shape; every computed value must match it.
    fn shape(&self) -> Shape;

    /// Parameter record applied when the caller passes JSON null.
    fn default_params(&self) -> Value {
        Value::Null
    }

    /// Computes the property for a single structure.
    fn compute(&self, structure: &Structure, params: &Value) -> Result<PropertyValue, PhyloError>;

    /// Optional batched fast path over a whole slice of structures.
    ///
    /// Returning `None` makes the engine fall back to per-structure
    /// iteration. Implementations returning `Some` must produce exactly
    /// one value per input structure, in input order.
    fn compute_batch(
        &self,
        structures: &[Structure],
        params: &Value,
    ) -> Option<Result<Vec<PropertyValue>, PhyloError>> {
        let _ = (structures, params);
        None
    }

    /// Declares the property aggregate-only with the given merge rule.
    ///
    /// When `Some`, [`crate::PropertyEngine::apply`] merges the
    /// per-structure results into a single value instead of returning one
    /// result per structure.
    fn merge_rule(&self) -> Option<MergeRule> {
        None
    }
}
