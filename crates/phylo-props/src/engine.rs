//! The apply/cache/aggregate machinery over property specifications.

use phylo_core::{params_hash, Collection, ErrorInfo, PhyloError, Structure};
use rayon::prelude::*;
use serde_json::Value;

use crate::aggregate::merge_values;
use crate::cache::{CacheKey, PropertyCache};
use crate::spec::PropertySpec;
use crate::value::PropertyValue;

/// Policy applied when a property fails for a single structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record a missing sentinel for the failing structure and continue.
    Skip,
    /// Abort the whole apply on the first failure.
    Abort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Abort
    }
}

/// Result of applying a property across a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutput {
    /// One slot per structure, in collection order; `None` marks a
    /// structure skipped under [`FailurePolicy::Skip`].
    PerStructure(Vec<Option<PropertyValue>>),
    /// Single merged result for aggregate-only specifications.
    Merged(PropertyValue),
}

impl ApplyOutput {
    /// Unwraps the per-structure slots, rejecting merged output.
    pub fn per_structure(self) -> Result<Vec<Option<PropertyValue>>, PhyloError> {
        match self {
            ApplyOutput::PerStructure(slots) => Ok(slots),
            ApplyOutput::Merged(_) => Err(PhyloError::Configuration(ErrorInfo::new(
                "aggregate-output",
                "expected per-structure results from an aggregate-only property",
            ))),
        }
    }
}

/// Property apply engine owning the per-run result cache.
///
/// One engine belongs to exactly one pipeline run; the cache inside it is
/// never shared across runs on different collections.
#[derive(Default)]
pub struct PropertyEngine {
    cache: PropertyCache,
    policy: FailurePolicy,
}

impl PropertyEngine {
    /// Creates an engine with the given failure policy.
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            cache: PropertyCache::new(),
            policy,
        }
    }

    /// The configured failure policy.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Number of results currently cached.
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Applies a property across a collection, serially.
    ///
    /// Returns one result per structure in collection order, or a single
    /// merged value when the specification declares a merge rule. The
    /// batched fast path short-circuits per-structure iteration when the
    /// specification provides one.
    pub fn apply(
        &mut self,
        spec: &dyn PropertySpec,
        collection: &Collection,
        params: &Value,
    ) -> Result<ApplyOutput, PhyloError> {
        let params = resolve_params(spec, params);
        let params_key = params_hash(&params)?;

        if let Some(batch) = spec.compute_batch(collection.structures(), &params) {
            let values = batch?;
            return self.finalize_batch(spec, collection, params_key, values);
        }

        let mut slots = Vec::with_capacity(collection.len());
        for (index, structure) in collection.iter().enumerate() {
            let key = cache_key(spec, structure, params_key);
            if let Some(hit) = self.cache.get(&key) {
                slots.push(Some(hit));
                continue;
            }
            match spec.compute(structure, &params) {
                Ok(value) => {
                    check_shape(spec, index, &value)?;
                    self.cache.insert(key, value.clone())?;
                    slots.push(Some(value));
                }
                Err(err) => {
                    slots.push(self.handle_failure(spec, index, err)?);
                }
            }
        }
        finalize(spec, slots)
    }

    /// Applies a property with parallel evaluation of cache misses.
    ///
    /// The map over structures is embarrassingly parallel; results are
    /// reassembled into collection order regardless of completion order
    /// and the cache is filled after the join, so output is identical to
    /// [`PropertyEngine::apply`].
    pub fn apply_parallel(
        &mut self,
        spec: &dyn PropertySpec,
        collection: &Collection,
        params: &Value,
    ) -> Result<ApplyOutput, PhyloError> {
        let params = resolve_params(spec, params);
        let params_key = params_hash(&params)?;

        if let Some(batch) = spec.compute_batch(collection.structures(), &params) {
            let values = batch?;
            return self.finalize_batch(spec, collection, params_key, values);
        }

        let mut slots: Vec<Option<PropertyValue>> = vec![None; collection.len()];
        let mut misses = Vec::new();
        for (index, structure) in collection.iter().enumerate() {
            let key = cache_key(spec, structure, params_key);
            match self.cache.get(&key) {
                Some(hit) => slots[index] = Some(hit),
                None => misses.push((index, structure)),
            }
        }

        let mut computed: Vec<(usize, Result<PropertyValue, PhyloError>)> = misses
            .par_iter()
            .map(|&(index, structure)| (index, spec.compute(structure, &params)))
            .collect();
        computed.sort_by_key(|(index, _)| *index);

        for (index, result) in computed {
            match result {
                Ok(value) => {
                    check_shape(spec, index, &value)?;
                    let key = cache_key(spec, &collection.structures()[index], params_key);
                    self.cache.insert(key, value.clone())?;
                    slots[index] = Some(value);
                }
                Err(err) => {
                    slots[index] = self.handle_failure(spec, index, err)?;
                }
            }
        }
        finalize(spec, slots)
    }

    fn finalize_batch(
        &mut self,
        spec: &dyn PropertySpec,
        collection: &Collection,
        params_key: u64,
        values: Vec<PropertyValue>,
    ) -> Result<ApplyOutput, PhyloError> {
        if values.len() != collection.len() {
            return Err(PhyloError::Internal(
                ErrorInfo::new("batch-length", "batched path returned a mismatched result count")
                    .with_context("property", spec.name().to_string())
                    .with_context("expected", collection.len().to_string())
                    .with_context("got", values.len().to_string()),
            ));
        }
        let mut slots = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            check_shape(spec, index, &value)?;
            let key = cache_key(spec, &collection.structures()[index], params_key);
            self.cache.insert(key, value.clone())?;
            slots.push(Some(value));
        }
        finalize(spec, slots)
    }

    fn handle_failure(
        &self,
        spec: &dyn PropertySpec,
        index: usize,
        err: PhyloError,
    ) -> Result<Option<PropertyValue>, PhyloError> {
        match self.policy {
            FailurePolicy::Skip => {
                log::warn!(
                    "property '{}' undefined for structure {}: {}; recording missing value",
                    spec.name(),
                    index,
                    err
                );
                Ok(None)
            }
            FailurePolicy::Abort => Err(PhyloError::Property(
                ErrorInfo::new("property-failed", "property computation failed for a structure")
                    .with_context("property", spec.name().to_string())
                    .with_context("structure", index.to_string())
                    .with_hint(err.to_string()),
            )),
        }
    }
}

fn resolve_params(spec: &dyn PropertySpec, params: &Value) -> Value {
    if params.is_null() {
        spec.default_params()
    } else {
        params.clone()
    }
}

fn cache_key(spec: &dyn PropertySpec, structure: &Structure, params_key: u64) -> CacheKey {
    CacheKey {
        spec: spec.name().to_string(),
        structure: structure.content_hash(),
        params: params_key,
    }
}

fn check_shape(
    spec: &dyn PropertySpec,
    index: usize,
    value: &PropertyValue,
) -> Result<(), PhyloError> {
    if value.matches(&spec.shape()) {
        return Ok(());
    }
    Err(PhyloError::Configuration(
        ErrorInfo::new("shape-mismatch", "computed value violates the declared shape")
            .with_context("property", spec.name().to_string())
            .with_context("structure", index.to_string()),
    ))
}

fn finalize(
    spec: &dyn PropertySpec,
    slots: Vec<Option<PropertyValue>>,
) -> Result<ApplyOutput, PhyloError> {
    match spec.merge_rule() {
        Some(rule) => {
            let present: Vec<PropertyValue> = slots.into_iter().flatten().collect();
            Ok(ApplyOutput::Merged(merge_values(rule, &present)?))
        }
        None => Ok(ApplyOutput::PerStructure(slots)),
    }
}
