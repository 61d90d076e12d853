#![deny(missing_docs)]
#![doc = "Property computation framework for the phylo pipeline: a pure \
descriptor contract, an immutable name-keyed registry, a per-run result \
cache, and the apply/aggregate engine with skip and abort failure \
policies."]

/// Merge rules collapsing per-structure results into one value.
pub mod aggregate;
/// Built-in geometric and compositional properties.
pub mod builtin;
/// Per-run result cache keyed by structural content.
pub mod cache;
/// The apply/cache/aggregate engine.
pub mod engine;
/// Immutable property registry.
pub mod registry;
/// The property contract consumed from descriptor implementations.
pub mod spec;
/// Property results and declared shapes.
pub mod value;

pub use aggregate::{merge_values, MergeRule, Reducer};
pub use builtin::builtin_registry;
pub use cache::{CacheKey, PropertyCache};
pub use engine::{ApplyOutput, FailurePolicy, PropertyEngine};
pub use registry::{PropertyRegistry, RegistryBuilder};
pub use spec::PropertySpec;
pub use value::{PropertyValue, Shape};
