//! Immutable name-keyed registry of property specifications.

use std::collections::BTreeMap;
use std::sync::Arc;

use phylo_core::{ErrorInfo, PhyloError};

use crate::spec::PropertySpec;

/// Registry of named property specifications.
///
/// Built once at startup through [`RegistryBuilder`] and immutable
/// thereafter; lookup by name is the only runtime operation.
#[derive(Clone)]
pub struct PropertyRegistry {
    specs: BTreeMap<String, Arc<dyn PropertySpec>>,
}

impl PropertyRegistry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            specs: BTreeMap::new(),
        }
    }

    /// Looks up a specification by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn PropertySpec>, PhyloError> {
        self.specs.get(name).cloned().ok_or_else(|| {
            PhyloError::Configuration(
                ErrorInfo::new("unknown-property", "no property registered under this name")
                    .with_context("name", name.to_string()),
            )
        })
    }

    /// Registered names in deterministic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(|name| name.as_str())
    }

    /// Number of registered specifications.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Builder accumulating specifications before the registry is frozen.
pub struct RegistryBuilder {
    specs: BTreeMap<String, Arc<dyn PropertySpec>>,
}

impl RegistryBuilder {
    /// Registers a specification under its own name.
    ///
    /// Duplicate names are a configuration error: the registry is the
    /// single source of truth for property identity and silently
    /// replacing an entry would invalidate cache keys.
    pub fn register(mut self, spec: Arc<dyn PropertySpec>) -> Result<Self, PhyloError> {
        let name = spec.name().to_string();
        if self.specs.contains_key(&name) {
            return Err(PhyloError::Configuration(
                ErrorInfo::new("duplicate-property", "property name already registered")
                    .with_context("name", name),
            ));
        }
        self.specs.insert(name, spec);
        Ok(self)
    }

    /// Freezes the registry.
    pub fn build(self) -> PropertyRegistry {
        PropertyRegistry { specs: self.specs }
    }
}
