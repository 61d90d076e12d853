//! Ordered structure collections with parallel metadata arrays.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorInfo, PhyloError};
use crate::structure::Structure;

/// An ordered sequence of structures plus named metadata arrays.
///
/// Insertion order is significant: the position of a structure is its row
/// index in every downstream matrix. Each metadata array runs parallel to
/// the structure sequence; the invariant `metadata[key].len() == len()`
/// holds after every operation and violating it is a [`PhyloError::Collection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Collection {
    structures: Vec<Structure>,
    metadata: BTreeMap<String, Vec<Value>>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection from a list of structures with no metadata.
    pub fn from_structures(structures: Vec<Structure>) -> Self {
        Self {
            structures,
            metadata: BTreeMap::new(),
        }
    }

    /// Consumes up to `limit` structures from a generator.
    ///
    /// Generators may be infinite; the collection never pulls more than
    /// `limit` items.
    pub fn from_generator<I>(generator: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = Structure>,
    {
        Self::from_structures(generator.into_iter().take(limit).collect())
    }

    /// Number of structures in the collection.
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Whether the collection holds no structures.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Returns the structure at the given position.
    pub fn get(&self, index: usize) -> Option<&Structure> {
        self.structures.get(index)
    }

    /// Iterates over structures in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter()
    }

    /// All structures in collection order.
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    /// Appends a structure, padding every metadata array with JSON null.
    pub fn push(&mut self, structure: Structure) {
        self.structures.push(structure);
        for values in self.metadata.values_mut() {
            values.push(Value::Null);
        }
    }

    /// Attaches or replaces a metadata array.
    ///
    /// The array must have exactly one entry per structure.
    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), PhyloError> {
        let key = key.into();
        if values.len() != self.structures.len() {
            return Err(PhyloError::Collection(
                ErrorInfo::new("metadata-length", "metadata array does not match collection")
                    .with_context("key", key)
                    .with_context("collection", self.structures.len().to_string())
                    .with_context("values", values.len().to_string()),
            ));
        }
        self.metadata.insert(key, values);
        Ok(())
    }

    /// Looks up a metadata array by key.
    pub fn metadata(&self, key: &str) -> Option<&[Value]> {
        self.metadata.get(key).map(|values| values.as_slice())
    }

    /// Metadata keys in deterministic order.
    pub fn metadata_keys(&self) -> impl Iterator<Item = &str> {
        self.metadata.keys().map(|key| key.as_str())
    }

    /// The full metadata map, keyed by name.
    pub fn metadata_map(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.metadata
    }

    /// Extracts a contiguous sub-collection, metadata included.
    pub fn slice(&self, range: Range<usize>) -> Result<Collection, PhyloError> {
        if range.end > self.structures.len() || range.start > range.end {
            return Err(PhyloError::Collection(
                ErrorInfo::new("slice-range", "slice range exceeds collection bounds")
                    .with_context("start", range.start.to_string())
                    .with_context("end", range.end.to_string())
                    .with_context("len", self.structures.len().to_string()),
            ));
        }
        let structures = self.structures[range.clone()].to_vec();
        let metadata = self
            .metadata
            .iter()
            .map(|(key, values)| (key.clone(), values[range.clone()].to_vec()))
            .collect();
        Ok(Collection {
            structures,
            metadata,
        })
    }

    /// Concatenates two collections.
    ///
    /// Metadata keys are unioned; slots for structures that never carried
    /// a given key are filled with JSON null so every array keeps matching
    /// the combined length.
    pub fn concat(&self, other: &Collection) -> Collection {
        let mut structures = self.structures.clone();
        structures.extend(other.structures.iter().cloned());

        let mut metadata: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for key in self.metadata.keys().chain(other.metadata.keys()) {
            if metadata.contains_key(key) {
                continue;
            }
            let mut values = match self.metadata.get(key) {
                Some(values) => values.clone(),
                None => vec![Value::Null; self.structures.len()],
            };
            match other.metadata.get(key) {
                Some(tail) => values.extend(tail.iter().cloned()),
                None => values.extend(std::iter::repeat(Value::Null).take(other.structures.len())),
            }
            metadata.insert(key.clone(), values);
        }
        Collection {
            structures,
            metadata,
        }
    }

    /// Canonical content hash of the collection (order sensitive).
    pub fn content_hash(&self) -> Result<String, PhyloError> {
        crate::hash::collection_hash(self)
    }

    /// Verifies the metadata length invariant.
    ///
    /// All mutating operations maintain the invariant themselves; this
    /// check exists for callers that deserialize collections from
    /// untrusted payloads.
    pub fn validate(&self) -> Result<(), PhyloError> {
        for (key, values) in &self.metadata {
            if values.len() != self.structures.len() {
                return Err(PhyloError::Collection(
                    ErrorInfo::new("metadata-length", "metadata array does not match collection")
                        .with_context("key", key.clone())
                        .with_context("collection", self.structures.len().to_string())
                        .with_context("values", values.len().to_string()),
                ));
            }
        }
        Ok(())
    }
}
