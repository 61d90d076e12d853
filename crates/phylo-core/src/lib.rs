#![deny(missing_docs)]
#![doc = "Core structure, collection, and determinism primitives for the \
phylo engine. Structures and collections are caller-owned and immutable \
once they enter a pipeline; everything downstream is a pure function of \
them."]

/// Ordered structure collections with parallel metadata arrays.
pub mod collection;
/// Structured error types shared across phylo crates.
pub mod errors;
/// Lazy structure generators (linspace interpolation, seeded rattling).
pub mod generate;
/// Canonical content hashing for structures, collections, and parameters.
pub mod hash;
/// Provenance and schema descriptors for serialized artifacts.
pub mod provenance;
/// Deterministic RNG wrapper and seed-derivation helpers.
pub mod rng;
/// Canonical JSON serialization helpers.
pub mod serde_io;
/// Immutable atomic configurations.
pub mod structure;

pub use collection::Collection;
pub use errors::{ErrorInfo, PhyloError};
pub use generate::{linspace, rattle, Linspace, Rattle};
pub use hash::{collection_hash, params_hash, structure_hash};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use structure::Structure;
