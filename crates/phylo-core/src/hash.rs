//! Canonical content hashing for structures, collections, and parameters.

use std::hash::Hasher;

use sha2::{Digest, Sha256};
use siphasher::sip::SipHasher13;

use crate::collection::Collection;
use crate::errors::PhyloError;
use crate::serde_io::to_canonical_json_bytes;
use crate::structure::Structure;

/// Computes the canonical structural hash of a single structure.
///
/// The hash covers species labels, position bits, cell bits, the boundary
/// flag, and every per-site array, all in a fixed little-endian byte
/// encoding. Bit-identical structures hash identically regardless of how
/// they were produced.
pub fn structure_hash(structure: &Structure) -> String {
    let mut hasher = Sha256::new();
    hasher.update((structure.len() as u64).to_le_bytes());
    for species in structure.species() {
        hasher.update((species.len() as u64).to_le_bytes());
        hasher.update(species.as_bytes());
    }
    for position in structure.positions() {
        for component in position {
            hasher.update(component.to_bits().to_le_bytes());
        }
    }
    match structure.cell() {
        Some(cell) => {
            hasher.update([1u8]);
            for row in cell {
                for component in row {
                    hasher.update(component.to_bits().to_le_bytes());
                }
            }
        }
        None => hasher.update([0u8]),
    }
    hasher.update([structure.periodic() as u8]);
    for (name, values) in structure.site_arrays() {
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update((values.len() as u64).to_le_bytes());
        for value in values {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

/// Computes the canonical hash of an ordered collection.
///
/// Covers the structure hashes in collection order plus the canonical JSON
/// encoding of the metadata arrays, so reordering or re-annotating a
/// collection changes its identity.
pub fn collection_hash(collection: &Collection) -> Result<String, PhyloError> {
    let mut hasher = Sha256::new();
    hasher.update((collection.len() as u64).to_le_bytes());
    for structure in collection.iter() {
        hasher.update(structure.content_hash().as_bytes());
    }
    let metadata_bytes = to_canonical_json_bytes(collection.metadata_map())?;
    hasher.update(&metadata_bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Hashes a JSON parameter record into a stable 64-bit key.
///
/// Canonical JSON bytes feed a SipHash-1-3 with fixed zero keys, matching
/// the seed-derivation rule in [`crate::rng`].
pub fn params_hash(params: &serde_json::Value) -> Result<u64, PhyloError> {
    let bytes = to_canonical_json_bytes(params)?;
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(&bytes);
    Ok(hasher.finish())
}
