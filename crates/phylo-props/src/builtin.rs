//! Built-in geometric and compositional property specifications.
//!
//! These cover the descriptors the pipeline itself needs for testing and
//! benchmarking; physically richer calculators plug in through the same
//! [`PropertySpec`] contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use phylo_core::{ErrorInfo, PhyloError, Structure};
use serde_json::{json, Value};

use crate::registry::PropertyRegistry;
use crate::spec::PropertySpec;
use crate::value::{PropertyValue, Shape};

/// Number of atomic sites. Demonstrates the batched fast path.
#[derive(Debug, Default)]
pub struct AtomCount;

impl PropertySpec for AtomCount {
    fn name(&self) -> &str {
        "atom_count"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        Ok(PropertyValue::Scalar(structure.len() as f64))
    }

    fn compute_batch(
        &self,
        structures: &[Structure],
        _params: &Value,
    ) -> Option<Result<Vec<PropertyValue>, PhyloError>> {
        Some(Ok(structures
            .iter()
            .map(|structure| PropertyValue::Scalar(structure.len() as f64))
            .collect()))
    }
}

/// Volume of the periodic cell; undefined for non-periodic structures.
#[derive(Debug, Default)]
pub struct CellVolume;

impl PropertySpec for CellVolume {
    fn name(&self) -> &str {
        "cell_volume"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        let cell = structure.cell().ok_or_else(|| {
            PhyloError::Property(ErrorInfo::new(
                "no-cell",
                "cell volume is undefined without a periodic cell",
            ))
        })?;
        let [a, b, c] = *cell;
        let cross = [
            b[1] * c[2] - b[2] * c[1],
            b[2] * c[0] - b[0] * c[2],
            b[0] * c[1] - b[1] * c[0],
        ];
        let volume = (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]).abs();
        Ok(PropertyValue::Scalar(volume))
    }
}

/// Fraction of sites occupied by one species, selected via parameters.
#[derive(Debug, Default)]
pub struct SpeciesFraction;

impl PropertySpec for SpeciesFraction {
    fn name(&self) -> &str {
        "species_fraction"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn default_params(&self) -> Value {
        json!({ "species": "H" })
    }

    fn compute(&self, structure: &Structure, params: &Value) -> Result<PropertyValue, PhyloError> {
        let target = params
            .get("species")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PhyloError::Configuration(ErrorInfo::new(
                    "species-param",
                    "species_fraction requires a string 'species' parameter",
                ))
            })?;
        if structure.is_empty() {
            return Err(PhyloError::Property(ErrorInfo::new(
                "empty-structure",
                "species fraction is undefined for an empty structure",
            )));
        }
        let hits = structure
            .species()
            .iter()
            .filter(|species| species.as_str() == target)
            .count();
        Ok(PropertyValue::Scalar(hits as f64 / structure.len() as f64))
    }
}

/// Mean nearest-neighbour distance under the minimum-image convention.
#[derive(Debug, Default)]
pub struct MeanNeighbourDistance;

impl PropertySpec for MeanNeighbourDistance {
    fn name(&self) -> &str {
        "mean_neighbour_distance"
    }

    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        let positions = structure.positions();
        if positions.len() < 2 {
            return Err(PhyloError::Property(
                ErrorInfo::new(
                    "too-few-sites",
                    "nearest-neighbour distance needs at least two sites",
                )
                .with_context("sites", positions.len().to_string()),
            ));
        }
        let mut total = 0.0;
        for (i, a) in positions.iter().enumerate() {
            let mut nearest = f64::INFINITY;
            for (j, b) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let delta =
                    structure.minimum_image([b[0] - a[0], b[1] - a[1], b[2] - a[2]])?;
                let distance =
                    (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();
                if distance < nearest {
                    nearest = distance;
                }
            }
            total += nearest;
        }
        Ok(PropertyValue::Scalar(total / positions.len() as f64))
    }
}

/// Mean Cartesian position of all sites.
#[derive(Debug, Default)]
pub struct Centroid;

impl PropertySpec for Centroid {
    fn name(&self) -> &str {
        "centroid"
    }

    fn shape(&self) -> Shape {
        Shape::Vector(3)
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        if structure.is_empty() {
            return Err(PhyloError::Property(ErrorInfo::new(
                "empty-structure",
                "centroid is undefined for an empty structure",
            )));
        }
        let mut sums = [0.0f64; 3];
        for position in structure.positions() {
            for (slot, component) in position.iter().enumerate() {
                sums[slot] += component;
            }
        }
        let count = structure.len() as f64;
        Ok(PropertyValue::Vector(vec![
            sums[0] / count,
            sums[1] / count,
            sums[2] / count,
        ]))
    }
}

/// Per-species site counts as a record keyed by the requested species list.
#[derive(Debug)]
pub struct CompositionRecord {
    fields: Vec<String>,
}

impl CompositionRecord {
    /// Creates a record property counting the given species.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl PropertySpec for CompositionRecord {
    fn name(&self) -> &str {
        "composition"
    }

    fn shape(&self) -> Shape {
        Shape::Record(self.fields.clone())
    }

    fn compute(&self, structure: &Structure, _params: &Value) -> Result<PropertyValue, PhyloError> {
        let mut counts: BTreeMap<String, f64> = self
            .fields
            .iter()
            .map(|field| (field.clone(), 0.0))
            .collect();
        for species in structure.species() {
            if let Some(slot) = counts.get_mut(species) {
                *slot += 1.0;
            }
        }
        Ok(PropertyValue::Record(counts))
    }
}

/// Registry preloaded with every built-in property.
pub fn builtin_registry() -> Result<PropertyRegistry, PhyloError> {
    Ok(PropertyRegistry::builder()
        .register(Arc::new(AtomCount))?
        .register(Arc::new(CellVolume))?
        .register(Arc::new(SpeciesFraction))?
        .register(Arc::new(MeanNeighbourDistance))?
        .register(Arc::new(Centroid))?
        .build())
}
