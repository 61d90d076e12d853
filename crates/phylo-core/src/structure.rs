//! Immutable atomic configurations consumed by the descriptor pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PhyloError};

/// A single atomic configuration: species, Cartesian positions, an
/// optional periodic cell, and named per-site scalar arrays.
///
/// Structures are immutable once constructed; every descriptor in the
/// pipeline is a read-only function of them. Construction validates that
/// all per-site arrays match the site count, so downstream code never
/// re-checks lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    species: Vec<String>,
    positions: Vec<[f64; 3]>,
    cell: Option<[[f64; 3]; 3]>,
    periodic: bool,
    site_arrays: BTreeMap<String, Vec<f64>>,
}

impl Structure {
    /// Creates a non-periodic structure from species labels and positions.
    pub fn new(species: Vec<String>, positions: Vec<[f64; 3]>) -> Result<Self, PhyloError> {
        if species.len() != positions.len() {
            return Err(PhyloError::Collection(
                ErrorInfo::new("structure-length", "species and position counts differ")
                    .with_context("species", species.len().to_string())
                    .with_context("positions", positions.len().to_string()),
            ));
        }
        Ok(Self {
            species,
            positions,
            cell: None,
            periodic: false,
            site_arrays: BTreeMap::new(),
        })
    }

    /// Attaches a periodic cell described by three lattice vectors.
    pub fn with_cell(mut self, cell: [[f64; 3]; 3], periodic: bool) -> Self {
        self.cell = Some(cell);
        self.periodic = periodic;
        self
    }

    /// Attaches a named per-site scalar array.
    pub fn with_site_array(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, PhyloError> {
        let name = name.into();
        if values.len() != self.positions.len() {
            return Err(PhyloError::Collection(
                ErrorInfo::new("site-array-length", "site array does not match site count")
                    .with_context("name", name)
                    .with_context("sites", self.positions.len().to_string())
                    .with_context("values", values.len().to_string()),
            ));
        }
        self.site_arrays.insert(name, values);
        Ok(self)
    }

    /// Number of atomic sites.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the structure has no sites.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Species label per site, in site order.
    pub fn species(&self) -> &[String] {
        &self.species
    }

    /// Cartesian position per site, in site order.
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// The periodic cell, if one is attached.
    pub fn cell(&self) -> Option<&[[f64; 3]; 3]> {
        self.cell.as_ref()
    }

    /// Whether periodic boundary conditions apply.
    pub fn periodic(&self) -> bool {
        self.periodic
    }

    /// Looks up a named per-site scalar array.
    pub fn site_array(&self, name: &str) -> Option<&[f64]> {
        self.site_arrays.get(name).map(|values| values.as_slice())
    }

    /// All per-site arrays keyed by name.
    pub fn site_arrays(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.site_arrays
    }

    /// Returns a copy of the structure with replaced positions.
    ///
    /// Used by generators; the site count must be unchanged.
    pub fn with_positions(&self, positions: Vec<[f64; 3]>) -> Result<Self, PhyloError> {
        if positions.len() != self.positions.len() {
            return Err(PhyloError::Collection(
                ErrorInfo::new("positions-length", "replacement positions differ in count")
                    .with_context("expected", self.positions.len().to_string())
                    .with_context("got", positions.len().to_string()),
            ));
        }
        let mut copy = self.clone();
        copy.positions = positions;
        Ok(copy)
    }

    /// Canonical content hash of the structure.
    ///
    /// Identical structures (bit-identical positions, cell, arrays) hash
    /// identically on every platform; this is the cache identity used by
    /// the property engine.
    pub fn content_hash(&self) -> String {
        crate::hash::structure_hash(self)
    }

    /// Wraps a displacement into the minimum-image convention of the cell.
    ///
    /// Non-periodic structures return the displacement unchanged. Returns
    /// an error when the cell is singular.
    pub fn minimum_image(&self, delta: [f64; 3]) -> Result<[f64; 3], PhyloError> {
        let cell = match (self.periodic, self.cell) {
            (true, Some(cell)) => cell,
            _ => return Ok(delta),
        };
        let inverse = invert_cell(&cell)?;
        // Fractional displacement, rounded to the nearest lattice image.
        let mut frac = [0.0f64; 3];
        for axis in 0..3 {
            frac[axis] =
                inverse[axis][0] * delta[0] + inverse[axis][1] * delta[1] + inverse[axis][2] * delta[2];
            frac[axis] -= frac[axis].round();
        }
        let mut wrapped = [0.0f64; 3];
        for axis in 0..3 {
            wrapped[axis] =
                cell[0][axis] * frac[0] + cell[1][axis] * frac[1] + cell[2][axis] * frac[2];
        }
        Ok(wrapped)
    }
}

fn invert_cell(cell: &[[f64; 3]; 3]) -> Result<[[f64; 3]; 3], PhyloError> {
    // Rows of `cell` are lattice vectors; invert the matrix whose columns
    // are those vectors so that inverse * cartesian = fractional.
    let m = [
        [cell[0][0], cell[1][0], cell[2][0]],
        [cell[0][1], cell[1][1], cell[2][1]],
        [cell[0][2], cell[1][2], cell[2][2]],
    ];
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < f64::EPSILON {
        return Err(PhyloError::Configuration(ErrorInfo::new(
            "singular-cell",
            "periodic cell matrix is singular",
        )));
    }
    let inv_det = 1.0 / det;
    let mut inverse = [[0.0f64; 3]; 3];
    inverse[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
    inverse[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
    inverse[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
    inverse[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
    inverse[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
    inverse[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
    inverse[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
    inverse[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
    inverse[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;
    Ok(inverse)
}
