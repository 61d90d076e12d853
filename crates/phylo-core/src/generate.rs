//! Lazy structure generators satisfying the generator contract.
//!
//! A generator is any `Iterator<Item = Structure>`; collections consume
//! them up to a caller-specified size via [`crate::Collection::from_generator`].

use rand::Rng;

use crate::errors::{ErrorInfo, PhyloError};
use crate::rng::RngHandle;
use crate::structure::Structure;

/// Lazy iterator interpolating positions between two structures.
///
/// Yields `steps` structures with positions linearly interpolated from
/// `start` to `end`, extremes included. When `periodic` is requested the
/// end positions are first pulled to the nearest periodic image of the
/// start positions, so the path never crosses half the cell.
#[derive(Debug, Clone)]
pub struct Linspace {
    template: Structure,
    start: Vec<[f64; 3]>,
    delta: Vec<[f64; 3]>,
    steps: usize,
    cursor: usize,
}

/// Builds a [`Linspace`] generator between two structures.
///
/// The two structures must share the same species sequence; the periodic
/// variant additionally requires a periodic cell on `start`.
pub fn linspace(
    start: &Structure,
    end: &Structure,
    steps: usize,
    periodic: bool,
) -> Result<Linspace, PhyloError> {
    if start.species() != end.species() {
        return Err(PhyloError::Configuration(
            ErrorInfo::new("linspace-species", "structures differ in chemical composition")
                .with_hint("both endpoints must list the same species in the same order"),
        ));
    }
    if periodic && !start.periodic() {
        return Err(PhyloError::Configuration(ErrorInfo::new(
            "linspace-cell",
            "periodic interpolation requires a periodic start structure",
        )));
    }
    let mut delta = Vec::with_capacity(start.len());
    for (a, b) in start.positions().iter().zip(end.positions()) {
        let raw = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let step = if periodic {
            start.minimum_image(raw)?
        } else {
            raw
        };
        delta.push(step);
    }
    Ok(Linspace {
        template: start.clone(),
        start: start.positions().to_vec(),
        delta,
        steps,
        cursor: 0,
    })
}

impl Iterator for Linspace {
    type Item = Structure;

    fn next(&mut self) -> Option<Structure> {
        if self.cursor >= self.steps {
            return None;
        }
        let t = if self.steps > 1 {
            self.cursor as f64 / (self.steps - 1) as f64
        } else {
            0.0
        };
        let positions = self
            .start
            .iter()
            .zip(&self.delta)
            .map(|(origin, step)| {
                [
                    origin[0] + step[0] * t,
                    origin[1] + step[1] * t,
                    origin[2] + step[2] * t,
                ]
            })
            .collect();
        self.cursor += 1;
        // Site counts match by construction.
        self.template.with_positions(positions).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps - self.cursor;
        (remaining, Some(remaining))
    }
}

/// Infinite iterator yielding rattled copies of a seed structure.
///
/// Each yielded structure displaces every coordinate by a uniform draw in
/// `[-amplitude, amplitude]`, using one RNG substream per emitted copy so
/// the sequence is reproducible and order-independent of consumption
/// batching.
#[derive(Debug, Clone)]
pub struct Rattle {
    template: Structure,
    amplitude: f64,
    rng: RngHandle,
    emitted: u64,
}

/// Builds a [`Rattle`] generator over a seed structure.
pub fn rattle(template: &Structure, amplitude: f64, rng: RngHandle) -> Result<Rattle, PhyloError> {
    if !(amplitude.is_finite() && amplitude >= 0.0) {
        return Err(PhyloError::Configuration(
            ErrorInfo::new("rattle-amplitude", "amplitude must be finite and non-negative")
                .with_context("amplitude", amplitude.to_string()),
        ));
    }
    Ok(Rattle {
        template: template.clone(),
        amplitude,
        rng,
        emitted: 0,
    })
}

impl Iterator for Rattle {
    type Item = Structure;

    fn next(&mut self) -> Option<Structure> {
        let mut stream = self.rng.substream(self.emitted);
        self.emitted += 1;
        let positions = self
            .template
            .positions()
            .iter()
            .map(|position| {
                let mut moved = *position;
                for component in &mut moved {
                    *component += stream
                        .inner_mut()
                        .gen_range(-self.amplitude..=self.amplitude);
                }
                moved
            })
            .collect();
        self.template.with_positions(positions).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Structure, Structure) {
        let start = Structure::new(vec!["H".into(), "O".into()], vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        ])
        .unwrap();
        let end = start
            .with_positions(vec![[2.0, 0.0, 0.0], [3.0, 0.0, 0.0]])
            .unwrap();
        (start, end)
    }

    #[test]
    fn linspace_includes_both_extremes() {
        let (start, end) = pair();
        let frames: Vec<Structure> = linspace(&start, &end, 3, false).unwrap().collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].positions(), start.positions());
        assert_eq!(frames[2].positions(), end.positions());
        assert!((frames[1].positions()[0][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rattle_is_reproducible_per_seed() {
        let (start, _) = pair();
        let a: Vec<Structure> = rattle(&start, 0.1, RngHandle::from_seed(7))
            .unwrap()
            .take(3)
            .collect();
        let b: Vec<Structure> = rattle(&start, 0.1, RngHandle::from_seed(7))
            .unwrap()
            .take(3)
            .collect();
        assert_eq!(a, b);
    }
}
