//! Atom-centered quadrature grids.
//!
//! The integral engine only sees the [`GridProvider`] trait: it asks for the
//! grid of one atom, consumes it for every shell pair and drops it before the
//! next atom is requested.
mod becke;

pub use becke::BeckeGrid;

use nalgebra::Vector3;

use crate::{
    atom::Atom,
    basis::BasisSet,
    config::GridConfig,
    error::{IntegralError, Result},
};

/// Everything a provider needs to size the grid of one atom.
#[derive(Clone, Debug, PartialEq)]
pub struct AtomGridSpec {
    pub radial_precision: f64,
    pub min_angular_points: usize,
    pub max_angular_points: usize,
    pub atomic_number: u32,
    /// Largest exponent of the shells on the atom, 0 if it carries none.
    pub alpha_max: f64,
    pub max_l: u32,
    /// Smallest exponent per angular momentum of the shells on the atom.
    pub alpha_min: Vec<f64>,
}

impl AtomGridSpec {
    pub fn new(config: &GridConfig, basis: &BasisSet, atom: &Atom) -> Self {
        Self {
            radial_precision: config.radial_precision,
            min_angular_points: config.min_angular_points,
            max_angular_points: config.max_angular_points,
            atomic_number: atom.nuclear_charge(),
            alpha_max: basis.alpha_max(atom),
            max_l: basis.max_l(),
            alpha_min: basis.alpha_min(atom),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radial_precision > 0.0 && self.radial_precision < 1.0) {
            return Err(IntegralError::InvalidGridSpec(format!(
                "radial precision must lie in (0, 1), got {}",
                self.radial_precision
            )));
        }
        if self.min_angular_points == 0 || self.min_angular_points > self.max_angular_points {
            return Err(IntegralError::InvalidGridSpec(format!(
                "angular point range {}..={} is empty",
                self.min_angular_points, self.max_angular_points
            )));
        }
        Ok(())
    }
}

/// Quadrature points and weights of one atom, in the molecular frame (bohr).
#[derive(Clone, Debug, Default)]
pub struct AtomGrid {
    points: Vec<Vector3<f64>>,
    weights: Vec<f64>,
}

impl AtomGrid {
    pub fn new(points: Vec<Vector3<f64>>, weights: Vec<f64>) -> Self {
        Self { points, weights }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Fails when the grid is empty or points and weights disagree in length.
    pub(crate) fn check(&self, atom: usize) -> Result<()> {
        if self.points.len() != self.weights.len() {
            return Err(IntegralError::GridSize {
                atom,
                points: self.points.len(),
                weights: self.weights.len(),
            });
        }
        if self.points.is_empty() {
            return Err(IntegralError::EmptyGrid { atom });
        }
        Ok(())
    }
}

/// Produces the quadrature grid of one atom of a molecule.
pub trait GridProvider: Send + Sync {
    /// Builds the grid of `atoms[atom_index]`. The weights already contain the
    /// partitioning between atoms, so summing the contributions of the grids
    /// of all atoms integrates over all space.
    fn atom_grid(&self, spec: &AtomGridSpec, atoms: &[Atom], atom_index: usize) -> Result<AtomGrid>;
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use crate::error::IntegralError;

    use super::{AtomGrid, AtomGridSpec};

    fn spec() -> AtomGridSpec {
        AtomGridSpec {
            radial_precision: 1e-12,
            min_angular_points: 86,
            max_angular_points: 302,
            atomic_number: 1,
            alpha_max: 3.4,
            max_l: 1,
            alpha_min: vec![0.17, 0.8],
        }
    }

    #[test]
    fn spec_validation() {
        assert_eq!(spec().validate(), Ok(()));

        let bad_precision = AtomGridSpec {
            radial_precision: 0.0,
            ..spec()
        };
        assert!(matches!(bad_precision.validate(), Err(IntegralError::InvalidGridSpec(_))));

        let bad_angular = AtomGridSpec {
            min_angular_points: 400,
            ..spec()
        };
        assert!(matches!(bad_angular.validate(), Err(IntegralError::InvalidGridSpec(_))));
    }

    #[test]
    fn grid_checks() {
        assert_eq!(AtomGrid::default().check(3), Err(IntegralError::EmptyGrid { atom: 3 }));
        assert_eq!(
            AtomGrid::new(vec![Vector3::zeros()], vec![]).check(0),
            Err(IntegralError::GridSize {
                atom: 0,
                points: 1,
                weights: 0
            })
        );
        assert_eq!(AtomGrid::new(vec![Vector3::zeros()], vec![1.0]).check(0), Ok(()));
    }
}
