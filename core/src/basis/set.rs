use crate::{
    atom::Atom,
    error::{IntegralError, Result},
};

use super::Shell;

/// Shells closer than this (in bohr) to an atom are centered on that atom.
const CENTER_TOLERANCE: f64 = 1e-8;

/// An ordered list of shells. The insertion order fixes the layout of the
/// basis functions in every matrix computed over this basis.
#[derive(Debug, Clone, Default)]
pub struct BasisSet {
    shells: Vec<Shell>,
}

impl BasisSet {
    pub fn new(shells: Vec<Shell>) -> Self {
        Self { shells }
    }

    /// Appends a shell after all previously added shells.
    pub fn add_shell(&mut self, shell: Shell) {
        self.shells.push(shell);
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn n_shells(&self) -> usize {
        self.shells.len()
    }

    /// Total number of Cartesian basis functions.
    pub fn num_carts(&self) -> usize {
        self.shells.iter().map(Shell::num_carts).sum()
    }

    /// Largest angular momentum in the basis set, 0 for an empty basis.
    pub fn max_l(&self) -> u32 {
        self.shells
            .iter()
            .map(Shell::angular_momentum)
            .max()
            .unwrap_or(0)
    }

    /// Returns the shells centered on a given atom.
    pub fn shells_on_center<'a>(&'a self, atom: &'a Atom) -> impl Iterator<Item = &'a Shell> {
        self.shells
            .iter()
            .filter(|shell| (shell.origin - atom.position).norm() < CENTER_TOLERANCE)
    }

    /// Smallest exponent of the shells on `atom`, per angular momentum
    /// `0..=max_l()`. Angular momenta without a shell on the atom are
    /// reported as `f64::INFINITY`.
    pub fn alpha_min(&self, atom: &Atom) -> Vec<f64> {
        let mut alpha_min = vec![f64::INFINITY; self.max_l() as usize + 1];
        for shell in self.shells_on_center(atom) {
            let entry = &mut alpha_min[shell.angular_momentum as usize];
            *entry = shell.exponents().fold(*entry, f64::min);
        }
        alpha_min
    }

    /// Largest exponent of the shells on `atom`, 0 if the atom carries no shell.
    pub fn alpha_max(&self, atom: &Atom) -> f64 {
        self.shells_on_center(atom)
            .flat_map(|shell| shell.exponents())
            .fold(0.0, f64::max)
    }

    /// Normalizes all of the shells in the basis set.
    pub fn normalize(&mut self) {
        self.shells.iter_mut().for_each(Shell::normalize);
    }

    /// Offset of the first basis function of every shell. The offsets advance by
    /// each shell's `num_carts()`, so consecutive shells tile `0..num_carts()`.
    pub fn shell_offsets(&self) -> Vec<usize> {
        self.shells
            .iter()
            .scan(0, |offset, shell| {
                let start = *offset;
                *offset += shell.num_carts();
                Some(start)
            })
            .collect()
    }

    /// Checks that every shell has primitives with strictly positive, finite exponents.
    pub fn validate(&self) -> Result<()> {
        for (index, shell) in self.shells.iter().enumerate() {
            if shell.num_prims() == 0 {
                return Err(IntegralError::EmptyShell { shell: index });
            }
            if let Some(exponent) = shell
                .exponents()
                .find(|exponent| !(exponent.is_finite() && *exponent > 0.0))
            {
                return Err(IntegralError::InvalidExponent {
                    shell: index,
                    exponent,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Shell> for BasisSet {
    fn from_iter<T: IntoIterator<Item = Shell>>(iter: T) -> Self {
        Self {
            shells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use crate::{
        atom::Atom,
        basis::{Gaussian, Shell},
        error::IntegralError,
        periodic_table::ElementType,
    };

    use super::BasisSet;

    fn water_like() -> (Atom, Atom, BasisSet) {
        let oxygen = Atom::new(ElementType::O, Vector3::zeros());
        let hydrogen = Atom::new(ElementType::H, Vector3::new(0.0, 1.43, 1.1));

        let basis = BasisSet::new(vec![
            Shell::new(0, oxygen.position, [Gaussian::new(130.7, 0.15), Gaussian::new(23.8, 0.5)]),
            Shell::new(1, oxygen.position, [Gaussian::new(5.03, 0.15), Gaussian::new(1.17, 0.6)]),
            Shell::new(2, oxygen.position, [Gaussian::new(0.8, 1.0)]),
            Shell::new(0, hydrogen.position, [Gaussian::new(3.42, 0.15), Gaussian::new(0.17, 0.4)]),
        ]);
        (oxygen, hydrogen, basis)
    }

    #[test]
    fn sizes() {
        let (_, _, basis) = water_like();
        assert_eq!(basis.n_shells(), 4);
        assert_eq!(basis.num_carts(), 1 + 3 + 6 + 1);
        assert_eq!(basis.max_l(), 2);
    }

    #[test]
    fn offsets_tile_the_basis() {
        let (_, _, basis) = water_like();
        let offsets = basis.shell_offsets();
        assert_eq!(offsets, vec![0, 1, 4, 10]);

        let mut covered = vec![false; basis.num_carts()];
        for (offset, shell) in offsets.iter().zip(basis.shells()) {
            for index in *offset..offset + shell.num_carts() {
                assert!(!covered[index], "basis function {index} covered twice");
                covered[index] = true;
            }
        }
        assert!(covered.into_iter().all(|c| c));
    }

    #[test]
    fn exponent_extrema_per_atom() {
        let (oxygen, hydrogen, basis) = water_like();
        assert_eq!(basis.alpha_max(&oxygen), 130.7);
        assert_eq!(basis.alpha_min(&oxygen), vec![23.8, 1.17, 0.8]);

        assert_eq!(basis.alpha_max(&hydrogen), 3.42);
        assert_eq!(basis.alpha_min(&hydrogen), vec![0.17, f64::INFINITY, f64::INFINITY]);
    }

    #[test]
    fn validation() {
        let (_, _, mut basis) = water_like();
        assert_eq!(basis.validate(), Ok(()));

        basis.add_shell(Shell::new(0, Vector3::zeros(), [Gaussian::new(-1.0, 1.0)]));
        assert_eq!(
            basis.validate(),
            Err(IntegralError::InvalidExponent {
                shell: 4,
                exponent: -1.0
            })
        );

        let empty = BasisSet::new(vec![Shell::new(1, Vector3::zeros(), Vec::<Gaussian>::new())]);
        assert_eq!(empty.validate(), Err(IntegralError::EmptyShell { shell: 0 }));
    }
}
