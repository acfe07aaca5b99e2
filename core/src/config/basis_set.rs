use std::{collections::HashMap, error::Error};

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    basis::{BasisSet, Gaussian, Shell},
    molecule::Molecule,
    periodic_table::ElementType,
};

/// A basis set in the JSON format of the Basis Set Exchange.
#[derive(Deserialize)]
pub struct ConfigBasisSet {
    /// Keyed by atomic number ("8") or element symbol ("O")
    elements: HashMap<String, ConfigElectronicConfiguration>,
}

#[derive(Deserialize)]
struct ConfigElectronicConfiguration {
    electron_shells: Vec<ConfigElectronShell>,
}

#[derive(Deserialize)]
#[allow(unused)]
struct ConfigElectronShell {
    function_type: String,
    angular_momentum: Vec<u32>,
    exponents: Vec<String>,
    coefficients: Vec<Vec<String>>,
}

/// Contracted shells of one element, not yet placed on an atom.
type ElementShells = Vec<(u32, SmallVec<[Gaussian; 6]>)>;

impl ConfigBasisSet {
    /// Places the shells of every atom of `molecule` on that atom, in atom
    /// order, and normalizes them.
    pub fn basis_for(&self, molecule: &Molecule) -> Result<BasisSet, Box<dyn Error>> {
        let elements = self.parse_elements()?;
        let mut basis = BasisSet::default();

        for atom in molecule.atoms() {
            let shells = elements
                .get(&atom.element_type())
                .ok_or_else(|| format!("no basis functions for element {}", atom.element_type()))?;

            for (angular_momentum, primitives) in shells {
                basis.add_shell(Shell::new(
                    *angular_momentum,
                    *atom.position(),
                    primitives.iter().copied(),
                ));
            }
        }

        basis.normalize();
        log::debug!(
            "basis set with {} shells and {} cartesian functions",
            basis.n_shells(),
            basis.num_carts()
        );
        Ok(basis)
    }

    fn parse_elements(&self) -> Result<HashMap<ElementType, ElementShells>, Box<dyn Error>> {
        let mut elements = HashMap::with_capacity(self.elements.len());

        for (key, configuration) in &self.elements {
            let element = match key.parse::<u32>() {
                Ok(atomic_number) => ElementType::try_from(atomic_number)?,
                Err(_) => key.parse::<ElementType>()?,
            };

            let mut shells = Vec::new();
            for electron_shell in &configuration.electron_shells {
                let exponents = electron_shell
                    .exponents
                    .iter()
                    .map(|exponent| exponent.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()?;

                // one shell per coefficient row; `sp` shells list one angular momentum per row
                for (index, coefficients) in electron_shell.coefficients.iter().enumerate() {
                    let angular_momentum = *electron_shell
                        .angular_momentum
                        .get(index)
                        .or(electron_shell.angular_momentum.last())
                        .ok_or("electron shell without angular momentum")?;

                    if coefficients.len() != exponents.len() {
                        return Err(format!(
                            "element {element}: {} coefficients for {} exponents",
                            coefficients.len(),
                            exponents.len()
                        )
                        .into());
                    }

                    let mut primitives = SmallVec::with_capacity(exponents.len());
                    for (&exponent, coefficient) in exponents.iter().zip(coefficients) {
                        let coefficient = coefficient.trim().parse::<f64>()?;
                        if coefficient != 0.0 {
                            primitives.push(Gaussian::new(exponent, coefficient));
                        }
                    }
                    shells.push((angular_momentum, primitives));
                }
            }

            elements.insert(element, shells);
        }

        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::{atom::Atom, molecule::Molecule, periodic_table::ElementType};

    use super::ConfigBasisSet;

    const STO_3G: &str = r#"{
        "elements": {
            "1": {
                "electron_shells": [{
                    "function_type": "gto",
                    "angular_momentum": [0],
                    "exponents": ["0.3425250914E+01", "0.6239137298E+00", "0.1688554040E+00"],
                    "coefficients": [["0.1543289673E+00", "0.5353281423E+00", "0.4446345422E+00"]]
                }]
            },
            "O": {
                "electron_shells": [{
                    "function_type": "gto",
                    "angular_momentum": [0],
                    "exponents": ["0.1307093214E+03", "0.2380886605E+02", "0.6443608313E+01"],
                    "coefficients": [["0.1543289673E+00", "0.5353281423E+00", "0.4446345422E+00"]]
                }, {
                    "function_type": "gto",
                    "angular_momentum": [0, 1],
                    "exponents": ["0.5033151319E+01", "0.1169596125E+01", "0.3803889600E+00"],
                    "coefficients": [
                        ["-0.9996722919E-01", "0.3995128261E+00", "0.7001154689E+00"],
                        ["0.1559162750E+00", "0.6076837186E+00", "0.3919573931E+00"]
                    ]
                }]
            }
        }
    }"#;

    fn water() -> Molecule {
        Molecule::new(vec![
            Atom::new(ElementType::O, Vector3::new(0.0, 0.0, 0.0)),
            Atom::new(ElementType::H, Vector3::new(0.0, 1.43, 1.1)),
            Atom::new(ElementType::H, Vector3::new(0.0, -1.43, 1.1)),
        ])
    }

    #[test]
    fn builds_basis_in_atom_order() {
        let config: ConfigBasisSet = serde_json::from_str(STO_3G).unwrap();
        let basis = config.basis_for(&water()).unwrap();

        let layout = basis
            .shells()
            .iter()
            .map(|shell| shell.angular_momentum())
            .collect::<Vec<_>>();
        assert_eq!(layout, vec![0, 0, 1, 0, 0]);
        assert_eq!(basis.num_carts(), 7);
        assert_eq!(basis.shells()[3].origin(), &Vector3::new(0.0, 1.43, 1.1));
    }

    #[test]
    fn shells_are_normalized() {
        let config: ConfigBasisSet = serde_json::from_str(STO_3G).unwrap();
        let basis = config.basis_for(&water()).unwrap();
        let overlap = crate::integrals::overlap_matrix(&basis).unwrap();

        for i in 0..basis.num_carts() {
            assert_relative_eq!(overlap[(i, i)], 1.0, max_relative = 1e-10);
        }
    }

    #[test]
    fn missing_element() {
        let config: ConfigBasisSet = serde_json::from_str(STO_3G).unwrap();
        let molecule = Molecule::new(vec![Atom::new(ElementType::N, Vector3::zeros())]);
        assert!(config.basis_for(&molecule).is_err());
    }
}
