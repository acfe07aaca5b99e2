use std::error::Error;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::{atom::Atom, molecule::Molecule, periodic_table::ElementType};

/// Represents a full molecule in a config file.
/// A molecule is just a list of positioned atoms, coordinates in bohr.
#[derive(Deserialize)]
pub struct ConfigMolecule(Vec<ConfigAtom>);

#[derive(Deserialize)]
struct ConfigAtom {
    element: ElementType,
    position: Vec<f64>,
}

impl TryFrom<ConfigMolecule> for Molecule {
    type Error = Box<dyn Error>;

    fn try_from(value: ConfigMolecule) -> Result<Self, Self::Error> {
        let ConfigMolecule(config_atoms) = value;

        let mut atoms = Vec::with_capacity(config_atoms.len());

        for atom in config_atoms {
            let &[x, y, z] = atom.position.as_slice() else {
                return Err(format!(
                    "atom {} needs x, y, z coordinates, got {:?}",
                    atom.element, atom.position
                )
                .into());
            };

            atoms.push(Atom::new(atom.element, Vector3::new(x, y, z)));
        }

        Ok(Molecule::new(atoms))
    }
}
