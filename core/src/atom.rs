use nalgebra::Vector3;

use crate::periodic_table::ElementType;

/// Represents an atom in a molecule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Atom {
    pub(crate) position: Vector3<f64>,
    pub(crate) element_type: ElementType,
}

impl Atom {
    /// Creates an atom at `position`, given in bohr.
    pub fn new(element_type: ElementType, position: Vector3<f64>) -> Self {
        Self {
            position,
            element_type,
        }
    }

    /// Returns the charge of this nucleus
    pub fn nuclear_charge(&self) -> u32 {
        self.element_type.atomic_number()
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }
}
