mod basis_set;
mod cap;
mod grid;
mod molecule;

pub use basis_set::ConfigBasisSet;
pub use cap::CapConfig;
pub use grid::GridConfig;
pub use molecule::ConfigMolecule;
