pub mod cartesian;
mod functions;
mod set;

pub use cartesian::{cartesian_components, num_carts, Cartesian};
pub use functions::{ContractedGaussian, Gaussian, Shell};
pub use set::BasisSet;
