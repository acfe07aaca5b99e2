use nalgebra::DMatrix;

use crate::{basis::BasisSet, error::Result};

pub mod blocks;
pub mod mmd;
pub mod numerical;

pub use mmd::{compute_analytical_overlap, overlap_matrix, McMurchieDavidson};
pub use numerical::{compute_cap_mat, compute_numerical_overlap_mat, Quadrature};

pub type DefaultIntegrator = mmd::McMurchieDavidson;

/// A way of evaluating the overlap matrix of a basis set.
pub trait Integrator {
    /// Calculate the overlap matrix of `basis` into `matrix`, which must already be
    /// sized `num_carts × num_carts` and zero-initialized.
    fn overlap_matrix(&self, basis: &BasisSet, matrix: &mut DMatrix<f64>) -> Result<()>;
}
