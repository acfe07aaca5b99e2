//! Bookkeeping that maps shell pairs onto rectangular blocks of a matrix.
use nalgebra::{DMatrix, DMatrixViewMut};

use crate::{
    basis::{BasisSet, Shell},
    error::{IntegralError, Result},
};

/// Two shells and the position of their block in the global matrix.
#[derive(Copy, Clone, Debug)]
pub struct ShellPair<'a> {
    pub row: usize,
    pub col: usize,
    pub shell_a: &'a Shell,
    pub shell_b: &'a Shell,
}

impl<'a> ShellPair<'a> {
    /// `num_carts(a) × num_carts(b)`
    pub fn shape(&self) -> (usize, usize) {
        (self.shell_a.num_carts(), self.shell_b.num_carts())
    }

    /// Writable view of this pair's block in `matrix`.
    pub fn view_mut<'m>(&self, matrix: &'m mut DMatrix<f64>) -> DMatrixViewMut<'m, f64> {
        matrix.view_mut((self.row, self.col), self.shape())
    }
}

/// All ordered shell pairs of `basis`, row-major in shell insertion order.
///
/// Row and column offsets advance by each shell's `num_carts()`, so the blocks
/// tile the `num_carts × num_carts` matrix without gaps or overlap.
pub fn shell_pairs(basis: &BasisSet) -> impl Iterator<Item = ShellPair<'_>> + Clone {
    let shells = basis
        .shell_offsets()
        .into_iter()
        .zip(basis.shells())
        .collect::<Vec<_>>();

    itertools::iproduct!(shells.clone(), shells).map(|((row, shell_a), (col, shell_b))| ShellPair {
        row,
        col,
        shell_a,
        shell_b,
    })
}

/// Checks that `matrix` is `num_carts × num_carts` for `basis`.
pub fn check_shape(basis: &BasisSet, matrix: &DMatrix<f64>) -> Result<()> {
    let n = basis.num_carts();
    if matrix.shape() != (n, n) {
        return Err(IntegralError::MatrixShape {
            expected: (n, n),
            found: matrix.shape(),
        });
    }
    Ok(())
}
