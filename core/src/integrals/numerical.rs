//! Overlap and CAP matrices by quadrature on atom-centered grids.
//!
//! Every atom contributes the part of the integrand captured by its own
//! (partitioned) grid, so blocks are accumulated over the loop on atoms.
//! Grid points are evaluated in batches of [`BATCH_SIZE`], which bounds the
//! scratch memory to `BATCH_SIZE × num_carts` per atom.
use nalgebra::{DMatrix, DMatrixViewMut, Vector3};

use crate::{
    basis::{cartesian_components, BasisSet, Shell},
    cap::Potential,
    config::GridConfig,
    error::{IntegralError, Result},
    grid::{AtomGridSpec, GridProvider},
    molecule::Molecule,
};

use super::{
    blocks::{self, ShellPair},
    Integrator,
};

/// Number of grid points evaluated together.
pub const BATCH_SIZE: usize = 1024;

/// Numerical overlap integrals on the grids of `provider`.
pub struct Quadrature<'a, G> {
    pub molecule: &'a Molecule,
    pub provider: &'a G,
    pub config: GridConfig,
}

impl<'a, G: GridProvider> Quadrature<'a, G> {
    pub fn new(molecule: &'a Molecule, provider: &'a G, config: GridConfig) -> Self {
        Self {
            molecule,
            provider,
            config,
        }
    }
}

impl<G: GridProvider> Integrator for Quadrature<'_, G> {
    fn overlap_matrix(&self, basis: &BasisSet, matrix: &mut DMatrix<f64>) -> Result<()> {
        compute_numerical_overlap_mat(matrix, basis, self.molecule, self.provider, &self.config)
    }
}

/// Values of every Cartesian component of `shell` on `points`, one row per
/// point and one column per component.
pub fn shell_values(shell: &Shell, points: &[Vector3<f64>]) -> DMatrix<f64> {
    let components = cartesian_components(shell.angular_momentum());
    DMatrix::from_fn(points.len(), components.len(), |p, c| {
        shell.evaluate(&points[p], components[c])
    })
}

/// All basis functions evaluated on one batch of grid points.
pub struct GridBatch {
    values: DMatrix<f64>,
    /// `values` with each row scaled by the weight of its point, times the
    /// potential there when there is one.
    weighted: DMatrix<f64>,
}

impl GridBatch {
    pub fn new(
        basis: &BasisSet,
        points: &[Vector3<f64>],
        weights: &[f64],
        potential: Option<&dyn Potential>,
    ) -> Self {
        debug_assert_eq!(points.len(), weights.len());

        // every shell is evaluated once and shared by all of its pairs
        let mut values = DMatrix::zeros(points.len(), basis.num_carts());
        for (offset, shell) in basis.shell_offsets().into_iter().zip(basis.shells()) {
            values
                .columns_mut(offset, shell.num_carts())
                .copy_from(&shell_values(shell, points));
        }

        let mut weighted = values.clone();
        for ((mut row, weight), point) in weighted.row_iter_mut().zip(weights).zip(points) {
            row *= match potential {
                Some(potential) => weight * potential.eval_pot(point),
                None => *weight,
            };
        }

        Self { values, weighted }
    }

    pub fn num_points(&self) -> usize {
        self.values.nrows()
    }
}

/// Adds the contribution of one batch of grid points to the block of a pair
/// of shells:
///
/// `block[i, j] += Σ_p w_p φ_a,i(r_p) φ_b,j(r_p) [V(r_p)]`
///
/// Without a potential in `batch` this is the overlap, with one it is the
/// matrix element of that potential.
pub fn num_block(batch: &GridBatch, pair: &ShellPair<'_>, mut block: DMatrixViewMut<'_, f64>) {
    let (rows, cols) = pair.shape();
    debug_assert_eq!(block.shape(), (rows, cols));

    block.gemm_tr(
        1.0,
        &batch.values.columns(pair.row, rows),
        &batch.weighted.columns(pair.col, cols),
        1.0,
    );
}

/// Accumulates the contribution of atom `atom_index` into `target`.
///
/// The grid of the atom lives for the duration of this call only.
fn atom_contribution<G: GridProvider + ?Sized>(
    target: &mut DMatrix<f64>,
    basis: &BasisSet,
    molecule: &Molecule,
    provider: &G,
    config: &GridConfig,
    potential: Option<&dyn Potential>,
    atom_index: usize,
) -> Result<()> {
    let atoms = molecule.atoms();
    let spec = AtomGridSpec::new(config, basis, &atoms[atom_index]);
    spec.validate()?;

    let grid = provider.atom_grid(&spec, atoms, atom_index)?;
    grid.check(atom_index)?;
    log::debug!(
        "atom {atom_index} ({}): {} grid points in {} batches",
        atoms[atom_index].element_type(),
        grid.num_points(),
        grid.num_points().div_ceil(BATCH_SIZE)
    );

    let batches = grid
        .points()
        .chunks(BATCH_SIZE)
        .zip(grid.weights().chunks(BATCH_SIZE));
    for (points, weights) in batches {
        let batch = GridBatch::new(basis, points, weights, potential);
        for pair in blocks::shell_pairs(basis) {
            num_block(&batch, &pair, pair.view_mut(target));
        }
    }

    Ok(())
}

fn compute_numerical_mat<G: GridProvider + ?Sized>(
    matrix: &mut DMatrix<f64>,
    basis: &BasisSet,
    molecule: &Molecule,
    provider: &G,
    config: &GridConfig,
    potential: Option<&dyn Potential>,
) -> Result<()> {
    blocks::check_shape(basis, matrix)?;
    basis.validate()?;
    if molecule.is_empty() && basis.n_shells() > 0 {
        return Err(IntegralError::NoAtoms {
            shells: basis.n_shells(),
        });
    }
    let n = basis.num_carts();
    log::debug!(
        "computing numerical {} matrix for {} shells on {} atoms",
        if potential.is_some() { "potential" } else { "overlap" },
        basis.n_shells(),
        molecule.len()
    );

    // summed into scratch space so a failing atom leaves `matrix` untouched
    #[cfg(feature = "rayon")]
    let contributions = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        (0..molecule.len())
            .into_par_iter()
            .map(|atom_index| {
                let mut partial = DMatrix::zeros(n, n);
                atom_contribution(
                    &mut partial,
                    basis,
                    molecule,
                    provider,
                    config,
                    potential,
                    atom_index,
                )?;
                Ok::<_, IntegralError>(partial)
            })
            .try_reduce(|| DMatrix::zeros(n, n), |a, b| Ok(a + b))?
    };

    #[cfg(not(feature = "rayon"))]
    let contributions = {
        let mut contributions = DMatrix::zeros(n, n);
        for atom_index in 0..molecule.len() {
            atom_contribution(
                &mut contributions,
                basis,
                molecule,
                provider,
                config,
                potential,
                atom_index,
            )?;
        }
        contributions
    };

    *matrix += contributions;
    log::trace!("numerical matrix: {matrix:0.6}");
    Ok(())
}

/// Adds the numerically integrated overlap matrix of `basis` to `matrix`,
/// which must be `num_carts × num_carts` and is normally zero on entry.
pub fn compute_numerical_overlap_mat<G: GridProvider + ?Sized>(
    matrix: &mut DMatrix<f64>,
    basis: &BasisSet,
    molecule: &Molecule,
    provider: &G,
    config: &GridConfig,
) -> Result<()> {
    compute_numerical_mat(matrix, basis, molecule, provider, config, None)
}

/// Adds the matrix of `potential` between all pairs of basis functions to
/// `matrix`, integrated on the same grids as the numerical overlap.
pub fn compute_cap_mat<G: GridProvider + ?Sized>(
    matrix: &mut DMatrix<f64>,
    basis: &BasisSet,
    molecule: &Molecule,
    provider: &G,
    config: &GridConfig,
    potential: &dyn Potential,
) -> Result<()> {
    compute_numerical_mat(matrix, basis, molecule, provider, config, Some(potential))
}
