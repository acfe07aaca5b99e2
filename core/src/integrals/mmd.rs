//! McMurchie Davidon integration scheme for overlap integrals.
//! Reference:
//!
//! [1] Goings, J. Integrals. https://joshuagoings.com/2017/04/28/integrals/
use nalgebra::{DMatrix, DMatrixViewMut, Vector3};

use crate::{
    basis::{cartesian_components, BasisSet, Cartesian, Shell},
    error::Result,
};

use super::{blocks, Integrator};

/// Analytical overlap integrals through the Hermite expansion of Gaussian products.
#[derive(Default, Clone, Copy, Debug)]
pub struct McMurchieDavidson;

impl Integrator for McMurchieDavidson {
    fn overlap_matrix(&self, basis: &BasisSet, matrix: &mut DMatrix<f64>) -> Result<()> {
        compute_analytical_overlap(basis, matrix)
    }
}

/// Hermite expansion coefficient `E_t^{la,lb}` along one axis.
///
/// `dist` is the signed distance `A - B` between the two centers along the
/// axis. Indices outside `0..=la+lb` yield zero.
pub fn hermite_expansion([la, lb, t]: [i32; 3], dist: f64, exp_a: f64, exp_b: f64) -> f64 {
    let p = exp_a + exp_b;
    let q = exp_a * exp_b / p;

    if t < 0 || t > la + lb || la < 0 || lb < 0 {
        0.0
    } else if la == 0 && lb == 0 {
        (-q * dist * dist).exp()
    } else if lb == 0 {
        // decrement la
        (2.0 * p).recip() * hermite_expansion([la - 1, lb, t - 1], dist, exp_a, exp_b)
            - (q * dist / exp_a) * hermite_expansion([la - 1, lb, t], dist, exp_a, exp_b)
            + (t + 1) as f64 * hermite_expansion([la - 1, lb, t + 1], dist, exp_a, exp_b)
    } else {
        // decrement lb
        (2.0 * p).recip() * hermite_expansion([la, lb - 1, t - 1], dist, exp_a, exp_b)
            + (q * dist / exp_b) * hermite_expansion([la, lb - 1, t], dist, exp_a, exp_b)
            + (t + 1) as f64 * hermite_expansion([la, lb - 1, t + 1], dist, exp_a, exp_b)
    }
}

/// All Hermite expansion coefficients `E_t^{i,j}` with `i <= la_max`,
/// `j <= lb_max` for one pair of exponents and one axis.
///
/// Filled bottom-up along the same path the recursion in [`hermite_expansion`]
/// takes, so each entry is computed once.
#[derive(Clone, Debug)]
pub struct HermiteTable {
    data: Vec<f64>,
    lb_max: usize,
    t_len: usize,
}

impl HermiteTable {
    pub fn new(la_max: u32, lb_max: u32, dist: f64, exp_a: f64, exp_b: f64) -> Self {
        let (la_max, lb_max) = (la_max as usize, lb_max as usize);
        let t_len = la_max + lb_max + 1;
        let mut table = Self {
            data: vec![0.0; (la_max + 1) * (lb_max + 1) * t_len],
            lb_max,
            t_len,
        };

        let p = exp_a + exp_b;
        let q = exp_a * exp_b / p;
        let inv_2p = (2.0 * p).recip();
        let pa = q * dist / exp_a;
        let pb = q * dist / exp_b;

        table.data[0] = (-q * dist * dist).exp();

        for i in 0..=la_max {
            if i > 0 {
                for t in 0..=i {
                    let value = inv_2p * table.lower(i - 1, 0, t)
                        - pa * table.get(i - 1, 0, t as i32)
                        + (t + 1) as f64 * table.get(i - 1, 0, t as i32 + 1);
                    let index = table.index(i, 0, t);
                    table.data[index] = value;
                }
            }
            for j in 1..=lb_max {
                for t in 0..=i + j {
                    let value = inv_2p * table.lower(i, j - 1, t)
                        + pb * table.get(i, j - 1, t as i32)
                        + (t + 1) as f64 * table.get(i, j - 1, t as i32 + 1);
                    let index = table.index(i, j, t);
                    table.data[index] = value;
                }
            }
        }

        table
    }

    /// `E_t^{i,j}`, zero for `t` outside `0..=i+j`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize, t: i32) -> f64 {
        if t < 0 || t as usize > i + j {
            0.0
        } else {
            self.data[self.index(i, j, t as usize)]
        }
    }

    /// `E_{t-1}^{i,j}`
    #[inline(always)]
    fn lower(&self, i: usize, j: usize, t: usize) -> f64 {
        self.get(i, j, t as i32 - 1)
    }

    #[inline(always)]
    fn index(&self, i: usize, j: usize, t: usize) -> usize {
        (i * (self.lb_max + 1) + j) * self.t_len + t
    }
}

/// Overlap between two primitive Cartesian gaussians with unit coefficients.
pub fn gauss_integral(
    exp_a: f64,
    cart_a: Cartesian,
    origin_a: &Vector3<f64>,
    exp_b: f64,
    cart_b: Cartesian,
    origin_b: &Vector3<f64>,
) -> f64 {
    let diff = origin_a - origin_b;

    (0..3)
        .map(|axis| {
            hermite_expansion(
                [cart_a[axis] as i32, cart_b[axis] as i32, 0],
                diff[axis],
                exp_a,
                exp_b,
            )
        })
        .product::<f64>()
        * (std::f64::consts::PI / (exp_a + exp_b)).powf(1.5)
}

/// Overlap between one Cartesian component of each of two contracted shells.
///
/// Coefficients are used as stored; normalization is the job of
/// [`Shell::normalize`].
pub fn overlap_integral(
    shell_a: &Shell,
    cart_a: Cartesian,
    shell_b: &Shell,
    cart_b: Cartesian,
) -> f64 {
    let mut output = 0.0;
    let primitives = itertools::iproduct!(shell_a.primitives(), shell_b.primitives());
    for (primitive_a, primitive_b) in primitives {
        output += primitive_a.coefficient
            * primitive_b.coefficient
            * gauss_integral(
                primitive_a.exponent,
                cart_a,
                &shell_a.origin,
                primitive_b.exponent,
                cart_b,
                &shell_b.origin,
            );
    }
    output
}

/// Writes the overlap integrals between all Cartesian components of two shells
/// into `block`, which must be `num_carts(a) × num_carts(b)`.
///
/// Equivalent to calling [`overlap_integral`] for every pair of components,
/// but the Hermite coefficients of a primitive pair are shared between all
/// component pairs.
pub fn shell_overlap(shell_a: &Shell, shell_b: &Shell, mut block: DMatrixViewMut<'_, f64>) {
    debug_assert_eq!(block.shape(), (shell_a.num_carts(), shell_b.num_carts()));

    let order_a = cartesian_components(shell_a.angular_momentum);
    let order_b = cartesian_components(shell_b.angular_momentum);
    let (la, lb) = (shell_a.angular_momentum, shell_b.angular_momentum);
    let diff = shell_a.origin - shell_b.origin;

    block.fill(0.0);
    let primitives = itertools::iproduct!(shell_a.primitives(), shell_b.primitives());
    for (primitive_a, primitive_b) in primitives {
        let (exp_a, exp_b) = (primitive_a.exponent, primitive_b.exponent);
        let tables = [0, 1, 2].map(|axis| HermiteTable::new(la, lb, diff[axis], exp_a, exp_b));
        let prefactor = primitive_a.coefficient
            * primitive_b.coefficient
            * (std::f64::consts::PI / (exp_a + exp_b)).powf(1.5);

        for (i, cart_a) in order_a.iter().enumerate() {
            for (j, cart_b) in order_b.iter().enumerate() {
                let integral = (0..3)
                    .map(|axis| tables[axis].get(cart_a[axis] as usize, cart_b[axis] as usize, 0))
                    .product::<f64>();
                block[(i, j)] += prefactor * integral;
            }
        }
    }
}

/// Computes the full overlap matrix of `basis` into `matrix`, which must be
/// `num_carts × num_carts`. Every block is assigned exactly once.
pub fn compute_analytical_overlap(basis: &BasisSet, matrix: &mut DMatrix<f64>) -> Result<()> {
    blocks::check_shape(basis, matrix)?;
    basis.validate()?;
    log::debug!(
        "computing analytical overlap for {} shells ({} basis functions)",
        basis.n_shells(),
        basis.num_carts()
    );

    #[cfg(feature = "rayon")]
    {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        let pairs = blocks::shell_pairs(basis).collect::<Vec<_>>();
        pairs
            .into_par_iter()
            .map(|pair| {
                let (rows, cols) = pair.shape();
                let mut block = DMatrix::zeros(rows, cols);
                shell_overlap(pair.shell_a, pair.shell_b, block.view_mut((0, 0), (rows, cols)));
                (pair, block)
            })
            .collect::<Vec<_>>() // blocks are disjoint, write them back sequentially
            .into_iter()
            .for_each(|(pair, block)| pair.view_mut(matrix).copy_from(&block));
    }

    #[cfg(not(feature = "rayon"))]
    for pair in blocks::shell_pairs(basis) {
        shell_overlap(pair.shell_a, pair.shell_b, pair.view_mut(matrix));
    }

    log::trace!("overlap matrix: {matrix:0.6}");
    Ok(())
}

/// Convenience wrapper that allocates the overlap matrix.
pub fn overlap_matrix(basis: &BasisSet) -> Result<DMatrix<f64>> {
    let n = basis.num_carts();
    let mut matrix = DMatrix::zeros(n, n);
    compute_analytical_overlap(basis, &mut matrix)?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{DMatrix, Vector3};
    use rand::Rng;

    use crate::basis::{cartesian_components, BasisSet, Gaussian, Shell};

    use super::{gauss_integral, hermite_expansion, overlap_integral, shell_overlap, HermiteTable};

    fn s_primitive(origin: Vector3<f64>) -> Shell {
        Shell::new(0, origin, [Gaussian::new(1.0, 1.0)])
    }

    #[test]
    fn base_case() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let exp_a = rng.gen_range(0.01..50.0);
            let exp_b = rng.gen_range(0.01..50.0);
            let dist = rng.gen_range(-5.0..5.0);
            let q = exp_a * exp_b / (exp_a + exp_b);
            assert_eq!(
                hermite_expansion([0, 0, 0], dist, exp_a, exp_b),
                (-q * dist * dist).exp()
            );
        }
    }

    #[test]
    fn out_of_range_index_is_zero() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let exp_a = rng.gen_range(0.01..50.0);
            let exp_b = rng.gen_range(0.01..50.0);
            let dist = rng.gen_range(-5.0..5.0);
            let la = rng.gen_range(0..4);
            let lb = rng.gen_range(0..4);

            assert_eq!(hermite_expansion([la, lb, -1], dist, exp_a, exp_b), 0.0);
            assert_eq!(hermite_expansion([la, lb, la + lb + 1], dist, exp_a, exp_b), 0.0);
            assert_eq!(hermite_expansion([la, lb, -rng.gen_range(2..10)], dist, exp_a, exp_b), 0.0);
        }
    }

    #[test]
    fn first_order_coefficients() {
        // E_0^{1,0} = X_PA * E_0^{0,0} and E_1^{1,0} = E_0^{0,0} / 2p
        let (exp_a, exp_b, dist) = (0.7, 1.3, 0.9);
        let p = exp_a + exp_b;
        let e00 = hermite_expansion([0, 0, 0], dist, exp_a, exp_b);
        let x_pa = -exp_b / p * dist;

        assert_relative_eq!(
            hermite_expansion([1, 0, 0], dist, exp_a, exp_b),
            x_pa * e00,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            hermite_expansion([1, 0, 1], dist, exp_a, exp_b),
            e00 / (2.0 * p),
            max_relative = 1e-14
        );
    }

    #[test]
    fn table_matches_recursion() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let exp_a = rng.gen_range(0.05..20.0);
            let exp_b = rng.gen_range(0.05..20.0);
            let dist = rng.gen_range(-3.0..3.0);
            let table = HermiteTable::new(3, 4, dist, exp_a, exp_b);

            for i in 0..=3 {
                for j in 0..=4 {
                    for t in -1..=(i + j + 1) {
                        let expected = hermite_expansion([i, j, t], dist, exp_a, exp_b);
                        assert_abs_diff_eq!(
                            table.get(i as usize, j as usize, t),
                            expected,
                            epsilon = 1e-14 * expected.abs().max(1.0)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn concentric_s_overlap() {
        let a = s_primitive(Vector3::zeros());
        let b = s_primitive(Vector3::zeros());
        assert_relative_eq!(
            overlap_integral(&a, [0, 0, 0], &b, [0, 0, 0]),
            (std::f64::consts::PI / 2.0).powf(1.5),
            max_relative = 1e-14
        );
        assert_relative_eq!(
            overlap_integral(&a, [0, 0, 0], &b, [0, 0, 0]),
            1.96870,
            epsilon = 1e-5
        );
    }

    #[test]
    fn displaced_s_overlap() {
        let a = s_primitive(Vector3::zeros());
        let b = s_primitive(Vector3::new(0.0, 0.0, 2.0));
        let expected = (std::f64::consts::PI / 2.0).powf(1.5) * (-0.5f64 * 4.0).exp();

        let overlap = overlap_integral(&a, [0, 0, 0], &b, [0, 0, 0]);
        assert_relative_eq!(overlap, expected, max_relative = 1e-14);
        assert_relative_eq!(overlap, 0.26644, epsilon = 1e-5);
    }

    #[test]
    fn primitive_overlap_values() {
        // reference values with both gaussians at unit exponent, one bohr apart along x
        let origin = Vector3::zeros();
        let shifted = Vector3::new(1.0, 0.0, 0.0);

        assert_relative_eq!(
            gauss_integral(1.0, [0, 0, 0], &origin, 1.0, [0, 0, 0], &shifted),
            1.194077663824459,
            max_relative = 1e-12
        );
        assert_abs_diff_eq!(
            gauss_integral(1.0, [1, 0, 0], &origin, 1.0, [1, 0, 0], &shifted),
            0.0,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            gauss_integral(1.0, [0, 1, 0], &origin, 1.0, [0, 1, 0], &shifted),
            0.29851941595611475,
            max_relative = 1e-12
        );
    }

    #[test]
    fn p_shell_self_block_is_diagonal() {
        let shell = Shell::new(
            1,
            Vector3::new(0.3, -0.2, 1.0),
            [Gaussian::new(0.9, 1.0), Gaussian::new(0.2, 0.5)],
        );
        let mut block = DMatrix::zeros(3, 3);
        shell_overlap(&shell, &shell, block.view_mut((0, 0), (3, 3)));

        for i in 0..3 {
            assert!(block[(i, i)] > 0.0);
            for j in 0..3 {
                if i != j {
                    assert_abs_diff_eq!(block[(i, j)], 0.0, epsilon = 1e-14);
                }
            }
        }
        assert_relative_eq!(block[(0, 0)], block[(1, 1)], max_relative = 1e-14);
        assert_relative_eq!(block[(1, 1)], block[(2, 2)], max_relative = 1e-14);
    }

    #[test]
    fn block_matches_single_integrals() {
        let d = Shell::new(
            2,
            Vector3::new(0.0, 0.4, -0.3),
            [Gaussian::new(1.1, 0.7), Gaussian::new(0.35, 0.4)],
        );
        let f = Shell::new(3, Vector3::new(0.5, -0.1, 0.8), [Gaussian::new(0.6, 1.0)]);

        let mut block = DMatrix::zeros(6, 10);
        shell_overlap(&d, &f, block.view_mut((0, 0), (6, 10)));

        for (i, cart_a) in cartesian_components(2).into_iter().enumerate() {
            for (j, cart_b) in cartesian_components(3).into_iter().enumerate() {
                let expected = overlap_integral(&d, cart_a, &f, cart_b);
                let tolerance = 1e-13 * expected.abs().max(1.0);
                assert_abs_diff_eq!(block[(i, j)], expected, epsilon = tolerance);
            }
        }
    }

    #[test]
    fn blocks_are_transposes() {
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let (la, lb) = (rng.gen_range(0..4), rng.gen_range(0..4));
            let a = Shell::new(
                la,
                Vector3::from_fn(|_, _| rng.gen_range(-1.0..1.0)),
                [
                    Gaussian::new(rng.gen_range(0.1..5.0), 1.0),
                    Gaussian::new(rng.gen_range(0.1..5.0), 0.5),
                ],
            );
            let b = Shell::new(
                lb,
                Vector3::from_fn(|_, _| rng.gen_range(-1.0..1.0)),
                [Gaussian::new(rng.gen_range(0.1..5.0), 0.8)],
            );

            let (na, nb) = (a.num_carts(), b.num_carts());
            let mut ab = DMatrix::zeros(na, nb);
            let mut ba = DMatrix::zeros(nb, na);
            shell_overlap(&a, &b, ab.view_mut((0, 0), (na, nb)));
            shell_overlap(&b, &a, ba.view_mut((0, 0), (nb, na)));

            for i in 0..na {
                for j in 0..nb {
                    assert_relative_eq!(
                        ab[(i, j)],
                        ba[(j, i)],
                        epsilon = 1e-14,
                        max_relative = 1e-10
                    );
                }
            }
        }
    }

    #[test]
    fn normalized_basis_has_unit_diagonal_for_s_and_p() {
        let mut basis = BasisSet::new(vec![
            Shell::new(
                0,
                Vector3::zeros(),
                [
                    Gaussian::new(3.4, 0.15),
                    Gaussian::new(0.62, 0.53),
                    Gaussian::new(0.17, 0.44),
                ],
            ),
            Shell::new(
                1,
                Vector3::new(0.0, 0.0, 1.4),
                [Gaussian::new(1.1, 0.6), Gaussian::new(0.3, 0.4)],
            ),
            Shell::new(2, Vector3::new(0.0, 0.0, 1.4), [Gaussian::new(0.8, 1.0)]),
        ]);
        basis.normalize();

        let overlap = super::overlap_matrix(&basis).unwrap();
        for i in 0..4 {
            assert_relative_eq!(overlap[(i, i)], 1.0, max_relative = 1e-12);
        }
        // d shell: xx, xy, xz, yy, yz, zz
        let d = 4;
        assert_relative_eq!(overlap[(d, d)], 1.0, max_relative = 1e-12);
        assert_relative_eq!(overlap[(d + 1, d + 1)], 1.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(overlap[(d + 3, d + 3)], 1.0, max_relative = 1e-12);
        assert_relative_eq!(overlap[(d, d + 3)], 1.0 / 3.0, max_relative = 1e-12);
    }
}
