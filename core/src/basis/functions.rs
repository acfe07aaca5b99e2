use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::cartesian::{num_carts, Cartesian};

/// Primitive of the form K*exp(-alpha*r^2)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub exponent: f64,
    /// The contraction coefficient of this gaussian and optionally the normalization constant
    pub coefficient: f64,
}

impl Gaussian {
    pub fn new(exponent: f64, coefficient: f64) -> Self {
        Self {
            exponent,
            coefficient,
        }
    }

    /// Normalization constant of the `(l, 0, 0)` component of a primitive.
    pub fn norm(exponent: f64, l: u32) -> f64 {
        (std::f64::consts::FRAC_2_PI * exponent).powf(0.75)
            * (4.0 * exponent).powf(l as f64 / 2.0)
            / double_factorial(2 * l as i32 - 1).sqrt()
    }
}

/// Linear combination of many [`Gaussian`]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractedGaussian(pub SmallVec<[Gaussian; 6]>);

/// A contracted Gaussian shell: all Cartesian components of one angular
/// momentum sharing a center and a contraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    pub(crate) angular_momentum: u32,
    /// The position of this shell, in bohr
    pub(crate) origin: Vector3<f64>,
    pub(crate) contraction: ContractedGaussian,
}

impl Shell {
    pub fn new(
        angular_momentum: u32,
        origin: Vector3<f64>,
        primitives: impl IntoIterator<Item = Gaussian>,
    ) -> Self {
        Self {
            angular_momentum,
            origin,
            contraction: ContractedGaussian(primitives.into_iter().collect()),
        }
    }

    pub fn angular_momentum(&self) -> u32 {
        self.angular_momentum
    }

    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    pub fn primitives(&self) -> &[Gaussian] {
        &self.contraction.0
    }

    pub fn num_prims(&self) -> usize {
        self.contraction.0.len()
    }

    pub fn num_carts(&self) -> usize {
        num_carts(self.angular_momentum)
    }

    pub fn exponents(&self) -> impl Iterator<Item = f64> + '_ {
        self.contraction.0.iter().map(|primitive| primitive.exponent)
    }

    pub fn coefficients(&self) -> impl Iterator<Item = f64> + '_ {
        self.contraction.0.iter().map(|primitive| primitive.coefficient)
    }

    /// Evaluate the Cartesian component `cart` of this shell at a given position
    pub fn evaluate(&self, at: &Vector3<f64>, cart: Cartesian) -> f64 {
        let [lx, ly, lz] = cart;
        let d = at - self.origin;
        let r2 = d.norm_squared();

        let radial = self
            .contraction
            .0
            .iter()
            .map(|primitive| primitive.coefficient * (-primitive.exponent * r2).exp())
            .sum::<f64>();

        d.x.powi(lx as i32) * d.y.powi(ly as i32) * d.z.powi(lz as i32) * radial
    }

    /// Scales the contraction so the `(l, 0, 0)` component has unit self-overlap.
    ///
    /// Coefficients are first multiplied by the primitive normalization
    /// constants; the remaining components of the shell share these
    /// coefficients and are therefore not unit-normalized for `l > 1`.
    pub fn normalize(&mut self) {
        let l = self.angular_momentum;
        for primitive in self.contraction.0.iter_mut() {
            primitive.coefficient *= Gaussian::norm(primitive.exponent, l);
        }

        let self_overlap = self.self_overlap();
        if self_overlap > 0.0 {
            let scale = self_overlap.sqrt().recip();
            for primitive in self.contraction.0.iter_mut() {
                primitive.coefficient *= scale;
            }
        }
    }

    /// Self-overlap of the `(l, 0, 0)` component with the current coefficients.
    fn self_overlap(&self) -> f64 {
        let l = self.angular_momentum;
        let polynomial = double_factorial(2 * l as i32 - 1);

        itertools::iproduct!(self.primitives(), self.primitives())
            .map(|(a, b)| {
                let p = a.exponent + b.exponent;
                a.coefficient
                    * b.coefficient
                    * polynomial
                    * (2.0 * p).powi(-(l as i32))
                    * (std::f64::consts::PI / p).powf(1.5)
            })
            .sum()
    }
}

/// n!! with the convention (-1)!! = 0!! = 1
pub(crate) fn double_factorial(n: i32) -> f64 {
    (1..=n).rev().step_by(2).map(|k| k as f64).product()
}
