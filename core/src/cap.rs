//! Complex absorbing potentials evaluated on the quadrature grid.
use nalgebra::Vector3;

/// A scalar potential integrated between pairs of basis functions.
pub trait Potential: Sync {
    fn eval_pot(&self, point: &Vector3<f64>) -> f64;
}

impl<F> Potential for F
where
    F: Fn(&Vector3<f64>) -> f64 + Sync,
{
    fn eval_pot(&self, point: &Vector3<f64>) -> f64 {
        self(point)
    }
}

/// Box-shaped CAP: quadratic in the distance by which a point lies outside a
/// rectangular box around `origin`, zero inside the box.
///
/// `W(r) = Σ_k (|r_k - o_k| - cap_k)²` over the axes with `|r_k - o_k| > cap_k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxCap {
    /// Onsets along x, y and z in bohr
    pub onsets: Vector3<f64>,
    pub origin: Vector3<f64>,
}

impl BoxCap {
    pub fn new(cap_x: f64, cap_y: f64, cap_z: f64) -> Self {
        Self {
            onsets: Vector3::new(cap_x, cap_y, cap_z),
            origin: Vector3::zeros(),
        }
    }

    pub fn with_origin(self, origin: Vector3<f64>) -> Self {
        Self { origin, ..self }
    }
}

impl Potential for BoxCap {
    fn eval_pot(&self, point: &Vector3<f64>) -> f64 {
        (point - self.origin)
            .iter()
            .zip(self.onsets.iter())
            .map(|(coordinate, onset)| {
                let outside = coordinate.abs() - onset;
                if outside > 0.0 {
                    outside * outside
                } else {
                    0.0
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::{BoxCap, Potential};

    #[test]
    fn zero_inside_the_box() {
        let cap = BoxCap::new(2.0, 3.0, 4.0);
        assert_eq!(cap.eval_pot(&Vector3::zeros()), 0.0);
        assert_eq!(cap.eval_pot(&Vector3::new(-2.0, 2.9, 4.0)), 0.0);
    }

    #[test]
    fn quadratic_outside_the_box() {
        let cap = BoxCap::new(2.0, 3.0, 4.0);
        assert_relative_eq!(cap.eval_pot(&Vector3::new(3.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(cap.eval_pot(&Vector3::new(-4.0, 5.0, -4.5)), 4.0 + 4.0 + 0.25);
    }

    #[test]
    fn shifted_origin() {
        let cap = BoxCap::new(1.0, 1.0, 1.0).with_origin(Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(cap.eval_pot(&Vector3::new(10.5, 0.0, 0.0)), 0.0);
        assert_relative_eq!(cap.eval_pot(&Vector3::new(8.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn closures_are_potentials() {
        let harmonic = |r: &Vector3<f64>| r.norm_squared();
        assert_relative_eq!(harmonic.eval_pot(&Vector3::new(1.0, 2.0, 2.0)), 9.0);
    }
}
