//! Canonical ordering of the Cartesian components of a shell.
//!
//! Components are enumerated with `lx` descending, then `ly` descending, so a
//! d shell is laid out as `xx, xy, xz, yy, yz, zz`. Every matrix produced by
//! this crate indexes the basis functions of a shell in this order.

/// Exponents `(lx, ly, lz)` of the polynomial prefactor `x^lx y^ly z^lz`.
pub type Cartesian = [u32; 3];

/// Number of Cartesian components of a shell with angular momentum `l`.
#[inline(always)]
pub const fn num_carts(l: u32) -> usize {
    ((l + 1) * (l + 2) / 2) as usize
}

/// Returns the components of angular momentum `l` in canonical order.
pub fn cartesian_components(l: u32) -> Vec<Cartesian> {
    let mut components = Vec::with_capacity(num_carts(l));
    for lx in (0..=l).rev() {
        for ly in (0..=l - lx).rev() {
            components.push([lx, ly, l - lx - ly]);
        }
    }
    components
}
