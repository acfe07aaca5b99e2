//! Overlap and complex absorbing potential matrices over Cartesian Gaussian
//! basis sets, analytically (McMurchie–Davidson) and on atom-centered
//! quadrature grids.
pub mod atom;
pub mod basis;
pub mod cap;
pub mod config;
pub mod error;
pub mod grid;
pub mod integrals;
pub mod molecule;
pub mod periodic_table;

pub use error::{IntegralError, Result};
