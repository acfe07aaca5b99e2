use std::fmt;

/// Precondition violations detected by the integral engine.
///
/// Every check runs before the first write into a result matrix, so a call
/// that returns one of these leaves the caller's matrix untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegralError {
    /// The result matrix is not `n_basis × n_basis`.
    MatrixShape {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// The grid provider produced no points for an atom.
    EmptyGrid { atom: usize },
    /// The grid provider produced point and weight arrays of different length.
    GridSize {
        atom: usize,
        points: usize,
        weights: usize,
    },
    /// The grid provider rejected the grid request.
    InvalidGridSpec(String),
    /// A primitive exponent is zero, negative or not finite.
    InvalidExponent { shell: usize, exponent: f64 },
    /// A shell has no primitives.
    EmptyShell { shell: usize },
    /// Numerical integration of a non-empty basis was requested on a molecule
    /// without atoms, so there is no grid to integrate on.
    NoAtoms { shells: usize },
}

impl fmt::Display for IntegralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegralError::MatrixShape { expected, found } => write!(
                f,
                "result matrix has shape {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            IntegralError::EmptyGrid { atom } => {
                write!(f, "quadrature grid of atom {atom} has no points")
            }
            IntegralError::GridSize {
                atom,
                points,
                weights,
            } => write!(
                f,
                "quadrature grid of atom {atom} has {points} points but {weights} weights"
            ),
            IntegralError::InvalidGridSpec(reason) => {
                write!(f, "invalid grid request: {reason}")
            }
            IntegralError::InvalidExponent { shell, exponent } => {
                write!(f, "shell {shell} has invalid exponent {exponent}")
            }
            IntegralError::EmptyShell { shell } => write!(f, "shell {shell} has no primitives"),
            IntegralError::NoAtoms { shells } => write!(
                f,
                "basis set has {shells} shells but the molecule has no atoms to place grids on"
            ),
        }
    }
}

impl std::error::Error for IntegralError {}

pub type Result<T, E = IntegralError> = std::result::Result<T, E>;
