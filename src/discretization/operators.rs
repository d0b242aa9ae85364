//! Finite-volume derivative operators in z
//!
//! # Stencils
//!
//! On a uniform grid of N cells of width Δz:
//!
//! ```text
//! D1 (backward / upwind)           D2 (central)
//! ┌                     ┐          ┌                          ┐
//! │  0   0   0  …   0   │ ← inlet  │ -2   1   0  …   0        │ ← ghost cell
//! │ -1   1   0  …   0   │          │  1  -2   1  …   0        │
//! │  0  -1   1  …   0   │  / Δz    │  …   …   …  …   …        │ / Δz²
//! │  0   …   0 -1   1   │          │  0   …   0   1   1       │ ← outlet
//! └                     ┘          └                          ┘
//! ```
//!
//! - The first row of D1 is zero: the inlet convection term is added explicitly
//!   by the column right-hand side against the instantaneous feed.
//! - D2[0,0] = -2/Δz² approximates a Dirichlet ghost cell at the inlet.
//! - D2[N-1,N-1] = 1/Δz² is the Danckwerts-type (zero-gradient) outlet.
//!
//! Both operators are built once per run and only read afterwards.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{ChromError, Result};

/// First and second derivative operators of one grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridOperators {
    /// First derivative (upwind), N × N
    pub d1: CsrMatrix<f64>,

    /// Second derivative (central), N × N
    pub d2: CsrMatrix<f64>,
}

impl GridOperators {
    /// Number of grid cells
    pub fn n_cells(&self) -> usize {
        self.d1.nrows()
    }

    /// ∂c/∂z for every column of `c` (`[N × Ns]`)
    pub fn gradient(&self, c: &DMatrix<f64>) -> DMatrix<f64> {
        &self.d1 * c
    }

    /// ∂²c/∂z² for every column of `c` (`[N × Ns]`)
    pub fn laplacian(&self, c: &DMatrix<f64>) -> DMatrix<f64> {
        &self.d2 * c
    }
}

/// Builds both operators for `n_cells` cells of width `dz`
///
/// # Errors
///
/// Configuration error if `n_cells == 0` or `dz` is not a positive finite number.
///
/// # Example
///
/// ```rust
/// use chromosim::discretization::build_operators;
///
/// let ops = build_operators(5, 0.01).unwrap();
/// assert_eq!(ops.d1.nrows(), 5);
/// assert_eq!(ops.d2.ncols(), 5);
/// ```
pub fn build_operators(n_cells: usize, dz: f64) -> Result<GridOperators> {
    Ok(GridOperators {
        d1: first_derivative(n_cells, dz)?,
        d2: second_derivative(n_cells, dz)?,
    })
}

/// Backward-difference operator with a zeroed inlet row
pub fn first_derivative(n_cells: usize, dz: f64) -> Result<CsrMatrix<f64>> {
    check_grid(n_cells, dz)?;
    let inv_dz = 1.0 / dz;

    let mut coo = CooMatrix::new(n_cells, n_cells);
    for i in 1..n_cells {
        coo.push(i, i - 1, -inv_dz);
        coo.push(i, i, inv_dz);
    }

    Ok(CsrMatrix::from(&coo))
}

/// Central second-difference operator with ghost-cell inlet and Danckwerts outlet
///
/// With a single cell the only row is both inlet and outlet; the outlet
/// treatment wins.
pub fn second_derivative(n_cells: usize, dz: f64) -> Result<CsrMatrix<f64>> {
    check_grid(n_cells, dz)?;
    let inv_dz2 = 1.0 / (dz * dz);
    let last = n_cells - 1;

    let mut coo = CooMatrix::new(n_cells, n_cells);
    for i in 0..n_cells {
        if i > 0 {
            coo.push(i, i - 1, inv_dz2);
        }
        let diagonal = if i == last { inv_dz2 } else { -2.0 * inv_dz2 };
        coo.push(i, i, diagonal);
        if i < last {
            coo.push(i, i + 1, inv_dz2);
        }
    }

    Ok(CsrMatrix::from(&coo))
}

fn check_grid(n_cells: usize, dz: f64) -> Result<()> {
    if n_cells == 0 {
        return Err(ChromError::config("number of cells must be > 0, got 0"));
    }
    if !(dz.is_finite() && dz > 0.0) {
        return Err(ChromError::config(format!(
            "cell length must be a positive finite number, got {dz}"
        )));
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(m: &CsrMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from(m)
    }

    const GRIDS: [(usize, f64); 4] = [(2, 0.5), (5, 0.01), (17, 3.0e-4), (80, 0.025 / 80.0)];

    #[test]
    fn test_d1_first_row_is_zero() {
        for (n, dz) in GRIDS {
            let d1 = dense(&first_derivative(n, dz).unwrap());
            assert!(d1.row(0).iter().all(|&v| v == 0.0), "n={n}");
        }
    }

    #[test]
    fn test_d1_interior_rows_are_backward_differences() {
        for (n, dz) in GRIDS {
            let d1 = dense(&first_derivative(n, dz).unwrap());
            for i in 1..n {
                for j in 0..n {
                    let expected = if j + 1 == i {
                        -1.0 / dz
                    } else if j == i {
                        1.0 / dz
                    } else {
                        0.0
                    };
                    assert_eq!(d1[(i, j)], expected, "D1[{i},{j}] for n={n}");
                }
            }
        }
    }

    #[test]
    fn test_d2_boundary_diagonals() {
        for (n, dz) in GRIDS {
            let d2 = dense(&second_derivative(n, dz).unwrap());
            assert_eq!(d2[(0, 0)], -2.0 / (dz * dz));
            assert_eq!(d2[(n - 1, n - 1)], 1.0 / (dz * dz));
        }
    }

    #[test]
    fn test_d2_interior_rows_sum_to_zero() {
        for (n, dz) in GRIDS {
            let d2 = dense(&second_derivative(n, dz).unwrap());
            for i in 1..n - 1 {
                assert_eq!(d2.row(i).sum(), 0.0, "row {i} of n={n}");
            }
        }
    }

    #[test]
    fn test_d2_symmetric_apart_from_boundary_rows() {
        for (n, dz) in GRIDS {
            let d2 = dense(&second_derivative(n, dz).unwrap());
            for i in 1..n - 1 {
                for j in 1..n - 1 {
                    assert_eq!(d2[(i, j)], d2[(j, i)]);
                }
            }
        }
    }

    #[test]
    fn test_single_cell_grid() {
        let ops = build_operators(1, 0.1).unwrap();
        assert_eq!(ops.d1.nnz(), 0);
        let d2 = dense(&ops.d2);
        assert_eq!(d2[(0, 0)], 1.0 / (0.1 * 0.1));
    }

    #[test]
    fn test_rejects_invalid_grid() {
        assert!(matches!(build_operators(0, 0.1), Err(ChromError::Configuration(_))));
        assert!(matches!(build_operators(5, 0.0), Err(ChromError::Configuration(_))));
        assert!(matches!(build_operators(5, -1.0), Err(ChromError::Configuration(_))));
        assert!(matches!(build_operators(5, f64::NAN), Err(ChromError::Configuration(_))));
    }

    #[test]
    fn test_building_twice_is_bit_identical() {
        let a = build_operators(40, 6.25e-4).unwrap();
        let b = build_operators(40, 6.25e-4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.d2.values(), b.d2.values());
    }

    #[test]
    fn test_gradient_of_linear_profile() {
        // c = z on interior cells → ∂c/∂z = 1 away from the inlet row
        let dz = 0.1;
        let ops = build_operators(6, dz).unwrap();
        let c = DMatrix::from_fn(6, 2, |i, _| i as f64 * dz);
        let grad = ops.gradient(&c);
        assert_eq!(grad[(0, 0)], 0.0);
        for i in 1..6 {
            approx::assert_relative_eq!(grad[(i, 1)], 1.0, epsilon = 1e-12);
        }
    }
}
