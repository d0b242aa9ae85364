//! Trajectory reshaping
//!
//! Solvers return one flat state per time point. Analysis code wants the
//! mobile and bound phases as `(time, cell, species)` arrays.

use nalgebra::DMatrix;
use ndarray::{Array3, Axis};

use crate::error::{ChromError, Result};

/// Mobile and bound phases of a trajectory, each of shape `(Nt, N, Ns)`
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedTrajectory {
    /// Mobile phase `c[t, cell, species]`
    pub mobile: Array3<f64>,
    /// Bound phase `q[t, cell, species]`
    pub bound: Array3<f64>,
}

impl UnpackedTrajectory {
    /// Number of time points
    pub fn n_times(&self) -> usize {
        self.mobile.len_of(Axis(0))
    }

    /// Number of grid cells
    pub fn n_cells(&self) -> usize {
        self.mobile.len_of(Axis(1))
    }

    /// Number of species
    pub fn n_species(&self) -> usize {
        self.mobile.len_of(Axis(2))
    }

    /// Rescales both phases back to physical units
    pub fn to_physical(&self, mobile_scale: f64, bound_scale: f64) -> Self {
        Self {
            mobile: &self.mobile * mobile_scale,
            bound: &self.bound * bound_scale,
        }
    }
}

/// Splits an `[Nt × 2·N·Ns]` trajectory into its two phases
///
/// Row `k` of `trajectory` is the flat state at the k-th time point, laid out
/// as described in [`StateLayout`](crate::physics::StateLayout).
///
/// # Errors
///
/// Configuration error when `n_cells` or `n_species` is zero, shape error
/// when the column count is not `2·N·Ns`.
///
/// # Example
///
/// ```rust
/// use chromosim::output::unpack_state;
/// use nalgebra::DMatrix;
///
/// // 2 time points, 3 cells, 2 species
/// let trajectory = DMatrix::from_fn(2, 12, |t, j| (10 * t + j) as f64);
/// let unpacked = unpack_state(&trajectory, 3, 2).unwrap();
///
/// assert_eq!(unpacked.mobile.shape(), &[2, 3, 2]);
/// assert_eq!(unpacked.mobile[[1, 2, 1]], 15.0);
/// assert_eq!(unpacked.bound[[0, 0, 0]], 6.0);
/// ```
pub fn unpack_state(trajectory: &DMatrix<f64>, n_cells: usize, n_species: usize) -> Result<UnpackedTrajectory> {
    if n_cells == 0 {
        return Err(ChromError::config("number of cells must be > 0"));
    }
    if n_species == 0 {
        return Err(ChromError::config("number of species must be > 0"));
    }

    let block = n_cells * n_species;
    if trajectory.ncols() != 2 * block {
        return Err(ChromError::shape("trajectory columns", 2 * block, trajectory.ncols()));
    }

    let shape = (trajectory.nrows(), n_cells, n_species);
    let mobile = Array3::from_shape_fn(shape, |(t, cell, s)| trajectory[(t, cell * n_species + s)]);
    let bound = Array3::from_shape_fn(shape, |(t, cell, s)| trajectory[(t, block + cell * n_species + s)]);

    Ok(UnpackedTrajectory { mobile, bound })
}
