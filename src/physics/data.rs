//! Flat state layout
//!
//! The integrator sees the column state as one flat vector of length
//! `2 · N · Ns`. This module owns the index arithmetic between that flat
//! vector and the `[N × Ns]` (cell × species) views used by the physics.
//!
//! # Memory Layout
//!
//! ```text
//! y = [ c(0,0) c(0,1) … c(0,Ns-1)  c(1,0) … c(N-1,Ns-1) │ q(0,0) … q(N-1,Ns-1) ]
//!       └──────── mobile phase block (N·Ns) ───────────┘ └── bound block (N·Ns) ─┘
//! ```
//!
//! Species is the fastest-varying index inside each block.

use std::ops::Range;

use nalgebra::{DMatrix, DVector};

use crate::error::{ChromError, Result};
use crate::physics::PhysicalQuantity;

/// Index mapping between the flat state vector and `(quantity, cell, species)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    n_cells: usize,
    n_species: usize,
}

impl StateLayout {
    /// Creates a layout for `n_cells` cells and `n_species` species
    ///
    /// # Errors
    ///
    /// Configuration error when either count is zero.
    pub fn new(n_cells: usize, n_species: usize) -> Result<Self> {
        if n_cells == 0 {
            return Err(ChromError::config("number of cells must be > 0"));
        }
        if n_species == 0 {
            return Err(ChromError::config("number of species must be > 0"));
        }
        Ok(Self { n_cells, n_species })
    }

    /// Number of grid cells N
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Number of species Ns
    pub fn n_species(&self) -> usize {
        self.n_species
    }

    /// Length of one block (N · Ns)
    pub fn block_len(&self) -> usize {
        self.n_cells * self.n_species
    }

    /// Length of the full state vector (2 · N · Ns)
    pub fn state_len(&self) -> usize {
        2 * self.block_len()
    }

    /// Flat index of `(quantity, cell, species)`
    pub fn index(&self, quantity: PhysicalQuantity, cell: usize, species: usize) -> usize {
        debug_assert!(cell < self.n_cells && species < self.n_species);
        quantity.block() * self.block_len() + cell * self.n_species + species
    }

    /// Range of the flat vector holding `quantity`
    pub fn range(&self, quantity: PhysicalQuantity) -> Range<usize> {
        let start = quantity.block() * self.block_len();
        start..start + self.block_len()
    }

    /// Extracts one block as an `[N × Ns]` matrix
    pub fn block(&self, state: &DVector<f64>, quantity: PhysicalQuantity) -> Result<DMatrix<f64>> {
        self.check(state)?;
        Ok(DMatrix::from_row_slice(
            self.n_cells,
            self.n_species,
            &state.as_slice()[self.range(quantity)],
        ))
    }

    /// Splits a state into its `(mobile, bound)` `[N × Ns]` matrices
    pub fn split(&self, state: &DVector<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        Ok((
            self.block(state, PhysicalQuantity::MobilePhase)?,
            self.block(state, PhysicalQuantity::BoundPhase)?,
        ))
    }

    /// Inverse of [`split`](Self::split)
    pub fn join(&self, mobile: &DMatrix<f64>, bound: &DMatrix<f64>) -> Result<DVector<f64>> {
        for block in [mobile, bound] {
            if block.shape() != (self.n_cells, self.n_species) {
                return Err(ChromError::shape(
                    "state block",
                    self.block_len(),
                    block.nrows() * block.ncols(),
                ));
            }
        }
        // nalgebra is column-major; iterating the transpose walks rows first.
        let values = mobile
            .transpose()
            .iter()
            .chain(bound.transpose().iter())
            .copied()
            .collect::<Vec<f64>>();
        Ok(DVector::from_vec(values))
    }

    /// All-zero state (empty column)
    pub fn zeros(&self) -> DVector<f64> {
        DVector::zeros(self.state_len())
    }

    /// Checks the length of a flat state vector
    pub fn check(&self, state: &DVector<f64>) -> Result<()> {
        if state.len() != self.state_len() {
            return Err(ChromError::shape("state vector", self.state_len(), state.len()));
        }
        Ok(())
    }
}

// ==================== Tests ====================
