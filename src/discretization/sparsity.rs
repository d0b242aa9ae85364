//! Structural Jacobian pattern of the column right-hand side
//!
//! The pattern only depends on the grid size N and the species count Ns, never
//! on physical values, so it is built once per (N, Ns) and handed to implicit
//! solvers as a performance hint.
//!
//! # Block structure
//!
//! ```text
//!              mobile (N·Ns)          bound (N·Ns)
//!            ┌──────────────────┬──────────────────┐
//!   mobile   │ tri-diagonal per │     diagonal     │
//!            │ species (±Ns)    │                  │
//!            ├──────────────────┼──────────────────┤
//!   bound    │     diagonal     │     diagonal     │
//!            └──────────────────┴──────────────────┘
//! ```
//!
//! With the species-fastest state layout the spatial neighbours of the
//! entry (cell i, species s) sit `Ns` positions before and after it.

use nalgebra_sparse::pattern::SparsityPattern;

use crate::error::{ChromError, Result};

/// Boolean (structure only) Jacobian pattern of size `2·N·Ns` squared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JacobianSparsity {
    n_cells: usize,
    n_species: usize,
    /// Row-major pattern: lane `r` lists the columns of row `r`
    pattern: SparsityPattern,
}

impl JacobianSparsity {
    /// Builds the pattern for `n_cells` cells and `n_species` species
    ///
    /// # Errors
    ///
    /// Configuration error when either count is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chromosim::discretization::JacobianSparsity;
    ///
    /// let sparsity = JacobianSparsity::build(80, 3).unwrap();
    /// assert_eq!(sparsity.dim(), 480);
    /// ```
    pub fn build(n_cells: usize, n_species: usize) -> Result<Self> {
        if n_cells == 0 || n_species == 0 {
            return Err(ChromError::config(format!(
                "sparsity pattern needs at least one cell and one species, got N={n_cells}, Ns={n_species}"
            )));
        }

        let nn = n_cells * n_species;
        let dim = 2 * nn;

        let mut offsets = Vec::with_capacity(dim + 1);
        let mut indices = Vec::with_capacity(4 * nn + 2 * nn);
        offsets.push(0);

        // Mobile rows: spatial stencil on the same species + local bound coupling
        for cell in 0..n_cells {
            for species in 0..n_species {
                let r = cell * n_species + species;
                if cell > 0 {
                    indices.push(r - n_species);
                }
                indices.push(r);
                if cell + 1 < n_cells {
                    indices.push(r + n_species);
                }
                indices.push(nn + r);
                offsets.push(indices.len());
            }
        }

        // Bound rows: purely local
        for r in 0..nn {
            indices.push(r);
            indices.push(nn + r);
            offsets.push(indices.len());
        }

        let pattern = SparsityPattern::try_from_offsets_and_indices(dim, dim, offsets, indices)
            .map_err(|e| ChromError::config(format!("invalid sparsity pattern: {e}")))?;

        log::debug!(
            "Jacobian sparsity built: N={n_cells}, Ns={n_species}, dim={dim}, nnz={}",
            pattern.nnz()
        );

        Ok(Self { n_cells, n_species, pattern })
    }

    /// Side length of the (square) pattern
    pub fn dim(&self) -> usize {
        self.pattern.major_dim()
    }

    /// Grid size the pattern was built for
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Species count the pattern was built for
    pub fn n_species(&self) -> usize {
        self.n_species
    }

    /// Number of structurally non-zero entries
    pub fn nnz(&self) -> usize {
        self.pattern.nnz()
    }

    /// Column indices of the structural non-zeros of `row` (sorted)
    pub fn row_indices(&self, row: usize) -> &[usize] {
        self.pattern.lane(row)
    }

    /// Whether `(row, col)` may be non-zero
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.dim() && self.row_indices(row).binary_search(&col).is_ok()
    }

    /// Underlying row-major pattern
    pub fn pattern(&self) -> &SparsityPattern {
        &self.pattern
    }

    /// Partitions the columns into groups of structurally orthogonal columns
    ///
    /// No two columns in one group share a non-zero row, so a single
    /// perturbation of all columns of a group recovers each of their Jacobian
    /// columns from one right-hand side evaluation. Greedy colouring in
    /// column order.
    pub fn column_groups(&self) -> Vec<Vec<usize>> {
        let dim = self.dim();
        let by_column = self.pattern.transpose();

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut occupied: Vec<Vec<bool>> = Vec::new();

        for col in 0..dim {
            let rows = by_column.lane(col);
            let slot = occupied
                .iter()
                .position(|taken| rows.iter().all(|&r| !taken[r]));

            let group = match slot {
                Some(g) => g,
                None => {
                    occupied.push(vec![false; dim]);
                    groups.push(Vec::new());
                    groups.len() - 1
                }
            };

            for &r in rows {
                occupied[group][r] = true;
            }
            groups[group].push(col);
        }

        groups
    }
}

// =================================================================================================
// Tests
// =================================================================================================
