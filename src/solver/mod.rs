//! Numerical solvers
//!
//! This module provides traits and implementations for numerical solvers.
//! A numerical solver applies a numerical method to solve the equations
//! provided by a physical model within a specific scenario.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Physical model (equations)
//!    - Initial state
//!    - Jacobian sparsity hint
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Solver type (fixed step, adaptive)
//!    - Numerical parameters (time span, step count, tolerances)
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns the trajectory
//!    - Independent of physics
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │  Physical Model │  (equations)
//! └────────┬────────┘
//!          │
//! ┌────────▼──────────────────┐
//! │ Scenario                  │ ← WHAT to solve
//! │ (model + y0 + sparsity)   │
//! └────────┬──────────────────┘
//!          │
//! ┌────────▼─────────────┐
//! │ Solver Configuration │ ← HOW to solve
//! └────────┬─────────────┘
//!          │
//! ┌────────▼────────┐
//! │ Numerical Solver│ ← RK4 (explicit) / SDIRK (implicit)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────────┐
//! │ Simulation Result   │ ← trajectory + metadata
//! └─────────────────────┘
//! ```
//!
//! # Choosing a Solver
//!
//! - **[`RK4Solver`]**: fixed step, four evaluations per step. Stable as long
//!   as the step resolves the fastest adsorption/desorption rate.
//! - **[`SdirkSolver`]**: adaptive and L-stable. Handles the stiff kinetics of
//!   realistic columns with large steps; each Newton matrix costs one LU.
//!
//! # Quick Start Example
//!
//! ```rust
//! use chromosim::models::{ColumnConfig, ColumnModel};
//! use chromosim::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
//!
//! let mut config = ColumnConfig::ev_aex_single();
//! config.n_cells = 10;
//! let model = ColumnModel::new(config).unwrap();
//!
//! let scenario = Scenario::new(Box::new(model));
//! let config = SolverConfiguration::fixed_step(0.0, 60.0, 120);
//!
//! let result = RK4Solver::new().solve(&scenario, &config).unwrap();
//! assert_eq!(result.len(), 121);
//! ```
//!
//! # Error Handling
//!
//! Every solver returns [`crate::Result`]. A NaN or infinite value in an
//! accepted state stops the run with [`ChromError::NonFinite`]; an adaptive
//! solver that cannot make progress stops with [`ChromError::Integration`].

// =================================================================================================
// Module Declarations
// =================================================================================================
mod methods;
mod scenario;
mod traits;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{DEFAULT_MAX_STEPS, SimulationResult, Solver, SolverConfiguration, SolverType};

pub use scenario::Scenario;

pub use methods::{RK4Solver, SdirkSolver};

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DVector;

use crate::error::{ChromError, Result};

/// Validate a state for numerical issues
///
/// Checks that the state does not contain NaN or Inf values, which would
/// indicate numerical instability or errors in the physics computation.
///
/// # Example
///
/// ```rust,ignore
/// validate_state(&state, 42)?;  // Validates state after step 42
/// ```
pub(crate) fn validate_state(state: &DVector<f64>, step: usize) -> Result<()> {
    match state.iter().position(|x| !x.is_finite()) {
        Some(index) => {
            log::warn!(
                "non-finite value {} at index {index} after step {step}",
                state[index]
            );
            Err(ChromError::NonFinite { step, index })
        }
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_state_is_valid() {
        assert!(validate_state(&DVector::from_vec(vec![0.0, -1.0, 1e300]), 3).is_ok());
    }

    #[test]
    fn test_nan_is_reported_with_position() {
        let state = DVector::from_vec(vec![0.0, 1.0, f64::NAN]);
        assert_eq!(validate_state(&state, 7), Err(ChromError::NonFinite { step: 7, index: 2 }));
    }

    #[test]
    fn test_infinity_is_reported() {
        let state = DVector::from_vec(vec![f64::NEG_INFINITY]);
        assert!(matches!(validate_state(&state, 1), Err(ChromError::NonFinite { .. })));
    }
}
