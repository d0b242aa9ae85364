//! Physical models traits and types
//!
//! This module defines the core API for physical models:
//! - `PhysicalModel`: trait for all physical models
//! - `PhysicalQuantity`: type-safe identifiers for the blocks of the state vector

use nalgebra::DVector;

use crate::discretization::JacobianSparsity;
use crate::error::Result;

// =================================================================================================
// Physical quantities (Type-safe Identifiers)
// =================================================================================================

/// Known physical quantities carried by a column state (type-safe enum)
///
/// The flat state vector is split in two blocks of equal length, one per
/// quantity. [`StateLayout`](crate::physics::StateLayout) maps a quantity to
/// its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalQuantity {
    /// Mobile phase concentration (fluid-carried), scaled by the mobile scale
    MobilePhase,

    /// Bound phase amount (adsorbed on the stationary phase), scaled by the bound scale
    BoundPhase,
}

impl PhysicalQuantity {
    /// Position of the quantity's block in the flat state vector
    pub fn block(&self) -> usize {
        match self {
            PhysicalQuantity::MobilePhase => 0,
            PhysicalQuantity::BoundPhase => 1,
        }
    }
}

impl std::fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicalQuantity::MobilePhase => write!(f, "mobile phase"),
            PhysicalQuantity::BoundPhase => write!(f, "bound phase"),
        }
    }
}

// ==================================================================================================
// Physical Model Trait
// =================================================================================================

/// Trait for physical models
///
/// # Responsibility
/// Computes the right-hand side f(t, y) of dy/dt = f(t, y) at a given state.
/// Does NOT integrate it (that's the Solver's job).
///
/// The model provides the "physics" (equations), the Solver provides
/// the "numerics" (method to solve them).
///
/// # Call contract
/// Solvers call [`compute_physics`](Self::compute_physics) sequentially and
/// many times per run. Implementations must be pure: no interior mutation,
/// the same `(t, state)` always yields the same derivative.
pub trait PhysicalModel: Send + Sync {
    /// Number of spatial points
    fn points(&self) -> usize;

    /// Number of transported species
    fn species(&self) -> usize {
        1
    }

    /// Length of the flat state vector
    fn state_len(&self) -> usize;

    /// Computes the time derivative of `state` at time `t`
    ///
    /// # Errors
    ///
    /// Implementations return an error when the state (or any profile they
    /// evaluate) does not have the expected shape. Errors are fatal for the
    /// current run.
    fn compute_physics(&self, t: f64, state: &DVector<f64>) -> Result<DVector<f64>>;

    /// Creates the initial state for this physical model
    fn setup_initial_state(&self) -> DVector<f64>;

    /// Structural Jacobian pattern of [`compute_physics`](Self::compute_physics), if known
    ///
    /// Implicit solvers use it as a performance hint; it never depends on state values.
    fn jacobian_sparsity(&self) -> Option<JacobianSparsity> {
        None
    }

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }
}
