//! Simulation scenario definition
//!
//! A scenario combines a physical model with the state it starts from and,
//! optionally, the structural Jacobian pattern implicit solvers may exploit.
use nalgebra::DVector;

use crate::discretization::JacobianSparsity;
use crate::error::{ChromError, Result};
use crate::physics::traits::PhysicalModel;

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Physical model (equations)
/// - Initial state
/// - Sparsity hint (taken from the model)
///
/// # Design
///
/// The same scenario can be solved with different numerical methods.
/// This is the "WHAT to solve" (not "HOW to solve").
///
/// # Examples
///
/// ```rust
/// use chromosim::models::{ColumnConfig, ColumnModel};
/// use chromosim::solver::Scenario;
///
/// let model = ColumnModel::new(ColumnConfig::ev_aex_single()).unwrap();
/// let scenario = Scenario::new(Box::new(model));
/// assert!(scenario.sparsity().is_some());
/// assert_eq!(scenario.initial_state().len(), 160);
/// ```
pub struct Scenario {
    /// Physical model (equations)
    model: Box<dyn PhysicalModel>,

    /// State at the start of the integration window
    initial_state: DVector<f64>,

    /// Structural Jacobian pattern, if any
    sparsity: Option<JacobianSparsity>,
}

impl Scenario {
    /// Create a scenario starting from the model's own initial state
    pub fn new(model: Box<dyn PhysicalModel>) -> Self {
        let initial_state = model.setup_initial_state();
        let sparsity = model.jacobian_sparsity();
        Self {
            model,
            initial_state,
            sparsity,
        }
    }

    /// Replaces the initial state
    ///
    /// # Errors
    ///
    /// Shape error when `state` does not match the model's state length.
    pub fn with_initial_state(mut self, state: DVector<f64>) -> Result<Self> {
        if state.len() != self.model.state_len() {
            return Err(ChromError::shape("initial state", self.model.state_len(), state.len()));
        }
        self.initial_state = state;
        Ok(self)
    }

    /// Drops the sparsity hint (implicit solvers fall back to dense Jacobians)
    pub fn without_sparsity(mut self) -> Self {
        self.sparsity = None;
        self
    }

    /// Physical model
    pub fn model(&self) -> &dyn PhysicalModel {
        self.model.as_ref()
    }

    /// State at the start of the integration window
    pub fn initial_state(&self) -> &DVector<f64> {
        &self.initial_state
    }

    /// Structural Jacobian pattern, if any
    pub fn sparsity(&self) -> Option<&JacobianSparsity> {
        self.sparsity.as_ref()
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }

    /// Checks that the initial state and the sparsity hint fit the model
    pub fn validate(&self) -> Result<()> {
        let expected = self.model.state_len();
        if self.initial_state.len() != expected {
            return Err(ChromError::shape("initial state", expected, self.initial_state.len()));
        }
        if let Some(sparsity) = &self.sparsity
            && sparsity.dim() != expected
        {
            return Err(ChromError::shape("jacobian sparsity", expected, sparsity.dim()));
        }
        if let Some(index) = self.initial_state.iter().position(|v| !v.is_finite()) {
            return Err(ChromError::NonFinite { step: 0, index });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("state length", &self.initial_state.len())
            .field("sparsity nnz", &self.sparsity.as_ref().map(JacobianSparsity::nnz))
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
