//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! This module follows the same pattern as `PhysicalQuantity`:
//! - Central enum `SolverType` defines the kind of time integration
//! - `SolverConfiguration` carries the parameters for that kind
//! - `SimulationResult` holds the trajectory plus free-form metadata
//!
//! # Stability Guarantee
//!
//! - `Solver` trait: stable, only the return type carries solver errors
//! - `SolverType` enum: extensible (new variants can be added)

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use crate::error::{ChromError, Result};
use crate::models::IntegrationSettings;
use crate::solver::Scenario;

/// Default bound on the number of steps (accepted + rejected) of one run
pub const DEFAULT_MAX_STEPS: usize = 500_000;

// =================================================================================================
// Central Solver Type Enumeration
// =================================================================================================

/// Kind of time integration
///
/// # Examples
///
/// ```rust
/// use chromosim::solver::SolverType;
///
/// // Fixed step: dt = (t_end - t_start) / time_steps
/// let fixed = SolverType::FixedStep { t_start: 0.0, t_end: 600.0, time_steps: 1200 };
///
/// // Adaptive step with error control
/// let adaptive = SolverType::Adaptive {
///     t_start: 0.0,
///     t_end: 3000.0,
///     rtol: 1e-6,
///     atol: 1e-6,
///     max_step: 8.0,
/// };
///
/// assert_eq!(fixed.name(), "FixedStep");
/// assert!(adaptive.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {
    /// Uniform steps over `[t_start, t_end]`
    ///
    /// Used by: RK4
    FixedStep {
        t_start: f64,
        t_end: f64,
        time_steps: usize,
    },

    /// Error-controlled steps over `[t_start, t_end]`
    ///
    /// Used by: SDIRK
    Adaptive {
        t_start: f64,
        t_end: f64,
        rtol: f64,
        atol: f64,
        max_step: f64,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::FixedStep { .. } => "FixedStep",
            SolverType::Adaptive { .. } => "Adaptive",
        }
    }

    /// Integration window
    pub fn span(&self) -> (f64, f64) {
        match *self {
            SolverType::FixedStep { t_start, t_end, .. } | SolverType::Adaptive { t_start, t_end, .. } => {
                (t_start, t_end)
            }
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<()> {
        let (t_start, t_end) = self.span();
        if !(t_start.is_finite() && t_end.is_finite() && t_end > t_start) {
            return Err(ChromError::config(format!(
                "time span must satisfy t_start < t_end, got ({t_start}, {t_end})"
            )));
        }

        match *self {
            SolverType::FixedStep { time_steps, .. } => {
                if time_steps == 0 {
                    return Err(ChromError::config("time steps must be greater than 0"));
                }
            }
            SolverType::Adaptive { rtol, atol, max_step, .. } => {
                if !(rtol > 0.0 && atol > 0.0) {
                    return Err(ChromError::config(format!(
                        "tolerances must be positive, got rtol={rtol}, atol={atol}"
                    )));
                }
                if !(max_step > 0.0) {
                    return Err(ChromError::config(format!("max_step must be positive, got {max_step}")));
                }
            }
        }
        Ok(())
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for numerical solver
///
/// ```rust
/// use chromosim::models::ColumnConfig;
/// use chromosim::solver::SolverConfiguration;
///
/// let config = SolverConfiguration::from_settings(&ColumnConfig::ev_aex_multi().integration);
/// assert!(config.validate().is_ok());
///
/// let fixed = SolverConfiguration::fixed_step(0.0, 600.0, 1200);
/// assert_eq!(fixed.solver_type.name(), "FixedStep");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of solver and its parameters
    pub solver_type: SolverType,

    /// Upper bound on attempted steps before the run is abandoned
    pub max_steps: usize,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self {
            solver_type,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Fixed-step configuration
    pub fn fixed_step(t_start: f64, t_end: f64, time_steps: usize) -> Self {
        Self::new(SolverType::FixedStep { t_start, t_end, time_steps })
    }

    /// Adaptive configuration
    pub fn adaptive(t_start: f64, t_end: f64, rtol: f64, atol: f64, max_step: f64) -> Self {
        Self::new(SolverType::Adaptive { t_start, t_end, rtol, atol, max_step })
    }

    /// Adaptive configuration from a column's integration settings
    pub fn from_settings(settings: &IntegrationSettings) -> Self {
        Self::adaptive(
            settings.t_start,
            settings.t_end,
            settings.rtol,
            settings.atol,
            settings.max_step,
        )
    }

    /// Replaces the step budget
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(ChromError::config("max_steps must be greater than 0"));
        }
        self.solver_type.validate()
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Trajectory produced by a solver
///
/// `states[k]` is the state at `time_points[k]`; the first entry is the
/// initial state.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Accepted time points, strictly increasing
    pub time_points: Vec<f64>,

    /// State at every time point
    pub states: Vec<DVector<f64>>,

    /// Solver statistics (name, step counts, …)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    /// Creates a result without metadata
    pub fn new(time_points: Vec<f64>, states: Vec<DVector<f64>>) -> Self {
        Self {
            time_points,
            states,
            metadata: HashMap::new(),
        }
    }

    /// Number of stored time points
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    /// Whether the result holds no time point
    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Last stored state
    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    /// Last stored time
    pub fn final_time(&self) -> Option<f64> {
        self.time_points.last().copied()
    }

    /// Trajectory as an `[Nt × state_len]` matrix, one row per time point
    pub fn trajectory(&self) -> DMatrix<f64> {
        let n_cols = self.states.first().map_or(0, |s| s.len());
        DMatrix::from_fn(self.states.len(), n_cols, |row, col| self.states[row][col])
    }

    /// Adds one metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Metadata entry, if present
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// A numerical time integrator
pub trait Solver {
    /// Integrates `scenario` as described by `config`
    ///
    /// # Errors
    ///
    /// - Configuration error when `config` does not suit the solver
    /// - Errors raised by the model's right-hand side
    /// - Integration / non-finite errors when the integration breaks down
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult>;

    /// Name of the solver
    fn name(&self) -> &str;
}

// =================================================================================================
// Tests
// =================================================================================================
