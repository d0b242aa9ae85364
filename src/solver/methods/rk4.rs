//! Runge-Kutta 4 (RK4) numerical solver
//!
//! # Mathematical Background
//!
//! The classical fourth-order Runge-Kutta method (RK4) integrates
//!
//! ```text
//! dy/dt = f(t, y)
//! ```
//!
//! with a weighted average of four slope estimates:
//!
//! ```text
//! k₁ = f(tₙ,        yₙ)
//! k₂ = f(tₙ + dt/2, yₙ + dt/2 · k₁)
//! k₃ = f(tₙ + dt/2, yₙ + dt/2 · k₂)
//! k₄ = f(tₙ + dt,   yₙ + dt · k₃)
//!
//! yₙ₊₁ = yₙ + dt/6 · (k₁ + 2k₂ + 2k₃ + k₄)
//! ```
//!
//! The column right-hand side depends on time through the salt gradient and
//! the feed window, so every stage is evaluated at its own time.
//!
//! # Characteristics
//!
//! - **Order**: Fourth-order accurate (global error ~ O(dt⁴))
//! - **Complexity**: 4 function evaluations per step
//! - **Stability**: explicit; for the upwind transport the Courant number
//!   `u·dt/Δz` must stay below one to keep concentrations non-negative
//!
//! # When NOT to Use
//!
//! - Very stiff kinetics → use [`SdirkSolver`](crate::solver::SdirkSolver)
//! - Need error control → use [`SdirkSolver`](crate::solver::SdirkSolver)

use crate::error::{ChromError, Result};
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverType, validate_state};

// =================================================================================================
// RK4 Solver
// =================================================================================================

/// Classical fourth-order Runge-Kutta solver
///
/// Implements the RK4 time integration scheme with four intermediate stages
/// per time step. Requires a [`SolverType::FixedStep`] configuration.
///
/// # Example
///
/// ```rust
/// use chromosim::physics::PhysicalModel;
/// use chromosim::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
/// use chromosim::Result;
/// use nalgebra::DVector;
///
/// struct Decay;
///
/// impl PhysicalModel for Decay {
///     fn points(&self) -> usize { 1 }
///     fn state_len(&self) -> usize { 1 }
///     fn compute_physics(&self, _t: f64, y: &DVector<f64>) -> Result<DVector<f64>> { Ok(-y) }
///     fn setup_initial_state(&self) -> DVector<f64> { DVector::from_element(1, 1.0) }
///     fn name(&self) -> &str { "Decay" }
/// }
///
/// let scenario = Scenario::new(Box::new(Decay));
/// let config = SolverConfiguration::fixed_step(0.0, 1.0, 100);
/// let result = RK4Solver::new().solve(&scenario, &config).unwrap();
///
/// let y1 = result.final_state().unwrap()[0];
/// assert!((y1 - (-1.0f64).exp()).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Solver;

impl RK4Solver {
    /// Create a new RK4 solver
    pub fn new() -> Self {
        Self
    }
}

impl Solver for RK4Solver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let (t_start, t_end, time_steps) = match config.solver_type {
            SolverType::FixedStep { t_start, t_end, time_steps } => (t_start, t_end, time_steps),
            ref other => {
                return Err(ChromError::config(format!(
                    "RK4Solver only supports FixedStep configuration, got {}",
                    other.name()
                )));
            }
        };

        // ====== Step 2: Setup ======

        let dt = (t_end - t_start) / (time_steps as f64);
        let model = scenario.model();
        let mut state = scenario.initial_state().clone();

        let mut time_points = Vec::with_capacity(time_steps + 1);
        let mut states = Vec::with_capacity(time_steps + 1);
        time_points.push(t_start);
        states.push(state.clone());

        log::info!(
            "RK4: integrating '{}' over [{t_start}, {t_end}] with {time_steps} steps (dt = {dt})",
            model.name()
        );

        // ====== Step 3: Time Integration ======

        for step in 0..time_steps {
            // Computed from the index so the last point is exactly t_end
            let t = t_start + (step as f64) * dt;
            let half = 0.5 * dt;

            let k1 = model.compute_physics(t, &state)?;
            let k2 = model.compute_physics(t + half, &(&state + &k1 * half))?;
            let k3 = model.compute_physics(t + half, &(&state + &k2 * half))?;
            let k4 = model.compute_physics(t + dt, &(&state + &k3 * dt))?;

            let weighted_slope = k1 + k2 * 2.0 + k3 * 2.0 + k4;
            state += weighted_slope * (dt / 6.0);

            validate_state(&state, step + 1)?;

            let t_next = if step + 1 == time_steps {
                t_end
            } else {
                t_start + (step as f64 + 1.0) * dt
            };
            time_points.push(t_next);
            states.push(state.clone());

            log::trace!("RK4 step {} reached t = {t_next}", step + 1);
        }

        // ====== Step 4: Build Result ======

        let mut result = SimulationResult::new(time_points, states);
        result.add_metadata("solver", self.name());
        result.add_metadata("time steps", &time_steps.to_string());
        result.add_metadata("dt", &dt.to_string());
        result.add_metadata("function evaluations", &(4 * time_steps).to_string());

        log::info!("RK4: finished after {time_steps} steps");
        Ok(result)
    }

    fn name(&self) -> &str {
        "Runge Kutta (RK4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
