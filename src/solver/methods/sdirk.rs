//! Adaptive implicit solver (L-stable SDIRK2(1))
//!
//! # Mathematical Background
//!
//! Two singly diagonally implicit stages with $\gamma = 1 - 1/\sqrt{2}$:
//!
//! ```text
//!   γ  |  γ     0
//!   1  |  1-γ   γ
//!  ----+-----------
//!      |  1-γ   γ      second order (propagated)
//!      |  1     0      first order (error estimate)
//! ```
//!
//! ```text
//! k₁ = f(t + γh, y + hγ·k₁)
//! k₂ = f(t + h,  y + h(1-γ)·k₁ + hγ·k₂)
//! yₙ₊₁ = y + h·((1-γ)·k₁ + γ·k₂)
//! err  = hγ·(k₂ - k₁)
//! ```
//!
//! Both stages are solved by simplified Newton iterations sharing the matrix
//! `I - hγJ`. The matrix is factored once (LU) and reused until `hγ` drifts by
//! more than 20 %. Rejected steps and Newton failures refresh both the
//! Jacobian and the factors.
//!
//! # Jacobian
//!
//! `J` is built by forward differences. With a sparsity hint on the
//! [`Scenario`] the columns are perturbed in structurally orthogonal groups,
//! so one Jacobian costs a handful of right-hand side evaluations instead of
//! one per state entry.

use nalgebra::{DMatrix, DVector, Dyn, LU};

use crate::error::{ChromError, Result};
use crate::physics::PhysicalModel;
use crate::solver::methods::jacobian::JacobianEvaluator;
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverType, validate_state};

const GAMMA: f64 = 1.0 - std::f64::consts::FRAC_1_SQRT_2;
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.25;
const MAX_FACTOR: f64 = 4.0;
const REFACTOR_DRIFT: f64 = 0.2;

// =================================================================================================
// Iteration matrix
// =================================================================================================

/// LU factors of `I - hγJ`
struct IterationMatrix {
    h_gamma: f64,
    lu: LU<f64, Dyn, Dyn>,
}

impl IterationMatrix {
    fn factor(jac: &DMatrix<f64>, h_gamma: f64) -> Self {
        let n = jac.nrows();
        let matrix = DMatrix::identity(n, n) - jac * h_gamma;
        Self {
            h_gamma,
            lu: matrix.lu(),
        }
    }

    fn is_stale(&self, h_gamma: f64) -> bool {
        (h_gamma - self.h_gamma).abs() > REFACTOR_DRIFT * self.h_gamma
    }
}

/// Result of one attempted step
struct StepAttempt {
    y_new: DVector<f64>,
    error: DVector<f64>,
    newton_iterations: usize,
}

// =================================================================================================
// SDIRK Solver
// =================================================================================================

/// Adaptive L-stable two-stage SDIRK solver
///
/// Requires a [`SolverType::Adaptive`] configuration. Every accepted step is
/// stored in the result.
///
/// # Example
///
/// ```rust
/// use chromosim::models::{ColumnConfig, ColumnModel};
/// use chromosim::solver::{Scenario, SdirkSolver, Solver, SolverConfiguration};
///
/// let mut config = ColumnConfig::ev_aex_single();
/// config.n_cells = 8;
/// let model = ColumnModel::new(config).unwrap();
///
/// let scenario = Scenario::new(Box::new(model));
/// let config = SolverConfiguration::adaptive(0.0, 120.0, 1e-5, 1e-7, 8.0);
/// let result = SdirkSolver::new().solve(&scenario, &config).unwrap();
///
/// assert_eq!(result.final_time(), Some(120.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SdirkSolver {
    newton_tolerance: f64,
    max_newton_iterations: usize,
    initial_step: Option<f64>,
}

impl Default for SdirkSolver {
    fn default() -> Self {
        Self {
            newton_tolerance: 0.01,
            max_newton_iterations: 10,
            initial_step: None,
        }
    }
}

impl SdirkSolver {
    /// Create a new SDIRK solver with default Newton settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with step `h` instead of the automatic estimate
    pub fn with_initial_step(mut self, h: f64) -> Self {
        self.initial_step = Some(h);
        self
    }

    /// Newton convergence threshold (in units of the error tolerance) and iteration cap
    pub fn with_newton(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.newton_tolerance = tolerance;
        self.max_newton_iterations = max_iterations;
        self
    }

    /// Solves `k = f(t_stage, base + hγ·k)`; `None` when Newton does not converge
    fn solve_stage(
        &self,
        model: &dyn PhysicalModel,
        t_stage: f64,
        base: &DVector<f64>,
        guess: DVector<f64>,
        h_gamma: f64,
        matrix: &IterationMatrix,
        scale: &DVector<f64>,
    ) -> Result<Option<(DVector<f64>, usize)>> {
        let mut k = guess;
        for iteration in 1..=self.max_newton_iterations {
            let stage = base + &k * h_gamma;
            let residual = model.compute_physics(t_stage, &stage)? - &k;
            let Some(delta) = matrix.lu.solve(&residual) else {
                return Ok(None);
            };
            k += &delta;

            let correction = weighted_rms(&(delta * h_gamma), scale);
            if !correction.is_finite() {
                return Ok(None);
            }
            if correction < self.newton_tolerance {
                return Ok(Some((k, iteration)));
            }
        }
        Ok(None)
    }

    fn attempt_step(
        &self,
        model: &dyn PhysicalModel,
        t: f64,
        h: f64,
        y: &DVector<f64>,
        f_y: &DVector<f64>,
        matrix: &IterationMatrix,
        scale: &DVector<f64>,
    ) -> Result<Option<StepAttempt>> {
        let h_gamma = h * GAMMA;

        // Stage 1, guessed from the slope at the start of the step
        let Some((k1, it1)) = self.solve_stage(model, t + h_gamma, y, f_y.clone(), h_gamma, matrix, scale)?
        else {
            return Ok(None);
        };

        // Stage 2, guessed from stage 1
        let base = y + &k1 * (h * (1.0 - GAMMA));
        let Some((k2, it2)) = self.solve_stage(model, t + h, &base, k1.clone(), h_gamma, matrix, scale)? else {
            return Ok(None);
        };

        let y_new = base + &k2 * h_gamma;
        let error = (k2 - k1) * h_gamma;
        Ok(Some(StepAttempt {
            y_new,
            error,
            newton_iterations: it1 + it2,
        }))
    }
}

impl Solver for SdirkSolver {
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> Result<SimulationResult> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let (t_start, t_end, rtol, atol, max_step) = match config.solver_type {
            SolverType::Adaptive { t_start, t_end, rtol, atol, max_step } => (t_start, t_end, rtol, atol, max_step),
            ref other => {
                return Err(ChromError::config(format!(
                    "SdirkSolver only supports Adaptive configuration, got {}",
                    other.name()
                )));
            }
        };

        // ====== Step 2: Setup ======

        let model = scenario.model();
        let jacobian = JacobianEvaluator::new(scenario.sparsity());
        let span = t_end - t_start;

        let mut t = t_start;
        let mut y = scenario.initial_state().clone();
        let mut f_y = model.compute_physics(t, &y)?;

        let mut h = self
            .initial_step
            .unwrap_or_else(|| initial_step(&y, &f_y, rtol, atol))
            .min(max_step)
            .min(span);

        let mut jac = jacobian.evaluate(model, t, &y, &f_y)?;
        let mut matrix = IterationMatrix::factor(&jac, h * GAMMA);

        let mut time_points = vec![t];
        let mut states = vec![y.clone()];

        let mut accepted = 0usize;
        let mut rejected = 0usize;
        let mut newton_failures = 0usize;
        let mut jacobians = 1usize;
        let mut factorizations = 1usize;
        let mut newton_iterations = 0usize;

        log::info!(
            "SDIRK: integrating '{}' over [{t_start}, {t_end}] (rtol={rtol:e}, atol={atol:e}, max_step={max_step}, {} evaluations per Jacobian)",
            model.name(),
            jacobian.cost(y.len())
        );

        // ====== Step 3: Time Integration ======

        let mut attempts = 0usize;
        while t < t_end {
            attempts += 1;
            if attempts > config.max_steps {
                return Err(ChromError::Integration {
                    time: t,
                    message: format!("step budget of {} attempts exhausted", config.max_steps),
                });
            }

            // Land exactly on t_end instead of leaving a sliver
            let remaining = t_end - t;
            if h >= remaining || remaining - h < 1e-3 * h {
                h = remaining;
            }
            if h <= 1e-12 * t.abs().max(1.0) {
                return Err(ChromError::Integration {
                    time: t,
                    message: format!("step size underflow (h = {h:e})"),
                });
            }

            if matrix.is_stale(h * GAMMA) {
                matrix = IterationMatrix::factor(&jac, h * GAMMA);
                factorizations += 1;
            }

            let scale = y.map(|v| atol + rtol * v.abs());
            let Some(attempt) = self.attempt_step(model, t, h, &y, &f_y, &matrix, &scale)? else {
                // Newton failed: halve the step with a fresh Jacobian
                newton_failures += 1;
                log::warn!("SDIRK: Newton failed at t = {t} with h = {h:e}, halving the step");
                h *= 0.5;
                jac = jacobian.evaluate(model, t, &y, &f_y)?;
                jacobians += 1;
                matrix = IterationMatrix::factor(&jac, h * GAMMA);
                factorizations += 1;
                continue;
            };
            newton_iterations += attempt.newton_iterations;

            let error_scale = y.zip_map(&attempt.y_new, |a, b| atol + rtol * a.abs().max(b.abs()));
            let error = weighted_rms(&attempt.error, &error_scale);

            if error <= 1.0 {
                // ====== Accept ======
                t = if h == remaining { t_end } else { t + h };
                y = attempt.y_new;
                accepted += 1;
                validate_state(&y, accepted)?;
                f_y = model.compute_physics(t, &y)?;

                time_points.push(t);
                states.push(y.clone());
                log::trace!("SDIRK step {accepted}: t = {t}, h = {h:e}, error = {error:.3}");

                let factor = if error == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error.powf(-0.5)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                h = (h * factor).min(max_step);
            } else {
                // ====== Reject ======
                rejected += 1;
                log::debug!("SDIRK: step rejected at t = {t} (h = {h:e}, error = {error:.3})");

                let factor = if error.is_finite() {
                    (SAFETY * error.powf(-0.5)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                h *= factor;
                jac = jacobian.evaluate(model, t, &y, &f_y)?;
                jacobians += 1;
                matrix = IterationMatrix::factor(&jac, h * GAMMA);
                factorizations += 1;
            }
        }

        // ====== Step 4: Build Result ======

        let mut result = SimulationResult::new(time_points, states);
        result.add_metadata("solver", self.name());
        result.add_metadata("accepted steps", &accepted.to_string());
        result.add_metadata("rejected steps", &rejected.to_string());
        result.add_metadata("newton failures", &newton_failures.to_string());
        result.add_metadata("newton iterations", &newton_iterations.to_string());
        result.add_metadata("jacobian evaluations", &jacobians.to_string());
        result.add_metadata("lu factorizations", &factorizations.to_string());

        log::info!(
            "SDIRK: finished with {accepted} accepted / {rejected} rejected steps, {factorizations} factorizations"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "SDIRK2(1)"
    }
}

// =================================================================================================
// Helpers
// =================================================================================================

/// Root-mean-square of `v / scale`
fn weighted_rms(v: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().zip(scale.iter()).map(|(x, s)| (x / s) * (x / s)).sum();
    (sum / v.len() as f64).sqrt()
}

/// First step from the size of the state and of its derivative
fn initial_step(y: &DVector<f64>, f: &DVector<f64>, rtol: f64, atol: f64) -> f64 {
    let scale = y.map(|v| atol + rtol * v.abs());
    let d0 = weighted_rms(y, &scale);
    let d1 = weighted_rms(f, &scale);
    if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::JacobianSparsity;
    use approx::assert_relative_eq;

    /// dy/dt = -k·y
    struct Decay {
        rate: f64,
    }

    impl PhysicalModel for Decay {
        fn points(&self) -> usize {
            1
        }

        fn state_len(&self) -> usize {
            2
        }

        fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> Result<DVector<f64>> {
            Ok(state * -self.rate)
        }

        fn setup_initial_state(&self) -> DVector<f64> {
            DVector::from_element(2, 1.0)
        }

        fn name(&self) -> &str {
            "Decay"
        }
    }

    /// Stiff relaxation onto a moving target: y' = -λ(y - cos t) - sin t, y = cos t exactly
    struct StiffTracking {
        lambda: f64,
    }

    impl PhysicalModel for StiffTracking {
        fn points(&self) -> usize {
            1
        }

        fn state_len(&self) -> usize {
            2
        }

        fn compute_physics(&self, t: f64, state: &DVector<f64>) -> Result<DVector<f64>> {
            Ok(state.map(|y| -self.lambda * (y - t.cos()) - t.sin()))
        }

        fn setup_initial_state(&self) -> DVector<f64> {
            DVector::from_element(2, 1.0)
        }

        fn jacobian_sparsity(&self) -> Option<JacobianSparsity> {
            JacobianSparsity::build(1, 1).ok()
        }

        fn name(&self) -> &str {
            "Stiff tracking"
        }
    }

    #[test]
    fn test_sdirk_rejects_fixed_step() {
        let scenario = Scenario::new(Box::new(Decay { rate: 1.0 }));
        let config = SolverConfiguration::fixed_step(0.0, 1.0, 10);
        let err = SdirkSolver::new().solve(&scenario, &config).unwrap_err();
        assert!(matches!(err, ChromError::Configuration(ref m) if m.contains("only supports Adaptive")));
    }

    #[test]
    fn test_sdirk_exponential_decay() {
        let scenario = Scenario::new(Box::new(Decay { rate: 0.5 }));
        let config = SolverConfiguration::adaptive(0.0, 4.0, 1e-6, 1e-8, 1.0);
        let result = SdirkSolver::new().solve(&scenario, &config).unwrap();

        assert_eq!(result.final_time(), Some(4.0));
        let expected = (-2.0f64).exp();
        for &y in result.final_state().unwrap().iter() {
            assert_relative_eq!(y, expected, max_relative = 1e-4);
        }
        assert!(result.time_points.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_sdirk_stiff_problem_takes_large_steps() {
        let scenario = Scenario::new(Box::new(StiffTracking { lambda: 1e6 }));
        let config = SolverConfiguration::adaptive(0.0, 10.0, 1e-4, 1e-6, 1.0);
        let result = SdirkSolver::new().solve(&scenario, &config).unwrap();

        // An explicit method would need millions of steps
        assert!(result.len() < 5_000, "took {} steps", result.len());
        for &y in result.final_state().unwrap().iter() {
            assert_relative_eq!(y, 10.0f64.cos(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_sdirk_respects_max_step() {
        let scenario = Scenario::new(Box::new(Decay { rate: 1e-3 }));
        let config = SolverConfiguration::adaptive(0.0, 50.0, 1e-3, 1e-3, 2.0);
        let result = SdirkSolver::new().solve(&scenario, &config).unwrap();
        assert!(result.time_points.windows(2).all(|w| w[1] - w[0] <= 2.0 + 1e-12));
        assert!(result.len() >= 26);
    }

    #[test]
    fn test_sdirk_step_budget() {
        let scenario = Scenario::new(Box::new(Decay { rate: 1.0 }));
        let config = SolverConfiguration::adaptive(0.0, 100.0, 1e-6, 1e-6, 0.01).with_max_steps(10);
        let err = SdirkSolver::new().solve(&scenario, &config).unwrap_err();
        assert!(matches!(err, ChromError::Integration { .. }));
    }

    #[test]
    fn test_sdirk_initial_step_override() {
        let scenario = Scenario::new(Box::new(Decay { rate: 0.5 }));
        let config = SolverConfiguration::adaptive(0.0, 4.0, 1e-6, 1e-8, 1.0);
        let result = SdirkSolver::new().with_initial_step(0.05).solve(&scenario, &config).unwrap();

        assert!(result.time_points[1] <= 0.05 + 1e-15);
        assert_eq!(result.final_time(), Some(4.0));
        assert_relative_eq!(result.final_state().unwrap()[0], (-2.0f64).exp(), max_relative = 1e-4);
    }

    #[test]
    fn test_sdirk_newton_settings() {
        let scenario = Scenario::new(Box::new(Decay { rate: 0.5 }));
        let config = SolverConfiguration::adaptive(0.0, 4.0, 1e-6, 1e-8, 1.0);

        let strict = SdirkSolver::new().with_newton(1e-4, 20).solve(&scenario, &config).unwrap();
        assert_eq!(strict.final_time(), Some(4.0));
        assert_relative_eq!(strict.final_state().unwrap()[0], (-2.0f64).exp(), max_relative = 1e-4);

        // A zero tolerance can never be met, so every step fails until h underflows
        let err = SdirkSolver::new().with_newton(0.0, 1).solve(&scenario, &config).unwrap_err();
        assert!(matches!(err, ChromError::Integration { .. }));
    }

    #[test]
    fn test_weighted_rms() {
        let v = DVector::from_vec(vec![3.0, 4.0]);
        let scale = DVector::from_vec(vec![1.0, 1.0]);
        assert_relative_eq!(weighted_rms(&v, &scale), (12.5f64).sqrt());
    }
}
