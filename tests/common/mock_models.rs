//! Mock physical models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use chromosim::Result;
use chromosim::physics::PhysicalModel;
use nalgebra::DVector;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay model: dy/dt = -k*y, y(0) = 1
///
/// Analytical solution: y(t) = exp(-k*t)
pub struct ExponentialDecay {
    pub points: usize,
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self { points, decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64) -> f64 {
        (-self.decay_rate * t).exp()
    }
}

impl PhysicalModel for ExponentialDecay {
    fn points(&self) -> usize {
        self.points
    }

    fn state_len(&self) -> usize {
        self.points
    }

    fn compute_physics(&self, _t: f64, state: &DVector<f64>) -> Result<DVector<f64>> {
        Ok(state * -self.decay_rate)
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::from_element(self.points, 1.0)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Stiff relaxation: dy/dt = -λ (y - sin t) + cos t
// =================================================================================================

/// Relaxation onto a slow manifold, y(0) = 0
///
/// Analytical solution: y(t) = sin(t), independent of λ. Large λ makes the
/// problem stiff for explicit methods.
pub struct StiffRelaxation {
    pub stiffness: f64,
}

impl PhysicalModel for StiffRelaxation {
    fn points(&self) -> usize {
        1
    }

    fn state_len(&self) -> usize {
        1
    }

    fn compute_physics(&self, t: f64, state: &DVector<f64>) -> Result<DVector<f64>> {
        Ok(state.map(|y| -self.stiffness * (y - t.sin()) + t.cos()))
    }

    fn setup_initial_state(&self) -> DVector<f64> {
        DVector::zeros(1)
    }

    fn name(&self) -> &str {
        "Stiff Relaxation"
    }
}
