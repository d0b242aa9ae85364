//! Numerical methods for solving differential equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! - **[`RK4Solver`]**: Classical fourth-order Runge-Kutta
//!   - Order: Fourth-order O(dt⁴)
//!   - Cost: 4 function evaluations per step
//!   - Use: non-stiff runs with a known stable step
//!
//! - **[`SdirkSolver`]**: L-stable two-stage SDIRK with error control
//!   - Order: second order, first-order embedded estimate
//!   - Cost: Newton iterations on `I - hγJ`, one LU per factorization
//!   - Use: **production runs**, stiff adsorption kinetics
//!
//! # Design Philosophy
//!
//! Each solver is:
//! - **Self-contained**: No shared mutable state
//! - **Stateless**: Can be reused for multiple simulations

mod jacobian;
mod rk4;
mod sdirk;

// Re-exports for convenience
pub use rk4::RK4Solver;
pub use sdirk::SdirkSolver;
