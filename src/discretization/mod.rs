//! Spatial discretization of the column
//!
//! - [`operators`]: first and second derivative operators on a uniform grid
//! - [`sparsity`]: structural Jacobian pattern of the column right-hand side
//!
//! Both only depend on the grid (N, Δz) and the species count, never on the
//! state, so they are built once per simulation.

// module declaration
pub mod operators;
pub mod sparsity;

// re-export commonly used types for convenience
pub use operators::{GridOperators, build_operators, first_derivative, second_derivative};
pub use sparsity::JacobianSparsity;
