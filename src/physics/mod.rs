//! Physical models
//!
//! This module provides the trait every physical model implements and the
//! layout of the flat state vector the solvers integrate.
//!
//! # Core Concepts
//!
//! - **Physical Model**: Computes dy/dt = f(t, y) for a flat state y
//! - **Physical Quantity**: Type-safe identifier of a state block (mobile / bound phase)
//! - **State Layout**: Index arithmetic between the flat vector and `[cell × species]` views
//!
//! # Architecture
//!
//! Physical models are **separate from numerical solvers**:
//! - The model provides the **equations** (physics)
//! - The solver provides the **method** to solve them (numerics)
//!
//! # Example
//!
//! ```rust
//! use chromosim::physics::{PhysicalModel, StateLayout};
//! use chromosim::Result;
//! use nalgebra::DVector;
//!
//! struct Washout {
//!     layout: StateLayout,
//! }
//!
//! impl PhysicalModel for Washout {
//!     fn points(&self) -> usize { self.layout.n_cells() }
//!     fn state_len(&self) -> usize { self.layout.state_len() }
//!     fn compute_physics(&self, _t: f64, y: &DVector<f64>) -> Result<DVector<f64>> {
//!         self.layout.check(y)?;
//!         Ok(-0.1 * y)
//!     }
//!     fn setup_initial_state(&self) -> DVector<f64> { self.layout.zeros() }
//!     fn name(&self) -> &str { "Washout" }
//! }
//!
//! let model = Washout { layout: StateLayout::new(10, 2).unwrap() };
//! let dy = model.compute_physics(0.0, &model.setup_initial_state()).unwrap();
//! assert_eq!(dy.len(), 40);
//! ```

// module declaration
pub mod data;
pub mod traits;

// re-export commonly used types for convenience
pub use data::StateLayout;
pub use traits::{PhysicalModel, PhysicalQuantity};
