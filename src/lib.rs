//! chromosim: Packed-Column Chromatography Simulation
//!
//! Predicts how several particle populations (for instance extracellular
//! vesicle subtypes with different surface charge) travel through a packed
//! anion-exchange column and bind to it while a salt gradient elutes them.
//!
//! # Architecture
//!
//! chromosim is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Physical models define equations (what to solve)
//!    - Numerical solvers provide methods (how to solve)
//!
//! 2. **Everything resolved up front**
//!    - A [`ColumnConfig`](models::ColumnConfig) is validated once
//!    - The [`ColumnModel`](models::ColumnModel) right-hand side is a pure function of `(t, y)`
//!
//! # Quick Start
//!
//! ```rust
//! use chromosim::prelude::*;
//!
//! # fn main() -> chromosim::Result<()> {
//! // 1. Configure the column from a preset
//! let mut config = ColumnConfig::ev_aex_multi();
//! config.n_cells = 20;
//! let model = ColumnModel::new(config)?;
//!
//! // 2. Configure the solver
//! let settings = SolverConfiguration::adaptive(0.0, 300.0, 1e-5, 1e-7, 8.0);
//!
//! // 3. Run the simulation
//! let scenario = Scenario::new(Box::new(model.clone()));
//! let result = SdirkSolver::new().solve(&scenario, &settings)?;
//!
//! // 4. Access results
//! let traces = OutletTraces::from_result(&model, &result)?;
//! assert_eq!(traces.outlet.ncols(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: Model trait and flat state layout
//! - [`discretization`]: Finite-volume operators and Jacobian sparsity
//! - [`models`]: Column configuration, profiles, kinetics, presets
//! - [`solver`]: Time integrators (RK4, SDIRK)
//! - [`output`]: Trajectory unpacking and outlet traces
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.

pub mod error;
pub mod physics;

pub mod discretization;
pub mod models;
pub mod output;
pub mod solver;

pub use error::{ChromError, Result};

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use chromosim::prelude::*;
    //! ```
    pub use crate::error::{ChromError, Result};
    pub use crate::models::{ColumnConfig, ColumnModel, FeedProfile, SaltGradient};
    pub use crate::output::{OutletTraces, column_inventory, unpack_state};
    pub use crate::physics::{PhysicalModel, PhysicalQuantity, StateLayout};
    pub use crate::solver::{
        RK4Solver, Scenario, SdirkSolver, SimulationResult, Solver, SolverConfiguration, SolverType,
    };
}
