//! Output module for simulation results
//!
//! Turns a [`SimulationResult`](crate::solver::SimulationResult) into arrays
//! ready for analysis or plotting elsewhere:
//! - **Unpack**: flat trajectory → `(time, cell, species)` arrays per phase
//! - **Traces**: outlet chromatograms, gradient signals and column inventory
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! ├── unpack.rs           ← Trajectory reshaping
//! └── traces.rs           ← Chromatogram data
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use chromosim::models::{ColumnConfig, ColumnModel};
//! use chromosim::output::{OutletTraces, column_inventory, unpack_state};
//! use chromosim::solver::{RK4Solver, Scenario, Solver, SolverConfiguration};
//!
//! let mut config = ColumnConfig::ev_aex_single();
//! config.n_cells = 10;
//! let model = ColumnModel::new(config.clone()).unwrap();
//!
//! let scenario = Scenario::new(Box::new(model.clone()));
//! let result = RK4Solver::new()
//!     .solve(&scenario, &SolverConfiguration::fixed_step(0.0, 60.0, 120))
//!     .unwrap();
//!
//! let unpacked = unpack_state(&result.trajectory(), 10, 1).unwrap();
//! let inventory = column_inventory(&model, &unpacked).unwrap();
//! let traces = OutletTraces::from_result(&model, &result).unwrap();
//!
//! assert_eq!(traces.times.len(), 121);
//! assert!(inventory[120] > 0.0);
//! ```

pub mod traces;
pub mod unpack;

// Re-export commonly used items for convenience
pub use traces::{DEFAULT_DETECTOR_GAIN, OutletTraces, column_inventory, column_profiles};
pub use unpack::{UnpackedTrajectory, unpack_state};
