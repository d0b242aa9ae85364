//! Common utilities for integration tests

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
#[allow(unused_imports)]
pub use mock_models::{ExponentialDecay, StiffRelaxation};
#[allow(unused_imports)]
pub use test_helpers::{advection_column, inflow_bound, relative_error};
