//! Error types
//!
//! Every fallible operation of the crate returns [`Result<T>`]. Errors are raised
//! at the point of detection and are terminal for the current evaluation: the
//! model never substitutes defaults or retries.

use thiserror::Error;

/// Errors raised by the column model and the solvers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChromError {
    /// Invalid or missing configuration field (N = 0, dz <= 0, empty species list, ...)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A vector or array does not match the expected grid/species dimension
    #[error("shape error in {context}: expected {expected}, got {actual}")]
    Shape {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The time integrator could not advance (step budget, step size underflow)
    #[error("integration failed at t = {time}: {message}")]
    Integration { time: f64, message: String },

    /// A NaN or infinite value appeared in an accepted state
    #[error("non-finite value at state index {index} after step {step}")]
    NonFinite { step: usize, index: usize },
}

impl ChromError {
    /// Shorthand for [`ChromError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for [`ChromError::Shape`]
    pub fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::Shape { context, expected, actual }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ChromError>;
