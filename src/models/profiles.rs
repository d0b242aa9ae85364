//! Time profiles at the column boundaries
//!
//! Defines how the conditions imposed on the column vary with TIME:
//!
//! - [`SaltGradient`]: ionic strength I(t) of the running buffer (load → elute ramp)
//! - [`FeedProfile`]: inlet concentration vector C_in(t), one entry per species
//! - [`LoadTiming`]: how long the sample is loaded onto the column
//! - [`PercentB`]: the programmed gradient expressed as %B of the elution buffer
//!
//! All profiles are pure functions of time. Everything they need (load duration,
//! per-species feed vector) is resolved once when the column model is built.
//!
//! # Example
//!
//! ```rust
//! use chromosim::models::SaltGradient;
//!
//! let gradient = SaltGradient::new(460.0, 1660.0, 0.05, 1.0).unwrap();
//!
//! assert_eq!(gradient.evaluate(0.0), 0.05);      // Loading
//! assert!((gradient.evaluate(1060.0) - 0.525).abs() < 1e-12);  // Mid ramp
//! assert_eq!(gradient.evaluate(3000.0), 1.0);    // Fully eluting
//! ```

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use crate::error::{ChromError, Result};

/// Load duration used when neither a duration nor a load volume is configured \[s\]
pub const DEFAULT_LOAD_DURATION: f64 = 300.0;

// =================================================================================================
// Salt gradient
// =================================================================================================

/// Clamped linear ionic-strength ramp
///
/// ```text
/// I(t) = I_load + (I_elute - I_load) · clamp((t - start) / (end - start), 0, 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaltGradient {
    /// Time at which the ramp starts \[s\]
    pub start: f64,
    /// Time at which the ramp reaches the elution value \[s\]
    pub end: f64,
    /// Ionic strength while loading \[M\]
    pub load: f64,
    /// Ionic strength after the ramp \[M\]
    pub elute: f64,
}

impl SaltGradient {
    /// Creates and validates a ramp
    pub fn new(start: f64, end: f64, load: f64, elute: f64) -> Result<Self> {
        let gradient = Self { start, end, load, elute };
        gradient.validate()?;
        Ok(gradient)
    }

    /// Checks that all values are finite and that the ramp has a positive duration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("gradient start", self.start),
            ("gradient end", self.end),
            ("load ionic strength", self.load),
            ("elution ionic strength", self.elute),
        ] {
            if !value.is_finite() {
                return Err(ChromError::config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.end <= self.start {
            return Err(ChromError::config(format!(
                "gradient end ({}) must be after gradient start ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// Progress of the ramp in [0, 1]
    pub fn fraction(&self, t: f64) -> f64 {
        ((t - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    /// Ionic strength at time `t`
    pub fn evaluate(&self, t: f64) -> f64 {
        self.load + (self.elute - self.load) * self.fraction(t)
    }

    /// Ionic strength at each of `times` (same length, same order)
    pub fn evaluate_series(&self, times: &[f64]) -> Vec<f64> {
        times.iter().map(|&t| self.evaluate(t)).collect()
    }
}

// =================================================================================================
// Load timing
// =================================================================================================

/// How the length of the load window is specified
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoadTiming {
    /// Explicit duration \[s\]
    Duration(f64),

    /// Loaded volume pumped at a given flow rate
    Volume {
        /// Sample volume \[mL\]
        load_ml: f64,
        /// Flow rate \[mL/min\]
        flow_ml_min: f64,
    },

    /// Falls back to [`DEFAULT_LOAD_DURATION`]
    #[default]
    Unspecified,
}

impl LoadTiming {
    /// Load duration in seconds
    ///
    /// # Errors
    ///
    /// Configuration error for non-positive or non-finite inputs.
    pub fn resolve(&self) -> Result<f64> {
        let duration = match *self {
            LoadTiming::Duration(seconds) => seconds,
            LoadTiming::Volume { load_ml, flow_ml_min } => {
                if !(flow_ml_min.is_finite() && flow_ml_min > 0.0) {
                    return Err(ChromError::config(format!(
                        "flow rate must be > 0 mL/min, got {flow_ml_min}"
                    )));
                }
                60.0 * load_ml / flow_ml_min
            }
            LoadTiming::Unspecified => DEFAULT_LOAD_DURATION,
        };

        if !(duration.is_finite() && duration >= 0.0) {
            return Err(ChromError::config(format!(
                "load duration must be a non-negative finite time, got {duration}"
            )));
        }
        Ok(duration)
    }

    /// Pump flow rate \[mL/min\], known only for volume-based loading
    pub fn flow_rate(&self) -> Option<f64> {
        match *self {
            LoadTiming::Volume { flow_ml_min, .. } => Some(flow_ml_min),
            _ => None,
        }
    }
}

// =================================================================================================
// Feed profile
// =================================================================================================

/// Inlet concentration vector C_in(t) in physical units
///
/// # Types
///
/// - **LoadWindow**: constant feed vector during `[0, duration)`, zero afterwards
/// - **Custom**: user-defined profile (the returned length is checked by the column model)
pub enum FeedProfile {
    /// Constant feed during the load window
    LoadWindow {
        /// Per-species feed concentration during the window
        concentrations: DVector<f64>,
        /// Length of the window \[s\]
        duration: f64,
    },

    /// Custom temporal profile from user function
    Custom(Arc<dyn Fn(f64) -> DVector<f64> + Send + Sync>),
}

// ==================== Manual Clone Implementation ====================

impl Clone for FeedProfile {
    fn clone(&self) -> Self {
        match self {
            Self::LoadWindow { concentrations, duration } => Self::LoadWindow {
                concentrations: concentrations.clone(),
                duration: *duration,
            },
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

// ==================== Manual Debug Implementation ====================

impl std::fmt::Debug for FeedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadWindow { concentrations, duration } => f
                .debug_struct("LoadWindow")
                .field("concentrations", &concentrations.as_slice())
                .field("duration", duration)
                .finish(),
            Self::Custom(_) => f
                .debug_struct("Custom")
                .field("function", &"<user-defined>")
                .finish(),
        }
    }
}

impl FeedProfile {
    /// Feed of `total · fractions` during `[0, duration)`
    ///
    /// # Example
    ///
    /// ```rust
    /// use chromosim::models::FeedProfile;
    ///
    /// let feed = FeedProfile::load_window(7.5e9, &[0.1, 0.15, 0.75], 300.0);
    /// assert_eq!(feed.evaluate(0.0)[2], 7.5e9 * 0.75);
    /// assert_eq!(feed.evaluate(300.0).sum(), 0.0);
    /// ```
    pub fn load_window(total: f64, fractions: &[f64], duration: f64) -> Self {
        let concentrations = DVector::from_iterator(fractions.len(), fractions.iter().map(|&x| total * x));
        Self::LoadWindow { concentrations, duration }
    }

    /// Custom profile
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> DVector<f64> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Inlet concentration vector at time `t`
    pub fn evaluate(&self, t: f64) -> DVector<f64> {
        match self {
            Self::LoadWindow { concentrations, duration } => {
                if t < *duration {
                    concentrations.clone()
                } else {
                    DVector::zeros(concentrations.len())
                }
            }
            Self::Custom(f) => f(t),
        }
    }

    /// Inlet concentration vector at time `t`, checked against the species count
    ///
    /// # Errors
    ///
    /// Shape error when the profile does not return exactly `n_species` values.
    pub fn evaluate_checked(&self, t: f64, n_species: usize) -> Result<DVector<f64>> {
        let feed = self.evaluate(t);
        if feed.len() != n_species {
            return Err(ChromError::shape("feed profile", n_species, feed.len()));
        }
        Ok(feed)
    }

    /// Feed at each of `times` as a `[times × species]` matrix
    pub fn evaluate_series(&self, times: &[f64], n_species: usize) -> Result<DMatrix<f64>> {
        let mut series = DMatrix::zeros(times.len(), n_species);
        for (row, &t) in times.iter().enumerate() {
            let feed = self.evaluate_checked(t, n_species)?;
            series.row_mut(row).copy_from(&feed.transpose());
        }
        Ok(series)
    }
}

// =================================================================================================
// %B signal
// =================================================================================================

/// Programmed gradient expressed as percentage of elution buffer B
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentB {
    /// %B while loading
    pub at_load: f64,
    /// %B once the ramp is complete
    pub at_elute: f64,
}

impl Default for PercentB {
    fn default() -> Self {
        Self { at_load: 10.0, at_elute: 100.0 }
    }
}

impl PercentB {
    /// %B at time `t`, `None` before the gradient starts
    pub fn evaluate(&self, gradient: &SaltGradient, t: f64) -> Option<f64> {
        if t < gradient.start {
            return None;
        }
        let low = self.at_load.min(self.at_elute);
        let high = self.at_load.max(self.at_elute);
        let value = self.at_load + (self.at_elute - self.at_load) * gradient.fraction(t);
        Some(value.clamp(low, high))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
