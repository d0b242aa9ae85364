//! Column configuration record
//!
//! A [`ColumnConfig`] is plain data: built by a preset
//! ([`ColumnConfig::ev_aex_multi`], [`ColumnConfig::ev_aex_single`]) or by the
//! caller, then validated once by [`ColumnModel::new`](crate::models::ColumnModel::new).
//! Every derived quantity (Δz, load duration, feed vector, phase ratio) is
//! computed from it at that point and never mutated afterwards.

use nalgebra::DVector;

use crate::error::{ChromError, Result};
use crate::models::kinetics::{CompetitiveLangmuir, DesorptionRate, IonicResponse};
use crate::models::profiles::{FeedProfile, LoadTiming, PercentB, SaltGradient};

// =================================================================================================
// SpeciesParams
// =================================================================================================

/// One particle population in the feed
///
/// | Field           | Unit            | Effect                                      |
/// |-----------------|-----------------|---------------------------------------------|
/// | `zeta_mv`       | mV              | Charge: larger \|ζ\| → stronger binding      |
/// | `feed_fraction` | dimensionless   | Share of the total feed concentration       |
///
/// ```
/// use chromosim::models::SpeciesParams;
///
/// let small_ev = SpeciesParams::new("small EV", -12.0, 0.10);
/// assert!(small_ev.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesParams {
    /// Species name (used for trace labels)
    pub name: String,

    /// Zeta potential \[mV\], only the magnitude enters the kinetics
    pub zeta_mv: f64,

    /// Fraction of the total feed concentration, must be finite and $\geq 0$
    pub feed_fraction: f64,
}

impl SpeciesParams {
    /// Creates a species without validating it
    pub fn new(name: impl Into<String>, zeta_mv: f64, feed_fraction: f64) -> Self {
        Self {
            name: name.into(),
            zeta_mv,
            feed_fraction,
        }
    }

    /// Checks the physical constraints of the species
    pub fn validate(&self) -> Result<()> {
        if !self.zeta_mv.is_finite() {
            return Err(ChromError::config(format!(
                "species '{}': zeta potential must be finite, got {}",
                self.name, self.zeta_mv
            )));
        }
        if !(self.feed_fraction.is_finite() && self.feed_fraction >= 0.0) {
            return Err(ChromError::config(format!(
                "species '{}': feed fraction must be finite and >= 0, got {}",
                self.name, self.feed_fraction
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// IntegrationSettings
// =================================================================================================

/// Time span and tolerances handed to the time integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationSettings {
    /// Start of the simulated window \[s\]
    pub t_start: f64,
    /// End of the simulated window \[s\]
    pub t_end: f64,
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance (on scaled state values)
    pub atol: f64,
    /// Largest step the adaptive integrator may take \[s\]
    pub max_step: f64,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 3000.0,
            rtol: 1e-6,
            atol: 1e-6,
            max_step: 8.0,
        }
    }
}

impl IntegrationSettings {
    /// Checks span and tolerances
    pub fn validate(&self) -> Result<()> {
        if !(self.t_start.is_finite() && self.t_end.is_finite() && self.t_end > self.t_start) {
            return Err(ChromError::config(format!(
                "integration span must satisfy t_start < t_end, got ({}, {})",
                self.t_start, self.t_end
            )));
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(ChromError::config(format!(
                "tolerances must be > 0, got rtol={}, atol={}",
                self.rtol, self.atol
            )));
        }
        if !(self.max_step > 0.0) {
            return Err(ChromError::config(format!(
                "max_step must be > 0, got {}",
                self.max_step
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// ColumnConfig
// =================================================================================================

/// Complete description of one packed-column run
///
/// # Scaling
///
/// The integrated state holds `c = C / mobile_scale` and `q = Q / bound_scale`
/// so that both phases are of order one. The phase-ratio factor coupling them is
///
/// $$\beta = \frac{1 - \varepsilon}{\varepsilon} \cdot \frac{Q_{scale}}{C_{scale}}$$
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    /// Number of grid cells N
    pub n_cells: usize,
    /// Column length \[m\]
    pub length: f64,
    /// Column inner diameter \[m\]
    pub diameter: f64,
    /// Bed porosity ε, in (0, 1)
    pub porosity: f64,
    /// Interstitial velocity u \[m/s\]
    pub velocity: f64,
    /// Axial dispersion coefficient \[m²/s\]
    pub dispersion: f64,

    /// Particle populations, Ns = `species.len()`
    pub species: Vec<SpeciesParams>,
    /// Total feed concentration \[particles/m³\]
    pub feed_total: f64,

    /// Shared binding capacity \[particles/m³\]
    pub capacity: f64,
    /// Mobile-phase scale Cscale
    pub mobile_scale: f64,
    /// Bound-phase scale Qscale
    pub bound_scale: f64,

    /// Affinity prefactor K0
    pub k0: f64,
    /// Zeta sensitivity γ \[1/mV\]
    pub gamma: f64,
    /// Desorption rate law
    pub desorption: DesorptionRate,
    /// Ionic-strength response of the affinity
    pub ionic_response: IonicResponse,

    /// Ionic-strength program
    pub gradient: SaltGradient,
    /// Length of the load window
    pub load: LoadTiming,
    /// Replaces the load-window feed when set
    pub feed_override: Option<FeedProfile>,
    /// %B representation of the gradient
    pub percent_b: PercentB,

    /// Time span and tolerances
    pub integration: IntegrationSettings,
}

impl ColumnConfig {
    /// Number of species Ns
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Cell width Δz = L / N
    pub fn dz(&self) -> f64 {
        self.length / self.n_cells as f64
    }

    /// Column cross-section π·d²/4 \[m²\]
    pub fn cross_section(&self) -> f64 {
        std::f64::consts::PI * self.diameter * self.diameter / 4.0
    }

    /// Phase-ratio factor β
    pub fn beta(&self) -> f64 {
        (1.0 - self.porosity) / self.porosity * (self.bound_scale / self.mobile_scale)
    }

    /// Zeta potentials in species order
    pub fn zeta_potentials(&self) -> Vec<f64> {
        self.species.iter().map(|s| s.zeta_mv).collect()
    }

    /// Feed fractions in species order
    pub fn feed_fractions(&self) -> DVector<f64> {
        DVector::from_iterator(self.n_species(), self.species.iter().map(|s| s.feed_fraction))
    }

    /// Species names in species order
    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }

    /// Inlet feed profile: the override if present, otherwise the load window
    pub fn feed_profile(&self) -> Result<FeedProfile> {
        if let Some(feed) = &self.feed_override {
            return Ok(feed.clone());
        }
        let fractions = self.feed_fractions();
        Ok(FeedProfile::load_window(self.feed_total, fractions.as_slice(), self.load.resolve()?))
    }

    /// Kinetics with every per-species constant resolved to length Ns
    pub fn kinetics(&self) -> Result<CompetitiveLangmuir> {
        CompetitiveLangmuir::new(
            self.k0,
            self.gamma,
            &self.zeta_potentials(),
            self.ionic_response.clone(),
            &self.desorption,
            self.capacity,
        )
    }

    /// Checks every field that does not need a derived object
    ///
    /// # Errors
    ///
    /// Configuration error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.n_cells == 0 {
            return Err(ChromError::config("number of cells must be > 0, got 0"));
        }
        if self.species.is_empty() {
            return Err(ChromError::config("at least one species is required"));
        }
        positive("length", self.length)?;
        positive("diameter", self.diameter)?;
        if !(self.porosity > 0.0 && self.porosity < 1.0) {
            return Err(ChromError::config(format!(
                "porosity must lie in (0, 1), got {}",
                self.porosity
            )));
        }
        non_negative("velocity", self.velocity)?;
        non_negative("dispersion", self.dispersion)?;
        non_negative("feed_total", self.feed_total)?;
        positive("capacity", self.capacity)?;
        positive("mobile_scale", self.mobile_scale)?;
        positive("bound_scale", self.bound_scale)?;

        for species in &self.species {
            species.validate()?;
        }
        self.gradient.validate()?;
        self.load.resolve()?;
        self.integration.validate()
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ChromError::config(format!("{field} must be > 0, got {value}")))
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ChromError::config(format!("{field} must be >= 0, got {value}")))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
