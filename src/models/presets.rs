//! Reference anion-exchange runs
//!
//! Two ready-made [`ColumnConfig`]s for extracellular vesicles on an
//! anion-exchange column: a three-population run and a single-population run.
//! Both load 5 mL at 1 mL/min (a 300 s load window) and then elute with a
//! 20 minute linear salt ramp.

use crate::models::config::{ColumnConfig, IntegrationSettings, SpeciesParams};
use crate::models::kinetics::{DesorptionRate, IonicResponse};
use crate::models::profiles::{LoadTiming, PercentB, SaltGradient};

/// Ionic strength at which binding is fully screened \[M\]
const I_MAX: f64 = 1.2;

impl ColumnConfig {
    /// Three EV populations with increasing surface charge
    ///
    /// | Species   | ζ \[mV\] | Feed fraction |
    /// |-----------|----------|---------------|
    /// | `EV-low`  | -12      | 0.10          |
    /// | `EV-mid`  | -25      | 0.15          |
    /// | `EV-high` | -45      | 0.75          |
    ///
    /// ```
    /// use chromosim::models::ColumnConfig;
    ///
    /// let config = ColumnConfig::ev_aex_multi();
    /// assert_eq!(config.n_species(), 3);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn ev_aex_multi() -> Self {
        let feed_total = 7.5e9;
        let capacity = 4e13;

        Self {
            n_cells: 80,
            length: 0.025,
            diameter: 0.007,
            porosity: 0.40,
            velocity: 1.0e-4,
            dispersion: 8e-11,
            species: vec![
                SpeciesParams::new("EV-low", -12.0, 0.10),
                SpeciesParams::new("EV-mid", -25.0, 0.15),
                SpeciesParams::new("EV-high", -45.0, 0.75),
            ],
            feed_total,
            capacity,
            mobile_scale: feed_total,
            bound_scale: capacity,
            k0: 1e-22,
            gamma: 0.53,
            desorption: DesorptionRate::Uniform(2e-3),
            ionic_response: IonicResponse::LinearDecay { i_max: I_MAX },
            gradient: SaltGradient {
                start: 460.0,
                end: 460.0 + 1200.0,
                load: 0.05,
                elute: 1.0,
            },
            load: LoadTiming::Volume {
                load_ml: 5.0,
                flow_ml_min: 1.0,
            },
            feed_override: None,
            percent_b: PercentB::default(),
            integration: IntegrationSettings {
                t_start: 0.0,
                t_end: 3000.0,
                rtol: 1e-6,
                atol: 1e-6,
                max_step: 8.0,
            },
        }
    }

    /// One EV population (ζ = -25 mV) on a higher capacity column
    pub fn ev_aex_single() -> Self {
        let feed_total = 5e9;
        let capacity = 4e14;

        Self {
            n_cells: 80,
            length: 0.025,
            diameter: 0.007,
            porosity: 0.40,
            velocity: 1.0e-4,
            dispersion: 9e-11,
            species: vec![SpeciesParams::new("EV", -25.0, 1.0)],
            feed_total,
            capacity,
            mobile_scale: feed_total,
            bound_scale: capacity,
            k0: 1e-22,
            gamma: 0.75,
            desorption: DesorptionRate::Uniform(1e-2),
            ionic_response: IonicResponse::LinearDecay { i_max: I_MAX },
            gradient: SaltGradient {
                start: 12.0 * 60.0,
                end: 32.0 * 60.0,
                load: 0.01,
                elute: 1.0,
            },
            load: LoadTiming::Volume {
                load_ml: 5.0,
                flow_ml_min: 1.0,
            },
            feed_override: None,
            percent_b: PercentB::default(),
            integration: IntegrationSettings {
                t_start: 0.0,
                t_end: 45.0 * 60.0,
                ..IntegrationSettings::default()
            },
        }
    }
}
