//! Column model for particle chromatography
//!
//! [`ColumnModel`] implements the [`PhysicalModel`](crate::physics::PhysicalModel)
//! trait. The solver calls `compute_physics(t, y)` at each stage. The model is
//! responsible for the physics (transport, adsorption), the solver for the time
//! integration.
//!
//! # Building blocks
//!
//! ## [`ColumnConfig`]: what is simulated
//!
//! Geometry, hydrodynamics, species, kinetic constants and the buffer program as
//! plain data. Two reference runs ship as presets
//! ([`ColumnConfig::ev_aex_multi`], [`ColumnConfig::ev_aex_single`]).
//!
//! ## [`CompetitiveLangmuir`]: how particles bind
//!
//! All species compete for one finite capacity per cell. The affinity of each
//! species grows with its surface charge and is screened by the ionic strength.
//!
//! ## Profiles: what happens at the inlet
//!
//! [`SaltGradient`] drives the ionic strength, [`FeedProfile`] the inlet
//! concentration. [`LoadTiming`] resolves the load window eagerly.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod column;
pub mod config;
pub mod kinetics;
pub mod presets;
pub mod profiles;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use column::ColumnModel;
pub use config::{ColumnConfig, IntegrationSettings, SpeciesParams};
pub use kinetics::{CompetitiveLangmuir, DesorptionRate, IonicResponse};
pub use profiles::{DEFAULT_LOAD_DURATION, FeedProfile, LoadTiming, PercentB, SaltGradient};
