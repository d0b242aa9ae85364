//! Helper functions for integration tests

use chromosim::models::{ColumnConfig, ColumnModel, DesorptionRate, LoadTiming, SpeciesParams};

/// Compute relative error: |actual - expected| / |expected|
#[allow(dead_code)]
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Single species, unit scales, no dispersion, feed of 1 that never stops
///
/// Residence time L/u = 50 s; binding is independent of the salt gradient
/// (γ = 0) and saturates at a third of the capacity.
#[allow(dead_code)]
pub fn advection_column(n_cells: usize) -> ColumnConfig {
    let mut config = ColumnConfig::ev_aex_single();
    config.n_cells = n_cells;
    config.length = 0.05;
    config.velocity = 1e-3;
    config.dispersion = 0.0;
    config.species = vec![SpeciesParams::new("A", -25.0, 1.0)];
    config.feed_total = 1.0;
    config.capacity = 1.0;
    config.mobile_scale = 1.0;
    config.bound_scale = 1.0;
    config.k0 = 0.5;
    config.gamma = 0.0;
    config.desorption = DesorptionRate::Uniform(0.1);
    config.load = LoadTiming::Duration(1e6);
    config
}

/// Upper bound on the particles that can have entered the column by the end
/// of the load window: A·ε·(u + Dax/Δz)·ΣC_in·t_load
#[allow(dead_code)]
pub fn inflow_bound(model: &ColumnModel) -> f64 {
    let config = model.config();
    let feed: f64 = model.feed().evaluate(0.0).sum();
    config.cross_section()
        * config.porosity
        * (config.velocity + config.dispersion / model.dz())
        * feed
        * model.load_duration()
}
