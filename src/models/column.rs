//! Packed column with competitive adsorption
//!
//! # Mathematical Model
//!
//! For every species $i$ the scaled mobile concentration $c_i = C_i / C_{scale}$
//! and the scaled bound amount $\hat q_i = Q_i / Q_{scale}$ obey
//!
//! $$\frac{\partial \hat q_i}{\partial t} = \frac{1}{Q_{scale}} \left( k_{a,i} C_i Q_{free} - k_{d,i} Q_i \right)$$
//!
//! $$\frac{\partial c_i}{\partial t} = -u \frac{\partial c_i}{\partial z}
//!     + D_{ax} \frac{\partial^2 c_i}{\partial z^2}
//!     - \beta \frac{\partial \hat q_i}{\partial t}$$
//!
//! with $\beta = \frac{1-\varepsilon}{\varepsilon} \frac{Q_{scale}}{C_{scale}}$.
//!
//! # Inlet
//!
//! The derivative operators carry no inlet information (first row of D1 is
//! zero, D2 uses a ghost cell). The feed enters the first cell through
//!
//! $$\Delta \dot c_{0} = -\frac{u}{\Delta z} (c_0 - c_{in}) + \frac{D_{ax}}{\Delta z^2} (c_{in} - c_0)$$
//!
//! where $c_{in} = C_{in}(t) / C_{scale}$.
//!
//! # State
//!
//! `[c(cell 0, species 0..Ns), c(cell 1, ..), …, q̂(cell 0, ..), …]`, see
//! [`StateLayout`].

use nalgebra::{DMatrix, DVector};

use crate::discretization::{GridOperators, JacobianSparsity, build_operators};
use crate::error::Result;
use crate::models::config::ColumnConfig;
use crate::models::kinetics::CompetitiveLangmuir;
use crate::models::profiles::{FeedProfile, SaltGradient};
use crate::physics::{PhysicalModel, StateLayout};

/// Column right-hand side with every derived quantity resolved
///
/// Built once from a [`ColumnConfig`]; evaluating the right-hand side only
/// reads it.
///
/// # Example
///
/// ```rust
/// use chromosim::models::{ColumnConfig, ColumnModel};
/// use chromosim::physics::PhysicalModel;
///
/// let model = ColumnModel::new(ColumnConfig::ev_aex_multi()).unwrap();
/// let y0 = model.setup_initial_state();
/// let dy = model.rhs(0.0, &y0).unwrap();
///
/// assert_eq!(dy.len(), 2 * 80 * 3);
/// assert!(dy[0] > 0.0); // feed enters the first cell
/// ```
#[derive(Debug, Clone)]
pub struct ColumnModel {
    config: ColumnConfig,
    layout: StateLayout,
    dz: f64,
    operators: GridOperators,
    sparsity: JacobianSparsity,
    kinetics: CompetitiveLangmuir,
    feed: FeedProfile,
    beta: f64,
    load_duration: f64,
}

impl ColumnModel {
    /// Validates `config` and precomputes operators, sparsity, kinetics and feed
    ///
    /// # Errors
    ///
    /// - Configuration error for any invalid field (see [`ColumnConfig::validate`])
    /// - Shape error when per-species desorption rates or the feed at the start
    ///   time do not match the species count
    pub fn new(config: ColumnConfig) -> Result<Self> {
        config.validate()?;

        let layout = StateLayout::new(config.n_cells, config.n_species())?;
        let dz = config.dz();
        let operators = build_operators(config.n_cells, dz)?;
        let sparsity = JacobianSparsity::build(config.n_cells, config.n_species())?;
        let kinetics = config.kinetics()?;
        let load_duration = config.load.resolve()?;
        let feed = config.feed_profile()?;
        feed.evaluate_checked(config.integration.t_start, config.n_species())?;
        let beta = config.beta();

        log::debug!(
            "column model: N={}, Ns={}, dz={dz:.3e} m, beta={beta:.3e}, load window {load_duration} s",
            layout.n_cells(),
            layout.n_species()
        );

        Ok(Self {
            config,
            layout,
            dz,
            operators,
            sparsity,
            kinetics,
            feed,
            beta,
            load_duration,
        })
    }

    // =============================================================================================
    // Accessors
    // =============================================================================================

    /// Configuration the model was built from
    pub fn config(&self) -> &ColumnConfig {
        &self.config
    }

    /// State layout (N, Ns)
    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    /// Cell width Δz \[m\]
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Derivative operators
    pub fn operators(&self) -> &GridOperators {
        &self.operators
    }

    /// Adsorption kinetics
    pub fn kinetics(&self) -> &CompetitiveLangmuir {
        &self.kinetics
    }

    /// Ionic-strength program
    pub fn gradient(&self) -> &SaltGradient {
        &self.config.gradient
    }

    /// Inlet feed profile
    pub fn feed(&self) -> &FeedProfile {
        &self.feed
    }

    /// Phase-ratio factor β
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Resolved load window \[s\]
    pub fn load_duration(&self) -> f64 {
        self.load_duration
    }

    /// Ionic strength I(t)
    pub fn ionic_strength(&self, t: f64) -> f64 {
        self.config.gradient.evaluate(t)
    }

    /// %B signal at `t`, `None` before the gradient starts
    pub fn percent_b(&self, t: f64) -> Option<f64> {
        self.config.percent_b.evaluate(&self.config.gradient, t)
    }

    // =============================================================================================
    // Right-hand side
    // =============================================================================================

    /// Time derivative of the scaled state `y` at time `t`
    ///
    /// # Errors
    ///
    /// Shape error when `y` is not of length 2·N·Ns, or when the feed profile
    /// returns a vector whose length differs from Ns.
    pub fn rhs(&self, t: f64, y: &DVector<f64>) -> Result<DVector<f64>> {
        let c_scale = self.config.mobile_scale;
        let q_scale = self.config.bound_scale;
        let u = self.config.velocity;
        let dax = self.config.dispersion;

        // ── Scaled blocks [N × Ns] ────────────────────────────────────────────────
        let (c, q_hat) = self.layout.split(y)?;

        // ── Adsorption in physical units ──────────────────────────────────────────
        let ionic = self.ionic_strength(t);
        let dq_dt = self.kinetics.bound_rate(ionic, &(&c * c_scale), &(&q_hat * q_scale))?;
        let dq_hat_dt = dq_dt / q_scale;

        // ── Transport ─────────────────────────────────────────────────────────────
        let mut dc_dt = self.operators.gradient(&c) * (-u)
            + self.operators.laplacian(&c) * dax
            - &dq_hat_dt * self.beta;

        // ── Inlet ─────────────────────────────────────────────────────────────────
        let c_in = self.feed.evaluate_checked(t, self.layout.n_species())? / c_scale;
        let convective = -u / self.dz;
        let dispersive = dax / (self.dz * self.dz);
        for s in 0..self.layout.n_species() {
            let c0 = c[(0, s)];
            dc_dt[(0, s)] += convective * (c0 - c_in[s]) + dispersive * (c_in[s] - c0);
        }

        self.layout.join(&dc_dt, &dq_hat_dt)
    }

    /// Physical `(C, Q)` blocks `[N × Ns]` of a scaled state
    pub fn physical_blocks(&self, y: &DVector<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        let (c, q_hat) = self.layout.split(y)?;
        Ok((c * self.config.mobile_scale, q_hat * self.config.bound_scale))
    }
}

impl PhysicalModel for ColumnModel {
    fn points(&self) -> usize {
        self.layout.n_cells()
    }

    fn species(&self) -> usize {
        self.layout.n_species()
    }

    fn state_len(&self) -> usize {
        self.layout.state_len()
    }

    fn compute_physics(&self, t: f64, state: &DVector<f64>) -> Result<DVector<f64>> {
        self.rhs(t, state)
    }

    /// Empty column: no particles in either phase
    fn setup_initial_state(&self) -> DVector<f64> {
        self.layout.zeros()
    }

    fn jacobian_sparsity(&self) -> Option<JacobianSparsity> {
        Some(self.sparsity.clone())
    }

    fn name(&self) -> &str {
        "Packed column (competitive Langmuir)"
    }

    fn description(&self) -> Option<&str> {
        Some("Convection-dispersion with ionic-strength dependent competitive adsorption")
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChromError;
    use crate::models::profiles::LoadTiming;
    use crate::physics::PhysicalQuantity;
    use approx::assert_relative_eq;

    fn small_config(n_species: usize) -> ColumnConfig {
        let mut config = ColumnConfig::ev_aex_multi();
        config.n_cells = 6;
        config.species.truncate(n_species);
        config
    }

    #[test]
    fn test_wrong_state_length_is_shape_error() {
        let model = ColumnModel::new(small_config(3)).unwrap();
        let y = DVector::zeros(model.state_len() - 1);
        assert_eq!(
            model.rhs(0.0, &y).unwrap_err(),
            ChromError::shape("state vector", 36, 35)
        );
    }

    #[test]
    fn test_feed_override_of_wrong_length_is_shape_error() {
        let mut config = small_config(3);
        config.feed_override = Some(FeedProfile::custom(|_| DVector::from_element(2, 1.0)));
        assert_eq!(
            ColumnModel::new(config).unwrap_err(),
            ChromError::shape("feed profile", 3, 2)
        );

        // Only wrong after the start time: caught on evaluation
        let mut config = small_config(3);
        config.feed_override = Some(FeedProfile::custom(|t| {
            DVector::from_element(if t < 100.0 { 3 } else { 2 }, 1.0)
        }));
        let model = ColumnModel::new(config).unwrap();
        let y0 = model.setup_initial_state();
        assert!(model.rhs(50.0, &y0).is_ok());
        assert_eq!(
            model.rhs(150.0, &y0).unwrap_err(),
            ChromError::shape("feed profile", 3, 2)
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config(2);
        config.gradient.end = 0.0;
        assert!(matches!(ColumnModel::new(config), Err(ChromError::Configuration(_))));
    }

    #[test]
    fn test_empty_column_after_load_is_at_rest() {
        let model = ColumnModel::new(small_config(3)).unwrap();
        let dy = model.rhs(model.load_duration() + 1.0, &model.setup_initial_state()).unwrap();
        assert!(dy.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_feed_enters_first_cell_only() {
        let model = ColumnModel::new(small_config(3)).unwrap();
        let config = model.config();
        let dy = model.rhs(10.0, &model.setup_initial_state()).unwrap();

        let inflow = config.velocity / model.dz() + config.dispersion / (model.dz() * model.dz());
        let layout = model.layout();
        for s in 0..3 {
            let c_in = config.feed_total * config.species[s].feed_fraction / config.mobile_scale;
            let i = layout.index(PhysicalQuantity::MobilePhase, 0, s);
            assert_relative_eq!(dy[i], inflow * c_in, max_relative = 1e-12);
        }
        for cell in 1..6 {
            for s in 0..3 {
                assert_eq!(dy[layout.index(PhysicalQuantity::MobilePhase, cell, s)], 0.0);
            }
        }
        assert!(dy.rows(18, 18).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pure_desorption_releases_into_mobile_phase() {
        let mut config = small_config(1);
        config.load = LoadTiming::Duration(0.0);
        let model = ColumnModel::new(config).unwrap();
        let layout = *model.layout();

        let mut y = layout.zeros();
        let cell = 3;
        let iq = layout.index(PhysicalQuantity::BoundPhase, cell, 0);
        y[iq] = 0.2;

        let dy = model.rhs(100.0, &y).unwrap();
        let kd = 2e-3;
        assert_relative_eq!(dy[iq], -kd * 0.2, max_relative = 1e-12);
        let ic = layout.index(PhysicalQuantity::MobilePhase, cell, 0);
        assert_relative_eq!(dy[ic], model.beta() * kd * 0.2, max_relative = 1e-12);
    }

    #[test]
    fn test_rhs_is_deterministic() {
        let model = ColumnModel::new(small_config(3)).unwrap();
        let y = DVector::from_fn(model.state_len(), |i, _| 0.01 * (i % 7) as f64);
        assert_eq!(model.rhs(500.0, &y).unwrap(), model.rhs(500.0, &y).unwrap());
        assert_eq!(model.compute_physics(500.0, &y).unwrap(), model.rhs(500.0, &y).unwrap());
    }

    #[test]
    fn test_single_species_dependencies_stay_inside_sparsity() {
        let model = ColumnModel::new(small_config(1)).unwrap();
        let sparsity = model.jacobian_sparsity().unwrap();
        assert_eq!(sparsity.dim(), model.state_len());

        let y = DVector::from_fn(model.state_len(), |i, _| 0.1 + 0.05 * i as f64);
        let base = model.rhs(800.0, &y).unwrap();
        for col in 0..model.state_len() {
            let mut perturbed = y.clone();
            perturbed[col] += 1e-3;
            let dy = model.rhs(800.0, &perturbed).unwrap();
            for row in 0..model.state_len() {
                if dy[row] != base[row] {
                    assert!(sparsity.contains(row, col), "d f[{row}] / d y[{col}] outside pattern");
                }
            }
        }
    }

    #[test]
    fn test_percent_b_masked_before_gradient() {
        let model = ColumnModel::new(small_config(1)).unwrap();
        assert_eq!(model.percent_b(100.0), None);
        assert_eq!(model.percent_b(460.0), Some(10.0));
        assert_eq!(model.percent_b(5000.0), Some(100.0));
    }

    #[test]
    fn test_physical_blocks_rescale() {
        let model = ColumnModel::new(small_config(2)).unwrap();
        let y = DVector::from_element(model.state_len(), 0.5);
        let (c, q) = model.physical_blocks(&y).unwrap();
        assert_eq!(c[(0, 0)], 0.5 * 7.5e9);
        assert_eq!(q[(5, 1)], 0.5 * 4e13);
    }
}
