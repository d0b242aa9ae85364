//! Chromatogram data extracted from a simulation
//!
//! The outlet is the last grid cell. Everything here is in physical units
//! (particles/m³ for concentrations, particles for inventories).

use ndarray::{Array1, Array2, Axis};

use crate::error::{ChromError, Result};
use crate::models::ColumnModel;
use crate::output::unpack::UnpackedTrajectory;
use crate::solver::SimulationResult;

/// Gain turning the total outlet concentration into a detector-like signal
pub const DEFAULT_DETECTOR_GAIN: f64 = 1e-13;

/// Outlet traces of one run
#[derive(Debug, Clone, PartialEq)]
pub struct OutletTraces {
    /// Time points \[s\]
    pub times: Array1<f64>,
    /// Species names, column order of `outlet`
    pub species: Vec<String>,
    /// Outlet concentration `[Nt × Ns]` \[particles/m³\]
    pub outlet: Array2<f64>,
    /// Sum over species of `outlet`
    pub total: Array1<f64>,
    /// Ionic strength I(t)
    pub ionic_strength: Array1<f64>,
    /// %B(t), `None` before the gradient starts
    pub percent_b: Vec<Option<f64>>,
    /// Pumped volume \[mL\], when the flow rate is known
    pub elution_volume: Option<Array1<f64>>,
}

impl OutletTraces {
    /// Extracts the outlet traces of `result`, a run of `model`
    ///
    /// # Errors
    ///
    /// Shape error when a stored state does not fit the model.
    pub fn from_result(model: &ColumnModel, result: &SimulationResult) -> Result<Self> {
        let n_species = model.layout().n_species();
        let outlet_cell = model.layout().n_cells() - 1;

        let mut outlet = Array2::zeros((result.len(), n_species));
        for (mut row, state) in outlet.axis_iter_mut(Axis(0)).zip(&result.states) {
            let (mobile, _) = model.physical_blocks(state)?;
            for s in 0..n_species {
                row[s] = mobile[(outlet_cell, s)];
            }
        }

        let times = Array1::from_vec(result.time_points.clone());
        let total = outlet.sum_axis(Axis(1));
        let ionic_strength = times.mapv(|t| model.ionic_strength(t));
        let percent_b = times.iter().map(|&t| model.percent_b(t)).collect();
        let elution_volume = model.config().load.flow_rate().map(|flow| times.mapv(|t| t / 60.0 * flow));

        log::debug!(
            "Outlet traces: {} time points, peak total {:.3e}",
            times.len(),
            total.iter().copied().fold(0.0, f64::max)
        );

        Ok(Self {
            times,
            species: model.config().species_names(),
            outlet,
            total,
            ionic_strength,
            percent_b,
            elution_volume,
        })
    }

    /// Outlet trace of one species, `None` for an unknown name
    pub fn species_trace(&self, name: &str) -> Option<Array1<f64>> {
        let index = self.species.iter().position(|s| s == name)?;
        Some(self.outlet.column(index).to_owned())
    }

    /// Total outlet concentration scaled by `gain`
    pub fn detector_signal(&self, gain: f64) -> Array1<f64> {
        &self.total * gain
    }

    /// Time of the largest total outlet concentration
    pub fn peak_time(&self) -> Option<f64> {
        let (index, _) = self
            .total
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some(self.times[index])
    }
}

/// Physical amount held in the column at every time point \[particles\]
///
/// `unpacked` holds the scaled phases as returned by
/// [`unpack_state`](crate::output::unpack_state). Each cell contributes
/// `A·Δz·(ε·C + (1-ε)·Q)` summed over species, with `A = π·d²/4`.
///
/// # Errors
///
/// Shape error when `unpacked` does not have the model's cell and species counts.
pub fn column_inventory(model: &ColumnModel, unpacked: &UnpackedTrajectory) -> Result<Array1<f64>> {
    check_grid(model, unpacked)?;
    let config = model.config();
    let eps = config.porosity;
    let cell_volume = config.cross_section() * model.dz();

    let mobile = unpacked.mobile.sum_axis(Axis(2)).sum_axis(Axis(1)) * (eps * config.mobile_scale);
    let bound = unpacked.bound.sum_axis(Axis(2)).sum_axis(Axis(1)) * ((1.0 - eps) * config.bound_scale);
    Ok((mobile + bound) * cell_volume)
}

/// Physical mobile concentration summed over species, `[Nt × N]`
///
/// # Errors
///
/// Shape error when `unpacked` does not have the model's cell and species counts.
pub fn column_profiles(model: &ColumnModel, unpacked: &UnpackedTrajectory) -> Result<Array2<f64>> {
    check_grid(model, unpacked)?;
    Ok(unpacked.mobile.sum_axis(Axis(2)) * model.config().mobile_scale)
}

fn check_grid(model: &ColumnModel, unpacked: &UnpackedTrajectory) -> Result<()> {
    let layout = model.layout();
    if unpacked.n_cells() != layout.n_cells() {
        return Err(ChromError::shape("trajectory cells", layout.n_cells(), unpacked.n_cells()));
    }
    if unpacked.n_species() != layout.n_species() {
        return Err(ChromError::shape("trajectory species", layout.n_species(), unpacked.n_species()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnConfig;
    use crate::output::unpack_state;
    use crate::physics::PhysicalQuantity;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn small_model() -> ColumnModel {
        let mut config = ColumnConfig::ev_aex_multi();
        config.n_cells = 4;
        ColumnModel::new(config).unwrap()
    }

    /// Hand-made two-point result: empty column, then species in the outlet cell
    fn two_point_result(model: &ColumnModel) -> SimulationResult {
        let len = model.layout().state_len();
        let mut filled = DVector::zeros(len);
        for s in 0..3 {
            filled[model.layout().index(PhysicalQuantity::MobilePhase, 3, s)] = (s + 1) as f64;
        }
        SimulationResult::new(vec![0.0, 600.0], vec![DVector::zeros(len), filled])
    }

    #[test]
    fn test_outlet_is_last_cell_in_physical_units() {
        let model = small_model();
        let traces = OutletTraces::from_result(&model, &two_point_result(&model)).unwrap();
        let scale = model.config().mobile_scale;

        assert_eq!(traces.outlet.shape(), &[2, 3]);
        assert_eq!(traces.outlet[[0, 2]], 0.0);
        assert_relative_eq!(traces.outlet[[1, 1]], 2.0 * scale);
        assert_relative_eq!(traces.total[1], 6.0 * scale);
        assert_eq!(traces.peak_time(), Some(600.0));
        assert_relative_eq!(traces.species_trace("EV-high").unwrap()[1], 3.0 * scale);
        assert!(traces.species_trace("unknown").is_none());
    }

    #[test]
    fn test_gradient_traces() {
        let model = small_model();
        let traces = OutletTraces::from_result(&model, &two_point_result(&model)).unwrap();

        assert_relative_eq!(traces.ionic_strength[0], 0.05);
        assert_eq!(traces.percent_b[0], None);
        assert!(traces.percent_b[1].is_some());
        // 1 mL/min for 10 min
        assert_relative_eq!(traces.elution_volume.unwrap()[1], 10.0);
    }

    #[test]
    fn test_detector_signal() {
        let model = small_model();
        let traces = OutletTraces::from_result(&model, &two_point_result(&model)).unwrap();
        let signal = traces.detector_signal(DEFAULT_DETECTOR_GAIN);
        assert_relative_eq!(signal[1], traces.total[1] * 1e-13);
    }

    #[test]
    fn test_inventory_counts_both_phases() {
        let model = small_model();
        let config = model.config();
        let layout = model.layout();

        // One particle/m³ (physical) everywhere in both phases
        let mut y = DVector::zeros(layout.state_len());
        y.rows_mut(0, layout.block_len()).fill(1.0 / config.mobile_scale);
        y.rows_mut(layout.block_len(), layout.block_len()).fill(1.0 / config.bound_scale);
        let result = SimulationResult::new(vec![0.0], vec![y]);

        let unpacked = unpack_state(&result.trajectory(), 4, 3).unwrap();
        let inventory = column_inventory(&model, &unpacked).unwrap();

        // Both phases together fill the whole column volume, three species
        let volume = config.cross_section() * config.length;
        assert_relative_eq!(inventory[0], 3.0 * volume, max_relative = 1e-12);

        let profiles = column_profiles(&model, &unpacked).unwrap();
        assert_eq!(profiles.shape(), &[1, 4]);
        assert_relative_eq!(profiles[[0, 2]], 3.0, max_relative = 1e-12);
    }

    #[test]
    fn test_inventory_rejects_other_grid() {
        let model = small_model();
        let unpacked = unpack_state(&nalgebra::DMatrix::zeros(1, 2 * 5 * 3), 5, 3).unwrap();
        assert_eq!(
            column_inventory(&model, &unpacked),
            Err(ChromError::shape("trajectory cells", 4, 5))
        );
    }
}
