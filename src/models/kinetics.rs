//! Competitive adsorption kinetics
//!
//! # Physical background
//!
//! Charged particles (e.g. vesicles with a negative zeta potential) bind to an
//! anion-exchange surface. All species **share one finite set of binding sites**
//! per cell: every bound particle reduces the capacity left for all others.
//! Raising the ionic strength screens the electrostatic attraction and releases
//! bound material.
//!
//! # Rate law
//!
//! For species $i$ in a cell with bound amounts $Q_j$:
//!
//! $$K_i = K_0 \exp\left(\gamma \, |\zeta_i| \, f_I(I)\right)$$
//! $$k_{a,i} = K_i \, k_{d,i}$$
//! $$Q_{free} = \max\left(q_{max} - \sum_j Q_j,\ 0\right)$$
//! $$\frac{dQ_i}{dt} = k_{a,i} \, C_i \, Q_{free} - k_{d,i} \, Q_i$$
//!
//! $f_I$ is the ionic-strength response, clamped at zero. The desorption rate
//! $k_d$ is either fixed or a law of the ionic strength.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use crate::error::{ChromError, Result};

/// Scalar law of the ionic strength
pub type IonicLaw = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Per-species law of the ionic strength
pub type IonicVectorLaw = Arc<dyn Fn(f64) -> DVector<f64> + Send + Sync>;

// =================================================================================================
// Ionic-strength response f_I
// =================================================================================================

/// How the electrostatic affinity decays with ionic strength
#[derive(Clone)]
pub enum IonicResponse {
    /// $f_I(I) = \max(0, 1 - I / I_{max})$
    LinearDecay {
        /// Ionic strength at which adsorption is fully screened \[M\]
        i_max: f64,
    },

    /// User-defined response (negative values are clamped to zero)
    Custom(IonicLaw),
}

impl std::fmt::Debug for IonicResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinearDecay { i_max } => f.debug_struct("LinearDecay").field("i_max", i_max).finish(),
            Self::Custom(_) => f.debug_struct("Custom").field("function", &"<user-defined>").finish(),
        }
    }
}

impl IonicResponse {
    /// Custom response
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Response at ionic strength `ionic`, never negative
    pub fn evaluate(&self, ionic: f64) -> f64 {
        let value = match self {
            Self::LinearDecay { i_max } => 1.0 - ionic / i_max,
            Self::Custom(f) => f(ionic),
        };
        value.max(0.0)
    }

    fn validate(&self) -> Result<()> {
        if let Self::LinearDecay { i_max } = self
            && !(i_max.is_finite() && *i_max > 0.0)
        {
            return Err(ChromError::config(format!("i_max must be > 0, got {i_max}")));
        }
        Ok(())
    }
}

// =================================================================================================
// Desorption rate
// =================================================================================================

/// Desorption rate $k_d$ \[1/s\]
///
/// The variant states explicitly whether the rate is fixed or depends on
/// the ionic strength, and whether a single value applies to all species.
#[derive(Clone)]
pub enum DesorptionRate {
    /// Same constant rate for every species
    Uniform(f64),

    /// One constant rate per species
    PerSpecies(Vec<f64>),

    /// Scalar law of the ionic strength, applied to every species
    UniformLaw(IonicLaw),

    /// Law of the ionic strength returning one rate per species
    PerSpeciesLaw(IonicVectorLaw),
}

impl std::fmt::Debug for DesorptionRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uniform(kd) => f.debug_tuple("Uniform").field(kd).finish(),
            Self::PerSpecies(kd) => f.debug_tuple("PerSpecies").field(kd).finish(),
            Self::UniformLaw(_) => f.debug_tuple("UniformLaw").field(&"<user-defined>").finish(),
            Self::PerSpeciesLaw(_) => f.debug_tuple("PerSpeciesLaw").field(&"<user-defined>").finish(),
        }
    }
}

impl DesorptionRate {
    /// Scalar ionic-strength law
    pub fn uniform_law<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::UniformLaw(Arc::new(f))
    }

    /// Per-species ionic-strength law
    pub fn per_species_law<F>(f: F) -> Self
    where
        F: Fn(f64) -> DVector<f64> + Send + Sync + 'static,
    {
        Self::PerSpeciesLaw(Arc::new(f))
    }
}

/// Desorption rate resolved against the species count
#[derive(Clone)]
enum ResolvedDesorption {
    Fixed(DVector<f64>),
    Uniform(IonicLaw),
    PerSpecies(IonicVectorLaw),
}

impl ResolvedDesorption {
    fn resolve(rate: &DesorptionRate, n_species: usize) -> Result<Self> {
        let fixed = match rate {
            DesorptionRate::Uniform(kd) => DVector::from_element(n_species, *kd),
            DesorptionRate::PerSpecies(kd) => {
                if kd.len() != n_species {
                    return Err(ChromError::shape("desorption rates", n_species, kd.len()));
                }
                DVector::from_column_slice(kd)
            }
            DesorptionRate::UniformLaw(law) => return Ok(Self::Uniform(Arc::clone(law))),
            DesorptionRate::PerSpeciesLaw(law) => return Ok(Self::PerSpecies(Arc::clone(law))),
        };

        if fixed.iter().any(|kd| !(kd.is_finite() && *kd >= 0.0)) {
            return Err(ChromError::config(format!(
                "desorption rates must be finite and >= 0, got {:?}",
                fixed.as_slice()
            )));
        }
        Ok(Self::Fixed(fixed))
    }
}

// =================================================================================================
// CompetitiveLangmuir
// =================================================================================================

/// Competitive multi-species Langmuir kinetics with ionic-strength dependent affinity
///
/// Per-species constants (|ζ|, fixed desorption rates) are resolved to vectors
/// of length Ns at construction; evaluation performs no shape coercion.
///
/// # Example
///
/// ```rust
/// use chromosim::models::{CompetitiveLangmuir, DesorptionRate, IonicResponse};
/// use nalgebra::DMatrix;
///
/// let kinetics = CompetitiveLangmuir::new(
///     1e-22, 0.53, &[-12.0, -25.0, -45.0],
///     IonicResponse::LinearDecay { i_max: 1.2 },
///     &DesorptionRate::Uniform(2e-3),
///     4e13,
/// ).unwrap();
///
/// let c = DMatrix::from_element(80, 3, 1e9);
/// let q = DMatrix::zeros(80, 3);
/// let dq = kinetics.bound_rate(0.05, &c, &q).unwrap();
/// assert!(dq.iter().all(|&v| v > 0.0));
/// ```
#[derive(Clone)]
pub struct CompetitiveLangmuir {
    /// Affinity prefactor $K_0$
    k0: f64,
    /// Zeta sensitivity $\gamma$ \[1/mV\]
    gamma: f64,
    /// $|\zeta_i|$ per species \[mV\]
    zeta_abs: DVector<f64>,
    response: IonicResponse,
    desorption: ResolvedDesorption,
    /// Shared binding capacity $q_{max}$ per cell
    capacity: f64,
}

impl std::fmt::Debug for CompetitiveLangmuir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitiveLangmuir")
            .field("k0", &self.k0)
            .field("gamma", &self.gamma)
            .field("zeta_abs", &self.zeta_abs.as_slice())
            .field("response", &self.response)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl CompetitiveLangmuir {
    /// Creates the kinetics for the species with zeta potentials `zeta_mv`
    ///
    /// # Errors
    ///
    /// - Configuration error for an empty species list, non-finite constants,
    ///   a negative capacity or an invalid response
    /// - Shape error when per-species desorption rates do not match `zeta_mv`
    pub fn new(
        k0: f64,
        gamma: f64,
        zeta_mv: &[f64],
        response: IonicResponse,
        desorption: &DesorptionRate,
        capacity: f64,
    ) -> Result<Self> {
        if zeta_mv.is_empty() {
            return Err(ChromError::config("kinetics need at least one species"));
        }
        if !(k0.is_finite() && k0 >= 0.0) {
            return Err(ChromError::config(format!("K0 must be finite and >= 0, got {k0}")));
        }
        if !gamma.is_finite() {
            return Err(ChromError::config(format!("gamma must be finite, got {gamma}")));
        }
        if zeta_mv.iter().any(|z| !z.is_finite()) {
            return Err(ChromError::config(format!("zeta potentials must be finite, got {zeta_mv:?}")));
        }
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(ChromError::config(format!("capacity must be > 0, got {capacity}")));
        }
        response.validate()?;

        let n_species = zeta_mv.len();
        Ok(Self {
            k0,
            gamma,
            zeta_abs: DVector::from_iterator(n_species, zeta_mv.iter().map(|z| z.abs())),
            response,
            desorption: ResolvedDesorption::resolve(desorption, n_species)?,
            capacity,
        })
    }

    /// Number of species
    pub fn n_species(&self) -> usize {
        self.zeta_abs.len()
    }

    /// Shared binding capacity per cell
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Equilibrium affinity $K_i$ per species at ionic strength `ionic`
    pub fn affinity(&self, ionic: f64) -> DVector<f64> {
        let f_i = self.response.evaluate(ionic);
        self.zeta_abs.map(|z| self.k0 * (self.gamma * z * f_i).exp())
    }

    /// Desorption rate $k_{d,i}$ per species at ionic strength `ionic`
    ///
    /// # Errors
    ///
    /// Shape error when a per-species law returns the wrong number of rates.
    pub fn desorption_rates(&self, ionic: f64) -> Result<DVector<f64>> {
        match &self.desorption {
            ResolvedDesorption::Fixed(kd) => Ok(kd.clone()),
            ResolvedDesorption::Uniform(law) => Ok(DVector::from_element(self.n_species(), law(ionic))),
            ResolvedDesorption::PerSpecies(law) => {
                let kd = law(ionic);
                if kd.len() != self.n_species() {
                    return Err(ChromError::shape("desorption law", self.n_species(), kd.len()));
                }
                Ok(kd)
            }
        }
    }

    /// `(k_a, k_d)` per species at ionic strength `ionic`
    pub fn rate_constants(&self, ionic: f64) -> Result<(DVector<f64>, DVector<f64>)> {
        let kd = self.desorption_rates(ionic)?;
        let ka = self.affinity(ionic).component_mul(&kd);
        Ok((ka, kd))
    }

    /// Free capacity per cell, clamped at zero
    ///
    /// `q` is the physical bound amount `[N × Ns]`.
    pub fn free_capacity(&self, q: &DMatrix<f64>) -> DVector<f64> {
        DVector::from_iterator(
            q.nrows(),
            q.row_iter().map(|row| (self.capacity - row.sum()).max(0.0)),
        )
    }

    /// Physical bound-phase rate $dQ/dt$ `[N × Ns]`
    ///
    /// `c` and `q` are the physical mobile concentration and bound amount, `[N × Ns]`.
    ///
    /// # Errors
    ///
    /// Shape error when `c` / `q` do not have Ns columns or differ in shape.
    pub fn bound_rate(&self, ionic: f64, c: &DMatrix<f64>, q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let n_species = self.n_species();
        if c.ncols() != n_species {
            return Err(ChromError::shape("mobile phase species", n_species, c.ncols()));
        }
        if q.ncols() != n_species {
            return Err(ChromError::shape("bound phase species", n_species, q.ncols()));
        }
        if q.nrows() != c.nrows() {
            return Err(ChromError::shape("bound phase cells", c.nrows(), q.nrows()));
        }

        let (ka, kd) = self.rate_constants(ionic)?;
        let q_free = self.free_capacity(q);

        Ok(DMatrix::from_fn(c.nrows(), n_species, |i, s| {
            ka[s] * c[(i, s)] * q_free[i] - kd[s] * q[(i, s)]
        }))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
