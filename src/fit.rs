//! Fitting the density model to tabulated data.
//!
//! [`FitProblem`] turns a [`FitDataset`] into a [`Problem`]: minimise the
//! mean absolute error between `log10` of the tabulated densities and
//! `log10` of the model prediction. Working in log space weights every
//! altitude equally even though density spans many orders of magnitude.
//!
//! The problem is not unit agnostic: the default [`TermBounds`] are tuned for
//! altitudes in km and densities in kg/m³.

use ndarray::{s, Array1};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bounds::Bounds;
use crate::density;
use crate::error::{Result, ThermoError};
use crate::problem::Problem;
use crate::utils::finite_difference::{CentralDifference, GradientStrategy};

/// Altitudes and the densities observed at them.
///
/// The densities must be strictly positive; this is the caller's
/// responsibility and is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FitDatasetHelper", into = "FitDatasetHelper")]
pub struct FitDataset {
    x: Array1<f64>,
    y: Array1<f64>,
    n_terms: usize,
}

#[derive(Serialize, Deserialize)]
struct FitDatasetHelper {
    x: Vec<f64>,
    y: Vec<f64>,
    n_terms: usize,
}

impl TryFrom<FitDatasetHelper> for FitDataset {
    type Error = ThermoError;

    fn try_from(helper: FitDatasetHelper) -> Result<Self> {
        Self::new(
            Array1::from_vec(helper.x),
            Array1::from_vec(helper.y),
            helper.n_terms,
        )
    }
}

impl From<FitDataset> for FitDatasetHelper {
    fn from(dataset: FitDataset) -> Self {
        Self {
            x: dataset.x.to_vec(),
            y: dataset.y.to_vec(),
            n_terms: dataset.n_terms,
        }
    }
}

impl FitDataset {
    /// Pair altitudes `x` with densities `y`, to be fitted with `n_terms`
    /// exponentials.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `x` and `y` differ in length, `InvalidInput`
    /// if they are empty or `n_terms` is zero.
    pub fn new(x: Array1<f64>, y: Array1<f64>, n_terms: usize) -> Result<Self> {
        if x.len() != y.len() {
            return Err(ThermoError::DimensionMismatch(format!(
                "Got {} altitudes but {} densities",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(ThermoError::InvalidInput(
                "Dataset must contain at least one sample".to_string(),
            ));
        }
        if n_terms == 0 {
            return Err(ThermoError::InvalidInput(
                "At least one exponential term is required".to_string(),
            ));
        }
        Ok(Self { x, y, n_terms })
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Upper limits of the search box, per parameter block. Every lower limit
/// is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermBounds {
    /// Upper bound of every amplitude. Default: 0.1
    pub alpha_max: f64,

    /// Upper bound of every decay rate. Default: 0.1
    pub beta_max: f64,

    /// Upper bound of every reference altitude. Default: 100.0
    pub gamma_max: f64,
}

impl Default for TermBounds {
    fn default() -> Self {
        Self {
            alpha_max: 0.1,
            beta_max: 0.1,
            gamma_max: 100.0,
        }
    }
}

impl TermBounds {
    /// Check that every limit is finite and non-negative, so the box is
    /// neither empty nor unbounded.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("alpha_max", self.alpha_max),
            ("beta_max", self.beta_max),
            ("gamma_max", self.gamma_max),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ThermoError::InvalidInput(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// The box for `n_terms` terms, in `[alphas | betas | gammas]` layout.
    pub fn to_bounds(&self, n_terms: usize) -> Result<Bounds> {
        self.validate()?;
        Ok(self.build(n_terms))
    }

    fn build(&self, n_terms: usize) -> Bounds {
        let mut upper = Array1::zeros(3 * n_terms);
        upper.slice_mut(s![0..n_terms]).fill(self.alpha_max);
        upper.slice_mut(s![n_terms..2 * n_terms]).fill(self.beta_max);
        upper.slice_mut(s![2 * n_terms..3 * n_terms]).fill(self.gamma_max);
        Bounds::from_validated(Array1::zeros(3 * n_terms), upper)
    }
}

/// Log-space mean absolute error of a multi-exponential fit.
///
/// Stateless over calls: the dataset is immutable and every evaluation
/// allocates its own buffers, so one instance may be shared across threads.
#[derive(Debug, Clone)]
pub struct FitProblem<G: GradientStrategy = CentralDifference> {
    dataset: FitDataset,
    log_y: Array1<f64>,
    term_bounds: TermBounds,
    strategy: G,
}

impl FitProblem<CentralDifference> {
    /// Problem over `dataset` with central-difference gradients and the
    /// default bounds.
    pub fn new(dataset: FitDataset) -> Self {
        Self::with_strategy(dataset, CentralDifference::default())
    }
}

impl<G: GradientStrategy> FitProblem<G> {
    /// Problem over `dataset` with an explicit gradient strategy.
    pub fn with_strategy(dataset: FitDataset, strategy: G) -> Self {
        debug!(
            samples = dataset.len(),
            n_terms = dataset.n_terms(),
            ?strategy,
            "created density fit problem"
        );
        let log_y = dataset.y.mapv(f64::log10);
        Self {
            dataset,
            log_y,
            term_bounds: TermBounds::default(),
            strategy,
        }
    }

    /// Replace the search box limits.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if any limit is negative or NaN, since it would leave
    /// an empty box above the zero lower bounds.
    pub fn with_term_bounds(mut self, term_bounds: TermBounds) -> Result<Self> {
        term_bounds.validate()?;
        self.term_bounds = term_bounds;
        Ok(self)
    }

    pub fn dataset(&self) -> &FitDataset {
        &self.dataset
    }

    pub fn strategy(&self) -> &G {
        &self.strategy
    }

    pub fn term_bounds(&self) -> &TermBounds {
        &self.term_bounds
    }

    /// Model densities at the dataset altitudes.
    pub fn predict(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_dimension(params)?;
        density::evaluate(&self.dataset.x, params)
    }

    fn check_dimension(&self, params: &Array1<f64>) -> Result<()> {
        if params.len() != self.dimension() {
            return Err(ThermoError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                self.dimension(),
                params.len()
            )));
        }
        Ok(())
    }
}

impl<G: GradientStrategy> Problem for FitProblem<G> {
    fn dimension(&self) -> usize {
        3 * self.dataset.n_terms
    }

    /// `mean_i |log10(y_i) - log10(rho(x_i))|`
    ///
    /// Returns `+∞` when the model predicts zero density at some altitude,
    /// and NaN when it predicts a negative one.
    fn fitness(&self, params: &Array1<f64>) -> Result<f64> {
        let predicted = self.predict(params)?;
        let total: f64 = self
            .log_y
            .iter()
            .zip(predicted.iter())
            .map(|(log_y, rho)| (log_y - rho.log10()).abs())
            .sum();
        let fitness = total / self.dataset.len() as f64;

        if !fitness.is_finite() {
            trace!(fitness, "degenerate fitness value");
        }
        Ok(fitness)
    }

    fn bounds(&self) -> Bounds {
        self.term_bounds.build(self.dataset.n_terms)
    }

    fn gradient(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_dimension(params)?;
        trace!(?params, "estimating fitness gradient");
        self.strategy.estimate(|x| self.fitness(x), params)
    }

    fn has_gradient(&self) -> bool {
        true
    }
}
