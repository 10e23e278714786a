//! Multi-exponential density model.
//!
//! ρ(h) = Σᵢ αᵢ · exp(−(h − γᵢ) · βᵢ)
//!
//! The model is unit agnostic. The default fit bounds assume altitudes in km
//! and densities in kg/m³.

use ndarray::{Array1, ArrayView1, Zip};

use super::params::{split_blocks, DensityParams, ExponentialTerm};
use crate::error::Result;

/// Evaluate the model with a flat `[alphas | betas | gammas]` vector.
///
/// Returns one density per altitude; an empty altitude array gives an empty
/// result.
///
/// # Errors
///
/// `InvalidInput` if `params` is empty or its length is not a multiple of 3.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use thermonets_rs::density::evaluate;
///
/// let rho = evaluate(&array![100.0, 200.0], &array![1.0, 0.0, 0.0]).unwrap();
/// assert_eq!(rho, array![1.0, 1.0]);
/// ```
pub fn evaluate(altitudes: &Array1<f64>, params: &Array1<f64>) -> Result<Array1<f64>> {
    let (alphas, betas, gammas) = split_blocks(params)?;
    Ok(accumulate(altitudes, alphas, betas, gammas))
}

/// Evaluate the model at a single altitude.
pub fn evaluate_at(altitude: f64, params: &Array1<f64>) -> Result<f64> {
    let (alphas, betas, gammas) = split_blocks(params)?;
    Ok(alphas
        .iter()
        .zip(betas.iter())
        .zip(gammas.iter())
        .map(|((&alpha, &beta), &gamma)| ExponentialTerm::new(alpha, beta, gamma).eval(altitude))
        .sum())
}

fn accumulate(
    altitudes: &Array1<f64>,
    alphas: ArrayView1<'_, f64>,
    betas: ArrayView1<'_, f64>,
    gammas: ArrayView1<'_, f64>,
) -> Array1<f64> {
    let mut rho = Array1::zeros(altitudes.len());
    for ((&alpha, &beta), &gamma) in alphas.iter().zip(betas.iter()).zip(gammas.iter()) {
        let term = ExponentialTerm::new(alpha, beta, gamma);
        Zip::from(&mut rho)
            .and(altitudes)
            .for_each(|r, &h| *r += term.eval(h));
    }
    rho
}

/// A density model with fixed, validated parameters, typically the result of
/// a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityModel {
    params: DensityParams,
}

impl DensityModel {
    pub fn new(params: DensityParams) -> Self {
        Self { params }
    }

    /// Build a model from a flat parameter vector.
    pub fn from_array(params: Array1<f64>) -> Result<Self> {
        Ok(Self::new(DensityParams::new(params)?))
    }

    pub fn params(&self) -> &DensityParams {
        &self.params
    }

    pub fn n_terms(&self) -> usize {
        self.params.n_terms()
    }

    /// Density at each altitude.
    pub fn evaluate(&self, altitudes: &Array1<f64>) -> Array1<f64> {
        accumulate(
            altitudes,
            self.params.alphas(),
            self.params.betas(),
            self.params.gammas(),
        )
    }

    /// Density at a single altitude.
    pub fn evaluate_at(&self, altitude: f64) -> f64 {
        self.params.terms().iter().map(|term| term.eval(altitude)).sum()
    }
}
