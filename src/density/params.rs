//! Parameter vectors of the multi-exponential density model.
//!
//! The flat layout `[alpha_0..alpha_n | beta_0..beta_n | gamma_0..gamma_n]`
//! is shared with every optimizer that produces these vectors and must be
//! kept exactly.

use ndarray::{s, Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermoError};

/// One term `alpha * exp(-(h - gamma) * beta)` of the density model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialTerm {
    /// Amplitude
    pub alpha: f64,
    /// Decay rate
    pub beta: f64,
    /// Reference altitude
    pub gamma: f64,
}

impl ExponentialTerm {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Contribution of this term at altitude `h`.
    #[inline]
    pub fn eval(&self, h: f64) -> f64 {
        self.alpha * (-(h - self.gamma) * self.beta).exp()
    }
}

/// Number of terms encoded by a flat parameter vector of length `len`.
///
/// # Errors
///
/// `InvalidInput` if `len` is zero or not a multiple of three.
pub fn term_count(len: usize) -> Result<usize> {
    if len == 0 || len % 3 != 0 {
        return Err(ThermoError::InvalidInput(format!(
            "Parameter vector length must be a positive multiple of 3, got {}",
            len
        )));
    }
    Ok(len / 3)
}

/// Split a flat parameter vector into its alpha, beta and gamma blocks.
pub fn split_blocks(
    params: &Array1<f64>,
) -> Result<(ArrayView1<'_, f64>, ArrayView1<'_, f64>, ArrayView1<'_, f64>)> {
    let n = term_count(params.len())?;
    Ok((
        params.slice(s![0..n]),
        params.slice(s![n..2 * n]),
        params.slice(s![2 * n..3 * n]),
    ))
}

/// A validated flat parameter vector.
///
/// Serializes as the plain flat list of `3n` numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DensityParams {
    values: Array1<f64>,
}

impl DensityParams {
    /// Wrap a flat `[alphas | betas | gammas]` vector.
    pub fn new(values: Array1<f64>) -> Result<Self> {
        term_count(values.len())?;
        Ok(Self { values })
    }

    /// Build the flat vector from a list of terms.
    pub fn from_terms(terms: &[ExponentialTerm]) -> Result<Self> {
        let n = terms.len();
        let mut values = Array1::zeros(3 * n);
        for (i, term) in terms.iter().enumerate() {
            values[i] = term.alpha;
            values[n + i] = term.beta;
            values[2 * n + i] = term.gamma;
        }
        Self::new(values)
    }

    /// Number of exponential terms.
    pub fn n_terms(&self) -> usize {
        self.values.len() / 3
    }

    pub fn alphas(&self) -> ArrayView1<'_, f64> {
        self.values.slice(s![0..self.n_terms()])
    }

    pub fn betas(&self) -> ArrayView1<'_, f64> {
        let n = self.n_terms();
        self.values.slice(s![n..2 * n])
    }

    pub fn gammas(&self) -> ArrayView1<'_, f64> {
        let n = self.n_terms();
        self.values.slice(s![2 * n..3 * n])
    }

    /// The terms in order.
    pub fn terms(&self) -> Vec<ExponentialTerm> {
        let (alphas, betas, gammas) = (self.alphas(), self.betas(), self.gammas());
        (0..self.n_terms())
            .map(|i| ExponentialTerm::new(alphas[i], betas[i], gammas[i]))
            .collect()
    }

    /// The flat vector.
    pub fn as_array(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn into_array(self) -> Array1<f64> {
        self.values
    }

    /// Serialize to a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON array, validating its length.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<Vec<f64>> for DensityParams {
    type Error = ThermoError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(Array1::from_vec(values))
    }
}

impl From<DensityParams> for Vec<f64> {
    fn from(params: DensityParams) -> Self {
        params.values.to_vec()
    }
}
