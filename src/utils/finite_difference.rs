//! Finite difference methods for numerical differentiation.
//!
//! Gradients of scalar objectives are estimated through a [`GradientStrategy`].
//! The perturbation applied to coordinate `j` is `step * max(|x_j|, 1)`, so the
//! step is absolute near zero and relative for large parameters.
//!
//! Non-finite objective values are not treated specially: an infinite or NaN
//! objective at a perturbed point yields an infinite or NaN derivative.

use std::fmt::Debug;

use ndarray::Array1;
use tracing::trace;

use crate::error::{Result, ThermoError};

/// Default step size for first-order and central differences.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Default step size for the six-point stencil.
pub const DEFAULT_HIGHER_ORDER_EPSILON: f64 = 1e-2;

/// A scheme for estimating the gradient of a scalar function.
pub trait GradientStrategy: Debug + Send + Sync {
    /// Estimate `∂f/∂x_j` for every coordinate of `params`.
    fn estimate<F>(&self, f: F, params: &Array1<f64>) -> Result<Array1<f64>>
    where
        F: Fn(&Array1<f64>) -> Result<f64> + Sync;
}

/// Perturbation applied to a coordinate with value `x`.
#[inline]
pub(crate) fn scaled_step(step: f64, x: f64) -> f64 {
    step * x.abs().max(1.0)
}

fn validate_step(step: f64) -> Result<f64> {
    if !(step.is_finite() && step > 0.0) {
        return Err(ThermoError::InvalidInput(format!(
            "Finite difference step must be positive and finite, got {}",
            step
        )));
    }
    Ok(step)
}

/// Evaluate `f` with coordinate `j` shifted by `delta`.
fn shifted<F>(f: &F, params: &Array1<f64>, j: usize, delta: f64) -> Result<f64>
where
    F: Fn(&Array1<f64>) -> Result<f64>,
{
    let mut perturbed = params.clone();
    perturbed[j] += delta;
    f(&perturbed)
}

/// Central differences, `(f(x + h) - f(x - h)) / 2h`. Second-order accurate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralDifference {
    step: f64,
    parallel: bool,
}

impl Default for CentralDifference {
    fn default() -> Self {
        Self {
            step: DEFAULT_EPSILON,
            parallel: false,
        }
    }
}

impl CentralDifference {
    pub fn new(step: f64) -> Result<Self> {
        Ok(Self {
            step: validate_step(step)?,
            ..Self::default()
        })
    }

    /// Evaluate the coordinates in parallel with rayon.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl GradientStrategy for CentralDifference {
    fn estimate<F>(&self, f: F, params: &Array1<f64>) -> Result<Array1<f64>>
    where
        F: Fn(&Array1<f64>) -> Result<f64> + Sync,
    {
        if self.parallel {
            return super::parallel::gradient_parallel(f, params, Some(self.step));
        }
        gradient(f, params, Some(self.step))
    }
}

/// Forward differences, `(f(x + h) - f(x)) / h`. First-order accurate, one
/// evaluation per coordinate plus one at `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardDifference {
    step: f64,
}

impl Default for ForwardDifference {
    fn default() -> Self {
        Self {
            step: DEFAULT_EPSILON,
        }
    }
}

impl ForwardDifference {
    pub fn new(step: f64) -> Result<Self> {
        Ok(Self {
            step: validate_step(step)?,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl GradientStrategy for ForwardDifference {
    fn estimate<F>(&self, f: F, params: &Array1<f64>) -> Result<Array1<f64>>
    where
        F: Fn(&Array1<f64>) -> Result<f64> + Sync,
    {
        let f0 = f(params)?;
        let mut grad = Array1::zeros(params.len());
        for j in 0..params.len() {
            let h = scaled_step(self.step, params[j]);
            grad[j] = (shifted(&f, params, j, h)? - f0) / h;
        }
        Ok(grad)
    }
}

/// Six-point central stencil:
///
/// `m_k = (f(x + k h) - f(x - k h)) / 2 k h`,
/// `∂f/∂x ≈ 3/2 m_1 - 3/5 m_2 + 1/10 m_3`.
///
/// Sixth-order accurate, which allows a much larger step than the
/// two-point schemes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HigherOrderDifference {
    step: f64,
}

impl Default for HigherOrderDifference {
    fn default() -> Self {
        Self {
            step: DEFAULT_HIGHER_ORDER_EPSILON,
        }
    }
}

impl HigherOrderDifference {
    pub fn new(step: f64) -> Result<Self> {
        Ok(Self {
            step: validate_step(step)?,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl GradientStrategy for HigherOrderDifference {
    fn estimate<F>(&self, f: F, params: &Array1<f64>) -> Result<Array1<f64>>
    where
        F: Fn(&Array1<f64>) -> Result<f64> + Sync,
    {
        let mut grad = Array1::zeros(params.len());
        for j in 0..params.len() {
            let h = scaled_step(self.step, params[j]);
            let mut m = [0.0; 3];
            for (k, slot) in m.iter_mut().enumerate() {
                let kh = (k + 1) as f64 * h;
                *slot = (shifted(&f, params, j, kh)? - shifted(&f, params, j, -kh)?) / (2.0 * kh);
            }
            grad[j] = 1.5 * m[0] - 0.6 * m[1] + 0.1 * m[2];
        }
        Ok(grad)
    }
}

/// Compute the gradient of a scalar function using central finite differences.
///
/// The gradient is the vector of partial derivatives of the function with
/// respect to the parameters: grad[j] = ∂f/∂param[j].
///
/// # Arguments
///
/// * `f` - The function to differentiate
/// * `params` - The parameter values at which to evaluate the gradient
/// * `epsilon` - The step size for finite differences (optional)
///
/// # Returns
///
/// * `Result<Array1<f64>>` - The gradient vector
pub fn gradient<F>(f: F, params: &Array1<f64>, epsilon: Option<f64>) -> Result<Array1<f64>>
where
    F: Fn(&Array1<f64>) -> Result<f64>,
{
    let eps = validate_step(epsilon.unwrap_or(DEFAULT_EPSILON))?;
    let mut grad = Array1::zeros(params.len());

    for j in 0..params.len() {
        let h = scaled_step(eps, params[j]);
        let f_forward = shifted(&f, params, j, h)?;
        let f_backward = shifted(&f, params, j, -h)?;
        grad[j] = (f_forward - f_backward) / (2.0 * h);
    }

    if grad.iter().any(|g| !g.is_finite()) {
        trace!(?grad, "non-finite gradient estimate");
    }

    Ok(grad)
}
