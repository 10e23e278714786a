//! Parallel processing utilities for computationally intensive operations.
//!
//! Every coordinate of a finite difference gradient is independent of the
//! others, so the perturbed evaluations can run on the rayon thread pool.

use ndarray::Array1;
use rayon::prelude::*;

use crate::error::{Result, ThermoError};
use crate::utils::finite_difference::{scaled_step, DEFAULT_EPSILON};

/// Compute the gradient of a scalar function using central finite differences
/// in parallel.
///
/// Produces the same values as
/// [`finite_difference::gradient`](super::finite_difference::gradient), with
/// the coordinates distributed over the rayon thread pool.
///
/// # Arguments
///
/// * `f` - The function to differentiate; must be callable from several threads
/// * `params` - The parameter values at which to evaluate the gradient
/// * `epsilon` - The step size for finite differences (optional)
pub fn gradient_parallel<F>(f: F, params: &Array1<f64>, epsilon: Option<f64>) -> Result<Array1<f64>>
where
    F: Fn(&Array1<f64>) -> Result<f64> + Sync,
{
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    if !(eps.is_finite() && eps > 0.0) {
        return Err(ThermoError::InvalidInput(format!(
            "Finite difference step must be positive and finite, got {}",
            eps
        )));
    }

    let partials: Result<Vec<f64>> = (0..params.len())
        .into_par_iter()
        .map(|j| {
            let h = scaled_step(eps, params[j]);

            let mut params_forward = params.clone();
            params_forward[j] += h;

            let mut params_backward = params.clone();
            params_backward[j] -= h;

            Ok((f(&params_forward)? - f(&params_backward)?) / (2.0 * h))
        })
        .collect();

    Ok(Array1::from_vec(partials?))
}
