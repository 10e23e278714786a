//! Problem definition trait.
//!
//! This module defines the `Problem` trait, the contract between a box-bounded
//! scalar minimisation problem and any black-box optimizer (evolutionary,
//! gradient-based or hybrid). The optimizer sees only the dimension, the
//! objective, a gradient and the bounds; nothing about what is being fitted.

use ndarray::Array1;

use crate::bounds::Bounds;
use crate::error::Result;

/// A box-bounded, single-objective minimisation problem.
///
/// `fitness` may legitimately return `+∞` or NaN for degenerate candidates.
/// Optimizers consuming this trait must tolerate such values (typically by
/// ranking the candidate last) rather than treating them as errors. `Err` is
/// reserved for calls that violate the contract, such as a parameter vector
/// of the wrong length.
pub trait Problem {
    /// Length of the decision vector.
    fn dimension(&self) -> usize;

    /// Evaluate the objective at `params`.
    fn fitness(&self, params: &Array1<f64>) -> Result<f64>;

    /// Lower and upper bounds of the decision vector.
    fn bounds(&self) -> Bounds;

    /// Estimate the gradient of the objective at `params`.
    ///
    /// # Default Implementation
    ///
    /// Central finite differences with the default step.
    fn gradient(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        crate::utils::finite_difference::gradient(|x| self.fitness(x), params, None)
    }

    /// Check if this problem provides its own gradient implementation.
    fn has_gradient(&self) -> bool {
        false
    }
}
