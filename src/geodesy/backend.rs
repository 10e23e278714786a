//! Math backends for the coordinate transforms.
//!
//! The transforms are written once against [`Math`] and instantiated with a
//! backend:
//!
//! - [`NumericBackend`] evaluates scalars eagerly.
//! - [`ArrayBackend`] evaluates `ndarray` arrays element-wise.
//! - [`SymbolicBackend`] builds an expression graph instead of computing.
//!
//! Every primitive mirrors a single IEEE operation, and the scalar operand of
//! the mixed primitives (`scale`, `div_scalar`, `rsub`, `rdiv`) is always a
//! plain `f64`. A graph produced by the symbolic backend therefore replays
//! the exact arithmetic of the numeric backends when evaluated.

use ndarray::{Array1, Zip};

use crate::error::{Result, ThermoError};

/// Trigonometric and algebraic primitives over a backend value type.
///
/// Implementations must not let control flow depend on the values they
/// produce; the symbolic backend has no values to inspect.
pub trait Math {
    /// The value type carried through the computation.
    type Value: Clone;

    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn mul(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn div(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// `a * c`
    fn scale(&self, a: &Self::Value, c: f64) -> Self::Value;

    /// `a / c`
    fn div_scalar(&self, a: &Self::Value, c: f64) -> Self::Value;

    /// `c - a`
    fn rsub(&self, c: f64, a: &Self::Value) -> Self::Value;

    /// `c / a`
    fn rdiv(&self, c: f64, a: &Self::Value) -> Self::Value;

    fn sqrt(&self, a: &Self::Value) -> Self::Value;
    fn sin(&self, a: &Self::Value) -> Self::Value;
    fn cos(&self, a: &Self::Value) -> Self::Value;
    fn atan(&self, a: &Self::Value) -> Self::Value;

    /// Four-quadrant arc tangent of `y / x`.
    fn atan2(&self, y: &Self::Value, x: &Self::Value) -> Self::Value;

    /// `a * a`
    fn square(&self, a: &Self::Value) -> Self::Value {
        self.mul(a, a)
    }

    /// Check that a group of inputs can be combined element-wise.
    fn check_shapes(&self, _values: &[&Self::Value]) -> Result<()> {
        Ok(())
    }
}

/// Eager evaluation over `f64` scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericBackend;

impl Math for NumericBackend {
    type Value = f64;

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn sub(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn div(&self, a: &f64, b: &f64) -> f64 {
        a / b
    }

    fn scale(&self, a: &f64, c: f64) -> f64 {
        a * c
    }

    fn div_scalar(&self, a: &f64, c: f64) -> f64 {
        a / c
    }

    fn rsub(&self, c: f64, a: &f64) -> f64 {
        c - a
    }

    fn rdiv(&self, c: f64, a: &f64) -> f64 {
        c / a
    }

    fn sqrt(&self, a: &f64) -> f64 {
        a.sqrt()
    }

    fn sin(&self, a: &f64) -> f64 {
        a.sin()
    }

    fn cos(&self, a: &f64) -> f64 {
        a.cos()
    }

    fn atan(&self, a: &f64) -> f64 {
        a.atan()
    }

    fn atan2(&self, y: &f64, x: &f64) -> f64 {
        y.atan2(*x)
    }
}

/// Eager element-wise evaluation over one-dimensional arrays.
///
/// All arrays combined in one transform call must have the same length; this
/// is checked once on entry through [`Math::check_shapes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayBackend;

impl ArrayBackend {
    fn zip_with(a: &Array1<f64>, b: &Array1<f64>, f: impl Fn(f64, f64) -> f64) -> Array1<f64> {
        Zip::from(a).and(b).map_collect(|&a, &b| f(a, b))
    }
}

impl Math for ArrayBackend {
    type Value = Array1<f64>;

    fn add(&self, a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
        Self::zip_with(a, b, |a, b| a + b)
    }

    fn sub(&self, a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
        Self::zip_with(a, b, |a, b| a - b)
    }

    fn mul(&self, a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
        Self::zip_with(a, b, |a, b| a * b)
    }

    fn div(&self, a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
        Self::zip_with(a, b, |a, b| a / b)
    }

    fn scale(&self, a: &Array1<f64>, c: f64) -> Array1<f64> {
        a.mapv(|v| v * c)
    }

    fn div_scalar(&self, a: &Array1<f64>, c: f64) -> Array1<f64> {
        a.mapv(|v| v / c)
    }

    fn rsub(&self, c: f64, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(|v| c - v)
    }

    fn rdiv(&self, c: f64, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(|v| c / v)
    }

    fn sqrt(&self, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(f64::sqrt)
    }

    fn sin(&self, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(f64::sin)
    }

    fn cos(&self, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(f64::cos)
    }

    fn atan(&self, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(f64::atan)
    }

    fn atan2(&self, y: &Array1<f64>, x: &Array1<f64>) -> Array1<f64> {
        Self::zip_with(y, x, f64::atan2)
    }

    fn check_shapes(&self, values: &[&Array1<f64>]) -> Result<()> {
        if let Some((first, rest)) = values.split_first() {
            if let Some(other) = rest.iter().find(|v| v.len() != first.len()) {
                return Err(ThermoError::DimensionMismatch(format!(
                    "Coordinate arrays must have equal lengths, got {} and {}",
                    first.len(),
                    other.len()
                )));
            }
        }
        Ok(())
    }
}

/// Deferred evaluation: every primitive returns a new graph node.
#[cfg(feature = "symbolic")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicBackend;

#[cfg(feature = "symbolic")]
mod symbolic_impl {
    use super::{Math, SymbolicBackend};
    use crate::symbolic::Expr;

    impl Math for SymbolicBackend {
        type Value = Expr;

        fn add(&self, a: &Expr, b: &Expr) -> Expr {
            a + b
        }

        fn sub(&self, a: &Expr, b: &Expr) -> Expr {
            a - b
        }

        fn mul(&self, a: &Expr, b: &Expr) -> Expr {
            a * b
        }

        fn div(&self, a: &Expr, b: &Expr) -> Expr {
            a / b
        }

        fn scale(&self, a: &Expr, c: f64) -> Expr {
            a * c
        }

        fn div_scalar(&self, a: &Expr, c: f64) -> Expr {
            a / c
        }

        fn rsub(&self, c: f64, a: &Expr) -> Expr {
            c - a
        }

        fn rdiv(&self, c: f64, a: &Expr) -> Expr {
            c / a
        }

        fn sqrt(&self, a: &Expr) -> Expr {
            a.sqrt()
        }

        fn sin(&self, a: &Expr) -> Expr {
            a.sin()
        }

        fn cos(&self, a: &Expr) -> Expr {
            a.cos()
        }

        fn atan(&self, a: &Expr) -> Expr {
            a.atan()
        }

        fn atan2(&self, y: &Expr, x: &Expr) -> Expr {
            y.atan2(x)
        }
    }
}
