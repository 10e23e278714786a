//! Box bounds on an optimization problem's decision vector.

use ndarray::{Array1, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermoError};

/// An axis-aligned box `lower[i] <= x[i] <= upper[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundsHelper", into = "BoundsHelper")]
pub struct Bounds {
    lower: Array1<f64>,
    upper: Array1<f64>,
}

#[derive(Serialize, Deserialize)]
struct BoundsHelper {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl From<Bounds> for BoundsHelper {
    fn from(bounds: Bounds) -> Self {
        Self {
            lower: bounds.lower.to_vec(),
            upper: bounds.upper.to_vec(),
        }
    }
}

impl TryFrom<BoundsHelper> for Bounds {
    type Error = ThermoError;

    fn try_from(helper: BoundsHelper) -> Result<Self> {
        Self::new(Array1::from_vec(helper.lower), Array1::from_vec(helper.upper))
    }
}

impl Bounds {
    /// Create a new box.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the vectors differ in length, `InvalidInput` if
    /// any lower bound exceeds its upper bound, or if a limit or the width of
    /// a coordinate's range is not finite.
    pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(ThermoError::DimensionMismatch(format!(
                "Lower bounds have length {}, upper bounds {}",
                lower.len(),
                upper.len()
            )));
        }
        if let Some(i) = (0..lower.len()).find(|&i| !(lower[i] <= upper[i])) {
            return Err(ThermoError::InvalidInput(format!(
                "Invalid bounds at index {}: min ({}) must not exceed max ({})",
                i, lower[i], upper[i]
            )));
        }
        if let Some(i) = (0..lower.len()).find(|&i| !(upper[i] - lower[i]).is_finite()) {
            return Err(ThermoError::InvalidInput(format!(
                "Unbounded range at index {}: [{}, {}]",
                i, lower[i], upper[i]
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Wrap vectors already known to form a valid box.
    pub(crate) fn from_validated(lower: Array1<f64>, upper: Array1<f64>) -> Self {
        debug_assert!(lower.len() == upper.len());
        Self { lower, upper }
    }

    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    /// Number of bounded coordinates.
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// `(min, max)` pairs, one per coordinate.
    pub fn to_pairs(&self) -> Vec<(f64, f64)> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| (lo, hi))
            .collect()
    }

    /// Whether `x` lies inside the box (boundaries included).
    pub fn contains(&self, x: &Array1<f64>) -> bool {
        x.len() == self.dimension()
            && x
                .iter()
                .zip(self.to_pairs())
                .all(|(&v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Project `x` onto the box.
    pub fn clamp(&self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_dimension(x)?;
        Ok(Zip::from(x)
            .and(&self.lower)
            .and(&self.upper)
            .map_collect(|&v, &lo, &hi| v.max(lo).min(hi)))
    }

    /// Draw a point uniformly from the box.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Array1<f64> {
        self.to_pairs()
            .into_iter()
            .map(|(lo, hi)| (lo + rng.gen::<f64>() * (hi - lo)).min(hi))
            .collect()
    }

    fn check_dimension(&self, x: &Array1<f64>) -> Result<()> {
        if x.len() != self.dimension() {
            return Err(ThermoError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                self.dimension(),
                x.len()
            )));
        }
        Ok(())
    }
}
