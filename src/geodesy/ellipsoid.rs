//! Reference ellipsoids.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermoError};

/// WGS84 semi-major axis in meters.
pub const WGS84_A: f64 = 6378137.0;

/// WGS84 semi-minor axis in meters.
pub const WGS84_B: f64 = 6356752.314245;

/// A reference ellipsoid of revolution.
///
/// Holds the equatorial radius and the squared eccentricity
/// `e2 = 1 - b^2 / a^2`. The radius fixes the length unit of every coordinate
/// converted against this ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EllipsoidHelper")]
pub struct Ellipsoid {
    r_eq: f64,
    e2: f64,
}

#[derive(Deserialize)]
struct EllipsoidHelper {
    r_eq: f64,
    e2: f64,
}

impl TryFrom<EllipsoidHelper> for Ellipsoid {
    type Error = ThermoError;

    fn try_from(helper: EllipsoidHelper) -> Result<Self> {
        Self::new(helper.r_eq, helper.e2)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Ellipsoid {
    /// Create an ellipsoid from its equatorial radius and squared eccentricity.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `r_eq` is not a positive finite number or if `e2`
    /// lies outside `[0, 1)`.
    pub fn new(r_eq: f64, e2: f64) -> Result<Self> {
        if !(r_eq.is_finite() && r_eq > 0.0) {
            return Err(ThermoError::InvalidInput(format!(
                "Equatorial radius must be positive and finite, got {}",
                r_eq
            )));
        }
        if !(0.0..1.0).contains(&e2) {
            return Err(ThermoError::InvalidInput(format!(
                "Squared eccentricity must lie in [0, 1), got {}",
                e2
            )));
        }
        Ok(Self { r_eq, e2 })
    }

    /// Create an ellipsoid from its semi-major and semi-minor axes.
    pub fn from_axes(a: f64, b: f64) -> Result<Self> {
        if !(b.is_finite() && b > 0.0) || b > a {
            return Err(ThermoError::InvalidInput(format!(
                "Semi-minor axis must be positive and not exceed the semi-major axis, got a = {}, b = {}",
                a, b
            )));
        }
        Self::new(a, 1.0 - b * b / (a * a))
    }

    /// The WGS84 ellipsoid, in meters.
    pub fn wgs84() -> Self {
        Self {
            r_eq: WGS84_A,
            e2: 1.0 - WGS84_B * WGS84_B / (WGS84_A * WGS84_A),
        }
    }

    /// A sphere of the given radius.
    pub fn sphere(radius: f64) -> Result<Self> {
        Self::new(radius, 0.0)
    }

    /// Equatorial radius.
    pub fn r_eq(&self) -> f64 {
        self.r_eq
    }

    /// Squared eccentricity.
    pub fn e2(&self) -> f64 {
        self.e2
    }

    /// Polar radius, `a * sqrt(1 - e2)`.
    pub fn polar_radius(&self) -> f64 {
        self.r_eq * (1.0 - self.e2).sqrt()
    }
}
