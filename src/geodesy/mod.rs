//! # Geodesy
//!
//! Conversion between Cartesian and geodetic coordinates over a reference
//! [`Ellipsoid`], generic over a [`Math`] backend.
//!
//! ```rust
//! use thermonets_rs::geodesy::{
//!     cartesian_to_geodetic, geodetic_to_cartesian, CartesianPoint, Ellipsoid, NumericBackend,
//! };
//!
//! let wgs84 = Ellipsoid::wgs84();
//! let point = CartesianPoint::new(4_000_000.0, 3_000_000.0, 4_500_000.0);
//!
//! let geo = cartesian_to_geodetic(&NumericBackend, &point, &wgs84, 4).unwrap();
//! let back = geodetic_to_cartesian(&NumericBackend, &geo, &wgs84).unwrap();
//! assert!((back.z - point.z).abs() < 1e-3);
//! ```
//!
//! With the symbolic backend the same call returns expression graphs in the
//! input variables:
//!
//! ```rust
//! # #[cfg(feature = "symbolic")]
//! # {
//! use thermonets_rs::geodesy::{cartesian_to_geodetic, CartesianPoint, Ellipsoid, SymbolicBackend};
//! use thermonets_rs::symbolic::CompiledFunction;
//!
//! let geo = cartesian_to_geodetic(
//!     &SymbolicBackend,
//!     &CartesianPoint::symbolic("x", "y", "z"),
//!     &Ellipsoid::wgs84(),
//!     4,
//! )
//! .unwrap();
//! let f = CompiledFunction::new(&[geo.h, geo.phi, geo.lambda], &["x", "y", "z"]).unwrap();
//! let hpl = f.eval(&[6_878_137.0, 0.0, 0.0]).unwrap();
//! assert!((hpl[0] - 500_000.0).abs() < 1e-6);
//! # }
//! ```

pub mod backend;
pub mod ellipsoid;
pub mod transform;

pub use backend::{ArrayBackend, Math, NumericBackend};
pub use ellipsoid::{Ellipsoid, WGS84_A, WGS84_B};
pub use transform::{
    cartesian_to_geodetic, geodetic_to_cartesian, CartesianPoint, CoordinateTransform,
    GeodeticPoint, DEFAULT_ITERATIONS,
};

#[cfg(feature = "symbolic")]
pub use backend::SymbolicBackend;

#[cfg(feature = "symbolic")]
mod symbolic_points {
    use super::{CartesianPoint, GeodeticPoint};
    use crate::symbolic::Expr;

    impl CartesianPoint<Expr> {
        /// A point whose coordinates are the named variables.
        pub fn symbolic(x: &str, y: &str, z: &str) -> Self {
            Self::new(Expr::variable(x), Expr::variable(y), Expr::variable(z))
        }
    }

    impl GeodeticPoint<Expr> {
        /// A point whose coordinates are the named variables.
        pub fn symbolic(h: &str, phi: &str, lambda: &str) -> Self {
            Self::new(Expr::variable(h), Expr::variable(phi), Expr::variable(lambda))
        }
    }
}
