//! # thermonets-rs
//!
//! `thermonets-rs` provides the numerical building blocks of an atmospheric
//! density surrogate:
//!
//! - Cartesian ↔ geodetic coordinate transforms that run either eagerly
//!   (scalars or `ndarray` arrays) or symbolically, producing a reusable
//!   expression graph
//! - A multi-exponential density model, ρ(h) = Σ αᵢ exp(−(h − γᵢ) βᵢ)
//! - The optimization problem used to fit that model to tabulated data,
//!   exposed through the generic [`Problem`] trait
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::Array1;
//! use thermonets_rs::{density, FitDataset, FitProblem, Problem};
//!
//! let truth = Array1::from_vec(vec![1e-2, 0.05, 90.0]);
//! let h = Array1::linspace(100.0, 500.0, 41);
//! let rho = density::evaluate(&h, &truth).unwrap();
//!
//! let problem = FitProblem::new(FitDataset::new(h, rho, 1).unwrap());
//! assert_eq!(problem.dimension(), 3);
//! assert!(problem.fitness(&truth).unwrap() < 1e-12);
//! ```

// Public modules
pub mod bounds;
pub mod density;
pub mod error;
pub mod fit;
pub mod geodesy;
pub mod problem;
pub mod utils;

#[cfg(feature = "symbolic")]
pub mod symbolic;

// Re-exports for convenience
pub use bounds::Bounds;
pub use density::{DensityModel, DensityParams, ExponentialTerm};
pub use error::{Result, ThermoError};
pub use fit::{FitDataset, FitProblem, TermBounds};
pub use geodesy::{CartesianPoint, CoordinateTransform, Ellipsoid, GeodeticPoint};
pub use problem::Problem;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
