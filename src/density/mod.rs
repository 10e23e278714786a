//! # Density Model
//!
//! A surrogate for tabulated atmospheric density: a sum of `n` exponential
//! terms, parameterised by a flat vector of length `3n`.

pub mod model;
pub mod params;

pub use model::{evaluate, evaluate_at, DensityModel};
pub use params::{split_blocks, term_count, DensityParams, ExponentialTerm};
