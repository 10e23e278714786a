//! Utility functions and helpers for the thermonets-rs library.

pub mod finite_difference;
pub mod parallel;

// Re-export commonly used utilities
pub use finite_difference::{
    gradient, CentralDifference, ForwardDifference, GradientStrategy, HigherOrderDifference,
};
pub use parallel::gradient_parallel;
