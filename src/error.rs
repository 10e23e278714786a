use thiserror::Error;

/// Error types for the thermonets-rs library.
///
/// Only precondition violations are reported through this type. Numeric
/// degeneracies (division by zero on the polar axis, infinite fitness values)
/// are never errors and travel through the results as IEEE values.
#[derive(Error, Debug)]
pub enum ThermoError {
    /// Error indicating a mismatch in vector dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error while evaluating a symbolic expression graph.
    #[cfg(feature = "symbolic")]
    #[error("Expression error: {0}")]
    Expression(#[from] crate::symbolic::ExpressionError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for thermonets-rs operations.
pub type Result<T> = std::result::Result<T, ThermoError>;
