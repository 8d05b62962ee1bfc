//! Error types for the presolve engine.

use thiserror::Error;

/// Errors that can occur while presolving a model.
#[derive(Error, Debug)]
pub enum PresolveError {
    /// The model is malformed, e.g. a bias is NaN.
    #[error("{0}")]
    InvalidModel(String),

    /// A constraint can never be satisfied.
    ///
    /// The message is stable; downstream tooling matches on it.
    #[error("infeasible")]
    Infeasible,

    /// The presolver was used in an unsupported way.
    #[error("{0}")]
    Logic(String),
}

/// Result type for presolve operations.
pub type PresolveResult<T> = Result<T, PresolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_messages() {
        assert_eq!(PresolveError::Infeasible.to_string(), "infeasible");
        assert_eq!(
            PresolveError::InvalidModel("biases cannot be NAN".into()).to_string(),
            "biases cannot be NAN"
        );
    }
}
