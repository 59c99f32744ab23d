//! Error types for model-arena
//!
//! Only request rejections (`InvalidInput`, `ContractViolation`) ever fail a
//! training run. Algorithm, persistence and notification problems are
//! absorbed into data by the components that observe them.

use thiserror::Error;

use crate::metrics::TaskType;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// model-arena error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request (empty algorithm list, duplicate names, bad values)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A run observed more than one task type
    #[error(
        "Task type contract violated: algorithm '{algorithm}' is {found} but the run is {expected}\nA run must evaluate algorithms of a single task type"
    )]
    ContractViolation {
        /// Task type established by the first entry of the run
        expected: TaskType,
        /// Task type of the offending entry
        found: TaskType,
        /// Name of the offending algorithm
        algorithm: String,
    },

    /// Record persistence failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Push or log delivery failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// External trainer produced output that could not be understood
    #[error("Algorithm output error: {0}")]
    AlgorithmOutput(String),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error rejects the request itself, as opposed to an
    /// infrastructure failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::ContractViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_message() {
        let error = Error::ContractViolation {
            expected: TaskType::Classification,
            found: TaskType::Regression,
            algorithm: "linreg".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("linreg"));
        assert!(msg.contains("Regression"));
        assert!(msg.contains("Classification"));
        assert!(error.is_rejection());
    }

    #[test]
    fn test_infrastructure_errors_are_not_rejections() {
        assert!(!Error::Persistence("disk full".into()).is_rejection());
        assert!(!Error::Notification("push".into()).is_rejection());
        assert!(Error::InvalidInput("empty".into()).is_rejection());
    }
}
