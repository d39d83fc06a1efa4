//! Error taxonomy shared by every stage of the engine.

use thiserror::Error;
use uuid::Uuid;

use crate::{materialize::JobStatus, parser::ParseError};

/// Failure reported by a collaborator: the fact store, a cache back end, the
/// feature store, linkage, the analytical slicer or a job/template repository.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The back end could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The back end rejected or failed the operation.
    #[error("store failure: {0}")]
    Backend(String),

    /// A scan was stopped early by its consumer.
    #[error("scan aborted by consumer")]
    Aborted,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller-facing errors of the cohort engine.
#[derive(Error, Debug)]
pub enum CohortError {
    /// Malformed DSL. Never retried internally.
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    /// Missing or rejected request input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Fact store scan or count failure. Retrying is the caller's decision.
    #[error("execution error: {0}")]
    Execution(#[from] StoreError),

    /// CSV formatting or write failure.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Materialization could not complete; captured into the job record.
    #[error("materialization error: {0}")]
    Materialization(String),

    #[error("materialization job not found: {0}")]
    JobNotFound(Uuid),

    #[error("invalid job transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// Invalid engine or field catalog configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, CohortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = CohortError::Validation("patient_id is required".to_string());
        assert_eq!(err.to_string(), "validation error: patient_id is required");
    }

    #[test]
    fn test_error_display_execution_wraps_store() {
        let err: CohortError = StoreError::Unavailable("lakehouse".to_string()).into();
        assert_eq!(err.to_string(), "execution error: store unavailable: lakehouse");
    }

    #[test]
    fn test_error_display_transition() {
        let err = CohortError::InvalidTransition { from: JobStatus::Completed, to: JobStatus::Queued };
        assert_eq!(err.to_string(), "invalid job transition from completed to queued");
    }

    #[test]
    fn test_error_from_parse_error() {
        let parse = crate::parser::parse("where a = 1").unwrap_err();
        let err: CohortError = parse.into();
        assert!(matches!(err, CohortError::Syntax(_)));
    }
}
