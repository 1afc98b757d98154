use thiserror::Error;
use uuid::Uuid;

/// Main error type for the Crossfold system
#[derive(Error, Debug)]
pub enum CfError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    #[error("Training error: {0}")]
    Training(#[from] TrainingFailure),

    #[error("no parameter has at least one resolved fold score")]
    NoResultsAvailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// One (parameter, fold) evaluation failed during construction, fit, or
/// scoring. Recovered locally: the cell is excluded from the parameter's
/// aggregate and never aborts the whole search.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("training failed for parameter {parameter} on fold {fold_index}: {cause}")]
pub struct TrainingFailure {
    pub parameter: f64,
    pub fold_index: usize,
    pub cause: String,
}

/// Fold store errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("unknown fold handle: {0}")]
    UnknownHandle(Uuid),

    #[error("failed to write fold {fold_index}: {message}")]
    WriteFailed { fold_index: usize, message: String },

    #[error("failed to read fold data: {message}")]
    ReadFailed { message: String },
}

/// Worker pool errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("worker pool rejected submission: {0}")]
    SubmissionRejected(String),

    #[error("worker pool has shut down")]
    PoolShutDown,

    #[error("worker abandoned the task before reporting a result")]
    TaskAbandoned,
}

/// Failure of a single (parameter, fold) cell. Absorbed by the aggregator
/// as a missing contribution rather than propagated to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error(transparent)]
    Training(#[from] TrainingFailure),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

/// Result type alias for Crossfold operations
pub type CfResult<T> = Result<T, CfError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::CfError::Validation(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::CfError::Internal(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TrainingFailure {
            parameter: 0.5,
            fold_index: 3,
            cause: "singular system".to_string(),
        };

        assert!(error.to_string().contains("0.5"));
        assert!(error.to_string().contains("fold 3"));
        assert!(error.to_string().contains("singular system"));
    }

    #[test]
    fn test_error_conversion() {
        let storage_error = StorageError::ReadFailed {
            message: "test".to_string(),
        };
        let cf_error: CfError = storage_error.into();

        match cf_error {
            CfError::Storage(_) => (),
            _ => panic!("Expected Storage error"),
        }
    }

    #[test]
    fn test_task_error_wraps_taxonomy() {
        let task_error: TaskError = SchedulingError::PoolShutDown.into();
        assert_eq!(
            task_error,
            TaskError::Scheduling(SchedulingError::PoolShutDown)
        );
        assert!(task_error.to_string().contains("shut down"));
    }

    #[test]
    fn test_macros() {
        let _validation_err = validation_error!("Invalid value: {}", 42);
        let _internal_err = internal_error!("Something went wrong");
    }
}
