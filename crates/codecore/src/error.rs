use std::time::Duration;

use thiserror::Error;

/// Centralized error types for the pipeline and the project store
///
/// Every failure inside `codecore` is converted to this enum and returned as a
/// value; nothing panics across the component boundary. The hosting layer maps
/// each kind to a user-visible message via [`AppError::user_message`].
///
/// # Example
///
/// ```no_run
/// use codecore::AppError;
///
/// fn show(err: &AppError) -> &'static str {
///     err.user_message()
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The completion service answered, but with no usable text
    #[error("Empty response from completion service")]
    EmptyResponse,

    /// The completion service reported an error or could not be reached
    #[error("Completion service error: {0}")]
    Upstream(String),

    /// The completion response body matched none of the recognized shapes
    #[error("Unrecognized completion response: {0}")]
    UnknownResponseShape(String),

    /// A single completion call exceeded its timeout
    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    /// The database could not be reached or a statement failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// No project with this id (or not visible to the caller)
    #[error("Project {0} not found")]
    NotFound(i64),

    /// Configuration errors detected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input at the boundary
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Short, stable description suitable for showing to the user as-is.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::EmptyResponse => "Empty response from LLM",
            AppError::Upstream(_) => "Code generation service failed",
            AppError::UnknownResponseShape(_) => "Unexpected response from LLM",
            AppError::Timeout(_) => "Code generation timed out",
            AppError::StorageUnavailable(_) => "Storage is temporarily unavailable",
            AppError::NotFound(_) => "Project not found",
            AppError::Config(_) => "Service is misconfigured",
            AppError::Validation(_) => "Invalid request",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::StorageUnavailable(format!("connection pool: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_stable() {
        assert_eq!(AppError::EmptyResponse.user_message(), "Empty response from LLM");
        assert_eq!(AppError::NotFound(7).user_message(), "Project not found");
        assert_eq!(
            AppError::Upstream("401 invalid key".into()).user_message(),
            "Code generation service failed"
        );
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = AppError::StorageUnavailable("disk I/O error at /var/lib/db.sqlite".into());
        assert!(!err.user_message().contains("/var/lib"));
        assert!(err.to_string().contains("/var/lib"));
    }

    #[test]
    fn test_rusqlite_error_maps_to_storage_unavailable() {
        let err: AppError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }
}
