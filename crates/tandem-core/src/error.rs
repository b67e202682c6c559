//! Unified error handling for Tandem Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Tandem Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TandemError {
    /// Errors from the domain layer (invalid values, state machine misuse).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and tool failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl TandemError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Tandem".into(),
                "Please report this issue with the command you ran".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// `true` for a render stage that reported failure.
    ///
    /// Such failures abandon only the affected example; every other error
    /// aborts the whole run.
    pub fn is_stage_failure(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StageFailed { .. }))
    }

    /// `true` when a required executable is not installed.
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::ToolNotFound { .. }))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    /// An external tool ran and reported failure.
    External,
    Internal,
}

/// Convenient result type alias.
pub type TandemResult<T> = Result<T, TandemError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> TandemResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> TandemResult<T> {
        self.map_err(|e| TandemError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stage;

    #[test]
    fn only_stage_failures_are_soft() {
        let stage: TandemError = ApplicationError::StageFailed {
            example: "demo".into(),
            stage: Stage::Rule,
            reason: "x".into(),
        }
        .into();
        assert!(stage.is_stage_failure());

        let tool: TandemError = ApplicationError::ToolNotFound {
            program: "copier".into(),
        }
        .into();
        assert!(!tool.is_stage_failure());
        assert!(tool.is_tool_missing());
        assert!(!stage.is_tool_missing());
        assert_eq!(tool.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn domain_validation_maps_to_validation() {
        let err: TandemError = DomainError::EmptyEnvName.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let result: Result<(), std::fmt::Error> = Err(std::fmt::Error);
        let err = result.context("formatting report").unwrap_err();
        assert!(matches!(err, TandemError::Internal { .. }));
        assert!(err.to_string().contains("formatting report"));
    }
}
