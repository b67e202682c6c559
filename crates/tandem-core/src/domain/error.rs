// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside cached preparation results)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid example name '{name}': {reason}")]
    InvalidExampleName { name: String, reason: String },

    #[error("Invalid answers: {reason}")]
    InvalidAnswers { reason: String },

    #[error("Environment name cannot be empty")]
    EmptyEnvName,

    #[error("Unknown render stage '{0}'")]
    InvalidStage(String),

    // ========================================================================
    // State Machine Violations
    // ========================================================================
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidExampleName { name, reason } => vec![
                format!("Example name '{}' is invalid: {}", name, reason),
                "Example names are directory names under the answers directory".into(),
                "Use letters, digits, '-' and '_'".into(),
            ],
            Self::InvalidAnswers { reason } => vec![
                format!("Details: {}", reason),
                "An answers file must contain a YAML mapping of question names to values".into(),
            ],
            Self::EmptyEnvName => vec!["Pass a non-empty environment name to --env".into()],
            Self::InvalidStage(_) => vec!["Valid stages: package, rule".into()],
            Self::InvalidTransition { .. } => vec![
                "This is a bug in Tandem's pipeline bookkeeping".into(),
                "Please report it together with the command you ran".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidExampleName { .. }
            | Self::InvalidAnswers { .. }
            | Self::EmptyEnvName
            | Self::InvalidStage(_) => ErrorCategory::Validation,
            Self::InvalidTransition { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
