//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the external tools
//! being orchestrated, not domain rule violations. Those are `DomainError`
//! from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Stage;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// One or more requested examples are not registered.
    #[error("Unknown example name(s): {}", missing.join(", "))]
    UnknownExamples {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// The answers directory holds no complete example.
    #[error("No examples found under {dir}")]
    NoExamples { dir: PathBuf },

    /// An answers file could not be read or parsed.
    #[error("Cannot read answers file {path}: {reason}")]
    AnswersUnreadable { path: PathBuf, reason: String },

    /// A local template directory does not exist.
    #[error("Template not found at {path}")]
    TemplateMissing { path: PathBuf },

    /// An external executable is not installed or not on `PATH`.
    #[error("`{program}` executable not found")]
    ToolNotFound { program: String },

    /// An external command ran and reported failure.
    #[error("Command `{command}` failed{}", exit_code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ExternalCommandFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// One render stage of an example failed.
    #[error("{stage} template failed for {example}: {reason}")]
    StageFailed {
        example: String,
        stage: Stage,
        reason: String,
    },

    /// A matrix case was requested for an example that was never prepared.
    #[error("Example '{example}' has not been rendered in this session")]
    NotPrepared { example: String },

    /// A project configuration file exists but cannot be parsed.
    #[error("Invalid project configuration in {path}: {reason}")]
    InvalidProjectConfig { path: PathBuf, reason: String },

    /// Workspace filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownExamples { available, .. } => {
                let mut out = vec!["Run 'tandem list' to see the registered examples".into()];
                if !available.is_empty() {
                    out.push(format!("Available: {}", available.join(", ")));
                }
                out
            }
            Self::NoExamples { dir } => vec![
                format!("Add a directory under {} for each example", dir.display()),
                "Each example directory needs both package.yml and rule.yml".into(),
            ],
            Self::AnswersUnreadable { path, .. } => vec![
                format!("Check that {} exists and is valid YAML", path.display()),
            ],
            Self::TemplateMissing { path } => vec![
                format!("No template directory at {}", path.display()),
                "Run 'tandem fetch' to clone the package template".into(),
                "Or point paths.package_template / paths.rule_template at a template".into(),
            ],
            Self::ToolNotFound { program } => vec![
                format!("Install `{}` and make sure it is on your PATH", program),
                "Or set its location under [tools] in tandem.toml".into(),
            ],
            Self::ExternalCommandFailed { output, .. } if !output.trim().is_empty() => vec![
                "Command output:".into(),
                output.trim().to_owned(),
            ],
            Self::ExternalCommandFailed { .. } => {
                vec!["Re-run with -vv to see the command's output".into()]
            }
            Self::StageFailed { stage, .. } => vec![
                format!("Check the {} answers file for this example", stage),
                "Re-run with -vv to see the renderer's output".into(),
            ],
            Self::InvalidProjectConfig { path, .. } => {
                vec![format!("Fix the TOML syntax in {}", path.display())]
            }
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::NotPrepared { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownExamples { .. } => ErrorCategory::Validation,
            Self::AnswersUnreadable { .. } | Self::InvalidProjectConfig { .. } => {
                ErrorCategory::Validation
            }
            Self::NoExamples { .. } | Self::TemplateMissing { .. } => ErrorCategory::NotFound,
            Self::ToolNotFound { .. } => ErrorCategory::Configuration,
            Self::ExternalCommandFailed { .. } | Self::StageFailed { .. } => {
                ErrorCategory::External
            }
            Self::NotPrepared { .. } | Self::FilesystemError { .. } => ErrorCategory::Internal,
        }
    }
}
