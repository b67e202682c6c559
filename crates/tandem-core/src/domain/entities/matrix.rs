use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    error::DomainError,
    value_objects::{EnvName, ExampleName, ExecutionMode},
};

// ── Per-example pipeline state ───────────────────────────────────────────────

/// Step of the per-example pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    PackageRender,
    RuleRender,
    Discovery,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PackageRender => "package render",
            Self::RuleRender => "rule render",
            Self::Discovery => "environment discovery",
        })
    }
}

/// Where one example is in `UNRENDERED → PACKAGE_RENDERED → RULE_RENDERED →
/// ENVIRONMENTS_DISCOVERED`.
///
/// `Failed` is terminal and only affects the example it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ExampleState {
    #[default]
    Unrendered,
    PackageRendered,
    RuleRendered,
    EnvironmentsDiscovered,
    Failed {
        step: PipelineStep,
        reason: String,
    },
}

impl ExampleState {
    /// Move to the next successful state.
    pub fn advance(self) -> Result<Self, DomainError> {
        match self {
            Self::Unrendered => Ok(Self::PackageRendered),
            Self::PackageRendered => Ok(Self::RuleRendered),
            Self::RuleRendered => Ok(Self::EnvironmentsDiscovered),
            other => Err(DomainError::InvalidTransition {
                from: other.to_string(),
                to: "next step".into(),
            }),
        }
    }

    /// Record a failure of the step that follows the current state.
    pub fn fail(self, reason: impl Into<String>) -> Result<Self, DomainError> {
        let step = match self {
            Self::Unrendered => PipelineStep::PackageRender,
            Self::PackageRendered => PipelineStep::RuleRender,
            Self::RuleRendered => PipelineStep::Discovery,
            other => {
                return Err(DomainError::InvalidTransition {
                    from: other.to_string(),
                    to: "failed".into(),
                });
            }
        };
        Ok(Self::Failed {
            step,
            reason: reason.into(),
        })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EnvironmentsDiscovered | Self::Failed { .. })
    }
}

impl fmt::Display for ExampleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrendered => f.write_str("unrendered"),
            Self::PackageRendered => f.write_str("package-rendered"),
            Self::RuleRendered => f.write_str("rule-rendered"),
            Self::EnvironmentsDiscovered => f.write_str("environments-discovered"),
            Self::Failed { step, .. } => write!(f, "failed during {step}"),
        }
    }
}

// ── Cases ────────────────────────────────────────────────────────────────────

/// One (example, environment) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MatrixCase {
    pub example: ExampleName,
    pub env: EnvName,
}

impl MatrixCase {
    pub fn new(example: ExampleName, env: EnvName) -> Self {
        Self { example, env }
    }

    /// `"<example>:<env>"`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.example, self.env)
    }
}

impl fmt::Display for MatrixCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.example, self.env)
    }
}

/// `PENDING → RUNNING → PASSED | FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Pending,
    Running,
    Passed,
    Failed,
}

impl CaseStatus {
    pub fn start(self) -> Result<Self, DomainError> {
        match self {
            Self::Pending => Ok(Self::Running),
            other => Err(DomainError::InvalidTransition {
                from: other.to_string(),
                to: Self::Running.to_string(),
            }),
        }
    }

    pub fn finish(self, passed: bool) -> Result<Self, DomainError> {
        let to = if passed { Self::Passed } else { Self::Failed };
        match self {
            Self::Running => Ok(to),
            other => Err(DomainError::InvalidTransition {
                from: other.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
        })
    }
}

/// Outcome of running one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub case: MatrixCase,
    pub status: CaseStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }

    /// Failure message naming the pair, followed by the runner's output.
    pub fn failure_message(&self) -> String {
        format!(
            "\n[example = {}, env = {}]\nstdout:\n{}\nstderr:\n{}",
            self.case.example, self.case.env, self.stdout, self.stderr
        )
    }
}

// ── Plan / report ────────────────────────────────────────────────────────────

/// Why an example contributed no cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    /// Rendering or discovery failed; counts as a failure of the run.
    Failed(String),
    /// The environment filter selected none of the example's environments.
    NoSelectedEnvs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedExample {
    pub example: ExampleName,
    pub reason: SkipReason,
}

/// Every case to run, plus the examples that will not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixPlan {
    pub cases: Vec<MatrixCase>,
    pub skipped: Vec<SkippedExample>,
}

impl MatrixPlan {
    pub fn ids(&self) -> Vec<String> {
        self.cases.iter().map(MatrixCase::id).collect()
    }
}

/// Result of a full matrix run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixReport {
    pub run_id: Uuid,
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cases: Vec<CaseReport>,
    pub skipped: Vec<SkippedExample>,
}

impl MatrixReport {
    pub fn start(mode: ExecutionMode, skipped: Vec<SkippedExample>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            started_at: Utc::now(),
            finished_at: None,
            cases: Vec::new(),
            skipped,
        }
    }

    pub fn record(&mut self, report: CaseReport) {
        self.cases.push(report);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn passed(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| c.passed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed())
    }

    pub fn failed_examples(&self) -> impl Iterator<Item = &SkippedExample> {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none() && self.failed_examples().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(example: &str, env: &str) -> MatrixCase {
        MatrixCase::new(ExampleName::new(example).unwrap(), EnvName::new(env).unwrap())
    }

    fn report(status: CaseStatus) -> CaseReport {
        CaseReport {
            case: case("demo", "py312"),
            status,
            exit_code: Some(0),
            stdout: "out".into(),
            stderr: "err".into(),
            duration_ms: 1,
        }
    }

    #[test]
    fn example_state_walks_forward() {
        let state = ExampleState::default();
        let state = state.advance().unwrap();
        assert_eq!(state, ExampleState::PackageRendered);
        let state = state.advance().unwrap().advance().unwrap();
        assert_eq!(state, ExampleState::EnvironmentsDiscovered);
        assert!(state.is_terminal());
        assert!(state.advance().is_err());
    }

    #[test]
    fn failure_records_the_next_step() {
        let failed = ExampleState::PackageRendered.fail("rule exploded").unwrap();
        assert_eq!(
            failed,
            ExampleState::Failed {
                step: PipelineStep::RuleRender,
                reason: "rule exploded".into()
            }
        );
        assert!(failed.is_terminal());
        assert!(failed.clone().advance().is_err());
        assert!(failed.fail("again").is_err());
    }

    #[test]
    fn case_status_transitions() {
        let running = CaseStatus::Pending.start().unwrap();
        assert_eq!(running.finish(true).unwrap(), CaseStatus::Passed);
        assert_eq!(running.finish(false).unwrap(), CaseStatus::Failed);
        assert!(CaseStatus::Pending.finish(true).is_err());
        assert!(CaseStatus::Passed.start().is_err());
    }

    #[test]
    fn case_id_joins_example_and_env() {
        assert_eq!(case("demo", "lint").id(), "demo:lint");
    }

    #[test]
    fn failure_message_names_the_pair() {
        let msg = report(CaseStatus::Failed).failure_message();
        assert!(msg.contains("[example = demo, env = py312]"));
        assert!(msg.contains("stdout:\nout"));
        assert!(msg.contains("stderr:\nerr"));
    }

    #[test]
    fn report_success_accounts_for_failed_examples() {
        let mut report_ok = MatrixReport::start(ExecutionMode::Parallel, vec![]);
        report_ok.record(report(CaseStatus::Passed));
        assert!(report_ok.finish().is_success());

        let mut with_failed_case = MatrixReport::start(ExecutionMode::Serial, vec![]);
        with_failed_case.record(report(CaseStatus::Failed));
        assert!(!with_failed_case.is_success());

        let skipped = vec![SkippedExample {
            example: ExampleName::new("other").unwrap(),
            reason: SkipReason::Failed("package render failed".into()),
        }];
        let with_failed_example = MatrixReport::start(ExecutionMode::Parallel, skipped);
        assert!(!with_failed_example.is_success());

        let filtered = vec![SkippedExample {
            example: ExampleName::new("other").unwrap(),
            reason: SkipReason::NoSelectedEnvs,
        }];
        assert!(MatrixReport::start(ExecutionMode::Parallel, filtered).is_success());
    }
}
