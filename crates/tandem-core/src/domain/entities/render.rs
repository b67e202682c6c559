use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::value_objects::{ExampleName, Stage};

// ── Work root ────────────────────────────────────────────────────────────────

/// Per-example scratch directory shared by both render stages.
///
/// ```text
/// <root>/
/// ├── config           ← copier_dir / replay_dir mapping
/// ├── copier/          ← data files handed to the renderer
/// └── copier_replay/   ← answers recorded by each rendered stage
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRoot {
    root: PathBuf,
}

impl WorkRoot {
    pub const CONFIG_FILE: &'static str = "config";
    pub const COPIER_DIR: &'static str = "copier";
    pub const REPLAY_DIR: &'static str = "copier_replay";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(Self::CONFIG_FILE)
    }

    pub fn copier_dir(&self) -> PathBuf {
        self.root.join(Self::COPIER_DIR)
    }

    pub fn replay_dir(&self) -> PathBuf {
        self.root.join(Self::REPLAY_DIR)
    }

    /// Data file the renderer reads the stage's answers from.
    pub fn data_file(&self, stage: Stage) -> PathBuf {
        self.copier_dir().join(format!("{stage}.yml"))
    }

    /// Where the answers recorded by a rendered stage are kept.
    pub fn replay_file(&self, stage: Stage) -> PathBuf {
        self.replay_dir().join(format!("{stage}.yml"))
    }
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// Where the two stages render to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLocation {
    /// `<work_root>/package` and `<work_root>/rule`.
    WorkRoot,
    /// `<dir>/package_run` and `<dir>/rule_run`.
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLayout {
    location: OutputLocation,
    flatten: bool,
}

impl StageLayout {
    pub fn in_work_root() -> Self {
        Self {
            location: OutputLocation::WorkRoot,
            flatten: false,
        }
    }

    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: OutputLocation::Directory(dir.into()),
            flatten: false,
        }
    }

    /// Collapse a lone nested output directory into the stage directory.
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn flattens(&self) -> bool {
        self.flatten
    }

    pub fn stage_dir(&self, work_root: &WorkRoot, stage: Stage) -> PathBuf {
        match &self.location {
            OutputLocation::WorkRoot => work_root.root().join(stage.as_str()),
            OutputLocation::Directory(dir) => dir.join(format!("{stage}_run")),
        }
    }
}

// ── Request / outcome ────────────────────────────────────────────────────────

/// One invocation of the template renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub stage: Stage,
    /// Template source: a local directory or anything the renderer accepts.
    pub template: PathBuf,
    /// Stage directory; the renderer creates its own output inside it.
    pub destination: PathBuf,
    /// YAML file holding the stage's answers.
    pub data_file: PathBuf,
    /// Outcome of the parent stage. Its project is the starting point of
    /// this render.
    pub parent: Option<RenderOutcome>,
}

/// Result of one renderer invocation.
///
/// Consumed immediately to decide success or failure; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    pub project_dir: Option<PathBuf>,
    pub exception: Option<String>,
    pub exit_code: i32,
}

impl RenderOutcome {
    pub fn success(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: Some(project_dir.into()),
            exception: None,
            exit_code: 0,
        }
    }

    pub fn failure(exception: impl Into<String>, exit_code: i32) -> Self {
        Self {
            project_dir: None,
            exception: Some(exception.into()),
            exit_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exception.is_none() && self.exit_code == 0 && self.project_dir.is_some()
    }

    /// Human-readable reason for a failed outcome.
    pub fn failure_reason(&self) -> String {
        match (&self.exception, self.exit_code, &self.project_dir) {
            (Some(exception), _, _) => exception.clone(),
            (None, code, _) if code != 0 => format!("renderer exited with code {code}"),
            (None, _, None) => "renderer produced no project directory".into(),
            _ => "no failure".into(),
        }
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(project_dir.into());
        self
    }
}

/// Both stages of one example rendered successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedExample {
    name: ExampleName,
    work_root: WorkRoot,
    package: RenderOutcome,
    rule: RenderOutcome,
    project_dir: PathBuf,
}

impl RenderedExample {
    /// `None` unless the rule outcome is a success.
    pub fn new(
        name: ExampleName,
        work_root: WorkRoot,
        package: RenderOutcome,
        rule: RenderOutcome,
    ) -> Option<Self> {
        let project_dir = rule.project_dir.clone().filter(|_| rule.is_success())?;
        Some(Self {
            name,
            work_root,
            package,
            rule,
            project_dir,
        })
    }

    pub fn name(&self) -> &ExampleName {
        &self.name
    }

    pub fn work_root(&self) -> &WorkRoot {
        &self.work_root
    }

    pub fn package(&self) -> &RenderOutcome {
        &self.package
    }

    pub fn rule(&self) -> &RenderOutcome {
        &self.rule
    }

    /// The final project: the rule stage's output.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
