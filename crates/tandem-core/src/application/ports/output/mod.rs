//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `tandem-adapters` crate provides implementations.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{
    Answers, EnvName, Example, ExampleName, ExecutionMode, RenderOutcome, RenderRequest, WorkRoot,
};
use crate::error::TandemResult;

// ── Processes ────────────────────────────────────────────────────────────────

/// What to do with a child process's output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// Collect stdout and stderr separately.
    #[default]
    Separate,
    /// Collect both; stderr is reported after stdout in `stdout`.
    Merged,
    /// Stream both straight to the terminal.
    Inherit,
}

/// A single external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub capture: Capture,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            capture: Capture::default(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// What a finished child process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code with signal termination reported as `1`.
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(1)
    }

    /// Both streams, stdout first.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Port for spawning external programs.
///
/// A program that cannot be spawned because it does not exist must be
/// reported as `ApplicationError::ToolNotFound`, never as a failed run.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Run the command to completion.
    fn run(&self, invocation: &Invocation) -> TandemResult<ProcessOutput>;

    /// Full path of `program` if it can be found on `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Port for the external template renderer.
///
/// Implemented by `tandem_adapters::copier::CopierRenderer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render one stage.
    ///
    /// A renderer that ran and failed returns `Ok` with a failed outcome.
    /// `Err` is reserved for problems that must abort the whole run, such as
    /// the renderer not being installed.
    fn render(&self, request: &RenderRequest) -> TandemResult<RenderOutcome>;
}

// ── Environments ─────────────────────────────────────────────────────────────

/// Port for the external environment runner.
///
/// Implemented by `tandem_adapters::tox::ToxRunner`.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentRunner: Send + Sync {
    /// List the environments `project_dir` declares, one per line, with
    /// stderr merged into stdout.
    fn list(&self, project_dir: &Path) -> TandemResult<ProcessOutput>;

    /// Run one environment. With `capture = false` output goes straight to
    /// the terminal and the returned streams are empty.
    fn run(
        &self,
        project_dir: &Path,
        env: &EnvName,
        mode: ExecutionMode,
        capture: bool,
    ) -> TandemResult<ProcessOutput>;
}

/// Port for the environment list a project declares in its configuration.
///
/// Implemented by `tandem_adapters::pyproject::PyprojectReader`.
#[cfg_attr(test, mockall::automock)]
pub trait DeclaredEnvironments: Send + Sync {
    /// Declared names in order. A project without configuration declares
    /// nothing; a configuration that cannot be parsed is an error.
    fn declared(&self, project_dir: &Path) -> TandemResult<Vec<String>>;
}

// ── Examples ─────────────────────────────────────────────────────────────────

/// Port for loading the registered examples.
///
/// Implemented by `tandem_adapters::answers::AnswersDirectory`.
#[cfg_attr(test, mockall::automock)]
pub trait ExampleSource: Send + Sync {
    fn load_all(&self) -> TandemResult<Vec<Example>>;
}

// ── Filesystem ───────────────────────────────────────────────────────────────

/// Port for the filesystem side effects around rendering.
///
/// Implemented by `tandem_adapters::workspace::LocalWorkspace`.
#[cfg_attr(test, mockall::automock)]
pub trait Workspace: Send + Sync {
    /// Create a fresh work root for `example`, including its config file
    /// and bookkeeping directories. The directory outlives the process.
    fn create_work_root(&self, example: &ExampleName) -> TandemResult<WorkRoot>;

    /// Remove `path` if it exists and create it again, empty.
    fn reset_dir(&self, path: &Path) -> TandemResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> TandemResult<()>;

    /// Write answers as a YAML mapping.
    fn write_answers(&self, path: &Path, answers: &Answers) -> TandemResult<()>;

    /// Copy a single file. Returns `false` if `from` does not exist.
    fn copy_file(&self, from: &Path, to: &Path) -> TandemResult<bool>;

    /// If `dir` contains exactly one subdirectory and nothing else, move
    /// that subdirectory's contents into `dir` and remove it.
    fn flatten(&self, dir: &Path) -> TandemResult<bool>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;
}

// ── Version control ──────────────────────────────────────────────────────────

/// Port for git.
///
/// Implemented by `tandem_adapters::git::GitCli`.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectVcs: Send + Sync {
    /// Make `project_dir` a git repository with one commit holding every
    /// file. Does nothing if it already is one.
    fn bootstrap(&self, project_dir: &Path) -> TandemResult<()>;

    /// `git clone --depth 1 <url> <dest>`.
    fn shallow_clone(&self, url: &str, dest: &Path) -> TandemResult<()>;

    /// Stage `path` in the repository containing `cwd`.
    fn add(&self, cwd: &Path, path: &Path) -> TandemResult<()>;
}
