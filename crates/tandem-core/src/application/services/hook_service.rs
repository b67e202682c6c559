//! Environment-file hook - regenerate the conda environment file when
//! `pyproject.toml` is part of a commit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::ports::{Capture, Invocation, ProcessRunner, ProjectVcs, Workspace},
    error::TandemResult,
};

/// Staged file that triggers the hook.
pub const TRIGGER_FILE: &str = "pyproject.toml";

/// Environment file the generator writes for the dev environment.
pub const ENVIRONMENT_FILE: &str = "environment-py312-dev.yaml";

pub const DEFAULT_GENERATOR: &str = "pyproject2conda";

pub struct EnvFileHook {
    process: Arc<dyn ProcessRunner>,
    vcs: Arc<dyn ProjectVcs>,
    workspace: Arc<dyn Workspace>,
    generator: String,
}

impl EnvFileHook {
    pub fn new(
        process: Arc<dyn ProcessRunner>,
        vcs: Arc<dyn ProjectVcs>,
        workspace: Arc<dyn Workspace>,
    ) -> Self {
        Self {
            process,
            vcs,
            workspace,
            generator: DEFAULT_GENERATOR.into(),
        }
    }

    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }

    /// Run the hook in `root` for the staged `paths`.
    ///
    /// Returns the exit code the hook should end with. A generator that
    /// fails passes its own exit code through.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn run(&self, root: &Path, paths: &[PathBuf]) -> TandemResult<i32> {
        let triggered = paths
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == TRIGGER_FILE));
        if !triggered {
            debug!("{TRIGGER_FILE} not staged; nothing to do");
            return Ok(0);
        }

        if self.process.locate(&self.generator).is_none() {
            error!("{} is not installed or not on PATH", self.generator);
            return Ok(1);
        }

        let invocation = Invocation::new(&self.generator)
            .args(["project", "--envs", "dev"])
            .current_dir(root)
            .capture(Capture::Inherit);
        let output = self.process.run(&invocation)?;
        if !output.success() {
            error!(exit_code = ?output.exit_code, "{invocation} failed");
            return Ok(output.code());
        }

        let environment_file = root.join(ENVIRONMENT_FILE);
        if self.workspace.exists(&environment_file) {
            match self.vcs.add(root, Path::new(ENVIRONMENT_FILE)) {
                Ok(()) => info!("Staged {ENVIRONMENT_FILE}"),
                Err(e) => warn!("Could not stage {ENVIRONMENT_FILE}: {e}"),
            }
        }

        Ok(0)
    }
}
