//! Version control through the `git` command-line tool.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use tandem_core::{
    application::{
        ApplicationError,
        ports::{Capture, Invocation, ProcessRunner, ProjectVcs},
    },
    error::TandemResult,
};

pub const DEFAULT_PROGRAM: &str = "git";

/// Identity used for the bootstrap commit of rendered projects.
const CI_NAME: &str = "CI Runner";
const CI_EMAIL: &str = "ci@example.com";

pub struct GitCli {
    process: Arc<dyn ProcessRunner>,
    program: String,
}

impl GitCli {
    pub fn new(process: Arc<dyn ProcessRunner>) -> Self {
        Self {
            process,
            program: DEFAULT_PROGRAM.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn git<I, S>(&self, cwd: Option<&Path>, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inv = Invocation::new(&self.program)
            .args(args)
            .capture(Capture::Separate);
        match cwd {
            Some(dir) => inv.current_dir(dir),
            None => inv,
        }
    }

    /// Run and turn a non-zero exit into `ExternalCommandFailed`.
    fn check(&self, invocation: Invocation) -> TandemResult<()> {
        let output = self.process.run(&invocation)?;
        if output.success() {
            return Ok(());
        }
        Err(ApplicationError::ExternalCommandFailed {
            command: invocation.to_string(),
            exit_code: output.exit_code,
            output: output.combined(),
        }
        .into())
    }
}

impl ProjectVcs for GitCli {
    #[instrument(skip(self), fields(project = %project_dir.display()))]
    fn bootstrap(&self, project_dir: &Path) -> TandemResult<()> {
        if project_dir.join(".git").exists() {
            debug!("Already a git repository");
            return Ok(());
        }

        self.check(self.git(Some(project_dir), ["init", "--initial-branch=main"]))?;
        self.check(self.git(Some(project_dir), ["add", "-A"]))?;

        let commit = self
            .git(
                Some(project_dir),
                [
                    "commit",
                    "--allow-empty",
                    "--no-verify",
                    "--no-gpg-sign",
                    "-m",
                    "Initial commit",
                ],
            )
            .env("GIT_AUTHOR_NAME", CI_NAME)
            .env("GIT_AUTHOR_EMAIL", CI_EMAIL)
            .env("GIT_COMMITTER_NAME", CI_NAME)
            .env("GIT_COMMITTER_EMAIL", CI_EMAIL);
        self.check(commit)?;

        debug!("Initialised git repository");
        Ok(())
    }

    fn shallow_clone(&self, url: &str, dest: &Path) -> TandemResult<()> {
        self.check(self.git(
            None,
            [
                "clone".to_string(),
                "--depth".into(),
                "1".into(),
                url.to_owned(),
                dest.display().to_string(),
            ],
        ))
    }

    fn add(&self, cwd: &Path, path: &Path) -> TandemResult<()> {
        self.check(self.git(Some(cwd), ["add".to_string(), path.display().to_string()]))
    }
}
