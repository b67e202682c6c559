//! Environment runner backed by `tox`.

use std::path::Path;
use std::sync::Arc;

use tandem_core::{
    application::ports::{Capture, EnvironmentRunner, Invocation, ProcessOutput, ProcessRunner},
    domain::{EnvName, ExecutionMode},
    error::TandemResult,
};

pub const DEFAULT_PROGRAM: &str = "tox";

pub struct ToxRunner {
    process: Arc<dyn ProcessRunner>,
    program: String,
}

impl ToxRunner {
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

    fn run_args(mode: ExecutionMode, env: &EnvName) -> Vec<String> {
        let mut args: Vec<String> = match mode {
            ExecutionMode::Parallel => vec!["run-parallel".into(), "--parallel-no-spinner".into()],
            ExecutionMode::Serial => vec!["run".into()],
        };
        args.extend(["--quiet".into(), "-e".into(), env.to_string()]);
        args
    }
}

impl EnvironmentRunner for ToxRunner {
    fn list(&self, project_dir: &Path) -> TandemResult<ProcessOutput> {
        let invocation = Invocation::new(&self.program)
            .args(["-qq", "-l"])
            .current_dir(project_dir)
            .capture(Capture::Merged);
        self.process.run(&invocation)
    }

    fn run(
        &self,
        project_dir: &Path,
        env: &EnvName,
        mode: ExecutionMode,
        capture: bool,
    ) -> TandemResult<ProcessOutput> {
        let invocation = Invocation::new(&self.program)
            .args(Self::run_args(mode, env))
            .current_dir(project_dir)
            .capture(if capture {
                Capture::Separate
            } else {
                Capture::Inherit
            });
        self.process.run(&invocation)
    }
}
