//! System process runner using `std::process`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use tandem_core::{
    application::{
        ApplicationError,
        ports::{Capture, Invocation, ProcessOutput, ProcessRunner},
    },
    error::{TandemError, TandemResult},
};

/// Production process runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, invocation: &Invocation) -> TandemResult<ProcessOutput> {
        if let Some(cwd) = &invocation.cwd {
            if !cwd.is_dir() {
                return Err(ApplicationError::FilesystemError {
                    path: cwd.clone(),
                    reason: "working directory does not exist".into(),
                }
                .into());
            }
        }

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        debug!(command = %invocation, cwd = ?invocation.cwd, "Running");

        let output = match invocation.capture {
            Capture::Inherit => {
                let status = cmd
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(|e| spawn_error(invocation, e))?;
                ProcessOutput {
                    exit_code: status.code(),
                    ..Default::default()
                }
            }
            Capture::Separate | Capture::Merged => {
                let out = cmd.output().map_err(|e| spawn_error(invocation, e))?;
                let captured = ProcessOutput {
                    exit_code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                };
                if invocation.capture == Capture::Merged {
                    ProcessOutput {
                        exit_code: captured.exit_code,
                        stdout: captured.combined(),
                        stderr: String::new(),
                    }
                } else {
                    captured
                }
            }
        };

        trace!(exit_code = ?output.exit_code, "Finished");
        Ok(output)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }

        let path = env::var_os("PATH")?;
        env::split_paths(&path)
            .flat_map(|dir| executable_names(program).map(move |name| dir.join(name)))
            .find(|p| is_executable(p))
    }
}

fn spawn_error(invocation: &Invocation, e: io::Error) -> TandemError {
    if e.kind() == io::ErrorKind::NotFound {
        return ApplicationError::ToolNotFound {
            program: invocation.program.clone(),
        }
        .into();
    }
    ApplicationError::ExternalCommandFailed {
        command: invocation.to_string(),
        exit_code: None,
        output: e.to_string(),
    }
    .into()
}

#[cfg(windows)]
fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    ["", ".exe", ".cmd", ".bat"]
        .into_iter()
        .map(move |ext| format!("{program}{ext}"))
}

#[cfg(not(windows))]
fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(program.to_owned())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_both_streams() {
        let inv = Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let out = SystemProcessRunner::new().run(&inv).unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[test]
    fn merged_capture_reports_stderr_in_stdout() {
        let inv = Invocation::new("sh")
            .args(["-c", "echo out; echo err >&2"])
            .capture(Capture::Merged);
        let out = SystemProcessRunner::new().run(&inv).unwrap();
        assert!(out.success());
        assert!(out.stdout.contains("out"));
        assert!(out.stdout.contains("err"));
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn runs_in_working_directory_with_env() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh")
            .args(["-c", "pwd; echo $TANDEM_TEST_VALUE"])
            .current_dir(dir.path())
            .env("TANDEM_TEST_VALUE", "xyz");
        let out = SystemProcessRunner::new().run(&inv).unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        assert!(out.stdout.contains(canonical.to_str().unwrap()));
        assert!(out.stdout.contains("xyz"));
    }

    #[test]
    fn missing_program_is_tool_not_found() {
        let inv = Invocation::new("tandem-definitely-not-installed");
        let err = SystemProcessRunner::new().run(&inv).unwrap_err();
        assert!(matches!(
            err,
            TandemError::Application(ApplicationError::ToolNotFound { .. })
        ));
    }

    #[test]
    fn missing_working_directory_is_not_mistaken_for_missing_tool() {
        let inv = Invocation::new("sh").current_dir("/definitely/not/here");
        let err = SystemProcessRunner::new().run(&inv).unwrap_err();
        assert!(matches!(
            err,
            TandemError::Application(ApplicationError::FilesystemError { .. })
        ));
    }

    #[test]
    fn locates_programs_on_path() {
        let runner = SystemProcessRunner::new();
        assert!(runner.locate("sh").is_some());
        assert!(runner.locate("tandem-definitely-not-installed").is_none());
        assert_eq!(runner.locate("/bin/sh"), Some(PathBuf::from("/bin/sh")));
    }
}
