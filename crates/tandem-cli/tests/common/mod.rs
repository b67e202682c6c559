//! Shared harness: a temporary project with fake external tools.
//!
//! The fake `copier`, `tox`, `git` and `pyproject2conda` are shell scripts
//! that append their command line to a log file and touch the filesystem
//! the way the real tools would, just enough for the CLI to proceed.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

const FAKE_COPIER: &str = r#"#!/bin/sh
echo "copier $*" >> "$FAKE_TOOL_LOG"
data="$7"
template="$8"
out="$9"
if grep -q '^fail: true' "$data"; then
  echo "Traceback (most recent call last):" >&2
  echo "ValueError: refused to render" >&2
  exit 3
fi
mkdir -p "$out"
cp "$data" "$out/$(basename "$template").yml"
cp "$data" "$out/.copier-answers.yml"
if [ -f "$template/pyproject.toml" ]; then
  cp "$template/pyproject.toml" "$out/pyproject.toml"
fi
"#;

const FAKE_TOX: &str = r#"#!/bin/sh
echo "tox $*" >> "$FAKE_TOOL_LOG"
if [ "$1" = "-qq" ]; then
  if [ -n "$FAKE_TOX_NO_LIST" ]; then
    echo "tox: cannot read configuration"
    exit 2
  fi
  printf 'lint\npy312\n'
  exit 0
fi
env=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-e" ]; then env="$2"; fi
  shift
done
if [ "$env" = "$FAKE_TOX_FAIL" ]; then
  echo "$env: commands failed" >&2
  exit 1
fi
echo "$env: OK"
"#;

const FAKE_GIT: &str = r#"#!/bin/sh
echo "git $*" >> "$FAKE_TOOL_LOG"
if [ "$1" = "init" ]; then mkdir -p .git; fi
if [ "$1" = "clone" ]; then mkdir -p "$5"; fi
exit 0
"#;

const FAKE_PYPROJECT2CONDA: &str = r#"#!/bin/sh
echo "pyproject2conda $*" >> "$FAKE_TOOL_LOG"
if [ -n "$FAKE_P2C_EXIT" ]; then exit "$FAKE_P2C_EXIT"; fi
echo "name: dev" > environment-py312-dev.yaml
"#;

/// Declared environments of the fake package template.
pub const DECLARED_ENVS: &str = "[tool.tox]\nenv_list = [\"docs\", \"py311\"]\n";

pub struct Project {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl Project {
    /// Project with templates, fake tools and a config file, but no examples.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();

        for dir in ["bin", "home", "tpl/package", "tpl/rule", "example-answers"] {
            fs::create_dir_all(root.join(dir)).expect("create project dir");
        }
        fs::write(root.join("tpl/package/pyproject.toml"), DECLARED_ENVS)
            .expect("write template pyproject");

        let project = Self { _tmp: tmp, root };
        project.tool("copier", FAKE_COPIER);
        project.tool("tox", FAKE_TOX);
        project.tool("git", FAKE_GIT);
        project.tool("pyproject2conda", FAKE_PYPROJECT2CONDA);
        project.write_config();
        project
    }

    /// Register an example with the given answers files.
    pub fn example(self, name: &str, package_yml: &str, rule_yml: &str) -> Self {
        let dir = self.root.join("example-answers").join(name);
        fs::create_dir_all(&dir).expect("create example dir");
        fs::write(dir.join("package.yml"), package_yml).expect("write package answers");
        fs::write(dir.join("rule.yml"), rule_yml).expect("write rule answers");
        self
    }

    /// Replace (or add) a fake executable under `bin/`.
    pub fn tool(&self, name: &str, script: &str) {
        let path = self.bin(name);
        fs::write(&path, script).expect("write fake tool");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    }

    pub fn bin(&self, name: &str) -> PathBuf {
        self.root.join("bin").join(name)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("tandem-test.toml")
    }

    pub fn sandbox(&self) -> PathBuf {
        self.root.join("sandbox")
    }

    fn write_config(&self) {
        let root = self.root.display();
        let config = format!(
            "[paths]\n\
             package_template = \"{root}/tpl/package\"\n\
             rule_template = \"{root}/tpl/rule\"\n\
             sandbox_root = \"{root}/sandbox\"\n\
             answers_dir = \"{root}/example-answers\"\n\
             \n\
             [tools]\n\
             copier = \"{root}/bin/copier\"\n\
             tox = \"{root}/bin/tox\"\n\
             git = \"{root}/bin/git\"\n\
             pyproject2conda = \"{root}/bin/pyproject2conda\"\n"
        );
        fs::write(self.config_file(), config).expect("write config");
    }

    /// `tandem --config <file>` running in the project root.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("tandem");
        cmd.current_dir(&self.root)
            .env("HOME", self.root.join("home"))
            .env("FAKE_TOOL_LOG", self.log_file())
            .env_remove("RUST_LOG")
            .env_remove("NO_COLOR")
            .arg("--config")
            .arg(self.config_file());
        cmd
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("tools.log")
    }

    /// Every fake tool invocation so far, one per line.
    pub fn log(&self) -> String {
        fs::read_to_string(self.log_file()).unwrap_or_default()
    }

    pub fn log_lines(&self, prefix: &str) -> Vec<String> {
        self.log()
            .lines()
            .filter(|l| l.starts_with(prefix))
            .map(str::to_owned)
            .collect()
    }
}

pub fn read(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
