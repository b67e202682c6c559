//! Local workspace adapter using `std::fs`.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use tandem_core::{
    application::{ApplicationError, ports::Workspace},
    domain::{Answers, ExampleName, WorkRoot},
    error::{TandemError, TandemResult},
};

/// Contents of a work root's `config` file.
#[derive(Debug, Serialize)]
struct WorkRootConfig {
    copier_dir: String,
    replay_dir: String,
}

/// Production workspace implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWorkspace;

impl LocalWorkspace {
    pub fn new() -> Self {
        Self
    }
}

impl Workspace for LocalWorkspace {
    fn create_work_root(&self, example: &ExampleName) -> TandemResult<WorkRoot> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("copie_{example}_"))
            .tempdir()
            .map_err(|e| map_io_error(&std::env::temp_dir(), e, "create work root"))?
            .keep();
        let root = WorkRoot::new(dir);

        for sub in [root.copier_dir(), root.replay_dir()] {
            self.create_dir_all(&sub)?;
        }

        let config = WorkRootConfig {
            copier_dir: root.copier_dir().display().to_string(),
            replay_dir: root.replay_dir().display().to_string(),
        };
        let yaml = serde_yaml::to_string(&config).map_err(|e| TandemError::Internal {
            message: format!("serialising work root config: {e}"),
        })?;
        let config_file = root.config_file();
        fs::write(&config_file, yaml).map_err(|e| map_io_error(&config_file, e, "write file"))?;

        debug!(root = %root.root().display(), "Work root ready");
        Ok(root)
    }

    fn reset_dir(&self, path: &Path) -> TandemResult<()> {
        if path.exists() {
            fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))?;
        }
        self.create_dir_all(path)
    }

    fn create_dir_all(&self, path: &Path) -> TandemResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_answers(&self, path: &Path, answers: &Answers) -> TandemResult<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(answers).map_err(|e| TandemError::Internal {
            message: format!("serialising answers: {e}"),
        })?;
        fs::write(path, yaml).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> TandemResult<bool> {
        if !from.is_file() {
            return Ok(false);
        }
        if let Some(parent) = to.parent() {
            self.create_dir_all(parent)?;
        }
        fs::copy(from, to).map_err(|e| map_io_error(from, e, "copy file"))?;
        Ok(true)
    }

    fn flatten(&self, dir: &Path) -> TandemResult<bool> {
        flatten_single_child(dir).map_err(|e| map_io_error(dir, e, "flatten directory"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn flatten_single_child(dir: &Path) -> io::Result<bool> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    let [only] = entries.as_slice() else {
        return Ok(false);
    };
    if !only.file_type()?.is_dir() {
        return Ok(false);
    }

    // Park the child under a temporary name so that an entry inside it with
    // the same name can be moved up.
    let parked = dir.join(format!(".flatten-{}", only.file_name().to_string_lossy()));
    fs::rename(only.path(), &parked)?;
    for entry in fs::read_dir(&parked)? {
        let entry = entry?;
        fs::rename(entry.path(), dir.join(entry.file_name()))?;
    }
    fs::remove_dir(&parked)?;
    Ok(true)
}

/// Recursively copy the contents of `src` into `dst`.
///
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> TandemError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
