//! Environments declared in `pyproject.toml` under `[tool.tox]`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use tandem_core::{
    application::{ApplicationError, ports::DeclaredEnvironments},
    error::TandemResult,
};

use crate::workspace::map_io_error;

pub const PYPROJECT_FILE: &str = "pyproject.toml";

#[derive(Debug, Default, Deserialize)]
struct Pyproject {
    #[serde(default)]
    tool: ToolSection,
}

#[derive(Debug, Default, Deserialize)]
struct ToolSection {
    #[serde(default)]
    tox: ToxSection,
}

#[derive(Debug, Default, Deserialize)]
struct ToxSection {
    #[serde(default)]
    env_list: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PyprojectReader;

impl PyprojectReader {
    pub fn new() -> Self {
        Self
    }
}

impl DeclaredEnvironments for PyprojectReader {
    fn declared(&self, project_dir: &Path) -> TandemResult<Vec<String>> {
        let path = project_dir.join(PYPROJECT_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "No project configuration");
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&path).map_err(|e| map_io_error(&path, e, "read file"))?;
        let parsed: Pyproject =
            toml::from_str(&text).map_err(|e| ApplicationError::InvalidProjectConfig {
                path: path.clone(),
                reason: e.message().to_owned(),
            })?;
        Ok(parsed.tool.tox.env_list)
    }
}
