//! Example answers loaded from a directory of YAML files.
//!
//! Layout:
//!
//! ```text
//! <answers_dir>/
//! ├── <example>/
//! │   ├── package.yml
//! │   └── rule.yml
//! └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

use tandem_core::{
    application::{ApplicationError, ports::ExampleSource},
    domain::{Answers, DomainError, Example, ExampleName, Stage},
    error::{TandemError, TandemResult},
};

/// Why a single answers file could not be loaded.
#[derive(Debug, Error)]
enum LoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Shape(#[from] DomainError),
}

/// Read one answers file verbatim.
///
/// An empty document yields empty answers.
pub fn load_answers(path: &Path) -> TandemResult<Answers> {
    read_answers(path).map_err(|e| {
        ApplicationError::AnswersUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn read_answers(path: &Path) -> Result<Answers, LoadError> {
    let text = fs::read_to_string(path)?;
    let value: serde_json::Value = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(Answers::from_value(value)?)
}

/// Examples registered as subdirectories of one answers directory.
#[derive(Debug, Clone)]
pub struct AnswersDirectory {
    dir: PathBuf,
}

impl AnswersDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn stage_file(dir: &Path, stage: Stage) -> PathBuf {
        dir.join(format!("{stage}.yml"))
    }
}

impl ExampleSource for AnswersDirectory {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load_all(&self) -> TandemResult<Vec<Example>> {
        let entries = fs::read_dir(&self.dir).map_err(|_| ApplicationError::NoExamples {
            dir: self.dir.clone(),
        })?;

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        let mut examples = Vec::new();
        for dir in dirs {
            let package = Self::stage_file(&dir, Stage::Package);
            let rule = Self::stage_file(&dir, Stage::Rule);
            if !package.is_file() || !rule.is_file() {
                debug!(dir = %dir.display(), "Skipping directory without package.yml and rule.yml");
                continue;
            }

            let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let name = ExampleName::new(name).map_err(TandemError::Domain)?;
            examples.push(Example::new(
                name,
                load_answers(&package)?,
                load_answers(&rule)?,
            ));
        }

        if examples.is_empty() {
            return Err(ApplicationError::NoExamples {
                dir: self.dir.clone(),
            }
            .into());
        }
        Ok(examples)
    }
}
