//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `TANDEM_<SECTION>__<KEY>`
//! 3. Config file: `--config FILE`, else `./tandem.toml`, else
//!    [`AppConfig::config_path`]
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "tandem.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TANDEM";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template, sandbox and answers locations.
    pub paths: PathsConfig,
    /// External tool executables.
    pub tools: ToolsConfig,
    /// Matrix run defaults.
    pub matrix: MatrixConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Parent template: a local directory or a git URL.
    pub package_template: String,
    pub rule_template: PathBuf,
    pub sandbox_root: PathBuf,
    /// Directory holding one `<example>/{package,rule}.yml` pair per example.
    pub answers_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub copier: String,
    pub tox: String,
    pub git: String,
    pub pyproject2conda: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub parallel: bool,
    pub capture: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            package_template: "../able-workflow-copier-dev".into(),
            rule_template: PathBuf::from("."),
            sandbox_root: PathBuf::from("sandbox"),
            answers_dir: PathBuf::from("example-answers"),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            copier: "copier".into(),
            tox: "tox".into(),
            git: "git".into(),
            pyproject2conda: "pyproject2conda".into(),
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            capture: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// `config_file` is the path passed via `--config`; it must exist. Without
    /// it the local and platform files are used when present.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        match config_file {
            Some(path) => {
                builder = builder.add_source(
                    config::File::from(path.as_path())
                        .format(config::FileFormat::Toml)
                        .required(true),
                );
            }
            None => {
                if let Some(path) = Self::discover_file() {
                    builder = builder.add_source(
                        config::File::from(path)
                            .format(config::FileFormat::Toml)
                            .required(false),
                    );
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .with_context(|| match config_file {
                Some(path) => format!("Failed to load configuration from '{}'", path.display()),
                None => "Failed to load configuration".to_string(),
            })?;
        Ok(loaded)
    }

    fn discover_file() -> Option<PathBuf> {
        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local.to_path_buf());
        }
        let global = Self::config_path();
        global.is_file().then_some(global)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `tandem.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "tandem", "tandem")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Value of a dotted key such as `tools.copier`, rendered as text.
    pub fn get(&self, key: &str) -> Option<String> {
        let tree = serde_json::to_value(self).ok()?;
        let value = key
            .split('.')
            .try_fold(&tree, |node, part| node.get(part))?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf key in dotted form, sorted.
    pub fn keys(&self) -> Vec<String> {
        let Ok(serde_json::Value::Object(sections)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = sections
            .iter()
            .flat_map(|(section, fields)| match fields {
                serde_json::Value::Object(map) => map
                    .keys()
                    .map(|k| format!("{section}.{k}"))
                    .collect::<Vec<_>>(),
                _ => vec![section.clone()],
            })
            .collect();
        keys.sort();
        keys
    }
}
