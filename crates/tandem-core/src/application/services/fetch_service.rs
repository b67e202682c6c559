//! Template Fetcher - keep a local clone of the package template.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::ports::{ProjectVcs, Workspace},
    error::TandemResult,
};

/// Repository the package template is cloned from by default.
pub const DEFAULT_TEMPLATE_URL: &str =
    "https://github.com/NEU-ABLE-LAB/able-workflow-copier-dev.git";

/// Directory name of the clone under the sandbox root.
pub const DEFAULT_TEMPLATE_DIR: &str = "able-workflow-copier-dev";

pub struct TemplateFetcher {
    vcs: Arc<dyn ProjectVcs>,
    workspace: Arc<dyn Workspace>,
}

impl TemplateFetcher {
    pub fn new(vcs: Arc<dyn ProjectVcs>, workspace: Arc<dyn Workspace>) -> Self {
        Self { vcs, workspace }
    }

    /// Default clone location under `sandbox_root`.
    pub fn default_destination(sandbox_root: &Path) -> PathBuf {
        sandbox_root.join(DEFAULT_TEMPLATE_DIR)
    }

    /// Return `dest`, cloning `url` into it first if it is not a directory.
    #[instrument(skip(self), fields(dest = %dest.display()))]
    pub fn ensure(&self, dest: &Path, url: &str) -> TandemResult<PathBuf> {
        if self.workspace.is_dir(dest) {
            info!("Template already present");
            return Ok(dest.to_path_buf());
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.workspace.create_dir_all(parent)?;
        }

        info!("Cloning template");
        self.vcs.shallow_clone(url, dest)?;
        Ok(dest.to_path_buf())
    }
}
