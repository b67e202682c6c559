//! Discovery Service - which test environments a rendered project declares.
//!
//! Asks the environment runner first and falls back to the project's
//! declared configuration when the runner reports nothing usable.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::{
    application::ports::{DeclaredEnvironments, EnvironmentRunner},
    domain::EnvironmentList,
    error::TandemResult,
};

pub struct DiscoveryService {
    runner: Arc<dyn EnvironmentRunner>,
    declared: Arc<dyn DeclaredEnvironments>,
}

impl DiscoveryService {
    pub fn new(
        runner: Arc<dyn EnvironmentRunner>,
        declared: Arc<dyn DeclaredEnvironments>,
    ) -> Self {
        Self { runner, declared }
    }

    /// Environments of the project at `project_dir`, in declared order.
    ///
    /// Never empty: a project that declares nothing gets the placeholder
    /// entry. Only a missing runner executable is an error.
    #[instrument(skip_all, fields(project = %project_dir.display()))]
    pub fn discover(&self, project_dir: &Path) -> TandemResult<EnvironmentList> {
        let output = self.runner.list(project_dir)?;

        if !output.success() {
            error!(
                exit_code = ?output.exit_code,
                output = %output.combined().trim(),
                "Environment listing failed"
            );
            return Ok(self.fallback(project_dir));
        }

        let names = parse_listing(&output.stdout);
        if names.is_empty() {
            warn!("Environment listing returned no environments");
            return Ok(self.fallback(project_dir));
        }

        debug!(envs = ?names, "Environments discovered");
        Ok(EnvironmentList::from_discovered(names))
    }

    fn fallback(&self, project_dir: &Path) -> EnvironmentList {
        let declared = match self.declared.declared(project_dir) {
            Ok(names) => names,
            Err(e) => {
                warn!("Ignoring project configuration: {e}");
                Vec::new()
            }
        };

        let list = EnvironmentList::from_discovered(declared);
        if list.is_placeholder() {
            warn!("No environments declared; using placeholder");
        } else {
            debug!(envs = ?list.names(), "Using declared environments");
        }
        list
    }
}

/// One name per line; surrounding whitespace and blank lines are ignored.
fn parse_listing(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}
