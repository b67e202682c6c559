//! Builds core services from the adapters and the loaded configuration.
//!
//! Command handlers ask this module for ready-made services and never
//! construct adapters themselves.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use tandem_adapters::{
    AnswersDirectory, CopierRenderer, GitCli, LocalWorkspace, PyprojectReader,
    SystemProcessRunner, ToxRunner,
};
use tandem_core::application::{
    DiscoveryService, EnvFileHook, ExampleRegistry, MatrixService, RenderService,
    SandboxService, TemplateFetcher, TemplatePair,
    ports::{ProcessRunner, ProjectVcs, Workspace},
    services::is_remote_template,
};

use crate::config::AppConfig;
use crate::error::CliResult;

/// Shared adapters plus the configuration they were built from.
pub struct Wiring {
    config: AppConfig,
    process: Arc<dyn ProcessRunner>,
    workspace: Arc<dyn Workspace>,
    vcs: Arc<dyn ProjectVcs>,
}

impl Wiring {
    pub fn new(config: &AppConfig) -> Self {
        let process: Arc<dyn ProcessRunner> = Arc::new(SystemProcessRunner::new());
        let vcs: Arc<dyn ProjectVcs> =
            Arc::new(GitCli::new(process.clone()).with_program(&config.tools.git));
        Self {
            config: config.clone(),
            process,
            workspace: Arc::new(LocalWorkspace::new()),
            vcs,
        }
    }

    /// Examples registered under `paths.answers_dir`.
    pub fn registry(&self) -> CliResult<ExampleRegistry> {
        self.registry_from(self.config.paths.answers_dir.clone())
    }

    pub fn registry_from(&self, answers_dir: PathBuf) -> CliResult<ExampleRegistry> {
        debug!(dir = %answers_dir.display(), "Loading examples");
        Ok(ExampleRegistry::load(&AnswersDirectory::new(answers_dir))?)
    }

    pub fn fetcher(&self) -> TemplateFetcher {
        TemplateFetcher::new(self.vcs.clone(), self.workspace.clone())
    }

    /// Package and rule template locations.
    ///
    /// A package template given as a URL is cloned under the sandbox root
    /// first, and the clone is used.
    pub fn templates(&self) -> CliResult<TemplatePair> {
        let paths = &self.config.paths;
        let package = PathBuf::from(&paths.package_template);
        let package = if is_remote_template(&package) {
            let dest = TemplateFetcher::default_destination(&paths.sandbox_root);
            info!(url = %paths.package_template, "Using remote package template");
            self.fetcher().ensure(&dest, &paths.package_template)?
        } else {
            package
        };
        Ok(TemplatePair::new(package, &paths.rule_template))
    }

    pub fn render_service(&self, templates: TemplatePair) -> RenderService {
        let renderer =
            CopierRenderer::new(self.process.clone()).with_program(&self.config.tools.copier);
        RenderService::new(Arc::new(renderer), self.workspace.clone(), templates)
    }

    fn tox(&self) -> Arc<ToxRunner> {
        Arc::new(ToxRunner::new(self.process.clone()).with_program(&self.config.tools.tox))
    }

    pub fn matrix(&self, templates: TemplatePair) -> MatrixService {
        let tox = self.tox();
        let discovery = DiscoveryService::new(tox.clone(), Arc::new(PyprojectReader::new()));
        MatrixService::new(
            self.render_service(templates),
            discovery,
            tox,
            self.vcs.clone(),
        )
    }

    pub fn sandbox(&self, registry: ExampleRegistry, templates: TemplatePair) -> SandboxService {
        SandboxService::new(
            registry,
            self.render_service(templates),
            self.workspace.clone(),
            &self.config.paths.sandbox_root,
        )
    }

    pub fn env_file_hook(&self) -> EnvFileHook {
        EnvFileHook::new(self.process.clone(), self.vcs.clone(), self.workspace.clone())
            .with_generator(&self.config.tools.pyproject2conda)
    }
}
