//! Sandbox Service - render examples into a directory a developer can open.
//!
//! Each example gets `<sandbox_root>/<name>/` with `package_run/` and
//! `rule_run/` inside it. A failing example is reported and the remaining
//! examples are still generated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ports::Workspace,
        services::{ExampleRegistry, RenderService},
    },
    domain::{Example, ExampleName, Stage, StageLayout, WorkRoot},
    error::TandemResult,
};

/// What happened to one example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SandboxOutcome {
    Generated { project_dir: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxEntry {
    pub example: ExampleName,
    pub directory: PathBuf,
    #[serde(flatten)]
    pub outcome: SandboxOutcome,
}

impl SandboxEntry {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SandboxOutcome::Generated { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SandboxReport {
    pub entries: Vec<SandboxEntry>,
}

impl SandboxReport {
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(SandboxEntry::is_success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &SandboxEntry> {
        self.entries.iter().filter(|e| !e.is_success())
    }
}

pub struct SandboxService {
    registry: ExampleRegistry,
    render: RenderService,
    workspace: Arc<dyn Workspace>,
    root: PathBuf,
}

impl SandboxService {
    pub fn new(
        registry: ExampleRegistry,
        render: RenderService,
        workspace: Arc<dyn Workspace>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            render,
            workspace,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Examples `generate` would render for `names`, checked up front.
    ///
    /// Unknown names and missing local templates are reported before
    /// anything is rendered.
    pub fn plan<S: AsRef<str>>(&self, names: &[S]) -> TandemResult<Vec<Example>> {
        let examples = self.registry.resolve(names)?;
        self.render.check_templates()?;
        Ok(examples)
    }

    /// Render the selected examples. No names selects every example.
    pub fn generate<S: AsRef<str>>(
        &self,
        names: &[S],
        flatten: bool,
    ) -> TandemResult<SandboxReport> {
        self.generate_with(names, flatten, |_| {})
    }

    /// Like [`SandboxService::generate`], calling `on_entry` after each example.
    pub fn generate_with<S: AsRef<str>>(
        &self,
        names: &[S],
        flatten: bool,
        mut on_entry: impl FnMut(&SandboxEntry),
    ) -> TandemResult<SandboxReport> {
        let examples = self.plan(names)?;

        let mut report = SandboxReport::default();
        for example in &examples {
            let entry = self.generate_one(example, flatten)?;
            on_entry(&entry);
            report.entries.push(entry);
        }
        Ok(report)
    }

    /// Wipe and render one example's sandbox directory.
    ///
    /// A failed stage is returned as a failed entry; other errors abort.
    #[instrument(skip_all, fields(example = %example.name()))]
    pub fn generate_one(&self, example: &Example, flatten: bool) -> TandemResult<SandboxEntry> {
        let directory = self.root.join(example.name().as_str());
        self.workspace.reset_dir(&directory)?;

        let layout = StageLayout::in_directory(&directory).with_flatten(flatten);
        let scratch = WorkRoot::new(&directory);
        for stage in [Stage::Package, Stage::Rule] {
            self.workspace
                .create_dir_all(&layout.stage_dir(&scratch, stage))?;
        }

        let outcome = match self.render.render_example(example, &layout) {
            Ok(rendered) => {
                info!(project = %rendered.project_dir().display(), "Sandbox generated");
                SandboxOutcome::Generated {
                    project_dir: rendered.project_dir().to_path_buf(),
                }
            }
            Err(e) if e.is_stage_failure() => {
                warn!("Sandbox generation failed: {e}");
                SandboxOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(e) => return Err(e),
        };

        Ok(SandboxEntry {
            example: example.name().clone(),
            directory,
            outcome,
        })
    }
}
