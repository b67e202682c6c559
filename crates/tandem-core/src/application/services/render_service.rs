//! Render Service - the two-stage pipeline.
//!
//! Renders the package template, then the rule template on top of the
//! package output:
//! 1. Create the example's work root
//! 2. Render the package stage with the package answers
//! 3. Render the rule stage with the rule answers, seeded from the package
//!
//! A failed package stage stops the pipeline; the rule stage never runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{TemplateRenderer, Workspace},
    },
    domain::{
        Example, ExampleState, RenderOutcome, RenderRequest, RenderedExample, Stage, StageLayout,
        WorkRoot,
    },
    error::{TandemError, TandemResult},
};

/// Answers file the renderer leaves in every project it produces.
pub const ANSWERS_FILE: &str = ".copier-answers.yml";

/// The parent and child template sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePair {
    pub package: PathBuf,
    pub rule: PathBuf,
}

impl TemplatePair {
    pub fn new(package: impl Into<PathBuf>, rule: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            rule: rule.into(),
        }
    }

    pub fn for_stage(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Package => &self.package,
            Stage::Rule => &self.rule,
        }
    }
}

/// `true` if the renderer should be handed `source` as-is rather than a
/// local directory that must exist.
pub fn is_remote_template(source: &Path) -> bool {
    let s = source.to_string_lossy();
    s.contains("://") || s.starts_with("git@") || s.starts_with("gh:") || s.starts_with("gl:")
}

/// Two-stage rendering service.
pub struct RenderService {
    renderer: Arc<dyn TemplateRenderer>,
    workspace: Arc<dyn Workspace>,
    templates: TemplatePair,
}

impl RenderService {
    pub fn new(
        renderer: Arc<dyn TemplateRenderer>,
        workspace: Arc<dyn Workspace>,
        templates: TemplatePair,
    ) -> Self {
        Self {
            renderer,
            workspace,
            templates,
        }
    }

    pub fn templates(&self) -> &TemplatePair {
        &self.templates
    }

    /// Fail early if a local template directory is missing.
    pub fn check_templates(&self) -> TandemResult<()> {
        for stage in [Stage::Package, Stage::Rule] {
            let source = self.templates.for_stage(stage);
            if !is_remote_template(source) && !self.workspace.is_dir(source) {
                return Err(ApplicationError::TemplateMissing {
                    path: source.to_path_buf(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Render both stages of `example`.
    ///
    /// A stage that fails yields `ApplicationError::StageFailed`; anything
    /// else returned as `Err` should abort the whole run.
    #[instrument(skip_all, fields(example = %example.name()))]
    pub fn render_example(
        &self,
        example: &Example,
        layout: &StageLayout,
    ) -> TandemResult<RenderedExample> {
        let work_root = self.workspace.create_work_root(example.name())?;
        debug!(work_root = %work_root.root().display(), "Work root created");

        let mut state = ExampleState::default();

        let package = self.render_stage(example, Stage::Package, &work_root, layout, None)?;
        if !package.is_success() {
            return Err(self.stage_failed(example, Stage::Package, state, &package));
        }
        state = state.advance()?;

        let rule = self.render_stage(
            example,
            Stage::Rule,
            &work_root,
            layout,
            Some(package.clone()),
        )?;
        if !rule.is_success() {
            return Err(self.stage_failed(example, Stage::Rule, state, &rule));
        }
        state = state.advance()?;

        info!(%state, project = ?rule.project_dir(), "Example rendered");

        RenderedExample::new(example.name().clone(), work_root, package, rule).ok_or_else(|| {
            TandemError::Internal {
                message: "successful rule stage without a project directory".into(),
            }
        })
    }

    fn render_stage(
        &self,
        example: &Example,
        stage: Stage,
        work_root: &WorkRoot,
        layout: &StageLayout,
        parent: Option<RenderOutcome>,
    ) -> TandemResult<RenderOutcome> {
        let destination = layout.stage_dir(work_root, stage);
        self.workspace.create_dir_all(&destination)?;

        let data_file = work_root.data_file(stage);
        self.workspace
            .write_answers(&data_file, example.answers_for(stage))?;

        let request = RenderRequest {
            stage,
            template: self.templates.for_stage(stage).to_path_buf(),
            destination: destination.clone(),
            data_file,
            parent,
        };

        debug!(%stage, destination = %destination.display(), "Rendering stage");
        let mut outcome = self.renderer.render(&request)?;
        if !outcome.is_success() {
            return Ok(outcome);
        }

        if let Some(project_dir) = outcome.project_dir() {
            let recorded = project_dir.join(ANSWERS_FILE);
            if !self
                .workspace
                .copy_file(&recorded, &work_root.replay_file(stage))?
            {
                debug!(%stage, "Rendered project has no recorded answers");
            }
        }

        if layout.flattens() && self.workspace.flatten(&destination)? {
            debug!(%stage, "Flattened output into {}", destination.display());
            outcome = outcome.with_project_dir(destination);
        }

        Ok(outcome)
    }

    fn stage_failed(
        &self,
        example: &Example,
        stage: Stage,
        state: ExampleState,
        outcome: &RenderOutcome,
    ) -> TandemError {
        let reason = outcome.failure_reason();
        let state = state
            .fail(reason.clone())
            .map_or_else(|e| e.to_string(), |s| s.to_string());
        warn!(%stage, %state, exit_code = outcome.exit_code, "{reason}");

        ApplicationError::StageFailed {
            example: example.name().to_string(),
            stage,
            reason,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockTemplateRenderer, MockWorkspace};
    use crate::domain::{Answers, ExampleName};

    fn example() -> Example {
        Example::new(
            ExampleName::new("demo").unwrap(),
            Answers::new().with("a", 1),
            Answers::new().with("b", 2),
        )
    }

    fn permissive_workspace() -> MockWorkspace {
        let mut ws = MockWorkspace::new();
        ws.expect_create_work_root()
            .returning(|_| Ok(WorkRoot::new("/work/copie_demo_x")));
        ws.expect_create_dir_all().returning(|_| Ok(()));
        ws.expect_write_answers().returning(|_, _| Ok(()));
        ws.expect_copy_file().returning(|_, _| Ok(true));
        ws
    }

    fn service(renderer: MockTemplateRenderer, workspace: MockWorkspace) -> RenderService {
        RenderService::new(
            Arc::new(renderer),
            Arc::new(workspace),
            TemplatePair::new("/tpl/package", "/tpl/rule"),
        )
    }

    #[test]
    fn package_failure_skips_rule_stage() {
        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .withf(|r| r.stage == Stage::Package)
            .times(1)
            .returning(|_| Ok(RenderOutcome::failure("bad answers", 1)));
        renderer
            .expect_render()
            .withf(|r| r.stage == Stage::Rule)
            .never();

        let err = service(renderer, permissive_workspace())
            .render_example(&example(), &StageLayout::in_work_root())
            .unwrap_err();

        assert!(err.is_stage_failure());
        assert!(err.to_string().contains("bad answers"));
    }

    #[test]
    fn package_outcome_is_passed_to_rule_unchanged() {
        let package_outcome = RenderOutcome::success("/work/copie_demo_x/package/copie000");
        let expected_parent = package_outcome.clone();

        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .withf(|r| r.stage == Stage::Package && r.parent.is_none())
            .times(1)
            .returning(move |_| Ok(package_outcome.clone()));
        renderer
            .expect_render()
            .withf(move |r| r.stage == Stage::Rule && r.parent.as_ref() == Some(&expected_parent))
            .times(1)
            .returning(|_| Ok(RenderOutcome::success("/work/copie_demo_x/rule/copie000")));

        let rendered = service(renderer, permissive_workspace())
            .render_example(&example(), &StageLayout::in_work_root())
            .unwrap();

        assert_eq!(
            rendered.project_dir(),
            Path::new("/work/copie_demo_x/rule/copie000")
        );
        assert_eq!(
            rendered.package().project_dir(),
            Some(Path::new("/work/copie_demo_x/package/copie000"))
        );
    }

    #[test]
    fn requests_use_stage_templates_and_data_files() {
        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .withf(|r| {
                r.stage == Stage::Package
                    && r.template == Path::new("/tpl/package")
                    && r.destination == Path::new("/work/copie_demo_x/package")
                    && r.data_file == Path::new("/work/copie_demo_x/copier/package.yml")
            })
            .returning(|_| Ok(RenderOutcome::success("/p")));
        renderer
            .expect_render()
            .withf(|r| r.stage == Stage::Rule && r.template == Path::new("/tpl/rule"))
            .returning(|_| Ok(RenderOutcome::success("/r")));

        let mut ws = MockWorkspace::new();
        ws.expect_create_work_root()
            .returning(|_| Ok(WorkRoot::new("/work/copie_demo_x")));
        ws.expect_create_dir_all().returning(|_| Ok(()));
        ws.expect_write_answers()
            .withf(|path, answers| {
                path == Path::new("/work/copie_demo_x/copier/package.yml")
                    && *answers == Answers::new().with("a", 1)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        ws.expect_write_answers()
            .withf(|path, answers| {
                path == Path::new("/work/copie_demo_x/copier/rule.yml")
                    && *answers == Answers::new().with("b", 2)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        ws.expect_copy_file()
            .withf(|from, to| {
                from == Path::new("/p/.copier-answers.yml")
                    && to == Path::new("/work/copie_demo_x/copier_replay/package.yml")
            })
            .times(1)
            .returning(|_, _| Ok(true));
        ws.expect_copy_file()
            .withf(|from, to| {
                from == Path::new("/r/.copier-answers.yml")
                    && to == Path::new("/work/copie_demo_x/copier_replay/rule.yml")
            })
            .times(1)
            .returning(|_, _| Ok(false));

        service(renderer, ws)
            .render_example(&example(), &StageLayout::in_work_root())
            .unwrap();
    }

    #[test]
    fn rule_failure_is_reported_as_rule_stage() {
        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .withf(|r| r.stage == Stage::Package)
            .returning(|_| Ok(RenderOutcome::success("/p")));
        renderer
            .expect_render()
            .withf(|r| r.stage == Stage::Rule)
            .returning(|_| Ok(RenderOutcome::failure("rule broke", 2)));

        let err = service(renderer, permissive_workspace())
            .render_example(&example(), &StageLayout::in_work_root())
            .unwrap_err();

        match err {
            TandemError::Application(ApplicationError::StageFailed { stage, .. }) => {
                assert_eq!(stage, Stage::Rule)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn renderer_errors_abort() {
        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().returning(|_| {
            Err(ApplicationError::ToolNotFound {
                program: "copier".into(),
            }
            .into())
        });

        let err = service(renderer, permissive_workspace())
            .render_example(&example(), &StageLayout::in_work_root())
            .unwrap_err();
        assert!(!err.is_stage_failure());
    }

    #[test]
    fn flattening_moves_project_dir_to_stage_dir() {
        let mut renderer = MockTemplateRenderer::new();
        renderer
            .expect_render()
            .returning(|r| Ok(RenderOutcome::success(r.destination.join("copie000"))));

        let mut ws = permissive_workspace();
        ws.expect_flatten().times(2).returning(|_| Ok(true));

        let layout = StageLayout::in_directory("/sandbox/demo").with_flatten(true);
        let rendered = service(renderer, ws)
            .render_example(&example(), &layout)
            .unwrap();

        assert_eq!(rendered.project_dir(), Path::new("/sandbox/demo/rule_run"));
    }

    #[test]
    fn missing_local_template_is_reported() {
        let mut ws = MockWorkspace::new();
        ws.expect_is_dir()
            .withf(|p| p == Path::new("/tpl/package"))
            .returning(|_| false);

        let err = service(MockTemplateRenderer::new(), ws)
            .check_templates()
            .unwrap_err();
        assert!(matches!(
            err,
            TandemError::Application(ApplicationError::TemplateMissing { .. })
        ));
    }

    #[test]
    fn remote_templates_are_not_checked() {
        assert!(is_remote_template(Path::new(
            "https://github.com/org/template.git"
        )));
        assert!(is_remote_template(Path::new("gh:org/template")));
        assert!(!is_remote_template(Path::new("./templates/rule")));
    }
}
