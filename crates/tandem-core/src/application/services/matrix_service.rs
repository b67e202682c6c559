//! Matrix Service - every (example, environment) pair as a test case.
//!
//! Collection renders each example once and discovers its environments; the
//! result is memoised for the lifetime of the service. Running a case
//! bootstraps the rendered project as a git repository and hands the
//! environment to the runner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{EnvironmentRunner, ProjectVcs},
        services::{DiscoveryService, RenderService},
    },
    domain::{
        CaseReport, CaseStatus, EnvFilter, EnvironmentList, Example, ExampleName, ExampleState,
        ExecutionMode, MatrixCase, MatrixPlan, MatrixReport, SkipReason, SkippedExample,
        StageLayout,
    },
    error::{TandemError, TandemResult},
};

/// A rendered project and the environments it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedExample {
    pub project_dir: PathBuf,
    pub environments: EnvironmentList,
}

/// Memo entry for one example.
#[derive(Debug, Clone, PartialEq)]
pub enum Preparation {
    Ready(PreparedExample),
    /// Rendering failed; the error is kept so later requests report it
    /// without rendering again.
    Failed(TandemError),
}

pub struct MatrixService {
    render: RenderService,
    discovery: DiscoveryService,
    runner: Arc<dyn EnvironmentRunner>,
    vcs: Arc<dyn ProjectVcs>,
    prepared: HashMap<ExampleName, Preparation>,
}

impl MatrixService {
    pub fn new(
        render: RenderService,
        discovery: DiscoveryService,
        runner: Arc<dyn EnvironmentRunner>,
        vcs: Arc<dyn ProjectVcs>,
    ) -> Self {
        Self {
            render,
            discovery,
            runner,
            vcs,
            prepared: HashMap::new(),
        }
    }

    /// Render and discover `example`, or return the memoised result.
    ///
    /// A failed render is memoised too. Errors other than a failed stage
    /// are returned and nothing is recorded.
    #[instrument(skip_all, fields(example = %example.name()))]
    pub fn prepare(&mut self, example: &Example) -> TandemResult<&Preparation> {
        if !self.prepared.contains_key(example.name()) {
            let preparation = self.prepare_uncached(example)?;
            self.prepared.insert(example.name().clone(), preparation);
        } else {
            debug!("Using cached preparation");
        }

        self.prepared
            .get(example.name())
            .ok_or_else(|| TandemError::Internal {
                message: format!("preparation of {} was not recorded", example.name()),
            })
    }

    fn prepare_uncached(&self, example: &Example) -> TandemResult<Preparation> {
        let rendered = match self
            .render
            .render_example(example, &StageLayout::in_work_root())
        {
            Ok(rendered) => rendered,
            Err(e) if e.is_stage_failure() => return Ok(Preparation::Failed(e)),
            Err(e) => return Err(e),
        };

        let environments = self.discovery.discover(rendered.project_dir())?;
        let state = ExampleState::RuleRendered.advance()?;
        debug!(%state, envs = ?environments.names(), "Example prepared");

        Ok(Preparation::Ready(PreparedExample {
            project_dir: rendered.project_dir().to_path_buf(),
            environments,
        }))
    }

    /// Environments of one example, rendering it first if needed.
    pub fn environments(&mut self, example: &Example) -> TandemResult<EnvironmentList> {
        match self.prepare(example)? {
            Preparation::Ready(prepared) => Ok(prepared.environments.clone()),
            Preparation::Failed(e) => Err(e.clone()),
        }
    }

    /// Build the case list for `examples`.
    ///
    /// Examples whose render failed, or whose environments are all filtered
    /// out, are listed as skipped and contribute no cases.
    pub fn collect(
        &mut self,
        examples: &[Example],
        filter: &EnvFilter,
    ) -> TandemResult<MatrixPlan> {
        self.render.check_templates()?;

        let mut plan = MatrixPlan::default();
        for example in examples {
            match self.prepare(example)? {
                Preparation::Failed(e) => {
                    warn!(example = %example.name(), "Skipping example: {e}");
                    plan.skipped.push(SkippedExample {
                        example: example.name().clone(),
                        reason: SkipReason::Failed(e.to_string()),
                    });
                }
                Preparation::Ready(prepared) => {
                    let selected = filter.apply(&prepared.environments);
                    if selected.is_empty() {
                        debug!(example = %example.name(), "No selected environments");
                        plan.skipped.push(SkippedExample {
                            example: example.name().clone(),
                            reason: SkipReason::NoSelectedEnvs,
                        });
                        continue;
                    }
                    plan.cases.extend(
                        selected
                            .into_iter()
                            .map(|env| MatrixCase::new(example.name().clone(), env)),
                    );
                }
            }
        }

        info!(
            cases = plan.cases.len(),
            skipped = plan.skipped.len(),
            "Matrix collected"
        );
        Ok(plan)
    }

    /// Run a single case against its prepared project.
    ///
    /// A project that cannot be made a repository yields a failed report;
    /// only a missing `git` executable is returned as an error.
    #[instrument(skip_all, fields(case = %case))]
    pub fn run_case(
        &self,
        case: &MatrixCase,
        mode: ExecutionMode,
        capture: bool,
    ) -> TandemResult<CaseReport> {
        let project_dir = self.project_dir(&case.example)?;
        let status = CaseStatus::Pending.start()?;
        let started = Instant::now();

        if let Err(e) = self.vcs.bootstrap(project_dir) {
            if e.is_tool_missing() {
                return Err(e);
            }
            warn!("Repository bootstrap failed: {e}");
            return Ok(bootstrap_failure(case, status, &e, started));
        }

        let output = self.runner.run(project_dir, &case.env, mode, capture)?;
        let status = status.finish(output.success())?;

        let report = CaseReport {
            case: case.clone(),
            status,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        if report.passed() {
            info!(duration_ms = report.duration_ms, "Case passed");
        } else {
            warn!(exit_code = ?report.exit_code, "Case failed");
        }
        Ok(report)
    }

    /// Run every case in order. A failing case never stops the run.
    pub fn run_all(
        &self,
        plan: &MatrixPlan,
        mode: ExecutionMode,
        capture: bool,
    ) -> TandemResult<MatrixReport> {
        self.run_all_with(plan, mode, capture, |_| {})
    }

    /// Like [`MatrixService::run_all`], calling `on_case` after each case.
    pub fn run_all_with(
        &self,
        plan: &MatrixPlan,
        mode: ExecutionMode,
        capture: bool,
        mut on_case: impl FnMut(&CaseReport),
    ) -> TandemResult<MatrixReport> {
        let mut report = MatrixReport::start(mode, plan.skipped.clone());
        for case in &plan.cases {
            let case_report = self.run_case(case, mode, capture)?;
            on_case(&case_report);
            report.record(case_report);
        }
        Ok(report.finish())
    }

    fn project_dir(&self, example: &ExampleName) -> TandemResult<&Path> {
        match self.prepared.get(example) {
            Some(Preparation::Ready(prepared)) => Ok(&prepared.project_dir),
            _ => Err(ApplicationError::NotPrepared {
                example: example.to_string(),
            }
            .into()),
        }
    }
}

/// Failed report for a case whose project could not be made a repository.
fn bootstrap_failure(
    case: &MatrixCase,
    status: CaseStatus,
    error: &TandemError,
    started: Instant,
) -> CaseReport {
    let (exit_code, stderr) = match error {
        TandemError::Application(ApplicationError::ExternalCommandFailed {
            exit_code,
            output,
            ..
        }) => (*exit_code, format!("{error}\n{output}")),
        other => (None, other.to_string()),
    };
    CaseReport {
        case: case.clone(),
        status: status.finish(false).unwrap_or(CaseStatus::Failed),
        exit_code,
        stdout: String::new(),
        stderr,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        MockDeclaredEnvironments, MockEnvironmentRunner, MockProjectVcs, MockTemplateRenderer,
        MockWorkspace, ProcessOutput,
    };
    use crate::application::services::TemplatePair;
    use crate::domain::{Answers, EnvName, RenderOutcome, Stage, WorkRoot};

    fn example(name: &str) -> Example {
        Example::new(ExampleName::new(name).unwrap(), Answers::new(), Answers::new())
    }

    fn workspace() -> MockWorkspace {
        let mut ws = MockWorkspace::new();
        ws.expect_is_dir().returning(|_| true);
        ws.expect_create_work_root()
            .returning(|name| Ok(WorkRoot::new(format!("/work/copie_{name}_x"))));
        ws.expect_create_dir_all().returning(|_| Ok(()));
        ws.expect_write_answers().returning(|_, _| Ok(()));
        ws.expect_copy_file().returning(|_, _| Ok(true));
        ws
    }

    /// Renderer that fails the package stage for examples named `broken*`.
    fn renderer(calls: usize) -> MockTemplateRenderer {
        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().times(calls).returning(|r| {
            if r.destination.to_string_lossy().contains("broken") && r.stage == Stage::Package {
                Ok(RenderOutcome::failure("boom", 1))
            } else {
                Ok(RenderOutcome::success(r.destination.join("copie000")))
            }
        });
        renderer
    }

    fn listing(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    fn service(
        renderer: MockTemplateRenderer,
        discovery_runner: MockEnvironmentRunner,
        case_runner: MockEnvironmentRunner,
        vcs: MockProjectVcs,
    ) -> MatrixService {
        let ws = Arc::new(workspace());
        let render = RenderService::new(
            Arc::new(renderer),
            ws,
            TemplatePair::new("/tpl/package", "/tpl/rule"),
        );
        let discovery = DiscoveryService::new(
            Arc::new(discovery_runner),
            Arc::new(MockDeclaredEnvironments::new()),
        );
        MatrixService::new(render, discovery, Arc::new(case_runner), Arc::new(vcs))
    }

    /// Service that is only ever asked to collect.
    fn collecting(renderer: MockTemplateRenderer, lister: MockEnvironmentRunner) -> MatrixService {
        service(
            renderer,
            lister,
            MockEnvironmentRunner::new(),
            MockProjectVcs::new(),
        )
    }

    #[test]
    fn preparation_is_memoised() {
        let mut lister = MockEnvironmentRunner::new();
        lister
            .expect_list()
            .times(1)
            .returning(|_| Ok(listing("lint\npy312\n")));

        let mut matrix = collecting(renderer(2), lister);
        let demo = example("demo");

        let first = matrix.collect(&[demo.clone()], &EnvFilter::all()).unwrap();
        let second = matrix.collect(&[demo], &EnvFilter::all()).unwrap();

        assert_eq!(first.ids(), vec!["demo:lint", "demo:py312"]);
        assert_eq!(first, second);
    }

    #[test]
    fn failed_example_is_skipped_and_siblings_continue() {
        let mut lister = MockEnvironmentRunner::new();
        lister
            .expect_list()
            .times(1)
            .returning(|_| Ok(listing("py312\n")));

        // broken: package only; good: package + rule
        let mut matrix = collecting(renderer(3), lister);
        let plan = matrix
            .collect(&[example("broken"), example("good")], &EnvFilter::all())
            .unwrap();

        assert_eq!(plan.ids(), vec!["good:py312"]);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].example.as_str(), "broken");
        assert!(matches!(plan.skipped[0].reason, SkipReason::Failed(_)));
    }

    #[test]
    fn failed_render_is_memoised_too() {
        let mut matrix = service(
            renderer(1),
            MockEnvironmentRunner::new(),
            MockEnvironmentRunner::new(),
            MockProjectVcs::new(),
        );
        let broken = example("broken");

        assert!(matrix.environments(&broken).unwrap_err().is_stage_failure());
        assert!(matrix.environments(&broken).unwrap_err().is_stage_failure());
    }

    #[test]
    fn filter_selects_in_declared_order() {
        let mut lister = MockEnvironmentRunner::new();
        lister
            .expect_list()
            .returning(|_| Ok(listing("lint\npy311\npy312\n")));

        let mut matrix = collecting(renderer(2), lister);
        let filter = EnvFilter::only([
            EnvName::new("py312").unwrap(),
            EnvName::new("lint").unwrap(),
        ]);
        let plan = matrix.collect(&[example("demo")], &filter).unwrap();

        assert_eq!(plan.ids(), vec!["demo:lint", "demo:py312"]);
    }

    #[test]
    fn example_with_no_selected_env_is_skipped() {
        let mut lister = MockEnvironmentRunner::new();
        lister.expect_list().returning(|_| Ok(listing("lint\n")));

        let mut matrix = collecting(renderer(2), lister);
        let filter = EnvFilter::only([EnvName::new("docs").unwrap()]);
        let plan = matrix.collect(&[example("demo")], &filter).unwrap();

        assert!(plan.cases.is_empty());
        assert_eq!(plan.skipped[0].reason, SkipReason::NoSelectedEnvs);
    }

    #[test]
    fn run_all_continues_past_failures() {
        let mut lister = MockEnvironmentRunner::new();
        lister
            .expect_list()
            .returning(|_| Ok(listing("lint\npy312\n")));

        let mut runner = MockEnvironmentRunner::new();
        runner
            .expect_run()
            .times(2)
            .returning(|_, env, mode, capture| {
                assert_eq!(mode, ExecutionMode::Serial);
                assert!(capture);
                let code = if env.as_str() == "lint" { 1 } else { 0 };
                Ok(ProcessOutput {
                    exit_code: Some(code),
                    stdout: format!("ran {env}"),
                    stderr: String::new(),
                })
            });

        let mut vcs = MockProjectVcs::new();
        vcs.expect_bootstrap()
            .withf(|p| p == Path::new("/work/copie_demo_x/rule/copie000"))
            .times(2)
            .returning(|_| Ok(()));

        let mut matrix = service(renderer(2), lister, runner, vcs);
        let plan = matrix.collect(&[example("demo")], &EnvFilter::all()).unwrap();
        let report = matrix.run_all(&plan, ExecutionMode::Serial, true).unwrap();

        assert_eq!(report.cases.len(), 2);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.passed().count(), 1);
        assert!(!report.is_success());
        assert!(report.finished_at.is_some());

        let failed = report.failed().next().unwrap();
        assert!(failed.failure_message().contains("[example = demo, env = lint]"));
        assert!(failed.failure_message().contains("ran lint"));
    }

    #[test]
    fn bootstrap_failure_fails_only_its_case() {
        let mut lister = MockEnvironmentRunner::new();
        lister.expect_list().returning(|_| Ok(listing("py312\n")));

        let mut runner = MockEnvironmentRunner::new();
        runner
            .expect_run()
            .withf(|dir, _, _, _| dir.to_string_lossy().contains("copie_bbb_"))
            .times(1)
            .returning(|_, _, _, _| Ok(listing("ok")));

        let mut vcs = MockProjectVcs::new();
        vcs.expect_bootstrap().returning(|dir| {
            if dir.to_string_lossy().contains("copie_aaa_") {
                Err(ApplicationError::ExternalCommandFailed {
                    command: "git commit".into(),
                    exit_code: Some(128),
                    output: "fatal: empty ident".into(),
                }
                .into())
            } else {
                Ok(())
            }
        });

        let mut matrix = service(renderer(4), lister, runner, vcs);
        let plan = matrix
            .collect(&[example("aaa"), example("bbb")], &EnvFilter::all())
            .unwrap();
        let report = matrix.run_all(&plan, ExecutionMode::Parallel, true).unwrap();

        assert_eq!(report.cases.len(), 2);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].case.example.as_str(), "aaa");
        assert_eq!(failed[0].exit_code, Some(128));
        assert!(failed[0].stderr.contains("fatal: empty ident"));
        assert_eq!(report.passed().next().unwrap().case.example.as_str(), "bbb");
    }

    #[test]
    fn missing_git_aborts_the_run() {
        let mut lister = MockEnvironmentRunner::new();
        lister.expect_list().returning(|_| Ok(listing("py312\n")));

        let mut runner = MockEnvironmentRunner::new();
        runner.expect_run().never();

        let mut vcs = MockProjectVcs::new();
        vcs.expect_bootstrap().returning(|_| {
            Err(ApplicationError::ToolNotFound {
                program: "git".into(),
            }
            .into())
        });

        let mut matrix = service(renderer(2), lister, runner, vcs);
        let plan = matrix.collect(&[example("demo")], &EnvFilter::all()).unwrap();
        let err = matrix
            .run_all(&plan, ExecutionMode::Parallel, true)
            .unwrap_err();
        assert!(err.is_tool_missing());
    }

    #[test]
    fn unprepared_case_is_rejected() {
        let matrix = service(
            renderer(0),
            MockEnvironmentRunner::new(),
            MockEnvironmentRunner::new(),
            MockProjectVcs::new(),
        );
        let case = MatrixCase::new(
            ExampleName::new("demo").unwrap(),
            EnvName::new("lint").unwrap(),
        );
        let err = matrix
            .run_case(&case, ExecutionMode::Parallel, true)
            .unwrap_err();
        assert!(matches!(
            err,
            TandemError::Application(ApplicationError::NotPrepared { .. })
        ));
    }
}
