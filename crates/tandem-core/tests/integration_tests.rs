//! Integration tests for tandem-core.
//!
//! Drives the public services against small in-memory port implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tandem_core::{
    application::{
        DiscoveryService, ExampleRegistry, MatrixService, RenderService, SandboxService,
        TemplatePair,
        ports::{
            DeclaredEnvironments, EnvironmentRunner, ProcessOutput, ProjectVcs, TemplateRenderer,
            Workspace,
        },
    },
    domain::{
        Answers, EnvFilter, EnvName, Example, ExampleName, ExecutionMode, RenderOutcome,
        RenderRequest, Stage, WorkRoot,
    },
    error::TandemResult,
};

/// Renderer that records every request and "renders" the answers it was
/// given into an in-memory project.
#[derive(Default)]
struct RecordingRenderer {
    requests: Mutex<Vec<RenderRequest>>,
    fail_package_for: Option<String>,
}

impl TemplateRenderer for RecordingRenderer {
    fn render(&self, request: &RenderRequest) -> TandemResult<RenderOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        let failing = self
            .fail_package_for
            .as_deref()
            .is_some_and(|name| request.destination.to_string_lossy().contains(name));
        if failing && request.stage == Stage::Package {
            return Ok(RenderOutcome::failure("validation failed", 1));
        }
        Ok(RenderOutcome::success(request.destination.join("copie000")))
    }
}

#[derive(Default)]
struct MemoryWorkspace {
    answers: Mutex<BTreeMap<PathBuf, Answers>>,
}

impl Workspace for MemoryWorkspace {
    fn create_work_root(&self, example: &ExampleName) -> TandemResult<WorkRoot> {
        Ok(WorkRoot::new(format!("/tmp/copie_{example}_0")))
    }
    fn reset_dir(&self, _path: &Path) -> TandemResult<()> {
        Ok(())
    }
    fn create_dir_all(&self, _path: &Path) -> TandemResult<()> {
        Ok(())
    }
    fn write_answers(&self, path: &Path, answers: &Answers) -> TandemResult<()> {
        self.answers
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), answers.clone());
        Ok(())
    }
    fn copy_file(&self, _from: &Path, _to: &Path) -> TandemResult<bool> {
        Ok(false)
    }
    fn flatten(&self, _dir: &Path) -> TandemResult<bool> {
        Ok(false)
    }
    fn exists(&self, _path: &Path) -> bool {
        true
    }
    fn is_dir(&self, _path: &Path) -> bool {
        true
    }
}

struct FixedRunner {
    listing: &'static str,
    runs: Mutex<Vec<String>>,
}

impl EnvironmentRunner for FixedRunner {
    fn list(&self, _project_dir: &Path) -> TandemResult<ProcessOutput> {
        Ok(ProcessOutput {
            exit_code: Some(0),
            stdout: self.listing.into(),
            stderr: String::new(),
        })
    }

    fn run(
        &self,
        _project_dir: &Path,
        env: &EnvName,
        _mode: ExecutionMode,
        _capture: bool,
    ) -> TandemResult<ProcessOutput> {
        self.runs.lock().unwrap().push(env.to_string());
        Ok(ProcessOutput {
            exit_code: Some(0),
            ..Default::default()
        })
    }
}

struct NothingDeclared;

impl DeclaredEnvironments for NothingDeclared {
    fn declared(&self, _project_dir: &Path) -> TandemResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct CountingVcs {
    bootstraps: Mutex<usize>,
}

impl ProjectVcs for CountingVcs {
    fn bootstrap(&self, _project_dir: &Path) -> TandemResult<()> {
        *self.bootstraps.lock().unwrap() += 1;
        Ok(())
    }
    fn shallow_clone(&self, _url: &str, _dest: &Path) -> TandemResult<()> {
        Ok(())
    }
    fn add(&self, _cwd: &Path, _path: &Path) -> TandemResult<()> {
        Ok(())
    }
}

fn example(name: &str, a: i64, b: i64) -> Example {
    Example::new(
        ExampleName::new(name).unwrap(),
        Answers::new().with("a", a),
        Answers::new().with("b", b),
    )
}

#[test]
fn each_stage_receives_its_own_answers() {
    let renderer = Arc::new(RecordingRenderer::default());
    let workspace = Arc::new(MemoryWorkspace::default());
    let render = RenderService::new(
        renderer.clone(),
        workspace.clone(),
        TemplatePair::new("/tpl/package", "/tpl/rule"),
    );

    let rendered = render
        .render_example(
            &example("demo", 1, 2),
            &tandem_core::domain::StageLayout::in_work_root(),
        )
        .unwrap();

    let answers = workspace.answers.lock().unwrap();
    assert_eq!(
        answers[Path::new("/tmp/copie_demo_0/copier/package.yml")],
        Answers::new().with("a", 1)
    );
    assert_eq!(
        answers[Path::new("/tmp/copie_demo_0/copier/rule.yml")],
        Answers::new().with("b", 2)
    );

    let requests = renderer.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].parent.as_ref(), Some(rendered.package()));
    assert_eq!(
        rendered.project_dir(),
        Path::new("/tmp/copie_demo_0/rule/copie000")
    );
}

#[test]
fn matrix_runs_every_pair_once() {
    let renderer = Arc::new(RecordingRenderer::default());
    let workspace = Arc::new(MemoryWorkspace::default());
    let runner = Arc::new(FixedRunner {
        listing: "lint\npy312\n",
        runs: Mutex::new(Vec::new()),
    });
    let vcs = Arc::new(CountingVcs::default());

    let render = RenderService::new(
        renderer.clone(),
        workspace,
        TemplatePair::new("/tpl/package", "/tpl/rule"),
    );
    let discovery = DiscoveryService::new(runner.clone(), Arc::new(NothingDeclared));
    let mut matrix = MatrixService::new(render, discovery, runner.clone(), vcs.clone());

    let examples = vec![example("one", 1, 1), example("two", 2, 2)];
    let plan = matrix.collect(&examples, &EnvFilter::all()).unwrap();
    assert_eq!(
        plan.ids(),
        vec!["one:lint", "one:py312", "two:lint", "two:py312"]
    );

    // Collecting again must not render again.
    matrix.collect(&examples, &EnvFilter::all()).unwrap();
    assert_eq!(renderer.requests.lock().unwrap().len(), 4);

    let report = matrix
        .run_all(&plan, ExecutionMode::Parallel, true)
        .unwrap();
    assert!(report.is_success());
    assert_eq!(runner.runs.lock().unwrap().len(), 4);
    assert_eq!(*vcs.bootstraps.lock().unwrap(), 4);
}

#[test]
fn sandbox_reports_failures_per_example() {
    let renderer = Arc::new(RecordingRenderer {
        fail_package_for: Some("bad".into()),
        ..Default::default()
    });
    let workspace: Arc<dyn Workspace> = Arc::new(MemoryWorkspace::default());
    let render = RenderService::new(
        renderer.clone(),
        workspace.clone(),
        TemplatePair::new("/tpl/package", "/tpl/rule"),
    );
    let registry =
        ExampleRegistry::from_examples(vec![example("bad", 0, 0), example("good", 1, 2)]);
    let sandbox = SandboxService::new(registry, render, workspace, "/sandbox");

    let report = sandbox.generate::<&str>(&[], false).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed().count(), 1);
    // bad: package only, good: package + rule
    assert_eq!(renderer.requests.lock().unwrap().len(), 3);
    assert!(
        renderer
            .requests
            .lock()
            .unwrap()
            .iter()
            .all(|r| r.destination.starts_with("/sandbox"))
    );
}
