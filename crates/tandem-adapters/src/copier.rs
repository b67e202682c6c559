//! Template renderer backed by the `copier` command-line tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use tandem_core::{
    application::ports::{Capture, Invocation, ProcessRunner, TemplateRenderer},
    domain::{RenderOutcome, RenderRequest},
    error::TandemResult,
};

use crate::workspace::{copy_tree, map_io_error};

pub const DEFAULT_PROGRAM: &str = "copier";

/// Prefix of the per-render output directories inside a stage directory.
pub const OUTPUT_PREFIX: &str = "copie";

/// Renders one stage with `copier copy`.
///
/// Every render gets a fresh `copieNNN` directory inside the request's
/// destination. A render with a parent starts from a copy of the parent's
/// project, so the child template only adds to it.
pub struct CopierRenderer {
    process: Arc<dyn ProcessRunner>,
    program: String,
}

impl CopierRenderer {
    pub fn new(process: Arc<dyn ProcessRunner>) -> Self {
        Self {
            process,
            program: DEFAULT_PROGRAM.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn invocation(&self, request: &RenderRequest, output_dir: &Path) -> Invocation {
        Invocation::new(&self.program)
            .args(["copy", "--defaults", "--trust", "--overwrite", "--quiet"])
            .arg("--data-file")
            .arg(request.data_file.display().to_string())
            .arg(request.template.display().to_string())
            .arg(output_dir.display().to_string())
            .capture(Capture::Separate)
    }
}

impl TemplateRenderer for CopierRenderer {
    #[instrument(skip_all, fields(stage = %request.stage))]
    fn render(&self, request: &RenderRequest) -> TandemResult<RenderOutcome> {
        let output_dir = next_output_dir(&request.destination);

        if let Some(parent) = request.parent.as_ref().and_then(RenderOutcome::project_dir) {
            let copied = copy_tree(parent, &output_dir)
                .map_err(|e| map_io_error(parent, e, "seed from parent project"))?;
            debug!(files = copied, parent = %parent.display(), "Seeded from parent");
        }

        let invocation = self.invocation(request, &output_dir);
        let output = self.process.run(&invocation)?;

        if output.success() {
            return Ok(RenderOutcome::success(output_dir));
        }

        let code = output.code();
        let reason = last_line(&output.stderr)
            .or_else(|| last_line(&output.stdout))
            .map_or_else(
                || format!("{} exited with code {code}", self.program),
                str::to_owned,
            );
        warn!(exit_code = code, "{reason}");
        Ok(RenderOutcome::failure(reason, code))
    }
}

/// First `copieNNN` directory under `destination` that does not exist yet.
pub fn next_output_dir(destination: &Path) -> PathBuf {
    (0..)
        .map(|i| destination.join(format!("{OUTPUT_PREFIX}{i:03}")))
        .find(|p| !p.exists())
        .unwrap_or_else(|| destination.join(OUTPUT_PREFIX))
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|l| !l.is_empty())
}
