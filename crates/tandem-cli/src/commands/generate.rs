//! Implementation of the `tandem generate` command.
//!
//! Renders the selected examples into `<sandbox_root>/<example>/`. Unknown
//! example names are rejected before anything is rendered; a failing
//! example is reported and the remaining ones still run.

use tracing::{instrument, warn};

use tandem_core::application::services::{SandboxEntry, SandboxOutcome};

use crate::{
    cli::GenerateArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    wiring::Wiring,
};

#[instrument(skip_all, fields(examples = args.examples.len()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let wiring = Wiring::new(&config);
    let registry = wiring.registry()?;
    let templates = wiring.templates()?;
    let sandbox = wiring.sandbox(registry, templates);

    let spinner = output.spinner("Rendering examples...");
    let report = sandbox.generate_with(&args.examples, args.flatten, |entry| {
        if output.is_json() {
            return;
        }
        if let Err(e) = spinner.suspend(|| print_entry(entry, &output)) {
            warn!("Failed to print sandbox entry: {e}");
        }
    });
    spinner.finish_and_clear();
    let report = report?;

    if output.is_json() {
        output.json(&report)?;
    }

    if report.is_success() {
        return Ok(());
    }
    Err(CliError::SandboxFailed {
        examples: report
            .failed()
            .map(|e| e.example.to_string())
            .collect(),
    })
}

fn print_entry(entry: &SandboxEntry, output: &OutputManager) -> CliResult<()> {
    match &entry.outcome {
        SandboxOutcome::Generated { project_dir } => output.success(&format!(
            "[{}] generated at {}",
            entry.example,
            project_dir.display()
        ))?,
        SandboxOutcome::Failed { reason } => {
            output.error(&format!("[{}] {reason}", entry.example))?
        }
    }
    Ok(())
}
