//! Implementation of the `tandem task` commands.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, instrument};

use tandem_core::domain::include::{INCLUDES_FILE, append_include};

use crate::{
    cli::{AppendIncludeArgs, TaskCommands},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(cmd: TaskCommands, output: OutputManager) -> CliResult<()> {
    match cmd {
        TaskCommands::AppendInclude(args) => append(args, &output),
    }
}

/// Append the include line for a rule file to the workflow include list.
#[instrument(skip_all, fields(smk_file = %args.smk_file))]
fn append(args: AppendIncludeArgs, output: &OutputManager) -> CliResult<()> {
    let target = args.target.unwrap_or_else(|| PathBuf::from(INCLUDES_FILE));
    if !target.is_file() {
        return Err(CliError::FileNotFound { path: target });
    }

    let content = fs::read_to_string(&target)
        .with_cli_context(|| format!("Failed to read '{}'", target.display()))?;

    match append_include(&content, &args.smk_file) {
        None => {
            debug!(target = %target.display(), "Include already present");
            output.info(&format!(
                "{} already includes {}",
                target.display(),
                args.smk_file
            ))?;
        }
        Some(updated) => {
            fs::write(&target, updated)
                .with_cli_context(|| format!("Failed to write '{}'", target.display()))?;
            output.success(&format!("Added {} to {}", args.smk_file, target.display()))?;
        }
    }
    Ok(())
}
