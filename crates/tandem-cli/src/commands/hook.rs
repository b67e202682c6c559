//! Implementation of the `tandem hook` commands.

use std::env;

use tracing::instrument;

use crate::{
    cli::HookCommands,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    wiring::Wiring,
};

/// Run a pre-commit hook in the current directory.
///
/// A non-zero hook result becomes the process exit code.
#[instrument(skip_all)]
pub fn execute(cmd: HookCommands, config: AppConfig) -> CliResult<()> {
    match cmd {
        HookCommands::Pyproject2conda { files } => {
            let root = env::current_dir().with_cli_context(|| "Failed to read current directory")?;
            let code = Wiring::new(&config).env_file_hook().run(&root, &files)?;
            if code == 0 {
                Ok(())
            } else {
                Err(CliError::HookFailed { code })
            }
        }
    }
}
