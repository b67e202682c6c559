//! Implementation of the `tandem envs` command.

use serde::Serialize;
use tracing::instrument;

use tandem_core::domain::EnvironmentList;

use crate::{
    cli::EnvsArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    wiring::Wiring,
};

#[derive(Debug, Serialize)]
struct EnvsView<'a> {
    example: &'a str,
    environments: Vec<&'a str>,
    placeholder: bool,
}

#[instrument(skip_all, fields(example = %args.example))]
pub fn execute(args: EnvsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let wiring = Wiring::new(&config);
    let registry = wiring.registry()?;
    let example = registry
        .resolve(std::slice::from_ref(&args.example))?
        .into_iter()
        .next()
        .ok_or_else(|| CliError::InvalidInput {
            message: format!("no example named '{}'", args.example),
            source: None,
        })?;

    let mut matrix = wiring.matrix(wiring.templates()?);
    let spinner = output.spinner(format!("Rendering {}...", example.name()));
    let environments = matrix.environments(&example);
    spinner.finish_and_clear();
    let environments = environments?;

    print_environments(&args.example, &environments, &output)
}

fn print_environments(
    example: &str,
    environments: &EnvironmentList,
    output: &OutputManager,
) -> CliResult<()> {
    if output.is_json() {
        output.json(&EnvsView {
            example,
            environments: environments.names(),
            placeholder: environments.is_placeholder(),
        })?;
        return Ok(());
    }

    output.header(&format!("Environments of {example}:"))?;
    for env in environments.iter() {
        output.print(&format!("  {env}"))?;
    }
    if environments.is_placeholder() {
        output.warning("The project declares no environments")?;
    }
    Ok(())
}
