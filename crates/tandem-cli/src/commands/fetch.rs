//! Implementation of the `tandem fetch` command.

use tandem_core::application::{TemplateFetcher, services::DEFAULT_TEMPLATE_URL};

use crate::{
    cli::FetchArgs, config::AppConfig, error::CliResult, output::OutputManager, wiring::Wiring,
};

/// Clone the package template unless it is already present.
pub fn execute(args: FetchArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| TemplateFetcher::default_destination(&config.paths.sandbox_root));
    let url = args.url.as_deref().unwrap_or(DEFAULT_TEMPLATE_URL);

    let fetcher = Wiring::new(&config).fetcher();
    let spinner = output.spinner(format!("Fetching {url}..."));
    let path = fetcher.ensure(&dest, url);
    spinner.finish_and_clear();

    output.success(&format!("Package template at {}", path?.display()))?;
    Ok(())
}
