//! Implementation of the `tandem list` command.

use serde::Serialize;

use tandem_core::domain::Example;

use crate::{
    cli::ListArgs, config::AppConfig, error::CliResult, output::OutputManager, wiring::Wiring,
};

/// One registered example as shown by `list`.
#[derive(Debug, Serialize)]
struct ExampleSummary<'a> {
    name: &'a str,
    package_answers: usize,
    rule_answers: usize,
}

impl<'a> From<&'a Example> for ExampleSummary<'a> {
    fn from(example: &'a Example) -> Self {
        Self {
            name: example.name().as_str(),
            package_answers: example.package_answers().len(),
            rule_answers: example.rule_answers().len(),
        }
    }
}

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let wiring = Wiring::new(&config);
    let registry = match args.answers_dir {
        Some(dir) => wiring.registry_from(dir)?,
        None => wiring.registry()?,
    };

    let summaries: Vec<ExampleSummary<'_>> = registry.all().iter().map(Into::into).collect();

    if output.is_json() {
        output.json(&summaries)?;
        return Ok(());
    }

    output.header("Registered examples:")?;
    for s in &summaries {
        output.print(&format!(
            "  {} ({} package answers, {} rule answers)",
            s.name, s.package_answers, s.rule_answers
        ))?;
    }
    Ok(())
}
