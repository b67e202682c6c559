//! Flags accepted before or after any subcommand.
//!
//! Flattened into [`super::Cli`] with `global = true`, so
//! `tandem test -vv` and `tandem -vv test` mean the same thing.

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log level for tandem's own diagnostics on stderr.
    ///
    /// `-v` reports each rendered example and finished tox case, `-vv` adds
    /// every copier stage and command line, `-vvv` traces everything.
    /// `RUST_LOG` takes precedence when set.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Show render and tox results (-v), commands (-vv), everything (-vvv)",
        long_help = "Raise the log level of tandem's diagnostics on stderr:
    (none)  - warnings, such as skipped examples or discovery fallbacks
    -v      - each rendered example and finished tox case
    -vv     - each copier stage and the copier/tox/git command lines
    -vvv    - everything, including each process exit code

RUST_LOG overrides this flag when it is set."
    )]
    pub verbose: u8,

    /// Print only failures: failed examples, failed cases and errors.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print only failures and errors"
    )]
    pub quiet: bool,

    /// Plain status markers instead of coloured ones. `NO_COLOR` implies it.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Disable colored status markers"
    )]
    pub no_color: bool,

    /// TOML file with `paths`, `tools`, `matrix` and `output` sections.
    ///
    /// Without it, `./tandem.toml` and then the user config directory are
    /// tried. `TANDEM_*` variables override whichever file is used.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Read settings from this TOML file"
    )]
    pub config: Option<PathBuf>,

    /// `json` prints the example list, environment list, sandbox report or
    /// matrix report as a single JSON document on stdout.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Result format: auto, human, plain or json (list, envs, generate, test)"
    )]
    pub output_format: OutputFormat,

    /// Copy of the diagnostics, written regardless of terminal colours.
    #[arg(
        long = "log-file",
        global = true,
        value_name = "PATH",
        env = "TANDEM_LOG_FILE",
        help = "Also append diagnostics to this file"
    )]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` when stdout is piped.
    #[default]
    Auto,
    /// Coloured markers and spinners while copier runs.
    Human,
    /// Markers without colour or spinners; stable for logs.
    Plain,
    /// One JSON document per command.
    Json,
}
