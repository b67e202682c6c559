//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "tandem",
    bin_name = "tandem",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Two-stage template rendering and environment-matrix runner",
    long_about = "Tandem renders a package template and a rule template on top of it \
                  for every registered example, then runs each environment the \
                  rendered project declares.",
    after_help = "EXAMPLES:\n\
        \x20 tandem generate\n\
        \x20 tandem generate example-answers-able\n\
        \x20 tandem test -e example-answers-able --env py312\n\
        \x20 tandem completions bash > /usr/share/bash-completion/completions/tandem",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render examples into the sandbox directory.
    #[command(
        visible_alias = "gen",
        about = "Render examples into the sandbox",
        after_help = "EXAMPLES:\n\
            \x20 tandem generate                  # every example\n\
            \x20 tandem generate demo other       # a subset\n\
            \x20 tandem generate demo --flatten"
    )]
    Generate(GenerateArgs),

    /// List registered examples.
    #[command(
        visible_alias = "ls",
        about = "List registered examples",
        after_help = "EXAMPLES:\n\
            \x20 tandem list\n\
            \x20 tandem list --output-format json"
    )]
    List(ListArgs),

    /// Render one example and print the environments it declares.
    #[command(
        about = "Show the environments of an example",
        after_help = "EXAMPLES:\n\
            \x20 tandem envs example-answers-able"
    )]
    Envs(EnvsArgs),

    /// Run every (example, environment) pair.
    #[command(
        visible_alias = "t",
        about = "Run the environment matrix",
        after_help = "EXAMPLES:\n\
            \x20 tandem test\n\
            \x20 tandem test -e demo --env py312 --env lint\n\
            \x20 tandem test --no-parallel --no-capture"
    )]
    Test(TestArgs),

    /// Clone the package template if it is missing.
    #[command(
        about = "Fetch the package template",
        after_help = "EXAMPLES:\n\
            \x20 tandem fetch\n\
            \x20 tandem fetch --dest ../able-workflow-copier-dev"
    )]
    Fetch(FetchArgs),

    /// Pre-commit hooks.
    #[command(about = "Run a pre-commit hook", subcommand)]
    Hook(HookCommands),

    /// Post-render project tasks.
    #[command(about = "Run a project task", subcommand)]
    Task(TaskCommands),

    /// Initialise a Tandem configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 tandem init           # default location\n\
            \x20 tandem init --local   # ./tandem.toml\n\
            \x20 tandem init --force   # overwrite"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 tandem completions bash > ~/.local/share/bash-completion/completions/tandem\n\
            \x20 tandem completions zsh  > ~/.zfunc/_tandem\n\
            \x20 tandem completions fish > ~/.config/fish/completions/tandem.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Tandem configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 tandem config get tools.copier\n\
            \x20 tandem config list\n\
            \x20 tandem config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `tandem generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Examples to render; none renders all of them.
    #[arg(value_name = "EXAMPLE", help = "Examples to render (default: all)")]
    pub examples: Vec<String>,

    /// Lift a lone top-level directory in each stage output one level up.
    #[arg(long = "flatten", help = "Flatten single-directory stage outputs")]
    pub flatten: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `tandem list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Override the configured answers directory.
    #[arg(
        long = "answers-dir",
        value_name = "DIR",
        help = "Directory of example answers"
    )]
    pub answers_dir: Option<PathBuf>,
}

// ── envs ──────────────────────────────────────────────────────────────────────

/// Arguments for `tandem envs`.
#[derive(Debug, Args)]
pub struct EnvsArgs {
    /// Example to render and inspect.
    #[arg(value_name = "EXAMPLE", help = "Example name")]
    pub example: String,
}

// ── test ──────────────────────────────────────────────────────────────────────

/// Arguments for `tandem test`.
#[derive(Debug, Args)]
pub struct TestArgs {
    /// Restrict the run to these examples.
    #[arg(
        short = 'e',
        long = "example",
        value_name = "EXAMPLE",
        help = "Only run this example (repeatable)"
    )]
    pub examples: Vec<String>,

    /// Restrict the run to these environments.
    #[arg(
        long = "env",
        value_name = "ENV",
        help = "Only run this environment (repeatable)"
    )]
    pub envs: Vec<String>,

    /// Run environments with `tox run` instead of `tox run-parallel`.
    #[arg(long = "no-parallel", help = "Run each environment serially")]
    pub no_parallel: bool,

    /// Stream tool output to the terminal instead of capturing it.
    #[arg(long = "no-capture", help = "Do not capture environment output")]
    pub no_capture: bool,
}

// ── fetch ─────────────────────────────────────────────────────────────────────

/// Arguments for `tandem fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Clone destination.
    #[arg(
        long = "dest",
        value_name = "DIR",
        help = "Clone destination (default: <sandbox_root>/able-workflow-copier-dev)"
    )]
    pub dest: Option<PathBuf>,

    /// Repository to clone.
    #[arg(long = "url", value_name = "URL", help = "Repository URL")]
    pub url: Option<String>,
}

// ── hook ──────────────────────────────────────────────────────────────────────

/// Subcommands for `tandem hook`.
#[derive(Debug, Subcommand)]
pub enum HookCommands {
    /// Regenerate the conda environment file when pyproject.toml is staged.
    #[command(name = "pyproject2conda")]
    Pyproject2conda {
        /// Staged files passed by pre-commit.
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
}

// ── task ──────────────────────────────────────────────────────────────────────

/// Subcommands for `tandem task`.
#[derive(Debug, Subcommand)]
pub enum TaskCommands {
    /// Register a rule file in the workflow include list.
    #[command(name = "append-include")]
    AppendInclude(AppendIncludeArgs),
}

/// Arguments for `tandem task append-include`.
#[derive(Debug, Args)]
pub struct AppendIncludeArgs {
    /// Rule file to include, as written in the include line.
    #[arg(value_name = "SMK_FILE")]
    pub smk_file: String,

    /// Include list to edit.
    #[arg(
        long = "target",
        value_name = "FILE",
        help = "Include list (default: workflow/rules/includes.smk)"
    )]
    pub target: Option<PathBuf>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `tandem init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `tandem.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `tandem completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `tandem config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `tools.copier`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
