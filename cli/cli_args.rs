use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path of the TOML config file (default: promptpack.toml in the project root).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Curate project files and prompt snippets into one LLM context artifact.",
    long_about = "promptpack tracks which files and directories of a project are included in \nor excluded from an LLM prompt, together with an ordered list of reusable \nprompt snippets, and serializes the curated set into a single text artifact \nwith a running token estimate. Selection state persists across invocations.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  promptpack select src/main.rs src\n  promptpack exclude src/generated\n  promptpack snippet use review.txt\n  promptpack generate --stdout",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Render the curated context artifact and update the session."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "s",
        about = "Toggle inclusion of files or directories (directories cascade)."
    )]
    Select(ToggleArgs),

    #[command(
        visible_alias = "x",
        about = "Toggle exclusion of files or directories (exclusion wins)."
    )]
    Exclude(ToggleArgs),

    #[command(about = "Reset every selection, exclusion and the snippet order.")]
    Clear(ClearArgs),

    #[command(about = "Show the tree with selection state, snippet pools and the estimate.")]
    Show(ShowArgs),

    #[command(
        visible_alias = "p",
        about = "Manage the ordered prompt-snippet selection."
    )]
    Snippet(SnippetArgs),

    #[command(
        visible_alias = "m",
        about = "Per-file statistics for the current selection."
    )]
    Metrics(MetricsArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,

    #[arg(
        long,
        help = "Write the artifact to standard output instead of the output file.",
        help_heading = "Output Control",
        conflicts_with = "output"
    )]
    pub stdout: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Override the configured output file path.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "NAME=PATH",
        help = "Register a file's content as a dynamic snippet for this run and append it to the selection.",
        help_heading = "Output Control"
    )]
    pub inject: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ToggleArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,

    #[arg(required = true, value_name = "PATH", help = "Paths relative to the project root (or absolute).")]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,
}

#[derive(Args, Debug, Clone)]
pub struct SnippetArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,

    #[command(subcommand)]
    pub action: SnippetAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SnippetAction {
    #[command(about = "List the selected (ordered) and available snippet pools.")]
    List,

    #[command(about = "Append a snippet to the selected order.")]
    Use { name: String },

    #[command(about = "Return a snippet to the available pool.")]
    Drop { name: String },

    #[command(about = "Move a selected snippet up one position.")]
    Up { name: String },

    #[command(about = "Move a selected snippet down one position.")]
    Down { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    #[clap(flatten)]
    pub project: ProjectOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(value_name = "SHELL", help = "Shell flavor: bash, zsh or fish (default: bash).")]
    pub shell: Option<String>,

    #[arg(long, help = "Save the script to the standard per-shell completion directory.")]
    pub save: bool,
}
