use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap::ValueHint;
use clap::builder::FalseyValueParser;
pub use clap_complete::Shell;

use crate::usecases::HostSelection;

const LONG_ABOUT: &str = "\
Click a rendered element, describe a change, and hand it to a local coding agent.\n\
\n\
The build tags every element with its source file, line and column; the\n\
picker sends the selection to the edit bridge, which runs the agent.";

const AFTER_LONG_HELP: &str = r#"EXAMPLES:
    # Run the edit bridge on the default port
    pinpoint serve

    # Bridge on Windows, agent inside WSL
    pinpoint serve --host wsl --model auto

    # Show the exact command a request would run
    pinpoint invocation --prompt "make this blue" --file src/Button.tsx --line 12 --element-type button

    # Tag a syntax tree produced by an external parser
    pinpoint tag tree.json --file /app/src/Card.tsx"#;

#[derive(Parser)]
#[command(name = "pinpoint")]
#[command(author, version, propagate_version = true)]
#[command(about = "Point at UI, describe the edit, let the agent apply it")]
#[command(long_about = LONG_ABOUT)]
#[command(after_long_help = AFTER_LONG_HELP)]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output (also respects NO_COLOR)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new(),
        help_heading = "Output Options"
    )]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, help_heading = "Debug Options")]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the edit bridge HTTP server
    #[command(long_about = "\
Run the edit bridge HTTP server.\n\
\n\
Answers POST /__ai-cli with {status, message?}. The agent's output streams\n\
to this terminal. Only loopback addresses are bound unless\n\
PINPOINT_ALLOW_REMOTE=1 or --allow-remote is given.")]
    Serve(ServeArgs),

    /// Print the agent command an edit request would run, without running it
    Invocation(InvocationArgs),

    /// Add source provenance attributes to a JSON syntax tree
    Tag(TagArgs),

    /// Show effective configuration and environment
    Env {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(long_about = "\
Generate shell completion scripts.\n\
\n\
    # Bash - add to ~/.bashrc\n\
    source <(pinpoint completions bash)\n\
\n\
    # Zsh - add to ~/.zshrc\n\
    source <(pinpoint completions zsh)")]
    Completions {
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum HostArg {
    Auto,
    Native,
    Wsl,
}

impl From<HostArg> for HostSelection {
    fn from(arg: HostArg) -> Self {
        match arg {
            HostArg::Auto => HostSelection::Auto,
            HostArg::Native => HostSelection::Native,
            HostArg::Wsl => HostSelection::Wsl,
        }
    }
}

/// Overrides for how the agent is reached; unset flags keep the environment
/// value.
#[derive(Debug, Clone, Default, Args)]
pub struct AgentOptions {
    /// Host profile (auto picks wsl on Windows)
    #[arg(long, value_enum, value_name = "HOST", help_heading = "Agent Options")]
    pub host: Option<HostArg>,

    /// Agent binary run inside the shell
    #[arg(long, value_name = "BIN", help_heading = "Agent Options")]
    pub agent: Option<String>,

    /// Value passed to the agent's --model
    #[arg(long, value_name = "MODEL", help_heading = "Agent Options")]
    pub model: Option<String>,

    /// Login shell used as `<shell> -lc <command>`
    #[arg(long, value_name = "SHELL", help_heading = "Agent Options")]
    pub shell: Option<String>,

    /// Program that provides `wslpath` (wsl host only)
    #[arg(long, value_name = "PROGRAM", help_heading = "Agent Options")]
    pub path_helper: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,

    /// Allow binding a non-loopback address
    #[arg(long)]
    pub allow_remote: bool,

    /// Run overlapping requests instead of rejecting them with 409
    #[arg(long)]
    pub allow_concurrent: bool,

    #[command(flatten)]
    pub agent: AgentOptions,
}

#[derive(Debug, Clone, Args)]
pub struct InvocationArgs {
    /// Edit instruction
    #[arg(long)]
    pub prompt: String,

    /// Source file as recorded in the element's provenance tag
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub file: String,

    /// Source line
    #[arg(long)]
    pub line: String,

    /// Element tag name, e.g. button
    #[arg(long, value_name = "TYPE")]
    pub element_type: String,

    /// Print JSON instead of a shell line
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub agent: AgentOptions,
}

#[derive(Debug, Clone, Args)]
pub struct TagArgs {
    /// JSON syntax tree to tag ("-" reads stdin)
    #[arg(value_name = "TREE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Source file path to record in the tags
    #[arg(long, value_name = "SOURCE")]
    pub file: String,
}
