mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::log::LogSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shiftboard",
    about = "Shift-production tracking for three parallel lines: counters, shift log, and display broadcast",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: auto-detect from config.yaml upward, else cwd)
    #[arg(long, global = true, env = "SHIFTBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data root (config, state file, log header)
    Init,

    /// Start the API server
    Serve {
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },

    /// Show current counters for all lines
    Status,

    /// Start a shift on a line with a day plan
    Start { line: u32, plan: String },

    /// Record actual progress for a line's active shift
    Update {
        line: u32,
        /// Required in explicit update mode, ignored in increment mode
        value: Option<String>,
    },

    /// End a line's active shift, logging it and updating monthly totals
    End { line: u32 },

    /// Shift log operations
    Log {
        #[command(subcommand)]
        subcommand: LogSubcommand,
    },

    /// Push current counters for all lines to the display
    Publish,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Start { line, plan } => cmd::shift::start(&root, line, &plan, cli.json),
        Commands::Update { line, value } => {
            cmd::shift::update(&root, line, value.as_deref(), cli.json)
        }
        Commands::End { line } => cmd::shift::end(&root, line, cli.json),
        Commands::Log { subcommand } => cmd::log::run(&root, subcommand),
        Commands::Publish => cmd::publish::run(&root),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
