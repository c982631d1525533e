#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::CmdContext;
use horilla_core::{EntityKind, ErrorCode};
use horilla_core::config::resolve_config;
use output::{CliError, OutputMode, render_error};
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "horilla-hier: guarded parent/child links for contacts and campaigns",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and HORILLA_FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Which hierarchy to operate on.
    #[arg(long, global = true, default_value = "contact")]
    kind: EntityKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize the hierarchy store",
        long_about = "Create .horilla/config.toml (if missing) and the SQLite store.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    horilla-hier init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Write",
        about = "Add a root node",
        after_help = "EXAMPLES:\n    # Add a contact\n    horilla-hier add \"Acme Corp\"\n\n    # Add a campaign\n    horilla-hier --kind campaign add \"Spring launch\""
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Write",
        about = "Place a child under a parent",
        long_about = "Validate a proposed parent/child edge and commit it if it keeps the hierarchy a forest.",
        after_help = "EXAMPLES:\n    # Make contact 2 a child of contact 1\n    horilla-hier assign --parent 1 --child 2\n\n    # Same for campaigns, JSON output\n    horilla-hier --kind campaign assign --parent 1 --child 2 --json"
    )]
    Assign(cmd::assign::AssignArgs),

    #[command(next_help_heading = "Write", about = "Make a node a root again")]
    Detach(cmd::detach::DetachArgs),

    #[command(
        next_help_heading = "Read",
        about = "List eligible parents for a node",
        after_help = "EXAMPLES:\n    # Parents a picker may offer for contact 4\n    horilla-hier candidates 4"
    )]
    Candidates(cmd::candidates::CandidatesArgs),

    #[command(next_help_heading = "Read", about = "List every descendant of a node")]
    Descendants(cmd::descendants::DescendantsArgs),

    #[command(next_help_heading = "Read", about = "List the parent chain of a node")]
    Ancestors(cmd::ancestors::AncestorsArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Audit stored links for cycles and dangling parents",
        long_about = "Audit stored links. Exits non-zero when the hierarchy is not a forest."
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    horilla-hier completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HORILLA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "horilla=debug,info"
        } else {
            "horilla=info,warn"
        })
    });

    let format = env::var("HORILLA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let effective = match resolve_config(&project_root, cli.json) {
        Ok(effective) => effective,
        Err(e) => {
            let fallback = cli.format.unwrap_or(if cli.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            });
            render_error(
                fallback,
                &CliError::coded(format!("{e:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(e);
        }
    };
    let output = cli
        .format
        .unwrap_or_else(|| OutputMode::from_resolved(&effective.resolved_output));

    debug!(
        root = %project_root.display(),
        store = %effective.store_path.display(),
        kind = %cli.kind,
        policy = %effective.project.hierarchy.reparent,
        "resolved configuration"
    );

    let ctx = CmdContext {
        project_root,
        store_path: effective.store_path,
        policy: effective.project.hierarchy.reparent,
        kind: cli.kind,
        output,
    };

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, &ctx),
        Commands::Add(ref args) => cmd::add::run_add(args, &ctx),
        Commands::Assign(ref args) => cmd::assign::run_assign(args, &ctx),
        Commands::Detach(ref args) => cmd::detach::run_detach(args, &ctx),
        Commands::Candidates(ref args) => cmd::candidates::run_candidates(args, &ctx),
        Commands::Descendants(ref args) => cmd::descendants::run_descendants(args, &ctx),
        Commands::Ancestors(ref args) => cmd::ancestors::run_ancestors(args, &ctx),
        Commands::Check(ref args) => cmd::check::run_check(args, &ctx),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
