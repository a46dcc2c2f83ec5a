//! Catalyze CLI: dependency tracking for incremental C builds.
//!
//! Provides `catalyze scan` to build the include graph of the tracked files,
//! `catalyze status` to compare fresh fingerprints against the cache,
//! `catalyze deps` to query one file's includes or includers, and
//! `catalyze graph` to dump the whole store.

#![warn(missing_docs)]

mod deps;
mod graph;
mod logging;
mod pipeline;
mod scan;
mod status;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Catalyze: include-graph and change tracking for C projects.
#[derive(Parser, Debug)]
#[command(name = "catalyze", version, about = "Catalyze incremental build core")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `catalyze.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Skip unreadable tracked files with a warning instead of failing.
    #[arg(long, global = true)]
    pub keep_going: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and scan every tracked file and report what was found.
    Scan,
    /// Classify tracked files as new, modified or unchanged since the cache.
    Status(StatusArgs),
    /// List the includes of one file.
    Deps(DepsArgs),
    /// Dump every node in the store.
    Graph(GraphArgs),
}

/// Arguments for the `catalyze status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Write the fresh fingerprints back to the cache file.
    #[arg(short, long)]
    pub write: bool,
}

/// Arguments for the `catalyze deps` subcommand.
#[derive(Parser, Debug)]
pub struct DepsArgs {
    /// The file to query, as it appears in the store.
    pub file: String,

    /// Follow edges transitively.
    #[arg(short, long)]
    pub transitive: bool,

    /// List the files that include `file` instead.
    #[arg(short, long)]
    pub reverse: bool,
}

/// Arguments for the `catalyze graph` subcommand.
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Also print store and arena statistics.
    #[arg(long)]
    pub stats: bool,
}

/// Output format for the graph dump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Whether unreadable tracked files are skipped instead of fatal.
    pub keep_going: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        keep_going: cli.keep_going,
    };

    let result = match cli.command {
        Command::Scan => scan::run(&global),
        Command::Status(ref args) => status::run(args, &global),
        Command::Deps(ref args) => deps::run(args, &global),
        Command::Graph(ref args) => graph::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
