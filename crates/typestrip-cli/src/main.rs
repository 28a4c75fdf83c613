#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use typestrip::{ModifierSyntax, NonNullSyntax, StripOptions};

#[derive(Parser, Debug)]
#[command(name = "typestrip")]
#[command(author, version, about = "Strip type annotations from JavaScript without moving lines", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Config file (default: typestrip.json in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Member modifier syntax: off, bare-keyword-v1
    #[arg(long, global = true, value_name = "SYNTAX")]
    modifiers: Option<ModifierSyntax>,

    /// Non-null assertion syntax: off, postfix-bang-v1
    #[arg(long, global = true, value_name = "SYNTAX")]
    non_null: Option<NonNullSyntax>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Strip type annotations from files or directories
    Strip {
        /// Files or directories (searched recursively for .ts/.mts/.cts/.js/.mjs/.cjs)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write outputs into this directory instead of next to the inputs
        #[arg(long, short = 'o', value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Only report diagnostics, write nothing
        #[arg(long)]
        check: bool,

        /// Maximum parallel jobs (default: number of CPUs)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Stop starting new files after the first failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show the spans that would be removed from a file
    Spans {
        /// Source file
        file: PathBuf,
    },
}

/// Resolve strip options: config file first, then command line overrides.
fn load_options(cwd: &Path, cli: &Cli) -> Result<StripOptions> {
    let mut options = match &cli.config {
        Some(path) => StripOptions::from_file(&cwd.join(path)).into_diagnostic()?,
        None => StripOptions::discover(cwd).into_diagnostic()?,
    };
    if let Some(modifiers) = cli.modifiers {
        options = options.with_modifiers(modifiers);
    }
    if let Some(non_null) = cli.non_null {
        options = options.with_non_null(non_null);
    }
    Ok(options)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    if matches!(cli.command, Some(Commands::Version) | None) {
        return commands::version::run(cli.json);
    }

    logging::init(cli.verbose, cli.json);
    let options = load_options(&cwd, &cli)?;
    tracing::debug!(cwd = %cwd.display(), modifiers = %options.modifiers, non_null = %options.non_null, "options resolved");

    match cli.command {
        Some(Commands::Strip {
            paths,
            out_dir,
            check,
            jobs,
            fail_fast,
        }) => {
            let span = tracing::info_span!("strip", cmd = "strip", cwd = %cwd.display());
            let _guard = span.enter();
            let action = commands::strip::StripAction {
                cwd,
                paths,
                out_dir,
                check,
                jobs,
                fail_fast,
            };
            commands::strip::run(action, options, cli.json)
        }
        Some(Commands::Spans { file }) => commands::spans::run(&cwd, &file, options, cli.json),
        Some(Commands::Version) | None => unreachable!(), // Handled above
    }
}
