//! sprig - run a script file or start an interactive REPL.
//!
//! Two modes (`spec.md` §6):
//!
//! ```text
//! sprig <file>   # read file, scan, parse, interpret.
//!                # exit 65 on any static error, 70 on any runtime error, 0 otherwise.
//! sprig          # REPL: read a line, scan, parse, interpret; never exit on error.
//!                # EOF terminates.
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as ClapParser;
use colored::Colorize;

use sprig::{run_in, Diagnostics, Interpreter};

/// A tree-walking interpreter for the sprig scripting language.
#[derive(ClapParser, Debug)]
#[command(name = "sprig")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script to run. Omit to start an interactive REPL.
    script: Option<PathBuf>,

    /// Enable verbose internal diagnostics (scanning/parsing/evaluation
    /// tracing). Does not change stdout, exit codes, or error message text.
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored REPL/error output.
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    match &args.script {
        Some(path) => run_file(path),
        None => {
            run_prompt();
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "off" };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .try_init();
}

/// Reads `path`, scans, parses, and, only if no static error was
/// recorded, interprets it. Exit code 65/70/0 per `spec.md` §6.
///
/// A failure to read the file at all is a *driver* error, distinct from the
/// language's own static/runtime error taxonomy, so it is reported the
/// ordinary `anyhow` way and exits non-zero without claiming 65 or 70.
fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: {err:#}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let diagnostics = Diagnostics::new();
    sprig::run(&source, &diagnostics);

    if diagnostics.had_error() {
        ExitCode::from(65)
    } else if diagnostics.had_runtime_error() {
        ExitCode::from(70)
    } else {
        ExitCode::SUCCESS
    }
}

/// One shared `Interpreter` across the whole REPL session, so `var`/`fun`
/// declarations persist line to line. Each line gets its own static-error
/// flag: a bad line never poisons the ones after it, and the session never
/// exits because of an error (`spec.md` §6).
fn run_prompt() {
    let diagnostics = Diagnostics::new();
    let mut interpreter = Interpreter::new(&diagnostics);
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("{}", "> ".cyan());
        let _ = io::stdout().flush();

        line.clear();
        let bytes_read = stdin.lock().read_line(&mut line).unwrap_or(0);
        if bytes_read == 0 {
            println!();
            break;
        }

        run_in(&line, &diagnostics, &mut interpreter);
        diagnostics.reset_static();
    }
}
