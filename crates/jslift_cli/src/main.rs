//! jslift: Lifts nested JavaScript function declarations to the top level.
//!
//! Usage:
//!   jslift <INPUT> <OUTPUT>
//!
//! Exit status is 0 on success, 1 when the transformation fails and 2 when
//! the arguments are wrong.

use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use jslift_compiler::{transform_file, TransformError};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(ClapParser, Debug)]
#[command(
    name = "jslift",
    about = "jslift - Lift nested JavaScript functions to the top level",
    disable_version_flag = true
)]
struct Cli {
    /// JavaScript file to transform.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File to write the transformed program to.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(err) => {
            let usage = err.render().to_string();
            eprint!("{}", usage);
            process::exit(TransformError::InvalidArguments { usage }.exit_code());
        }
    };

    let use_color = stderr_is_terminal();
    install_report_hook(use_color);

    if let Err(err) = transform_file(&cli.input, &cli.output) {
        let code = err.exit_code();
        print_failure(err, use_color);
        process::exit(code);
    }
}

/// Log to stderr. `RUST_LOG` wins when set, otherwise only warnings show.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_ansi(stderr_is_terminal())
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn install_report_hook(use_color: bool) {
    let installed = miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(use_color).wrap_lines(false).build())
    }));
    if installed.is_err() {
        debug!("report hook already installed");
    }
}

fn print_failure(err: TransformError, use_color: bool) {
    match err {
        TransformError::ParseFailure { diagnostics, .. } => {
            for line in &diagnostics {
                eprintln!("{}", line);
            }
            let count = diagnostics.len();
            let plural = if count == 1 { "" } else { "s" };
            if use_color {
                eprintln!("\n{}{}Found {} error{}.{}", BOLD, RED, count, plural, RESET);
            } else {
                eprintln!("\nFound {} error{}.", count, plural);
            }
        }
        other => eprintln!("{:?}", miette::Report::new(other)),
    }
}

fn stderr_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
