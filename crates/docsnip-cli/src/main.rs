// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! docsnip CLI - run the test snippets in a crate's doc comments.

mod commands;
mod help;
mod output;
mod reporter;

use std::env;
use std::process;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for diagnostics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

/// Environment variable holding the log filter.
const LOG_VAR: &str = "DOCSNIP_LOG";

fn init_logging(verbose: usize) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Split `-v`/`-vv`/`--verbose` off the argument list.
fn take_verbosity(args: Vec<String>) -> (usize, Vec<String>) {
    let mut verbose = 0;
    let mut rest = Vec::with_capacity(args.len());
    for arg in args {
        match arg.as_str() {
            "--verbose" => verbose += 1,
            a if a.len() > 1 && a.starts_with('-') && a[1..].chars().all(|c| c == 'v') => {
                verbose += a.len() - 1
            }
            _ => rest.push(arg),
        }
    }
    (verbose, rest)
}

fn main() {
    output::init();
    let (verbose, args) = take_verbosity(env::args().skip(1).collect());
    init_logging(verbose);

    let Some(cmd) = args.first() else {
        help::print_usage();
        return;
    };

    match cmd.as_str() {
        "test" => commands::test::cmd_test(&args[1..]),
        "list" => commands::list::cmd_list(&args[1..]),
        "help" | "--help" | "-h" => help::print_usage(),
        "version" | "--version" | "-V" => help::print_version(),
        other => {
            eprintln!("{}: unknown command `{}`", output::error_label(), other);
            eprintln!();
            help::print_usage();
            process::exit(1);
        }
    }
}
