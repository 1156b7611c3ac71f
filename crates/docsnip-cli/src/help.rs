// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use crate::output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_usage() {
    println!(
        "{} {} - Run the test snippets in your doc comments",
        output::title("docsnip"),
        output::version(VERSION)
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("docsnip"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {} {}   Compile and run every test snippet", output::command("test"), output::arg("[path]"));
    println!("  {} {}   List test snippets without compiling", output::command("list"), output::arg("[path]"));
    println!("  {}          Show this help", output::command("help"));
    println!("  {}       Show version", output::command("version"));
    println!();
    println!(
        "{} is a crate directory or a root source file (default: current directory)",
        output::arg("[path]")
    );
    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {}    Crate name used in imports", output::arg("--crate <name>"));
    println!("  {}  Library search path, platform path-list syntax", output::arg("--classpath <dirs>"));
    println!("  {}   Extra crate passed to rustc, repeatable", output::arg("--extern <name>"));
    println!("  {}         Do not pass the documented crate to rustc", output::arg("--no-extern"));
    println!("  {} Directory for compiled snippets (kept)", output::arg("--workspace <dir>"));
    println!("  {}  Seconds per snippet, 0 disables", output::arg("--timeout <secs>"));
    println!("  {}     Output format: human or json", output::arg("--format <f>"));
    println!("  {}            Output format json", output::arg("--json"));
    println!("  {}          Exit with status 1 if any snippet failed or errored", output::arg("--strict"));
    println!("  {}            More logging, repeatable", output::arg("-v"));
    println!();
    println!("{}", output::section_header("Environment:"));
    println!("  {}  Library search path", output::arg("DOCSNIP_CLASSPATH"));
    println!("  {}      Compiler to run (else RUSTC, else rustc)", output::arg("DOCSNIP_RUSTC"));
    println!("  {}    Edition for snippets (default 2021)", output::arg("DOCSNIP_EDITION"));
    println!("  {}    Seconds per snippet (default 60)", output::arg("DOCSNIP_TIMEOUT"));
    println!("  {}  Directory for compiled snippets", output::arg("DOCSNIP_WORKSPACE"));
    println!("  {}        Log filter (default warn)", output::arg("DOCSNIP_LOG"));
}

pub fn print_version() {
    println!("docsnip {}", VERSION);
}
