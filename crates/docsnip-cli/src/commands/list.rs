// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `docsnip list`: show the test snippets a run would execute.

use std::process;

use docsnip_runner::{plan, PlannedSnippet};
use serde::Serialize;

use super::{load_target, parse_options, show_warnings};
use crate::{output, Format};

#[derive(Debug, Serialize)]
struct ListReport<'a> {
    #[serde(rename = "crate")]
    crate_name: &'a str,
    snippets: &'a [PlannedSnippet],
}

pub fn cmd_list(args: &[String]) {
    let opts = match parse_options(args) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{}: {}", output::error_label(), msg);
            eprintln!("Usage: docsnip list [path] [--crate NAME]");
            process::exit(1);
        }
    };
    let target = match load_target(&opts) {
        Ok(target) => target,
        Err(msg) => {
            eprintln!("{}: {}", output::error_label(), msg);
            process::exit(1);
        }
    };

    let planned = plan(&target.source.tree, &[target.source.root]);

    match opts.format() {
        Format::Human => {
            show_warnings(&target.source);
            for p in &planned {
                if p.ignored {
                    println!("{}  {} (ignored)", output::location(&p.location), p.element);
                } else {
                    println!(
                        "{}  {} ({})",
                        output::location(&p.location),
                        output::unit_name(&p.unit),
                        p.element
                    );
                }
            }
            let ignored = planned.iter().filter(|p| p.ignored).count();
            println!("{} test snippets, {} ignored", planned.len(), ignored);
        }
        Format::Json => {
            let report = ListReport {
                crate_name: &target.crate_name,
                snippets: &planned,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{}: cannot serialize listing: {}", output::error_label(), e);
                    process::exit(1);
                }
            }
        }
    }
}
