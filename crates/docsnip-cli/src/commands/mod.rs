// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI command implementations.

pub mod list;

use std::path::{Path, PathBuf};

use docsnip_diagnostics::formatter::DiagnosticFormatter;
use docsnip_diagnostics::ToDiagnostic;
use docsnip_parser::{crate_name_from_manifest, find_manifest, load_crate, SourceCrate};

use crate::Format;

/// Flags shared by `test` and `list`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub path: Option<PathBuf>,
    pub crate_name: Option<String>,
    pub classpath: Option<String>,
    pub externs: Vec<String>,
    pub no_extern: bool,
    pub workspace: Option<PathBuf>,
    pub timeout: Option<String>,
    pub json: bool,
    pub strict: bool,
}

impl Options {
    pub fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else {
            Format::Human
        }
    }
}

/// Parse the arguments after the command name.
pub fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} requires a value", flag))
        };
        match arg.as_str() {
            "--crate" => opts.crate_name = Some(value("--crate")?),
            "--classpath" => opts.classpath = Some(value("--classpath")?),
            "--extern" => opts.externs.push(value("--extern")?),
            "--no-extern" => opts.no_extern = true,
            "--workspace" => opts.workspace = Some(PathBuf::from(value("--workspace")?)),
            "--timeout" => opts.timeout = Some(value("--timeout")?),
            "--json" => opts.json = true,
            "--format" => match value("--format")?.as_str() {
                "human" => opts.json = false,
                "json" => opts.json = true,
                other => return Err(format!("unknown format `{}`, expected human or json", other)),
            },
            "--strict" => opts.strict = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option `{}`", flag)),
            path => {
                if opts.path.is_some() {
                    return Err(format!("unexpected argument `{}`", path));
                }
                opts.path = Some(PathBuf::from(path));
            }
        }
    }
    Ok(opts)
}

/// The crate a command works on.
pub struct Target {
    pub crate_name: String,
    pub source: SourceCrate,
}

/// Root source file for `path`: the file itself, or `src/lib.rs`, then
/// `src/main.rs`, then `lib.rs` inside a directory.
pub fn root_file(path: &Path) -> Result<PathBuf, String> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        return Err(format!("{} does not exist", path.display()));
    }
    ["src/lib.rs", "src/main.rs", "lib.rs"]
        .iter()
        .map(|rel| path.join(rel))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| format!("no src/lib.rs or src/main.rs in {}", path.display()))
}

/// Crate name from `--crate`, else the nearest manifest, else the file stem.
fn crate_name(opts: &Options, root: &Path) -> Result<String, String> {
    if let Some(name) = &opts.crate_name {
        return Ok(name.clone());
    }
    let dir = root.parent().unwrap_or_else(|| Path::new("."));
    if let Some(manifest_dir) = find_manifest(dir) {
        if let Some(name) = crate_name_from_manifest(&manifest_dir).map_err(|e| e.to_string())? {
            return Ok(name);
        }
    }
    root.file_stem()
        .map(|stem| stem.to_string_lossy().replace('-', "_"))
        .ok_or_else(|| format!("cannot tell the crate name of {}; pass --crate", root.display()))
}

/// Locate and load the crate named by the options.
pub fn load_target(opts: &Options) -> Result<Target, String> {
    let path = opts.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let root = root_file(&path)?;
    let crate_name = crate_name(opts, &root)?;
    tracing::info!(root = %root.display(), krate = %crate_name, "loading crate");

    let source = load_crate(&root, &crate_name).map_err(|e| e.to_string())?;
    for warning in &source.warnings {
        tracing::warn!(%warning, "incomplete documentation tree");
    }
    Ok(Target { crate_name, source })
}

/// Print load warnings for human output.
pub fn show_warnings(source: &SourceCrate) {
    let formatter = DiagnosticFormatter::new();
    for warning in &source.warnings {
        eprintln!("{}", formatter.format(&warning.to_diagnostic()));
    }
}
