// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! docsnip snippet runner.
//!
//! Finds fenced code blocks in doc comments whose info string carries the
//! `test` attribute, turns each into a standalone program, compiles it with
//! rustc, and runs it:
//!
//! ````text
//! /// ```test import=std::collections::HashMap
//! /// let mut m = HashMap::new();
//! /// m.insert(1, "one");
//! /// assert_eq!(m[&1], "one");
//! /// ```
//! ````
//!
//! Attributes are space-separated `name` or `name=value` tokens; values may
//! be quoted. `import` adds `use` paths (comma-separated, may repeat) and
//! `ignore` counts the snippet as skipped without compiling it. Snippets
//! without `test` are documentation only.
//!
//! A snippet passes when its program exits with status 0. Results are
//! reduced into a [`TestResult`] of pass, fail, skip and error counts.

pub mod compiler;
pub mod config;
pub mod exec;
pub mod extract;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod result;
pub mod synth;
pub mod walker;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use compiler::{CompileError, Compiler, RustcCompiler};
pub use config::{Config, ConfigError};
pub use exec::{Executor, Failure, InfraError, Outcome, ProcessExecutor};
pub use extract::{extract_snippets, Attribute, Snippet};
pub use loader::{Artifact, LoadError, Loader, SearchPathLoader};
pub use pipeline::{SnippetContext, SnippetRunner};
pub use report::{summary_line, CollectingReporter, Reporter, SnippetEvent, SnippetStatus};
pub use result::TestResult;
pub use synth::{NameRegistry, SourceUnit};
pub use walker::{plan, DocTestRunner, PlannedSnippet};
pub use workspace::Workspace;
