// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Take one snippet from synthesized source to a classified outcome.

use std::path::PathBuf;

use docsnip_ast::{DocComment, DocTree, ElementId};
use docsnip_diagnostics::{codes, Diagnostic, ToDiagnostic};

use crate::compiler::{CompileError, Compiler, RustcCompiler};
use crate::config::Config;
use crate::exec::{Executor, Failure, InfraError, Outcome, ProcessExecutor};
use crate::extract::{extract_snippets, Snippet};
use crate::loader::{LoadError, Loader, SearchPathLoader};
use crate::report::{Reporter, SnippetEvent, SnippetStatus};
use crate::result::TestResult;
use crate::synth::{synthesize, NameRegistry, SourceUnit};
use crate::workspace::Workspace;

/// Compiler messages kept as notes on a compile failure.
const MAX_COMPILER_NOTES: usize = 5;

/// The element whose documentation is being run, plus where to report.
pub struct SnippetContext<'a> {
    pub tree: &'a DocTree,
    pub element: ElementId,
    pub reporter: &'a mut dyn Reporter,
}

/// Compiles, loads and executes snippets for one run.
pub struct SnippetRunner {
    compiler: Box<dyn Compiler>,
    loader: Box<dyn Loader>,
    executor: Box<dyn Executor>,
    classpath: Vec<PathBuf>,
    registry: NameRegistry,
    workspace: Workspace,
}

impl SnippetRunner {
    /// A runner whose loader searches `classpath` and then the workspace.
    pub fn new(
        workspace: Workspace,
        classpath: Vec<PathBuf>,
        compiler: Box<dyn Compiler>,
        executor: Box<dyn Executor>,
    ) -> Self {
        let loader = SearchPathLoader::new(&classpath, workspace.path());
        Self {
            compiler,
            loader: Box::new(loader),
            executor,
            classpath,
            registry: NameRegistry::new(),
            workspace,
        }
    }

    /// rustc, the search-path loader and the process executor, set up from
    /// `config`.
    pub fn from_config(config: &Config) -> Self {
        let workspace = match &config.workspace {
            Some(dir) => Workspace::at(dir),
            None => Workspace::acquire(),
        };
        let compiler = config.externs.iter().fold(
            RustcCompiler::new(&config.rustc).with_edition(&config.edition),
            |compiler, name| compiler.with_extern(name),
        );
        Self::new(
            workspace,
            config.classpath.clone(),
            Box::new(compiler),
            Box::new(ProcessExecutor::new(config.timeout)),
        )
    }

    pub fn with_loader(mut self, loader: Box<dyn Loader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Run every test snippet in one doc comment.
    pub fn visit_comment(&mut self, ctx: &mut SnippetContext<'_>, comment: &DocComment) -> TestResult {
        extract_snippets(comment)
            .iter()
            .filter(|snippet| snippet.is_test())
            .map(|snippet| {
                let status = if snippet.is_ignored() {
                    tracing::debug!(line = snippet.line, "ignored snippet");
                    let skipped = event(ctx, comment, snippet, "", SnippetStatus::Skipped);
                    ctx.reporter.snippet_finished(&skipped);
                    SnippetStatus::Skipped
                } else {
                    self.run_snippet(ctx, comment, snippet)
                };
                status.as_result()
            })
            .sum()
    }

    /// Synthesize, compile, load and execute one test snippet.
    pub fn run_snippet(
        &mut self,
        ctx: &mut SnippetContext<'_>,
        comment: &DocComment,
        snippet: &Snippet,
    ) -> SnippetStatus {
        let unit = synthesize(ctx.tree, ctx.element, snippet, &mut self.registry);
        tracing::debug!(unit = %unit.name, "synthesized");

        let status = match self.compile_and_execute(&unit) {
            Outcome::Passed => SnippetStatus::Passed,
            Outcome::Failed(failure) => {
                let diag = locate(failure_diagnostic(&failure), ctx, comment, snippet);
                ctx.reporter.diagnostic(diag);
                SnippetStatus::Failed
            }
            Outcome::Errored(error) => {
                tracing::error!(
                    unit = %unit.name,
                    element = %ctx.tree.qualified_name(ctx.element),
                    error = %error,
                    "snippet could not be run"
                );
                let diag = infra_diagnostic(&error, &unit, snippet, comment);
                let diag = locate(diag, ctx, comment, snippet);
                ctx.reporter.diagnostic(diag);
                SnippetStatus::Errored
            }
        };

        let finished = event(ctx, comment, snippet, &unit.name, status);
        ctx.reporter.snippet_finished(&finished);
        status
    }

    fn compile_and_execute(&self, unit: &SourceUnit) -> Outcome {
        let units = std::slice::from_ref(unit);
        if let Err(e) = self
            .compiler
            .compile(units, &self.classpath, self.workspace.path())
        {
            return Outcome::Errored(e.into());
        }
        match self.loader.resolve(&unit.name) {
            Ok(artifact) => self.executor.execute(&artifact),
            Err(e) => Outcome::Errored(e.into()),
        }
    }
}

fn event(
    ctx: &SnippetContext<'_>,
    comment: &DocComment,
    snippet: &Snippet,
    unit: &str,
    status: SnippetStatus,
) -> SnippetEvent {
    SnippetEvent {
        unit: unit.to_string(),
        element: ctx.tree.qualified_name(ctx.element),
        location: comment.location(snippet.line - comment.line),
        status,
    }
}

/// Attach the owning element, the fence location and the snippet body.
fn locate(
    diag: Diagnostic,
    ctx: &SnippetContext<'_>,
    comment: &DocComment,
    snippet: &Snippet,
) -> Diagnostic {
    let element = ctx.tree.get(ctx.element);
    let diag = diag
        .with_element(element.kind, ctx.tree.qualified_name(ctx.element))
        .with_location(comment.file.clone(), snippet.line);
    if snippet.body.is_empty() {
        diag
    } else {
        diag.with_excerpt(snippet.body_line(), &snippet.body)
    }
}

fn failure_diagnostic(failure: &Failure) -> Diagnostic {
    let (code, message) = if failure.timed_out {
        (codes::SNIPPET_TIMED_OUT, "snippet test timed out")
    } else {
        (codes::SNIPPET_FAILED, "snippet test failed")
    };
    let output = if failure.stderr.trim().is_empty() {
        &failure.stdout
    } else {
        &failure.stderr
    };
    Diagnostic::error(message)
        .with_code(code)
        .with_note(failure.to_string())
        .with_output(output.clone())
}

fn infra_diagnostic(
    error: &InfraError,
    unit: &SourceUnit,
    snippet: &Snippet,
    comment: &DocComment,
) -> Diagnostic {
    match error {
        InfraError::Compile(CompileError::Failed { output, .. }) => {
            let mut diag = Diagnostic::error("snippet failed to compile")
                .with_code(codes::COMPILE_FAILED)
                .with_note(format!("unit `{}`", unit.name));
            for message in output.errors().take(MAX_COMPILER_NOTES) {
                let detail = message.to_diagnostic();
                let code = detail.code.map(|c| format!("[{}]", c.0)).unwrap_or_default();
                let note = match message
                    .primary_line()
                    .and_then(|line| snippet_line(unit, snippet, line))
                {
                    Some(line) => format!(
                        "error{}: {} (at {})",
                        code,
                        detail.message,
                        comment.location(line - comment.line)
                    ),
                    None => format!("error{}: {}", code, detail.message),
                };
                diag = diag.with_note(note);
            }
            diag.with_output(output.rendered())
        }
        InfraError::Compile(e) => Diagnostic::error(e.to_string())
            .with_code(codes::COMPILE_FAILED)
            .with_help(format!(
                "set {} to the compiler to use",
                crate::config::RUSTC_VAR
            )),
        InfraError::Load(LoadError::NotFound { name, searched }) => {
            let mut diag = Diagnostic::error(format!("compiled snippet `{}` not found", name))
                .with_code(codes::ARTIFACT_NOT_FOUND);
            for dir in searched {
                diag = diag.with_note(format!("searched {}", dir.display()));
            }
            diag
        }
        InfraError::Launch { .. } => Diagnostic::error(error.to_string())
            .with_code(codes::LAUNCH_FAILED)
            .with_note(format!("unit `{}`", unit.name)),
    }
}

/// Map a line of the synthesized unit back to the doc comment's source.
fn snippet_line(unit: &SourceUnit, snippet: &Snippet, unit_line: u32) -> Option<u32> {
    let offset = unit_line.checked_sub(unit.body_start)?;
    let body_lines = snippet.body.lines().count() as u32;
    (offset < body_lines).then(|| snippet.body_line() + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_from_text;
    use crate::loader::Artifact;
    use crate::report::CollectingReporter;
    use crate::testing::{FakeCompiler, FakeExecutor};
    use docsnip_ast::ElementKind;
    use std::path::Path;

    struct NoArtifacts;

    impl Loader for NoArtifacts {
        fn resolve(&self, name: &str) -> Result<Artifact, LoadError> {
            Err(LoadError::NotFound {
                name: name.to_string(),
                searched: vec![PathBuf::from("/nowhere")],
            })
        }
    }

    fn runner(ws: &Path, executor: FakeExecutor) -> SnippetRunner {
        SnippetRunner::new(
            Workspace::at(ws),
            Vec::new(),
            Box::new(FakeCompiler),
            Box::new(executor),
        )
    }

    fn tree() -> (DocTree, ElementId) {
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "shapes");
        let ty = tree.add_child(krate, ElementKind::Struct, "Circle");
        (tree, ty)
    }

    fn comment(text: &str) -> DocComment {
        DocComment::new(text, 10).with_file("src/lib.rs")
    }

    #[test]
    fn passing_snippet_adds_one_pass() {
        let ws = tempfile::tempdir().unwrap();
        let executor = FakeExecutor::default();
        let mut runner = runner(ws.path(), executor.clone());
        let (tree, ty) = tree();
        let mut reporter = CollectingReporter::new();
        let mut ctx = SnippetContext {
            tree: &tree,
            element: ty,
            reporter: &mut reporter,
        };

        let result = runner.visit_comment(&mut ctx, &comment("```test\nlet x = 1;\n```"));
        assert_eq!(result, TestResult::PASS);
        assert!(reporter.diagnostics.is_empty());
        assert_eq!(*executor.ran.borrow(), vec!["struct_shapes_Circle"]);
        assert_eq!(reporter.events[0].status, SnippetStatus::Passed);
        assert_eq!(reporter.events[0].location, "src/lib.rs:10");
    }

    #[test]
    fn non_test_snippets_contribute_nothing() {
        let ws = tempfile::tempdir().unwrap();
        let executor = FakeExecutor::default();
        let mut runner = runner(ws.path(), executor.clone());
        let (tree, ty) = tree();
        let mut reporter = CollectingReporter::new();
        let mut ctx = SnippetContext {
            tree: &tree,
            element: ty,
            reporter: &mut reporter,
        };

        let text = "```\npanic!();\n```\n```rust\npanic!();\n```\n```text\nplain\n```";
        assert_eq!(runner.visit_comment(&mut ctx, &comment(text)), TestResult::ZERO);
        assert!(executor.ran.borrow().is_empty());
        assert!(reporter.events.is_empty());
    }

    #[test]
    fn failing_snippet_reports_owner() {
        let ws = tempfile::tempdir().unwrap();
        let mut runner = runner(ws.path(), FakeExecutor::default());
        let (tree, ty) = tree();
        let mut reporter = CollectingReporter::new();
        let mut ctx = SnippetContext {
            tree: &tree,
            element: ty,
            reporter: &mut reporter,
        };

        let text = "Intro.\n```test\npanic!(\"no\");\n```";
        assert_eq!(runner.visit_comment(&mut ctx, &comment(text)), TestResult::FAIL);

        let diag = &reporter.diagnostics[0];
        assert_eq!(diag.code.as_ref().unwrap().0, codes::SNIPPET_FAILED);
        let element = diag.element.as_ref().unwrap();
        assert_eq!(element.path, "shapes::Circle");
        assert_eq!(element.kind, ElementKind::Struct);
        assert_eq!(diag.location.as_ref().unwrap().display(), "src/lib.rs:11");
        assert_eq!(diag.excerpt.as_ref().unwrap().first_line, 12);
        assert_eq!(diag.notes, vec!["exit status: 101"]);
        assert_eq!(diag.output.as_deref(), Some("thread 'main' panicked"));
    }

    #[test]
    fn ignored_snippet_is_skipped_without_compiling() {
        let ws = tempfile::tempdir().unwrap();
        let executor = FakeExecutor::default();
        let mut runner = runner(ws.path(), executor.clone());
        let (tree, ty) = tree();
        let mut reporter = CollectingReporter::new();
        let mut ctx = SnippetContext {
            tree: &tree,
            element: ty,
            reporter: &mut reporter,
        };

        let text = "```test ignore\npanic!();\n```";
        assert_eq!(runner.visit_comment(&mut ctx, &comment(text)), TestResult::SKIP);
        assert!(executor.ran.borrow().is_empty());
        assert_eq!(runner.registry().count("struct_shapes_Circle"), 0);
        assert_eq!(reporter.events[0].status, SnippetStatus::Skipped);
    }

    #[test]
    fn compile_failure_is_an_error() {
        let ws = tempfile::tempdir().unwrap();
        let mut runner = runner(ws.path(), FakeExecutor::default());
        let (tree, ty) = tree();
        let mut reporter = CollectingReporter::new();
        let mut ctx = SnippetContext {
            tree: &tree,
            element: ty,
            reporter: &mut reporter,
        };

        let text = "```test\ncompile_error!(\"x\");\n```";
        assert_eq!(runner.visit_comment(&mut ctx, &comment(text)), TestResult::ERROR);
        assert_eq!(
            reporter.diagnostics[0].code.as_ref().unwrap().0,
            codes::COMPILE_FAILED
        );
        assert_eq!(reporter.events[0].status, SnippetStatus::Errored);
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let ws = tempfile::tempdir().unwrap();
        let mut runner = runner(ws.path(), FakeExecutor::default()).with_loader(Box::new(NoArtifacts));
        let (tree, ty) = tree();
        let mut reporter = CollectingReporter::new();
        let mut ctx = SnippetContext {
            tree: &tree,
            element: ty,
            reporter: &mut reporter,
        };

        let text = "```test\nlet x = 1;\n```";
        assert_eq!(runner.visit_comment(&mut ctx, &comment(text)), TestResult::ERROR);
        let diag = &reporter.diagnostics[0];
        assert_eq!(diag.code.as_ref().unwrap().0, codes::ARTIFACT_NOT_FOUND);
        assert_eq!(diag.notes, vec!["searched /nowhere"]);
    }

    #[test]
    fn unit_lines_map_back_to_the_comment() {
        let snippet = extract_from_text("```test\nlet a = 1;\nlet b = 2;\n```", 20).remove(0);
        let unit = SourceUnit {
            name: "fn_x".into(),
            source: String::new(),
            body_start: 9,
        };
        assert_eq!(snippet_line(&unit, &snippet, 8), None);
        assert_eq!(snippet_line(&unit, &snippet, 9), Some(21));
        assert_eq!(snippet_line(&unit, &snippet, 10), Some(22));
        assert_eq!(snippet_line(&unit, &snippet, 11), None);
    }
}
