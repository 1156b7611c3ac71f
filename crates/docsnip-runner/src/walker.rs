// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Walk a documentation tree and run every test snippet in it.

use docsnip_ast::{DocTree, ElementId};
use serde::Serialize;

use crate::config::Config;
use crate::extract::extract_snippets;
use crate::pipeline::{SnippetContext, SnippetRunner};
use crate::report::Reporter;
use crate::result::TestResult;
use crate::synth::{synthesize, NameRegistry};

/// Runs the snippets of whole documentation trees.
pub struct DocTestRunner {
    snippets: SnippetRunner,
}

impl DocTestRunner {
    pub fn new(snippets: SnippetRunner) -> Self {
        Self { snippets }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SnippetRunner::from_config(config))
    }

    pub fn snippets(&self) -> &SnippetRunner {
        &self.snippets
    }

    /// Visit every element under `roots`, fold the results and report the
    /// summary. Failures show up only in the counts and the diagnostics.
    pub fn run(
        &mut self,
        tree: &DocTree,
        roots: &[ElementId],
        reporter: &mut dyn Reporter,
    ) -> TestResult {
        tracing::info!(
            roots = roots.len(),
            workspace = %self.snippets.workspace().path().display(),
            "running doc snippets"
        );
        let result: TestResult = roots
            .iter()
            .map(|&root| self.visit(tree, root, reporter))
            .sum();
        reporter.summary(&result);
        tracing::info!(%result, "run finished");
        result
    }

    /// The element's own snippets, then each child's, reduced together.
    fn visit(&mut self, tree: &DocTree, id: ElementId, reporter: &mut dyn Reporter) -> TestResult {
        let element = tree.get(id);
        let mut own = TestResult::ZERO;
        for doc in &element.docs {
            let mut ctx = SnippetContext {
                tree,
                element: id,
                reporter: &mut *reporter,
            };
            own = own.reduce(self.snippets.visit_comment(&mut ctx, doc));
        }
        element
            .children
            .iter()
            .fold(own, |acc, &child| acc.reduce(self.visit(tree, child, reporter)))
    }
}

/// A test snippet as a run would see it, without compiling anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSnippet {
    /// Unit name the snippet would be compiled as; empty when ignored.
    pub unit: String,
    pub element: String,
    pub location: String,
    pub ignored: bool,
}

/// Every test snippet under `roots` in run order, named as a run would
/// name them.
pub fn plan(tree: &DocTree, roots: &[ElementId]) -> Vec<PlannedSnippet> {
    let mut registry = NameRegistry::new();
    let mut planned = Vec::new();
    let mut stack: Vec<ElementId> = roots.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let element = tree.get(id);
        for doc in &element.docs {
            for snippet in extract_snippets(doc).iter().filter(|s| s.is_test()) {
                let ignored = snippet.is_ignored();
                let unit = if ignored {
                    String::new()
                } else {
                    synthesize(tree, id, snippet, &mut registry).name
                };
                planned.push(PlannedSnippet {
                    unit,
                    element: tree.qualified_name(id),
                    location: doc.location(snippet.line - doc.line),
                    ignored,
                });
            }
        }
        stack.extend(element.children.iter().rev().copied());
    }
    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use crate::testing::{FakeCompiler, FakeExecutor};
    use crate::workspace::Workspace;
    use docsnip_ast::{DocComment, ElementKind};
    use std::path::Path;

    fn runner(ws: &Path) -> DocTestRunner {
        DocTestRunner::new(SnippetRunner::new(
            Workspace::at(ws),
            Vec::new(),
            Box::new(FakeCompiler),
            Box::new(FakeExecutor::default()),
        ))
    }

    /// One module holding one type with a passing and a failing snippet.
    fn scenario() -> (DocTree, ElementId) {
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "shapes");
        let module = tree.add_child(krate, ElementKind::Module, "geometry");
        let ty = tree.add_child(module, ElementKind::Struct, "Circle");
        tree.attach_doc(
            ty,
            DocComment::new(
                "A circle.\n\n```test\nlet ok = 1;\n```\n\n```test\npanic!(\"bad\");\n```",
                5,
            ),
        );
        (tree, krate)
    }

    #[test]
    fn pass_and_fail_in_one_type() {
        let ws = tempfile::tempdir().unwrap();
        let (tree, krate) = scenario();
        let mut reporter = CollectingReporter::new();

        let result = runner(ws.path()).run(&tree, &[krate], &mut reporter);
        assert_eq!(result, TestResult::new(1, 1, 0, 0));
        assert_eq!(reporter.diagnostics.len(), 1);
        assert_eq!(
            reporter.diagnostics[0].element.as_ref().unwrap().path,
            "shapes::geometry::Circle"
        );
        assert_eq!(
            reporter.summaries,
            vec!["Tests passed: 1, failed: 1, skipped: 0, errored: 0"]
        );
        let units: Vec<&str> = reporter.events.iter().map(|e| e.unit.as_str()).collect();
        assert_eq!(
            units,
            vec!["struct_shapes_geometry_Circle", "struct_shapes_geometry_Circle_1"]
        );
    }

    #[test]
    fn children_are_visited_after_their_parent() {
        let ws = tempfile::tempdir().unwrap();
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "demo");
        tree.attach_doc(krate, DocComment::new("```test\n```", 1));
        let f = tree.add_child(krate, ElementKind::Function, "f");
        tree.attach_doc(f, DocComment::new("```test ignore\n```", 3));
        let m = tree.add_child(krate, ElementKind::Module, "m");
        let g = tree.add_child(m, ElementKind::Function, "g");
        tree.attach_doc(g, DocComment::new("```test\n```", 7));

        let mut reporter = CollectingReporter::new();
        let result = runner(ws.path()).run(&tree, &[krate], &mut reporter);
        assert_eq!(result, TestResult::new(2, 0, 1, 0));
        let elements: Vec<&str> = reporter.events.iter().map(|e| e.element.as_str()).collect();
        assert_eq!(elements, vec!["demo", "demo::f", "demo::m::g"]);

        let planned = plan(&tree, &[krate]);
        let planned_elements: Vec<&str> = planned.iter().map(|p| p.element.as_str()).collect();
        assert_eq!(planned_elements, elements);
        assert_eq!(planned[0].unit, "crate_demo");
        assert!(planned[1].ignored);
        assert_eq!(planned[2].unit, "fn_demo_m_g");
    }

    #[test]
    fn docs_from_two_files_report_their_own_locations() {
        let ws = tempfile::tempdir().unwrap();
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "demo");
        let m = tree.add_child(krate, ElementKind::Module, "geometry");
        tree.attach_doc(m, DocComment::new("```test\n```", 4).with_file("src/lib.rs"));
        tree.attach_doc(
            m,
            DocComment::new("Inner.\n\n```test\npanic!(\"x\");\n```", 1).with_file("src/geometry.rs"),
        );

        let mut reporter = CollectingReporter::new();
        let result = runner(ws.path()).run(&tree, &[krate], &mut reporter);
        assert_eq!(result, TestResult::new(1, 1, 0, 0));
        let locations: Vec<&str> = reporter.events.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, vec!["src/lib.rs:4", "src/geometry.rs:3"]);

        let planned = plan(&tree, &[krate]);
        assert_eq!(planned[1].location, "src/geometry.rs:3");
        assert_eq!(planned[1].unit, "mod_demo_geometry_1");
    }

    #[test]
    fn empty_tree_reports_zero() {
        let ws = tempfile::tempdir().unwrap();
        let mut reporter = CollectingReporter::new();
        let result = runner(ws.path()).run(&DocTree::new(), &[], &mut reporter);
        assert_eq!(result, TestResult::ZERO);
        assert_eq!(
            reporter.summaries,
            vec!["Tests passed: 0, failed: 0, skipped: 0, errored: 0"]
        );
    }

    #[test]
    fn failed_workspace_falls_back_and_run_completes() {
        let parent = tempfile::tempdir().unwrap();
        // Artifacts land in the current directory, so give them a unique name
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "docsnip_fallback_check");
        tree.attach_doc(krate, DocComment::new("```test\nlet x = 1;\n```", 1));

        let workspace = Workspace::acquire_in(&parent.path().join("missing/dir"));
        assert!(!workspace.is_owned());
        let mut runner = DocTestRunner::new(SnippetRunner::new(
            workspace,
            Vec::new(),
            Box::new(FakeCompiler),
            Box::new(FakeExecutor::default()),
        ));
        let mut reporter = CollectingReporter::new();
        let result = runner.run(&tree, &[krate], &mut reporter);
        let _ = std::fs::remove_file(crate::loader::artifact_file_name("crate_docsnip_fallback_check"));

        assert_eq!(result, TestResult::PASS);
        assert_eq!(runner.snippets().workspace().path(), Path::new("."));
    }
}
