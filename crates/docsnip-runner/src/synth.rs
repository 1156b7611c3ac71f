// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Build a standalone program around one snippet.

use std::collections::{HashMap, HashSet};

use docsnip_ast::{DocTree, ElementId};

use crate::extract::{Snippet, IMPORT};

/// Tracks how often each generated base name has been handed out.
///
/// Owned by one run and passed explicitly, so two runs never share suffixes.
#[derive(Debug, Default)]
pub struct NameRegistry {
    counts: HashMap<String, u32>,
    issued: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// First registration of a base name returns it unchanged; later ones
    /// return `base_{N}` for the lowest N not already handed out, so a
    /// suffixed name never shadows another element's base name.
    pub fn register(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;
        let mut suffix = *count - 1;
        loop {
            let candidate = match suffix {
                0 => base.to_string(),
                n => format!("{}_{}", base, n),
            };
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// How many times `base` has been registered.
    pub fn count(&self, base: &str) -> u32 {
        self.counts.get(base).copied().unwrap_or(0)
    }
}

/// A synthesized program held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
    /// 1-based line of `source` holding the first line of the snippet body.
    pub body_start: u32,
}

/// Base unit name for an element: its kind tag followed by every path
/// segment from the crate down, e.g. `fn_shapes_geometry_area`.
pub fn base_name(tree: &DocTree, element: ElementId) -> String {
    let mut name = tree.get(element).kind.tag().to_string();
    for segment in tree.path(element) {
        name.push('_');
        name.push_str(segment);
    }
    sanitize(&name)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `use` paths for the snippet: the enclosing namespace glob first, then
/// every `import` value split on commas.
pub fn imports(tree: &DocTree, element: ElementId, snippet: &Snippet) -> Vec<String> {
    let mut imports = Vec::new();
    if let Some(namespace) = tree.enclosing_namespace(element) {
        let mut path = tree.path(namespace).join("::");
        path.push_str("::*");
        imports.push(path);
    }
    imports.extend(
        snippet
            .values(IMPORT)
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from),
    );
    imports
}

/// Synthesize the unit for `snippet` documented on `element`.
pub fn synthesize(
    tree: &DocTree,
    element: ElementId,
    snippet: &Snippet,
    registry: &mut NameRegistry,
) -> SourceUnit {
    let name = registry.register(&base_name(tree, element));
    let imports = imports(tree, element, snippet);
    let source = render(&name, &imports, &snippet.body);
    SourceUnit {
        name,
        source,
        // crate attributes, imports, blank, mod, use, allow, fn, block
        body_start: imports.len() as u32 + 8,
    }
}

fn render(name: &str, imports: &[String], body: &str) -> String {
    let mut out = String::new();
    out.push_str("#![allow(unused_imports, non_snake_case, dead_code)]\n");
    for import in imports {
        out.push_str(&format!("use {};\n", import));
    }
    out.push('\n');
    out.push_str(&format!("pub mod {} {{\n", name));
    out.push_str("    use super::*;\n");
    out.push_str("    #[allow(unreachable_code, unused_variables, unused_mut)]\n");
    out.push_str(
        "    pub fn test() -> ::std::result::Result<(), ::std::boxed::Box<dyn ::std::error::Error>> {\n",
    );
    out.push_str("        {\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("        };\n");
    out.push_str("        Ok(())\n");
    out.push_str("    }\n");
    out.push_str("}\n\n");
    out.push_str("fn main() {\n");
    out.push_str(&format!("    if let Err(error) = {}::test() {{\n", name));
    out.push_str("        eprintln!(\"Error: {:?}\", error);\n");
    out.push_str("        ::std::process::exit(1);\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_from_text;
    use docsnip_ast::ElementKind;

    struct Fixture {
        tree: DocTree,
        krate: ElementId,
        module: ElementId,
        ty: ElementId,
        method: ElementId,
    }

    fn fixture() -> Fixture {
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "shapes");
        let module = tree.add_child(krate, ElementKind::Module, "geometry");
        let ty = tree.add_child(module, ElementKind::Struct, "Circle");
        let imp = tree.add_child(module, ElementKind::Impl, "Display for Circle");
        let method = tree.add_child(imp, ElementKind::Function, "fmt");
        Fixture {
            tree,
            krate,
            module,
            ty,
            method,
        }
    }

    fn snippet(info: &str, body: &str) -> Snippet {
        extract_from_text(&format!("```{}\n{}\n```", info, body), 1).remove(0)
    }

    #[test]
    fn names_follow_kind_and_path() {
        let f = fixture();
        assert_eq!(base_name(&f.tree, f.krate), "crate_shapes");
        assert_eq!(base_name(&f.tree, f.module), "mod_shapes_geometry");
        assert_eq!(base_name(&f.tree, f.ty), "struct_shapes_geometry_Circle");
        assert_eq!(
            base_name(&f.tree, f.method),
            "fn_shapes_geometry_Display_for_Circle_fmt"
        );
    }

    #[test]
    fn names_are_sanitized() {
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "demo");
        let imp = tree.add_child(krate, ElementKind::Impl, "From<&str> for Name");
        assert_eq!(base_name(&tree, imp), "impl_demo_From__str__for_Name");
    }

    #[test]
    fn registry_suffixes_repeats() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("fn_a"), "fn_a");
        assert_eq!(registry.register("fn_a"), "fn_a_1");
        assert_eq!(registry.register("fn_b"), "fn_b");
        assert_eq!(registry.register("fn_a"), "fn_a_2");
        assert_eq!(registry.count("fn_a"), 3);
        assert_eq!(registry.count("fn_c"), 0);
    }

    #[test]
    fn suffixed_name_never_matches_a_sibling_base() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("fn_c_f"), "fn_c_f");
        assert_eq!(registry.register("fn_c_f"), "fn_c_f_1");
        assert_eq!(registry.register("fn_c_f_1"), "fn_c_f_1_1");
        assert_eq!(registry.register("fn_c_f_1"), "fn_c_f_1_2");

        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("fn_c_f_1"), "fn_c_f_1");
        assert_eq!(registry.register("fn_c_f"), "fn_c_f");
        assert_eq!(registry.register("fn_c_f"), "fn_c_f_2");
    }

    #[test]
    fn snippets_on_f_and_f_1_get_distinct_units() {
        let mut tree = DocTree::new();
        let krate = tree.add_root(ElementKind::Crate, "c");
        let f = tree.add_child(krate, ElementKind::Function, "f");
        let f_1 = tree.add_child(krate, ElementKind::Function, "f_1");
        let s = snippet("test", "let x = 1;");
        let mut registry = NameRegistry::new();
        let names: Vec<String> = [f, f, f_1]
            .iter()
            .map(|&id| synthesize(&tree, id, &s, &mut registry).name)
            .collect();
        assert_eq!(names, vec!["fn_c_f", "fn_c_f_1", "fn_c_f_1_1"]);
    }

    #[test]
    fn distinct_owners_get_distinct_names() {
        let f = fixture();
        let mut registry = NameRegistry::new();
        let s = snippet("test", "let x = 1;");
        let names: Vec<String> = [f.krate, f.module, f.ty, f.method, f.ty]
            .iter()
            .map(|&id| synthesize(&f.tree, id, &s, &mut registry).name)
            .collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names[4], "struct_shapes_geometry_Circle_1");
    }

    #[test]
    fn deterministic_across_registries() {
        let f = fixture();
        let s = snippet("test", "let x = 1;");
        let a = synthesize(&f.tree, f.ty, &s, &mut NameRegistry::new());
        let b = synthesize(&f.tree, f.ty, &s, &mut NameRegistry::new());
        assert_eq!(a, b);
    }

    #[test]
    fn import_attribute_and_namespace_glob() {
        let f = fixture();
        let s = snippet("test import=pkg::A,pkg::B", "let x = 1;");
        assert_eq!(
            imports(&f.tree, f.ty, &s),
            vec!["shapes::geometry::*", "pkg::A", "pkg::B"]
        );

        let unit = synthesize(&f.tree, f.ty, &s, &mut NameRegistry::new());
        assert!(unit.source.contains("use shapes::geometry::*;\n"));
        assert!(unit.source.contains("use pkg::A;\n"));
        assert!(unit.source.contains("use pkg::B;\n"));
    }

    #[test]
    fn blank_import_parts_are_dropped() {
        let f = fixture();
        let s = snippet(r#"test import=" a::B , ,c::D,""#, "");
        assert_eq!(imports(&f.tree, f.krate, &s), vec!["shapes::*", "a::B", "c::D"]);
    }

    #[test]
    fn module_is_its_own_namespace() {
        let f = fixture();
        let s = snippet("test", "");
        assert_eq!(imports(&f.tree, f.module, &s), vec!["shapes::geometry::*"]);
        assert_eq!(imports(&f.tree, f.method, &s), vec!["shapes::geometry::*"]);
    }

    #[test]
    fn rendered_unit_shape() {
        let f = fixture();
        let s = snippet("test", "let r = 2.0;\nassert!(r > 1.0);");
        let unit = synthesize(&f.tree, f.ty, &s, &mut NameRegistry::new());
        assert_eq!(
            unit.source,
            "\
#![allow(unused_imports, non_snake_case, dead_code)]
use shapes::geometry::*;

pub mod struct_shapes_geometry_Circle {
    use super::*;
    #[allow(unreachable_code, unused_variables, unused_mut)]
    pub fn test() -> ::std::result::Result<(), ::std::boxed::Box<dyn ::std::error::Error>> {
        {
let r = 2.0;
assert!(r > 1.0);
        };
        Ok(())
    }
}

fn main() {
    if let Err(error) = struct_shapes_geometry_Circle::test() {
        eprintln!(\"Error: {:?}\", error);
        ::std::process::exit(1);
    }
}
"
        );
        assert_eq!(unit.body_start, 9);
        assert_eq!(
            unit.source.lines().nth(unit.body_start as usize - 1),
            Some("let r = 2.0;")
        );
    }
}
