// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Loading a crate's module files from disk into one documentation tree.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use docsnip_ast::{DocTree, ElementId, ElementKind, LineMap};
use docsnip_lexer::Lexer;
use serde::Deserialize;

use crate::parser::Parser;

/// A crate's documentation tree plus what was learned while loading it.
#[derive(Debug)]
pub struct SourceCrate {
    pub tree: DocTree,
    pub root: ElementId,
    /// Every file that was read, root file first.
    pub files: Vec<PathBuf>,
    pub warnings: Vec<SourceWarning>,
}

/// A problem that leaves the tree usable but incomplete.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceWarning {
    /// `mod name;` with no `name.rs` or `name/mod.rs` next to it.
    MissingModule {
        module: String,
        declared_in: PathBuf,
        line: u32,
        searched: Vec<PathBuf>,
    },
    /// A lex or parse error. Items after the error may be missing.
    Syntax {
        file: PathBuf,
        line: u32,
        message: String,
        hint: Option<String>,
    },
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceWarning::MissingModule {
                module,
                declared_in,
                line,
                ..
            } => write!(
                f,
                "{}:{}: file for module `{}` not found",
                declared_in.display(),
                line,
                module
            ),
            SourceWarning::Syntax {
                file,
                line,
                message,
                ..
            } => write!(f, "{}:{}: {}", file.display(), line, message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse a whole crate starting at its root file (`lib.rs` or `main.rs`).
///
/// Out-of-line modules are looked up the way rustc does without `#[path]`:
/// `name.rs` or `name/mod.rs` in the directory owned by the declaring file.
pub fn load_crate(root_file: &Path, crate_name: &str) -> Result<SourceCrate, SourceError> {
    let mut tree = DocTree::new();
    let root = tree.add_root(ElementKind::Crate, crate_name);
    let mut loader = CrateLoader {
        tree,
        files: Vec::new(),
        warnings: Vec::new(),
        visited: HashSet::new(),
    };

    let source = read_file(root_file)?;
    let dir = root_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let mut queue = vec![(root_file.to_path_buf(), source, root, dir)];
    while let Some((file, source, parent, dir)) = queue.pop() {
        for (child_file, child_id, child_dir) in loader.parse_file(&file, &source, parent, &dir) {
            match read_file(&child_file) {
                Ok(text) => queue.push((child_file, text, child_id, child_dir)),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable module file");
                    loader.warnings.push(SourceWarning::Syntax {
                        file: child_file,
                        line: 1,
                        message: e.to_string(),
                        hint: None,
                    });
                }
            }
        }
    }

    Ok(SourceCrate {
        tree: loader.tree,
        root,
        files: loader.files,
        warnings: loader.warnings,
    })
}

/// Parse source text held in memory as the root file of a crate.
/// Out-of-line modules become empty modules.
pub fn parse_str(source: &str, crate_name: &str) -> SourceCrate {
    let mut tree = DocTree::new();
    let root = tree.add_root(ElementKind::Crate, crate_name);
    let lexed = Lexer::new(source).tokenize();
    let result = Parser::new(lexed.tokens, source).parse_into(&mut tree, root);

    let lines = LineMap::new(source);
    let file = PathBuf::from("<input>");
    let warnings = lexed
        .errors
        .iter()
        .map(|e| syntax_warning(&file, &lines, e.span.start, &e.message, e.hint.as_deref()))
        .chain(
            result.errors.iter().map(|e| {
                syntax_warning(&file, &lines, e.span.start, &e.message, e.hint.as_deref())
            }),
        )
        .collect();

    SourceCrate {
        tree,
        root,
        files: Vec::new(),
        warnings,
    }
}

fn syntax_warning(
    file: &Path,
    lines: &LineMap,
    offset: usize,
    message: &str,
    hint: Option<&str>,
) -> SourceWarning {
    SourceWarning::Syntax {
        file: file.to_path_buf(),
        line: lines.line_of(offset),
        message: message.to_string(),
        hint: hint.map(String::from),
    }
}

fn read_file(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

struct CrateLoader {
    tree: DocTree,
    files: Vec<PathBuf>,
    warnings: Vec<SourceWarning>,
    visited: HashSet<PathBuf>,
}

impl CrateLoader {
    /// Parse one file under `parent` and return the module files it declares
    /// as `(file, element, directory owned by that file)`.
    fn parse_file(
        &mut self,
        file: &Path,
        source: &str,
        parent: ElementId,
        dir: &Path,
    ) -> Vec<(PathBuf, ElementId, PathBuf)> {
        if !self.visited.insert(file.to_path_buf()) {
            tracing::debug!(file = %file.display(), "module file already parsed");
            return Vec::new();
        }
        tracing::debug!(file = %file.display(), "parsing");
        self.files.push(file.to_path_buf());

        let lines = LineMap::new(source);
        let lexed = Lexer::new(source).tokenize();
        for e in &lexed.errors {
            self.warnings.push(syntax_warning(
                file,
                &lines,
                e.span.start,
                &e.message,
                e.hint.as_deref(),
            ));
        }

        let result = Parser::new(lexed.tokens, source)
            .with_file(file)
            .parse_into(&mut self.tree, parent);
        for e in &result.errors {
            self.warnings.push(syntax_warning(
                file,
                &lines,
                e.span.start,
                &e.message,
                e.hint.as_deref(),
            ));
        }

        let mut found = Vec::new();
        for module in result.modules {
            let mut base = dir.to_path_buf();
            for segment in &module.inline_path {
                base.push(segment);
            }
            let flat = base.join(format!("{}.rs", module.name));
            let nested = base.join(&module.name).join("mod.rs");

            if flat.is_file() {
                let child_dir = base.join(&module.name);
                found.push((flat, module.id, child_dir));
            } else if nested.is_file() {
                let child_dir = base.join(&module.name);
                found.push((nested, module.id, child_dir));
            } else {
                let line = lines.line_of(module.span.start);
                tracing::warn!(
                    module = %module.name,
                    file = %file.display(),
                    line,
                    "module file not found"
                );
                self.warnings.push(SourceWarning::MissingModule {
                    module: module.name,
                    declared_in: file.to_path_buf(),
                    line,
                    searched: vec![flat, nested],
                });
            }
        }
        found
    }
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<Package>,
    lib: Option<LibTarget>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
}

#[derive(Deserialize)]
struct LibTarget {
    name: Option<String>,
}

/// Crate name declared by `dir/Cargo.toml`: `[lib] name` if set, otherwise
/// the package name with `-` turned into `_`. `None` when there is no
/// manifest or it declares no package.
pub fn crate_name_from_manifest(dir: &Path) -> Result<Option<String>, SourceError> {
    let path = dir.join("Cargo.toml");
    if !path.is_file() {
        return Ok(None);
    }
    let text = read_file(&path)?;
    let manifest: Manifest =
        toml::from_str(&text).map_err(|source| SourceError::Manifest { path, source })?;

    let name = manifest
        .lib
        .and_then(|lib| lib.name)
        .or(manifest.package.map(|p| p.name));
    Ok(name.map(|n| n.replace('-', "_")))
}

/// Nearest directory at or above `start` holding a `Cargo.toml`.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("Cargo.toml").is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, text: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn find(krate: &SourceCrate, qualified: &str) -> ElementId {
        krate
            .tree
            .iter()
            .find(|e| krate.tree.qualified_name(e.id) == qualified)
            .unwrap_or_else(|| panic!("no element {}", qualified))
            .id
    }

    #[test]
    fn follows_flat_and_nested_module_files() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/lib.rs", "//! Crate docs.\npub mod geometry;\nmod util { mod deep; }\n");
        write(tmp.path(), "src/geometry.rs", "/// A circle.\npub struct Circle;\npub mod solid;\n");
        write(tmp.path(), "src/geometry/solid.rs", "pub fn volume() {}\n");
        write(tmp.path(), "src/util/deep/mod.rs", "//! Deep docs.\n");

        let krate = load_crate(&tmp.path().join("src/lib.rs"), "shapes").unwrap();
        assert!(krate.warnings.is_empty(), "{:?}", krate.warnings);
        assert_eq!(krate.files.len(), 4);

        let circle = find(&krate, "shapes::geometry::Circle");
        let doc = krate.tree.get(circle).doc().unwrap();
        assert_eq!(doc.text, "A circle.");
        assert_eq!(doc.line, 1);
        assert!(doc.file.as_ref().unwrap().ends_with("geometry.rs"));

        find(&krate, "shapes::geometry::solid::volume");
        let deep = find(&krate, "shapes::util::deep");
        assert_eq!(krate.tree.get(deep).doc().unwrap().text, "Deep docs.");
        assert_eq!(
            krate.tree.get(krate.root).doc().unwrap().text,
            "Crate docs."
        );
    }

    #[test]
    fn outer_and_inner_module_docs_keep_their_files() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/lib.rs", "/// Outer.\npub mod geometry;\n");
        write(tmp.path(), "src/geometry.rs", "\n//! Inner.\n");

        let krate = load_crate(&tmp.path().join("src/lib.rs"), "shapes").unwrap();
        let module = find(&krate, "shapes::geometry");
        let docs = &krate.tree.get(module).docs;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "Outer.");
        assert!(docs[0].file.as_ref().unwrap().ends_with("lib.rs"));
        assert_eq!(docs[1].text, "Inner.");
        assert_eq!(docs[1].line, 2);
        assert!(docs[1].file.as_ref().unwrap().ends_with("geometry.rs"));
    }

    #[test]
    fn non_ascii_item_names_are_kept() {
        let krate = parse_str("/// Umlaut.\npub fn ü() {}\npub struct Größe;\n", "demo");
        assert!(krate.warnings.is_empty(), "{:?}", krate.warnings);
        let f = find(&krate, "demo::ü");
        assert_eq!(krate.tree.get(f).doc().unwrap().text, "Umlaut.");
        find(&krate, "demo::Größe");
    }

    #[test]
    fn missing_module_is_a_warning() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "lib.rs", "mod gone;\npub fn kept() {}\n");

        let krate = load_crate(&tmp.path().join("lib.rs"), "demo").unwrap();
        find(&krate, "demo::gone");
        find(&krate, "demo::kept");
        match &krate.warnings[..] {
            [SourceWarning::MissingModule {
                module, line, searched, ..
            }] => {
                assert_eq!(module, "gone");
                assert_eq!(*line, 1);
                assert_eq!(searched.len(), 2);
            }
            other => panic!("unexpected warnings: {:?}", other),
        }
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_crate(&tmp.path().join("lib.rs"), "demo").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn manifest_names() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(crate_name_from_manifest(tmp.path()).unwrap(), None);

        write(tmp.path(), "Cargo.toml", "[package]\nname = \"my-shapes\"\nversion = \"0.1.0\"\n");
        assert_eq!(
            crate_name_from_manifest(tmp.path()).unwrap(),
            Some("my_shapes".to_string())
        );

        write(
            tmp.path(),
            "Cargo.toml",
            "[package]\nname = \"my-shapes\"\n\n[lib]\nname = \"shapes\"\n",
        );
        assert_eq!(
            crate_name_from_manifest(tmp.path()).unwrap(),
            Some("shapes".to_string())
        );

        write(tmp.path(), "nested/deeper/file.txt", "");
        assert_eq!(
            find_manifest(&tmp.path().join("nested/deeper")),
            Some(tmp.path().to_path_buf())
        );
    }

    #[test]
    fn broken_manifest_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Cargo.toml", "[package\n");
        assert!(matches!(
            crate_name_from_manifest(tmp.path()),
            Err(SourceError::Manifest { .. })
        ));
    }
}
