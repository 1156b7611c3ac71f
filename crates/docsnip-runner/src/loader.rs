// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolve compiled snippets by name from an ordered list of directories.

use std::env::consts::EXE_SUFFIX;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// A compiled unit found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no artifact named `{name}` in {} searched directories", searched.len())]
    NotFound { name: String, searched: Vec<PathBuf> },
}

/// Finds the artifact for a unit name.
pub trait Loader {
    fn resolve(&self, name: &str) -> Result<Artifact, LoadError>;
}

/// File name of the executable compiled for `name` on this platform.
pub fn artifact_file_name(name: &str) -> String {
    format!("{}{}", name, EXE_SUFFIX)
}

/// Searches the configured directories in order, then the workspace.
/// Earlier directories shadow later ones.
#[derive(Debug, Clone)]
pub struct SearchPathLoader {
    dirs: Vec<PathBuf>,
}

impl SearchPathLoader {
    pub fn new(classpath: &[PathBuf], workspace: &Path) -> Self {
        let mut dirs = classpath.to_vec();
        dirs.push(workspace.to_path_buf());
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn look_in(dir: &Path, file_name: &str) -> io::Result<Option<PathBuf>> {
        let candidate = dir.join(file_name);
        if !candidate.is_file() {
            return Ok(None);
        }
        File::open(&candidate)?;
        Ok(Some(candidate))
    }
}

impl Loader for SearchPathLoader {
    fn resolve(&self, name: &str) -> Result<Artifact, LoadError> {
        let file_name = artifact_file_name(name);
        for dir in &self.dirs {
            match Self::look_in(dir, &file_name) {
                Ok(Some(path)) => {
                    tracing::debug!(name, path = %path.display(), "resolved artifact");
                    return Ok(Artifact {
                        name: name.to_string(),
                        path,
                    });
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "cannot read artifact, continuing search"
                ),
            }
        }
        Err(LoadError::NotFound {
            name: name.to_string(),
            searched: self.dirs.clone(),
        })
    }
}
