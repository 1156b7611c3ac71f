// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scratch directory that compiled snippets are written to.

use std::path::{Path, PathBuf};

/// Output directory for one run.
///
/// A directory created by [`Workspace::acquire`] is deleted when the
/// workspace is released or dropped. Fallback and caller-supplied
/// directories are left alone.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    /// Set while this workspace still owns a directory to delete.
    owned: Option<tempfile::TempDir>,
}

impl Workspace {
    /// Create a fresh `docsnip-*` directory under the system temp dir.
    pub fn acquire() -> Self {
        Self::acquire_in(&std::env::temp_dir())
    }

    /// Create a fresh `docsnip-*` directory under `parent`, falling back to
    /// the current directory if that fails.
    pub fn acquire_in(parent: &Path) -> Self {
        match tempfile::Builder::new().prefix("docsnip-").tempdir_in(parent) {
            Ok(dir) => {
                tracing::debug!(path = %dir.path().display(), "created workspace");
                Self {
                    path: dir.path().to_path_buf(),
                    owned: Some(dir),
                }
            }
            Err(e) => {
                tracing::warn!(
                    parent = %parent.display(),
                    error = %e,
                    "cannot create workspace, using the current directory"
                );
                Self {
                    path: PathBuf::from("."),
                    owned: None,
                }
            }
        }
    }

    /// Use an existing directory. It is never deleted.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owned: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether release will delete the directory.
    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    /// Delete an owned directory. Failures are logged; calling again does
    /// nothing.
    pub fn release(&mut self) {
        if let Some(dir) = self.owned.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => tracing::debug!(path = %path.display(), "removed workspace"),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cannot remove workspace"
                ),
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
