// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compile synthesized units with the host toolchain.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use docsnip_diagnostics::convert::{parse_compiler_output, CompilerOutput};

use crate::loader::{artifact_file_name, Artifact};
use crate::synth::SourceUnit;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot start compiler `{}`: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("compiler I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("`{unit}` failed to compile")]
    Failed { unit: String, output: CompilerOutput },
}

/// Turns source units into artifacts in `out_dir`.
pub trait Compiler {
    fn compile(
        &self,
        units: &[SourceUnit],
        classpath: &[PathBuf],
        out_dir: &Path,
    ) -> Result<Vec<Artifact>, CompileError>;
}

/// Runs `rustc` with the unit's source on stdin.
#[derive(Debug, Clone)]
pub struct RustcCompiler {
    program: PathBuf,
    edition: String,
    externs: Vec<String>,
}

impl Default for RustcCompiler {
    fn default() -> Self {
        Self::new("rustc")
    }
}

impl RustcCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            edition: "2021".to_string(),
            externs: Vec::new(),
        }
    }

    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }

    /// Pass `--extern name`, resolved by rustc through the `-L` directories.
    pub fn with_extern(mut self, name: impl Into<String>) -> Self {
        self.externs.push(name.into());
        self
    }

    fn command(&self, unit: &SourceUnit, classpath: &[PathBuf], output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-")
            .args(["--crate-name", &unit.name])
            .args(["--crate-type", "bin"])
            .args(["--edition", &self.edition])
            .arg("--error-format=json");
        for dir in classpath {
            cmd.arg("-L").arg(dir);
        }
        for name in &self.externs {
            cmd.args(["--extern", name]);
        }
        cmd.arg("-o").arg(output);
        cmd
    }

    fn compile_one(
        &self,
        unit: &SourceUnit,
        classpath: &[PathBuf],
        out_dir: &Path,
    ) -> Result<Artifact, CompileError> {
        let path = out_dir.join(artifact_file_name(&unit.name));
        let mut child = self
            .command(unit, classpath, &path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompileError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // rustc reads all of stdin before it writes diagnostics
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(unit.source.as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(unit = %unit.name, status = %output.status, "rustc failed");
            return Err(CompileError::Failed {
                unit: unit.name.clone(),
                output: parse_compiler_output(&stderr),
            });
        }

        tracing::debug!(unit = %unit.name, path = %path.display(), "compiled");
        Ok(Artifact {
            name: unit.name.clone(),
            path,
        })
    }
}

impl Compiler for RustcCompiler {
    fn compile(
        &self,
        units: &[SourceUnit],
        classpath: &[PathBuf],
        out_dir: &Path,
    ) -> Result<Vec<Artifact>, CompileError> {
        units
            .iter()
            .map(|unit| self.compile_one(unit, classpath, out_dir))
            .collect()
    }
}
