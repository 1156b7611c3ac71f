// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Stand-ins for the compiler and executor so the pipeline can be tested
//! without a toolchain.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::compiler::{CompileError, Compiler};
use crate::exec::{Executor, Failure, Outcome};
use crate::loader::{artifact_file_name, Artifact};
use crate::synth::SourceUnit;

/// Writes each unit's source as its artifact. Units containing
/// `compile_error!` fail to compile.
pub struct FakeCompiler;

impl Compiler for FakeCompiler {
    fn compile(
        &self,
        units: &[SourceUnit],
        _classpath: &[PathBuf],
        out_dir: &Path,
    ) -> Result<Vec<Artifact>, CompileError> {
        units
            .iter()
            .map(|unit| {
                if unit.source.contains("compile_error!") {
                    return Err(CompileError::Failed {
                        unit: unit.name.clone(),
                        output: Default::default(),
                    });
                }
                let path = out_dir.join(artifact_file_name(&unit.name));
                fs::write(&path, &unit.source)?;
                Ok(Artifact {
                    name: unit.name.clone(),
                    path,
                })
            })
            .collect()
    }
}

/// "Runs" an artifact by reading it: `panic!` fails, anything else passes.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    pub ran: Rc<RefCell<Vec<String>>>,
}

impl Executor for FakeExecutor {
    fn execute(&self, artifact: &Artifact) -> Outcome {
        self.ran.borrow_mut().push(artifact.name.clone());
        let source = fs::read_to_string(&artifact.path).unwrap_or_default();
        if source.contains("panic!") {
            Outcome::Failed(Failure {
                exit_code: Some(101),
                timed_out: false,
                stdout: String::new(),
                stderr: "thread 'main' panicked".to_string(),
            })
        } else {
            Outcome::Passed
        }
    }
}
