use thiserror::Error;

use crate::bytecode::CompileError;
use crate::diagnostic::Diagnostic;
use crate::pipeline::InterpretResult;

/// Failure of one of the compile-time stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    Parse(Diagnostic),

    #[error("{0}")]
    Analyze(Diagnostic),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl Error {
    /// The pipeline status this failure maps to.
    pub fn status(&self) -> InterpretResult {
        match self {
            Error::Parse(_) => InterpretResult::ParseError,
            Error::Analyze(_) => InterpretResult::AnalyzeError,
            Error::Compile(_) => InterpretResult::CompileError,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Error::Parse(d) | Error::Analyze(d) => d.line,
            Error::Compile(e) => e.line(),
        }
    }
}
