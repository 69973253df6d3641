//! The driver's outward-facing status, and the narrower internal error
//! type for the handful of failures that are about the compiler's own
//! operation rather than about the program being compiled.

use crate::options::Action;
use thiserror::Error;

/// What happened on a single driver run. Distinct from a [`Diagnostic`]:
/// a diagnostic is about the user's source, this is the driver's overall
/// verdict, and is what the CLI facade turns into a process exit code.
///
/// [`Diagnostic`]: lumen_diagnostics::Diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationResult {
    Success,
    LexerError,
    ParserError,
    SemanticError,
    CodeGenError,
    LinkError,
    IOError,
    InternalError,
}

impl CompilationResult {
    pub fn is_success(self) -> bool {
        self == CompilationResult::Success
    }

    /// Stable within a build, assigned in declaration order starting at 1;
    /// not a promise across workspace versions.
    pub fn exit_code(self) -> i32 {
        match self {
            CompilationResult::Success => 0,
            CompilationResult::LexerError => 1,
            CompilationResult::ParserError => 2,
            CompilationResult::SemanticError => 3,
            CompilationResult::CodeGenError => 4,
            CompilationResult::LinkError => 5,
            CompilationResult::IOError => 6,
            CompilationResult::InternalError => 7,
        }
    }
}

/// Failures in the driver's own plumbing — not diagnosable against a
/// source location, so they never go through [`DiagnosticEngine`] and
/// never carry a `DiagID`.
///
/// [`DiagnosticEngine`]: lumen_diagnostics::DiagnosticEngine
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read input '{path}': {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("no codegen backend is linked in for --emit={0:?}")]
    NoCodegenBackend(Action),
}
