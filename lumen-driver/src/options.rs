//! The driver's declarative invocation: what to compile, what to do with
//! it, and where results go. This is the one configuration surface in the
//! workspace — there is no separate config-file format, a hosting build
//! tool constructs one of these directly.

use std::path::PathBuf;

/// One of the seven actions the driver can perform, each running the
/// minimum pass subset that action needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Lex only; dump the token stream.
    Tokens,
    /// Parse only; dump the raw AST tree form.
    Ast,
    /// Parse only; pretty-print back to surface syntax.
    Pretty,
    /// Parse and run semantic analysis; report diagnostics, emit nothing.
    Check,
    /// Parse, analyze, hand off to an external codegen backend for IR.
    Llvm,
    /// Parse, analyze, hand off to an external codegen backend for an object file.
    Obj,
    /// Parse, analyze, hand off to an external codegen backend and linker for an executable.
    Exe,
}

impl Action {
    /// Whether this action needs semantic analysis to run at all (token
    /// and AST/pretty dumps are syntax-only).
    pub fn needs_sema(self) -> bool {
        !matches!(self, Action::Tokens | Action::Ast | Action::Pretty)
    }

    /// Whether this action names an external codegen collaborator this
    /// workspace does not implement.
    pub fn needs_codegen(self) -> bool {
        matches!(self, Action::Llvm | Action::Obj | Action::Exe)
    }
}

/// One input to a compilation run: a path on disk, or an in-memory buffer
/// under a synthetic name (used by embedders and by the driver's own
/// tests, neither of which wants a filesystem round trip).
#[derive(Debug, Clone)]
pub enum InputSource {
    File(PathBuf),
    Buffer { name: String, content: String },
}

impl InputSource {
    pub fn display_name(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Buffer { name, .. } => name.clone(),
        }
    }
}

/// A full driver invocation. Defaults mirror common `-O` conventions: opt
/// level 2, 64-bit pointer width, no search paths, color only when the
/// consumer decides to use it.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub inputs: Vec<InputSource>,
    pub action: Action,
    pub output: Option<PathBuf>,
    pub opt_level: u8,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub link_libs: Vec<String>,
    pub stdlib_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub verbose: bool,
    pub pointer_width: u32,
}

impl CompilerOptions {
    pub fn new(inputs: Vec<InputSource>, action: Action) -> Self {
        CompilerOptions {
            inputs,
            action,
            output: None,
            opt_level: 2,
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            link_libs: Vec::new(),
            stdlib_dir: None,
            cache_dir: None,
            verbose: false,
            pointer_width: 64,
        }
    }
}
