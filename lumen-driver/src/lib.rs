//! The frontend driver: turns a declarative [`CompilerOptions`] invocation
//! into a sequence of lex/parse/analyze passes, one [`Action`] worth per
//! input, and folds the results into one [`CompilationResult`].
//!
//! Code generation, object emission, and linking are external
//! collaborators this crate does not implement; requesting one of those
//! actions runs everything through semantic analysis and then reports
//! [`CompilationResult::CodeGenError`] rather than guessing at a backend.

mod driver;
mod options;
mod result;

pub use driver::Driver;
pub use options::{Action, CompilerOptions, InputSource};
pub use result::{CompilationResult, DriverError};
