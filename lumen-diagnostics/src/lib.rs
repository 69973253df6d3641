//! Clang-style positional diagnostics: a [`SourceManager`] mapping compact
//! offsets to `(file, line, column)`, a closed [`DiagID`] catalogue, and a
//! [`DiagnosticEngine`] that accumulates and renders them.

mod consumer;
mod diag_ids;
mod diagnostic;
mod engine;
mod fuzzy;
mod source_location;
mod source_manager;

pub use consumer::{
    DiagnosticConsumer, IgnoringDiagnosticConsumer, MultiplexDiagnosticConsumer,
    StoredDiagnosticConsumer, TextDiagnosticConsumer,
};
pub use diag_ids::{display_code, format_code, is_error, is_note, is_warning, level_of, DiagID, DiagnosticLevel};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, FixIt};
pub use engine::DiagnosticEngine;
pub use fuzzy::find_similar_name;
pub use source_location::{SourceLocation, SourceRange};
pub use source_manager::{FileID, SourceManager};
