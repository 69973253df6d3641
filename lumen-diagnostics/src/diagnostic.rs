//! A single structured diagnostic and the builder used to accumulate one.

use crate::diag_ids::{level_of, DiagID, DiagnosticLevel};
use crate::engine::DiagnosticEngine;
use crate::source_location::{SourceLocation, SourceRange};

/// A fix suggested alongside a diagnostic: replace `range` with
/// `replacement` (an empty replacement reads as "remove this code").
#[derive(Debug, Clone)]
pub struct FixIt {
    pub range: SourceRange,
    pub replacement: String,
}

impl FixIt {
    pub fn is_removal(&self) -> bool {
        self.replacement.is_empty()
    }
}

/// A fully-formed diagnostic: an id, a severity, a primary location, any
/// number of highlight ranges, ordered message arguments, and fix-its.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub id: DiagID,
    pub level: DiagnosticLevel,
    pub location: SourceLocation,
    pub ranges: Vec<SourceRange>,
    pub args: Vec<String>,
    pub fix_its: Vec<FixIt>,
}

impl Diagnostic {
    /// Substitute `args` into the id's format-string template.
    pub fn message(&self) -> String {
        let mut out = self.id.format_string().to_string();
        for (i, arg) in self.args.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), arg);
        }
        out
    }
}

/// Accumulates arguments, ranges, and fix-its for a diagnostic under
/// construction; emits the finished diagnostic into its owning engine when
/// dropped (whether that drop is implicit, at the end of the statement, or
/// triggered by the explicit [`DiagnosticBuilder::emit`] call).
pub struct DiagnosticBuilder<'a, 'sm> {
    engine: &'a mut DiagnosticEngine<'sm>,
    id: DiagID,
    level: DiagnosticLevel,
    location: SourceLocation,
    ranges: Vec<SourceRange>,
    args: Vec<String>,
    fix_its: Vec<FixIt>,
}

impl<'a, 'sm> DiagnosticBuilder<'a, 'sm> {
    pub(crate) fn new(engine: &'a mut DiagnosticEngine<'sm>, id: DiagID, location: SourceLocation) -> Self {
        let level = level_of(id);
        DiagnosticBuilder {
            engine,
            id,
            level,
            location,
            ranges: Vec::new(),
            args: Vec::new(),
            fix_its: Vec::new(),
        }
    }

    pub(crate) fn with_level(mut self, level: DiagnosticLevel) -> Self {
        self.level = level;
        self
    }

    /// Append the next `{n}` substitution argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Attach a highlight range (in addition to the primary location).
    pub fn range(mut self, range: SourceRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Attach a suggested fix.
    pub fn fix_it(mut self, range: SourceRange, replacement: impl Into<String>) -> Self {
        self.fix_its.push(FixIt {
            range,
            replacement: replacement.into(),
        });
        self
    }

    /// Finalize and emit the diagnostic. Equivalent to letting the builder
    /// drop, spelled out for call sites that want the emission to read as
    /// an explicit step.
    pub fn emit(self) {
        // Dropping `self` here runs the real emission logic in `Drop`.
    }

    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            id: self.id,
            level: self.level,
            location: self.location,
            ranges: self.ranges.clone(),
            args: self.args.clone(),
            fix_its: self.fix_its.clone(),
        }
    }
}

impl<'a, 'sm> Drop for DiagnosticBuilder<'a, 'sm> {
    fn drop(&mut self) {
        let diagnostic = self.to_diagnostic();
        self.engine.record(diagnostic);
    }
}
