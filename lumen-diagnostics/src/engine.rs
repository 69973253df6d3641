//! Accumulates and dispatches diagnostics for one compilation pipeline.

use crate::consumer::{DiagnosticConsumer, TextDiagnosticConsumer};
use crate::diag_ids::{is_error, is_warning, DiagID, DiagnosticLevel};
use crate::diagnostic::{Diagnostic, DiagnosticBuilder};
use crate::source_location::{SourceLocation, SourceRange};
use crate::source_manager::SourceManager;
use std::cell::RefCell;

/// Owns diagnostic bookkeeping (counts, warnings-as-errors, error limit)
/// and a [`SourceManager`] reference used to resolve locations for
/// rendering. Exclusively owned by the driver for one pipeline.
pub struct DiagnosticEngine<'sm> {
    source_manager: &'sm RefCell<SourceManager>,
    consumer: Box<dyn DiagnosticConsumer>,
    error_count: usize,
    warning_count: usize,
    warnings_as_errors: bool,
    error_limit: usize,
}

impl<'sm> DiagnosticEngine<'sm> {
    pub fn new(source_manager: &'sm RefCell<SourceManager>) -> Self {
        DiagnosticEngine {
            source_manager,
            consumer: Box::new(TextDiagnosticConsumer::default()),
            error_count: 0,
            warning_count: 0,
            warnings_as_errors: false,
            error_limit: 0,
        }
    }

    pub fn set_consumer(&mut self, consumer: Box<dyn DiagnosticConsumer>) {
        self.consumer = consumer;
    }

    pub fn source_manager(&self) -> &RefCell<SourceManager> {
        self.source_manager
    }

    pub fn set_warnings_as_errors(&mut self, value: bool) {
        self.warnings_as_errors = value;
    }

    pub fn warnings_as_errors(&self) -> bool {
        self.warnings_as_errors
    }

    pub fn set_error_limit(&mut self, limit: usize) {
        self.error_limit = limit;
    }

    pub fn has_reached_error_limit(&self) -> bool {
        self.error_limit > 0 && self.error_count >= self.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Begin building a diagnostic at `loc`, with the default severity
    /// for `id`.
    pub fn report(&mut self, id: DiagID, loc: SourceLocation) -> DiagnosticBuilder<'_, 'sm> {
        DiagnosticBuilder::new(self, id, loc)
    }

    /// Begin building a diagnostic at `loc`, overriding its severity.
    pub fn report_with_level(&mut self, id: DiagID, loc: SourceLocation, level: DiagnosticLevel) -> DiagnosticBuilder<'_, 'sm> {
        DiagnosticBuilder::new(self, id, loc).with_level(level)
    }

    /// Begin building a diagnostic anchored on a range (the range's start
    /// becomes the primary location and is also recorded as a highlight).
    pub fn report_range(&mut self, id: DiagID, range: SourceRange) -> DiagnosticBuilder<'_, 'sm> {
        DiagnosticBuilder::new(self, id, range.begin()).range(range)
    }

    /// Finalize a diagnostic produced by a [`DiagnosticBuilder`]: update
    /// counts, promote warnings if configured, and forward to the consumer.
    pub(crate) fn record(&mut self, mut diagnostic: Diagnostic) {
        if self.warnings_as_errors && diagnostic.level == DiagnosticLevel::Warning {
            diagnostic.level = DiagnosticLevel::Error;
        }
        match diagnostic.level {
            DiagnosticLevel::Error | DiagnosticLevel::Fatal => self.error_count += 1,
            DiagnosticLevel::Warning => self.warning_count += 1,
            DiagnosticLevel::Note => {}
        }
        let _ = is_error(diagnostic.id);
        let _ = is_warning(diagnostic.id);
        let sm = self.source_manager.borrow();
        self.consumer.handle_diagnostic(&diagnostic, &sm);
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.warning_count = 0;
    }

    pub fn finish(&mut self) {
        self.consumer.finish();
    }
}
